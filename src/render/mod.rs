//! Template rendering boundary.
//!
//! The pipeline only needs "render this view with this model". The default
//! implementation is backed by minijinja with a filesystem loader rooted at
//! the configured views directory.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use minijinja::{path_loader, Environment};
use serde_json::Value;

use crate::error::AppError;

/// Renders a named view with a JSON model.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, view: &str, model: &Value) -> Result<String, AppError>;

    /// Turn compiled-template caching on or off.
    fn set_cache(&self, enabled: bool);
}

/// minijinja-backed renderer.
pub struct MiniJinjaRenderer {
    views_dir: PathBuf,
    cache: AtomicBool,
    shared: Mutex<Option<Arc<Environment<'static>>>>,
}

impl MiniJinjaRenderer {
    pub fn new(views_dir: impl Into<PathBuf>) -> Self {
        Self {
            views_dir: views_dir.into(),
            cache: AtomicBool::new(true),
            shared: Mutex::new(None),
        }
    }

    fn fresh_environment(&self) -> Environment<'static> {
        let mut env = Environment::new();
        env.set_loader(path_loader(self.views_dir.clone()));
        env
    }

    fn environment(&self) -> Arc<Environment<'static>> {
        if !self.cache.load(Ordering::Relaxed) {
            return Arc::new(self.fresh_environment());
        }
        let mut shared = self
            .shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        shared
            .get_or_insert_with(|| Arc::new(self.fresh_environment()))
            .clone()
    }
}

impl TemplateRenderer for MiniJinjaRenderer {
    fn render(&self, view: &str, model: &Value) -> Result<String, AppError> {
        let env = self.environment();
        let template = env
            .get_template(view)
            .map_err(|e| AppError::Render(e.to_string()))?;
        template
            .render(model)
            .map_err(|e| AppError::Render(e.to_string()))
    }

    fn set_cache(&self, enabled: bool) {
        self.cache.store(enabled, Ordering::Relaxed);
        if !enabled {
            let mut shared = self
                .shared
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *shared = None;
        }
    }
}
