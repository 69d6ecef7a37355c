//! Handler module registry.
//!
//! # Responsibilities
//! - Hold registered modules in registration order
//! - Derive module names from source filenames
//! - Load each module's routes once at boot
//!
//! # Design Decisions
//! - Only filenames matching `^[A-Za-z][A-Za-z0-9_]*\.rs$` name a module
//! - Registration order stands in for directory listing order
//! - A module with no routes is fine; a duplicate name is skipped

use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::handlers::{HandlerModule, RouteDef};

const MODULE_FILE_PATTERN: &str = r"^[A-Za-z][A-Za-z0-9_]*\.rs$";

fn module_file_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MODULE_FILE_PATTERN).expect("module filename pattern is valid"))
}

/// Module name for a source path, or `None` if the filename does not follow
/// the naming convention.
pub fn module_name(file: &str) -> Option<String> {
    let filename = Path::new(file).file_name()?.to_str()?;
    if !module_file_regex().is_match(filename) {
        return None;
    }
    filename.strip_suffix(".rs").map(str::to_string)
}

/// A module with its routes loaded.
#[derive(Debug)]
pub struct LoadedModule {
    pub name: String,
    pub routes: Vec<RouteDef>,
}

/// Startup-time registry of handler modules.
#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Box<dyn HandlerModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module. Order of calls is the registration order.
    pub fn register(&mut self, module: impl HandlerModule + 'static) -> &mut Self {
        self.modules.push(Box::new(module));
        self
    }

    pub fn with(mut self, module: impl HandlerModule + 'static) -> Self {
        self.register(module);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Names of all conforming modules, in order.
    pub fn discover(&self) -> Vec<String> {
        self.conforming().map(|(name, _)| name).collect()
    }

    /// Load routes from every conforming module, in order.
    pub fn load_all(&self) -> Vec<LoadedModule> {
        self.conforming()
            .map(|(name, module)| {
                let routes = module.routes();
                tracing::debug!(module = %name, routes = routes.len(), "Loaded handler module");
                LoadedModule { name, routes }
            })
            .collect()
    }

    fn conforming(&self) -> impl Iterator<Item = (String, &dyn HandlerModule)> + '_ {
        let mut seen = HashSet::new();
        self.modules.iter().filter_map(move |module| {
            let file = module.file();
            let Some(name) = module_name(file) else {
                tracing::debug!(file = %file, "Skipping non-conforming handler file");
                return None;
            };
            if !seen.insert(name.clone()) {
                tracing::warn!(module = %name, file = %file, "Duplicate handler module name, skipping");
                return None;
            }
            tracing::info!(module = %name, "Found handler module");
            Some((name, module.as_ref()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerResult;
    use crate::handlers::FnModule;
    use crate::pipeline::context::RequestContext;
    use axum::response::IntoResponse;

    async fn ok(_ctx: RequestContext) -> HandlerResult {
        Ok("ok".into_response())
    }

    fn two_routes() -> Vec<RouteDef> {
        vec![RouteDef::get("/a", ok), RouteDef::post("/b", ok)]
    }

    fn no_routes() -> Vec<RouteDef> {
        Vec::new()
    }

    #[test]
    fn test_module_name_convention() {
        assert_eq!(module_name("src/controllers/users.rs").as_deref(), Some("users"));
        assert_eq!(module_name("api_v2.rs").as_deref(), Some("api_v2"));
        assert_eq!(module_name("_utils.rs"), None);
        assert_eq!(module_name("2fa.rs"), None);
        assert_eq!(module_name("users.js"), None);
        assert_eq!(module_name("my-module.rs"), None);
        assert_eq!(module_name("users.rs.bak"), None);
    }

    #[test]
    fn test_discover_keeps_order_and_filters() {
        let registry = ModuleRegistry::new()
            .with(FnModule::new("src/controllers/zeta.rs", no_routes))
            .with(FnModule::new("src/controllers/_utils.rs", two_routes))
            .with(FnModule::new("src/controllers/alpha.rs", two_routes));

        assert_eq!(registry.len(), 3);
        assert_eq!(registry.discover(), vec!["zeta", "alpha"]);
    }

    #[test]
    fn test_load_all_collects_routes() {
        let registry = ModuleRegistry::new()
            .with(FnModule::new("empty.rs", no_routes))
            .with(FnModule::new("pages.rs", two_routes));

        let loaded = registry.load_all();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded[0].name, "empty");
        assert!(loaded[0].routes.is_empty());
        assert_eq!(loaded[1].name, "pages");
        assert_eq!(loaded[1].routes.len(), 2);
    }

    #[test]
    fn test_duplicate_names_keep_first() {
        let registry = ModuleRegistry::new()
            .with(FnModule::new("a/pages.rs", two_routes))
            .with(FnModule::new("b/pages.rs", no_routes));

        let loaded = registry.load_all();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].routes.len(), 2);
    }
}
