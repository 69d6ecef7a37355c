//! Response modes chosen by the area gate.
//!
//! A handler renders through the mode it was given: `Theme` resolves the
//! view inside the active theme and adds site metadata to the model,
//! `Manage` adds only the current identity.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Map, Value};

use crate::config::SiteConfig;
use crate::pipeline::identity::Identity;

/// Theme settings shared by every public request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeMode {
    theme_path: String,
    site: SiteConfig,
}

impl ThemeMode {
    pub fn new(theme: &str, site: SiteConfig) -> Self {
        Self {
            theme_path: format!("themes/{theme}/"),
            site,
        }
    }

    pub fn theme_path(&self) -> &str {
        &self.theme_path
    }

    pub fn site(&self) -> &SiteConfig {
        &self.site
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseMode {
    Theme(Arc<ThemeMode>),
    Manage,
}

impl ResponseMode {
    pub fn is_manage(&self) -> bool {
        matches!(self, ResponseMode::Manage)
    }

    /// Template name for a view.
    pub fn view(&self, view: &str) -> String {
        match self {
            ResponseMode::Theme(theme) => format!("{}{}", theme.theme_path, view),
            ResponseMode::Manage => view.to_string(),
        }
    }

    /// Add the mode's fields to a render model.
    ///
    /// A model that is not a JSON object is replaced by an empty one.
    pub fn augment(&self, model: Value, identity: Option<&Identity>, now_ms: u64) -> Value {
        let mut map = match model {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let user = identity.map_or(Value::Null, |user| json!(user));

        match self {
            ResponseMode::Theme(theme) => {
                map.insert("__theme__".into(), json!(theme.theme_path));
                map.insert("__user__".into(), user);
                map.insert("__time__".into(), json!(now_ms));
                map.insert(
                    "__website__".into(),
                    json!({
                        "name": theme.site.name,
                        "description": theme.site.description,
                        "custom_header": theme.site.custom_header,
                        "custom_footer": theme.site.custom_footer,
                    }),
                );
            }
            ResponseMode::Manage => {
                map.insert("__user__".into(), user);
            }
        }
        Value::Object(map)
    }
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}
