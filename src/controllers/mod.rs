//! Built-in handler modules.
//!
//! Each file here is one handler module; its filename is the module name.
//! Registration order is the order routes are loaded in.

pub mod home;
pub mod manage;
pub mod me;
pub mod site;

use crate::handlers::ModuleRegistry;

/// Every built-in module, in load order.
pub fn registry() -> ModuleRegistry {
    ModuleRegistry::new()
        .with(home::MODULE)
        .with(manage::MODULE)
        .with(me::MODULE)
        .with(site::MODULE)
}
