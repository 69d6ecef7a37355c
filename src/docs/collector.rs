//! API documentation index.

use serde::Serialize;

use crate::routing::spec::Verb;

/// Documentation for one API route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiDocEntry {
    pub module: String,
    pub verb: Verb,
    pub route: String,
    pub doc: String,
}

/// Receives API docs found while routes are registered.
pub trait DocCollector {
    fn process_api_doc(&mut self, entry: ApiDocEntry);

    /// Drop what was collected for a route whose handler was replaced.
    fn discard_api_doc(&mut self, _verb: Verb, _route: &str) {}
}

/// Process-wide documentation index, built once at boot.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ApiDocIndex {
    entries: Vec<ApiDocEntry>,
}

impl ApiDocIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ApiDocEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, verb: Verb, route: &str) -> Option<&ApiDocEntry> {
        self.entries
            .iter()
            .rev()
            .find(|e| e.verb == verb && e.route == route)
    }

    /// Remove the entry for (verb, route), if any.
    pub fn remove(&mut self, verb: Verb, route: &str) -> Option<ApiDocEntry> {
        let pos = self
            .entries
            .iter()
            .position(|e| e.verb == verb && e.route == route)?;
        Some(self.entries.remove(pos))
    }

    /// Entries grouped by module, in registration order.
    pub fn by_module(&self) -> Vec<(&str, Vec<&ApiDocEntry>)> {
        let mut groups: Vec<(&str, Vec<&ApiDocEntry>)> = Vec::new();
        for entry in &self.entries {
            match groups.iter_mut().find(|(name, _)| *name == entry.module) {
                Some((_, list)) => list.push(entry),
                None => groups.push((entry.module.as_str(), vec![entry])),
            }
        }
        groups
    }
}

impl DocCollector for ApiDocIndex {
    fn process_api_doc(&mut self, entry: ApiDocEntry) {
        tracing::debug!(module = %entry.module, verb = %entry.verb, route = %entry.route, "Collected api doc");
        self.entries.push(entry);
    }

    fn discard_api_doc(&mut self, verb: Verb, route: &str) {
        if let Some(old) = self.remove(verb, route) {
            tracing::debug!(module = %old.module, verb = %verb, route = %route, "Dropped api doc of replaced route");
        }
    }
}
