//! Route spec parsing.
//!
//! A route spec pairs an HTTP verb with a path pattern. Handler modules
//! either build one directly ([`RouteSpec::new`]) or hand over the external
//! string form `"<VERB> <path>"`, which [`parse`] validates.
//!
//! # Design Decisions
//! - Exactly two whitespace-separated tokens, anything else is not a route
//! - Verbs are matched case-sensitively; only GET and POST are served
//! - Both construction paths apply the same validation

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde::Serialize;

/// HTTP verbs a handler can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    Get,
    Post,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
        }
    }

    /// Map a request method onto a routable verb.
    ///
    /// HEAD is answered by GET handlers, as the engine does.
    pub fn from_method(method: &Method) -> Option<Self> {
        if method == Method::GET || method == Method::HEAD {
            Some(Verb::Get)
        } else if method == Method::POST {
            Some(Verb::Post)
        } else {
            None
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verb {
    type Err = RouteSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Verb::Get),
            "POST" => Ok(Verb::Post),
            other => Err(RouteSpecError::UnsupportedVerb(other.to_string())),
        }
    }
}

/// Why a route spec was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteSpecError {
    #[error("Not a route definition: {0}")]
    Invalid(String),

    #[error("Invalid verb: {0}")]
    UnsupportedVerb(String),
}

/// A validated verb and path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RouteSpec {
    verb: Verb,
    path: String,
}

impl RouteSpec {
    /// Build a spec directly, applying the same checks as [`parse`].
    pub fn new(verb: Verb, path: impl Into<String>) -> Result<Self, RouteSpecError> {
        let path = path.into();
        if path.is_empty() || path.chars().any(char::is_whitespace) {
            return Err(RouteSpecError::Invalid(format!("{verb} {path}")));
        }
        Ok(Self { verb, path })
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn into_parts(self) -> (Verb, String) {
        (self.verb, self.path)
    }
}

impl fmt::Display for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)
    }
}

impl FromStr for RouteSpec {
    type Err = RouteSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

/// Parse the external `"<VERB> <path>"` form.
pub fn parse(spec: &str) -> Result<RouteSpec, RouteSpecError> {
    let mut tokens = spec.split_whitespace();
    let (verb, path) = match (tokens.next(), tokens.next(), tokens.next()) {
        (Some(verb), Some(path), None) => (verb, path),
        _ => return Err(RouteSpecError::Invalid(spec.to_string())),
    };
    let verb: Verb = verb.parse()?;
    RouteSpec::new(verb, path)
}
