//! Path-based access rules evaluated before handler dispatch.
//!
//! The policy is an explicit ordered rule list built in plain code;
//! evaluation is a pure function of the path and the request's
//! authentication state.

use crate::error::{AuthError, AuthResult};

/// Accessibility requirement attached to a path pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reachable with or without an identity.
    Public,
    /// Requires a resolved identity.
    Authenticated,
}

/// A slash-separated pattern: literal segments, `*` matching exactly
/// one segment, and a trailing `**` matching any remainder including
/// the bare prefix.
#[derive(Debug, Clone)]
struct PathPattern {
    segments: Vec<String>,
}

impl PathPattern {
    fn parse(pattern: &str) -> Self {
        Self {
            segments: pattern
                .split('/')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    fn matches(&self, path: &str) -> bool {
        let path_segments: Vec<&str> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        let mut matched = 0;
        for segment in &self.segments {
            if segment == "**" {
                return true;
            }
            match path_segments.get(matched) {
                Some(actual) if segment == "*" || segment == actual => matched += 1,
                _ => return false,
            }
        }

        matched == path_segments.len()
    }
}

/// Ordered access rules; the first pattern matching a path decides.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    rules: Vec<(PathPattern, Access)>,
}

impl AccessPolicy {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Appends a rule; earlier rules win.
    pub fn route(mut self, pattern: &str, access: Access) -> Self {
        self.rules.push((PathPattern::parse(pattern), access));
        self
    }

    /// Access required for `path`. Paths matching no rule require
    /// authentication.
    pub fn required_access(&self, path: &str) -> Access {
        self.rules
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map(|(_, access)| *access)
            .unwrap_or(Access::Authenticated)
    }

    /// Decides whether a request may proceed. No side effects, no I/O.
    pub fn authorize(&self, path: &str, authenticated: bool) -> AuthResult<()> {
        match self.required_access(path) {
            Access::Public => Ok(()),
            Access::Authenticated if authenticated => Ok(()),
            Access::Authenticated => Err(AuthError::Unauthorized),
        }
    }
}
