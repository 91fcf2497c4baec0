/// Per-route access requirements.
///
/// A policy is a table of path prefixes. The longest prefix that matches a
/// request path on a segment boundary decides the requirement; paths without
/// a matching rule fall back to the policy default.

use crate::auth::Claims;
use crate::domain::Role;
use crate::error::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Public,
    Authenticated,
    Role(Role),
}

impl Requirement {
    /// Whether verified `claims` satisfy this requirement.
    pub fn check(&self, claims: &Claims) -> Result<(), AuthError> {
        match self {
            Requirement::Public | Requirement::Authenticated => Ok(()),
            Requirement::Role(role) if claims.role == *role => Ok(()),
            Requirement::Role(_) => Err(AuthError::Forbidden),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<(String, Requirement)>,
    default: Requirement,
}

impl AccessPolicy {
    pub fn new(default: Requirement) -> Self {
        Self {
            rules: Vec::new(),
            default,
        }
    }

    pub fn rule(mut self, prefix: impl Into<String>, requirement: Requirement) -> Self {
        let prefix = prefix.into();
        let prefix = prefix.trim_end_matches('/').to_string();
        self.rules.push((prefix, requirement));
        self
    }

    /// `path` must already be percent-decoded, as the router sees it.
    /// Repeated and trailing slashes are ignored.
    pub fn requirement_for(&self, path: &str) -> Requirement {
        let path = collapse_slashes(path);
        self.rules
            .iter()
            .filter(|(prefix, _)| matches_prefix(prefix, &path))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, requirement)| *requirement)
            .unwrap_or(self.default)
    }
}

/// `/api/v1//admin/` becomes `/api/v1/admin`.
fn collapse_slashes(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

/// `/api/v1/admin` matches `/api/v1/admin` and `/api/v1/admin/users`, but
/// not `/api/v1/administrators`.
fn matches_prefix(prefix: &str, path: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
