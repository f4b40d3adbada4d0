/// Identity resolved from a verified credential or a decoded token.
///
/// Constructed fresh per request, handed to downstream handlers by
/// value, and never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedIdentity {
    pub principal: String,
    pub roles: Vec<String>,
}

impl AuthenticatedIdentity {
    /// Builds an identity, trimming role entries and dropping empties.
    pub fn new(principal: impl Into<String>, roles: Vec<String>) -> Self {
        let roles = roles
            .into_iter()
            .map(|role| role.trim().to_string())
            .filter(|role| !role.is_empty())
            .collect();

        Self {
            principal: principal.into(),
            roles,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
