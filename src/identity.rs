use serde::{Deserialize, Serialize};

/// The signed-in user as seen by the core. `id` scopes remote rows,
/// `email` scopes local datasets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: String,
    pub email: String,
}

impl UserIdentity {
    pub fn new(id: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }

    /// Key for per-user local datasets.
    pub fn storage_key(&self) -> &str {
        &self.email
    }
}
