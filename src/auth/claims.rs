use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default organization ID when the token does not carry one
pub const DEFAULT_ORGANIZATION_ID: &str = "default";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// User roles
    #[serde(default)]
    pub roles: Vec<String>,
    /// Organization ID (tenant partition key)
    #[serde(default)]
    pub organization_id: Option<String>,
    /// Additional custom claims
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    pub fn user_id(&self) -> &str {
        &self.sub
    }

    /// Get the organization ID, or the default if not set
    pub fn organization_id(&self) -> &str {
        self.organization_id
            .as_deref()
            .unwrap_or(DEFAULT_ORGANIZATION_ID)
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_expired(&self) -> bool {
        let now = chrono::Utc::now().timestamp();
        self.exp < now
    }
}
