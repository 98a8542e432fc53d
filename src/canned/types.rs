//! Canned response types and error definitions.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Canned-response-specific error type
#[derive(Debug, Error)]
pub enum CannedResponseError {
    #[error("Canned response not found: {0}")]
    NotFound(Uuid),

    #[error("Invalid canned response: {0}")]
    Validation(String),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for canned response operations
pub type CannedResponseResult<T> = Result<T, CannedResponseError>;

/// A typed variable value usable in substitution.
///
/// Closed sum type so the string form applied during substitution is
/// well-defined for every value a caller can supply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
    Date(DateTime<Utc>),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::String(s) => f.write_str(s),
            VariableValue::Number(n) => write!(f, "{}", n),
            VariableValue::Bool(b) => write!(f, "{}", b),
            VariableValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M")),
        }
    }
}

impl From<&str> for VariableValue {
    fn from(s: &str) -> Self {
        VariableValue::String(s.to_string())
    }
}

impl From<String> for VariableValue {
    fn from(s: String) -> Self {
        VariableValue::String(s)
    }
}

/// A stored canned response definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CannedResponse {
    /// Unique identifier
    pub id: Uuid,

    /// Owning organization (tenant partition key)
    pub organization_id: String,

    /// Human-readable display label
    pub name: String,

    /// Response body with {{variable}} placeholders
    pub content: String,

    /// Free-text grouping label (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Quick-insert trigger strings (e.g. "/thanks"); empty, never null
    #[serde(default)]
    pub shortcuts: Vec<String>,

    /// Per-response default variable values
    #[serde(default)]
    pub variables: BTreeMap<String, VariableValue>,

    /// Number of recorded uses; starts at 0 and only increases
    #[serde(default)]
    pub usage_count: i64,

    /// Id of the creating user (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,

    /// Creation timestamp
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, refreshed on every mutation
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl CannedResponse {
    /// Build a new response from a create request for the given organization.
    pub fn from_request(
        organization_id: impl Into<String>,
        created_by: Option<String>,
        req: CreateCannedResponseRequest,
    ) -> Self {
        let now = Utc::now();
        CannedResponse {
            id: Uuid::new_v4(),
            organization_id: organization_id.into(),
            name: req.name,
            content: req.content,
            category: req.category,
            shortcuts: req.shortcuts,
            variables: req.variables,
            usage_count: 0,
            created_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate the response
    pub fn validate(&self) -> CannedResponseResult<()> {
        if self.name.trim().is_empty() || self.name.len() > 256 {
            return Err(CannedResponseError::Validation(
                "Name must be 1-256 characters".to_string(),
            ));
        }

        if self.content.is_empty() {
            return Err(CannedResponseError::Validation(
                "Content must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Apply a partial update in place and refresh `updated_at`.
    ///
    /// Only supplied fields change; the result still has to pass `validate`.
    pub fn apply_update(&mut self, updates: UpdateCannedResponseRequest) {
        if let Some(name) = updates.name {
            self.name = name;
        }

        if let Some(content) = updates.content {
            self.content = content;
        }

        if let Some(category) = updates.category {
            self.category = category;
        }

        if let Some(shortcuts) = updates.shortcuts {
            self.shortcuts = shortcuts;
        }

        if let Some(variables) = updates.variables {
            self.variables = variables;
        }

        self.updated_at = Utc::now();
    }
}

/// Request to create a new canned response
#[derive(Debug, Deserialize)]
pub struct CreateCannedResponseRequest {
    /// Display label
    pub name: String,

    /// Response body with {{variable}} placeholders
    pub content: String,

    /// Grouping label (optional)
    pub category: Option<String>,

    /// Quick-insert trigger strings (optional, defaults to none)
    #[serde(default)]
    pub shortcuts: Vec<String>,

    /// Per-response default variable values (optional)
    #[serde(default)]
    pub variables: BTreeMap<String, VariableValue>,
}

/// Request to update an existing canned response
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCannedResponseRequest {
    /// Display label (optional)
    pub name: Option<String>,

    /// Response body (optional)
    pub content: Option<String>,

    /// Grouping label (optional, use null to clear)
    pub category: Option<Option<String>>,

    /// Trigger strings (optional, replaces the whole collection)
    pub shortcuts: Option<Vec<String>>,

    /// Default variable values (optional, replaces the whole map)
    pub variables: Option<BTreeMap<String, VariableValue>>,
}

/// Response for listing canned responses
#[derive(Debug, Serialize)]
pub struct CannedResponseListResponse {
    /// Matching responses
    pub responses: Vec<CannedResponse>,

    /// Total count
    pub total: usize,
}

/// Response for the distinct-categories listing
#[derive(Debug, Serialize)]
pub struct CategoryListResponse {
    /// Distinct, non-empty categories in use
    pub categories: Vec<String>,
}
