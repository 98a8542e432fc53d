//! Variable substitution engine for canned response content.
//!
//! Rewriting is a pure function of `(content, context, now)`: built-in
//! defaults are overlaid with caller-supplied variables, then every
//! `{{key}}` token whose key matches case-insensitively is replaced with
//! the value's string form. Unresolvable tokens pass through unchanged and
//! substituted values are never re-scanned.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::types::{CannedResponse, VariableValue};

/// Fallback when no customer name is supplied
const DEFAULT_CUSTOMER_NAME: &str = "Customer";

/// Fallback when no agent name is supplied
const DEFAULT_AGENT_NAME: &str = "Support Agent";

/// Contextual inputs for rendering a piece of canned content.
///
/// Every field is optional; absent fields fall back to the built-in
/// defaults. `variables` wins over everything, including the built-ins,
/// and may introduce arbitrary extra keys.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RenderContext {
    pub customer_name: Option<String>,
    pub customer_email: Option<String>,
    pub agent_name: Option<String>,
    pub ticket_id: Option<String>,
    pub ticket_subject: Option<String>,
    pub organization_name: Option<String>,

    /// Caller-supplied variable overrides
    #[serde(default)]
    pub variables: BTreeMap<String, VariableValue>,
}

/// Render content with the effective variable set, stamping date/time
/// defaults from the wall clock.
pub fn render_content(content: &str, ctx: &RenderContext) -> String {
    render_content_at(content, ctx, Utc::now())
}

/// Render content with an explicit substitution instant.
///
/// `current_date` and `current_time` are the only time-dependent defaults;
/// passing `now` keeps rendering fully deterministic.
pub fn render_content_at(content: &str, ctx: &RenderContext, now: DateTime<Utc>) -> String {
    let mut variables = default_variables(ctx, now);
    overlay(&mut variables, &ctx.variables);

    substitute_tokens(content, &variables)
}

/// Render a stored response, layering its stored variable defaults between
/// the built-ins and the caller's overrides.
pub fn render_response_at(
    response: &CannedResponse,
    ctx: &RenderContext,
    now: DateTime<Utc>,
) -> String {
    let mut variables = default_variables(ctx, now);
    overlay(&mut variables, &response.variables);
    overlay(&mut variables, &ctx.variables);

    substitute_tokens(&response.content, &variables)
}

/// Build the built-in default set, keyed by lowercase variable name.
fn default_variables(ctx: &RenderContext, now: DateTime<Utc>) -> BTreeMap<String, String> {
    let mut variables = BTreeMap::new();

    variables.insert(
        "customer_name".to_string(),
        ctx.customer_name
            .clone()
            .unwrap_or_else(|| DEFAULT_CUSTOMER_NAME.to_string()),
    );
    variables.insert(
        "customer_email".to_string(),
        ctx.customer_email.clone().unwrap_or_default(),
    );
    variables.insert(
        "agent_name".to_string(),
        ctx.agent_name
            .clone()
            .unwrap_or_else(|| DEFAULT_AGENT_NAME.to_string()),
    );
    variables.insert(
        "ticket_id".to_string(),
        ctx.ticket_id.clone().unwrap_or_default(),
    );
    variables.insert(
        "ticket_subject".to_string(),
        ctx.ticket_subject.clone().unwrap_or_default(),
    );
    variables.insert(
        "organization_name".to_string(),
        ctx.organization_name.clone().unwrap_or_default(),
    );
    variables.insert(
        "current_date".to_string(),
        now.format("%Y-%m-%d").to_string(),
    );
    variables.insert("current_time".to_string(), now.format("%H:%M").to_string());

    variables
}

/// Overlay `values` onto the effective set; keys are matched lowercase.
fn overlay(variables: &mut BTreeMap<String, String>, values: &BTreeMap<String, VariableValue>) {
    for (key, value) in values {
        variables.insert(key.to_lowercase(), value.to_string());
    }
}

/// Replace every `{{key}}` token with its effective value.
///
/// Key lookup ignores case; braces and the key text are literal (no
/// trimming). Tokens without a matching key are emitted unchanged. The
/// output is built in a single forward pass, so substituted values are
/// never re-scanned.
fn substitute_tokens(content: &str, variables: &BTreeMap<String, String>) -> String {
    let mut output = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("{{") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];

        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match variables.get(&key.to_lowercase()) {
                    Some(value) => output.push_str(value),
                    None => {
                        output.push_str("{{");
                        output.push_str(key);
                        output.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                // Unterminated token, emit the tail literally
                output.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    output.push_str(rest);
    output
}
