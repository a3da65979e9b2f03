//! Request bodies of the assignment routes.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::state::assignment::Category;

/// Draw an auto-assignment preview for the first free court.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct AutoAssignRequest {
    /// Category the line-up must satisfy.
    pub category: Category,
    /// Draw from the whole pool instead of the next few players after the first one.
    #[serde(default)]
    pub full_pool: bool,
}

/// Ask the suggestion service for ranked line-ups.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SmartAssignRequest {
    /// Category the suggestions must satisfy.
    pub category: Category,
}

fn default_start_clock() -> bool {
    true
}

/// Confirm one option of the pending preview.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ConfirmPlanRequest {
    /// Index into the preview options; auto previews have exactly one.
    #[serde(default)]
    #[validate(range(max = 16))]
    pub option: usize,
    /// Start the match clock right away.
    #[serde(default = "default_start_clock")]
    pub start_clock: bool,
}

impl Default for ConfirmPlanRequest {
    fn default() -> Self {
        Self {
            option: 0,
            start_clock: default_start_clock(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_defaults_start_the_clock() {
        let request: ConfirmPlanRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request.option, 0);
        assert!(request.start_clock);
    }

    #[test]
    fn auto_request_accepts_category_names() {
        let request: AutoAssignRequest = serde_json::from_str(r#"{"category":"XD"}"#).unwrap();
        assert_eq!(request.category, Category::XD);
        assert!(!request.full_pool);
    }
}
