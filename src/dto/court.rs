//! Request and response bodies of the court routes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::board::{BoardView, MatchResultView};

/// Live score text shown on a court while the match runs.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ScoreDraftRequest {
    /// Free-form score text.
    #[validate(length(max = 32))]
    #[serde(default)]
    pub score: String,
}

/// A score field as typed by the user: text or a bare number.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ScoreInput {
    /// Bare JSON number.
    Number(i64),
    /// Score typed as text.
    Text(String),
}

impl ScoreInput {
    /// Raw text handed to the score validator.
    pub fn into_text(self) -> String {
        match self {
            ScoreInput::Number(value) => value.to_string(),
            ScoreInput::Text(value) => value,
        }
    }
}

/// Final score of both teams. Missing fields are rejected by the score validator.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct FinishMatchRequest {
    /// Points of team A.
    #[serde(default)]
    pub team_a: Option<ScoreInput>,
    /// Points of team B.
    #[serde(default)]
    pub team_b: Option<ScoreInput>,
}

impl FinishMatchRequest {
    /// Both scores as text, missing ones empty.
    pub fn into_texts(self) -> (String, String) {
        (
            self.team_a.map(ScoreInput::into_text).unwrap_or_default(),
            self.team_b.map(ScoreInput::into_text).unwrap_or_default(),
        )
    }
}

/// Outcome of a finalized match.
#[derive(Debug, Serialize, ToSchema)]
pub struct FinishMatchResponse {
    /// The filed result.
    pub result: MatchResultView,
    /// Board after the players returned to the pool.
    pub board: BoardView,
}

/// Response to a court creation.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourtCreatedResponse {
    /// Number given to the new court.
    pub court_no: u32,
    /// Board including the new court.
    pub board: BoardView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_fields_accept_numbers_and_text() {
        let request: FinishMatchRequest =
            serde_json::from_str(r#"{"team_a": 21, "team_b": " 19 "}"#).unwrap();
        assert_eq!(request.into_texts(), ("21".to_string(), " 19 ".to_string()));

        let request: FinishMatchRequest = serde_json::from_str(r#"{"team_a": -3}"#).unwrap();
        assert_eq!(request.into_texts(), ("-3".to_string(), String::new()));
    }
}
