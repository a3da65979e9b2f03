//! Badminton score validation and match results.

use thiserror::Error;

use crate::state::{assignment::Category, court::CourtNo, pool::Player};

/// Points needed to win a game without deuce.
const GAME_POINT: u32 = 21;
/// Hard cap reached after extended deuce.
const SCORE_CAP: u32 = 30;

/// Reasons a submitted score is not a finished game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ScoreError {
    /// Neither side reached 21.
    #[error("the winning side must reach 21 points")]
    ScoreTooLow,
    /// A game must be won by two clear points below the cap.
    #[error("the winner needs a two point lead")]
    MissingTwoPointLead,
    /// More than 30 points.
    #[error("scores cannot exceed 30 points")]
    ScoreCapExceeded,
    /// Missing, non-numeric or negative input.
    #[error("scores must be whole numbers between 0 and 30")]
    NonNumericInput,
    /// The game would have ended earlier than the submitted score.
    #[error("this score cannot be reached in a game")]
    UnreachableScore,
}

impl ScoreError {
    /// Stable reason code exposed to clients.
    pub fn code(&self) -> &'static str {
        match self {
            ScoreError::ScoreTooLow => "ScoreTooLow",
            ScoreError::MissingTwoPointLead => "MissingTwoPointLead",
            ScoreError::ScoreCapExceeded => "ScoreCapExceeded",
            ScoreError::NonNumericInput => "NonNumericInput",
            ScoreError::UnreachableScore => "UnreachableScore",
        }
    }
}

/// Side of the court.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Team {
    /// Slots 0 and 1.
    A,
    /// Slots 2 and 3.
    B,
}

/// A validated terminal score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    team_a: u32,
    team_b: u32,
}

impl FinalScore {
    /// Validate raw user input for both sides.
    pub fn parse(team_a: &str, team_b: &str) -> Result<Self, ScoreError> {
        Self::new(parse_points(team_a)?, parse_points(team_b)?)
    }

    /// Validate numeric points against the rally scoring rules.
    pub fn new(team_a: u32, team_b: u32) -> Result<Self, ScoreError> {
        let max = team_a.max(team_b);
        let min = team_a.min(team_b);
        let diff = max - min;

        match max {
            m if m < GAME_POINT => Err(ScoreError::ScoreTooLow),
            GAME_POINT if diff >= 2 => Ok(()),
            GAME_POINT => Err(ScoreError::MissingTwoPointLead),
            m if m < SCORE_CAP => match diff {
                2 => Ok(()),
                0 | 1 => Err(ScoreError::MissingTwoPointLead),
                _ => Err(ScoreError::UnreachableScore),
            },
            SCORE_CAP if min == 28 || min == 29 => Ok(()),
            SCORE_CAP => Err(ScoreError::UnreachableScore),
            _ => Err(ScoreError::ScoreCapExceeded),
        }?;

        Ok(Self { team_a, team_b })
    }

    /// Points of team A.
    pub fn team_a(&self) -> u32 {
        self.team_a
    }

    /// Points of team B.
    pub fn team_b(&self) -> u32 {
        self.team_b
    }

    /// Side with more points.
    pub fn winner(&self) -> Team {
        if self.team_a > self.team_b {
            Team::A
        } else {
            Team::B
        }
    }

    /// Zero-padded `NN/NN`, team A first.
    pub fn formatted(&self) -> String {
        format!("{:02}/{:02}", self.team_a, self.team_b)
    }
}

fn parse_points(raw: &str) -> Result<u32, ScoreError> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(ScoreError::NonNumericInput);
    }
    // Digit strings too long for u32 are far above the cap anyway.
    Ok(raw.parse::<u32>().unwrap_or(u32::MAX))
}

/// Outcome of a finished match, forwarded to match history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Court the match was played on.
    pub court_no: CourtNo,
    /// Category, if assigned.
    pub category: Option<Category>,
    /// Occupants of slots 0 and 1.
    pub team_a: Vec<Player>,
    /// Occupants of slots 2 and 3.
    pub team_b: Vec<Player>,
    /// Validated final score.
    pub score: FinalScore,
    /// Clock reading at the end, in whole seconds.
    pub duration_seconds: u64,
}

impl MatchResult {
    /// Winning side.
    pub fn winner(&self) -> Team {
        self.score.winner()
    }

    /// Score as filed, `NN/NN`.
    pub fn final_score(&self) -> String {
        self.score.formatted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verdict(a: u32, b: u32) -> Result<(), ScoreError> {
        FinalScore::new(a, b).map(|_| ())
    }

    #[test]
    fn reference_table() {
        assert_eq!(verdict(21, 19), Ok(()));
        assert_eq!(verdict(21, 20), Err(ScoreError::MissingTwoPointLead));
        assert_eq!(verdict(22, 20), Ok(()));
        assert_eq!(verdict(22, 21), Err(ScoreError::MissingTwoPointLead));
        assert_eq!(verdict(29, 27), Ok(()));
        assert_eq!(verdict(30, 29), Ok(()));
        assert_eq!(verdict(30, 27), Err(ScoreError::UnreachableScore));
        assert_eq!(verdict(20, 18), Err(ScoreError::ScoreTooLow));
    }

    #[test]
    fn symmetric_in_team_order() {
        assert_eq!(verdict(19, 21), Ok(()));
        assert_eq!(verdict(28, 30), Ok(()));
        assert_eq!(verdict(20, 21), Err(ScoreError::MissingTwoPointLead));
    }

    #[test]
    fn cap_and_deuce_edges() {
        assert_eq!(verdict(31, 29), Err(ScoreError::ScoreCapExceeded));
        assert_eq!(verdict(30, 30), Err(ScoreError::UnreachableScore));
        assert_eq!(verdict(25, 20), Err(ScoreError::UnreachableScore));
        assert_eq!(verdict(21, 0), Ok(()));
    }

    #[test]
    fn raw_input_must_be_numeric() {
        assert_eq!(FinalScore::parse("", "21"), Err(ScoreError::NonNumericInput));
        assert_eq!(FinalScore::parse("abc", "21"), Err(ScoreError::NonNumericInput));
        assert_eq!(FinalScore::parse("-3", "21"), Err(ScoreError::NonNumericInput));
        assert_eq!(
            FinalScore::parse("99999999999", "21"),
            Err(ScoreError::ScoreCapExceeded)
        );
        assert!(FinalScore::parse(" 21 ", "5").is_ok());
    }

    #[test]
    fn formatting_and_winner() {
        let score = FinalScore::new(5, 21).unwrap();
        assert_eq!(score.formatted(), "05/21");
        assert_eq!(score.winner(), Team::B);
    }
}
