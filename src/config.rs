//! Application-level configuration loading: club identity, engine tuning, sweep times
//! and collaborator endpoints.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use time::Time;
use tracing::{info, warn};

use crate::state::assignment::DEFAULT_CANDIDATE_WINDOW;

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/pegboard.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "PEGBOARD_CONFIG_PATH";
/// Environment variable that overrides the configured club.
const CLUB_ID_ENV: &str = "CLUB_ID";
const DEFAULT_CLUB_ID: &str = "default";
const DEFAULT_PERSIST_EVERY_TICKS: u64 = 1;
const DEFAULT_MIDNIGHT_SWEEP: Time = time::macros::time!(0:05);
const DEFAULT_MIDDAY_SWEEP: Time = time::macros::time!(12:00);

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Club whose session this server runs.
    pub club_id: String,
    /// Pool players considered after the fixed one by auto assignment.
    pub candidate_window: usize,
    /// Running clocks re-persist their elapsed time every this many ticks.
    pub persist_every_ticks: u64,
    /// UTC time of the daily purge.
    pub midnight_sweep: Time,
    /// UTC time of the safety sweep.
    pub midday_sweep: Time,
    /// Collaborator endpoints.
    pub integrations: IntegrationsConfig,
}

/// Endpoints of the external collaborators; unset ones are replaced by no-ops.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntegrationsConfig {
    /// Member roster endpoint.
    #[serde(default)]
    pub roster_url: Option<String>,
    /// Attendance endpoint receiving presence batches.
    #[serde(default)]
    pub attendance_url: Option<String>,
    /// Line-up suggestion endpoint.
    #[serde(default)]
    pub suggestions_url: Option<String>,
    /// Match history endpoint receiving finished results.
    #[serde(default)]
    pub match_history_url: Option<String>,
    /// Bearer token sent to every collaborator.
    #[serde(default)]
    pub api_token: Option<String>,
}

impl IntegrationsConfig {
    /// Whether no collaborator endpoint is configured at all.
    pub fn is_empty(&self) -> bool {
        self.roster_url.is_none()
            && self.attendance_url.is_none()
            && self.suggestions_url.is_none()
            && self.match_history_url.is_none()
    }
}

impl AppConfig {
    /// Load the configuration from disk, falling back to built-in defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        club_id = %app_config.club_id,
                        "loaded peg board config"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };
        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Some(club_id) = env::var(CLUB_ID_ENV).ok().filter(|v| !v.trim().is_empty()) {
            self.club_id = club_id;
        }
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            club_id: DEFAULT_CLUB_ID.to_string(),
            candidate_window: DEFAULT_CANDIDATE_WINDOW,
            persist_every_ticks: DEFAULT_PERSIST_EVERY_TICKS,
            midnight_sweep: DEFAULT_MIDNIGHT_SWEEP,
            midday_sweep: DEFAULT_MIDDAY_SWEEP,
            integrations: IntegrationsConfig::default(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    club_id: Option<String>,
    #[serde(default)]
    candidate_window: Option<usize>,
    #[serde(default)]
    persist_every_ticks: Option<u64>,
    #[serde(default)]
    midnight_sweep: Option<String>,
    #[serde(default)]
    midday_sweep: Option<String>,
    #[serde(default)]
    integrations: IntegrationsConfig,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = Self::default();
        Self {
            club_id: value
                .club_id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(defaults.club_id),
            candidate_window: value
                .candidate_window
                .filter(|w| *w > 0)
                .unwrap_or(defaults.candidate_window),
            persist_every_ticks: value
                .persist_every_ticks
                .filter(|n| *n > 0)
                .unwrap_or(defaults.persist_every_ticks),
            midnight_sweep: parse_sweep("midnight_sweep", value.midnight_sweep)
                .unwrap_or(defaults.midnight_sweep),
            midday_sweep: parse_sweep("midday_sweep", value.midday_sweep)
                .unwrap_or(defaults.midday_sweep),
            integrations: value.integrations,
        }
    }
}

fn parse_sweep(field: &'static str, raw: Option<String>) -> Option<Time> {
    let raw = raw?;
    let parsed = parse_hh_mm(&raw);
    if parsed.is_none() {
        warn!(field, value = %raw, "invalid sweep time; expected HH:MM");
    }
    parsed
}

/// Parse a `HH:MM` wall-clock time.
pub fn parse_hh_mm(raw: &str) -> Option<Time> {
    let (hours, minutes) = raw.trim().split_once(':')?;
    if hours.len() != 2 || minutes.len() != 2 {
        return None;
    }
    Time::from_hms(hours.parse().ok()?, minutes.parse().ok()?, 0).ok()
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_config_fills_missing_fields_with_defaults() {
        let raw: RawConfig = serde_json::from_value(serde_json::json!({
            "club_id": "smashers",
            "midday_sweep": "13:30",
            "integrations": {"roster_url": "http://roster"}
        }))
        .unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.club_id, "smashers");
        assert_eq!(config.candidate_window, DEFAULT_CANDIDATE_WINDOW);
        assert_eq!(config.persist_every_ticks, 1);
        assert_eq!(config.midday_sweep, time::macros::time!(13:30));
        assert_eq!(config.midnight_sweep, DEFAULT_MIDNIGHT_SWEEP);
        assert_eq!(config.integrations.roster_url.as_deref(), Some("http://roster"));
    }

    #[test]
    fn invalid_values_fall_back() {
        let raw: RawConfig =
            serde_json::from_str(r#"{"candidate_window": 0, "midnight_sweep": "25:00"}"#).unwrap();
        let config = AppConfig::from(raw);
        assert_eq!(config.candidate_window, DEFAULT_CANDIDATE_WINDOW);
        assert_eq!(config.midnight_sweep, DEFAULT_MIDNIGHT_SWEEP);
    }

    #[test]
    fn hh_mm_parsing() {
        assert_eq!(parse_hh_mm("00:05"), Some(time::macros::time!(0:05)));
        assert_eq!(parse_hh_mm("7:05"), None);
        assert_eq!(parse_hh_mm("noon"), None);
    }
}
