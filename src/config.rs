use std::collections::BTreeSet;
use std::env;
use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::venue::VenueTable;

pub const DEFAULT_DESCRIPTION: &str = "Opponent: {opponent}
Venue: {venue} {court}
Address: {address}{address_tips}";

pub const DEFAULT_PLAYHQ_DESCRIPTION: &str = "Opponent: {opponent}
Venue: {venue} ({court})
Address: {address}{address_tips}
Google Maps coord: https://maps.google.com/?q={coord}
Check the game in PlayHQ: {url_game}
Check the round in PlayHQ: {url_grade}";

pub const DEFAULT_BYE_DESCRIPTION: &str = "Sorry, no game for the team in this round.";

const API_KEY_VAR: &str = "PLAYHQ_API_KEY";

fn default_game_length() -> i64 {
    40
}

fn default_api_game_length() -> i64 {
    45
}

fn default_description() -> String {
    DEFAULT_DESCRIPTION.to_string()
}

fn default_playhq_description() -> String {
    DEFAULT_PLAYHQ_DESCRIPTION.to_string()
}

fn default_bye_description() -> String {
    DEFAULT_BYE_DESCRIPTION.to_string()
}

fn default_event_name() -> String {
    "{team_name} - {round}".to_string()
}

fn default_api_url() -> String {
    "https://api.playhq.com/v1".to_string()
}

/// Season configuration for one club, loaded from a TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Name that marks the club's teams in fixture sources ("Magic").
    pub club: String,
    /// Exact team names the club fields this season ("U12 Boys Gold").
    pub roster: BTreeSet<String>,
    #[serde(default = "default_game_length")]
    pub game_length_min: i64,
    #[serde(default = "default_description")]
    pub description: String,
    #[serde(default = "default_bye_description")]
    pub bye_description: String,
    #[serde(default = "default_event_name")]
    pub event_name: String,
    #[serde(default)]
    pub court_markers: Vec<CourtMarker>,
    #[serde(default)]
    pub venues: VenueTable,
    #[serde(default)]
    pub playhq: Option<PlayHqConfig>,
}

/// A court label in the timesheet that stands for courts of one stadium,
/// e.g. "Coburg Court 3" → Coburg Basketball Stadium, Court 3.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourtMarker {
    pub marker: String,
    pub venue: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHqConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub tenant: String,
    pub org_id: String,
    pub season: String,
    pub timezone: String,
    #[serde(default = "default_api_game_length")]
    pub game_length_min: i64,
    #[serde(default = "default_playhq_description")]
    pub description: String,
    #[serde(default)]
    pub statuses: Option<Vec<String>>,
}

impl Config {
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn playhq(&self) -> Result<&PlayHqConfig> {
        self.playhq
            .as_ref()
            .ok_or_else(|| Error::MissingSetting("[playhq] section".to_string()))
    }
}

impl PlayHqConfig {
    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| Error::InvalidTimezone(self.timezone.clone()))
    }

    /// API key from the config file, or the `PLAYHQ_API_KEY` environment variable.
    pub fn api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }
        env::var(API_KEY_VAR).map_err(|_| Error::MissingSetting(API_KEY_VAR.to_string()))
    }
}
