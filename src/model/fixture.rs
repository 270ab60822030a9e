use chrono::DateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// One page of any PlayHQ list endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
    pub metadata: PageMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub has_more: bool,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// A fixture entry of `GET /teams/:id/fixture`, as nested in the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub url: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default)]
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub grade: Option<Grade>,
    #[serde(default)]
    pub round: Option<RoundInfo>,
    #[serde(default)]
    pub schedule: Option<Schedule>,
    #[serde(default)]
    pub venue: Option<Venue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Competitor {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Grade {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub abbreviated_name: String,
    #[serde(default)]
    pub is_final_round: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub timezone: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub surface_name: String,
    #[serde(default)]
    pub surface_abbreviation: String,
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub postcode: String,
    #[serde(default)]
    pub suburb: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub country: String,
    // Sent as numbers by some tenants and strings by others
    #[serde(default)]
    pub latitude: serde_json::Value,
    #[serde(default)]
    pub longitude: serde_json::Value,
}

/// A scheduled fixture with nested groups flattened into `<group>_<field>`
/// names and the kick-off resolved to a zoned timestamp.
#[derive(Debug, Clone)]
pub struct FixtureRow {
    pub id: String,
    pub status: String,
    pub url: String,
    pub created_at: Option<DateTime<Tz>>,
    pub updated_at: Option<DateTime<Tz>>,
    pub competitors: Vec<Competitor>,
    pub grade_id: String,
    pub grade_name: String,
    pub grade_url: String,
    pub round_id: String,
    pub round_name: String,
    pub round_abbreviated_name: String,
    pub round_is_final_round: bool,
    pub schedule_date: String,
    pub schedule_time: String,
    pub schedule_timezone: String,
    pub schedule_timestamp: DateTime<Tz>,
    pub venue_id: String,
    pub venue_name: String,
    pub venue_surface_name: String,
    pub venue_surface_abbreviation: String,
    pub venue_address_line1: String,
    pub venue_address_postcode: String,
    pub venue_address_suburb: String,
    pub venue_address_state: String,
    pub venue_address_country: String,
    pub venue_address_latitude: String,
    pub venue_address_longitude: String,
}

/// A fixture row tagged with the club team it was fetched for.
#[derive(Debug, Clone)]
pub struct TeamFixture {
    pub team_id: String,
    pub team_name: String,
    pub row: FixtureRow,
}
