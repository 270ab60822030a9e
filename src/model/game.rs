use chrono::{Duration, NaiveDate, NaiveTime};

use crate::venue::VenueInfo;

/// One fixture as read from a source, before any club-specific enrichment.
#[derive(Clone, Debug, PartialEq)]
pub struct RawGame {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub location: String,
    pub court: String,
    pub team1: String,
    pub team2: String,
    pub league: String,
}

impl RawGame {
    /// Build a same-day game; the end time is always `start + duration`.
    pub fn new(
        date: NaiveDate,
        start_time: NaiveTime,
        duration: Duration,
        location: String,
        court: String,
        teams: (String, String),
        league: String,
    ) -> Self {
        RawGame {
            start_date: date,
            end_date: date,
            start_time,
            end_time: start_time + duration,
            location,
            court,
            team1: teams.0,
            team2: teams.1,
            league,
        }
    }
}

/// Extra per-game data only the fixture API knows about.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FixtureLinks {
    pub url_game: String,
    pub url_grade: String,
    pub lat: String,
    pub lon: String,
}

/// A game played by one of the club's own teams.
#[derive(Clone, Debug, PartialEq)]
pub struct ClubGame {
    pub game: RawGame,
    pub team_name: String,
    pub opponent: String,
    // Round label used in the event name ("Round 3", "Grading 1")
    pub round: Option<String>,
    pub links: Option<FixtureLinks>,
    // Venue already known from the source; otherwise resolved from the venue table
    pub venue: Option<VenueInfo>,
}

/// Placeholder entry for a roster team with nothing scheduled this round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ByeGame {
    pub team_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}
