use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can stop a conversion run.
///
/// None of these are recovered from inside the library: a round is either
/// fully built and validated or the error is handed back to the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("not a month name: {0:?}")]
    InvalidMonth(String),

    #[error("matchup {0:?} does not split into exactly two teams on \"vs\"")]
    MalformedMatchup(String),

    #[error("league label {0:?} has no age grade")]
    MalformedLeague(String),

    #[error("time slot value {0:?} does not encode a valid time")]
    InvalidTimeSlot(String),

    #[error("could not find a year in the first row of sheet {0:?}")]
    YearNotFound(String),

    #[error("could not find a day and month in the first row of sheet {0:?}")]
    DateNotFound(String),

    #[error("no venue configured for {0:?}")]
    UnknownVenue(String),

    #[error("games found for teams outside the club roster: {}", .0.join(", "))]
    RosterMismatch(Vec<String>),

    #[error("no games found for club {0:?}")]
    NoClubGames(String),

    #[error("template references unknown placeholder {{{0}}}")]
    Template(String),

    #[error("unknown timezone {0:?}")]
    InvalidTimezone(String),

    #[error("fixture {id} has an unusable schedule: {reason}")]
    BadSchedule { id: String, reason: String },

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: ureq::Error,
    },

    #[error("unexpected page from {path}: {reason}")]
    BadPage { path: String, reason: String },

    #[error("missing setting: {0}")]
    MissingSetting(String),

    #[error("invalid config: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Workbook(#[from] calamine::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
