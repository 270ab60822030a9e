use chrono::{DateTime, Duration, NaiveDate};
use chrono_tz::Tz;
use tracing::{info, instrument};

use crate::club::{self, ByeWindow, Round};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::game::{ClubGame, RawGame};
use crate::model::record::OutputRecord;
use crate::playhq::{PlayHq, Transport};
use crate::sheet::{self, Sheet};
use crate::teamapp::{Options, RecordBuilder};

/// A validated round and the TeamApp rows built from it.
#[derive(Debug, Clone)]
pub struct Conversion {
    pub round: Round,
    pub records: Vec<OutputRecord>,
}

/// Settings for converting one timesheet round.
#[derive(Debug, Clone)]
pub struct SheetRun<'a> {
    pub club: &'a str,
    /// Round date; read from each sheet header when absent.
    pub date: Option<NaiveDate>,
    pub round_label: Option<&'a str>,
    pub description: &'a str,
    pub options: Options,
}

/// Settings for converting one PlayHQ round.
#[derive(Debug, Clone)]
pub struct ApiRun<'a> {
    pub from: DateTime<Tz>,
    pub to: Option<DateTime<Tz>>,
    pub statuses: Option<&'a [String]>,
    pub game_length_min: i64,
    pub round_label: Option<&'a str>,
    pub description: &'a str,
    pub options: Options,
}

/// Convert all sheets of a venue timesheet.
#[instrument(level = "info", skip_all, fields(club = %run.club))]
pub fn convert_sheets(sheets: &[Sheet], config: &Config, run: &SheetRun) -> Result<Conversion> {
    let mut raw = Vec::new();
    for s in sheets {
        info!(sheet = %s.title, "Processing sheet");
        raw.extend(sheet::extract_games(s, run.date, None, config.game_length_min, &config.court_markers)?);
    }
    info!(games = raw.len(), "Extracted total games");
    convert_raw_games(&raw, config, run)
}

/// Convert fixtures already read from a timesheet or a PlayHQ export.
pub fn convert_raw_games(raw: &[RawGame], config: &Config, run: &SheetRun) -> Result<Conversion> {
    let games = club::derive_club_games(raw, run.club);
    info!(games = games.len(), club = %run.club, "Filtered club games");
    let Some(first) = games.first() else {
        return Err(Error::NoClubGames(run.club.to_string()));
    };
    let date = run.date.unwrap_or(first.game.start_date);

    let round = Round::assemble(date, games, &config.roster, ByeWindow::timesheet())?;
    let builder = RecordBuilder {
        description: run.description,
        bye_description: &config.bye_description,
        event_name: &config.event_name,
        round_label: run.round_label,
        options: run.options,
    };
    finish(round, &builder, config)
}

/// Convert the fixtures of `teams` (`(team_id, team_name)`) fetched from PlayHQ.
#[instrument(level = "info", skip_all, fields(from = %run.from))]
pub fn convert_playhq<T: Transport>(
    client: &PlayHq<T>,
    teams: &[(String, String)],
    config: &Config,
    run: &ApiRun,
) -> Result<Conversion> {
    let fixtures = client.games(teams, run.from, run.to, run.statuses)?;
    let duration = Duration::minutes(run.game_length_min);
    let games: Vec<ClubGame> = fixtures.into_iter().map(|f| f.into_club_game(duration)).collect();
    if games.is_empty() {
        info!("No games scheduled in range; every team has a BYE");
    }

    let round = Round::assemble(run.from.date_naive(), games, &config.roster, ByeWindow::midnight())?;
    let builder = RecordBuilder {
        description: run.description,
        bye_description: &config.bye_description,
        event_name: &config.event_name,
        round_label: run.round_label,
        options: run.options,
    };
    finish(round, &builder, config)
}

fn finish(round: Round, builder: &RecordBuilder, config: &Config) -> Result<Conversion> {
    let records = builder.build(&round, &config.venues)?;
    round.validate(&config.roster)?;
    report(&records);
    Ok(Conversion { round, records })
}

fn report(records: &[OutputRecord]) {
    let mut sorted: Vec<&OutputRecord> = records.iter().collect();
    sorted.sort_by(|a, b| a.team_name.cmp(&b.team_name));
    for r in sorted {
        if r.location.is_empty() {
            info!(team = %r.team_name, "BYE");
        } else {
            info!(team = %r.team_name, event = %r.event_name, start = %r.start_time, location = %r.location, "Game");
        }
    }
}
