use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::club::Round;
use crate::error::{Error, Result};
use crate::model::game::{ByeGame, ClubGame};
use crate::model::record::{CsvVariant, OutputRecord};
use crate::venue::VenueTable;

/// Named values substituted into description and event-name templates.
pub type Placeholders<'a> = HashMap<&'static str, &'a str>;

/// Substitute `{name}` placeholders; `{{` and `}}` are literal braces.
/// A placeholder with no value is an error, never left in the output.
pub fn render(template: &str, values: &Placeholders) -> Result<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => return Err(Error::Template(name)),
                    }
                }
                let value = values
                    .get(name.trim())
                    .ok_or_else(|| Error::Template(name.clone()))?;
                out.push_str(value);
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

/// TeamApp event switches applied to every played game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub rsvp: bool,
    pub comments: bool,
    pub attendance_tracking: bool,
    pub duty_roster: bool,
    pub ticketing: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { rsvp: true, comments: true, attendance_tracking: true, duty_roster: true, ticketing: false }
    }
}

/// Turns a validated round into TeamApp rows.
#[derive(Debug, Clone)]
pub struct RecordBuilder<'a> {
    pub description: &'a str,
    pub bye_description: &'a str,
    pub event_name: &'a str,
    /// Round label for sources that do not carry one ("Grading 1").
    pub round_label: Option<&'a str>,
    pub options: Options,
}

impl RecordBuilder<'_> {
    pub fn build(&self, round: &Round, venues: &VenueTable) -> Result<Vec<OutputRecord>> {
        let mut records = Vec::with_capacity(round.len());
        for game in &round.games {
            records.push(self.game_record(game, venues)?);
        }
        for bye in &round.byes {
            records.push(self.bye_record(bye));
        }
        Ok(records)
    }

    fn game_record(&self, game: &ClubGame, venues: &VenueTable) -> Result<OutputRecord> {
        let known = match &game.venue {
            Some(v) => v.clone(),
            None => venues.lookup(&game.game.location)?.clone(),
        };
        // Access tips come from the venue table even when the source names the venue
        let tip = known.tip.clone().or_else(|| {
            venues.lookup(&known.name).ok().and_then(|v| v.tip.clone())
        });
        let venue = crate::venue::VenueInfo { tip, ..known };
        let address_tips = venue.address_tips();

        info!(
            team = %game.team_name,
            opponent = %game.opponent,
            start = %game.game.start_time,
            venue = %venue.name,
            "Found game for club team"
        );

        let round = game.round.as_deref().or(self.round_label);
        let event_name = match round {
            Some(r) => {
                let mut values = Placeholders::new();
                values.insert("team_name", &game.team_name);
                values.insert("opponent", &game.opponent);
                values.insert("round", r);
                render(self.event_name, &values)?
            }
            None => game.team_name.clone(),
        };

        let coord;
        let mut values = Placeholders::new();
        values.insert("opponent", &game.opponent);
        values.insert("venue", &venue.name);
        values.insert("court", &game.game.court);
        values.insert("address", &venue.address);
        values.insert("address_tips", &address_tips);
        if let Some(links) = &game.links {
            coord = format!("{},{}", links.lat, links.lon);
            values.insert("url_game", &links.url_game);
            values.insert("url_grade", &links.url_grade);
            values.insert("lat", &links.lat);
            values.insert("lon", &links.lon);
            values.insert("coord", &coord);
        }
        let description = render(self.description, &values)?;

        Ok(OutputRecord {
            event_name,
            team_name: game.team_name.clone(),
            start_date: game.game.start_date,
            end_date: game.game.end_date,
            start_time: game.game.start_time,
            end_time: game.game.end_time,
            description,
            location: venue.address.clone(),
            access_groups: game.team_name.clone(),
            rsvp: self.options.rsvp,
            comments: self.options.comments,
            attendance_tracking: self.options.attendance_tracking,
            duty_roster: self.options.duty_roster,
            ticketing: self.options.ticketing,
            reference_id: String::new(),
        })
    }

    fn bye_record(&self, bye: &ByeGame) -> OutputRecord {
        OutputRecord {
            event_name: format!("{} - BYE", bye.team_name),
            team_name: bye.team_name.clone(),
            start_date: bye.date,
            end_date: bye.date,
            start_time: bye.start_time,
            end_time: bye.end_time,
            description: self.bye_description.to_string(),
            location: String::new(),
            access_groups: bye.team_name.clone(),
            rsvp: false,
            comments: false,
            attendance_tracking: false,
            duty_roster: false,
            ticketing: false,
            reference_id: String::new(),
        }
    }
}

/// Write `records` as a TeamApp import CSV with a header row.
pub fn write_records<W: io::Write>(records: &[OutputRecord], variant: CsvVariant, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(variant.columns())?;
    for record in records {
        wtr.write_record(record.fields(variant))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Schedule and event file paths for a round.
///
/// `2022-05-14.Magic_Grading-2_SCHEDULE-<stem>.csv` and the matching
/// `_EVENT-` file.
pub fn output_paths(dir: &Path, date: NaiveDate, club: &str, id: Option<&str>, stem: &str) -> (PathBuf, PathBuf) {
    let mut prefix = format!("{}.{}", date.format("%Y-%m-%d"), club);
    if let Some(id) = id {
        prefix.push('_');
        prefix.push_str(&id.replace(' ', "-"));
    }
    (
        dir.join(format!("{}_SCHEDULE-{}.csv", prefix, stem)),
        dir.join(format!("{}_EVENT-{}.csv", prefix, stem)),
    )
}

/// Write both import files for `records`.
pub fn write_files(records: &[OutputRecord], schedule: &Path, event: &Path) -> Result<()> {
    if records.is_empty() {
        warn!("No records to write");
    }
    write_records(records, CsvVariant::Schedule, std::fs::File::create(schedule)?)?;
    info!(path = %schedule.display(), records = records.len(), "Wrote TeamApp schedule file");
    write_records(records, CsvVariant::Event, std::fs::File::create(event)?)?;
    info!(path = %event.display(), records = records.len(), "Wrote TeamApp event file");
    Ok(())
}
