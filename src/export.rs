use std::collections::HashMap;
use std::io;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord};
use tracing::{info, instrument};

use crate::error::{Error, Result};
use crate::model::game::RawGame;
use crate::parse;

const COL_DATE: &str = "game date";
const COL_TEAM_A: &str = "team a";
const COL_TEAM_B: &str = "team b";
const COL_TIME: &str = "time";
const COL_VENUE: &str = "venue";
const COL_SURFACE: &str = "playing surface";
const COL_GRADE: &str = "grade";

/// Games on `date` involving `club` from a PlayHQ fixture CSV export.
#[instrument(level = "info", skip(path), fields(path = %path.display()))]
pub fn read_export_path(path: &Path, date: NaiveDate, club: &str, game_length_min: i64) -> Result<Vec<RawGame>> {
    let file = std::fs::File::open(path)?;
    read_export(file, date, club, game_length_min)
}

pub fn read_export<R: io::Read>(reader: R, date: NaiveDate, club: &str, game_length_min: i64) -> Result<Vec<RawGame>> {
    let mut rdr = ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let headers: HashMap<String, usize> = rdr
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| (h.to_lowercase(), i))
        .collect();
    for col in [COL_DATE, COL_TEAM_A, COL_TEAM_B, COL_TIME, COL_VENUE, COL_SURFACE, COL_GRADE] {
        if !headers.contains_key(col) {
            return Err(Error::MissingSetting(format!("column {:?} in PlayHQ export", col)));
        }
    }
    let get = |rec: &StringRecord, col: &str| -> String {
        headers.get(col).and_then(|i| rec.get(*i)).unwrap_or("").to_string()
    };

    let club_upper = club.to_uppercase();
    let mut games = Vec::new();
    for rec in rdr.records() {
        let rec = rec?;
        let game_date = NaiveDate::parse_from_str(&get(&rec, COL_DATE), "%d/%m/%Y").map_err(|e| {
            Error::BadSchedule { id: get(&rec, COL_DATE), reason: e.to_string() }
        })?;
        let team_a = get(&rec, COL_TEAM_A);
        let team_b = get(&rec, COL_TEAM_B);
        if game_date != date
            || !(team_a.to_uppercase().contains(&club_upper) || team_b.to_uppercase().contains(&club_upper))
        {
            continue;
        }

        let time = get(&rec, COL_TIME);
        let start = NaiveTime::parse_from_str(&time, "%H:%M:%S")
            .map_err(|_| Error::InvalidTimeSlot(time.clone()))?;
        games.push(RawGame::new(
            game_date,
            start,
            Duration::minutes(game_length_min),
            get(&rec, COL_VENUE),
            get(&rec, COL_SURFACE),
            (team_a, team_b),
            league_from_grade(&get(&rec, COL_GRADE))?,
        ));
    }

    info!(games = games.len(), %club, "Extracted club games from PlayHQ export");
    Ok(games)
}

/// `"Saturday U16 Girls Division 1/2"` → `"U16 Girls"`.
pub fn league_from_grade(grade: &str) -> Result<String> {
    let tokens: Vec<&str> = grade.split_whitespace().collect();
    let pos = tokens
        .iter()
        .position(|t| {
            let mut chars = t.chars();
            matches!(chars.next(), Some('U' | 'u')) && chars.as_str().parse::<u32>().is_ok()
        })
        .ok_or_else(|| Error::MalformedLeague(grade.to_string()))?;
    let gender = tokens.get(pos + 1).ok_or_else(|| Error::MalformedLeague(grade.to_string()))?;
    Ok(format!("{} {}", tokens[pos].to_uppercase(), parse::title_case(gender)))
}
