use std::path::Path;

use calamine::{Data, Range, Reader, open_workbook_auto};
use chrono::{Duration, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::CourtMarker;
use crate::error::{Error, Result};
use crate::model::game::RawGame;
use crate::parse;

/// Header cell of the first column in the court row.
const TIME_HEADER: &str = "TIME";
/// Row index (0-based) of the court names.
const COURT_ROW: usize = 1;
/// Row index (0-based) where the first time slot starts.
const FIRST_SLOT_ROW: usize = 2;
/// Number of header cells searched for the season year.
const YEAR_SEARCH_CELLS: usize = 10;

static YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}").expect("valid regex"));
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2})(?:st|nd|rd|th)?\s+([A-Za-z]+)").expect("valid regex")
});
static COURT_NO: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
}

impl Cell {
    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty | Data::Error(_) => Cell::Empty,
            Data::String(s) if s.trim().is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            Data::Float(f) => Cell::Number(*f),
            Data::Int(i) => Cell::Number(*i as f64),
            other => Cell::Text(other.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Trimmed text form; whole numbers render without a fraction.
    pub fn text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.trim().to_string(),
            Cell::Number(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
            Cell::Number(f) => f.to_string(),
        }
    }

    pub fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(f) => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Empty => None,
        }
    }
}

/// One worksheet of a venue timesheet, addressed from A1.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub title: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(title: impl Into<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self { title: title.into(), rows }
    }

    /// Build from a calamine range, padding so indices stay absolute even
    /// when the used range does not start at A1.
    pub fn from_range(title: &str, range: &Range<Data>) -> Self {
        let (row_off, col_off) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));
        let mut rows: Vec<Vec<Cell>> = vec![Vec::new(); row_off];
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col_off];
            cells.extend(row.iter().map(Cell::from_data));
            rows.push(cells);
        }
        Self::new(title, rows)
    }

    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        static EMPTY: Cell = Cell::Empty;
        self.rows.get(row).and_then(|r| r.get(col)).unwrap_or(&EMPTY)
    }

    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Court names of the second row, without the `TIME` header.
    pub fn courts(&self) -> Vec<String> {
        (1..self.width())
            .map(|col| self.cell(COURT_ROW, col).text())
            .filter(|name| !name.is_empty() && name != TIME_HEADER)
            .collect()
    }

    /// Number of complete three-row time slots below the header rows.
    pub fn slot_count(&self) -> usize {
        self.rows.len().saturating_sub(FIRST_SLOT_ROW) / 3
    }
}

/// Load every worksheet of an Excel/ODS workbook.
#[instrument(level = "info", skip(path), fields(path = %path.display()))]
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>> {
    let mut workbook = open_workbook_auto(path)?;
    let sheets: Vec<Sheet> = workbook
        .worksheets()
        .iter()
        .map(|(name, range)| Sheet::from_range(name, range))
        .collect();
    info!(sheets = ?sheets.iter().map(|s| s.title.as_str()).collect::<Vec<_>>(), "Loaded workbook");
    Ok(sheets)
}

/// Spreadsheet-style reference ("B3") for a 0-based cell position.
pub fn cell_ref(row: usize, col: usize) -> String {
    let mut n = col + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push((b'A' + (n % 26) as u8) as char);
        n /= 26;
    }
    let col: String = letters.iter().rev().collect();
    format!("{}{}", col, row + 1)
}

/// Season year from the first cells of the header row.
pub fn infer_year(sheet: &Sheet) -> Result<i32> {
    for col in 0..YEAR_SEARCH_CELLS {
        let text = sheet.cell(0, col).text();
        if let Some(m) = YEAR.find(&text) {
            if let Ok(year) = m.as_str().parse::<i32>() {
                return Ok(year);
            }
        }
    }
    Err(Error::YearNotFound(sheet.title.clone()))
}

/// Round date from a header cell such as "7th August".
pub fn infer_date(sheet: &Sheet, year: i32) -> Result<NaiveDate> {
    let width = sheet.rows.first().map(Vec::len).unwrap_or(0);
    for col in 0..width {
        let text = sheet.cell(0, col).text();
        let Some(caps) = DAY_MONTH.captures(&text) else {
            continue;
        };
        let day: u32 = caps[1]
            .parse()
            .map_err(|_| Error::DateNotFound(sheet.title.clone()))?;
        let month = parse::month_from_name(&caps[2])?;
        return NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| Error::DateNotFound(sheet.title.clone()));
    }
    Err(Error::DateNotFound(sheet.title.clone()))
}

/// Map a court label onto `(location, court)` using the configured markers.
///
/// "Coburg Court 3" with marker "Coburg Court" becomes
/// `("Coburg Basketball Stadium", "Court 3")`; unmarked labels pass through
/// with an empty court.
pub fn split_court(label: &str, markers: &[CourtMarker]) -> (String, String) {
    let label = label.trim();
    for m in markers {
        if label.contains(m.marker.as_str()) {
            let court = COURT_NO
                .find(label)
                .map(|d| format!("Court {}", d.as_str()))
                .unwrap_or_default();
            return (m.venue.clone(), court);
        }
    }
    (label.to_string(), String::new())
}

/// Fixed inputs shared by every cell of one sheet.
#[derive(Debug, Clone, Copy)]
pub struct SlotContext<'a> {
    pub date: NaiveDate,
    pub duration: Duration,
    pub markers: &'a [CourtMarker],
}

/// The game in time slot `slot` on the court of column `col`, if any.
///
/// Each slot spans three rows: team matchups, then the slot time in the
/// first column, then the league labels.
pub fn game_at(sheet: &Sheet, slot: usize, col: usize, ctx: &SlotContext) -> Result<Option<RawGame>> {
    let teams_row = FIRST_SLOT_ROW + slot * 3;
    let time_row = teams_row + 1;
    let league_row = teams_row + 2;

    let time_cell = sheet.cell(time_row, 0);
    let teams_cell = sheet.cell(teams_row, col);
    if col == 0 || time_cell.is_empty() || teams_cell.is_empty() {
        return Ok(None);
    }

    let value = time_cell
        .number()
        .ok_or_else(|| Error::InvalidTimeSlot(time_cell.text()))?;
    let start = parse::decode_time_slot(value)?;
    let teams = parse::split_teams(&teams_cell.text())?;
    let league = parse::standardize_league(&sheet.cell(league_row, col).text())?;
    let (location, court) = split_court(&sheet.cell(COURT_ROW, col).text(), ctx.markers);

    debug!(cell = %cell_ref(teams_row, col), team1 = %teams.0, team2 = %teams.1, %league, "Processed game");
    Ok(Some(RawGame::new(ctx.date, start, ctx.duration, location, court, teams, league)))
}

/// Every game on the sheet, slot by slot and court by court.
///
/// Without a `date` the round date is read from the header row; without a
/// `year` as well, the year is read from the header too.
#[instrument(level = "info", skip(sheet, markers), fields(sheet = %sheet.title))]
pub fn extract_games(
    sheet: &Sheet,
    date: Option<NaiveDate>,
    year: Option<i32>,
    game_length_min: i64,
    markers: &[CourtMarker],
) -> Result<Vec<RawGame>> {
    let date = match date {
        Some(d) => d,
        None => {
            let year = match year {
                Some(y) => y,
                None => {
                    let y = infer_year(sheet)?;
                    warn!(year = y, "Extracted year from sheet header");
                    y
                }
            };
            infer_date(sheet, year)?
        }
    };

    let ctx = SlotContext { date, duration: Duration::minutes(game_length_min), markers };
    let slots = sheet.slot_count();
    debug!(slots, courts = ?sheet.courts(), "Processing sheet");

    let mut games = Vec::new();
    for slot in 0..slots {
        for col in 1..sheet.width() {
            if let Some(game) = game_at(sheet, slot, col, &ctx)? {
                games.push(game);
            }
        }
    }
    Ok(games)
}
