use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, info, info_span, instrument, warn};

use crate::error::{Error, Result};
use crate::model::fixture::{Fixture, FixtureRow, Page, TeamFixture};
use crate::model::game::{ClubGame, FixtureLinks, RawGame};
use crate::model::season::{Season, SeasonTeam};
use crate::parse;
use crate::venue::VenueInfo;

static TAPP_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bU\d+\b.*").expect("valid regex"));
static AGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"U(\d+)").expect("valid regex"));

/// Source of raw PlayHQ pages. `path` is relative to the API root
/// (`teams/<id>/fixture`); `cursor` is the continuation of the previous page.
pub trait Transport {
    fn get(&self, path: &str, cursor: Option<&str>) -> Result<Value>;
}

/// Blocking HTTP transport for the public PlayHQ API.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    api_key: String,
    tenant: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, tenant: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), api_key: api_key.into(), tenant: tenant.into() }
    }
}

impl Transport for HttpTransport {
    fn get(&self, path: &str, cursor: Option<&str>) -> Result<Value> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path.trim_start_matches('/'));
        let mut request = ureq::get(&url)
            .header("x-api-key", &self.api_key)
            .header("x-phq-tenant", &self.tenant);
        if let Some(c) = cursor {
            request = request.query("cursor", c);
        }
        let response = {
            let _span = info_span!("playhq_fetch", url = %url, cursor = ?cursor).entered();
            request.call()
        }
        .map_err(|source| Error::Http { url: url.clone(), source })?;

        let mut body_reader = response.into_body();
        let body = body_reader
            .read_to_string()
            .map_err(|source| Error::Http { url: url.clone(), source })?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Linear walk over a cursor-paginated list endpoint.
///
/// A failed page is yielded once and ends the walk.
pub struct Pages<'a, T: Transport + ?Sized> {
    transport: &'a T,
    path: String,
    cursor: Option<String>,
    done: bool,
}

impl<'a, T: Transport + ?Sized> Pages<'a, T> {
    pub fn new(transport: &'a T, path: impl Into<String>) -> Self {
        Self { transport, path: path.into(), cursor: None, done: false }
    }

    fn fetch(&self) -> Result<Page> {
        let value = self.transport.get(&self.path, self.cursor.as_deref())?;
        Ok(serde_json::from_value(value)?)
    }
}

impl<T: Transport + ?Sized> Iterator for Pages<'_, T> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = match self.fetch() {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        if !page.metadata.has_more {
            self.done = true;
        } else {
            match page.metadata.next_cursor.as_deref() {
                Some(c) if !c.is_empty() => self.cursor = Some(c.to_string()),
                _ => {
                    self.done = true;
                    return Some(Err(Error::BadPage {
                        path: self.path.clone(),
                        reason: "hasMore without nextCursor".to_string(),
                    }));
                }
            }
        }
        Some(Ok(page))
    }
}

/// PlayHQ client for one club organisation.
pub struct PlayHq<T: Transport> {
    transport: T,
    org_id: String,
    tz: Tz,
}

impl<T: Transport> PlayHq<T> {
    pub fn new(transport: T, org_id: impl Into<String>, tz: Tz) -> Self {
        Self { transport, org_id: org_id.into(), tz }
    }

    pub fn pages(&self, path: &str) -> Pages<'_, T> {
        Pages::new(&self.transport, path)
    }

    fn collect<D: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Vec<D>> {
        let mut out = Vec::new();
        for page in self.pages(path) {
            for item in page?.data {
                out.push(serde_json::from_value(item)?);
            }
        }
        Ok(out)
    }

    /// Id of the organisation's season called `name`.
    #[instrument(level = "info", skip(self))]
    pub fn season_id(&self, name: &str) -> Result<Option<String>> {
        let path = format!("organisations/{}/seasons", self.org_id);
        for page in self.pages(&path) {
            for item in page?.data {
                let season: Season = serde_json::from_value(item)?;
                if season.name == name {
                    debug!(season = %name, id = %season.id, "Found season");
                    return Ok(Some(season.id));
                }
            }
        }
        Ok(None)
    }

    /// The club's own teams in a season, oldest age grade first.
    #[instrument(level = "info", skip(self))]
    pub fn season_teams(&self, season_id: &str) -> Result<Vec<SeasonTeam>> {
        let teams: Vec<SeasonTeam> = self.collect(&format!("seasons/{}/teams", season_id))?;
        let mut club: Vec<SeasonTeam> = teams
            .into_iter()
            .filter(|t| t.club.as_ref().is_some_and(|c| c.id == self.org_id))
            .collect();
        club.sort_by_key(|t| std::cmp::Reverse(age_grade(&t.name)));
        info!(teams = club.len(), "Club teams in season");
        Ok(club)
    }

    /// Every scheduled fixture of a team, across all pages.
    ///
    /// Fixtures without a date yet are dropped with a warning.
    #[instrument(level = "info", skip(self))]
    pub fn team_fixture(&self, team_id: &str) -> Result<Vec<FixtureRow>> {
        let fixtures: Vec<Fixture> = self.collect(&format!("teams/{}/fixture", team_id))?;
        let mut unscheduled = Vec::new();
        let mut rows = Vec::with_capacity(fixtures.len());
        for fixture in fixtures {
            let id = fixture.id.clone();
            match flatten(fixture, self.tz)? {
                Some(row) => rows.push(row),
                None => unscheduled.push(id),
            }
        }
        if !unscheduled.is_empty() {
            warn!(ids = ?unscheduled, "Games have no date yet; dropping them");
        }
        Ok(rows)
    }

    /// Fixtures of every `(team_id, team_name)` between `from` and `to`
    /// (inclusive; one day after `from` when `to` is omitted), optionally
    /// restricted to the given statuses.
    pub fn games(
        &self,
        teams: &[(String, String)],
        from: DateTime<Tz>,
        to: Option<DateTime<Tz>>,
        statuses: Option<&[String]>,
    ) -> Result<Vec<TeamFixture>> {
        let to = to.unwrap_or(from + Duration::days(1));
        let mut games = Vec::new();
        for (team_id, team_name) in teams {
            debug!(%team_id, %team_name, "Extracting games for team");
            let rows: Vec<FixtureRow> = self
                .team_fixture(team_id)?
                .into_iter()
                .filter(|r| r.schedule_timestamp >= from && r.schedule_timestamp <= to)
                .filter(|r| statuses.is_none_or(|s| s.iter().any(|st| *st == r.status)))
                .collect();
            if rows.is_empty() {
                info!(team = %team_name, "No games for team");
                continue;
            }
            info!(team = %team_name, games = rows.len(), "Games extracted for team");
            games.extend(rows.into_iter().map(|row| TeamFixture {
                team_id: team_id.clone(),
                team_name: team_name.clone(),
                row,
            }));
        }
        Ok(games)
    }
}

fn age_grade(name: &str) -> u32 {
    AGE.captures(name).and_then(|c| c[1].parse().ok()).unwrap_or(0)
}

/// TeamApp name of a PlayHQ team: `"Magic U12 Boys Gold"` → `"U12 Boys Gold"`.
pub fn tapp_team_name(name: &str) -> String {
    TAPP_NAME
        .find(name)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| name.trim().to_string())
}

fn json_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() { default } else { value.trim() }
}

/// Flatten a fixture into a row and resolve its kick-off in `tz`.
/// Returns `None` for fixtures that have no date yet.
pub fn flatten(fixture: Fixture, tz: Tz) -> Result<Option<FixtureRow>> {
    let schedule = fixture.schedule.clone().unwrap_or_default();
    if schedule.date.trim().is_empty() {
        return Ok(None);
    }
    let time = or_default(&schedule.time, "00:00:00").to_string();
    let zone_name = or_default(&schedule.timezone, tz.name()).to_string();
    let zone: Tz = zone_name
        .parse()
        .map_err(|_| Error::InvalidTimezone(zone_name.clone()))?;

    let stamp = format!("{} {}", schedule.date.trim(), time);
    let naive = NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(&stamp, "%Y-%m-%d %H:%M"))
        .map_err(|e| Error::BadSchedule { id: fixture.id.clone(), reason: e.to_string() })?;
    let local = zone.from_local_datetime(&naive).earliest().ok_or_else(|| Error::BadSchedule {
        id: fixture.id.clone(),
        reason: format!("{} does not exist in {}", stamp, zone_name),
    })?;

    let zoned = |s: &Option<String>| {
        s.as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&tz))
    };

    let grade = fixture.grade.unwrap_or_default();
    let round = fixture.round.unwrap_or_default();
    let venue = fixture.venue.unwrap_or_default();
    let address = venue.address.unwrap_or_default();

    Ok(Some(FixtureRow {
        created_at: zoned(&fixture.created_at),
        updated_at: zoned(&fixture.updated_at),
        id: fixture.id,
        status: fixture.status,
        url: fixture.url,
        competitors: fixture.competitors,
        grade_id: grade.id,
        grade_name: grade.name,
        grade_url: grade.url,
        round_id: round.id,
        round_name: round.name,
        round_abbreviated_name: round.abbreviated_name,
        round_is_final_round: round.is_final_round,
        schedule_date: schedule.date,
        schedule_time: time,
        schedule_timezone: zone_name,
        schedule_timestamp: local.with_timezone(&tz),
        venue_id: venue.id,
        venue_name: venue.name,
        venue_surface_name: venue.surface_name,
        venue_surface_abbreviation: venue.surface_abbreviation,
        venue_address_line1: address.line1,
        venue_address_postcode: address.postcode,
        venue_address_suburb: address.suburb,
        venue_address_state: address.state,
        venue_address_country: address.country,
        venue_address_latitude: json_text(&address.latitude),
        venue_address_longitude: json_text(&address.longitude),
    }))
}

impl TeamFixture {
    /// Club game for the team this fixture was fetched for.
    pub fn into_club_game(self, duration: Duration) -> ClubGame {
        let row = self.row;
        let own = row
            .competitors
            .iter()
            .find(|c| c.id == self.team_id)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| self.team_name.clone());
        let opponent = row
            .competitors
            .iter()
            .find(|c| c.id != self.team_id)
            .map(|c| parse::strip_age_token(&c.name))
            .unwrap_or_default();

        let address = [row.venue_address_line1.as_str(), row.venue_address_suburb.as_str()]
            .iter()
            .filter(|s| !s.trim().is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", ");

        let game = RawGame::new(
            row.schedule_timestamp.date_naive(),
            row.schedule_timestamp.time(),
            duration,
            row.venue_name.clone(),
            row.venue_surface_name.clone(),
            (own, opponent.clone()),
            row.grade_name.clone(),
        );

        ClubGame {
            game,
            team_name: tapp_team_name(&self.team_name),
            opponent,
            round: Some(row.round_name).filter(|r| !r.is_empty()),
            links: Some(FixtureLinks {
                url_game: row.url,
                url_grade: row.grade_url,
                lat: row.venue_address_latitude,
                lon: row.venue_address_longitude,
            }),
            venue: Some(VenueInfo { name: row.venue_name, address, tip: None }),
        }
    }
}
