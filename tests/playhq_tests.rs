mod common;

use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{Duration, TimeZone, Timelike};
use chrono_tz::Australia::Melbourne;
use serde_json::{Value, json};

use common::{date, load_json, time};
use teamapp_fixtures::model::fixture::Fixture;
use teamapp_fixtures::playhq::{HttpTransport, Pages, PlayHq, Transport, flatten, tapp_team_name};
use teamapp_fixtures::{Error, Result};

/// Serves canned pages keyed by `(path, cursor)` and records every request.
#[derive(Default)]
struct FakeTransport {
    pages: HashMap<(String, Option<String>), Value>,
    calls: RefCell<Vec<(String, Option<String>)>>,
}

impl FakeTransport {
    fn with(mut self, path: &str, cursor: Option<&str>, page: Value) -> Self {
        self.pages.insert((path.to_string(), cursor.map(str::to_string)), page);
        self
    }
}

impl Transport for FakeTransport {
    fn get(&self, path: &str, cursor: Option<&str>) -> Result<Value> {
        let key = (path.to_string(), cursor.map(str::to_string));
        self.calls.borrow_mut().push(key.clone());
        self.pages.get(&key).cloned().ok_or_else(|| Error::BadPage {
            path: path.to_string(),
            reason: format!("no canned page for cursor {:?}", cursor),
        })
    }
}

fn fixtures() -> FakeTransport {
    FakeTransport::default()
        .with("teams/t-gold/fixture", None, load_json("fixture_gold_page1.json"))
        .with("teams/t-gold/fixture", Some("c2"), load_json("fixture_gold_page2.json"))
        .with("teams/t-purple/fixture", None, load_json("fixture_purple.json"))
}

fn client() -> PlayHq<FakeTransport> {
    PlayHq::new(fixtures(), "org-magic", Melbourne)
}

fn teams() -> Vec<(String, String)> {
    vec![
        ("t-gold".to_string(), "Magic U12 Boys Gold".to_string()),
        ("t-purple".to_string(), "Magic U12 Boys Purple".to_string()),
    ]
}

#[test]
fn pages_follow_the_cursor_until_has_more_is_false() {
    let transport = fixtures();
    let pages: Vec<_> = Pages::new(&transport, "teams/t-gold/fixture")
        .collect::<Result<Vec<_>>>()
        .expect("pages failed");

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].data.len() + pages[1].data.len(), 4);
    assert_eq!(
        *transport.calls.borrow(),
        vec![
            ("teams/t-gold/fixture".to_string(), None),
            ("teams/t-gold/fixture".to_string(), Some("c2".to_string())),
        ]
    );
}

#[test]
fn has_more_without_cursor_is_a_bad_page() {
    let transport = FakeTransport::default().with(
        "teams/t1/fixture",
        None,
        json!({ "data": [], "metadata": { "hasMore": true, "nextCursor": null } }),
    );
    let results: Vec<_> = Pages::new(&transport, "teams/t1/fixture").collect();

    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(Error::BadPage { .. })));
}

#[test]
fn transport_failure_ends_the_walk() {
    let transport = FakeTransport::default().with(
        "teams/t1/fixture",
        None,
        json!({ "data": [], "metadata": { "hasMore": true, "nextCursor": "gone" } }),
    );
    let results: Vec<_> = Pages::new(&transport, "teams/t1/fixture").collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
    assert_eq!(transport.calls.borrow().len(), 2);
}

#[test]
fn team_fixture_drops_games_without_a_date() {
    let rows = client().team_fixture("t-gold").expect("fixture failed");
    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g2", "g3"]);
}

#[test]
fn fixture_rows_are_flattened() {
    let rows = client().team_fixture("t-gold").unwrap();
    let g1 = &rows[0];

    assert_eq!(g1.grade_name, "U12 Boys Division 1");
    assert_eq!(g1.round_name, "Round 3");
    assert_eq!(g1.round_abbreviated_name, "R3");
    assert_eq!(g1.venue_surface_name, "Court 2");
    assert_eq!(g1.venue_address_line1, "9 Hillcrest Road");
    assert_eq!(g1.venue_address_latitude, "-37.718");
    assert_eq!(g1.venue_address_longitude, "144.918");
    assert_eq!(g1.schedule_timestamp, Melbourne.with_ymd_and_hms(2023, 5, 6, 9, 0, 0).unwrap());
    // 02:00 UTC is noon in Melbourne
    assert_eq!(g1.created_at.unwrap().hour(), 12);

    // string coordinates pass through untouched
    assert_eq!(rows[1].venue_address_latitude, "-37.72");
}

#[test]
fn missing_time_and_timezone_fall_back_to_midnight_local() {
    let rows = client().team_fixture("t-gold").unwrap();
    let g2 = rows.iter().find(|r| r.id == "g2").unwrap();

    assert_eq!(g2.schedule_time, "00:00:00");
    assert_eq!(g2.schedule_timezone, "Australia/Melbourne");
    assert_eq!(g2.schedule_timestamp, Melbourne.with_ymd_and_hms(2023, 5, 13, 0, 0, 0).unwrap());
}

#[test]
fn foreign_timezones_are_converted() {
    let rows = client().team_fixture("t-gold").unwrap();
    let g3 = rows.iter().find(|r| r.id == "g3").unwrap();

    // 07:30 in Perth is 09:30 in Melbourne in May
    assert_eq!(g3.schedule_timezone, "Australia/Perth");
    assert_eq!(g3.schedule_timestamp.time(), time(9, 30));
    assert_eq!(g3.schedule_timestamp.timezone(), Melbourne);
}

#[test]
fn unknown_fixture_timezone_is_an_error() {
    let fixture: Fixture = serde_json::from_value(json!({
        "id": "gx",
        "schedule": { "date": "2023-05-06", "time": "09:00", "timezone": "Mars/Olympus" }
    }))
    .unwrap();
    assert!(matches!(flatten(fixture, Melbourne), Err(Error::InvalidTimezone(_))));
}

#[test]
fn games_are_limited_to_the_day_after_from() {
    let from = Melbourne.with_ymd_and_hms(2023, 5, 6, 0, 0, 0).unwrap();
    let games = client().games(&teams(), from, None, None).expect("games failed");

    let ids: Vec<&str> = games.iter().map(|g| g.row.id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g3"]);
    assert!(games.iter().all(|g| g.team_id == "t-gold"));
}

#[test]
fn range_end_is_inclusive() {
    let from = Melbourne.with_ymd_and_hms(2023, 5, 6, 0, 0, 0).unwrap();
    let to = Melbourne.with_ymd_and_hms(2023, 5, 13, 0, 0, 0).unwrap();
    let games = client().games(&teams(), from, Some(to), None).unwrap();

    let ids: Vec<&str> = games.iter().map(|g| g.row.id.as_str()).collect();
    assert_eq!(ids, vec!["g1", "g2", "g3"]);
}

#[test]
fn status_filter_keeps_listed_statuses() {
    let from = Melbourne.with_ymd_and_hms(2023, 5, 6, 0, 0, 0).unwrap();
    let statuses = vec!["UPCOMING".to_string()];
    let games = client().games(&teams(), from, None, Some(&statuses)).unwrap();

    assert_eq!(games.len(), 1);
    assert_eq!(games[0].row.id, "g1");
}

#[test]
fn team_fixture_becomes_a_club_game() {
    let from = Melbourne.with_ymd_and_hms(2023, 5, 6, 0, 0, 0).unwrap();
    let fixture = client().games(&teams(), from, None, None).unwrap().remove(0);

    let game = fixture.into_club_game(Duration::minutes(45));

    assert_eq!(game.team_name, "U12 Boys Gold");
    assert_eq!(game.opponent, "Rovers Boys 1");
    assert_eq!(game.round.as_deref(), Some("Round 3"));
    assert_eq!(game.game.start_date, date(2023, 5, 6));
    assert_eq!(game.game.start_time, time(9, 0));
    assert_eq!(game.game.end_time, time(9, 45));
    assert_eq!(game.game.court, "Court 2");
    assert_eq!(game.game.league, "U12 Boys Division 1");

    let venue = game.venue.expect("venue from fixture");
    assert_eq!(venue.name, "Oak Park Stadium");
    assert_eq!(venue.address, "9 Hillcrest Road, Oak Park");

    let links = game.links.expect("fixture links");
    assert_eq!(links.url_game, "https://www.playhq.com/game/g1");
    assert_eq!(links.url_grade, "https://www.playhq.com/grade/gr1");
    assert_eq!((links.lat.as_str(), links.lon.as_str()), ("-37.718", "144.918"));
}

#[test]
fn season_lookup_and_club_teams() {
    let transport = FakeTransport::default()
        .with(
            "organisations/org-magic/seasons",
            None,
            json!({
                "data": [
                    { "id": "s22", "name": "Winter 2022" },
                    { "id": "s23", "name": "Winter 2023" }
                ],
                "metadata": { "hasMore": false }
            }),
        )
        .with(
            "seasons/s23/teams",
            None,
            json!({
                "data": [
                    { "id": "t-u10", "name": "Magic U10 Girls Purple", "club": { "id": "org-magic" } },
                    { "id": "t-rov", "name": "Rovers U12 Boys 1", "club": { "id": "org-rovers" } },
                    { "id": "t-u14", "name": "Magic U14 Girls Gold", "club": { "id": "org-magic" } },
                    { "id": "t-none", "name": "Unattached U12" }
                ],
                "metadata": { "hasMore": false }
            }),
        );
    let client = PlayHq::new(transport, "org-magic", Melbourne);

    assert_eq!(client.season_id("Winter 2023").unwrap().as_deref(), Some("s23"));
    assert_eq!(client.season_id("Summer 2023").unwrap(), None);

    let teams = client.season_teams("s23").unwrap();
    let names: Vec<&str> = teams.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Magic U14 Girls Gold", "Magic U10 Girls Purple"]);
}

#[test]
fn tapp_team_names_start_at_the_age_grade() {
    assert_eq!(tapp_team_name("Magic U12 Boys Gold"), "U12 Boys Gold");
    assert_eq!(tapp_team_name("Coburg Magic U8 Mixed"), "U8 Mixed");
    assert_eq!(tapp_team_name("Senior Men"), "Senior Men");
}

#[test]
fn http_transport_sends_auth_headers_and_cursor() {
    // Arrange
    let mut server = mockito::Server::new();
    let first = server
        .mock("GET", "/teams/t1/fixture")
        .match_header("x-api-key", "secret")
        .match_header("x-phq-tenant", "bv")
        .match_query(mockito::Matcher::Missing)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"id":"a"}],"metadata":{"hasMore":true,"nextCursor":"abc"}}"#)
        .create();
    let second = server
        .mock("GET", "/teams/t1/fixture")
        .match_header("x-api-key", "secret")
        .match_query(mockito::Matcher::UrlEncoded("cursor".into(), "abc".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"data":[{"id":"b"}],"metadata":{"hasMore":false}}"#)
        .create();
    let transport = HttpTransport::new(server.url(), "secret", "bv");

    // Act
    let pages = Pages::new(&transport, "teams/t1/fixture")
        .collect::<Result<Vec<_>>>()
        .expect("pages failed");

    // Assert
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[1].data[0]["id"], "b");
    first.assert();
    second.assert();
}

#[test]
fn http_error_status_is_reported() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/seasons/s1/teams").with_status(500).create();
    let transport = HttpTransport::new(format!("{}/", server.url()), "secret", "bv");

    let err = transport.get("seasons/s1/teams", None).unwrap_err();

    assert!(matches!(err, Error::Http { ref url, .. } if url.ends_with("/seasons/s1/teams")), "error was: {}", err);
    mock.assert();
}
