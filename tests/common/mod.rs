#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};

use teamapp_fixtures::config::Config;
use teamapp_fixtures::sheet::{Cell, Sheet};

pub fn load_config() -> Config {
    let text = std::fs::read_to_string("tests/data/club.toml").expect("failed to read club.toml");
    Config::from_toml(&text).expect("club.toml should parse")
}

pub fn load_json(name: &str) -> serde_json::Value {
    let text = std::fs::read_to_string(format!("tests/data/{}", name))
        .unwrap_or_else(|e| panic!("failed to read {}: {}", name, e));
    serde_json::from_str(&text).expect("sample json should parse")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn text(s: &str) -> Cell {
    Cell::Text(s.to_string())
}

/// A Saturday timesheet in the layout the venue sends out: a title row,
/// a court row, then three rows per time slot (matchups, slot time,
/// league labels), with a stray partial slot at the bottom.
pub fn sample_sheet() -> Sheet {
    use Cell::Empty as E;
    let rows = vec![
        vec![text("CBA Saturday"), E, text("7th August"), E, text("Winter 2021")],
        vec![text("TIME"), text("Coburg Court 1"), text("Coburg Court 2"), text("PVG")],
        // 8:30
        vec![E, text("MAGIC GOLD vs PIRANHAS NEON"), text("Rovers vs Jets"), E],
        vec![Cell::Number(8.30), E, E, E],
        vec![E, text("u/12 boys Div1"), text("u/14 girls Div2"), E],
        // 1:15 pm
        vec![E, E, text("Magic Purple VS Magic Gold"), text("Flames vs MAGIC GOLD")],
        vec![Cell::Number(1.15), E, E, E],
        vec![E, E, text("u/12 Boys Div 3"), text("U14 G Div1")],
        vec![E, text("Stray vs Row")],
    ];
    Sheet::new("Saturday", rows)
}
