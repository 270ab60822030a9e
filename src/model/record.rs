use chrono::{NaiveDate, NaiveTime};

/// Which TeamApp import file a set of records is written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvVariant {
    /// Per-team schedule import; carries the `team_name` column.
    Schedule,
    /// Club-wide event import; same columns without `team_name`.
    Event,
}

impl CsvVariant {
    pub fn columns(self) -> Vec<&'static str> {
        let mut cols = vec![
            "event_name",
            "team_name",
            "start_date",
            "end_date",
            "start_time",
            "end_time",
            "description",
            "location",
            "access_groups",
            "rsvp",
            "comments",
            "attendance_tracking",
            "duty_roster",
            "ticketing",
            "reference_id",
        ];
        if self == CsvVariant::Event {
            cols.retain(|c| *c != "team_name");
        }
        cols
    }
}

/// One row of a TeamApp import file.
#[derive(Clone, Debug, PartialEq)]
pub struct OutputRecord {
    pub event_name: String,
    pub team_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub description: String,
    pub location: String,
    pub access_groups: String,
    pub rsvp: bool,
    pub comments: bool,
    pub attendance_tracking: bool,
    pub duty_roster: bool,
    pub ticketing: bool,
    pub reference_id: String,
}

impl OutputRecord {
    /// Field values in the column order of `variant`.
    pub fn fields(&self, variant: CsvVariant) -> Vec<String> {
        let flag = |b: bool| if b { "1" } else { "0" }.to_string();
        let mut out = vec![self.event_name.clone()];
        if variant == CsvVariant::Schedule {
            out.push(self.team_name.clone());
        }
        out.extend([
            self.start_date.format("%Y-%m-%d").to_string(),
            self.end_date.format("%Y-%m-%d").to_string(),
            self.start_time.format("%H:%M:%S").to_string(),
            self.end_time.format("%H:%M:%S").to_string(),
            self.description.clone(),
            self.location.clone(),
            self.access_groups.clone(),
            flag(self.rsvp),
            flag(self.comments),
            flag(self.attendance_tracking),
            flag(self.duty_roster),
            flag(self.ticketing),
            self.reference_id.clone(),
        ]);
        out
    }
}
