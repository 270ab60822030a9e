use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, error, info};

use crate::error::{Error, Result};
use crate::model::game::{ByeGame, ClubGame, RawGame};
use crate::parse;

/// Which side(s) of a fixture belong to the club.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    Neither,
    Team1,
    Team2,
    Both,
}

impl Membership {
    pub fn of(game: &RawGame, club: &str) -> Self {
        let club = club.to_uppercase();
        let t1 = game.team1.to_uppercase().contains(&club);
        let t2 = game.team2.to_uppercase().contains(&club);
        match (t1, t2) {
            (true, true) => Membership::Both,
            (true, false) => Membership::Team1,
            (false, true) => Membership::Team2,
            (false, false) => Membership::Neither,
        }
    }
}

/// Time window given to BYE placeholder events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ByeWindow {
    /// 11:00-12:00, used for timesheet rounds.
    pub fn timesheet() -> Self {
        Self { start: hm(11, 0), end: hm(12, 0) }
    }

    /// Midnight placeholder, used for API rounds.
    pub fn midnight() -> Self {
        Self { start: hm(0, 0), end: hm(0, 0) }
    }
}

fn hm(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN)
}

fn club_game(game: &RawGame, own: &str, other: &str) -> ClubGame {
    let suffix = own.split_whitespace().last().unwrap_or("");
    ClubGame {
        game: game.clone(),
        team_name: parse::title_case(&format!("{} {}", game.league, suffix)),
        opponent: parse::strip_age_token(other),
        round: None,
        links: None,
        venue: None,
    }
}

/// Club games among `raw`, one per club side; a game between two club
/// teams is emitted once for each of them.
pub fn derive_club_games(raw: &[RawGame], club: &str) -> Vec<ClubGame> {
    let mut games = Vec::new();
    for game in raw {
        match Membership::of(game, club) {
            Membership::Neither => {
                debug!(team1 = %game.team1, team2 = %game.team2, %club, "Not a club game");
            }
            Membership::Team1 => games.push(club_game(game, &game.team1, &game.team2)),
            Membership::Team2 => games.push(club_game(game, &game.team2, &game.team1)),
            Membership::Both => {
                games.push(club_game(game, &game.team1, &game.team2));
                games.push(club_game(game, &game.team2, &game.team1));
            }
        }
    }
    games
}

/// Every roster team accounted for in one round: playing or on a BYE.
#[derive(Debug, Clone, PartialEq)]
pub struct Round {
    pub date: NaiveDate,
    pub games: Vec<ClubGame>,
    pub byes: Vec<ByeGame>,
}

impl Round {
    /// Check the club games against the roster and add a BYE for every
    /// roster team without a game.
    ///
    /// A game for a team outside the roster means the source or the roster
    /// is wrong; the round is rejected rather than corrected.
    pub fn assemble(
        date: NaiveDate,
        games: Vec<ClubGame>,
        roster: &BTreeSet<String>,
        window: ByeWindow,
    ) -> Result<Round> {
        let mut unknown: Vec<String> = Vec::new();
        for g in games.iter().filter(|g| !roster.contains(&g.team_name)) {
            error!(
                team = %g.team_name,
                opponent = %g.opponent,
                start = %g.game.start_time,
                location = %g.game.location,
                "Found game for a team that is not in the club roster"
            );
            if !unknown.contains(&g.team_name) {
                unknown.push(g.team_name.clone());
            }
        }
        if !unknown.is_empty() {
            return Err(Error::RosterMismatch(unknown));
        }

        let playing: BTreeSet<&str> = games.iter().map(|g| g.team_name.as_str()).collect();
        let byes: Vec<ByeGame> = roster
            .iter()
            .filter(|team| !playing.contains(team.as_str()))
            .map(|team| ByeGame {
                team_name: team.clone(),
                date,
                start_time: window.start,
                end_time: window.end,
            })
            .collect();

        if byes.is_empty() {
            info!("No teams have a BYE; all are playing");
        } else {
            info!(teams = ?byes.iter().map(|b| b.team_name.as_str()).collect::<Vec<_>>(), "Teams with a BYE");
        }

        let round = Round { date, games, byes };
        round.validate(roster)?;
        Ok(round)
    }

    /// Confirm that every game and BYE names a roster team.
    pub fn validate(&self, roster: &BTreeSet<String>) -> Result<()> {
        let mut unknown: Vec<String> = self
            .team_names()
            .filter(|t| !roster.contains(*t))
            .map(str::to_string)
            .collect();
        unknown.dedup();
        if unknown.is_empty() { Ok(()) } else { Err(Error::RosterMismatch(unknown)) }
    }

    /// Team names of games then BYEs.
    pub fn team_names(&self) -> impl Iterator<Item = &str> {
        self.games
            .iter()
            .map(|g| g.team_name.as_str())
            .chain(self.byes.iter().map(|b| b.team_name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.games.len() + self.byes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
