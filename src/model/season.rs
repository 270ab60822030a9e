use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Season {
    pub id: String,
    pub name: String,
}

/// Entry of `GET /seasons/:id/teams`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonTeam {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub club: Option<ClubRef>,
    #[serde(default)]
    pub grade: Option<crate::model::fixture::Grade>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubRef {
    pub id: String,
}
