pub mod fixture;
pub mod game;
pub mod record;
pub mod season;
