pub mod club;
pub mod config;
pub mod convert;
pub mod error;
pub mod export;
pub mod model;
pub mod parse;
pub mod playhq;
pub mod sheet;
pub mod teamapp;
pub mod venue;

pub use error::{Error, Result};
