use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canonical identity of a playing venue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VenueInfo {
    pub name: String,
    pub address: String,
    #[serde(default)]
    pub tip: Option<String>,
}

impl VenueInfo {
    /// Access tip formatted for appending after an address: `" (<tip>)"`.
    pub fn address_tips(&self) -> String {
        match self.tip.as_deref().map(str::trim) {
            Some(tip) if !tip.is_empty() => format!(" ({})", tip),
            _ => String::new(),
        }
    }
}

/// Value side of the venue table: a real venue or the key of one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VenueEntry {
    Venue(VenueInfo),
    AliasOf(String),
}

/// Venue address book keyed by the names venues go by in fixture sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VenueTable {
    entries: BTreeMap<String, VenueEntry>,
}

impl VenueTable {
    pub fn new(entries: BTreeMap<String, VenueEntry>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve `key`, following an alias exactly once.
    pub fn resolve(&self, key: &str) -> Result<&VenueInfo> {
        match self.entries.get(key) {
            Some(VenueEntry::Venue(info)) => Ok(info),
            Some(VenueEntry::AliasOf(target)) => match self.entries.get(target) {
                Some(VenueEntry::Venue(info)) => Ok(info),
                _ => Err(Error::UnknownVenue(target.clone())),
            },
            None => Err(Error::UnknownVenue(key.to_string())),
        }
    }

    /// Find the venue a free-text location refers to.
    ///
    /// An exact key wins; otherwise the longest key contained in the
    /// location is used.
    pub fn lookup(&self, location: &str) -> Result<&VenueInfo> {
        let location = location.trim();
        if self.entries.contains_key(location) {
            return self.resolve(location);
        }
        let key = self
            .entries
            .keys()
            .filter(|k| !k.is_empty() && location.contains(k.as_str()))
            .max_by_key(|k| k.len())
            .ok_or_else(|| Error::UnknownVenue(location.to_string()))?;
        self.resolve(key)
    }
}
