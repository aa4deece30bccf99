//! Customer negotiation history store

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use shared_types::{CustomerProfile, HistoricalContract};

use crate::error::Result;
use crate::recommendation::profile_from_history;

/// Customer resolved by the upstream name extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum CustomerRef {
    Named(String),
    Unknown,
}

impl CustomerRef {
    /// Blank names count as unknown
    pub fn from_name(name: Option<&str>) -> Self {
        match name.map(str::trim) {
            Some(name) if !name.is_empty() => CustomerRef::Named(name.to_string()),
            _ => CustomerRef::Unknown,
        }
    }
}

/// Historical contracts keyed by customer name, matched case-insensitively
#[derive(Debug, Clone, Default)]
pub struct CustomerHistory {
    by_key: HashMap<String, (String, Vec<HistoricalContract>)>,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl CustomerHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `{ "<customer>": [contract, ...], ... }`.
    ///
    /// Names differing only in case are merged in sorted key order, so the
    /// first sorted spelling is kept.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<HistoricalContract>> = serde_json::from_str(json)?;
        let mut history = Self::new();
        for (name, contracts) in raw {
            history.insert(&name, contracts);
        }
        Ok(history)
    }

    /// Add contracts for a customer, appending to any already stored
    pub fn insert(&mut self, name: &str, contracts: Vec<HistoricalContract>) {
        self.by_key
            .entry(key(name))
            .or_insert_with(|| (name.trim().to_string(), Vec::new()))
            .1
            .extend(contracts);
    }

    pub fn contracts_for(&self, customer: &CustomerRef) -> &[HistoricalContract] {
        match customer {
            CustomerRef::Named(name) => self
                .by_key
                .get(&key(name))
                .map(|(_, contracts)| contracts.as_slice())
                .unwrap_or(&[]),
            CustomerRef::Unknown => &[],
        }
    }

    /// Profile for a customer; unknown and unmatched customers get all zeros
    pub fn profile_for(&self, customer: &CustomerRef) -> CustomerProfile {
        profile_from_history(self.contracts_for(customer))
    }

    /// Stored customer names (spelled as first inserted), sorted
    pub fn customers(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_key.values().map(|(n, _)| n.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}
