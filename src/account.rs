// MIT License - Copyright (c) 2026 Peter Wright
// Monitored site accounts

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// A monitored site, keyed by the account code its panel transmits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmAccount {
    pub account_code: String,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Owning agency in the downstream platform
    #[serde(default)]
    pub agency_id: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl AlarmAccount {
    pub fn new(account_code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            account_code: account_code.into(),
            name: name.into(),
            address: None,
            latitude: None,
            longitude: None,
            agency_id: None,
            contact_name: None,
            contact_phone: None,
            active: true,
        }
    }

    pub fn with_location(mut self, latitude: f64, longitude: f64) -> Self {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn with_agency(mut self, agency_id: impl Into<String>) -> Self {
        self.agency_id = Some(agency_id.into());
        self
    }
}

/// Read-mostly map from account code to site record.
///
/// Entries are immutable once registered; re-registering a code replaces
/// the entry (last write wins). Lookups hand out shared `Arc`s so readers
/// never hold the lock while using an account.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: RwLock<HashMap<String, Arc<AlarmAccount>>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, account: AlarmAccount) {
        self.accounts
            .write()
            .insert(account.account_code.clone(), Arc::new(account));
    }

    /// Exact-match lookup. An unknown code is not an error.
    pub fn get(&self, account_code: &str) -> Option<Arc<AlarmAccount>> {
        self.accounts.read().get(account_code).cloned()
    }

    pub fn remove(&self, account_code: &str) -> Option<Arc<AlarmAccount>> {
        self.accounts.write().remove(account_code)
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    /// Registered account codes, sorted.
    pub fn account_codes(&self) -> Vec<String> {
        let mut codes: Vec<String> = self.accounts.read().keys().cloned().collect();
        codes.sort();
        codes
    }
}
