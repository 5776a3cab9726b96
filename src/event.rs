// MIT License - Copyright (c) 2026 Peter Wright
// Decoded alarm event model

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::taxonomy::EventType;

/// Which decoder produced an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Ademco Contact ID
    ContactId,
    /// SIA DC-04
    Sia,
    /// A decoder registered from outside this crate
    Other(String),
}

impl Protocol {
    /// Wire/tag name, used in the alert `source` field (`alarm:<name>`).
    pub fn as_str(&self) -> &str {
        match self {
            Self::ContactId => "contact_id",
            Self::Sia => "sia",
            Self::Other(name) => name,
        }
    }

    /// Parse a protocol name, e.g. from a configuration hint.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "contact_id" | "contactid" | "cid" => Self::ContactId,
            "sia" | "dc04" | "dc-04" => Self::Sia,
            _ => Self::Other(name.to_string()),
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Protocol {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

/// Event qualifier: new event, restore, or still-active resend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    /// `E` - new event / alarm
    #[serde(rename = "E")]
    Event,
    /// `R` - restore / clear
    #[serde(rename = "R")]
    Restore,
    /// `P` - previous, still active
    #[serde(rename = "P")]
    Previous,
}

impl Qualifier {
    /// Map a Contact ID qualifier digit (`1`, `3`, `6`).
    pub fn from_contact_id_digit(digit: char) -> Option<Self> {
        match digit {
            '1' => Some(Self::Event),
            '3' => Some(Self::Restore),
            '6' => Some(Self::Previous),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        match self {
            Self::Event => 'E',
            Self::Restore => 'R',
            Self::Previous => 'P',
        }
    }

    pub fn is_restore(&self) -> bool {
        matches!(self, Self::Restore)
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One decoded panel message.
///
/// Built once by a decoder and consumed by the receiver service in the
/// same processing step. `zone` and `user` are never both set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmEvent {
    /// Original line, kept for audit
    pub raw_message: String,
    pub protocol: Protocol,
    /// Site identifier as transmitted
    pub account_code: String,
    /// 3-digit Contact ID (or Contact ID equivalent) code
    pub event_code: String,
    pub event_type: EventType,
    pub qualifier: Qualifier,
    pub zone: Option<String>,
    pub user: Option<String>,
    pub partition: Option<String>,
    /// Receipt time; panel clocks are not trusted
    pub timestamp: DateTime<Utc>,
    /// Protocol-specific extras (source IP, native SIA code, ...)
    #[serde(default)]
    pub extra_data: BTreeMap<String, String>,
}

impl AlarmEvent {
    /// Create an event stamped with the current time and no sub-identifiers.
    pub fn new(
        raw_message: impl Into<String>,
        protocol: Protocol,
        account_code: impl Into<String>,
        event_code: impl Into<String>,
        qualifier: Qualifier,
    ) -> Self {
        let event_code = event_code.into();
        Self {
            raw_message: raw_message.into(),
            protocol,
            account_code: account_code.into(),
            event_type: EventType::from_code(&event_code),
            event_code,
            qualifier,
            zone: None,
            user: None,
            partition: None,
            timestamp: Utc::now(),
            extra_data: BTreeMap::new(),
        }
    }

    pub fn is_restore(&self) -> bool {
        self.qualifier.is_restore()
    }
}
