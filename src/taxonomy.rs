// MIT License - Copyright (c) 2026 Peter Wright
// Event taxonomy and severity derivation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::CONTACT_ID_CODES;

/// Semantic category of a Contact ID event code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    Medical,
    Fire,
    Panic,
    Burglary,
    GeneralAlarm,
    /// 24 hour non-burglary (auxiliary) zone
    Auxiliary,
    SystemTrouble,
    OpenClose,
    Bypass,
    Test,
    /// Code not present in the known-code table
    Unknown,
}

impl EventType {
    /// Resolve the category of an event code. Unlisted codes yield `Unknown`.
    pub fn from_code(code: &str) -> Self {
        CONTACT_ID_CODES
            .iter()
            .find(|(c, _, _)| *c == code)
            .map(|(_, event_type, _)| *event_type)
            .unwrap_or(EventType::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Medical => "MEDICAL",
            Self::Fire => "FIRE",
            Self::Panic => "PANIC",
            Self::Burglary => "BURGLARY",
            Self::GeneralAlarm => "GENERAL_ALARM",
            Self::Auxiliary => "AUXILIARY",
            Self::SystemTrouble => "SYSTEM_TROUBLE",
            Self::OpenClose => "OPEN_CLOSE",
            Self::Bypass => "BYPASS",
            Self::Test => "TEST",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Alert severity, highest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

impl Severity {
    /// Derive severity from the leading digits of an event code.
    ///
    /// | prefix       | severity |
    /// |--------------|----------|
    /// | `11x`        | Critical |
    /// | `10x`, `12x` | High     |
    /// | `13x`        | Medium   |
    /// | `3xx`        | Low      |
    /// | `4xx`        | Info     |
    /// | other        | Medium   |
    ///
    /// Independent of whether the code is in the known-code table.
    pub fn for_code(code: &str) -> Self {
        let bytes = code.as_bytes();
        match (bytes.first(), bytes.get(1)) {
            (Some(b'1'), Some(b'1')) => Severity::Critical,
            (Some(b'1'), Some(b'0' | b'2')) => Severity::High,
            (Some(b'1'), Some(b'3')) => Severity::Medium,
            (Some(b'3'), _) => Severity::Low,
            (Some(b'4'), _) => Severity::Info,
            _ => Severity::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "CRITICAL",
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
            Self::Info => "INFO",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable name of an event code, if it is a known code.
pub fn code_title(code: &str) -> Option<&'static str> {
    CONTACT_ID_CODES
        .iter()
        .find(|(c, _, _)| *c == code)
        .map(|(_, _, title)| *title)
}

/// Alert title for an event code and optional zone.
///
/// e.g. `("110", Some("003"))` → `"Fire Alarm - Zone 003"`,
/// `("999", None)` → `"Alarm Event 999"`.
pub fn alert_title(code: &str, zone: Option<&str>) -> String {
    let base = match code_title(code) {
        Some(title) => title.to_string(),
        None => format!("Alarm Event {code}"),
    };
    match zone {
        Some(zone) => format!("{base} - Zone {zone}"),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_from_code() {
        assert_eq!(EventType::from_code("110"), EventType::Fire);
        assert_eq!(EventType::from_code("100"), EventType::Medical);
        assert_eq!(EventType::from_code("120"), EventType::Panic);
        assert_eq!(EventType::from_code("130"), EventType::Burglary);
        assert_eq!(EventType::from_code("301"), EventType::SystemTrouble);
        assert_eq!(EventType::from_code("401"), EventType::OpenClose);
        assert_eq!(EventType::from_code("602"), EventType::Test);
        assert_eq!(EventType::from_code("999"), EventType::Unknown);
        assert_eq!(EventType::from_code(""), EventType::Unknown);
    }

    #[test]
    fn test_severity_prefix_table() {
        assert_eq!(Severity::for_code("110"), Severity::Critical);
        assert_eq!(Severity::for_code("118"), Severity::Critical);
        assert_eq!(Severity::for_code("100"), Severity::High);
        assert_eq!(Severity::for_code("123"), Severity::High);
        assert_eq!(Severity::for_code("130"), Severity::Medium);
        assert_eq!(Severity::for_code("137"), Severity::Medium);
        assert_eq!(Severity::for_code("302"), Severity::Low);
        assert_eq!(Severity::for_code("400"), Severity::Info);
        assert_eq!(Severity::for_code("602"), Severity::Medium);
        assert_eq!(Severity::for_code("140"), Severity::Medium);
    }

    #[test]
    fn test_severity_of_unlisted_codes() {
        // Severity depends only on the prefix, not on the code table
        assert_eq!(EventType::from_code("119"), EventType::Unknown);
        assert_eq!(Severity::for_code("119"), Severity::Critical);
        assert_eq!(Severity::for_code("399"), Severity::Low);
        assert_eq!(Severity::for_code("498"), Severity::Info);
        assert_eq!(Severity::for_code("1"), Severity::Medium);
        assert_eq!(Severity::for_code(""), Severity::Medium);
    }

    #[test]
    fn test_alert_title() {
        assert_eq!(alert_title("110", Some("003")), "Fire Alarm - Zone 003");
        assert_eq!(alert_title("130", None), "Burglary");
        assert_eq!(alert_title("999", None), "Alarm Event 999");
        assert_eq!(alert_title("999", Some("012")), "Alarm Event 999 - Zone 012");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Critical < Severity::High);
        assert!(Severity::Low < Severity::Info);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Severity::Critical).unwrap(), "\"CRITICAL\"");
        assert_eq!(
            serde_json::to_string(&EventType::SystemTrouble).unwrap(),
            "\"SYSTEM_TROUBLE\""
        );
    }
}
