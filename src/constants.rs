// MIT License - Copyright (c) 2026 Peter Wright
// Wire constants and code tables

use std::time::Duration;

use crate::taxonomy::EventType;

/// Acknowledgment byte written after every received line.
pub const ACK: u8 = 0x06;

/// Default listening interface (all interfaces).
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default listening TCP port.
pub const DEFAULT_PORT: u16 = 5000;

/// Inactivity period after which a panel connection is closed.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Longest line accepted from a panel; anything beyond is discarded.
pub const MAX_LINE_LEN: usize = 4096;

/// Contact ID event codes known to the receiver: code, category, title.
///
/// Codes absent from this table still decode; they resolve to
/// [`EventType::Unknown`] and a generic title.
pub const CONTACT_ID_CODES: &[(&str, EventType, &str)] = &[
    // 1xx - Alarms
    ("100", EventType::Medical, "Medical Emergency"),
    ("101", EventType::Medical, "Personal Emergency"),
    ("102", EventType::Medical, "Fail to Report In"),
    ("110", EventType::Fire, "Fire Alarm"),
    ("111", EventType::Fire, "Smoke Detector"),
    ("112", EventType::Fire, "Combustion"),
    ("113", EventType::Fire, "Water Flow"),
    ("114", EventType::Fire, "Heat Sensor"),
    ("115", EventType::Fire, "Fire Pull Station"),
    ("116", EventType::Fire, "Duct Detector"),
    ("117", EventType::Fire, "Flame Detector"),
    ("118", EventType::Fire, "Near Alarm"),
    ("120", EventType::Panic, "Panic Alarm"),
    ("121", EventType::Panic, "Duress"),
    ("122", EventType::Panic, "Silent Panic"),
    ("123", EventType::Panic, "Audible Panic"),
    ("130", EventType::Burglary, "Burglary"),
    ("131", EventType::Burglary, "Perimeter Burglary"),
    ("132", EventType::Burglary, "Interior Burglary"),
    ("133", EventType::Burglary, "24 Hour Burglary"),
    ("134", EventType::Burglary, "Entry/Exit Burglary"),
    ("135", EventType::Burglary, "Day/Night Burglary"),
    ("137", EventType::Burglary, "Tamper"),
    ("139", EventType::Burglary, "Verified Burglary"),
    ("140", EventType::GeneralAlarm, "General Alarm"),
    ("150", EventType::Auxiliary, "24 Hour Auxiliary"),
    // 3xx - System troubles
    ("300", EventType::SystemTrouble, "System Trouble"),
    ("301", EventType::SystemTrouble, "AC Power Loss"),
    ("302", EventType::SystemTrouble, "Low System Battery"),
    ("305", EventType::SystemTrouble, "System Reset"),
    ("309", EventType::SystemTrouble, "Battery Test Failure"),
    ("350", EventType::SystemTrouble, "Communication Trouble"),
    ("373", EventType::SystemTrouble, "Fire Loop Trouble"),
    ("380", EventType::SystemTrouble, "Sensor Trouble"),
    ("384", EventType::SystemTrouble, "RF Low Battery"),
    // 4xx - Open/close
    ("400", EventType::OpenClose, "Open/Close"),
    ("401", EventType::OpenClose, "Open/Close by User"),
    ("402", EventType::OpenClose, "Group Open/Close"),
    ("403", EventType::OpenClose, "Automatic Open/Close"),
    ("406", EventType::OpenClose, "Cancel"),
    ("407", EventType::OpenClose, "Remote Arm/Disarm"),
    ("441", EventType::OpenClose, "Armed Stay"),
    // 5xx - Bypass
    ("570", EventType::Bypass, "Zone Bypass"),
    // 6xx - Test/misc
    ("601", EventType::Test, "Manual Test"),
    ("602", EventType::Test, "Periodic Test"),
    ("603", EventType::Test, "Periodic RF Transmission"),
    ("607", EventType::Test, "Walk Test"),
];

/// SIA DC-04 two-letter event codes and their Contact ID equivalents.
pub const SIA_TO_CONTACT_ID: &[(&str, &str)] = &[
    ("BA", "130"), // Burglary alarm
    ("BB", "570"), // Burglary bypass
    ("FA", "110"), // Fire alarm
    ("FT", "373"), // Fire trouble
    ("PA", "120"), // Panic alarm
    ("HA", "121"), // Holdup alarm
    ("MA", "100"), // Medical alarm
    ("TA", "137"), // Tamper alarm
    ("OP", "400"), // Opening
    ("CL", "401"), // Closing
    ("TR", "300"), // Trouble
    ("AT", "301"), // AC trouble
    ("YT", "302"), // Battery trouble
    ("RX", "601"), // Manual test
    ("RP", "602"), // Automatic test
];

/// Look up the Contact ID equivalent of a SIA event code.
pub fn sia_to_contact_id(sia_code: &str) -> Option<&'static str> {
    SIA_TO_CONTACT_ID
        .iter()
        .find(|(sia, _)| *sia == sia_code)
        .map(|(_, cid)| *cid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sia_to_contact_id() {
        assert_eq!(sia_to_contact_id("FA"), Some("110"));
        assert_eq!(sia_to_contact_id("BA"), Some("130"));
        assert_eq!(sia_to_contact_id("RP"), Some("602"));
        assert_eq!(sia_to_contact_id("ZZ"), None);
        assert_eq!(sia_to_contact_id("fa"), None);
    }

    #[test]
    fn test_contact_id_codes_unique() {
        for (i, (code, _, _)) in CONTACT_ID_CODES.iter().enumerate() {
            assert_eq!(code.len(), 3, "code {code} is not 3 digits");
            assert!(
                CONTACT_ID_CODES[i + 1..].iter().all(|(c, _, _)| c != code),
                "duplicate code {code}"
            );
        }
    }

    #[test]
    fn test_every_sia_mapping_is_a_known_code() {
        for (sia, cid) in SIA_TO_CONTACT_ID {
            assert!(
                CONTACT_ID_CODES.iter().any(|(c, _, _)| c == cid),
                "SIA {sia} maps to unlisted code {cid}"
            );
        }
    }
}
