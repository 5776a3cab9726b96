// MIT License - Copyright (c) 2026 Peter Wright
// SIA DC-04 decoder

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::sia_to_contact_id;
use crate::event::{AlarmEvent, Protocol, Qualifier};
use crate::protocol::Decoder;

/// `#ACCT|N[ri<n>/]["]CC["][ZZZ]...`
static SIA_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^#([0-9A-Za-z]+)\|N(?:ri[0-9]+/)?"?([A-Z]{2})"?([0-9]{3})?"#)
        .expect("SIA pattern is valid")
});

/// Code recorded for SIA events with no Contact ID equivalent.
pub const UNMAPPED_CODE: &str = "000";

/// Decoder for SIA DC-04 text blocks.
///
/// The two-letter SIA code is translated to its Contact ID equivalent so
/// that taxonomy and severity rules apply unchanged. The native code is
/// kept in `extra_data["sia_code"]`.
///
/// A restore is detected only by a literal trailing `R` on the whole line,
/// which can misclassify messages that happen to end in that character.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiaDecoder;

impl Decoder for SiaDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::Sia
    }

    fn decode(&self, message: &str) -> Option<AlarmEvent> {
        let line = message.trim();
        let caps = SIA_PATTERN.captures(line)?;
        let account = &caps[1];
        let sia_code = &caps[2];
        let code = sia_to_contact_id(sia_code).unwrap_or(UNMAPPED_CODE);
        let qualifier = if line.ends_with('R') {
            Qualifier::Restore
        } else {
            Qualifier::Event
        };

        let mut event = AlarmEvent::new(message, Protocol::Sia, account, code, qualifier);
        event.zone = caps.get(3).map(|m| m.as_str().to_string());
        event
            .extra_data
            .insert("sia_code".to_string(), sia_code.to_string());
        Some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::EventType;

    fn decode(s: &str) -> Option<AlarmEvent> {
        SiaDecoder.decode(s)
    }

    #[test]
    fn test_decode_fire_alarm() {
        let event = decode("#1234|NFA001").unwrap();
        assert_eq!(event.account_code, "1234");
        assert_eq!(event.event_code, "110");
        assert_eq!(event.event_type, EventType::Fire);
        assert_eq!(event.qualifier, Qualifier::Event);
        assert_eq!(event.zone.as_deref(), Some("001"));
        assert_eq!(event.user, None);
        assert_eq!(event.partition, None);
        assert_eq!(event.extra_data.get("sia_code").map(String::as_str), Some("FA"));
    }

    #[test]
    fn test_code_mapping() {
        let cases = [
            ("BA", "130"),
            ("FA", "110"),
            ("PA", "120"),
            ("MA", "100"),
            ("TA", "137"),
            ("OP", "400"),
            ("CL", "401"),
            ("TR", "300"),
            ("AT", "301"),
            ("YT", "302"),
            ("RP", "602"),
        ];
        for (sia, cid) in cases {
            let event = decode(&format!("#5555|N{sia}")).unwrap();
            assert_eq!(event.event_code, cid, "SIA {sia}");
        }
    }

    #[test]
    fn test_quoted_code_and_no_zone() {
        let event = decode("#1234|N\"BA\"").unwrap();
        assert_eq!(event.event_code, "130");
        assert_eq!(event.zone, None);
    }

    #[test]
    fn test_block_header_prefix() {
        let event = decode("#1234|Nri1/BA012").unwrap();
        assert_eq!(event.event_code, "130");
        assert_eq!(event.zone.as_deref(), Some("012"));
    }

    #[test]
    fn test_unknown_code_still_decodes() {
        let event = decode("#1234|NZZ005").unwrap();
        assert_eq!(event.event_type, EventType::Unknown);
        assert_eq!(event.event_code, UNMAPPED_CODE);
        assert_eq!(event.extra_data.get("sia_code").map(String::as_str), Some("ZZ"));
    }

    #[test]
    fn test_trailing_r_is_restore() {
        assert_eq!(decode("#1234|NFA001R").unwrap().qualifier, Qualifier::Restore);
        assert_eq!(decode("#1234|NFA001").unwrap().qualifier, Qualifier::Event);
        // Only the final character matters
        assert_eq!(decode("#1234|NTR").unwrap().qualifier, Qualifier::Restore);
    }

    #[test]
    fn test_rejects_non_sia() {
        assert!(decode("1234|NFA001").is_none());
        assert!(decode("#1234NFA001").is_none());
        assert!(decode("#1234|FA001").is_none());
        assert!(decode("#1234|Nfa001").is_none());
        assert!(decode("[1234 18 1 110 00 003]").is_none());
        assert!(decode("").is_none());
    }

    #[test]
    fn test_zone_digits_are_ascii() {
        let event = decode("#1234|NFA\u{0661}\u{0662}\u{0663}").unwrap();
        assert_eq!(event.zone, None);
        assert!(decode("#1234|Nri\u{0661}/FA001").is_none());
    }
}
