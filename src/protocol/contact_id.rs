// MIT License - Copyright (c) 2026 Peter Wright
// Ademco Contact ID decoder

use std::sync::LazyLock;

use regex::Regex;

use crate::event::{AlarmEvent, Protocol, Qualifier};
use crate::protocol::Decoder;

/// `ACCT 18 Q XYZ GG CCC`, optionally wrapped in `[...]`.
///
/// Field widths are fixed: 4-digit account, literal `18`, 1-digit
/// qualifier, 3-digit event code, 2-digit partition, 3-digit zone/user.
static CONTACT_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\[?([0-9]{4}) 18 ([0-9]) ([0-9]{3}) ([0-9]{2}) ([0-9]{3})\]?$")
        .expect("Contact ID pattern is valid")
});

/// Decoder for Contact ID lines as relayed by central-station receivers.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactIdDecoder;

impl Decoder for ContactIdDecoder {
    fn protocol(&self) -> Protocol {
        Protocol::ContactId
    }

    fn decode(&self, message: &str) -> Option<AlarmEvent> {
        let caps = CONTACT_ID_PATTERN.captures(message.trim())?;
        let account = &caps[1];
        let qualifier = caps[2].chars().next().and_then(Qualifier::from_contact_id_digit)?;
        let code = &caps[3];
        let partition = &caps[4];
        let zone_or_user = &caps[5];

        let mut event = AlarmEvent::new(message, Protocol::ContactId, account, code, qualifier);
        event.partition = non_zero(partition);
        if is_user_code(code) {
            event.user = non_zero(zone_or_user);
        } else {
            event.zone = non_zero(zone_or_user);
        }
        Some(event)
    }
}

/// Codes in the 4xx/5xx/6xx families carry a user number instead of a zone.
fn is_user_code(code: &str) -> bool {
    matches!(code.as_bytes().first(), Some(b'4' | b'5' | b'6'))
}

/// An all-zero field means "not present".
fn non_zero(field: &str) -> Option<String> {
    if field.bytes().all(|b| b == b'0') {
        None
    } else {
        Some(field.to_string())
    }
}
