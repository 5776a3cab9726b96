// MIT License - Copyright (c) 2026 Peter Wright
// Protocol decoders

pub mod contact_id;
pub mod sia;

use std::sync::Arc;

use parking_lot::RwLock;

use crate::event::{AlarmEvent, Protocol};

pub use contact_id::ContactIdDecoder;
pub use sia::SiaDecoder;

/// A line-oriented alarm protocol decoder.
///
/// Implementations are pure: no I/O and no shared mutable state, so one
/// instance is shared by every connection.
pub trait Decoder: Send + Sync {
    /// Protocol tag of the events this decoder produces.
    fn protocol(&self) -> Protocol;

    /// Decode one line. `None` means the line is not in this protocol.
    fn decode(&self, message: &str) -> Option<AlarmEvent>;
}

/// Ordered list of decoders used for protocol auto-detection.
///
/// Built-in order is Contact ID, then SIA. Decoders registered later are
/// tried after the built-ins.
pub struct DecoderChain {
    decoders: RwLock<Vec<Arc<dyn Decoder>>>,
}

impl DecoderChain {
    /// A chain holding the built-in decoders.
    pub fn new() -> Self {
        let decoders: Vec<Arc<dyn Decoder>> =
            vec![Arc::new(ContactIdDecoder), Arc::new(SiaDecoder)];
        Self::with_decoders(decoders)
    }

    pub fn with_decoders(decoders: Vec<Arc<dyn Decoder>>) -> Self {
        Self {
            decoders: RwLock::new(decoders),
        }
    }

    /// Append a decoder to the end of the auto-detection order.
    pub fn register(&self, decoder: Arc<dyn Decoder>) {
        self.decoders.write().push(decoder);
    }

    /// Decode a message.
    ///
    /// With a hint, only decoders for that protocol are tried. Without one,
    /// decoders are tried in order and the first success wins.
    pub fn decode(&self, message: &str, hint: Option<&Protocol>) -> Option<AlarmEvent> {
        let decoders = self.decoders.read();
        decoders
            .iter()
            .filter(|d| hint.is_none_or(|p| d.protocol() == *p))
            .find_map(|d| d.decode(message))
    }

    pub fn protocols(&self) -> Vec<Protocol> {
        self.decoders.read().iter().map(|d| d.protocol()).collect()
    }
}

impl Default for DecoderChain {
    fn default() -> Self {
        Self::new()
    }
}
