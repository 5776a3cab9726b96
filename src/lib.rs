// MIT License - Copyright (c) 2026 Peter Wright
// Alarm receiver library
//
//! # alarm-receiver
//!
//! Ingests line-oriented alarm signaling from panels and central-station
//! receivers over TCP, decodes Ademco Contact ID and SIA DC-04 messages,
//! and turns them into severity-classified alerts.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use alarm_receiver::{
//!     AlarmAccount, AlarmReceiverService, AlarmServer, MemoryAlertStore, ServerConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = Arc::new(MemoryAlertStore::new());
//!     let service = Arc::new(AlarmReceiverService::new(store));
//!     service.register_account(
//!         AlarmAccount::new("1234", "Main Street Office").with_location(40.71, -74.0),
//!     );
//!     service.register_handler(|event, account| {
//!         println!("{:?} {:?}", event, account.map(|a| &a.name));
//!         Ok(())
//!     });
//!
//!     let config = ServerConfig::builder().port(5000).build();
//!     let server = AlarmServer::bind(config, service).await?;
//!     server
//!         .run_until(async {
//!             let _ = tokio::signal::ctrl_c().await;
//!         })
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod alert;
pub mod config;
pub mod constants;
pub mod error;
pub mod event;
pub mod protocol;
pub mod server;
pub mod service;
pub mod taxonomy;

// Re-exports for convenience
pub use account::{AccountRegistry, AlarmAccount};
pub use alert::{
    Alert, AlertPayload, AlertStatus, AlertStore, JsonLinesAlertStore, LogAlertStore,
    MemoryAlertStore,
};
pub use config::{ReceiverConfig, ServerConfig, ServerConfigBuilder};
pub use error::{HandlerError, ReceiverError, Result};
pub use event::{AlarmEvent, Protocol, Qualifier};
pub use protocol::{ContactIdDecoder, Decoder, DecoderChain, SiaDecoder};
pub use server::AlarmServer;
pub use service::{AlarmReceiverService, EventHandler};
pub use taxonomy::{EventType, Severity};
