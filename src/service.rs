// MIT License - Copyright (c) 2026 Peter Wright
// Alarm receiver orchestration

use std::net::IpAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::account::{AccountRegistry, AlarmAccount};
use crate::alert::{Alert, AlertStore};
use crate::error::{HandlerError, Result};
use crate::event::{AlarmEvent, Protocol};
use crate::protocol::{Decoder, DecoderChain};

/// Callback invoked for every decoded event, restores included.
pub type EventHandler = Arc<
    dyn Fn(&AlarmEvent, Option<&AlarmAccount>) -> std::result::Result<(), HandlerError>
        + Send
        + Sync,
>;

/// Turns raw panel lines into alerts.
///
/// One instance is shared (behind an `Arc`) by every connection. Accounts,
/// handlers and extra decoders are registered at startup; `process` only
/// reads them.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use alarm_receiver::{AlarmAccount, AlarmReceiverService, MemoryAlertStore};
///
/// # async fn run() -> alarm_receiver::Result<()> {
/// let store = Arc::new(MemoryAlertStore::new());
/// let service = AlarmReceiverService::new(store.clone());
/// service.register_account(AlarmAccount::new("1234", "Main Street"));
/// service.register_handler(|event, _account| {
///     println!("{} {}", event.account_code, event.event_code);
///     Ok(())
/// });
///
/// let alert = service.process("[1234 18 1 110 00 003]", None, None).await?;
/// assert_eq!(alert.unwrap().title, "Fire Alarm - Zone 003");
/// # Ok(())
/// # }
/// ```
pub struct AlarmReceiverService {
    decoders: DecoderChain,
    accounts: AccountRegistry,
    handlers: RwLock<Vec<EventHandler>>,
    store: Arc<dyn AlertStore>,
}

impl AlarmReceiverService {
    /// Create a service with the built-in decoders and no accounts or handlers.
    pub fn new(store: Arc<dyn AlertStore>) -> Self {
        Self {
            decoders: DecoderChain::new(),
            accounts: AccountRegistry::new(),
            handlers: RwLock::new(Vec::new()),
            store,
        }
    }

    /// Register or replace a site account.
    pub fn register_account(&self, account: AlarmAccount) {
        debug!("Registering account {}", account.account_code);
        self.accounts.register(account);
    }

    /// Add an event handler. Handlers run in registration order.
    pub fn register_handler<F>(&self, handler: F)
    where
        F: Fn(&AlarmEvent, Option<&AlarmAccount>) -> std::result::Result<(), HandlerError>
            + Send
            + Sync
            + 'static,
    {
        self.handlers.write().push(Arc::new(handler));
    }

    /// Add a decoder after the built-in ones in the auto-detection order.
    pub fn register_decoder(&self, decoder: Arc<dyn Decoder>) {
        info!("Registering decoder for protocol {}", decoder.protocol());
        self.decoders.register(decoder);
    }

    pub fn accounts(&self) -> &AccountRegistry {
        &self.accounts
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.read().len()
    }

    /// Process one panel line.
    ///
    /// Returns `Ok(None)` when the line decodes under no protocol, or when
    /// the event is a restore. Otherwise an alert is built, saved, and the
    /// stored record returned. Only storage failures are returned as errors;
    /// handler failures are logged and discarded.
    pub async fn process(
        &self,
        message: &str,
        protocol_hint: Option<&Protocol>,
        source_ip: Option<IpAddr>,
    ) -> Result<Option<Alert>> {
        let Some(mut event) = self.decoders.decode(message, protocol_hint) else {
            debug!("Undecodable message discarded: {:?}", message);
            return Ok(None);
        };

        if let Some(ip) = source_ip {
            event.extra_data.insert("source_ip".to_string(), ip.to_string());
        }

        let account = self.accounts.get(&event.account_code);
        match &account {
            Some(a) if !a.active => debug!("Event for inactive account {}", a.account_code),
            Some(_) => {}
            None => debug!("Event for unregistered account {}", event.account_code),
        }
        debug!(
            "Decoded {} event {}{} for account {}",
            event.protocol, event.qualifier, event.event_code, event.account_code
        );

        self.notify_handlers(&event, account.as_deref());

        if event.is_restore() {
            debug!(
                "Restore {} for account {}, no alert created",
                event.event_code, event.account_code
            );
            return Ok(None);
        }

        let alert = Alert::from_event(&event, account.as_deref());
        let saved = self.store.save(alert).await?;
        info!(
            "Alert {} [{}] {} from account {}",
            saved.id, saved.severity, saved.title, saved.source_id
        );
        Ok(Some(saved))
    }

    /// Run every handler; a failing or panicking handler never stops the rest.
    fn notify_handlers(&self, event: &AlarmEvent, account: Option<&AlarmAccount>) {
        // Clone out so a handler may register further handlers without deadlocking.
        let handlers: Vec<EventHandler> = self.handlers.read().clone();
        for (index, handler) in handlers.iter().enumerate() {
            match panic::catch_unwind(AssertUnwindSafe(|| handler(event, account))) {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Event handler {index} failed: {e}"),
                Err(_) => warn!("Event handler {index} panicked"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::alert::{AlertStatus, MemoryAlertStore};
    use crate::error::ReceiverError;
    use crate::event::Qualifier;
    use crate::taxonomy::Severity;

    fn service() -> (AlarmReceiverService, Arc<MemoryAlertStore>) {
        let store = Arc::new(MemoryAlertStore::new());
        (AlarmReceiverService::new(store.clone()), store)
    }

    struct FailingStore;

    #[async_trait]
    impl AlertStore for FailingStore {
        async fn save(&self, _alert: Alert) -> Result<Alert> {
            Err(ReceiverError::storage("database unavailable"))
        }
    }

    #[tokio::test]
    async fn test_fire_alarm_end_to_end() {
        let (service, store) = service();
        let alert = service
            .process("[1234 18 1 110 00 003]", None, None)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(alert.severity, Severity::Critical);
        assert_eq!(alert.title, "Fire Alarm - Zone 003");
        assert_eq!(alert.status, AlertStatus::Pending);
        assert_eq!(alert.source, "alarm:contact_id");
        assert_eq!(alert.source_id, "1234");
        let event = &alert.payload.event;
        assert_eq!(event.account_code, "1234");
        assert_eq!(event.event_code, "110");
        assert_eq!(event.qualifier, Qualifier::Event);
        assert_eq!(event.zone.as_deref(), Some("003"));
        assert_eq!(event.partition, None);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_restore_creates_no_alert() {
        let (service, store) = service();
        let result = service.process("[1234 18 3 110 00 003]", None, None).await.unwrap();
        assert!(result.is_none());
        assert!(store.is_empty());

        let result = service.process("#1234|NBA001R", None, None).await.unwrap();
        assert!(result.is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_previous_qualifier_creates_alert() {
        let (service, store) = service();
        let alert = service.process("1234 18 6 130 01 004", None, None).await.unwrap();
        assert_eq!(alert.unwrap().payload.event.qualifier, Qualifier::Previous);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_undecodable_message_is_silent() {
        let (service, store) = service();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        service.register_handler(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        for line in ["", "hello", "1234 18 1 110", "#1234", "[1234 18 9 110 00 003]"] {
            assert!(service.process(line, None, None).await.unwrap().is_none());
        }
        assert!(store.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_account_enrichment() {
        let (service, _store) = service();
        service.register_account(
            AlarmAccount::new("1234", "Main Street")
                .with_location(51.5, -0.12)
                .with_agency("agency-9"),
        );

        let alert = service.process("#1234|NFA002", None, None).await.unwrap().unwrap();
        assert_eq!(alert.source, "alarm:sia");
        assert_eq!(alert.latitude, Some(51.5));
        assert_eq!(alert.longitude, Some(-0.12));
        assert_eq!(alert.agency_id.as_deref(), Some("agency-9"));
        assert_eq!(alert.payload.account.unwrap().name, "Main Street");

        let alert = service.process("#7777|NFA002", None, None).await.unwrap().unwrap();
        assert_eq!(alert.latitude, None);
        assert_eq!(alert.agency_id, None);
        assert!(alert.payload.account.is_none());
    }

    #[tokio::test]
    async fn test_source_ip_recorded() {
        let (service, _store) = service();
        let ip: IpAddr = "10.1.2.3".parse().unwrap();
        let alert = service
            .process("1234 18 1 130 01 004", None, Some(ip))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            alert.payload.event.extra_data.get("source_ip").map(String::as_str),
            Some("10.1.2.3")
        );
    }

    #[tokio::test]
    async fn test_protocol_hint() {
        let (service, store) = service();
        let result = service
            .process("[1234 18 1 110 00 003]", Some(&Protocol::Sia), None)
            .await
            .unwrap();
        assert!(result.is_none());
        assert!(store.is_empty());

        let result = service
            .process("[1234 18 1 110 00 003]", Some(&Protocol::ContactId), None)
            .await
            .unwrap();
        assert!(result.is_some());
    }

    #[tokio::test]
    async fn test_handlers_see_restores_and_survive_failures() {
        let (service, store) = service();
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));

        service.register_handler(|_, _| Err("subscriber offline".into()));
        service.register_handler(|_, _| panic!("subscriber bug"));
        let log = seen.clone();
        service.register_handler(move |event, account| {
            log.lock().push((event.qualifier, account.map(|a| a.name.clone())));
            Ok(())
        });
        service.register_account(AlarmAccount::new("1234", "Main Street"));
        assert_eq!(service.handler_count(), 3);

        service.process("[1234 18 1 110 00 003]", None, None).await.unwrap();
        service.process("[1234 18 3 110 00 003]", None, None).await.unwrap();

        let seen = seen.lock().clone();
        assert_eq!(
            seen,
            vec![
                (Qualifier::Event, Some("Main Street".to_string())),
                (Qualifier::Restore, Some("Main Street".to_string())),
            ]
        );
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_storage_failure_propagates_after_handlers() {
        let service = AlarmReceiverService::new(Arc::new(FailingStore));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        service.register_handler(move |_, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let err = service
            .process("[1234 18 1 110 00 003]", None, None)
            .await
            .unwrap_err();
        assert!(err.is_storage());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Restores never reach the store
        assert!(service.process("[1234 18 3 110 00 003]", None, None).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unknown_code_alert() {
        let (service, _store) = service();
        let alert = service.process("1234 18 1 777 00 001", None, None).await.unwrap().unwrap();
        assert_eq!(alert.title, "Alarm Event 777 - Zone 001");
        assert_eq!(alert.severity, Severity::Medium);
    }
}
