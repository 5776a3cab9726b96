// MIT License - Copyright (c) 2026 Peter Wright
// Alert records and the storage seam

use std::io::SeekFrom;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};
use tracing::{info, warn};
use uuid::Uuid;

use crate::account::AlarmAccount;
use crate::error::{ReceiverError, Result};
use crate::event::AlarmEvent;
use crate::taxonomy::{alert_title, Severity};

/// State of an alert when it is handed to the store. Later lifecycle
/// states belong to the downstream platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertStatus {
    Pending,
}

/// The event and matched account an alert was raised from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertPayload {
    pub event: AlarmEvent,
    pub account: Option<AlarmAccount>,
}

/// An alert raised from a non-restore alarm event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub title: String,
    pub severity: Severity,
    pub status: AlertStatus,
    /// `alarm:<protocol>`
    pub source: String,
    /// Account code of the transmitting panel
    pub source_id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub agency_id: Option<String>,
    pub payload: AlertPayload,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    /// Build a pending alert. Location and agency come from the account
    /// when one matched.
    pub fn from_event(event: &AlarmEvent, account: Option<&AlarmAccount>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: alert_title(&event.event_code, event.zone.as_deref()),
            severity: Severity::for_code(&event.event_code),
            status: AlertStatus::Pending,
            source: format!("alarm:{}", event.protocol),
            source_id: event.account_code.clone(),
            latitude: account.and_then(|a| a.latitude),
            longitude: account.and_then(|a| a.longitude),
            agency_id: account.and_then(|a| a.agency_id.clone()),
            payload: AlertPayload {
                event: event.clone(),
                account: account.cloned(),
            },
            created_at: Utc::now(),
        }
    }
}

/// Persistence collaborator for alerts.
///
/// Called concurrently from every connection; implementations provide
/// no ordering guarantee between connections.
#[async_trait]
pub trait AlertStore: Send + Sync {
    /// Save an alert and return the stored record.
    async fn save(&self, alert: Alert) -> Result<Alert>;
}

/// Alert store that only logs each alert and keeps nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAlertStore;

#[async_trait]
impl AlertStore for LogAlertStore {
    async fn save(&self, alert: Alert) -> Result<Alert> {
        info!(
            "Alert {} [{:?}] {} from {} ({})",
            alert.id, alert.severity, alert.title, alert.source_id, alert.source
        );
        Ok(alert)
    }
}

/// Alert store that keeps everything in memory.
///
/// Grows with every saved alert; meant for tests and embedding callers
/// that drain it themselves.
#[derive(Debug, Default)]
pub struct MemoryAlertStore {
    alerts: Mutex<Vec<Alert>>,
}

impl MemoryAlertStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all saved alerts, in save order.
    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

#[async_trait]
impl AlertStore for MemoryAlertStore {
    async fn save(&self, alert: Alert) -> Result<Alert> {
        self.alerts.lock().push(alert.clone());
        Ok(alert)
    }
}

/// Alert store that appends one JSON document per line to a file.
pub struct JsonLinesAlertStore {
    path: PathBuf,
    file: tokio::sync::Mutex<tokio::fs::File>,
}

impl JsonLinesAlertStore {
    /// Open (or create) the file in append mode.
    ///
    /// A file whose last record was cut short gets a terminating newline so
    /// the next record starts on its own line.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| {
                ReceiverError::storage(format!("cannot open {}: {e}", path.display()))
            })?;
        terminate_torn_record(&mut file).await.map_err(|e| {
            ReceiverError::storage(format!("cannot repair {}: {e}", path.display()))
        })?;
        Ok(Self {
            path,
            file: tokio::sync::Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl AlertStore for JsonLinesAlertStore {
    async fn save(&self, alert: Alert) -> Result<Alert> {
        let mut line = serde_json::to_vec(&alert)?;
        line.push(b'\n');
        let mut file = self.file.lock().await;
        let len = file
            .metadata()
            .await
            .map_err(|e| ReceiverError::storage(format!("stat {}: {e}", self.path.display())))?
            .len();
        if let Err(e) = write_record(&mut file, &line).await {
            // Drop whatever part of the record reached the file
            if let Err(trunc) = file.set_len(len).await {
                warn!("Cannot roll back partial write to {}: {trunc}", self.path.display());
            }
            return Err(ReceiverError::storage(format!(
                "write to {}: {e}",
                self.path.display()
            )));
        }
        Ok(alert)
    }
}

async fn write_record(file: &mut tokio::fs::File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line).await?;
    file.flush().await
}

/// Append `\n` if the file is non-empty and does not end with one.
async fn terminate_torn_record(file: &mut tokio::fs::File) -> std::io::Result<()> {
    if file.metadata().await?.len() == 0 {
        return Ok(());
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1)).await?;
    file.read_exact(&mut last).await?;
    if last[0] != b'\n' {
        file.write_all(b"\n").await?;
        file.flush().await?;
    }
    Ok(())
}
