use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use once_cell::sync::Lazy;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{OcrResult, UploadFile};
use crate::services::ocr_client::OcrClient;
use crate::ui::BusyIndicator;

pub static ACCEPTED_EXTENSIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["pdf", "png", "jpg", "jpeg", "bmp", "tiff", "gif"]
        .into_iter()
        .collect()
});

pub static ACCEPTED_MIME_TYPES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "application/pdf",
        "image/png",
        "image/jpeg",
        "image/bmp",
        "image/tiff",
        "image/gif",
    ]
    .into_iter()
    .collect()
});

/// Where the current upload attempt stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Idle,
    InFlight { attempt_id: Uuid, file_name: String },
    Succeeded(Arc<OcrResult>),
    Failed(String),
}

/// Published to the coordinator once an attempt settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Succeeded(Arc<OcrResult>),
    Failed(String),
}

/// Raw outcome of a spawned upload, tagged with its attempt.
#[derive(Debug)]
pub struct Settlement {
    pub attempt_id: Uuid,
    pub outcome: AppResult<OcrResult>,
}

pub fn is_accepted(file: &UploadFile) -> bool {
    ACCEPTED_MIME_TYPES.contains(file.mime_type.as_str())
        || file
            .extension()
            .map(|ext| ACCEPTED_EXTENSIONS.contains(ext.as_str()))
            .unwrap_or(false)
}

/// Checks a path by name alone, before anything is read from disk.
pub fn validate_candidate(path: &Path) -> AppResult<()> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or(AppError::NoFileSelected)?;
    let probe = UploadFile::new(name.clone(), Vec::new());
    if is_accepted(&probe) {
        Ok(())
    } else {
        Err(AppError::UnsupportedFile { name })
    }
}

pub struct UploadController {
    client: OcrClient,
    outcome: UploadOutcome,
    max_file_size_bytes: u64,
    busy: Option<BusyIndicator>,
    settlements_tx: mpsc::UnboundedSender<Settlement>,
    settlements_rx: mpsc::UnboundedReceiver<Settlement>,
}

impl UploadController {
    pub fn new(client: OcrClient, max_file_size_bytes: u64) -> Self {
        let (settlements_tx, settlements_rx) = mpsc::unbounded_channel();
        Self {
            client,
            outcome: UploadOutcome::Idle,
            max_file_size_bytes,
            busy: None,
            settlements_tx,
            settlements_rx,
        }
    }

    pub fn outcome(&self) -> &UploadOutcome {
        &self.outcome
    }

    pub fn is_in_flight(&self) -> bool {
        matches!(self.outcome, UploadOutcome::InFlight { .. })
    }

    pub fn client(&self) -> &OcrClient {
        &self.client
    }

    /// Accepts the first of `paths`, reads it and starts the upload.
    /// Extra paths are ignored. Nothing is sent when validation fails.
    pub async fn select(&mut self, paths: &[PathBuf]) -> AppResult<Uuid> {
        if self.is_in_flight() {
            warn!("Selection rejected: an upload is already in flight");
            return Err(AppError::Busy);
        }

        let path = paths.first().ok_or(AppError::NoFileSelected)?;
        if paths.len() > 1 {
            debug!(ignored = paths.len() - 1, "Only the first file of a selection is uploaded");
        }

        validate_candidate(path).map_err(|e| {
            warn!(path = %path.display(), error_code = e.error_code(), "File rejected");
            e
        })?;

        let file = UploadFile::from_path(path).await?;
        self.begin(file)
    }

    /// Enters InFlight and spawns the transfer. This is the only way into
    /// InFlight, so at most one attempt is ever outstanding.
    pub fn begin(&mut self, file: UploadFile) -> AppResult<Uuid> {
        if self.is_in_flight() {
            return Err(AppError::Busy);
        }
        if !is_accepted(&file) {
            return Err(AppError::UnsupportedFile { name: file.name });
        }

        if file.size > self.max_file_size_bytes {
            warn!(
                file_name = %file.name,
                file_size = file.size,
                max_size = self.max_file_size_bytes,
                "File exceeds the advertised size limit, sending anyway"
            );
        }

        let attempt_id = Uuid::new_v4();
        info!(
            attempt_id = %attempt_id,
            file_name = %file.name,
            file_size = file.size,
            "Starting OCR upload"
        );

        self.busy = Some(BusyIndicator::start(&file.name));
        self.outcome = UploadOutcome::InFlight {
            attempt_id,
            file_name: file.name.clone(),
        };

        let client = self.client.clone();
        let tx = self.settlements_tx.clone();
        tokio::spawn(async move {
            let outcome = client.submit(&file).await;
            if tx.send(Settlement { attempt_id, outcome }).is_err() {
                debug!(attempt_id = %attempt_id, "Controller dropped before the upload settled");
            }
        });

        Ok(attempt_id)
    }

    /// Waits for the in-flight attempt to settle and returns the event for
    /// the coordinator.
    pub async fn next_event(&mut self) -> Option<UploadEvent> {
        loop {
            let settlement = self.settlements_rx.recv().await?;
            if let Some(event) = self.settle(settlement) {
                return Some(event);
            }
        }
    }

    /// Applies a settlement. Settlements for anything but the current attempt
    /// are dropped.
    pub fn settle(&mut self, settlement: Settlement) -> Option<UploadEvent> {
        let current = match &self.outcome {
            UploadOutcome::InFlight { attempt_id, .. } => *attempt_id,
            _ => {
                debug!(attempt_id = %settlement.attempt_id, "Settlement with no upload in flight");
                return None;
            }
        };
        if current != settlement.attempt_id {
            debug!(attempt_id = %settlement.attempt_id, "Stale settlement dropped");
            return None;
        }

        if let Some(busy) = self.busy.take() {
            busy.finish();
        }

        match settlement.outcome {
            Ok(result) => {
                info!(attempt_id = %current, "Upload succeeded");
                let result = Arc::new(result);
                self.outcome = UploadOutcome::Succeeded(Arc::clone(&result));
                Some(UploadEvent::Succeeded(result))
            }
            Err(e) => {
                error!(attempt_id = %current, error_code = e.error_code(), error = %e, "Upload failed");
                let message = e.to_string();
                self.outcome = UploadOutcome::Failed(message.clone());
                Some(UploadEvent::Failed(message))
            }
        }
    }

    /// Returns to Idle. Refused while an upload is in flight, since it cannot
    /// be cancelled.
    pub fn reset(&mut self) -> AppResult<()> {
        if self.is_in_flight() {
            return Err(AppError::Busy);
        }
        self.outcome = UploadOutcome::Idle;
        Ok(())
    }

    pub fn render_intake(&self) -> String {
        let mut out = String::from("Upload File\n");
        match &self.outcome {
            UploadOutcome::InFlight { file_name, .. } => {
                out.push_str(&format!("  Processing your file... ({})\n", file_name));
            }
            _ => {
                out.push_str("  Drop a file with: open <path>\n");
                out.push_str("  Supports: PDF, PNG, JPG, JPEG, BMP, TIFF, GIF\n");
                out.push_str(&format!(
                    "  Max file size: {}MB\n",
                    self.max_file_size_bytes / (1024 * 1024)
                ));
            }
        }
        out
    }
}
