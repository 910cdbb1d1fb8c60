//! The unprivileged side of an export: shows the prepared batch, forwards
//! preference changes, and assembles and saves the archive.
//!
//! The presenter never touches the host. Everything it knows arrives over
//! the channel, and everything it asks for leaves over it.

use std::path::PathBuf;

use tokio::sync::{mpsc, watch};
use varpack_format::{DosDateTime, ZipBuilder, MIME_TYPE};

use crate::channel::PresenterEnd;
use crate::config::DEFAULT_ARCHIVE_NAME;
use crate::protocol::{PreparedFile, ToController, ToPresenter};
use crate::save::SaveTarget;
use crate::target::{OutputFormat, Preferences};

/// Status line texts.
pub mod status {
    pub const PREPARING: &str = "Preparing export…";
    pub const UPDATING: &str = "Updating file list…";
    pub const NO_DATA: &str = "No data to export.";
    pub const EXPORT_ERROR: &str = "Export error. Check console.";
    pub const CREATING: &str = "Creating ZIP archive…";
    pub const CREATE_FAILED: &str = "Failed to create archive.";
    pub const SAVED: &str = "Archive saved.";

    pub fn ready(count: usize) -> String {
        format!("Ready to export {} files. Click \"Save ZIP\".", count)
    }
}

/// Something the user did in the presenter window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    ToggleInclude24(bool),
    ToggleUpscale128(bool),
    ChangeFormat(OutputFormat),
    Save,
    Cancel,
}

/// Everything the presenter window shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterState {
    pub files: Vec<PreparedFile>,
    pub archive_name: String,
    pub preferences: Preferences,
    pub status: String,
    pub save_enabled: bool,
    pub cancel_enabled: bool,
    /// Set from a preference change until the next batch or failure arrives.
    pub refreshing: bool,
    /// Number of batches received so far.
    pub batches: usize,
}

impl Default for PresenterState {
    fn default() -> Self {
        PresenterState {
            files: Vec::new(),
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            preferences: Preferences::default(),
            status: status::PREPARING.to_string(),
            save_enabled: false,
            cancel_enabled: true,
            refreshing: true,
            batches: 0,
        }
    }
}

impl PresenterState {
    /// The 128 px option only applies to raster output.
    pub fn upscale_visible(&self) -> bool {
        self.preferences.output_format == OutputFormat::Raster
    }

    fn failure_shown(&self) -> bool {
        self.status == status::EXPORT_ERROR
    }

    /// A batch for `prefs` is on display and can be saved.
    pub fn is_ready_for(&self, prefs: &Preferences) -> bool {
        !self.refreshing && self.save_enabled && self.preferences == *prefs
    }
}

/// How the presenter side ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenterReport {
    /// Where the archive was saved, if it was.
    pub saved: Option<PathBuf>,
    /// Size of the saved archive in bytes.
    pub archive_len: Option<u64>,
    /// The message of an `export-failed` notification.
    pub failure: Option<String>,
    pub status: String,
}

pub struct Presenter<S: SaveTarget> {
    channel: PresenterEnd,
    saver: S,
    timestamp: Option<DosDateTime>,
    state: PresenterState,
    updates: watch::Sender<PresenterState>,
    saved: Option<(PathBuf, u64)>,
    failure: Option<String>,
}

impl<S: SaveTarget> Presenter<S> {
    pub fn new(channel: PresenterEnd, saver: S) -> Self {
        let state = PresenterState::default();
        let (updates, _) = watch::channel(state.clone());
        Presenter {
            channel,
            saver,
            timestamp: None,
            state,
            updates,
            saved: None,
            failure: None,
        }
    }

    /// Stamp every archive with `timestamp` instead of the time of saving.
    pub fn with_timestamp(mut self, timestamp: DosDateTime) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Observe state changes.
    pub fn subscribe(&self) -> watch::Receiver<PresenterState> {
        self.updates.subscribe()
    }

    pub fn state(&self) -> &PresenterState {
        &self.state
    }

    /// Process controller messages and user actions until the controller
    /// ends the session. Controller messages are handled first when both
    /// are ready. Closing `actions` before a save cancels the session.
    pub async fn run(mut self, mut actions: mpsc::UnboundedReceiver<UserAction>) -> PresenterReport {
        let mut actions_open = true;

        loop {
            tokio::select! {
                biased;

                message = self.channel.inbox.recv() => match message {
                    Some(message) => self.on_message(message),
                    None => break,
                },

                action = actions.recv(), if actions_open => match action {
                    Some(action) => self.on_action(action).await,
                    None => {
                        // The window is gone; end the session unless it was saved.
                        actions_open = false;
                        if self.saved.is_none() {
                            tracing::debug!("User actions closed, cancelling");
                            self.send(ToController::Cancel);
                        }
                    }
                },
            }
        }

        tracing::debug!(status = %self.state.status, "Presenter finished");
        let (saved, archive_len) = match self.saved {
            Some((path, len)) => (Some(path), Some(len)),
            None => (None, None),
        };
        PresenterReport {
            saved,
            archive_len,
            failure: self.failure,
            status: self.state.status,
        }
    }

    pub fn on_message(&mut self, message: ToPresenter) {
        match message {
            ToPresenter::PreparedBatch(batch) => {
                let count = batch.files.len();
                tracing::debug!(count, archive = %batch.archive_name, "Batch received");

                self.state.files = batch.files;
                self.state.archive_name = if batch.archive_name.is_empty() {
                    DEFAULT_ARCHIVE_NAME.to_string()
                } else {
                    batch.archive_name
                };
                self.state.preferences = batch.preferences;
                self.state.status = if count > 0 {
                    status::ready(count)
                } else {
                    status::NO_DATA.to_string()
                };
                self.state.save_enabled = count > 0;
                self.state.cancel_enabled = count > 0;
                self.state.refreshing = false;
                self.state.batches += 1;
            }
            ToPresenter::ExportFailed(failure) => {
                tracing::error!(message = %failure.message, "Export failed");
                self.state.status = status::EXPORT_ERROR.to_string();
                self.state.save_enabled = false;
                self.state.cancel_enabled = true;
                self.state.refreshing = false;
                self.failure = Some(failure.message);
            }
        }
        self.publish();
    }

    pub async fn on_action(&mut self, action: UserAction) {
        match action {
            UserAction::ToggleInclude24(value) => {
                self.state.preferences.include_size_24 = value;
                self.begin_refresh(ToController::toggle_include_24(value));
            }
            UserAction::ToggleUpscale128(value) => {
                self.state.preferences.upscale_128 = value;
                self.begin_refresh(ToController::toggle_upscale_128(value));
            }
            UserAction::ChangeFormat(format) => {
                self.state.preferences.output_format = format;
                self.begin_refresh(ToController::change_format(format));
            }
            UserAction::Save => self.save().await,
            UserAction::Cancel => {
                if !self.state.cancel_enabled {
                    tracing::debug!("Cancel ignored while disabled");
                    return;
                }
                self.send(ToController::Cancel);
            }
        }
    }

    fn begin_refresh(&mut self, message: ToController) {
        self.state.status = status::UPDATING.to_string();
        self.state.save_enabled = false;
        self.state.cancel_enabled = false;
        self.state.refreshing = true;
        self.publish();
        self.send(message);
    }

    async fn save(&mut self) {
        if !self.state.save_enabled || self.state.files.is_empty() {
            tracing::debug!("Save ignored while disabled");
            return;
        }

        self.state.save_enabled = false;
        self.state.cancel_enabled = false;
        self.state.status = status::CREATING.to_string();
        self.publish();

        let builder = match self.timestamp {
            Some(timestamp) => ZipBuilder::with_timestamp(timestamp),
            None => ZipBuilder::new(),
        };
        let entries = self
            .state
            .files
            .iter()
            .map(|file| (file.file_name.as_str(), file.bytes.as_slice()));

        let result = match builder.build(entries) {
            Ok(archive) => self
                .saver
                .save(&self.state.archive_name, MIME_TYPE, &archive)
                .await
                .map(|path| (path, archive.len() as u64))
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match result {
            Ok((path, len)) => {
                tracing::info!(path = %path.display(), len, "Archive saved");
                self.state.status = status::SAVED.to_string();
                self.saved = Some((path, len));
                self.publish();
                self.send(ToController::BatchExported);
            }
            Err(message) => {
                tracing::error!(%message, "Failed to create archive");
                self.state.status = status::CREATE_FAILED.to_string();
                self.state.save_enabled = true;
                self.state.cancel_enabled = true;
                self.publish();
                self.send(ToController::download_failed(message));
            }
        }
    }

    fn send(&self, message: ToController) {
        if let Err(error) = self.channel.outbox.send(message) {
            tracing::warn!(%error, "Controller is gone, message dropped");
        }
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }
}

/// Drive a presenter without a user: once the first batch arrives, switch
/// to `desired` preferences, wait for the matching batch and save it.
///
/// Returns without saving if the export fails or the presenter goes away.
/// Dropping `actions` on return lets the presenter end the session.
pub async fn autosave(
    mut updates: watch::Receiver<PresenterState>,
    actions: mpsc::UnboundedSender<UserAction>,
    desired: Preferences,
) {
    let first = match updates.wait_for(|s| s.batches > 0 || s.failure_shown()).await {
        Ok(state) => state.clone(),
        Err(_) => return,
    };
    if !first.save_enabled {
        tracing::debug!(status = %first.status, "Nothing to save");
        return;
    }

    let current = first.preferences;
    let mut changes = Vec::new();
    if current.output_format != desired.output_format {
        changes.push(UserAction::ChangeFormat(desired.output_format));
    }
    if current.include_size_24 != desired.include_size_24 {
        changes.push(UserAction::ToggleInclude24(desired.include_size_24));
    }
    if current.upscale_128 != desired.upscale_128 {
        changes.push(UserAction::ToggleUpscale128(desired.upscale_128));
    }
    for action in changes {
        if actions.send(action).is_err() {
            return;
        }
    }

    let ready = updates
        .wait_for(|s| s.is_ready_for(&desired) || s.failure_shown())
        .await
        .map(|state| state.is_ready_for(&desired));
    if let Ok(true) = ready {
        let _ = actions.send(UserAction::Save);
    }
}
