//! The privileged side of an export: owns the session, talks to the host,
//! and feeds prepared batches to the presenter.
//!
//! Preference changes that arrive while a pass is rendering never wait for
//! it. They update the session preferences immediately and mark a refresh;
//! when the pass ends, exactly one follow-up pass runs with whatever the
//! preferences are at that moment.

use std::cell::Cell;

use tracing::Instrument;

use crate::cache::RenderCache;
use crate::channel::{ControllerEnd, Inbox, Outbox};
use crate::config::ExportConfig;
use crate::host::{Host, SceneNode};
use crate::pass::{prepare_pass, ArchiveNaming};
use crate::protocol::{FailurePayload, ToController, ToPresenter};
use crate::scheduler::{RegenerationScheduler, Trigger};
use crate::selector;
use crate::target::{Preferences, Target};

/// User-facing notices and close messages.
pub mod notice {
    pub const NOTHING_SELECTED: &str = "Select a component or component set with variants.";
    pub const FILES_READY: &str = "Files ready. Click \"Save ZIP\" in the plugin window.";
    pub const PREPARE_FAILED: &str = "Failed to prepare export.";
    pub const SAVE_FAILED: &str = "Failed to save archive.";
    pub const ARCHIVE_SAVED: &str = "Archive saved.";
    pub const CANCELLED: &str = "Export cancelled.";

    pub fn preparing(count: usize) -> String {
        format!("Preparing {} files for export…", count)
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Saved,
    Cancelled,
    NothingSelected,
    ExportFailed { message: String },
    /// The presenter went away without saving or cancelling.
    Disconnected,
}

/// Export state for one invocation. Created when targets are known and
/// disposed when the invocation ends.
#[derive(Debug)]
pub struct Session<N: SceneNode> {
    pub targets: Vec<Target<N>>,
    pub preferences: Preferences,
    pub scheduler: RegenerationScheduler,
    pub cache: RenderCache<N::Id>,
}

impl<N: SceneNode> Session<N> {
    pub fn new(targets: Vec<Target<N>>, preferences: Preferences) -> Self {
        Session {
            targets,
            preferences,
            scheduler: RegenerationScheduler::new(),
            cache: RenderCache::new(),
        }
    }

    pub fn dispose(self) {
        let stats = self.cache.stats();
        tracing::debug!(
            targets = self.targets.len(),
            passes = self.scheduler.passes(),
            cache_hits = stats.hits,
            cache_misses = stats.misses,
            "Session disposed"
        );
    }
}

pub struct Controller<H: Host> {
    host: H,
    naming: ArchiveNaming,
    preferences: Preferences,
    channel: ControllerEnd,
}

impl<H: Host> Controller<H> {
    pub fn new(host: H, config: &ExportConfig, channel: ControllerEnd) -> Self {
        Controller {
            host,
            naming: config.naming(),
            preferences: config.preferences(),
            channel,
        }
    }

    /// Run the invocation to completion. The channel end is dropped on
    /// return, which ends the presenter's loop.
    pub async fn run(self) -> Outcome {
        let Controller {
            host,
            naming,
            preferences,
            channel,
        } = self;
        let ControllerEnd { outbox, mut inbox } = channel;

        let targets = selector::collect(&host.selection());
        if targets.is_empty() {
            host.notify(notice::NOTHING_SELECTED);
            host.close(None);
            return Outcome::NothingSelected;
        }

        let mut session = Session::new(targets, preferences);
        let driver = Driver {
            host: &host,
            naming: &naming,
            outbox: &outbox,
        };
        let outcome = driver.drive(&mut inbox, &mut session).await;
        session.dispose();

        tracing::info!(?outcome, "Controller finished");
        outcome
    }
}

enum Effect {
    None,
    Refresh,
    Finish(Outcome),
}

enum PassEnd {
    Done { follow_up: bool },
    Finished(Outcome),
}

struct Driver<'a, H: Host> {
    host: &'a H,
    naming: &'a ArchiveNaming,
    outbox: &'a Outbox<ToPresenter>,
}

impl<'a, H: Host> Driver<'a, H> {
    async fn drive(
        &self,
        inbox: &mut Inbox<ToController>,
        session: &mut Session<H::Node>,
    ) -> Outcome {
        let mut notify_user = true;
        let mut start = session.scheduler.request() == Trigger::Start;

        loop {
            while start {
                match self.run_pass(inbox, session, notify_user).await {
                    PassEnd::Done { follow_up } => start = follow_up,
                    PassEnd::Finished(outcome) => return outcome,
                }
                notify_user = false;
            }

            let Some(message) = inbox.recv().await else {
                self.host.close(None);
                return Outcome::Disconnected;
            };

            let mut invalidate = false;
            let effect = self.apply(message, &mut session.preferences, &mut invalidate);
            if invalidate {
                session.cache.invalidate_all(|_, _| true);
            }

            match effect {
                Effect::None => {}
                Effect::Refresh => {
                    start = !session.targets.is_empty()
                        && session.scheduler.request() == Trigger::Start;
                }
                Effect::Finish(outcome) => return self.finish(outcome),
            }
        }
    }

    async fn run_pass(
        &self,
        inbox: &mut Inbox<ToController>,
        session: &mut Session<H::Node>,
        notify_user: bool,
    ) -> PassEnd {
        let seq = session.scheduler.passes();
        let prefs = session.preferences;
        let Session {
            targets,
            preferences,
            scheduler,
            cache,
        } = session;

        let mut invalidate = false;
        let mut finish = None;
        let mut inbox_open = true;
        let stop = Cell::new(false);

        tracing::info!(seq, ?prefs, "Starting render pass");

        let result = {
            let pass = prepare_pass(
                self.host,
                targets.as_slice(),
                cache,
                prefs,
                self.naming,
                notify_user,
                &stop,
            )
            .instrument(tracing::info_span!("pass", seq));
            tokio::pin!(pass);

            // Messages are taken before the pass is polled, so a finishing
            // message stops the pass before its next render starts.
            loop {
                tokio::select! {
                    biased;

                    message = inbox.recv(), if inbox_open && finish.is_none() => match message {
                        Some(message) => match self.apply(message, preferences, &mut invalidate) {
                            Effect::None => {}
                            Effect::Refresh => {
                                scheduler.request();
                            }
                            Effect::Finish(outcome) => {
                                finish = Some(outcome);
                                stop.set(true);
                            }
                        },
                        None => {
                            inbox_open = false;
                            stop.set(true);
                        }
                    },

                    result = &mut pass => break result,
                }
            }
        };

        if invalidate {
            cache.invalidate_all(|_, _| true);
        }

        if let Some(outcome) = finish {
            tracing::warn!(seq, "Invocation ended during pass, discarding its result");
            scheduler.fail();
            return PassEnd::Finished(self.finish(outcome));
        }

        if !inbox_open {
            scheduler.fail();
            self.host.close(None);
            return PassEnd::Finished(Outcome::Disconnected);
        }

        match result {
            Ok(batch) => {
                tracing::debug!(seq, files = batch.files.len(), "Sending prepared batch");
                if self
                    .outbox
                    .send(ToPresenter::PreparedBatch(batch.into()))
                    .is_err()
                {
                    scheduler.fail();
                    self.host.close(None);
                    return PassEnd::Finished(Outcome::Disconnected);
                }
                PassEnd::Done {
                    follow_up: scheduler.complete(),
                }
            }
            Err(error) => {
                scheduler.fail();
                let message = match std::error::Error::source(&error) {
                    Some(source) => format!("{}: {}", error, source),
                    None => error.to_string(),
                };
                tracing::error!(seq, error = %message, "Render pass failed");

                self.host.notify(notice::PREPARE_FAILED);
                let _ = self
                    .outbox
                    .send(ToPresenter::ExportFailed(FailurePayload {
                        message: message.clone(),
                    }));
                self.host.close(None);
                PassEnd::Finished(Outcome::ExportFailed { message })
            }
        }
    }

    fn apply(
        &self,
        message: ToController,
        preferences: &mut Preferences,
        invalidate: &mut bool,
    ) -> Effect {
        tracing::debug!(?message, "Presenter message");
        match message {
            ToController::ToggleInclude24(payload) => {
                preferences.include_size_24 = payload.value;
                Effect::Refresh
            }
            ToController::ToggleUpscale128(payload) => {
                preferences.upscale_128 = payload.value;
                Effect::Refresh
            }
            ToController::ChangeFormat(payload) => {
                preferences.output_format = payload.value;
                *invalidate = true;
                Effect::Refresh
            }
            ToController::BatchExported => Effect::Finish(Outcome::Saved),
            ToController::DownloadFailed(payload) => {
                tracing::warn!(message = %payload.message, "Presenter could not save the archive");
                self.host.notify(notice::SAVE_FAILED);
                Effect::None
            }
            ToController::Cancel => Effect::Finish(Outcome::Cancelled),
        }
    }

    fn finish(&self, outcome: Outcome) -> Outcome {
        match &outcome {
            Outcome::Saved => self.host.close(Some(notice::ARCHIVE_SAVED)),
            Outcome::Cancelled => self.host.close(Some(notice::CANCELLED)),
            _ => self.host.close(None),
        }
        outcome
    }
}
