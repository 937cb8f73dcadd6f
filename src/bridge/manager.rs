//! Reconciliation and approval workflow.
//!
//! Ties the catalog, the library and the chat channel together: runs
//! reconciliation passes, posts one offer per missing movie, and turns
//! confirmations into library submissions.

use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};

use crate::approval::{ApprovalCoordinator, NoOpReason, Resolution};
use crate::catalog::{CatalogGateway, CatalogItem, MovieCategory};
use crate::error::{BridgeError, BridgeResult};
use crate::library::{AcquisitionDefaults, AcquisitionRequest, AcquisitionResult, LibraryGateway};
use crate::notifications::{ConfirmationEvent, Notifier};
use crate::reconcile::ReconciliationEngine;

use super::commands::BotCommand;

pub const PING_REPLY: &str = "yes - Discordarr is alive!";

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PassReport {
    pub category: Option<MovieCategory>,
    /// Candidates returned by the catalog.
    pub candidates: usize,
    /// Candidates absent from the library.
    pub missing: usize,
    /// Offers posted and registered in this pass.
    pub notified: usize,
    /// Missing movies skipped because an earlier offer is still pending.
    pub skipped_pending: usize,
    /// Missing movies whose offer could not be posted.
    pub post_failures: usize,
    /// Candidates dropped because their release date could not be read.
    pub rejected_dates: usize,
}

/// What happened to one confirmation event.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmationOutcome {
    /// The library accepted the movie.
    Added { tmdb_id: i64, title: String },
    /// The library call failed. The notification stays resolved.
    SubmitFailed { tmdb_id: i64, error: String },
    /// Nothing was submitted.
    Ignored(NoOpReason),
}

/// Explicit context holding the gateways, the engine and the coordinator.
pub struct Bridge {
    catalog: Arc<dyn CatalogGateway>,
    library: Arc<dyn LibraryGateway>,
    notifier: Arc<dyn Notifier>,
    engine: ReconciliationEngine,
    coordinator: Arc<ApprovalCoordinator>,
    /// Held for the whole duration of a pass; passes never overlap.
    pass_lock: Mutex<()>,
}

impl Bridge {
    pub fn new(
        catalog: Arc<dyn CatalogGateway>,
        library: Arc<dyn LibraryGateway>,
        notifier: Arc<dyn Notifier>,
        defaults: AcquisitionDefaults,
        months_ahead: Option<u32>,
    ) -> Self {
        let engine = ReconciliationEngine::new(catalog.clone(), library.clone(), months_ahead);
        Self {
            catalog,
            library,
            notifier,
            engine,
            coordinator: Arc::new(ApprovalCoordinator::new(defaults)),
            pass_lock: Mutex::new(()),
        }
    }

    pub fn coordinator(&self) -> Arc<ApprovalCoordinator> {
        self.coordinator.clone()
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// Run one reconciliation pass over `category`.
    ///
    /// Fails with [`BridgeError::PassInFlight`] if another pass is running. A
    /// gateway failure aborts the pass before anything is posted.
    pub async fn run_pass(&self, category: MovieCategory) -> BridgeResult<PassReport> {
        let Ok(_guard) = self.pass_lock.try_lock() else {
            info!("Reconciliation pass over {} movies rejected: another pass is running", category);
            return Err(BridgeError::PassInFlight);
        };

        let report = match self.engine.find_missing(category).await {
            Ok(report) => report,
            Err(e) => {
                error!("Reconciliation pass over {} movies aborted: {}", category, e);
                return Err(e);
            }
        };

        let mut pass = PassReport {
            category: Some(category),
            candidates: report.candidates,
            missing: report.missing.len(),
            rejected_dates: report.rejected.len(),
            ..Default::default()
        };

        for item in report.missing {
            if self.coordinator.is_pending(item.id).await {
                debug!(
                    "{} [{}] already has a pending offer, not posting again",
                    item.title, item.id
                );
                pass.skipped_pending += 1;
                continue;
            }

            let handle = match self.notifier.post(&item).await {
                Ok(handle) => handle,
                Err(e) => {
                    warn!("Failed to post offer for {} [{}]: {}", item.title, item.id, e);
                    pass.post_failures += 1;
                    continue;
                }
            };

            info!(
                "Title: {} [{}] Release Date: {} Overview: {} Poster Path: {}",
                item.title,
                item.id,
                item.release_label(),
                item.overview,
                item.poster_path.as_deref().unwrap_or("none")
            );

            match self.coordinator.register(handle.clone(), item).await {
                Ok(registration) => {
                    pass.notified += 1;
                    if let Some(actor) = registration.early_confirmation {
                        info!("Offer {} was confirmed while being posted", handle);
                        let outcome = self
                            .handle_confirmation(ConfirmationEvent::new(handle, actor))
                            .await;
                        debug!("Early confirmation outcome: {:?}", outcome);
                    }
                }
                Err(e) => warn!("Posted offer could not be tracked: {}", e),
            }
        }

        info!(
            "Reconciliation pass over {} movies done: {} candidates, {} missing, {} offered, {} already pending, {} failed to post",
            category,
            pass.candidates,
            pass.missing,
            pass.notified,
            pass.skipped_pending,
            pass.post_failures
        );

        Ok(pass)
    }

    // =========================================================================
    // Approval
    // =========================================================================

    /// Handle one confirmation event.
    ///
    /// Submits at most once per notification. A failed submission is reported
    /// to the channel and is not retried by confirming again.
    pub async fn handle_confirmation(&self, event: ConfirmationEvent) -> ConfirmationOutcome {
        let (item, request) = match self.coordinator.resolve(&event.handle, &event.actor).await {
            Resolution::Acquire { item, request, .. } => (item, request),
            Resolution::NoOp(reason) => return ConfirmationOutcome::Ignored(reason),
        };

        info!("Reaction requested tmdbid {}", item.id);
        match self.submit_and_report(&item, &request, false).await {
            Ok(_) => ConfirmationOutcome::Added {
                tmdb_id: item.id,
                title: item.title,
            },
            Err(e) => ConfirmationOutcome::SubmitFailed {
                tmdb_id: item.id,
                error: e.to_string(),
            },
        }
    }

    /// Consume confirmation events one at a time until the stream closes.
    pub async fn run_confirmations(&self, mut events: mpsc::Receiver<ConfirmationEvent>) {
        info!("Listening for confirmations");
        while let Some(event) = events.recv().await {
            let outcome = self.handle_confirmation(event).await;
            debug!("Confirmation handled: {:?}", outcome);
        }
        info!("Confirmation stream closed");
    }

    /// Add a movie by catalog id without going through an offer.
    pub async fn acquire_by_id(&self, tmdb_id: i64) -> BridgeResult<AcquisitionResult> {
        info!("GetMovie command requested tmdbid {}", tmdb_id);

        let item = match self.catalog.fetch_detail(tmdb_id).await {
            Ok(item) => item,
            Err(e) => {
                error!("Failed to look up movie {}: {}", tmdb_id, e);
                self.say(&format!("Could not look up movie {}: {}", tmdb_id, e))
                    .await;
                return Err(e);
            }
        };

        let request = AcquisitionRequest::from_item(&item, self.coordinator.defaults());
        self.submit_and_report(&item, &request, true).await
    }

    /// Submit once, then tell the channel how it went.
    async fn submit_and_report(
        &self,
        item: &CatalogItem,
        request: &AcquisitionRequest,
        announce_with_card: bool,
    ) -> BridgeResult<AcquisitionResult> {
        match serde_json::to_string(request) {
            Ok(json) => info!("Add Movie Request: {}", json),
            Err(e) => warn!("Failed to encode add request for logging: {}", e),
        }

        let result = match self.library.submit(request).await {
            Ok(result) if result.accepted => Ok(result),
            Ok(result) => Err(BridgeError::LibraryRejected {
                tmdb_id: item.id,
                detail: result.detail,
            }),
            Err(e) => Err(e),
        };

        match &result {
            Ok(accepted) => {
                info!("{}", accepted.detail);
                let announced = if announce_with_card {
                    self.notifier.post_added(item).await
                } else {
                    self.notifier.say(&added_message(&item.title)).await
                };
                if let Err(e) = announced {
                    warn!("Failed to announce {} [{}]: {}", item.title, item.id, e);
                }
                info!("{}", added_message(&item.title));
            }
            Err(e) => {
                error!("Failed to add {} [{}] to Radarr: {}", item.title, item.id, e);
                self.say(&format!(
                    "Could not add {} [{}] to Radarr: {}",
                    item.title, item.id, e
                ))
                .await;
            }
        }

        result
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Execute a chat command, replying in the channel.
    pub async fn handle_command(&self, command: BotCommand) {
        match command {
            BotCommand::Ping => self.say(PING_REPLY).await,
            BotCommand::Check(category) => match self.run_pass(category).await {
                Ok(report) if report.missing == 0 => {
                    self.say(&format!(
                        "All {} movies are already in Radarr.",
                        category
                    ))
                    .await;
                }
                Ok(_) => {}
                Err(BridgeError::PassInFlight) => {
                    self.say("A check is already running, try again once it is done.")
                        .await;
                }
                Err(e) => {
                    self.say(&format!("Could not check {} movies: {}", category, e))
                        .await;
                }
            },
            BotCommand::GetMovie(tmdb_id) => {
                // Failures are already reported to the channel.
                let _ = self.acquire_by_id(tmdb_id).await;
            }
            BotCommand::Usage(usage) => self.say(usage).await,
        }
    }

    async fn say(&self, text: &str) {
        if let Err(e) = self.notifier.say(text).await {
            warn!("Failed to post status message: {}", e);
        }
    }
}

fn added_message(title: &str) -> String {
    format!(
        "{} has been added to Radarr, set to monitored and search has started!",
        title
    )
}
