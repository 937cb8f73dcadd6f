//! In-memory gateways.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};

use discordarr::catalog::{CatalogGateway, CatalogItem, MovieCategory};
use discordarr::error::{BridgeError, BridgeResult};
use discordarr::library::{AcquisitionRequest, AcquisitionResult, LibraryGateway};
use discordarr::notifications::{Actor, ConfirmationEvent, NotificationHandle, Notifier};

// ============================================================================
// Catalog
// ============================================================================

/// Serves a fixed listing. Can be taken down or held open mid-fetch.
pub struct FakeCatalog {
    listing: Mutex<Option<Vec<CatalogItem>>>,
    details: Mutex<HashMap<i64, CatalogItem>>,
    hold: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
    fetches: AtomicU64,
}

#[allow(dead_code)]
impl FakeCatalog {
    pub fn new(listing: Vec<CatalogItem>) -> Self {
        let details = listing.iter().map(|item| (item.id, item.clone())).collect();
        Self {
            listing: Mutex::new(Some(listing)),
            details: Mutex::new(details),
            hold: Mutex::new(None),
            fetches: AtomicU64::new(0),
        }
    }

    pub fn set_listing(&self, listing: Vec<CatalogItem>) {
        let mut details = self.details.lock().unwrap();
        for item in &listing {
            details.insert(item.id, item.clone());
        }
        *self.listing.lock().unwrap() = Some(listing);
    }

    pub fn add_detail(&self, item: CatalogItem) {
        self.details.lock().unwrap().insert(item.id, item);
    }

    pub fn go_down(&self) {
        *self.listing.lock().unwrap() = None;
        self.details.lock().unwrap().clear();
    }

    /// Make the next fetches block until `release` is notified.
    /// `entered` is notified once a fetch is parked.
    pub fn hold(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some((entered.clone(), release.clone()));
        (entered, release)
    }

    pub fn fetches(&self) -> u64 {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogGateway for FakeCatalog {
    async fn fetch(&self, _category: MovieCategory) -> BridgeResult<Vec<CatalogItem>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        let hold = self.hold.lock().unwrap().take();
        if let Some((entered, release)) = hold {
            entered.notify_one();
            release.notified().await;
        }

        self.listing
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BridgeError::CatalogUnavailable("connection refused".to_string()))
    }

    async fn fetch_detail(&self, id: i64) -> BridgeResult<CatalogItem> {
        self.details
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| BridgeError::CatalogUnavailable(format!("movie {} not found", id)))
    }
}

// ============================================================================
// Library
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
#[allow(dead_code)]
pub enum SubmitMode {
    Accept,
    Reject(String),
    Unreachable,
}

/// Records every submission. Accepted movies become known.
pub struct FakeLibrary {
    known: Mutex<Option<HashSet<i64>>>,
    submits: Mutex<Vec<AcquisitionRequest>>,
    mode: Mutex<SubmitMode>,
}

#[allow(dead_code)]
impl FakeLibrary {
    pub fn new(known: impl IntoIterator<Item = i64>) -> Self {
        Self {
            known: Mutex::new(Some(known.into_iter().collect())),
            submits: Mutex::new(Vec::new()),
            mode: Mutex::new(SubmitMode::Accept),
        }
    }

    pub fn set_mode(&self, mode: SubmitMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn go_down(&self) {
        *self.known.lock().unwrap() = None;
    }

    pub fn submits(&self) -> Vec<AcquisitionRequest> {
        self.submits.lock().unwrap().clone()
    }

    pub fn submitted_ids(&self) -> Vec<i64> {
        self.submits().iter().map(|r| r.tmdb_id).collect()
    }
}

#[async_trait]
impl LibraryGateway for FakeLibrary {
    async fn list_known_identifiers(&self) -> BridgeResult<HashSet<i64>> {
        self.known
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| BridgeError::LibraryUnavailable("connection refused".to_string()))
    }

    async fn submit(&self, request: &AcquisitionRequest) -> BridgeResult<AcquisitionResult> {
        self.submits.lock().unwrap().push(request.clone());

        let mode = self.mode.lock().unwrap().clone();
        match mode {
            SubmitMode::Accept => {
                if let Some(known) = self.known.lock().unwrap().as_mut() {
                    known.insert(request.tmdb_id);
                }
                Ok(AcquisitionResult {
                    accepted: true,
                    detail: format!("Added {}", request.title),
                })
            }
            SubmitMode::Reject(detail) => Ok(AcquisitionResult {
                accepted: false,
                detail,
            }),
            SubmitMode::Unreachable => Err(BridgeError::LibraryUnavailable(
                "connection refused".to_string(),
            )),
        }
    }
}

// ============================================================================
// Notifier
// ============================================================================

/// Hands out sequential handles (`msg-1`, `msg-2`, ...) and records what was said.
pub struct RecordingNotifier {
    next_id: AtomicU64,
    posts: Mutex<Vec<(NotificationHandle, i64)>>,
    added: Mutex<Vec<i64>>,
    said: Mutex<Vec<String>>,
    failing: Mutex<HashSet<i64>>,
    confirm_while_posting: Mutex<Option<(i64, Actor, mpsc::Sender<ConfirmationEvent>)>>,
}

#[allow(dead_code)]
impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            posts: Mutex::new(Vec::new()),
            added: Mutex::new(Vec::new()),
            said: Mutex::new(Vec::new()),
            failing: Mutex::new(HashSet::new()),
            confirm_while_posting: Mutex::new(None),
        }
    }

    /// The offer for `tmdb_id` gets confirmed by `actor` on `events` before
    /// `post` returns, like a user reacting faster than the bot can register.
    pub fn confirm_while_posting(
        &self,
        tmdb_id: i64,
        actor: Actor,
        events: mpsc::Sender<ConfirmationEvent>,
    ) {
        *self.confirm_while_posting.lock().unwrap() = Some((tmdb_id, actor, events));
    }

    /// Offers for `tmdb_id` fail to post.
    pub fn fail_posts_for(&self, tmdb_id: i64) {
        self.failing.lock().unwrap().insert(tmdb_id);
    }

    pub fn heal(&self) {
        self.failing.lock().unwrap().clear();
    }

    pub fn posts(&self) -> Vec<(NotificationHandle, i64)> {
        self.posts.lock().unwrap().clone()
    }

    pub fn posted_ids(&self) -> Vec<i64> {
        self.posts().into_iter().map(|(_, id)| id).collect()
    }

    pub fn handle_for(&self, tmdb_id: i64) -> Option<NotificationHandle> {
        self.posts()
            .into_iter()
            .find(|(_, id)| *id == tmdb_id)
            .map(|(handle, _)| handle)
    }

    pub fn added(&self) -> Vec<i64> {
        self.added.lock().unwrap().clone()
    }

    pub fn said(&self) -> Vec<String> {
        self.said.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn post(&self, item: &CatalogItem) -> BridgeResult<NotificationHandle> {
        if self.failing.lock().unwrap().contains(&item.id) {
            return Err(BridgeError::NotifierFailed("missing access".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let handle = NotificationHandle::new(format!("msg-{}", id));
        self.posts.lock().unwrap().push((handle.clone(), item.id));

        let early = self
            .confirm_while_posting
            .lock()
            .unwrap()
            .clone()
            .filter(|(id, _, _)| *id == item.id);
        if let Some((_, actor, events)) = early {
            events
                .send(ConfirmationEvent::new(handle.clone(), actor))
                .await
                .unwrap();
            // Let the consumer see the event before the caller registers.
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }

        Ok(handle)
    }

    async fn post_added(&self, item: &CatalogItem) -> BridgeResult<()> {
        self.added.lock().unwrap().push(item.id);
        Ok(())
    }

    async fn say(&self, text: &str) -> BridgeResult<()> {
        self.said.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
