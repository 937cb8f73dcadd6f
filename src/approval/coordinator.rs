//! Approval coordination.
//!
//! Maps posted notifications to the movies they offer and turns confirmation
//! events into at most one acquisition request per notification.

use std::collections::{HashMap, HashSet, VecDeque};

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info};

use crate::catalog::CatalogItem;
use crate::error::{BridgeError, BridgeResult};
use crate::library::{AcquisitionDefaults, AcquisitionRequest};
use crate::notifications::{Actor, NotificationHandle};

use super::models::{ApprovalState, NoOpReason, Notification, Registration, Resolution};

/// Resolved handles remembered so redelivered confirmations report `AlreadyResolved`.
const RESOLVED_MEMORY: usize = 1024;

/// Confirmations for untracked handles held until their notification is registered.
const EARLY_CONFIRMATION_CAPACITY: usize = 64;

struct PendingRecord {
    notification: Notification,
    item: CatalogItem,
}

/// Insertion-ordered set that forgets its oldest entries past `capacity`.
struct RecentHandles {
    order: VecDeque<NotificationHandle>,
    members: HashSet<NotificationHandle>,
    capacity: usize,
}

impl RecentHandles {
    fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::new(),
            members: HashSet::new(),
            capacity,
        }
    }

    fn insert(&mut self, handle: NotificationHandle) {
        if !self.members.insert(handle.clone()) {
            return;
        }
        self.order.push_back(handle);
        while self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
    }

    fn contains(&self, handle: &NotificationHandle) -> bool {
        self.members.contains(handle)
    }

    fn remove(&mut self, handle: &NotificationHandle) {
        if self.members.remove(handle) {
            self.order.retain(|h| h != handle);
        }
    }
}

#[derive(Default)]
struct EarlyConfirmations(VecDeque<(NotificationHandle, Actor)>);

impl EarlyConfirmations {
    /// Keep the first actor per handle; drop the oldest entry when full.
    fn park(&mut self, handle: NotificationHandle, actor: Actor) {
        if self.0.iter().any(|(h, _)| *h == handle) {
            return;
        }
        if self.0.len() == EARLY_CONFIRMATION_CAPACITY {
            self.0.pop_front();
        }
        self.0.push_back((handle, actor));
    }

    fn take(&mut self, handle: &NotificationHandle) -> Option<Actor> {
        let position = self.0.iter().position(|(h, _)| h == handle)?;
        self.0.remove(position).map(|(_, actor)| actor)
    }
}

struct Records {
    /// Only pending notifications; a record leaves this map when it is resolved.
    pending: HashMap<NotificationHandle, PendingRecord>,
    resolved: RecentHandles,
    early: EarlyConfirmations,
}

/// Owns the handle -> notification mapping and its approval states.
///
/// Resolving a notification removes its record under the map lock, so exactly
/// one confirmation can ever take it. Resolved notifications are then only
/// remembered by handle, in a bounded window.
pub struct ApprovalCoordinator {
    defaults: AcquisitionDefaults,
    /// The bot's own account (late-init, known once the chat connection is ready).
    system_actor: RwLock<Option<Actor>>,
    records: Mutex<Records>,
}

impl ApprovalCoordinator {
    pub fn new(defaults: AcquisitionDefaults) -> Self {
        Self {
            defaults,
            system_actor: RwLock::new(None),
            records: Mutex::new(Records {
                pending: HashMap::new(),
                resolved: RecentHandles::new(RESOLVED_MEMORY),
                early: EarlyConfirmations::default(),
            }),
        }
    }

    /// Set the account whose confirmations must be ignored.
    pub async fn set_system_actor(&self, actor: Actor) {
        info!("Ignoring confirmations from system account {}", actor);
        *self.system_actor.write().await = Some(actor);
    }

    pub async fn system_actor(&self) -> Option<Actor> {
        self.system_actor.read().await.clone()
    }

    /// Start tracking a posted notification for `item`.
    ///
    /// Fails if the handle is already pending, or if another pending
    /// notification already offers the same movie. A confirmation that reached
    /// the coordinator before this call is handed back in the registration.
    pub async fn register(
        &self,
        handle: NotificationHandle,
        item: CatalogItem,
    ) -> BridgeResult<Registration> {
        let mut records = self.records.lock().await;

        if records.pending.contains_key(&handle) {
            return Err(BridgeError::DuplicateNotification(handle));
        }

        if let Some(existing) = records
            .pending
            .values()
            .find(|record| record.notification.catalog_id == item.id)
        {
            return Err(BridgeError::DuplicateNotification(
                existing.notification.handle.clone(),
            ));
        }

        let notification = Notification {
            handle: handle.clone(),
            catalog_id: item.id,
            title: item.title.clone(),
            registered_at: chrono::Utc::now(),
        };

        records.resolved.remove(&handle);
        let early_confirmation = records.early.take(&handle);
        records.pending.insert(
            handle,
            PendingRecord {
                notification: notification.clone(),
                item,
            },
        );

        debug!(
            "Registered notification {} for movie {} ({})",
            notification.handle, notification.catalog_id, notification.title
        );
        if let Some(actor) = &early_confirmation {
            debug!(
                "Notification {} was confirmed by {} before it was registered",
                notification.handle, actor
            );
        }

        Ok(Registration {
            notification,
            early_confirmation,
        })
    }

    /// Handle one confirmation event.
    ///
    /// Only the first confirmation from an account other than the bot finds the
    /// notification pending and gets the acquisition request back; every later
    /// call for the same handle is a no-op. Confirmations for untracked handles
    /// are held until [`register`](Self::register) claims them.
    pub async fn resolve(&self, handle: &NotificationHandle, actor: &Actor) -> Resolution {
        if self.system_actor.read().await.as_ref() == Some(actor) {
            debug!("Ignoring self-triggered confirmation on {}", handle);
            return Resolution::NoOp(NoOpReason::SelfTriggered);
        }

        let mut records = self.records.lock().await;
        let Some(record) = records.pending.remove(handle) else {
            if records.resolved.contains(handle) {
                debug!(
                    "Notification {} already resolved, ignoring confirmation from {}",
                    handle, actor
                );
                return Resolution::NoOp(NoOpReason::AlreadyResolved);
            }
            debug!("Confirmation on untracked notification {}, holding it", handle);
            records.early.park(handle.clone(), actor.clone());
            return Resolution::NoOp(NoOpReason::UnknownNotification);
        };
        records.resolved.insert(handle.clone());
        drop(records);

        info!(
            "Notification {} for {} [{}] approved by {}",
            handle, record.notification.title, record.notification.catalog_id, actor
        );

        let request = AcquisitionRequest::from_item(&record.item, &self.defaults);
        Resolution::Acquire {
            notification: record.notification,
            item: record.item,
            request,
        }
    }

    /// Stop tracking a notification. No-op if absent.
    pub async fn forget(&self, handle: &NotificationHandle) {
        let mut records = self.records.lock().await;
        let removed = records.pending.remove(handle).is_some();
        records.resolved.remove(handle);
        records.early.take(handle);
        if removed {
            debug!("Forgot notification {}", handle);
        }
    }

    /// Current state of a notification, `None` once it is no longer tracked.
    pub async fn state(&self, handle: &NotificationHandle) -> Option<ApprovalState> {
        let records = self.records.lock().await;
        if records.pending.contains_key(handle) {
            Some(ApprovalState::Pending)
        } else if records.resolved.contains(handle) {
            Some(ApprovalState::Resolved)
        } else {
            None
        }
    }

    /// True if a pending notification already offers `catalog_id`.
    pub async fn is_pending(&self, catalog_id: i64) -> bool {
        self.records
            .lock()
            .await
            .pending
            .values()
            .any(|record| record.notification.catalog_id == catalog_id)
    }

    /// Number of notifications still waiting for a confirmation.
    pub async fn pending_count(&self) -> usize {
        self.records.lock().await.pending.len()
    }

    pub fn defaults(&self) -> &AcquisitionDefaults {
        &self.defaults
    }
}
