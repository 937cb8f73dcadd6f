//! Fixture builders shared by the end-to-end tests.

use std::sync::Arc;

use discordarr::bridge::Bridge;
use discordarr::catalog::CatalogItem;
use discordarr::library::AcquisitionDefaults;

use super::fakes::{FakeCatalog, FakeLibrary, RecordingNotifier};

pub const CHANNEL_ID: &str = "555";
pub const BOT_USER_ID: &str = "900";
pub const USER_A: &str = "101";
pub const USER_B: &str = "102";
pub const CONFIRM_EMOJI: &str = "👍";

pub fn movie(id: i64, title: &str) -> CatalogItem {
    CatalogItem {
        id,
        title: title.to_string(),
        release_date: Some("2024-05-17".to_string()),
        overview: format!("Overview of {}", title),
        poster_path: Some(format!("/poster-{}.jpg", id)),
        popularity: 10.0,
        vote_average: 7.5,
        vote_count: 100,
    }
}

/// A bridge wired to in-memory gateways, with handles on each fake.
#[allow(dead_code)]
pub struct TestBridge {
    pub bridge: Arc<Bridge>,
    pub catalog: Arc<FakeCatalog>,
    pub library: Arc<FakeLibrary>,
    pub notifier: Arc<RecordingNotifier>,
}

#[allow(dead_code)]
impl TestBridge {
    pub fn new(candidates: Vec<CatalogItem>, known: impl IntoIterator<Item = i64>) -> Self {
        let catalog = Arc::new(FakeCatalog::new(candidates));
        let library = Arc::new(FakeLibrary::new(known));
        let notifier = Arc::new(RecordingNotifier::new());
        let bridge = Arc::new(Bridge::new(
            catalog.clone(),
            library.clone(),
            notifier.clone(),
            AcquisitionDefaults::default(),
            None,
        ));

        Self {
            bridge,
            catalog,
            library,
            notifier,
        }
    }
}

/// Poll `condition` until it holds or two seconds pass.
#[allow(dead_code)]
pub async fn eventually(condition: impl Fn() -> bool) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    condition()
}
