//! Common test infrastructure
//!
//! In-memory gateways standing in for TMDB, Radarr and Discord, plus fixture
//! builders. Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{movie, TestBridge};
//!
//! #[tokio::test]
//! async fn test_pass() {
//!     let env = TestBridge::new(vec![movie(10, "Alien")], [10]);
//!     let report = env.bridge.run_pass(MovieCategory::Upcoming).await.unwrap();
//!     assert_eq!(report.missing, 0);
//! }
//! ```

mod fakes;
mod fixtures;

// Public API - this is what tests import
#[allow(unused_imports)]
pub use fakes::{FakeCatalog, FakeLibrary, RecordingNotifier, SubmitMode};
#[allow(unused_imports)]
pub use fixtures::*;
