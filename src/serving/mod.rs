//! Serving side: the rule index, the live model store and hot reload.
//!
//! A [`Reloader`] watches one snapshot resource through a
//! [`FreshnessCheck`] and swaps freshly built [`RuleIndex`]es into a
//! [`ModelStore`]. [`RecommendService`] checks for a newer snapshot before
//! answering each request; [`http`] exposes it over axum.

pub mod freshness;
pub mod http;
pub mod index;
pub mod reloader;
pub mod service;
pub mod store;

pub use freshness::{FileSnapshot, Freshness, FreshnessCheck, ManualFreshness, SnapshotLoader};
pub use http::{router, serve, DEFAULT_PORT};
pub use index::RuleIndex;
pub use reloader::{ReloadOutcome, Reloader};
pub use service::{
    HealthReport, RecommendRequest, RecommendResponse, RecommendService, DEFAULT_MAX_RESULTS,
    SERVICE_VERSION,
};
pub use store::{LoadedModel, ModelStore};
