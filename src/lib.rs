//! Nearest-eligible ODP recommendation for customer locations.

pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use config::LocalStorage;
#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use core::{
    batch::{BatchProgress, BatchRunner},
    engine::RecommendationEngine,
    matcher::Matcher,
    pipeline::RecommendationPipeline,
};
pub use domain::model::{
    CandidateNode, CapacityPolicy, CustomerRecord, Location, MatchConfig, RecommendationResult,
    RecommendationStatus, StatusSummary,
};
pub use utils::error::{RecommendError, Result};
