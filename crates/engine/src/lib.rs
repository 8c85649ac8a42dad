// ABOUTME: Main library entry point for the gameday extraction engine.
// ABOUTME: Re-exports the public API: Engine, EngineBuilder, Settings, ArtifactRequest, RunReport, EngineError.

//! Gameday - produces printable roster, schedule, stats, box-score, and
//! article documents from college athletics websites.
//!
//! The engine navigates team and conference pages, normalizes their tables
//! and listings, and hands every artifact to a sink as a PDF.
//!
//! # Example
//!
//! ```no_run
//! use gameday_engine::{ArtifactRequest, Engine, EngineError, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EngineError> {
//!     let settings = Settings::from_json(&std::fs::read_to_string("settings.json").unwrap())?;
//!     let team = settings.team("northwestern")?;
//!     let engine = Engine::builder().settings(&settings).build()?;
//!     let request = ArtifactRequest {
//!         roster: true,
//!         ..Default::default()
//!     };
//!     let report = engine.run(team, &request).await?;
//!     println!("{} artifacts saved", report.succeeded().count());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod formats;
pub mod models;
pub mod naming;
pub mod navigate;
pub mod options;
pub mod providers;
pub mod render;
pub mod resource;
pub mod sink;
pub mod testing;

pub use crate::config::{
    ArticleDisplay, ArticleSource, Conference, Provider, Settings, SiteLayout, TeamIdentity,
};
pub use crate::engine::Engine;
pub use crate::error::{EngineError, ErrorCode};
pub use crate::models::{
    ArtifactKind, ArtifactOutcome, ArtifactRequest, BoxScoreCount, MatchCandidate,
    ResolveOutcome, ResolvedBoxScore, RunReport,
};
pub use crate::navigate::{Navigator, NavigatorFactory, Session};
pub use crate::options::{EngineBuilder, EngineOptions};
pub use crate::providers::{resolver_for, BoxScoreResolver};
pub use crate::render::{Renderer, WkhtmltopdfRenderer};
pub use crate::resource::{FetchResult, Fetcher, ReqwestFetcher};
pub use crate::sink::{ArtifactSink, DirectorySink};
pub use gameday_tables::DateRange;
