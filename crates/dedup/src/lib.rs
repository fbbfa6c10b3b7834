//! `listwash-dedup`: business-record duplicate matching engine.
//!
//! Pure engine crate: receives pre-loaded tabs, returns match decisions,
//! duplicate reports and filtered rows. No store, CLI or file dependencies.

pub mod columns;
pub mod config;
pub mod error;
pub mod filter;
pub mod index;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod remove;
pub mod report;

pub use columns::ColumnMapping;
pub use config::{ColumnPreferences, FuzzyTieBreak, MatchConfig};
pub use error::EngineError;
pub use filter::{filter_tab, FilterOutcome};
pub use index::ExclusionIndex;
pub use matcher::Matcher;
pub use model::{MatchResult, NormalizedRecord, Record, Signal, Tab};
pub use remove::{remove_from_tab, RemovalKey, RemovalOutcome, RemovalSet};
pub use report::{check_tabs, CheckSummary, CrossSheetReport, ReportRow};
