//! # Domain Models
//!
//! Entities returned to dashboard callers.
//!
//! Every entity is an immutable value built fresh per call, whether it was
//! fetched and normalized or synthesized. Real and synthetic values share one
//! shape, so nothing here records where a value came from.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`DomainMetrics`] | Authority, spam score and link counts for a domain |
//! | [`PageMetrics`] | Authority and link counts for a single URL |
//! | [`BacklinkProfile`] | Link splits, top linking domains/pages, anchor distribution |
//! | [`KeywordMetrics`] | Simulated volume, difficulty and ranking URLs |
//! | [`Target`] | Validated lookup key |
//! | [`UtcDateTime`] | UTC timestamp |

mod models;
mod target;
mod timestamp;

pub use models::{
    AnchorTextShare, BacklinkProfile, DomainMetrics, KeywordMetrics, LinkingDomain, LinkingPage,
    PageMetrics, RankingUrl, MAX_ANCHOR_TEXTS, MAX_MOZ_RANK, MAX_SCORE, MAX_TOP_LINKING_DOMAINS,
    MAX_TOP_LINKING_PAGES,
};
pub use target::Target;
pub use timestamp::UtcDateTime;
