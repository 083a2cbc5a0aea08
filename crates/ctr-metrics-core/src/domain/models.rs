use serde::{Deserialize, Serialize};

use crate::UtcDateTime;

/// Upper bound for authority, spam, difficulty and opportunity scores.
pub const MAX_SCORE: u8 = 100;
/// Upper bound for the rank value.
pub const MAX_MOZ_RANK: f64 = 10.0;

pub const MAX_TOP_LINKING_DOMAINS: usize = 10;
pub const MAX_TOP_LINKING_PAGES: usize = 10;
pub const MAX_ANCHOR_TEXTS: usize = 20;

/// Authority snapshot for a whole domain.
///
/// `last_updated` stamps when this client produced the value, not when the
/// upstream last crawled the domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainMetrics {
    pub domain: String,
    pub domain_authority: u8,
    pub page_authority: u8,
    /// Widened to 0-100 for the dashboards; the upstream metric is natively coarser.
    pub spam_score: u8,
    pub total_backlinks: u64,
    pub linking_domains: u64,
    pub moz_rank: f64,
    pub last_updated: UtcDateTime,
}

/// Authority snapshot for a single URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetrics {
    pub url: String,
    pub page_authority: u8,
    pub moz_rank: f64,
    pub total_backlinks: u64,
    pub linking_domains: u64,
    pub last_updated: UtcDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkingDomain {
    pub domain: String,
    pub backlinks: u64,
    pub domain_authority: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkingPage {
    pub url: String,
    pub page_authority: u8,
    pub anchor_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorTextShare {
    pub anchor_text: String,
    pub count: u64,
    /// Share of all anchor occurrences in the sample, truncated to one decimal.
    pub percentage: f64,
}

/// Inbound link profile of a domain.
///
/// Follow/nofollow and external/internal splits each approximate the total;
/// the lists are ordered highest impact first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacklinkProfile {
    pub total_backlinks: u64,
    pub linking_domains: u64,
    pub follow_backlinks: u64,
    pub nofollow_backlinks: u64,
    pub external_backlinks: u64,
    pub internal_backlinks: u64,
    pub top_linking_domains: Vec<LinkingDomain>,
    pub top_linking_pages: Vec<LinkingPage>,
    pub anchor_text_distribution: Vec<AnchorTextShare>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingUrl {
    pub url: String,
    /// 1-based search position.
    pub position: u32,
    pub page_authority: u8,
}

/// Simulated keyword outlook. The upstream API has no keyword ranking
/// endpoint, so these values are always synthetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordMetrics {
    pub keyword: String,
    pub search_volume: u64,
    pub difficulty: u8,
    pub opportunity: u8,
    pub ranking_urls: Vec<RankingUrl>,
}
