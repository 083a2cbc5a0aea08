//! Raw upstream records → typed entities.
//!
//! Missing numbers read as zero, scores round half-up and clamp to 0-100,
//! counts clamp at zero, and the rank value rounds to two decimals. An empty
//! result set is a [`MetricsError`] of kind `NoData`.

use crate::metrics_source::MetricsError;
use crate::raw::{RawRecord, RawResponse};
use crate::{
    AnchorTextShare, BacklinkProfile, DomainMetrics, LinkingDomain, LinkingPage, PageMetrics,
    UtcDateTime, MAX_ANCHOR_TEXTS, MAX_MOZ_RANK, MAX_SCORE, MAX_TOP_LINKING_DOMAINS,
    MAX_TOP_LINKING_PAGES,
};

const DOMAIN_AUTHORITY: &[&str] = &["domain_authority"];
const PAGE_AUTHORITY: &[&str] = &["page_authority"];
const SPAM_SCORE: &[&str] = &["spam_score"];
const MOZ_RANK: &[&str] = &["mozrank", "moz_rank"];
const TOTAL_BACKLINKS: &[&str] = &[
    "total_backlinks",
    "external_pages_to_root_domain",
    "external_pages_to_page",
];
const LINKING_DOMAINS: &[&str] = &[
    "linking_domains",
    "root_domains_to_root_domain",
    "root_domains_to_page",
];

/// Normalizes a `url_metrics` answer scoped to a root domain.
///
/// # Errors
///
/// `NoData` when `raw.results` is empty.
pub fn to_domain_metrics(domain: &str, raw: &RawResponse) -> Result<DomainMetrics, MetricsError> {
    let record = raw.first().ok_or_else(|| MetricsError::no_data(domain))?;

    Ok(DomainMetrics {
        domain: domain.to_owned(),
        domain_authority: score(record.number(DOMAIN_AUTHORITY)),
        page_authority: score(record.number(PAGE_AUTHORITY)),
        spam_score: score(record.number(SPAM_SCORE)),
        total_backlinks: count(record.number(TOTAL_BACKLINKS)),
        linking_domains: count(record.number(LINKING_DOMAINS)),
        moz_rank: moz_rank(record.number(MOZ_RANK)),
        last_updated: UtcDateTime::now(),
    })
}

/// Normalizes a `url_metrics` answer scoped to a single page.
///
/// # Errors
///
/// `NoData` when `raw.results` is empty.
pub fn to_page_metrics(url: &str, raw: &RawResponse) -> Result<PageMetrics, MetricsError> {
    let record = raw.first().ok_or_else(|| MetricsError::no_data(url))?;

    Ok(PageMetrics {
        url: url.to_owned(),
        page_authority: score(record.number(PAGE_AUTHORITY)),
        moz_rank: moz_rank(record.number(MOZ_RANK)),
        total_backlinks: count(record.number(TOTAL_BACKLINKS)),
        linking_domains: count(record.number(LINKING_DOMAINS)),
        last_updated: UtcDateTime::now(),
    })
}

const ANCHOR_TEXT: &[&str] = &["anchor_text", "text"];
const INTERNAL_PAGES: &[&str] = &["internal_pages"];
const EXTERNAL_PAGES: &[&str] = &["external_pages"];
const NOFOLLOW_PAGES: &[&str] = &["internal_nofollow_pages", "external_nofollow_pages"];

/// Normalizes a backlink answer in either of two shapes.
///
/// An `anchor_text` answer lists one record per anchor; that list is the
/// anchor batch and the link totals are summed across it. Otherwise the first
/// result is a summary carrying the totals plus nested
/// `top_linking_domains`, `top_linking_pages` and `anchor_text` arrays.
///
/// # Errors
///
/// `NoData` when `raw.results` is empty.
pub fn to_backlink_profile(domain: &str, raw: &RawResponse) -> Result<BacklinkProfile, MetricsError> {
    let record = raw.first().ok_or_else(|| MetricsError::no_data(domain))?;

    if raw.results.iter().any(is_anchor_record) {
        return Ok(profile_from_anchor_batch(&raw.results));
    }

    let mut top_linking_domains = record
        .records(&["top_linking_domains", "linking_root_domains"])
        .iter()
        .filter_map(linking_domain)
        .collect::<Vec<_>>();
    top_linking_domains.sort_by(|a, b| b.backlinks.cmp(&a.backlinks));
    top_linking_domains.truncate(MAX_TOP_LINKING_DOMAINS);

    let mut top_linking_pages = record
        .records(&["top_linking_pages", "links"])
        .iter()
        .filter_map(linking_page)
        .collect::<Vec<_>>();
    top_linking_pages.sort_by(|a, b| b.page_authority.cmp(&a.page_authority));
    top_linking_pages.truncate(MAX_TOP_LINKING_PAGES);

    let anchors = record.records(&["anchor_text", "anchor_texts"]);

    Ok(BacklinkProfile {
        total_backlinks: count(record.number(TOTAL_BACKLINKS)),
        linking_domains: count(record.number(LINKING_DOMAINS)),
        follow_backlinks: count(record.number(&["follow_backlinks", "follow_links"])),
        nofollow_backlinks: count(record.number(&["nofollow_backlinks", "nofollow_links"])),
        external_backlinks: count(record.number(&["external_backlinks", "external_links"])),
        internal_backlinks: count(record.number(&["internal_backlinks", "internal_links"])),
        top_linking_domains,
        top_linking_pages,
        anchor_text_distribution: anchor_distribution(anchor_occurrences(&anchors)),
    })
}

/// A flat anchor record names its anchor as a string; a summary record
/// carries `anchor_text` as a nested array instead.
fn is_anchor_record(record: &RawRecord) -> bool {
    record.text(&["anchor_text"]).is_some()
}

fn profile_from_anchor_batch(anchors: &[RawRecord]) -> BacklinkProfile {
    let external_backlinks = sum(anchors, EXTERNAL_PAGES);
    let internal_backlinks = sum(anchors, INTERNAL_PAGES);
    let total_backlinks = external_backlinks.saturating_add(internal_backlinks);
    let nofollow_backlinks = NOFOLLOW_PAGES
        .iter()
        .fold(0_u64, |acc, key| acc.saturating_add(sum(anchors, &[*key])))
        .min(total_backlinks);

    BacklinkProfile {
        total_backlinks,
        linking_domains: sum(anchors, &["external_root_domains"]),
        follow_backlinks: total_backlinks - nofollow_backlinks,
        nofollow_backlinks,
        external_backlinks,
        internal_backlinks,
        top_linking_domains: Vec::new(),
        top_linking_pages: Vec::new(),
        anchor_text_distribution: anchor_distribution(anchor_occurrences(anchors)),
    }
}

fn anchor_occurrences(anchors: &[RawRecord]) -> Vec<(String, u64)> {
    anchors
        .iter()
        .map(|anchor| {
            let text = anchor.text(ANCHOR_TEXT).unwrap_or_default();
            let occurrences = count(anchor.number(INTERNAL_PAGES))
                .saturating_add(count(anchor.number(EXTERNAL_PAGES)));
            (text.to_owned(), occurrences)
        })
        .collect()
}

fn sum(records: &[RawRecord], keys: &[&str]) -> u64 {
    records
        .iter()
        .fold(0_u64, |acc, record| acc.saturating_add(count(record.number(keys))))
}

/// Turns `(anchor text, occurrences)` pairs into the ordered distribution.
///
/// Percentages are relative to the occurrences of the whole batch (floored
/// at 1 so an all-zero batch yields 0.0), truncated to one decimal, and
/// computed before the list is cut to its display length.
pub fn anchor_distribution(anchors: Vec<(String, u64)>) -> Vec<AnchorTextShare> {
    let batch_total = anchors
        .iter()
        .fold(0_u64, |acc, (_, occurrences)| acc.saturating_add(*occurrences))
        .max(1);

    let mut shares = anchors
        .into_iter()
        .map(|(anchor_text, occurrences)| AnchorTextShare {
            anchor_text,
            count: occurrences,
            percentage: truncated_percentage(occurrences, batch_total),
        })
        .collect::<Vec<_>>();

    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares.truncate(MAX_ANCHOR_TEXTS);
    shares
}

/// `part / total * 100` truncated to one decimal place, in integer arithmetic
/// so that e.g. 30/100 yields exactly 30.0.
fn truncated_percentage(part: u64, total: u64) -> f64 {
    let per_mille = u128::from(part) * 1000 / u128::from(total.max(1));
    // per_mille <= 1000 whenever part <= total
    per_mille as f64 / 10.0
}

fn linking_domain(record: &RawRecord) -> Option<LinkingDomain> {
    let domain = record.text(&["domain", "root_domain"])?;
    Some(LinkingDomain {
        domain: domain.to_owned(),
        backlinks: count(record.number(&["backlinks", "external_pages", "to_target_pages"])),
        domain_authority: score(record.number(DOMAIN_AUTHORITY)),
    })
}

fn linking_page(record: &RawRecord) -> Option<LinkingPage> {
    let url = record.text(&["url", "page", "source_page"])?;
    Some(LinkingPage {
        url: url.to_owned(),
        page_authority: score(record.number(PAGE_AUTHORITY)),
        anchor_text: record
            .text(ANCHOR_TEXT)
            .unwrap_or_default()
            .to_owned(),
    })
}

/// Round half-up to an integer and clamp into 0..=100.
pub fn score(value: f64) -> u8 {
    let rounded = value.round().clamp(0.0, f64::from(MAX_SCORE));
    rounded as u8
}

/// Round half-up to an integer, negatives read as zero.
pub fn count(value: f64) -> u64 {
    // Float-to-int `as` saturates, so huge values pin at u64::MAX.
    value.round().max(0.0) as u64
}

/// Two-decimal rank value clamped into 0.0..=10.0.
pub fn moz_rank(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(0.0, MAX_MOZ_RANK)
}
