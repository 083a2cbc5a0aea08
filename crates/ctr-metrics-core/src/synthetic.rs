//! Plausible stand-in data for when the upstream cannot be used.
//!
//! Output is shape-identical to normalized upstream data: same bounds, same
//! list lengths and ordering, same anchor percentage rule. The generator
//! never logs; reporting a fallback is the facade's job.
//!
//! Each `mock_*` function draws from a freshly seeded RNG; the `*_with`
//! variants take a caller-provided [`fastrand::Rng`] for reproducible output.

use fastrand::Rng;

use crate::normalize::{anchor_distribution, moz_rank};
use crate::{
    BacklinkProfile, DomainMetrics, KeywordMetrics, LinkingDomain, LinkingPage, PageMetrics,
    RankingUrl, UtcDateTime, MAX_ANCHOR_TEXTS, MAX_SCORE, MAX_TOP_LINKING_DOMAINS,
    MAX_TOP_LINKING_PAGES,
};

const RANKING_URLS: u32 = 10;

const REFERRING_DOMAINS: &[&str] = &[
    "medium.com",
    "reddit.com",
    "forbes.com",
    "searchenginejournal.com",
    "producthunt.com",
    "techcrunch.com",
    "hubspot.com",
    "wordpress.org",
    "github.com",
    "quora.com",
    "businessinsider.com",
    "entrepreneur.com",
];

const ANCHOR_TEMPLATES: &[&str] = &[
    "{brand}",
    "{domain}",
    "https://{domain}",
    "www.{domain}",
    "click here",
    "read more",
    "learn more",
    "this article",
    "website",
    "source",
    "{brand} review",
    "{brand} pricing",
    "best {brand} alternatives",
    "visit {brand}",
    "here",
    "official site",
    "{brand} blog",
    "{brand} guide",
    "see more",
    "link",
];

pub fn mock_domain_metrics(domain: &str) -> DomainMetrics {
    mock_domain_metrics_with(&mut Rng::new(), domain)
}

pub fn mock_domain_metrics_with(rng: &mut Rng, domain: &str) -> DomainMetrics {
    let domain_authority = rng.u8(1..=MAX_SCORE);
    let total_backlinks = rng.u64(100..=1_000_000);

    DomainMetrics {
        domain: domain.to_owned(),
        domain_authority,
        page_authority: authority_below(rng, domain_authority),
        spam_score: rng.u8(0..=MAX_SCORE),
        total_backlinks,
        linking_domains: rng.u64(10..=total_backlinks.clamp(10, 50_000)),
        moz_rank: random_moz_rank(rng),
        last_updated: UtcDateTime::now(),
    }
}

pub fn mock_page_metrics(url: &str) -> PageMetrics {
    mock_page_metrics_with(&mut Rng::new(), url)
}

pub fn mock_page_metrics_with(rng: &mut Rng, url: &str) -> PageMetrics {
    let total_backlinks = rng.u64(10..=100_000);

    PageMetrics {
        url: url.to_owned(),
        page_authority: rng.u8(1..=MAX_SCORE),
        moz_rank: random_moz_rank(rng),
        total_backlinks,
        linking_domains: rng.u64(1..=total_backlinks.clamp(1, 5_000)),
        last_updated: UtcDateTime::now(),
    }
}

pub fn mock_backlink_profile(domain: &str) -> BacklinkProfile {
    mock_backlink_profile_with(&mut Rng::new(), domain)
}

pub fn mock_backlink_profile_with(rng: &mut Rng, domain: &str) -> BacklinkProfile {
    let total_backlinks = rng.u64(1_000..=500_000);
    let follow_backlinks = share_of(total_backlinks, rng.u64(60..=90));
    let external_backlinks = share_of(total_backlinks, rng.u64(80..=98));

    let mut top_linking_domains = (0..MAX_TOP_LINKING_DOMAINS)
        .map(|index| LinkingDomain {
            domain: REFERRING_DOMAINS[index % REFERRING_DOMAINS.len()].to_owned(),
            backlinks: rng.u64(5..=5_000),
            domain_authority: rng.u8(20..=MAX_SCORE),
        })
        .collect::<Vec<_>>();
    top_linking_domains.sort_by(|a, b| b.backlinks.cmp(&a.backlinks));

    let brand = brand_name(domain);
    let mut top_linking_pages = top_linking_domains
        .iter()
        .take(MAX_TOP_LINKING_PAGES)
        .enumerate()
        .map(|(index, referrer)| LinkingPage {
            url: format!("https://{}/{}-{}", referrer.domain, slug(&brand), index + 1),
            page_authority: authority_below(rng, referrer.domain_authority),
            anchor_text: fill_template(ANCHOR_TEMPLATES[index % ANCHOR_TEMPLATES.len()], &brand, domain),
        })
        .collect::<Vec<_>>();
    top_linking_pages.sort_by(|a, b| b.page_authority.cmp(&a.page_authority));

    let anchors = ANCHOR_TEMPLATES
        .iter()
        .take(MAX_ANCHOR_TEXTS)
        .map(|template| (fill_template(template, &brand, domain), rng.u64(1..=2_000)))
        .collect::<Vec<_>>();

    BacklinkProfile {
        total_backlinks,
        linking_domains: rng.u64(50..=total_backlinks.min(20_000)),
        follow_backlinks,
        nofollow_backlinks: total_backlinks - follow_backlinks,
        external_backlinks,
        internal_backlinks: total_backlinks - external_backlinks,
        top_linking_domains,
        top_linking_pages,
        anchor_text_distribution: anchor_distribution(anchors),
    }
}

pub fn mock_keyword_metrics(keyword: &str, domain: &str) -> KeywordMetrics {
    mock_keyword_metrics_with(&mut Rng::new(), keyword, domain)
}

/// Ten ranking URLs with positions 1..=10; `domain` holds one of them.
pub fn mock_keyword_metrics_with(rng: &mut Rng, keyword: &str, domain: &str) -> KeywordMetrics {
    let difficulty = rng.u8(1..=MAX_SCORE);
    let own_position = rng.u32(1..=RANKING_URLS);
    let keyword_slug = slug(keyword);

    let mut authorities = (0..RANKING_URLS)
        .map(|_| rng.u8(10..=MAX_SCORE))
        .collect::<Vec<_>>();
    authorities.sort_unstable_by(|a, b| b.cmp(a));

    let mut competitors = REFERRING_DOMAINS.iter();
    let ranking_urls = (1..=RANKING_URLS)
        .zip(authorities)
        .map(|(position, page_authority)| {
            let host = if position == own_position {
                domain
            } else {
                competitors.next().copied().unwrap_or("example.org")
            };
            RankingUrl {
                url: format!("https://{host}/{keyword_slug}"),
                position,
                page_authority,
            }
        })
        .collect();

    KeywordMetrics {
        keyword: keyword.to_owned(),
        search_volume: rng.u64(10..=100_000),
        difficulty,
        // Easier keywords leave more room.
        opportunity: MAX_SCORE - difficulty / 2 - rng.u8(0..=MAX_SCORE / 2),
        ranking_urls,
    }
}

/// Domain authority minus a random offset in 0..=20, floored at 1.
fn authority_below(rng: &mut Rng, ceiling: u8) -> u8 {
    ceiling.saturating_sub(rng.u8(0..=20)).max(1)
}

fn random_moz_rank(rng: &mut Rng) -> f64 {
    moz_rank(rng.f64() * 10.0)
}

fn share_of(total: u64, percent: u64) -> u64 {
    total.saturating_mul(percent) / 100
}

fn brand_name(domain: &str) -> String {
    let host = domain
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");
    let label = host.split(['.', '/']).next().unwrap_or(host);

    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::from("Brand"),
    }
}

fn slug(input: &str) -> String {
    let slug = input
        .split(|ch: char| !ch.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        String::from("page")
    } else {
        slug
    }
}

fn fill_template(template: &str, brand: &str, domain: &str) -> String {
    template.replace("{brand}", brand).replace("{domain}", domain)
}
