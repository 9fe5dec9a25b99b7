//! HTML → raw posting fields for the job board's listing and detail pages.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

use crate::model::RawPosting;

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

static JOB_CARD: LazyLock<Selector> = LazyLock::new(|| selector("a.jobcardStyle1"));
static TITLE: LazyLock<Selector> = LazyLock::new(|| selector("div.post-main-title2"));
static SPAN: LazyLock<Selector> = LazyLock::new(|| selector("span"));
static COMPANY_CARD: LazyLock<Selector> =
    LazyLock::new(|| selector(r#"a[href*="/company/"] span.tw-card-title"#));
static JOB_TYPE: LazyLock<Selector> =
    LazyLock::new(|| selector(r##"span[class*="tw-bg-[#0BA02C]"]"##));
static LOCATION: LazyLock<Selector> = LazyLock::new(|| selector("div.remote p.tw-mb-0"));
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| selector("div.job-description-container"));
static BODY: LazyLock<Selector> = LazyLock::new(|| selector("body"));
static DIV: LazyLock<Selector> = LazyLock::new(|| selector("div"));
static SALARY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)salary").unwrap());

/// Listing page URL for `location` (spaces are percent-encoded) and 1-based `page`.
pub fn listing_url(base_url: &str, location: &str, page: u32) -> String {
    format!(
        "{}/engineer?location={}&page={}",
        base_url.trim_end_matches('/'),
        location.replace(' ', "%20"),
        page
    )
}

/// Job detail links on a listing page, absolute and de-duplicated in page order.
pub fn parse_listing(html: &str, base: &Url) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    doc.select(&JOB_CARD)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| base.join(href.trim()).ok())
        .map(String::from)
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

pub fn parse_job_page(url: &str, html: &str) -> RawPosting {
    let doc = Html::parse_document(html);

    let job_title = first_text(&doc, &TITLE);
    let company_name = company_after_at(&doc).or_else(|| first_text(&doc, &COMPANY_CARD));
    let job_type = first_text(&doc, &JOB_TYPE);
    let location = first_text(&doc, &LOCATION);
    let job_description = first_text(&doc, &DESCRIPTION).or_else(|| first_text(&doc, &BODY));
    let salary_text = doc
        .select(&DIV)
        .find(|div| SALARY_RE.is_match(&own_text(*div)))
        .map(text_of)
        .filter(|t| !t.is_empty());

    RawPosting {
        job_url: url.to_string(),
        job_title,
        company_name,
        location,
        job_type,
        job_description,
        salary_text,
    }
}

/// The page renders "at <span>Company</span>"; take the span after the first
/// span mentioning "at".
fn company_after_at(doc: &Html) -> Option<String> {
    let marker = doc
        .select(&SPAN)
        .find(|span| own_text(*span).to_lowercase().contains("at"))?;
    marker
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "span")
        .map(text_of)
        .filter(|t| !t.is_empty())
}

fn first_text(doc: &Html, sel: &Selector) -> Option<String> {
    doc.select(sel).next().map(text_of).filter(|t| !t.is_empty())
}

/// All descendant text, each node trimmed, joined with single spaces.
fn text_of(el: ElementRef) -> String {
    el.text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text of the element's direct text children only.
fn own_text(el: ElementRef) -> String {
    el.children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect::<String>()
}
