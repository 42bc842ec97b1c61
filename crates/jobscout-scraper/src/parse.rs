//! Posting extraction from scraped listing pages.

use regex::Regex;
use sha2::{Digest, Sha256};

use jobscout_core::{JobPosting, JobSource};

use crate::error::ScrapeError;
use crate::heuristics::{derive_contract_type, derive_skills};
use crate::targets::ScrapeTarget;

/// Extract postings from one target's listing HTML.
///
/// Applies the target's `item_pattern` to isolate posting blocks, then the
/// field patterns within each block (first capture group wins). Candidates
/// with an empty title are skipped. Skills and contract type are derived
/// heuristically from the block text.
///
/// # Errors
///
/// Returns [`ScrapeError::Pattern`] if a configured pattern is not a valid
/// regex.
pub fn extract_postings(target: &ScrapeTarget, html: &str) -> Result<Vec<JobPosting>, ScrapeError> {
    let item_re = compile(target, "item", &target.item_pattern)?;
    let title_re = compile(target, "title", &target.title_pattern)?;
    let company_re = compile_opt(target, "company", target.company_pattern.as_deref())?;
    let location_re = compile_opt(target, "location", target.location_pattern.as_deref())?;
    let description_re = compile_opt(target, "description", target.description_pattern.as_deref())?;
    let link_re = compile_opt(target, "link", target.link_pattern.as_deref())?;

    let mut postings = Vec::new();
    for item in item_re.find_iter(html) {
        let block = item.as_str();

        let Some(title) = field_value(&title_re, block) else {
            continue;
        };

        let company = company_re.as_ref().and_then(|re| field_value(re, block));
        let location = location_re.as_ref().and_then(|re| field_value(re, block));
        let description = description_re.as_ref().and_then(|re| field_value(re, block));
        let link = link_re
            .as_ref()
            .and_then(|re| capture_raw(re, block))
            .map(|href| absolutize(&href, target.link_base.as_deref()));

        let derivation_text = format!("{title} {}", description.as_deref().unwrap_or(""));
        let skills = derive_skills(&derivation_text);
        let job_type = derive_contract_type(&derivation_text);

        postings.push(JobPosting {
            id: posting_id(&target.name, link.as_deref(), &title, company.as_deref()),
            source: JobSource::Scraped,
            title,
            company,
            location,
            description,
            salary: None,
            url: link,
            date_posted: None,
            job_type: Some(job_type),
            skills,
        });
    }

    Ok(postings)
}

fn compile(target: &ScrapeTarget, field: &'static str, pattern: &str) -> Result<Regex, ScrapeError> {
    Regex::new(pattern).map_err(|e| ScrapeError::Pattern {
        target: target.name.clone(),
        field,
        reason: e.to_string(),
    })
}

fn compile_opt(
    target: &ScrapeTarget,
    field: &'static str,
    pattern: Option<&str>,
) -> Result<Option<Regex>, ScrapeError> {
    pattern.map(|p| compile(target, field, p)).transpose()
}

/// First capture group of the first match, cleaned of markup. Empty after
/// cleaning means absent.
fn field_value(re: &Regex, block: &str) -> Option<String> {
    let cleaned = clean_fragment(capture_raw(re, block)?.as_str());
    (!cleaned.is_empty()).then_some(cleaned)
}

fn capture_raw(re: &Regex, block: &str) -> Option<String> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn absolutize(href: &str, base: Option<&str>) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    match base {
        Some(base) => format!("{}/{}", base.trim_end_matches('/'), href.trim_start_matches('/')),
        None => href.to_string(),
    }
}

/// Stable posting id derived from the link when present, else from the
/// `(title, company)` pair, site-qualified either way.
fn posting_id(site: &str, link: Option<&str>, title: &str, company: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    match link {
        Some(link) => hasher.update(link.as_bytes()),
        None => {
            hasher.update(title.to_lowercase().as_bytes());
            hasher.update(b"|");
            hasher.update(company.unwrap_or_default().to_lowercase().as_bytes());
        }
    }
    let digest = hasher.finalize();
    let mut short = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        short.push_str(&format!("{byte:02x}"));
    }
    format!("{site}-{short}")
}

/// Strip tags, decode the common entities, and collapse whitespace.
fn clean_fragment(fragment: &str) -> String {
    let mut text = String::with_capacity(fragment.len());
    let mut in_tag = false;
    for ch in fragment.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    let decoded = text
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}
