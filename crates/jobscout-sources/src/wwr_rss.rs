//! We Work Remotely RSS feed adapter (free, no credentials).
//!
//! The feed has no server-side search, so postings are filtered
//! client-side against the query. Item titles follow the
//! `Company: Job Title` convention and are split into the two fields.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::Reader;

use jobscout_core::{JobPosting, JobSource, SearchFilters};

use crate::error::SourceError;
use crate::helpers::{matches_query, strip_html};

const FEED_URL: &str = "https://weworkremotely.com/remote-jobs.rss";

/// Fetch postings from the We Work Remotely RSS feed.
///
/// # Errors
///
/// Returns [`SourceError::Http`] on transport failure or
/// [`SourceError::Xml`] on malformed feed XML.
pub(crate) async fn fetch(
    client: &reqwest::Client,
    filters: &SearchFilters,
    limit: usize,
) -> Result<Vec<JobPosting>, SourceError> {
    let body = client.get(FEED_URL).send().await?.text().await?;
    let jobs = parse_feed(&body)?;
    Ok(jobs
        .into_iter()
        .filter(|job| match &filters.query {
            Some(query) => {
                let haystack = format!(
                    "{} {} {}",
                    job.title,
                    job.company.as_deref().unwrap_or(""),
                    job.description.as_deref().unwrap_or("")
                );
                matches_query(&haystack, query)
            }
            None => true,
        })
        .take(limit)
        .collect())
}

/// Parse a WWR RSS feed body into postings.
///
/// Candidates without a title are skipped; a missing `guid` falls back to
/// the item link as the posting id.
///
/// # Errors
///
/// Returns [`SourceError::Xml`] if the XML is malformed.
fn parse_feed(xml: &str) -> Result<Vec<JobPosting>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut jobs = Vec::new();
    let mut in_item = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut link = String::new();
    let mut guid = String::new();
    let mut region = String::new();
    let mut description = String::new();
    let mut pub_date = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = std::str::from_utf8(e.name().as_ref())
                    .unwrap_or("")
                    .to_string();
                if name == "item" {
                    in_item = true;
                    title.clear();
                    link.clear();
                    guid.clear();
                    region.clear();
                    description.clear();
                    pub_date.clear();
                } else {
                    current_tag = name;
                }
            }
            Ok(Event::End(e)) => {
                let raw = e.name();
                let name = std::str::from_utf8(raw.as_ref()).unwrap_or("");
                if name == "item" && in_item {
                    in_item = false;
                    if let Some(job) =
                        build_posting(&title, &link, &guid, &region, &description, &pub_date)
                    {
                        jobs.push(job);
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_item {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        (&mut title, &mut link, &mut guid, &mut region),
                        (&mut description, &mut pub_date),
                    );
                }
            }
            Ok(Event::CData(e)) => {
                if in_item {
                    let text = String::from_utf8_lossy(e.as_ref()).into_owned();
                    assign_field(
                        &current_tag,
                        text,
                        (&mut title, &mut link, &mut guid, &mut region),
                        (&mut description, &mut pub_date),
                    );
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    Ok(jobs)
}

fn assign_field(
    tag: &str,
    text: String,
    (title, link, guid, region): (&mut String, &mut String, &mut String, &mut String),
    (description, pub_date): (&mut String, &mut String),
) {
    match tag {
        "title" => *title = text,
        "link" => *link = text,
        "guid" => *guid = text,
        "region" => *region = text,
        "description" => *description = strip_html(&text),
        "pubDate" => *pub_date = text,
        _ => {}
    }
}

fn build_posting(
    title: &str,
    link: &str,
    guid: &str,
    region: &str,
    description: &str,
    pub_date: &str,
) -> Option<JobPosting> {
    // "Company: Job Title" — everything before the first colon is the company.
    let (company, job_title) = match title.split_once(':') {
        Some((company, rest)) => (Some(company.trim().to_string()), rest.trim().to_string()),
        None => (None, title.trim().to_string()),
    };
    if job_title.is_empty() {
        return None;
    }

    let id = if guid.is_empty() { link } else { guid };
    if id.is_empty() {
        return None;
    }

    Some(JobPosting {
        id: id.to_string(),
        source: JobSource::WeWorkRemotely,
        title: job_title,
        company,
        location: (!region.is_empty()).then(|| region.to_string()),
        description: (!description.is_empty()).then(|| description.to_string()),
        salary: None,
        url: (!link.is_empty()).then(|| link.to_string()),
        date_posted: parse_pub_date(pub_date),
        job_type: None,
        skills: Vec::new(),
    })
}

fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>We Work Remotely: All Jobs</title>
    <item>
      <title>Basecamp: Senior Systems Administrator</title>
      <region>Anywhere in the World</region>
      <category>Sys Admin</category>
      <guid>https://weworkremotely.com/jobs/1001</guid>
      <link>https://weworkremotely.com/remote-jobs/basecamp-senior-systems-administrator</link>
      <pubDate>Tue, 20 May 2025 14:00:00 +0000</pubDate>
      <description><![CDATA[<p>Keep our fleet healthy.</p>]]></description>
    </item>
    <item>
      <title></title>
      <link>https://weworkremotely.com/remote-jobs/empty</link>
      <pubDate>Tue, 20 May 2025 15:00:00 +0000</pubDate>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn splits_company_from_item_title() {
        let jobs = parse_feed(SAMPLE_FEED).unwrap();

        assert_eq!(jobs.len(), 1, "the empty-title item must be skipped");
        assert_eq!(jobs[0].title, "Senior Systems Administrator");
        assert_eq!(jobs[0].company.as_deref(), Some("Basecamp"));
        assert_eq!(jobs[0].location.as_deref(), Some("Anywhere in the World"));
        assert_eq!(jobs[0].description.as_deref(), Some("Keep our fleet healthy."));
        assert_eq!(jobs[0].id, "https://weworkremotely.com/jobs/1001");
        assert!(jobs[0].date_posted.is_some());
    }

    #[test]
    fn empty_feed_returns_empty_vec() {
        let xml = r#"<?xml version="1.0"?><rss version="2.0"><channel></channel></rss>"#;
        let jobs = parse_feed(xml).unwrap();
        assert!(jobs.is_empty());
    }
}
