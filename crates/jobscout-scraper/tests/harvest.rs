//! Integration tests for the harvest path.
//!
//! Uses `wiremock` to stand up local HTTP servers so no real network
//! traffic is made.

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use jobscout_scraper::{harvest_all, ScrapeClient, ScrapeTarget};

fn test_client() -> ScrapeClient {
    ScrapeClient::new(5, 0, 0)
        .expect("failed to build test ScrapeClient")
        .with_inter_site_delay(0, 0)
}

fn target_for(server_uri: &str, name: &str) -> ScrapeTarget {
    ScrapeTarget {
        name: name.to_string(),
        url: format!("{server_uri}/jobs"),
        item_pattern: r#"(?s)<li class="job">.*?</li>"#.to_string(),
        title_pattern: r"<h2>(.*?)</h2>".to_string(),
        company_pattern: Some(r"<h3>(.*?)</h3>".to_string()),
        location_pattern: None,
        description_pattern: Some(r#"<p>(.*?)</p>"#.to_string()),
        link_pattern: Some(r#"href="([^"]+)""#.to_string()),
        link_base: Some(server_uri.to_string()),
    }
}

const LISTING: &str = r#"
<li class="job"><a href="/j/1"><h2>Rust Developer</h2></a><h3>Acme</h3><p>Rust and SQL services.</p></li>
<li class="job"><a href="/j/2"><h2>Frontend Developer</h2></a><h3>Globex</h3><p>React internship.</p></li>
"#;

#[tokio::test]
async fn harvests_postings_from_a_mock_board() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&server)
        .await;

    let targets = vec![target_for(&server.uri(), "mockboard")];
    let postings = harvest_all(&test_client(), &targets).await;

    assert_eq!(postings.len(), 2);
    assert_eq!(postings[0].title, "Rust Developer");
    assert!(postings[0].skills.contains(&"Rust".to_string()));
    assert_eq!(postings[1].job_type.as_deref(), Some("Internship"));
}

#[tokio::test]
async fn failing_site_does_not_stop_the_others() {
    let healthy = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
        .mount(&healthy)
        .await;

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jobs"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&broken)
        .await;

    let targets = vec![
        target_for(&broken.uri(), "brokenboard"),
        target_for(&healthy.uri(), "mockboard"),
    ];
    let postings = harvest_all(&test_client(), &targets).await;

    assert_eq!(postings.len(), 2, "healthy site results must survive");
}

#[tokio::test]
async fn duplicate_postings_across_sites_are_deduplicated() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    for server in [&first, &second] {
        Mock::given(method("GET"))
            .and(path("/jobs"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(server)
            .await;
    }

    let targets = vec![
        target_for(&first.uri(), "board-a"),
        target_for(&second.uri(), "board-b"),
    ];
    let postings = harvest_all(&test_client(), &targets).await;

    assert_eq!(postings.len(), 2, "same (title, company) pairs must collapse");
    assert!(postings.iter().all(|p| p.id.starts_with("board-a-")));
}
