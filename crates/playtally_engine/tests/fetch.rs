use std::time::Duration;

use playtally_core::PlayRecord;
use playtally_engine::{FailureKind, FetchSettings, PageFetcher, ReqwestPageFetcher};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE_ONE: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<plays username="" userid="0" total="250" page="1">
  <play id="11" quantity="1">
    <players><player name="A" /><player name="B" /></players>
  </play>
  <play id="12" quantity="3">
    <players><player name="A" /><player name="B" /><player name="C" /><player name="D" /></players>
  </play>
</plays>"#;

fn fetcher_for(server: &MockServer) -> ReqwestPageFetcher {
    ReqwestPageFetcher::new(FetchSettings {
        base_url: format!("{}/xmlapi2", server.uri()),
        ..FetchSettings::default()
    })
    .expect("client")
}

#[tokio::test]
async fn fetcher_requests_item_and_page_and_decodes_plays() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xmlapi2/plays"))
        .and(query_param("id", "13"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(PAGE_ONE, "text/xml; charset=utf-8"))
        .expect(1)
        .mount(&server)
        .await;

    let page = fetcher_for(&server).fetch_page(13, 1).await.expect("fetch ok");

    assert_eq!(page.total_remaining, 250);
    assert_eq!(
        page.records,
        vec![
            PlayRecord {
                quantity: 1,
                player_count: 2
            },
            PlayRecord {
                quantity: 3,
                player_count: 4
            },
        ]
    );
}

#[tokio::test]
async fn fetcher_fails_on_rate_limit_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xmlapi2/plays"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_page(13, 2).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(429));
}

#[tokio::test]
async fn fetcher_rejects_unparseable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xmlapi2/plays"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<error>try later</error>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server).fetch_page(13, 1).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedBody);
}

#[tokio::test]
async fn fetcher_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xmlapi2/plays"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string(PAGE_ONE),
        )
        .mount(&server)
        .await;

    let fetcher = ReqwestPageFetcher::new(FetchSettings {
        base_url: format!("{}/xmlapi2", server.uri()),
        request_timeout: Duration::from_millis(50),
        ..FetchSettings::default()
    })
    .expect("client");

    let err = fetcher.fetch_page(13, 1).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn fetcher_rejects_too_large_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/xmlapi2/plays"))
        .respond_with(ResponseTemplate::new(200).set_body_string("01234567890"))
        .mount(&server)
        .await;

    let fetcher = ReqwestPageFetcher::new(FetchSettings {
        base_url: format!("{}/xmlapi2", server.uri()),
        max_bytes: 10,
        ..FetchSettings::default()
    })
    .expect("client");

    let err = fetcher.fetch_page(13, 1).await.unwrap_err();
    assert_eq!(
        err.kind,
        FailureKind::TooLarge {
            max_bytes: 10,
            actual: Some(11)
        }
    );
}
