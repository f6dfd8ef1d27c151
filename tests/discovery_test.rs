mod common;

use common::{empty_listing_page, listing_page, test_config, CannedResponse, TestServer};
use terceirizados_cli::downloader::{discover, parse_period};
use terceirizados_cli::errors::AppError;
use terceirizados_cli::http;

#[tokio::test]
async fn discover_collects_matching_candidates_across_pages() {
    let server = TestServer::start(|_method, target, _hit| {
        if target.contains("b_start:int=0") {
            // Full page: continue paginating
            CannedResponse::html(&listing_page(&[
                "https://portal/arquivos/terceirizados_202403.csv/view",
                "https://portal/arquivos/terceirizados-marco-2024.xlsx/view",
            ]))
        } else if target.contains("b_start:int=2") {
            // Duplicate link plus a non-matching month; still a full page
            CannedResponse::html(&listing_page(&[
                "https://portal/arquivos/terceirizados_202403.csv/view",
                "https://portal/arquivos/terceirizados_202402.csv/view",
            ]))
        } else {
            // Short page: pagination stops here
            CannedResponse::html(&listing_page(&[
                "https://portal/arquivos/relatorio_202403.pdf/view",
            ]))
        }
    })
    .await;

    let client = http::build_client().unwrap();
    let mut config = test_config(server.url("/arquivos/"));
    config.page_size = 2;

    let period = parse_period("março 2024");
    let candidates = discover(&client, &config, &period).await.unwrap();

    // Deduplicated, first-seen order preserved, non-files and other months out
    assert_eq!(
        candidates,
        vec![
            "https://portal/arquivos/terceirizados_202403.csv/view".to_string(),
            "https://portal/arquivos/terceirizados-marco-2024.xlsx/view".to_string(),
        ]
    );
    assert_eq!(server.hits(), 3);
}

#[tokio::test]
async fn discover_stops_on_a_page_with_no_entries() {
    let server =
        TestServer::start(|_method, _target, _hit| CannedResponse::html(&empty_listing_page()))
            .await;

    let client = http::build_client().unwrap();
    let config = test_config(server.url("/arquivos/"));

    let period = parse_period("03/2024");
    let candidates = discover(&client, &config, &period).await.unwrap();

    assert!(candidates.is_empty());
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn discover_aborts_on_http_error_status() {
    let server = TestServer::start(|_method, _target, _hit| CannedResponse::status(404)).await;

    let client = http::build_client().unwrap();
    let config = test_config(server.url("/arquivos/"));

    let period = parse_period("03/2024");
    let err = discover(&client, &config, &period).await.unwrap_err();

    match err {
        AppError::DiscoveryError(msg) => assert!(msg.contains("offset 0")),
        other => panic!("Expected DiscoveryError, got {other:?}"),
    }
}

#[tokio::test]
async fn discover_rides_out_server_errors_via_transport_retry() {
    let server = TestServer::start(|_method, _target, hit| {
        if hit == 0 {
            CannedResponse::status(503)
        } else {
            CannedResponse::html(&listing_page(&[
                "https://portal/arquivos/terceirizados_202403.csv/view",
            ]))
        }
    })
    .await;

    let client = http::build_client().unwrap();
    let config = test_config(server.url("/arquivos/"));

    let period = parse_period("03/2024");
    let candidates = discover(&client, &config, &period).await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(server.hits(), 2);
}
