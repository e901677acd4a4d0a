//! HttpContentFetcher against a mock HTTP server.

use std::sync::Arc;

use recap_core::{AttachmentSet, ContentFetcher, Error};
use recap_fetch::{Aggregator, HttpContentFetcher, HttpFetcherConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher_for(server: &MockServer) -> HttpContentFetcher {
    HttpContentFetcher::new(HttpFetcherConfig {
        youtube_base_url: server.uri(),
        ..HttpFetcherConfig::default()
    })
    .expect("Failed to create fetcher")
}

#[tokio::test]
async fn test_web_page_is_stripped_to_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/article"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<html><head><title>T</title></head><body><h1>Rivers</h1>\
             <p>Water &amp; sediment</p><script>track()</script></body></html>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let text = fetcher
        .fetch_web_page_text(&format!("{}/article", server.uri()))
        .await
        .unwrap();

    assert_eq!(text, "Rivers\nWater & sediment");
}

#[tokio::test]
async fn test_web_page_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch_web_page_text(&format!("{}/missing", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Request(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_pdf_rejects_non_pdf_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher
        .fetch_pdf_text(&format!("{}/doc.pdf", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Extraction(_)));
}

#[tokio::test]
async fn test_pdf_without_pdftotext_skips_download() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4\n%%EOF".to_vec()))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = HttpContentFetcher::new(HttpFetcherConfig {
        pdftotext: "recap-no-such-pdftotext".to_string(),
        ..HttpFetcherConfig::default()
    })
    .unwrap();
    assert!(!fetcher.pdf_supported().await);

    let err = fetcher
        .fetch_pdf_text(&format!("{}/doc.pdf", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Extraction(_)));
    assert!(err.to_string().contains("not installed"));
}

#[tokio::test]
async fn test_youtube_transcript_from_caption_track() {
    let server = MockServer::start().await;
    let watch_page = format!(
        r#"<html><script>var ytInitialPlayerResponse = {{"captions":{{"playerCaptionsTracklistRenderer":{{"captionTracks":[{{"baseUrl":"{}\/api\/timedtext?v=VIDEOID&lang=en","languageCode":"en"}}]}}}}}};</script></html>"#,
        server.uri().replace('/', "\\/")
    );

    Mock::given(method("GET"))
        .and(path("/watch"))
        .and(query_param("v", "VIDEOID"))
        .respond_with(ResponseTemplate::new(200).set_body_string(watch_page))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/timedtext"))
        .and(query_param("v", "VIDEOID"))
        .and(query_param("lang", "en"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<transcript><text start="0" dur="1">Welcome back</text><text start="1" dur="2">today&amp;#39;s topic</text></transcript>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let transcript = fetcher.fetch_youtube_transcript("VIDEOID").await.unwrap();

    assert_eq!(transcript, "Welcome back today's topic");
}

#[tokio::test]
async fn test_youtube_without_captions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/watch"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>no captions</html>"))
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server);
    let err = fetcher.fetch_youtube_transcript("VIDEOID").await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
}

#[tokio::test]
async fn test_aggregate_attachment_set_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/one"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>first</p>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/three"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>third</p>"))
        .mount(&server)
        .await;

    let attachments = AttachmentSet::new(
        Some("Make a quiz. ".to_string()),
        vec![],
        vec![
            format!("{}/one", server.uri()),
            format!("{}/two", server.uri()),
            "not a link".to_string(),
            format!("{}/three", server.uri()),
        ],
    )
    .unwrap();

    let aggregator = Aggregator::new(Arc::new(fetcher_for(&server)));
    let request = aggregator.aggregate_set(&attachments).await;

    assert_eq!(
        request.message,
        "Make a quiz. Attached Website Content:firstthird"
    );
    assert!(request.images.is_empty());
}
