//! Integration tests for reading feeds from text, bytes and HTTP.
//!
//! HTTP tests run against a local wiremock server.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rssdiff::{
    compare_items, parse_bytes, parse_text, DocumentError, Feed, FeedReader, FetchConfig,
    FetchError, ReadError,
};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MONDAY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Release notes</title>
    <link>https://example.com/releases</link>
    <item>
      <title>v1.1</title>
      <pubDate>Mon, 01 Jan 2024 09:00:00 GMT</pubDate>
      <guid>release-1.1</guid>
    </item>
    <item>
      <title>v1.0</title>
      <pubDate>Sun, 31 Dec 2023 09:00:00 GMT</pubDate>
      <guid>release-1.0</guid>
    </item>
  </channel>
</rss>"#;

const TUESDAY: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Release notes</title>
    <link>https://example.com/releases</link>
    <item>
      <title>v1.2</title>
      <pubDate>Tue, 02 Jan 2024 09:00:00 GMT</pubDate>
      <guid>release-1.2</guid>
    </item>
    <item>
      <title>v1.1</title>
      <pubDate>Mon, 01 Jan 2024 09:00:00 GMT</pubDate>
      <guid>release-1.1</guid>
    </item>
    <item>
      <title>v1.0</title>
      <pubDate>Sun, 31 Dec 2023 09:00:00 GMT</pubDate>
      <guid>release-1.0</guid>
    </item>
  </channel>
</rss>"#;

// ============================================================================
// Text and bytes
// ============================================================================

#[test]
fn test_empty_text_is_empty_feed() {
    assert_eq!(parse_text("").unwrap(), Feed::default());
}

#[test]
fn test_minimal_channel() {
    let feed = parse_text("<rss><channel><title>T</title></channel></rss>").unwrap();
    assert_eq!(feed.title, "T");
    assert!(feed.items.is_empty());
}

#[test]
fn test_atom_document_is_malformed() {
    let atom = r#"<?xml version="1.0"?><feed xmlns="http://www.w3.org/2005/Atom"><title>A</title></feed>"#;
    assert!(matches!(
        parse_text(atom),
        Err(DocumentError::UnexpectedRoot(_))
    ));
}

#[test]
fn test_windows_1252_bytes() {
    let doc = b"<?xml version=\"1.0\" encoding=\"windows-1252\"?>\
        <rss><channel><item><title>\x93Quoted\x94</title></item></channel></rss>";
    let feed = parse_bytes(doc, None).unwrap();
    assert_eq!(feed.items[0].title, "\u{201c}Quoted\u{201d}");
}

#[test]
fn test_compare_parsed_revisions() {
    let monday = parse_text(MONDAY).unwrap();
    let tuesday = parse_text(TUESDAY).unwrap();

    // The smaller revision is the probe: everything in Monday is still present
    assert!(compare_items(&tuesday, &monday).is_empty());
}

proptest! {
    #[test]
    fn prop_parsing_is_idempotent(
        title in "[a-zA-Z0-9 ]{0,20}",
        item_titles in proptest::collection::vec("[a-z]{1,10}", 0..5),
    ) {
        let items: String = item_titles
            .iter()
            .enumerate()
            .map(|(i, t)| format!("<item><guid>{i}</guid><title>{t}</title></item>"))
            .collect();
        let doc = format!("<rss version=\"2.0\"><channel><title>{title}</title>{items}</channel></rss>");

        let first = parse_text(&doc).unwrap();
        let second = parse_text(&doc).unwrap();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(&first.title, &title);
        prop_assert_eq!(first.items.len(), item_titles.len());
    }
}

// ============================================================================
// HTTP
// ============================================================================

fn reader() -> FeedReader {
    FeedReader::new(&FetchConfig::default()).unwrap()
}

#[tokio::test]
async fn test_fetch_two_revisions_and_compare() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/monday.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(MONDAY)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tuesday.xml"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(TUESDAY)
                .insert_header("Content-Type", "application/rss+xml"),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let reader = reader();
    let monday = reader
        .parse_url(&format!("{}/monday.xml", mock_server.uri()))
        .await
        .unwrap();
    let tuesday = reader
        .parse_url(&format!("{}/tuesday.xml", mock_server.uri()))
        .await
        .unwrap();

    assert_eq!(monday.raw_text(), MONDAY);
    assert_eq!(tuesday.feed.items.len(), 3);
    assert!(compare_items(&monday.feed, &tuesday.feed).is_empty());
}

#[tokio::test]
async fn test_fetch_failure_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(410))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = reader()
        .parse_url(&format!("{}/gone.xml", mock_server.uri()))
        .await;
    assert!(matches!(
        result,
        Err(ReadError::Fetch(FetchError::HttpStatus(410)))
    ));
}

#[tokio::test]
async fn test_fetch_unsupported_charset_is_malformed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<?xml version="1.0" encoding="x-made-up"?><rss><channel/></rss>"#,
        ))
        .mount(&mock_server)
        .await;

    let result = reader()
        .parse_url(&format!("{}/feed.xml", mock_server.uri()))
        .await;
    assert!(matches!(
        result,
        Err(ReadError::MalformedDocument(
            DocumentError::UnsupportedCharset(_)
        ))
    ));
}
