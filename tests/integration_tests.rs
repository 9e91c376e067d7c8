//! Integration tests for Book Catalog
//!
//! These tests drive the view controller through its public API with a
//! scripted fetcher, and the HTTP fetcher against a local mock server.

use book_catalog::catalog::{CatalogError, Transition, ViewController, ViewState};
use book_catalog::config::{load_config, ApiConfig};
use book_catalog::models::{BookRecord, SortKey};
use book_catalog::sources::mock::{make_page, MockFetcher};
use book_catalog::sources::{FetchError, FreeApiFetcher, PageFetcher};
use book_catalog::ui::{format_books, RecordingSink, RenderStyle, ViewMode};
use std::sync::Arc;

fn controller_with(fetcher: Arc<dyn PageFetcher>) -> (Arc<RecordingSink>, ViewController) {
    let sink = Arc::new(RecordingSink::new());
    let controller = ViewController::new(fetcher, sink.clone(), sink.clone());
    (sink, controller)
}

fn strings(titles: &[&str]) -> Vec<String> {
    titles.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn test_sort_switches_without_refetch() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.set_page("", 1, make_page(&["Zeta", "Alpha"], false));
    let (sink, controller) = controller_with(fetcher.clone());

    controller.search("").await.unwrap();
    controller.change_sort(SortKey::TitleAsc);
    controller.change_sort(SortKey::None);

    assert_eq!(
        sink.rendered_titles(),
        vec![
            strings(&["Zeta", "Alpha"]),
            strings(&["Alpha", "Zeta"]),
            strings(&["Zeta", "Alpha"]),
        ]
    );
    assert_eq!(fetcher.call_count(), 1);
}

#[tokio::test]
async fn test_pages_accumulate_until_last_page() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.set_page("history", 1, make_page(&["B", "A"], true));
    fetcher.set_page("history", 2, make_page(&["D", "C"], true));
    fetcher.set_page("history", 3, make_page(&["E"], false));
    let (sink, controller) = controller_with(fetcher.clone());

    controller.search("History").await.unwrap();
    while controller.can_load_more() {
        controller.load_more().await.unwrap();
    }

    assert_eq!(controller.query().page(), 3);
    assert_eq!(controller.state(), ViewState::Loaded { has_more: false });
    assert_eq!(
        sink.last_render_titles(),
        Some(strings(&["B", "A", "D", "C", "E"]))
    );
    assert_eq!(
        fetcher.calls(),
        vec![
            ("history".to_string(), 1),
            ("history".to_string(), 2),
            ("history".to_string(), 3)
        ]
    );

    let err = controller.load_more().await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidState(_)));
    assert_eq!(controller.records().len(), 5);
}

#[tokio::test]
async fn test_new_search_replaces_results() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.set_page("", 1, make_page(&["One", "Two"], true));
    fetcher.set_page("", 2, make_page(&["Three"], false));
    fetcher.set_page("dune", 1, make_page(&["Dune"], false));
    let (sink, controller) = controller_with(fetcher);

    controller.search("").await.unwrap();
    controller.load_more().await.unwrap();
    controller.search("dune").await.unwrap();

    assert_eq!(controller.query().page(), 1);
    assert_eq!(controller.query().search_term(), "dune");
    assert_eq!(sink.last_render_titles(), Some(strings(&["Dune"])));
}

#[tokio::test]
async fn test_fetch_failure_is_reported_and_retryable() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.set_page("", 1, make_page(&["Kept"], true));
    fetcher.fail_page("", 2, FetchError::Http(503));
    let (sink, controller) = controller_with(fetcher.clone());

    controller.search("").await.unwrap();
    let err = controller.load_more().await.unwrap_err();

    assert_eq!(err, CatalogError::Fetch(FetchError::Http(503)));
    assert_eq!(
        sink.errors(),
        vec!["Failed to fetch books: HTTP error! Status: 503".to_string()]
    );
    assert_eq!(sink.render_count(), 1);
    assert_eq!(controller.query().page(), 1);
    assert!(controller.can_load_more());

    fetcher.set_page("", 2, make_page(&["Added"], false));
    let outcome = controller.load_more().await.unwrap();
    assert_eq!(
        outcome,
        Transition::Loaded {
            has_more: false,
            appended: 1
        }
    );
    assert_eq!(sink.last_render_titles(), Some(strings(&["Kept", "Added"])));
}

#[tokio::test]
async fn test_stale_search_is_discarded() {
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.set_page("slow", 1, make_page(&["Slow"], false));
    fetcher.set_page("fast", 1, make_page(&["Fast"], false));
    let gate = fetcher.hold("slow");
    let (sink, controller) = controller_with(fetcher);

    let slow = controller.search("slow");
    let fast = async {
        tokio::task::yield_now().await;
        let outcome = controller.search("fast").await;
        gate.notify_one();
        outcome
    };
    let (slow, fast) = tokio::join!(slow, fast);

    assert_eq!(slow.unwrap(), Transition::Superseded);
    assert!(matches!(fast.unwrap(), Transition::Loaded { .. }));
    assert_eq!(sink.rendered_titles(), vec![strings(&["Fast"])]);
    assert_eq!(controller.query().search_term(), "fast");
}

#[test]
fn test_null_fields_render_with_fallbacks() {
    let records = vec![BookRecord::default()];
    let style = RenderStyle {
        view: ViewMode::List,
        width: 160,
        ..Default::default()
    };

    let text = format_books(&records, &style);

    assert!(text.contains("Unknown Title"));
    assert!(text.contains("Unknown Author"));
    assert!(text.contains("Unknown Publisher"));
    assert!(text.contains("Unknown"));
}

#[tokio::test]
async fn test_http_fetcher_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let body = r#"{
        "success": true,
        "message": "Books fetched successfully",
        "data": {
            "page": 1,
            "totalPages": 1,
            "nextPage": false,
            "data": [
                {"id": 2, "volumeInfo": {"title": "Zeta", "publishedDate": "2001"}},
                {"id": 1, "volumeInfo": {"title": "alpha", "publishedDate": "1999-05-01"}}
            ]
        }
    }"#;
    let mock = server
        .mock("GET", "/books")
        .match_query(mockito::Matcher::AllOf(vec![
            mockito::Matcher::UrlEncoded("page".into(), "1".into()),
            mockito::Matcher::UrlEncoded("query".into(), "".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await;

    let config = ApiConfig {
        base_url: format!("{}/books", server.url()),
        ..Default::default()
    };
    let fetcher = Arc::new(FreeApiFetcher::new(&config).unwrap());
    let (sink, controller) = controller_with(fetcher);

    controller.search("").await.unwrap();
    controller.change_sort(SortKey::DateAsc);

    mock.assert_async().await;
    assert_eq!(controller.state(), ViewState::Loaded { has_more: false });
    assert_eq!(
        sink.rendered_titles(),
        vec![strings(&["Zeta", "alpha"]), strings(&["alpha", "Zeta"])]
    );
}

#[test]
fn test_config_file_drives_api_settings() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book-catalog.toml");
    std::fs::write(
        &path,
        r#"
[api]
base_url = "http://127.0.0.1:1/books"

[catalog]
default_sort = "title-desc"
"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    let fetcher = FreeApiFetcher::new(&config.api).unwrap();

    assert_eq!(fetcher.base_url().as_str(), "http://127.0.0.1:1/books");
    assert_eq!(config.catalog.default_sort, SortKey::TitleDesc);
}
