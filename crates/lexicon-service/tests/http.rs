use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use lexicon_db::{MergeKey, Pipeline, PipelineConfig};
use lexicon_parser::{LineParser, ParserConfig};
use lexicon_phonetic::Normalizer;
use lexicon_service::handlers::{AppState, router};

const DICTIONARY: &str = "\
English Section
abide  v.  బంజర /abaid/
able  adj.  సకేర్ /sakēr/
about  adv.  లగ్‌భగ్ /lagbhag/
account  n.  హిసాబ్ /hisāb/
account  v.  గిణ్ /giṇ/
come  v.  ఆ /āv/
come  v.  ఆవ్రి /āvri/
";

fn make_state() -> AppState {
    let parser = LineParser::new(ParserConfig::default()).unwrap();
    let pipeline = Pipeline::new(
        parser,
        Normalizer::default(),
        PipelineConfig {
            merge_key: MergeKey::HeadwordAndCategory,
            ..PipelineConfig::default()
        },
    );
    let mut lexicon = pipeline.new_lexicon();
    pipeline.ingest_text(DICTIONARY, &mut lexicon);
    AppState {
        lexicon: Arc::new(lexicon),
        normalizer: Arc::new(pipeline.normalizer().clone()),
        max_page_size: 3,
    }
}

async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
    let app = router(make_state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body_bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let body = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);
    (status, body)
}

#[tokio::test]
async fn healthz_ok() {
    let app = router(make_state());
    let response = app
        .oneshot(
            Request::builder()
                .uri("/healthz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body_bytes = to_bytes(response.into_body(), 1024).await.unwrap();
    assert_eq!(&body_bytes[..], b"ok");
}

#[tokio::test]
async fn lookup_returns_retained_entry() {
    let (status, body) = get("/v1/lookup?word=come").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["word"], "come");
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["phonetic"], "avri");
    assert_eq!(entries[0]["category"], "verb");
    assert_eq!(entries[0]["script"], "ఆవ్రి");
    assert_eq!(entries[0]["source_line"], 8);
    assert_eq!(entries[0]["seen"], 2);
}

#[tokio::test]
async fn lookup_filters_by_category() {
    let (status, body) = get("/v1/lookup?word=Account").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"].as_array().unwrap().len(), 2);

    let (status, body) = get("/v1/lookup?word=account&category=noun").await;
    assert_eq!(status, StatusCode::OK);
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["phonetic"], "hisab");
}

#[tokio::test]
async fn lookup_misses_are_not_found() {
    let (status, body) = get("/v1/lookup?word=zebra").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("zebra"));

    let (status, _) = get("/v1/lookup?word=abide&category=noun").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn lookup_rejects_unknown_category() {
    let (status, body) = get("/v1/lookup?word=abide&category=gerund").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("gerund"));
}

#[tokio::test]
async fn search_paginates_and_caps_page_size() {
    let (status, body) = get("/v1/search?q=a&page=1&page_size=50").await;
    assert_eq!(status, StatusCode::OK);
    // abide, able, about, account (noun), account (verb)
    assert_eq!(body["total"], 5);
    assert_eq!(body["page_size"], 3);
    assert_eq!(body["has_more"], true);
    let words: Vec<&str> = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["headword"].as_str().unwrap())
        .collect();
    assert_eq!(words, vec!["abide", "able", "about"]);

    let (_, body) = get("/v1/search?q=a&page=2&page_size=3").await;
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
    assert_eq!(body["has_more"], false);
}

#[tokio::test]
async fn search_rejects_invalid_params() {
    for uri in [
        "/v1/search?q=",
        "/v1/search?q=ab&page=0",
        "/v1/search?q=ab&page_size=0",
    ] {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn stats_counts_categories() {
    let (status, body) = get("/v1/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["entries"], 6);
    assert_eq!(body["merge_key"], "headword-and-category");
    let categories = body["categories"].as_array().unwrap();
    assert_eq!(categories[0]["category"], "verb");
    assert_eq!(categories[0]["count"], 3);
}

#[tokio::test]
async fn normalize_applies_substitutions() {
    let (status, body) = get("/v1/normalize?text=%E1%B9%87a%E1%B9%81").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "ṇaṁ");
    assert_eq!(body["phonetic"], "nam");
}
