use axum::{Router, body::Body, http::Request, http::StatusCode};
use gap_common::ReferenceEntity;
use gap_common::corpus::Corpus;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

const KEY: &str = "test-key";

fn zoho_corpus() -> Corpus {
    Corpus::from_entities(vec![ReferenceEntity {
        id: "zoho-books".into(),
        name: "Zoho Books".into(),
        description: "Online accounting software for small businesses".into(),
        category: Some("Fintech".into()),
    }])
}

fn app() -> Router {
    gap_api::create_router(gap_api::test_state_with_corpus(KEY, zoho_corpus()))
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .header("x-api-key", KEY)
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn gap_detect_against_loaded_corpus() {
    let (status, body) = post_json(
        app(),
        "/api/gap-detect",
        json!({
            "candidateDescription": "Online accounting software for small businesses",
            "candidateCategory": "fintech"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isGap"], json!(false));
    assert_eq!(body["confidenceScore"], json!(0));
    assert_eq!(body["similarStartups"][0]["startup"]["name"], json!("Zoho Books"));
    assert_eq!(body["similarStartups"][0]["similarityScore"], json!(100));
    assert!(body["recommendation"].as_str().unwrap().contains("Zoho Books"));
}

#[tokio::test]
async fn gap_detect_inline_empty_corpus_is_a_gap() {
    let (status, body) = post_json(
        app(),
        "/api/gap-detect",
        json!({
            "candidateDescription": "Online accounting software for small businesses",
            "referenceCorpus": []
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["isGap"], json!(true));
    assert_eq!(body["confidenceScore"], json!(100));
    assert_eq!(body["similarStartups"], json!([]));
}

#[tokio::test]
async fn inline_corpus_overrides_loaded_snapshot() {
    let inline = vec![ReferenceEntity {
        id: "khatabook".into(),
        name: "Khatabook".into(),
        description: "Digital ledger for kirana stores".into(),
        category: Some(" Fintech ".into()),
    }];
    let inline_version = Corpus::from_entities(inline.clone()).version().to_string();

    let (status, body) = post_json(
        app(),
        "/api/score",
        json!({
            "title": "Ledger",
            "description": "Digital ledger for kirana stores",
            "category": "fintech",
            "referenceCorpus": inline
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["corpusVersion"], json!(inline_version));
    assert_ne!(body["corpusVersion"], json!(zoho_corpus().version()));
    assert_eq!(
        body["gapAnalysis"]["similarStartups"][0]["startup"]["name"],
        json!("Khatabook")
    );
    assert_eq!(body["gapAnalysis"]["isGap"], json!(false));
}

#[tokio::test]
async fn empty_description_is_a_bad_request() {
    let (status, body) = post_json(app(), "/api/gap-detect", json!({"candidateDescription": ""})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("bad_request"));

    let (status, _) = post_json(app(), "/api/score", json!({"title": "x", "description": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_category_type_is_a_bad_request() {
    let (status, body) = post_json(
        app(),
        "/api/score",
        json!({"description": "invoice automation", "category": 7}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], json!("bad_request"));
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn score_returns_full_breakdown() {
    let (status, body) = post_json(
        app(),
        "/api/score",
        json!({
            "title": "AI Bookkeeper",
            "description": "AI bookkeeping and GST compliance tool for small Indian businesses",
            "category": "Fintech"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["scoring"]["culturalFit"], json!(95));
    assert_eq!(body["scoring"]["regulatoryRisk"], json!(70));
    assert_eq!(body["overallScore"], json!(68));
    assert_eq!(body["opportunityLevel"], json!("medium"));
    assert_eq!(body["gapAnalysis"]["isGap"], json!(true));
    assert_eq!(body["corpusVersion"], json!(zoho_corpus().version()));

    let recommendations = body["recommendations"].as_array().unwrap();
    assert!(recommendations.last().unwrap().as_str().unwrap().starts_with("Validate"));
}

#[tokio::test]
async fn repeated_score_is_served_identically() {
    let state = gap_api::test_state_with_corpus(KEY, zoho_corpus());
    let app = gap_api::create_router(state.clone());
    let request = json!({"title": "Ledger", "description": "GST invoicing for kirana stores"});

    let (_, first) = post_json(app.clone(), "/api/score", request.clone()).await;
    assert_eq!(state.cache.len(), 1);
    let (_, second) = post_json(app, "/api/score", request).await;

    assert_eq!(first, second);
    assert_eq!(state.cache.len(), 1);
}

#[tokio::test]
async fn batch_is_ranked_and_limited() {
    let (status, body) = post_json(
        app(),
        "/api/score/batch",
        json!({
            "candidates": [
                {"title": "Weak", "description": "crypto lending on blockchain with hardware wallets"},
                {"title": "Strong", "description": "AI invoicing software for small Indian businesses"},
                {"title": "Middle", "description": "generic reseller app"}
            ],
            "limit": 2
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    assert!(results[0]["overallScore"].as_u64() >= results[1]["overallScore"].as_u64());
    assert_eq!(results[0]["overallScore"], json!(71));
}

#[tokio::test]
async fn batch_with_invalid_candidate_reports_index() {
    let (status, body) = post_json(
        app(),
        "/api/score/batch",
        json!({"candidates": [{"description": "invoice automation"}, {"description": ""}]}),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("candidates[1]"));
}

#[tokio::test]
async fn stats_reports_corpus_and_config() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/stats")
                .header("x-api-key", KEY)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["corpus"]["entities"], json!(1));
    assert_eq!(body["config"]["gap"]["gapThreshold"], json!(60));
    assert_eq!(body["config"]["weights"]["monopolyPotential"], json!(0.1));
    assert_eq!(body["cache"]["ttlSecs"], json!(300));
}
