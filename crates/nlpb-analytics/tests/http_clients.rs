//! Integration tests for the model and vector-store HTTP clients using
//! wiremock HTTP mocks.

use std::collections::BTreeMap;
use std::time::Duration;

use nlpb_analytics::{
    AnalyticsError, Embedder, QdrantStore, SentimentModel, TeiClient, TeiSentimentClient,
    VectorEntry, VectorStore, ZeroShotClassifier, ZeroShotClient,
};
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TIMEOUT: Duration = Duration::from_secs(5);

fn texts(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("texto {i}")).collect()
}

#[tokio::test]
async fn tei_embed_batches_by_64() {
    let server = MockServer::start().await;

    let full_batch: Vec<Vec<f32>> = vec![vec![0.1, 0.2]; 64];
    let tail_batch: Vec<Vec<f32>> = vec![vec![0.3, 0.4]; 6];
    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(body_partial_json(serde_json::json!({ "inputs": texts(64) })))
        .respond_with(ResponseTemplate::new(200).set_body_json(&full_batch))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(body_partial_json(
            serde_json::json!({ "inputs": texts(70)[64..].to_vec() }),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(&tail_batch))
        .expect(1)
        .mount(&server)
        .await;

    let client = TeiClient::new(&server.uri(), TIMEOUT, None).expect("client");
    let vectors = client.embed(&texts(70)).await.expect("embed");

    assert_eq!(vectors.len(), 70);
    assert_eq!(vectors[0], vec![0.1, 0.2]);
    assert_eq!(vectors[69], vec![0.3, 0.4]);
}

#[tokio::test]
async fn tei_embed_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .and(header("authorization", "Bearer hf-secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![vec![1.0_f32]]))
        .expect(1)
        .mount(&server)
        .await;

    let client =
        TeiClient::new(&server.uri(), TIMEOUT, Some("hf-secret".to_string())).expect("client");
    let vectors = client.embed(&texts(1)).await.expect("embed");
    assert_eq!(vectors, vec![vec![1.0]]);
}

#[tokio::test]
async fn tei_embed_rejects_short_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec![vec![1.0_f32]]))
        .mount(&server)
        .await;

    let client = TeiClient::new(&server.uri(), TIMEOUT, None).expect("client");
    let err = client.embed(&texts(2)).await.unwrap_err();
    assert!(matches!(err, AnalyticsError::Tei(_)), "got {err:?}");
}

#[tokio::test]
async fn tei_embed_surfaces_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/embed"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = TeiClient::new(&server.uri(), TIMEOUT, None).expect("client");
    let err = client.embed(&texts(1)).await.unwrap_err();
    assert!(err.to_string().contains("503"), "got {err}");
}

#[tokio::test]
async fn zero_shot_sends_single_label_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/zero-shot"))
        .and(body_partial_json(serde_json::json!({
            "inputs": "quero cancelar meu pedido",
            "parameters": {
                "candidate_labels": ["elogio", "reclamacao"],
                "multi_label": false
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "sequence": "quero cancelar meu pedido",
            "labels": ["reclamacao", "elogio"],
            "scores": [0.91, 0.09]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ZeroShotClient::new(&format!("{}/zero-shot", server.uri()), TIMEOUT, None)
        .expect("client");
    let scores = client
        .classify(
            "quero cancelar meu pedido",
            &["elogio".to_string(), "reclamacao".to_string()],
        )
        .await
        .expect("classify");

    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].label, "reclamacao");
    assert!((scores[0].score - 0.91).abs() < 1e-6);
}

#[tokio::test]
async fn zero_shot_rejects_mismatched_lengths() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([{
            "labels": ["a", "b"],
            "scores": [1.0]
        }])))
        .mount(&server)
        .await;

    let client = ZeroShotClient::new(&server.uri(), TIMEOUT, None).expect("client");
    let err = client
        .classify("x", &["a".to_string(), "b".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, AnalyticsError::ZeroShot(_)), "got {err:?}");
}

#[tokio::test]
async fn sentiment_predict_parses_nested_scores() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/predict"))
        .and(body_partial_json(serde_json::json!({
            "inputs": "great product",
            "raw_scores": false
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([[
            { "label": "5 stars", "score": 0.81 },
            { "label": "4 stars", "score": 0.12 }
        ]])))
        .expect(1)
        .mount(&server)
        .await;

    let client = TeiSentimentClient::new(&server.uri(), TIMEOUT, None).expect("client");
    let scores = client.score("great product").await.expect("score");
    assert_eq!(scores.len(), 2);
    assert_eq!(scores[0].label, "5 stars");
}

#[tokio::test]
async fn qdrant_creates_missing_collection() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/collections/textos_dataset"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/collections/textos_dataset"))
        .and(header("api-key", "qd-key"))
        .and(body_partial_json(serde_json::json!({
            "vectors": { "size": 384, "distance": "Cosine" }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": true, "status": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    QdrantStore::open_or_create(
        &server.uri(),
        "textos_dataset",
        384,
        Some("qd-key".to_string()),
        TIMEOUT,
    )
    .await
    .expect("open");
}

async fn existing_collection(server: &MockServer) -> QdrantStore {
    Mock::given(method("GET"))
        .and(path("/collections/textos_dataset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": { "status": "green" }, "status": "ok"
        })))
        .mount(server)
        .await;
    QdrantStore::open_or_create(&server.uri(), "textos_dataset", 384, None, TIMEOUT)
        .await
        .expect("open")
}

#[tokio::test]
async fn qdrant_count_is_exact() {
    let server = MockServer::start().await;
    let store = existing_collection(&server).await;

    Mock::given(method("POST"))
        .and(path("/collections/textos_dataset/points/count"))
        .and(body_partial_json(serde_json::json!({ "exact": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": { "count": 500 }, "status": "ok"
        })))
        .mount(&server)
        .await;

    assert_eq!(store.count().await.expect("count"), 500);
}

#[tokio::test]
async fn qdrant_insert_uses_numeric_point_ids() {
    let server = MockServer::start().await;
    let store = existing_collection(&server).await;

    Mock::given(method("PUT"))
        .and(path("/collections/textos_dataset/points"))
        .and(query_param("wait", "true"))
        .and(body_partial_json(serde_json::json!({
            "points": [{
                "id": 7,
                "payload": {
                    "doc_id": "doc_7",
                    "text": "entrega rapida",
                    "category": "elogio"
                }
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": { "status": "completed" }, "status": "ok"
        })))
        .expect(1)
        .mount(&server)
        .await;

    store
        .insert(vec![VectorEntry {
            id: "doc_7".to_string(),
            vector: vec![0.5, 0.5],
            text: "entrega rapida".to_string(),
            metadata: BTreeMap::from([("category".to_string(), "elogio".to_string())]),
        }])
        .await
        .expect("insert");
}

#[tokio::test]
async fn qdrant_search_maps_scores_to_distances() {
    let server = MockServer::start().await;
    let store = existing_collection(&server).await;

    Mock::given(method("POST"))
        .and(path("/collections/textos_dataset/points/search"))
        .and(body_partial_json(serde_json::json!({
            "limit": 2,
            "with_payload": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "result": [
                {
                    "id": 3, "version": 0, "score": 0.9,
                    "payload": { "doc_id": "doc_3", "text": "ótimo", "category": "elogio", "language": "pt" }
                },
                {
                    "id": 1, "version": 0, "score": 0.4,
                    "payload": { "doc_id": "doc_1", "text": "ruim", "category": "reclamacao", "language": "pt" }
                }
            ],
            "status": "ok"
        })))
        .mount(&server)
        .await;

    let matches = store.query(&[0.1, 0.2], 2).await.expect("query");
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "doc_3");
    assert!((matches[0].distance - 0.1).abs() < 1e-6);
    assert!((matches[1].distance - 0.6).abs() < 1e-6);
    assert_eq!(matches[1].metadata["category"], "reclamacao");
}
