use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

mod common;

async fn create_session(
    app: &axum::Router,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    post_json(app, "/api/v1/sessions", body).await
}

async fn post_json(
    app: &axum::Router,
    uri: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}

#[tokio::test]
async fn test_health_reports_catalog_counts() {
    let app = common::create_test_app().await;
    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["questions"].as_u64().unwrap() > 0);
    assert!(body["categories"].as_u64().unwrap() > 0);
}

#[tokio::test]
async fn test_categories_endpoint_lists_the_catalog() {
    let app = common::create_test_app().await;
    let (status, body) = get_json(&app, "/api/v1/catalog/categories").await;

    assert_eq!(status, StatusCode::OK);
    let categories = body.as_array().unwrap();
    assert!(!categories.is_empty());
    assert!(categories.iter().any(|c| c["id"] == "friday"));
    assert!(categories[0]["title"].is_string());
    assert!(categories[0]["year"].is_u64());
}

#[tokio::test]
async fn test_create_session_returns_initial_batch() {
    let app = common::create_test_app().await;
    let (status, body) = create_session(&app, json!({})).await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(Uuid::parse_str(body["session_id"].as_str().unwrap()).is_ok());

    let snapshot = &body["snapshot"];
    assert_eq!(snapshot["cards"].as_array().unwrap().len(), 3);
    assert_eq!(snapshot["score"], 0);
    assert_eq!(snapshot["streak"], 0);
    assert_eq!(snapshot["active_filter"], "all");
    assert_eq!(snapshot["has_more"], true);

    // Fresh cards carry full, idle timers.
    for card in snapshot["cards"].as_array().unwrap() {
        let timer = &card["timer"];
        assert_eq!(timer["remaining"], timer["total"]);
        assert_eq!(timer["running"], false);
        assert_eq!(timer["done"], false);
        assert!(card["chosen"].is_null());
    }
}

#[tokio::test]
async fn test_create_session_with_category_filter() {
    let app = common::create_test_app().await;
    let (status, body) = create_session(&app, json!({ "filter": "friday" })).await;

    assert_eq!(status, StatusCode::CREATED);
    let snapshot = &body["snapshot"];
    assert_eq!(snapshot["active_filter"], "friday");
    for card in snapshot["cards"].as_array().unwrap() {
        let category = card["question"]["category"].as_str().unwrap();
        assert!(category == "friday" || category == "all");
    }
}

#[tokio::test]
async fn test_create_session_unknown_filter_returns_400() {
    let app = common::create_test_app().await;
    let (status, _) = create_session(&app, json!({ "filter": "no-such-film" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_unknown_session_returns_404() {
    let app = common::create_test_app().await;
    let (status, _) = get_json(&app, &format!("/api/v1/sessions/{}", Uuid::new_v4())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_correct_answer_awards_points_and_streak() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();
    let card = &body["snapshot"]["cards"][0];
    let correct_option = card["question"]["answer"].as_u64().unwrap();
    let total = card["timer"]["total"].as_f64().unwrap();

    let (status, answer) = post_json(
        &app,
        &format!("/api/v1/sessions/{}/answers", id),
        json!({ "card": 0, "option": correct_option }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["accepted"], true);
    assert_eq!(answer["correct"], true);
    assert_eq!(answer["streak"], 1);
    // Answered before any tick: full time left, so 10 * 1 + round(total * 3).
    let expected = 10 + (total * 3.0).round() as u64;
    assert_eq!(answer["points_awarded"].as_u64().unwrap(), expected);
    assert_eq!(answer["total_score"], answer["points_awarded"]);
    assert!(answer["feedback"].as_str().unwrap().contains("pts"));

    // The snapshot reflects the terminal card.
    let (_, snapshot) = get_json(&app, &format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(snapshot["cards"][0]["chosen"], correct_option);
    assert_eq!(snapshot["cards"][0]["timer"]["done"], true);
    assert_eq!(snapshot["total_answered"], 1);
    assert_eq!(snapshot["correct_count"], 1);
}

#[tokio::test]
async fn test_wrong_answer_resets_streak_and_awards_nothing() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();
    let card = &body["snapshot"]["cards"][0];
    let correct = card["question"]["answer"].as_u64().unwrap();
    let options = card["question"]["options"].as_array().unwrap().len() as u64;
    let wrong = (correct + 1) % options;

    let (status, answer) = post_json(
        &app,
        &format!("/api/v1/sessions/{}/answers", id),
        json!({ "card": 0, "option": wrong }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["accepted"], true);
    assert_eq!(answer["correct"], false);
    assert_eq!(answer["points_awarded"], 0);
    assert_eq!(answer["streak"], 0);
    assert_eq!(answer["feedback"], "Incorrect answer");
}

#[tokio::test]
async fn test_duplicate_answer_is_rejected_as_noop() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();
    let correct = body["snapshot"]["cards"][0]["question"]["answer"]
        .as_u64()
        .unwrap();

    let uri = format!("/api/v1/sessions/{}/answers", id);
    let (_, first) = post_json(&app, &uri, json!({ "card": 0, "option": correct })).await;
    assert_eq!(first["accepted"], true);

    let (status, second) = post_json(&app, &uri, json!({ "card": 0, "option": correct })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(second["accepted"], false);
    assert_eq!(second["points_awarded"], 0);

    // Score unchanged.
    let (_, snapshot) = get_json(&app, &format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(snapshot["score"], first["total_score"]);
    assert_eq!(snapshot["total_answered"], 1);
}

#[tokio::test]
async fn test_visibility_starts_and_pauses_the_card_timer() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();
    let uri = format!("/api/v1/sessions/{}/visibility", id);

    let (status, _) = post_json(&app, &uri, json!({ "card": 0, "visible": true })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, snapshot) = get_json(&app, &format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(snapshot["cards"][0]["timer"]["running"], true);

    let (status, _) = post_json(&app, &uri, json!({ "card": 0, "visible": false })).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, snapshot) = get_json(&app, &format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(snapshot["cards"][0]["timer"]["running"], false);
    assert_eq!(snapshot["cards"][0]["timer"]["paused"], true);
}

#[tokio::test]
async fn test_running_timer_counts_down() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();
    let total = body["snapshot"]["cards"][0]["timer"]["total"]
        .as_f64()
        .unwrap();

    post_json(
        &app,
        &format!("/api/v1/sessions/{}/visibility", id),
        json!({ "card": 0, "visible": true }),
    )
    .await;

    // Test config ticks every 100ms.
    tokio::time::sleep(std::time::Duration::from_millis(350)).await;

    let (_, snapshot) = get_json(&app, &format!("/api/v1/sessions/{}", id)).await;
    let remaining = snapshot["cards"][0]["timer"]["remaining"].as_f64().unwrap();
    assert!(remaining < total, "timer should have ticked down");
    assert!(remaining > 0.0);
}

#[tokio::test]
async fn test_filter_change_rebuilds_feed_and_keeps_score() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();
    let correct = body["snapshot"]["cards"][0]["question"]["answer"]
        .as_u64()
        .unwrap();

    let (_, answer) = post_json(
        &app,
        &format!("/api/v1/sessions/{}/answers", id),
        json!({ "card": 0, "option": correct }),
    )
    .await;
    let score = answer["total_score"].as_u64().unwrap();
    assert!(score > 0);

    let (status, snapshot) = post_json(
        &app,
        &format!("/api/v1/sessions/{}/filter", id),
        json!({ "filter": "boyz" }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["active_filter"], "boyz");
    assert_eq!(snapshot["score"].as_u64().unwrap(), score);
    assert_eq!(snapshot["total_answered"], 1);
    let cards = snapshot["cards"].as_array().unwrap();
    assert_eq!(cards.len(), 3);
    for card in cards {
        let category = card["question"]["category"].as_str().unwrap();
        assert!(category == "boyz" || category == "all");
        assert!(card["chosen"].is_null());
    }
}

#[tokio::test]
async fn test_unknown_filter_returns_400() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();

    let (status, _) = post_json(
        &app,
        &format!("/api/v1/sessions/{}/filter", id),
        json!({ "filter": "no-such-film" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Feed untouched.
    let (_, snapshot) = get_json(&app, &format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(snapshot["active_filter"], "all");
}

#[tokio::test]
async fn test_load_more_appends_a_batch() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();

    let (status, snapshot) =
        post_json(&app, &format!("/api/v1/sessions/{}/more", id), json!({})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(snapshot["cards"].as_array().unwrap().len(), 6);

    // No question appears twice in the feed.
    let ids: Vec<u64> = snapshot["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["question"]["id"].as_u64().unwrap())
        .collect();
    let unique: std::collections::HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(ids.len(), unique.len());
}

#[tokio::test]
async fn test_delete_session_frees_it() {
    let app = common::create_test_app().await;
    let (_, body) = create_session(&app, json!({})).await;
    let id = body["session_id"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/sessions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let (status, _) = get_json(&app, &format!("/api/v1/sessions/{}", id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Second delete is a 404, not an error.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/sessions/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stream_for_unknown_session_returns_404() {
    let app = common::create_test_app().await;
    let (status, _) = get_json(
        &app,
        &format!("/api/v1/sessions/{}/stream", Uuid::new_v4()),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
