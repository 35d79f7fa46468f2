//! Friend request lifecycle over HTTP

use axum::http::{header, StatusCode};
use serde_json::json;

use crate::helpers::{ids, TestApp};

#[tokio::test]
async fn test_crossed_request_then_accept() {
    for app in [TestApp::new(), TestApp::sqlite().await] {
        let (a, token_a) = app.member("alice@example.com").await;
        let (b, token_b) = app.member("bob@example.com").await;

        let (status, edge) = app
            .post(&format!("/send-friend-request/{}/", b), Some(&token_a), None)
            .await;
        assert_eq!(status, StatusCode::CREATED, "{edge}");
        assert_eq!(edge["sender"], a.get());
        assert_eq!(edge["receiver"], b.get());
        assert_eq!(edge["accepted"], false);
        let e1 = edge["id"].as_i64().unwrap();

        let (status, body) = app
            .post(&format!("/send-friend-request/{}/", a), Some(&token_b), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["messages"], json!(["Friend request already received."]));

        let (status, body) = app
            .post(&format!("/accept-friend-request/{}/", e1), Some(&token_b), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Friend request accepted successfully.");

        let (_, friends_a) = app.get("/list-friends/", Some(&token_a)).await;
        let (_, friends_b) = app.get("/list-friends", Some(&token_b)).await;
        assert_eq!(ids(&friends_a), vec![b.get()]);
        assert_eq!(ids(&friends_b), vec![a.get()]);
        assert!(friends_a[0].get("password_hash").is_none());

        let (_, pending) = app.get("/list-pending-friend-requests/", Some(&token_b)).await;
        assert_eq!(pending, json!([]));
    }
}

#[tokio::test]
async fn test_duplicate_and_self_requests() {
    let app = TestApp::new();
    let (a, token_a) = app.member("alice@example.com").await;
    let (b, _) = app.member("bob@example.com").await;

    let (status, body) = app
        .post(&format!("/send-friend-request/{}", a), Some(&token_a), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_OPERATION");
    assert_eq!(body["messages"], json!(["You cannot send a friend request to yourself."]));

    app.post(&format!("/send-friend-request/{}", b), Some(&token_a), None).await;
    let (status, body) = app
        .post(&format!("/send-friend-request/{}", b), Some(&token_a), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["messages"], json!(["Friend request already sent."]));
}

#[tokio::test]
async fn test_unknown_ids_are_not_found() {
    let app = TestApp::new();
    let (_, token) = app.member("alice@example.com").await;

    let (status, body) = app.post("/send-friend-request/999/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");

    let (status, _) = app.post("/accept-friend-request/999/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/reject-friend-request/999/", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_receiver_can_respond() {
    let app = TestApp::new();
    let (_, token_a) = app.member("alice@example.com").await;
    let (b, token_b) = app.member("bob@example.com").await;
    let (_, token_c) = app.member("carol@example.com").await;

    let (_, edge) = app
        .post(&format!("/send-friend-request/{}/", b), Some(&token_a), None)
        .await;
    let id = edge["id"].as_i64().unwrap();

    for token in [&token_a, &token_c] {
        let (status, body) = app
            .post(&format!("/accept-friend-request/{}/", id), Some(token.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["messages"],
            json!(["You are not authorized to accept this friend request."])
        );

        let (status, body) = app
            .post(&format!("/reject-friend-request/{}/", id), Some(token.as_str()), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            body["messages"],
            json!(["You are not authorized to reject this friend request."])
        );
    }

    let (_, pending) = app.get("/list-pending-friend-requests/", Some(&token_b)).await;
    assert_eq!(ids(&pending), vec![id]);
    assert_eq!(pending[0]["accepted"], false);
}

#[tokio::test]
async fn test_reject_allows_a_fresh_request() {
    let app = TestApp::new();
    let (a, token_a) = app.member("alice@example.com").await;
    let (b, token_b) = app.member("bob@example.com").await;

    let (_, edge) = app
        .post(&format!("/send-friend-request/{}/", b), Some(&token_a), None)
        .await;
    let id = edge["id"].as_i64().unwrap();

    let (status, body) = app
        .post(&format!("/reject-friend-request/{}/", id), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Friend request rejected successfully.");

    let (_, status_body) = app
        .get(&format!("/friendship-status/{}/", a), Some(&token_b))
        .await;
    assert_eq!(status_body["state"], "no_edge");

    // Either side may now start over
    let (status, _) = app
        .post(&format!("/send-friend-request/{}/", a), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_answering_an_accepted_request_conflicts() {
    let app = TestApp::new();
    let (a, token_a) = app.member("alice@example.com").await;
    let (b, token_b) = app.member("bob@example.com").await;

    let (_, edge) = app
        .post(&format!("/send-friend-request/{}/", b), Some(&token_a), None)
        .await;
    let id = edge["id"].as_i64().unwrap();
    app.post(&format!("/accept-friend-request/{}/", id), Some(&token_b), None)
        .await;

    let (status, body) = app
        .post(&format!("/accept-friend-request/{}/", id), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "ALREADY_ACCEPTED");

    let (status, body) = app
        .post(&format!("/reject-friend-request/{}/", id), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "FRIENDSHIP_ESTABLISHED");

    let (status, body) = app
        .post(&format!("/send-friend-request/{}/", a), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["messages"], json!(["You are already friends with this user."]));
}

#[tokio::test]
async fn test_friendship_status_views() {
    let app = TestApp::new();
    let (a, token_a) = app.member("alice@example.com").await;
    let (b, token_b) = app.member("bob@example.com").await;

    app.post(&format!("/send-friend-request/{}/", b), Some(&token_a), None)
        .await;

    let (status, body) = app
        .get(&format!("/friendship-status/{}/", b), Some(&token_a))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "user": b.get(), "state": "pending_outgoing" }));

    let (_, body) = app
        .get(&format!("/friendship-status/{}", a), Some(&token_b))
        .await;
    assert_eq!(body["state"], "pending_incoming");

    let (status, _) = app.get("/friendship-status/999/", Some(&token_a)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_friendship_status_with_self_is_invalid() {
    let app = TestApp::new();
    let (a, token) = app.member("alice@example.com").await;

    let (status, body) = app
        .get(&format!("/friendship-status/{}/", a), Some(&token))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_OPERATION");
    assert_eq!(
        body["messages"],
        json!(["You cannot check friendship status with yourself."])
    );
}

#[tokio::test]
async fn test_non_numeric_ids_get_json_errors() {
    let app = TestApp::new();
    let (_, token) = app.member("alice@example.com").await;

    for (method, uri) in [
        ("POST", "/send-friend-request/bob/"),
        ("POST", "/accept-friend-request/abc/"),
        ("POST", "/reject-friend-request/1.5/"),
        ("GET", "/friendship-status/me/"),
    ] {
        let (status, body) = match method {
            "GET" => app.get(uri, Some(&token)).await,
            _ => app.post(uri, Some(&token), None).await,
        };
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["code"], "MALFORMED_REQUEST", "{uri}: {body}");
        assert!(body["messages"][0].as_str().is_some(), "{uri}");
    }
}

#[tokio::test]
async fn test_sending_is_throttled_per_user() {
    let app = TestApp::new();
    let (_, token_a) = app.member("alice@example.com").await;
    let (b, token_b) = app.member("bob@example.com").await;
    let (c, _) = app.member("carol@example.com").await;

    let uri = format!("/send-friend-request/{}/", b);
    let (status, _) = app.post(&uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::CREATED);
    for _ in 0..2 {
        let (status, _) = app.post(&uri, Some(&token_a), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    let (status, body) = app.post(&uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");
    let message = body["messages"][0].as_str().unwrap();
    assert!(message.starts_with("Request was throttled. Expected available in "));

    // Other senders keep their own budget
    let (status, _) = app
        .post(&format!("/send-friend-request/{}/", c), Some(&token_b), None)
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_throttled_response_carries_retry_after() {
    let app = TestApp::new();
    let (_, token) = app.member("alice@example.com").await;

    for _ in 0..3 {
        app.post("/send-friend-request/999/", Some(&token), None).await;
    }

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/send-friend-request/999/")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.raw(request).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let retry_after: u64 = response.headers()[header::RETRY_AFTER]
        .to_str()
        .unwrap()
        .parse()
        .unwrap();
    // A slot comes back a full minute after the burst
    assert!((50..=60).contains(&retry_after), "{retry_after}");
}
