//! User search

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{ids, test_config, TestApp, PASSWORD};
use amity_state::MemoryStore;
use std::sync::Arc;

async fn populate(app: &TestApp) -> String {
    for (email, first, last) in [
        ("ada@example.com", "Ada", "Lovelace"),
        ("alan@example.org", "Alan", "Turing"),
        ("grace@example.com", "Grace", "Hopper"),
    ] {
        let (status, body) = app
            .post(
                "/signup/",
                None,
                Some(json!({
                    "email": email,
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                    "first_name": first,
                    "last_name": last,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
    }
    let (_, tokens) = app.login("ada@example.com", PASSWORD).await;
    tokens["access"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_search_requires_authentication() {
    let app = TestApp::new();
    let (status, _) = app.get("/search/?search=ada", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_search_lists_everyone_by_id() {
    let app = TestApp::new();
    let token = populate(&app).await;

    let (status, body) = app.get("/search/", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3]);
}

#[tokio::test]
async fn test_every_term_must_match() {
    for app in [TestApp::new(), TestApp::sqlite().await] {
        let token = populate(&app).await;

        let (_, body) = app.get("/search/?search=LOVE", Some(&token)).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["first_name"], "Ada");

        let (_, body) = app.get("/search/?search=example.com,a", Some(&token)).await;
        let firsts: Vec<_> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|u| u["first_name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(firsts, vec!["Ada", "Grace"]);

        let (_, body) = app.get("/search?search=alan%20hopper", Some(&token)).await;
        assert_eq!(body, json!([]));
    }
}

#[tokio::test]
async fn test_search_folds_accented_names() {
    for app in [TestApp::new(), TestApp::sqlite().await] {
        let token = populate(&app).await;
        let (status, body) = app
            .post(
                "/signup/",
                None,
                Some(json!({
                    "email": "emile@example.net",
                    "password": PASSWORD,
                    "confirm_password": PASSWORD,
                    "first_name": "Émile",
                    "last_name": "Zola",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");

        for query in ["%C3%A9mile", "%C3%89MILE"] {
            let (status, body) = app
                .get(&format!("/search/?search={}", query), Some(&token))
                .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(ids(&body), vec![4], "{query}");
        }
    }
}

#[tokio::test]
async fn test_results_are_capped() {
    let mut config = test_config();
    config.search.max_results = 2;
    let app = TestApp::with_store(config, Arc::new(MemoryStore::new()));
    let token = populate(&app).await;

    let (_, body) = app.get("/search/?search=example", Some(&token)).await;
    assert_eq!(ids(&body), vec![1, 2]);
}
