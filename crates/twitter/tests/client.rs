//! Integration tests for [`TwitterClient`] against a mock HTTP server.

use assert_matches::assert_matches;
use serde_json::json;
use tothc_twitter::{
    OAuth10aTokens, TwitterClient, TwitterError, MAX_TIMELINE_PAGES, TIMELINE_PAGE_SIZE,
};
use wiremock::matchers::{header_exists, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn tokens() -> OAuth10aTokens {
    OAuth10aTokens {
        consumer_key: "ck".into(),
        consumer_secret: "cs".into(),
        access_token: "at".into(),
        access_token_secret: "ats".into(),
    }
}

fn client(server: &MockServer) -> TwitterClient {
    TwitterClient::with_client(reqwest::Client::new(), format!("{}/1.1/", server.uri()), tokens())
}

/// A timeline page of plain tweets by user 12, in the order given.
fn page(ids: impl IntoIterator<Item = i64>) -> serde_json::Value {
    ids.into_iter()
        .map(|id| json!({ "id": id, "user": { "id": 12, "screen_name": "jack" } }))
        .collect()
}

fn bad_credentials(code: i64) -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "errors": [{ "code": code, "message": "Could not authenticate you." }]
    }))
}

// ---------------------------------------------------------------------------
// users/show
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_user_by_screen_name_returns_canonical_user() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/show.json"))
        .and(query_param("screen_name", "rustlang"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 165262228,
            "id_str": "165262228",
            "screen_name": "rustlang",
            "name": "Rust Language",
            "protected": false,
            "followers_count": 1,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let user = client(&server).get_user_by_screen_name("rustlang").await.unwrap();

    assert_eq!(user.id, 165262228);
    assert_eq!(user.screen_name, "rustlang");
    assert_eq!(user.name, "Rust Language");
    assert!(!user.protected);
}

#[tokio::test]
async fn missing_user_maps_to_user_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/show.json"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({ "errors": [{ "code": 50, "message": "User not found." }] })),
        )
        .mount(&server)
        .await;

    let err = client(&server).get_user_by_screen_name("ghost").await.unwrap_err();
    assert_matches!(err, TwitterError::UserNotFound { ref screen_name } if screen_name == "ghost");
}

#[tokio::test]
async fn suspended_user_maps_to_user_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/show.json"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "errors": [{ "code": 63, "message": "User has been suspended." }] })),
        )
        .mount(&server)
        .await;

    let err = client(&server).get_user_by_screen_name("banned").await.unwrap_err();
    assert_matches!(err, TwitterError::UserNotFound { .. });
}

#[tokio::test]
async fn lookup_with_rejected_credentials_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/show.json"))
        .respond_with(bad_credentials(89))
        .mount(&server)
        .await;

    let err = client(&server).get_user_by_screen_name("jack").await.unwrap_err();
    assert_matches!(err, TwitterError::Unauthorized { code: 89 });
}

#[tokio::test]
async fn other_forbidden_is_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/users/show.json"))
        .respond_with(ResponseTemplate::new(403).set_body_string("nope"))
        .mount(&server)
        .await;

    let err = client(&server).get_user_by_screen_name("x").await.unwrap_err();
    assert_matches!(err, TwitterError::Api { status: 403, ref body } if body == "nope");
}

// ---------------------------------------------------------------------------
// statuses/user_timeline
// ---------------------------------------------------------------------------

#[tokio::test]
async fn timeline_sends_paging_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("user_id", "12"))
        .and(query_param("since_id", "100"))
        .and(query_param("count", "200"))
        .and(query_param("include_rts", "true"))
        .and(query_param("tweet_mode", "extended"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": 102,
                "full_text": "second",
                "user": { "id": 12, "screen_name": "jack" },
                "entities": { "media": [{ "id": 1, "type": "photo" }] },
            },
            {
                "id": 101,
                "full_text": "first",
                "user": { "id": 12, "screen_name": "jack" },
            },
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let timeline = client(&server)
        .get_user_timeline_by_user_id(12, Some(100))
        .await
        .unwrap();

    assert_eq!(timeline.len(), 2);
    assert_eq!(timeline.newest_id(), Some(102));
    assert!(timeline.tweets[0].has_media());
    assert_eq!(timeline.tweets[1].body(), "first");
}

#[tokio::test]
async fn timeline_without_since_id_omits_parameter() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param_is_missing("since_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let timeline = client(&server)
        .get_user_timeline_by_user_id(12, None)
        .await
        .unwrap();
    assert!(timeline.is_empty());
}

#[tokio::test]
async fn protected_timeline_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_user_timeline_by_user_id(12, None)
        .await
        .unwrap_err();
    assert_matches!(err, TwitterError::TimelineUnavailable { user_id: 12, status: 401 });
    assert!(err.is_account_specific());
}

#[tokio::test]
async fn protected_timeline_error_body_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "request": "/1.1/statuses/user_timeline.json",
            "error": "Not authorized.",
        })))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_user_timeline_by_user_id(12, Some(100))
        .await
        .unwrap_err();
    assert_matches!(err, TwitterError::TimelineUnavailable { user_id: 12, status: 401 });
}

#[tokio::test]
async fn timeline_with_rejected_credentials_is_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(bad_credentials(32))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_user_timeline_by_user_id(12, None)
        .await
        .unwrap_err();
    assert_matches!(err, TwitterError::Unauthorized { code: 32 });
    assert!(!err.is_account_specific());
}

#[tokio::test]
async fn rate_limit_reports_reset_time() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(ResponseTemplate::new(429).insert_header("x-rate-limit-reset", "1700000000"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_user_timeline_by_user_id(12, None)
        .await
        .unwrap_err();
    assert_matches!(err, TwitterError::RateLimited { reset_at: Some(1700000000) });
}

#[tokio::test]
async fn server_error_is_api_error_with_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(ResponseTemplate::new(503).set_body_string("over capacity"))
        .mount(&server)
        .await;

    let err = client(&server)
        .get_user_timeline_by_user_id(12, None)
        .await
        .unwrap_err();
    assert_matches!(err, TwitterError::Api { status: 503, ref body } if body == "over capacity");
}

// ---------------------------------------------------------------------------
// Timeline catch-up
// ---------------------------------------------------------------------------

#[tokio::test]
async fn full_page_is_followed_by_older_pages() {
    let server = MockServer::start().await;
    let full = TIMELINE_PAGE_SIZE as i64;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("since_id", "1000"))
        .and(query_param_is_missing("max_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page((1101..=1100 + full).rev())))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param("since_id", "1000"))
        .and(query_param("max_id", "1100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page((1051..=1100).rev())))
        .expect(1)
        .mount(&server)
        .await;

    let timeline = client(&server)
        .get_user_timeline_by_user_id(12, Some(1000))
        .await
        .unwrap();

    assert_eq!(timeline.len(), TIMELINE_PAGE_SIZE as usize + 50);
    assert_eq!(timeline.oldest_id(), Some(1051));
    assert_eq!(timeline.newest_id(), Some(1100 + full));
}

#[tokio::test]
async fn first_poll_fetches_a_single_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .and(query_param_is_missing("max_id"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(page((1..=TIMELINE_PAGE_SIZE as i64).rev())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let timeline = client(&server)
        .get_user_timeline_by_user_id(12, None)
        .await
        .unwrap();
    assert_eq!(timeline.len(), TIMELINE_PAGE_SIZE as usize);
}

#[tokio::test]
async fn catch_up_stops_at_page_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/1.1/statuses/user_timeline.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(page((5001..=5000 + TIMELINE_PAGE_SIZE as i64).rev())),
        )
        .expect(MAX_TIMELINE_PAGES as u64)
        .mount(&server)
        .await;

    let timeline = client(&server)
        .get_user_timeline_by_user_id(12, Some(1))
        .await
        .unwrap();
    assert_eq!(timeline.len(), MAX_TIMELINE_PAGES * TIMELINE_PAGE_SIZE as usize);
}
