//! Feed Pagination Tests
//!
//! Covers keyset paging, cursor handling, and per-viewer like fields.

mod common;

use axum::http::StatusCode;
use common::app;
use serde_json::json;
use time::{Duration, OffsetDateTime};

#[tokio::test]
async fn health_reports_ok() {
    let app = app().await;
    let resp = app.get("/health", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["status"].as_str().unwrap(), "ok");
}

#[tokio::test]
async fn following_feed_default_limit_is_ten() {
    let app = app().await;
    let author = app.create_user("feed_deflimit_author").await;
    let viewer = app.create_user("feed_deflimit_viewer").await;

    let base = OffsetDateTime::now_utc() - Duration::hours(6);
    for i in 0..12 {
        app.create_tweet_at(
            author.id,
            &format!("tweet {}", i),
            base + Duration::seconds(i),
        )
        .await;
    }

    app.post_json(
        &format!("/profiles/{}/follow", author.id),
        json!({}),
        Some(&viewer.session_token),
    )
    .await;

    let resp = app
        .get("/feed?scope=following", Some(&viewer.session_token))
        .await;

    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["items"].as_array().unwrap().len(), 10);
    assert!(body["next_cursor"].is_string());
}

#[tokio::test]
async fn page_size_one_walks_newest_to_oldest() {
    let app = app().await;
    let author = app.create_user("feed_walk_author").await;
    let viewer = app.create_user("feed_walk_viewer").await;

    let base = OffsetDateTime::now_utc() - Duration::hours(6);
    let t1 = app.create_tweet_at(author.id, "first", base).await;
    let t2 = app
        .create_tweet_at(author.id, "second", base + Duration::seconds(1))
        .await;
    let t3 = app
        .create_tweet_at(author.id, "third", base + Duration::seconds(2))
        .await;

    app.post_json(
        &format!("/profiles/{}/follow", author.id),
        json!({}),
        Some(&viewer.session_token),
    )
    .await;

    // Page 1: newest tweet, with a cursor pointing past it.
    let resp = app
        .get("/feed?scope=following&limit=1", Some(&viewer.session_token))
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    assert_eq!(body["items"][0]["id"].as_str().unwrap(), t3.to_string());
    let cursor = body["next_cursor"].as_str().unwrap().to_string();

    // Page 2.
    let resp = app
        .get(
            &format!("/feed?scope=following&limit=1&cursor={}", cursor),
            Some(&viewer.session_token),
        )
        .await;
    let body = resp.json();
    assert_eq!(body["items"][0]["id"].as_str().unwrap(), t2.to_string());
    let cursor = body["next_cursor"].as_str().unwrap().to_string();

    // Page 3: last row, end of feed.
    let resp = app
        .get(
            &format!("/feed?scope=following&limit=1&cursor={}", cursor),
            Some(&viewer.session_token),
        )
        .await;
    let body = resp.json();
    assert_eq!(body["items"][0]["id"].as_str().unwrap(), t1.to_string());
    assert!(body["next_cursor"].is_null());
}

#[tokio::test]
async fn equal_timestamps_never_skip_or_repeat() {
    let app = app().await;
    let author = app.create_user("feed_ties_author").await;
    let viewer = app.create_user("feed_ties_viewer").await;

    let ts = OffsetDateTime::now_utc() - Duration::hours(6);
    let mut seeded = std::collections::HashSet::new();
    for i in 0..3 {
        seeded.insert(
            app.create_tweet_at(author.id, &format!("tie {}", i), ts)
                .await
                .to_string(),
        );
    }

    app.post_json(
        &format!("/profiles/{}/follow", author.id),
        json!({}),
        Some(&viewer.session_token),
    )
    .await;

    let mut seen = Vec::new();
    let mut cursor: Option<String> = None;
    loop {
        let path = match &cursor {
            Some(cursor) => format!("/feed?scope=following&limit=1&cursor={}", cursor),
            None => "/feed?scope=following&limit=1".to_string(),
        };
        let resp = app.get(&path, Some(&viewer.session_token)).await;
        assert_eq!(resp.status, StatusCode::OK);
        let body = resp.json();
        for item in body["items"].as_array().unwrap() {
            seen.push(item["id"].as_str().unwrap().to_string());
        }
        match body["next_cursor"].as_str() {
            Some(next) => cursor = Some(next.to_string()),
            None => break,
        }
    }

    assert_eq!(seen.len(), 3, "ties must not skip or repeat rows");
    assert_eq!(seen.iter().cloned().collect::<std::collections::HashSet<_>>(), seeded);
}

#[tokio::test]
async fn recent_feed_is_public_and_contains_new_tweets() {
    let app = app().await;
    let author = app.create_user("feed_recent_author").await;
    let tweet_id = app.create_tweet(author.id, "hello world").await;

    let resp = app.get("/feed?limit=100", None).await;
    assert_eq!(resp.status, StatusCode::OK);
    let body = resp.json();
    let found = body["items"]
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["id"].as_str() == Some(&tweet_id.to_string()));
    assert!(found, "new tweet should appear in the recent feed");
}

#[tokio::test]
async fn feed_reports_viewer_like_state() {
    let app = app().await;
    let author = app.create_user("feed_likes_author").await;
    let viewer = app.create_user("feed_likes_viewer").await;
    let tweet_id = app.create_tweet(author.id, "like me").await;

    let resp = app
        .post_json(
            &format!("/tweets/{}/like", tweet_id),
            json!({}),
            Some(&viewer.session_token),
        )
        .await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.json()["added_like"].as_bool().unwrap(), true);

    // The viewer sees their own like reflected.
    let resp = app
        .get(
            &format!("/profiles/{}/tweets", author.id),
            Some(&viewer.session_token),
        )
        .await;
    let body = resp.json();
    let item = &body["items"][0];
    assert_eq!(item["id"].as_str().unwrap(), tweet_id.to_string());
    assert_eq!(item["like_count"].as_i64().unwrap(), 1);
    assert_eq!(item["liked_by_me"].as_bool().unwrap(), true);

    // Anonymous viewers see the count but never a like state.
    let resp = app
        .get(&format!("/profiles/{}/tweets", author.id), None)
        .await;
    let item = &resp.json()["items"][0];
    assert_eq!(item["like_count"].as_i64().unwrap(), 1);
    assert_eq!(item["liked_by_me"].as_bool().unwrap(), false);
}

#[tokio::test]
async fn following_feed_requires_session() {
    let app = app().await;
    let resp = app.get("/feed?scope=following", None).await;
    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn following_feed_excludes_unfollowed_authors() {
    let app = app().await;
    let followed = app.create_user("feed_excl_followed").await;
    let stranger = app.create_user("feed_excl_stranger").await;
    let viewer = app.create_user("feed_excl_viewer").await;

    let followed_tweet = app.create_tweet(followed.id, "from followed").await;
    app.create_tweet(stranger.id, "from stranger").await;

    app.post_json(
        &format!("/profiles/{}/follow", followed.id),
        json!({}),
        Some(&viewer.session_token),
    )
    .await;

    let resp = app
        .get("/feed?scope=following&limit=100", Some(&viewer.session_token))
        .await;
    let body = resp.json();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"].as_str().unwrap(), followed_tweet.to_string());
}

#[tokio::test]
async fn malformed_cursor_rejected() {
    let app = app().await;
    let resp = app.get("/feed?cursor=not-a-cursor", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "invalid cursor");
}

#[tokio::test]
async fn limit_out_of_bounds_rejected() {
    let app = app().await;
    let resp = app.get("/feed?limit=0", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = app.get("/feed?limit=101", None).await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
}
