mod common;

use common::{APP_KEY, DAHLIA_HASH, digest, spawn_test_server};
use pretty_assertions::assert_eq;
use reqwest::{Client, Response, StatusCode};
use serde_json::{Value, json};

const JSON: &str = "application/json";

async fn get(url: String, accept: &str) -> Response {
    Client::new()
        .get(url)
        .header("accept", accept)
        .send()
        .await
        .unwrap()
}

fn header<'r>(resp: &'r Response, name: &str) -> &'r str {
    resp.headers().get(name).unwrap().to_str().unwrap()
}

// ── Negotiation ──────────────────────────────────────────────────

#[tokio::test]
async fn json_response_carries_negotiation_headers() {
    let base = spawn_test_server().await;
    let resp = get(format!("{base}/posts/1"), JSON).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), JSON);
    assert_eq!(header(&resp, "vary"), "Accept");
}

#[tokio::test]
async fn wildcard_gets_html() {
    let base = spawn_test_server().await;
    let resp = get(format!("{base}/posts/1"), "*/*").await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(header(&resp, "content-type"), "text/html");
    let body = resp.text().await.unwrap();
    assert!(body.contains("<title>Welcome</title>"));
    assert!(body.contains("First &lt;b&gt;post&lt;/b&gt;"));
}

#[tokio::test]
async fn plist_response() {
    let base = spawn_test_server().await;
    let resp = get(format!("{base}/users/dahlia"), "application/x-plist").await;
    assert_eq!(header(&resp, "content-type"), "application/x-plist");
    let body = resp.text().await.unwrap();
    assert!(body.contains("<key>Login</key>"));
    assert!(!body.contains("<key>Email</key>"));
}

#[tokio::test]
async fn unacceptable_type_is_406_with_empty_body() {
    let base = spawn_test_server().await;
    let resp = get(format!("{base}/posts/1"), "application/xml").await;
    assert_eq!(resp.status(), StatusCode::NOT_ACCEPTABLE);
    assert_eq!(header(&resp, "vary"), "Accept");
    assert!(resp.bytes().await.unwrap().is_empty());
}

// ── Forum ────────────────────────────────────────────────────────

#[tokio::test]
async fn posts_list_sticky_then_newest_without_bodies() {
    let base = spawn_test_server().await;
    let body: Value = get(format!("{base}/posts"), JSON).await.json().await.unwrap();
    let items = body.as_array().unwrap();
    let ids: Vec<i64> = items.iter().map(|p| p["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 3, 1]);
    assert!(items.iter().all(|p| p.get("body").is_none()));
    assert_eq!(items[0]["link"], json!("/posts/2"));
}

#[tokio::test]
async fn posts_list_pages() {
    let base = spawn_test_server().await;
    let body: Value = get(format!("{base}/posts?offset=1&limit=1"), JSON)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], json!("Later"));
}

#[tokio::test]
async fn post_detail_has_thread() {
    let base = spawn_test_server().await;
    let body: Value = get(format!("{base}/posts/1"), JSON).await.json().await.unwrap();
    assert_eq!(body["body"], json!("First <b>post</b>"));
    assert_eq!(body["commentsCount"], json!(2));
    assert_eq!(body["repliesCount"], json!(1));
    assert_eq!(body["modifiedAt"], json!("2010-08-03T09:00:00+00:00"));
    assert_eq!(body["author"]["link"], json!("/users/dahlia"));
    let replies = body["replies"].as_array().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["body"], json!("Nice"));
    assert_eq!(replies[0]["link"], json!("/posts/1/comments/1"));
    assert!(replies[0].get("replies").is_none());
}

#[tokio::test]
async fn comment_detail_references_post() {
    let base = spawn_test_server().await;
    let body: Value = get(format!("{base}/posts/1/comments/1"), JSON)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body["post"]["title"], json!("Welcome"));
    assert!(body["post"].get("body").is_none());
    assert_eq!(body["replies"][0]["body"], json!("Thanks"));
    assert_eq!(body["replies"][0]["link"], json!("/posts/1/comments/2"));
    assert_eq!(body["link"], json!("/posts/1/comments/1"));
}

#[tokio::test]
async fn application_page_withholds_secret_key() {
    let base = spawn_test_server().await;
    let body: Value = get(format!("{base}/apps/{APP_KEY}"), JSON).await.json().await.unwrap();
    assert_eq!(body["key"], json!(APP_KEY));
    assert_eq!(body["title"], json!("Reader"));
    assert_eq!(body["owner"]["link"], json!("/users/dahlia"));
    assert_eq!(body["link"], json!(format!("/apps/{APP_KEY}")));
    assert!(body.get("secretKey").is_none());
}

#[tokio::test]
async fn application_html_page() {
    let base = spawn_test_server().await;
    let resp = get(format!("{base}/apps/{APP_KEY}"), "text/html").await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.unwrap();
    assert!(body.contains("<title>Reader</title>"));
    assert!(!body.contains("s3cr3t"));
}

#[tokio::test]
async fn missing_entities_are_404() {
    let base = spawn_test_server().await;
    for path in ["/posts/99", "/posts/2/comments/1", "/users/ghost", "/apps/nope", "/nowhere"] {
        let resp = get(format!("{base}{path}"), JSON).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{path}");
    }
}

#[tokio::test]
async fn anonymous_profile_hides_email() {
    let base = spawn_test_server().await;
    let body: Value = get(format!("{base}/users/minhee"), JSON).await.json().await.unwrap();
    assert_eq!(body["login"], json!("minhee"));
    assert_eq!(body["url"], json!("https://minhee.example.com/"));
    assert!(body.get("email").is_none());
}

// ── SSO ──────────────────────────────────────────────────────────

#[tokio::test]
async fn sso_accepts_correct_digest() {
    let base = spawn_test_server().await;
    let url = format!("{base}/apps/{APP_KEY}/sso/dahlia?password={}", digest(DAHLIA_HASH));
    let body: Value = get(url, JSON).await.json().await.unwrap();
    assert_eq!(body, json!(true));
}

#[tokio::test]
async fn sso_rejects_wrong_digest() {
    let base = spawn_test_server().await;
    let url = format!("{base}/apps/{APP_KEY}/sso/dahlia?password={}", digest("wrong"));
    let body: Value = get(url, JSON).await.json().await.unwrap();
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn sso_userinfo_includes_email_over_form_post() {
    let base = spawn_test_server().await;
    let password = digest(DAHLIA_HASH);
    let resp = Client::new()
        .post(format!("{base}/apps/{APP_KEY}/sso/dahlia@example.com"))
        .header("accept", JSON)
        .form(&[("password", password.as_str()), ("with", "userinfo")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["login"], json!("dahlia"));
    assert_eq!(body["email"], json!("dahlia@example.com"));
}

#[tokio::test]
async fn sso_unknown_user_is_404_unless_ignored() {
    let base = spawn_test_server().await;
    let url = format!("{base}/apps/{APP_KEY}/sso/ghost?password=00");
    assert_eq!(get(url.clone(), JSON).await.status(), StatusCode::NOT_FOUND);
    let body: Value = get(format!("{url}&error=ignore"), JSON)
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!(false));
}

#[tokio::test]
async fn sso_unknown_application_is_404() {
    let base = spawn_test_server().await;
    let url = format!("{base}/apps/nope/sso/dahlia?password={}", digest(DAHLIA_HASH));
    assert_eq!(get(url, JSON).await.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn sso_without_password_is_400() {
    let base = spawn_test_server().await;
    let resp = get(format!("{base}/apps/{APP_KEY}/sso/dahlia"), JSON).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn sso_html_page() {
    let base = spawn_test_server().await;
    let url = format!("{base}/apps/{APP_KEY}/sso/dahlia?password={}", digest(DAHLIA_HASH));
    let resp = get(url, "text/html").await;
    assert_eq!(header(&resp, "content-type"), "text/html");
    assert!(resp.text().await.unwrap().contains("<p>true</p>"));
}
