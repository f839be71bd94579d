use wiremock::matchers::{any, body_partial_json, body_string_contains, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::{TestApp, spawn_app};

async fn accept_all_sends(app: &TestApp) {
    Mock::given(path("/v1/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m-1"})))
        .mount(&app.email_server)
        .await;
}

fn campaign_body(subject: &str, message: &str) -> serde_json::Value {
    serde_json::json!({ "subject": subject, "message": message })
}

#[tokio::test]
async fn broadcast_reaches_every_subscriber() {
    let app = spawn_app().await;
    let token = app.login().await;

    app.post_subscription("first@example.com").await;
    app.post_subscription("second@example.com").await;
    app.post_subscription("third@example.com").await;
    accept_all_sends(&app).await;

    let response = app
        .post_broadcast(&token, campaign_body("Big news", "We shipped."))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 3);
    assert_eq!(body["failed"], 0);
    assert_eq!(3, app.email_server.received_requests().await.unwrap().len());
}

#[tokio::test]
async fn one_failing_recipient_does_not_stop_the_broadcast() {
    let app = spawn_app().await;
    let token = app.login().await;

    app.post_subscription("first@example.com").await;
    app.post_subscription("fail@example.com").await;
    app.post_subscription("third@example.com").await;

    // Mount order matters: the failure mock must win over the catch-all.
    Mock::given(body_string_contains("fail@example.com"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m-1"})))
        .expect(2)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_broadcast(&token, campaign_body("Big news", "We shipped."))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(body["failed"], 1);
    assert_eq!(
        body["failedEmails"],
        serde_json::json!(["fail@example.com"])
    );
}

#[tokio::test]
async fn broadcast_without_subscribers_is_rejected() {
    let app = spawn_app().await;
    let token = app.login().await;

    let response = app
        .post_broadcast(&token, campaign_body("Big news", "We shipped."))
        .await;

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn broadcast_with_an_empty_subject_is_rejected() {
    let app = spawn_app().await;
    let token = app.login().await;
    app.post_subscription("first@example.com").await;

    let response = app
        .post_broadcast(&token, campaign_body("   ", "We shipped."))
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(0, app.email_server.received_requests().await.unwrap().len());
}

#[tokio::test]
async fn broadcast_images_are_forwarded_as_attachments() {
    let app = spawn_app().await;
    let token = app.login().await;
    app.post_subscription("first@example.com").await;

    Mock::given(path("/v1/email"))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "attachments": [{ "filename": "banner.png", "content": "AQIDBA==" }],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m-1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .post_broadcast(
            &token,
            serde_json::json!({
                "subject": "Big news",
                "message": "We shipped.",
                "images": [{ "filename": "banner.png", "content": "AQIDBA==" }],
            }),
        )
        .await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn broadcast_rejects_images_that_are_not_base64() {
    let app = spawn_app().await;
    let token = app.login().await;
    app.post_subscription("first@example.com").await;

    let response = app
        .post_broadcast(
            &token,
            serde_json::json!({
                "subject": "Big news",
                "message": "We shipped.",
                "images": [{ "filename": "banner.png", "content": "not base64!!!" }],
            }),
        )
        .await;

    assert_eq!(400, response.status().as_u16());
    assert_eq!(0, app.email_server.received_requests().await.unwrap().len());
}

#[tokio::test]
async fn uploaded_images_are_kept_on_disk() {
    let app = spawn_app().await;
    let token = app.login().await;
    app.post_subscription("first@example.com").await;
    accept_all_sends(&app).await;

    let response = app
        .post_broadcast(
            &token,
            serde_json::json!({
                "subject": "Big news",
                "message": "We shipped.",
                "images": [{ "filename": "banner.png", "content": "AQIDBA==" }],
            }),
        )
        .await;
    assert_eq!(200, response.status().as_u16());

    let uploads = std::fs::read_dir(app.uploads_dir())
        .expect("Uploads directory was not created")
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    assert_eq!(1, uploads.len());
    let name = uploads[0].file_name();
    assert!(name.to_string_lossy().ends_with("-banner.png"));
}
