use wiremock::matchers::{any, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::spawn_app;

#[tokio::test]
async fn subscribe_returns_200_for_a_valid_email() {
    let app = spawn_app().await;

    let response = app.post_subscription("ursula_le_guin@gmail.com").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["email"], "ursula_le_guin@gmail.com");
}

#[tokio::test]
async fn subscribe_returns_400_for_an_invalid_email() {
    let app = spawn_app().await;

    let test_cases = vec![
        ("", "empty email"),
        ("definitely-not-an-email", "missing the at sign"),
        ("ursula@", "missing the domain"),
    ];

    for (email, description) in test_cases {
        let response = app.post_subscription(email).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn subscribing_twice_is_idempotent() {
    let app = spawn_app().await;

    app.post_subscription("ursula_le_guin@gmail.com").await;
    let response = app.post_subscription("ursula_le_guin@gmail.com").await;

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["exists"], true);

    let token = app.login().await;
    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();
    assert_eq!(stats["totalEmails"], 1);
}

#[tokio::test]
async fn every_valid_subscribe_attempt_counts_as_a_click() {
    let app = spawn_app().await;

    app.post_subscription("ursula_le_guin@gmail.com").await;
    app.post_subscription("ursula_le_guin@gmail.com").await;
    app.post_subscription("definitely-not-an-email").await;

    let token = app.login().await;
    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();

    // Two parseable attempts, one rejected before parsing counts.
    assert_eq!(stats["totalClicks"], 2);
    assert_eq!(stats["totalEmails"], 1);
}

#[tokio::test]
async fn verify_email_returns_404_for_an_unknown_subscriber() {
    let app = spawn_app().await;

    let response = app.post_verify_email("ghost@example.com").await;

    assert_eq!(404, response.status().as_u16());
}

#[tokio::test]
async fn verify_email_sends_a_message_and_marks_the_subscriber() {
    let app = spawn_app().await;
    app.post_subscription("ursula_le_guin@gmail.com").await;

    Mock::given(path("/v1/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m-1"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_verify_email("ursula_le_guin@gmail.com").await;

    assert_eq!(200, response.status().as_u16());

    let token = app.login().await;
    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();
    assert_eq!(stats["verifiedEmails"], 1);
    assert_eq!(stats["unverifiedEmails"], 0);
}

#[tokio::test]
async fn verify_email_does_not_mark_the_subscriber_when_the_provider_fails() {
    let app = spawn_app().await;
    app.post_subscription("ursula_le_guin@gmail.com").await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app.post_verify_email("ursula_le_guin@gmail.com").await;

    assert_eq!(500, response.status().as_u16());

    let token = app.login().await;
    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();
    assert_eq!(stats["verifiedEmails"], 0);
    assert_eq!(stats["unverifiedEmails"], 1);
}

#[tokio::test]
async fn health_check_reports_the_selected_backend_and_provider() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage"], "file");
    assert_eq!(body["provider"], "api");
}
