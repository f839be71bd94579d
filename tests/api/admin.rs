use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

use crate::helpers::spawn_app;

#[tokio::test]
async fn admin_endpoints_reject_anonymous_requests() {
    let app = spawn_app().await;

    let endpoints = vec![
        app.api_client.get(format!("{}/api/admin/stats", app.address)),
        app.api_client.get(format!("{}/api/admin/emails", app.address)),
        app.api_client
            .delete(format!("{}/api/admin/emails/a@b.com", app.address)),
        app.api_client
            .post(format!("{}/api/admin/send-broadcast", app.address)),
    ];

    for request in endpoints {
        let response = request.send().await.expect("Failed to execute request.");
        assert_eq!(401, response.status().as_u16());
    }
}

#[tokio::test]
async fn admin_endpoints_reject_malformed_tokens() {
    let app = spawn_app().await;

    let response = app.get_stats("letterbox-admin-tooshort").await;
    assert_eq!(401, response.status().as_u16());

    let response = app.get_stats("some-other-prefix-aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa").await;
    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn login_rejects_wrong_credentials() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/api/admin/login", app.address))
        .json(&serde_json::json!({
            "email": app.admin_email,
            "password": "not-the-password",
        }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn login_mints_a_token_that_opens_the_admin_scope() {
    let app = spawn_app().await;

    let token = app.login().await;
    let response = app.get_stats(&token).await;

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn stats_reflect_registrations_and_removals() {
    let app = spawn_app().await;
    let token = app.login().await;

    app.post_subscription("first@example.com").await;
    app.post_subscription("second@example.com").await;

    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();
    assert_eq!(stats["totalEmails"], 2);
    assert_eq!(stats["unverifiedEmails"], 2);

    let response = app.delete_email(&token, "first@example.com").await;
    assert_eq!(200, response.status().as_u16());

    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();
    assert_eq!(stats["totalEmails"], 1);
}

#[tokio::test]
async fn deleting_an_unknown_email_returns_404_and_leaves_stats_alone() {
    let app = spawn_app().await;
    let token = app.login().await;
    app.post_subscription("keeper@example.com").await;

    let response = app.delete_email(&token, "ghost@example.com").await;
    assert_eq!(404, response.status().as_u16());

    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();
    assert_eq!(stats["totalEmails"], 1);
}

#[tokio::test]
async fn listed_emails_are_newest_first() {
    let app = spawn_app().await;
    let token = app.login().await;

    app.post_subscription("first@example.com").await;
    app.post_subscription("second@example.com").await;
    app.post_subscription("third@example.com").await;

    let body: serde_json::Value = app.get_emails(&token).await.json().await.unwrap();
    let emails: Vec<&str> = body["emails"]
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["email"].as_str().unwrap())
        .collect();

    assert_eq!(
        emails,
        vec!["third@example.com", "second@example.com", "first@example.com"]
    );
}

#[tokio::test]
async fn chart_data_dates_are_in_ascending_order() {
    let app = spawn_app().await;
    let token = app.login().await;

    app.post_subscription("first@example.com").await;

    let stats: serde_json::Value = app.get_stats(&token).await.json().await.unwrap();
    let dates: Vec<&str> = stats["chartData"]
        .as_array()
        .unwrap()
        .iter()
        .map(|point| point["date"].as_str().unwrap())
        .collect();

    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}

#[tokio::test]
async fn test_email_defaults_to_the_admin_address() {
    let app = spawn_app().await;
    let token = app.login().await;

    Mock::given(path("/v1/email"))
        .and(method("POST"))
        .and(body_partial_json(serde_json::json!({
            "to": [{ "email": app.admin_email }],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "m-7"})))
        .expect(1)
        .mount(&app.email_server)
        .await;

    let response = app
        .api_client
        .post(format!("{}/api/test-email", app.address))
        .bearer_auth(&token)
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], "m-7");
}

#[tokio::test]
async fn test_email_requires_a_token() {
    let app = spawn_app().await;

    let response = app
        .api_client
        .post(format!("{}/api/test-email", app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(401, response.status().as_u16());
}
