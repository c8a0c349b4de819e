use crate::fixtures::{test_app::TestApp, ws_client::WsClient};
use bson::oid::ObjectId;
use intervue_db::models::UserRole;
use serde_json::Value;
use tokio_tungstenite::tungstenite::{client::IntoClientRequest, http::header};

#[tokio::test]
async fn ws_without_token_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app.client.get(app.url("/ws")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "No token provided");

    assert!(
        tokio_tungstenite::connect_async(format!("ws://{}/ws", app.addr))
            .await
            .is_err()
    );
}

#[tokio::test]
async fn ws_with_garbage_token_is_rejected() {
    let app = TestApp::spawn().await;

    let resp = app
        .client
        .get(app.url("/ws?token=not-a-jwt"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Invalid token");
}

#[tokio::test]
async fn ws_with_expired_token_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Ivy", UserRole::Interviewer);
    let expired = app
        .state
        .auth
        .generate_token_with_ttl(user.id, &user.name, -60)
        .unwrap();

    let resp = app.client.get(app.url(&format!("/ws?token={expired}"))).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "Token expired");
}

#[tokio::test]
async fn ws_for_unknown_user_is_rejected() {
    let app = TestApp::spawn().await;
    let ghost = app
        .state
        .auth
        .generate_access_token(ObjectId::new(), "Ghost")
        .unwrap();

    let resp = app.client.get(app.url(&format!("/ws?token={ghost}"))).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 401);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["message"], "User not found");
}

#[tokio::test]
async fn ws_connect_greets_with_identity() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Cal", UserRole::Candidate);

    let client = WsClient::connect(&app, &user.access_token).await;
    assert_eq!(client.connected["userId"], user.id.to_hex());
    assert_eq!(client.connected["userName"], "Cal");
    assert_eq!(client.connected["userRole"], "candidate");

    let registry = app.state.hub.registry();
    assert_eq!(registry.connection_count(), 1);
    assert_eq!(registry.room_count(), 0);
}

#[tokio::test]
async fn ws_accepts_bearer_header_and_cookie() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Ivy", UserRole::Interviewer);
    let url = format!("ws://{}/ws", app.addr);

    let mut request = url.clone().into_client_request().unwrap();
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", user.access_token).parse().unwrap(),
    );
    let (stream, _) = tokio_test::assert_ok!(tokio_tungstenite::connect_async(request).await);
    let bearer = WsClient::greeted(stream).await;
    assert_eq!(bearer.connected["userName"], "Ivy");

    let mut request = url.into_client_request().unwrap();
    request.headers_mut().insert(
        header::COOKIE,
        format!("access_token={}", user.access_token).parse().unwrap(),
    );
    let (stream, _) = tokio_test::assert_ok!(tokio_tungstenite::connect_async(request).await);
    let cookie = WsClient::greeted(stream).await;
    assert_eq!(cookie.connected["userId"], user.id.to_hex());
}

#[tokio::test]
async fn health_reports_live_counts() {
    let app = TestApp::spawn().await;
    let user = app.seed_user("Ivy", UserRole::Interviewer);
    let interview = app.seed_interview(&user, None);

    let mut client = WsClient::connect(&app, &user.access_token).await;
    client.join(&interview.id.to_hex()).await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["connections"], 1);
    assert_eq!(json["rooms"], 1);
}
