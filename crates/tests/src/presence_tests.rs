use crate::fixtures::{test_app::TestApp, ws_client::WsClient};
use intervue_db::models::UserRole;
use serde_json::json;
use std::time::Duration;

const QUIET: Duration = Duration::from_millis(300);

#[tokio::test]
async fn joiner_is_confirmed_before_peers_hear_of_it() {
    let app = TestApp::spawn().await;
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let cal = app.seed_user("Cal", UserRole::Candidate);
    let interview = app.seed_interview(&ivy, Some(&cal));

    let mut interviewer = WsClient::connect(&app, &ivy.access_token).await;
    interviewer.join(&interview.id.to_hex()).await;
    // Alone in the room: nobody to announce to.
    interviewer.expect_silence(QUIET).await;

    let mut candidate = WsClient::connect(&app, &cal.access_token).await;
    candidate.join(&interview.id.to_hex()).await;

    let joined = interviewer.recv_event("user-joined").await;
    assert_eq!(joined["userId"], cal.id.to_hex());
    assert_eq!(joined["userName"], "Cal");
    assert_eq!(joined["userRole"], "candidate");

    // The joiner never hears about itself.
    candidate.expect_silence(QUIET).await;
}

#[tokio::test]
async fn disconnect_announces_departure_once() {
    let app = TestApp::spawn().await;
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let cal = app.seed_user("Cal", UserRole::Candidate);
    let interview = app.seed_interview(&ivy, Some(&cal));

    let mut interviewer = WsClient::connect(&app, &ivy.access_token).await;
    let mut candidate = WsClient::connect(&app, &cal.access_token).await;
    interviewer.join(&interview.id.to_hex()).await;
    candidate.join(&interview.id.to_hex()).await;
    interviewer.recv_event("user-joined").await;

    candidate.close().await;

    let left = interviewer.recv_event("user-left").await;
    assert_eq!(left["userId"], cal.id.to_hex());
    assert_eq!(left["userName"], "Cal");
    interviewer.expect_silence(QUIET).await;

    let registry = app.state.hub.registry();
    assert_eq!(registry.members_of(&interview.id, None).len(), 1);
    assert_eq!(registry.connection_count(), 1);
}

#[tokio::test]
async fn last_disconnect_closes_the_room() {
    let app = TestApp::spawn().await;
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let interview = app.seed_interview(&ivy, None);

    let mut interviewer = WsClient::connect(&app, &ivy.access_token).await;
    interviewer.join(&interview.id.to_hex()).await;
    assert_eq!(app.state.hub.registry().room_count(), 1);

    interviewer.close().await;
    app.eventually("room to close", |state| {
        let registry = state.hub.registry();
        registry.room_count() == 0 && registry.connection_count() == 0
    })
    .await;
}

#[tokio::test]
async fn explicit_leave_keeps_the_socket_open() {
    let app = TestApp::spawn().await;
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let cal = app.seed_user("Cal", UserRole::Candidate);
    let interview = app.seed_interview(&ivy, Some(&cal));

    let mut interviewer = WsClient::connect(&app, &ivy.access_token).await;
    let mut candidate = WsClient::connect(&app, &cal.access_token).await;
    interviewer.join(&interview.id.to_hex()).await;
    candidate.join(&interview.id.to_hex()).await;
    interviewer.recv_event("user-joined").await;

    candidate.send_raw(r#"{"event":"leave-interview"}"#).await;
    let left = interviewer.recv_event("user-left").await;
    assert_eq!(left["userId"], cal.id.to_hex());

    // Still connected and able to come back.
    candidate.send_raw(r#"{"event":"ping"}"#).await;
    assert_eq!(candidate.recv().await["event"], "pong");
    candidate.join(&interview.id.to_hex()).await;
    interviewer.recv_event("user-joined").await;
}

#[tokio::test]
async fn same_user_on_two_sockets_is_two_members() {
    let app = TestApp::spawn().await;
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let interview = app.seed_interview(&ivy, None);

    let mut laptop = WsClient::connect(&app, &ivy.access_token).await;
    let mut phone = WsClient::connect(&app, &ivy.access_token).await;
    laptop.join(&interview.id.to_hex()).await;
    phone.join(&interview.id.to_hex()).await;
    laptop.recv_event("user-joined").await;

    phone.close().await;
    laptop.recv_event("user-left").await;
    assert_eq!(app.state.hub.registry().members_of(&interview.id, None).len(), 1);
}

#[tokio::test]
async fn departure_is_not_held_behind_a_slow_store_call() {
    let app = TestApp::spawn_with_settings(|s| s.signaling.store_timeout_ms = 5_000).await;
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let cal = app.seed_user("Cal", UserRole::Candidate);
    let interview = app.seed_interview(&ivy, Some(&cal));

    let mut interviewer = WsClient::connect(&app, &ivy.access_token).await;
    let mut candidate = WsClient::connect(&app, &cal.access_token).await;
    interviewer.join(&interview.id.to_hex()).await;
    candidate.join(&interview.id.to_hex()).await;
    interviewer.recv_event("user-joined").await;

    // Each of the two writes behind an alert stalls this long.
    app.store.set_write_delay(Duration::from_millis(1_500));
    candidate
        .send(
            "proctoring-event",
            json!({ "type": "window-minimize", "details": "minimized" }),
        )
        .await;
    // Let the event reach the store before the socket goes.
    tokio::time::sleep(Duration::from_millis(100)).await;
    candidate.close().await;

    let left = tokio::time::timeout(Duration::from_millis(1_000), interviewer.recv())
        .await
        .expect("departure waited on the store write");
    assert_eq!(left["event"], "user-left");
    assert_eq!(left["data"]["userId"], cal.id.to_hex());

    // The write that was in flight still lands and is reported.
    interviewer.recv_event("proctoring-alert").await;
    assert_eq!(app.store.logs_for(&interview.id).len(), 1);
}
