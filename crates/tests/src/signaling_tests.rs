use crate::fixtures::{test_app::TestApp, ws_client::WsClient};
use intervue_db::models::UserRole;
use serde_json::json;
use std::time::Duration;

const QUIET: Duration = Duration::from_millis(300);

/// Interviewer and candidate both joined; join chatter already drained.
async fn paired_room(app: &TestApp) -> (WsClient, WsClient, String, String) {
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let cal = app.seed_user("Cal", UserRole::Candidate);
    let interview = app.seed_interview(&ivy, Some(&cal));

    let mut interviewer = WsClient::connect(app, &ivy.access_token).await;
    let mut candidate = WsClient::connect(app, &cal.access_token).await;
    interviewer.join(&interview.id.to_hex()).await;
    candidate.join(&interview.id.to_hex()).await;
    interviewer.recv_event("user-joined").await;

    (interviewer, candidate, ivy.id.to_hex(), cal.id.to_hex())
}

#[tokio::test]
async fn offer_and_answer_reach_the_peer_with_sender_id() {
    let app = TestApp::spawn().await;
    let (mut interviewer, mut candidate, ivy_id, cal_id) = paired_room(&app).await;

    interviewer
        .send(
            "webrtc-signal",
            json!({ "type": "offer", "data": { "type": "offer", "sdp": "v=0\r\no=- 1 2 IN IP4 127.0.0.1" } }),
        )
        .await;
    let offer = candidate.recv_event("webrtc-signal").await;
    assert_eq!(offer["type"], "offer");
    assert_eq!(offer["data"]["sdp"], "v=0\r\no=- 1 2 IN IP4 127.0.0.1");
    assert_eq!(offer["fromUserId"], ivy_id);

    candidate
        .send("webrtc-signal", json!({ "type": "answer", "data": { "sdp": "v=0" } }))
        .await;
    let answer = interviewer.recv_event("webrtc-signal").await;
    assert_eq!(answer["type"], "answer");
    assert_eq!(answer["fromUserId"], cal_id);

    // Neither side hears its own signal back.
    interviewer.expect_silence(QUIET).await;
    candidate.expect_silence(QUIET).await;
}

#[tokio::test]
async fn candidates_arrive_in_send_order() {
    let app = TestApp::spawn().await;
    let (mut interviewer, mut candidate, _, _) = paired_room(&app).await;

    for seq in 0..20 {
        interviewer
            .send(
                "webrtc-signal",
                json!({ "type": "ice-candidate", "data": { "candidate": format!("candidate:{seq}"), "sdpMLineIndex": 0 } }),
            )
            .await;
    }
    for seq in 0..20 {
        let signal = candidate.recv_event("webrtc-signal").await;
        assert_eq!(signal["data"]["candidate"], format!("candidate:{seq}"));
    }
}

#[tokio::test]
async fn spoofed_sender_is_overwritten() {
    let app = TestApp::spawn().await;
    let (mut interviewer, mut candidate, ivy_id, _) = paired_room(&app).await;

    interviewer
        .send(
            "webrtc-signal",
            json!({ "type": "offer", "data": {}, "fromUserId": "someone-else" }),
        )
        .await;
    let signal = candidate.recv_event("webrtc-signal").await;
    assert_eq!(signal["fromUserId"], ivy_id);
}

#[tokio::test]
async fn signal_outside_a_room_is_an_error() {
    let app = TestApp::spawn().await;
    let ivy = app.seed_user("Ivy", UserRole::Interviewer);
    let mut client = WsClient::connect(&app, &ivy.access_token).await;

    client
        .send("webrtc-signal", json!({ "type": "offer", "data": { "sdp": "v=0" } }))
        .await;
    let data = client.recv_event("error").await;
    assert_eq!(data["message"], "Not in an interview room");
}

#[tokio::test]
async fn signals_stay_inside_their_room() {
    let app = TestApp::spawn().await;
    let (mut interviewer, _candidate, _, _) = paired_room(&app).await;

    let other_ivy = app.seed_user("Ola", UserRole::Interviewer);
    let other = app.seed_interview(&other_ivy, None);
    let mut outsider = WsClient::connect(&app, &other_ivy.access_token).await;
    outsider.join(&other.id.to_hex()).await;

    interviewer
        .send("webrtc-signal", json!({ "type": "offer", "data": { "sdp": "v=0" } }))
        .await;
    outsider.expect_silence(QUIET).await;
}

#[tokio::test]
async fn malformed_frames_get_an_error_and_keep_the_socket() {
    let app = TestApp::spawn().await;
    let (mut interviewer, mut candidate, _, _) = paired_room(&app).await;

    interviewer.send_raw("{not json").await;
    let data = interviewer.recv_event("error").await;
    assert_eq!(data["message"], "Malformed message");

    interviewer
        .send("webrtc-signal", json!({ "type": "renegotiate", "data": {} }))
        .await;
    let data = interviewer.recv_event("error").await;
    assert_eq!(data["message"], "Malformed message");

    // Still usable afterwards.
    interviewer
        .send("webrtc-signal", json!({ "type": "offer", "data": { "sdp": "v=0" } }))
        .await;
    candidate.recv_event("webrtc-signal").await;
}

#[tokio::test]
async fn ping_is_answered_to_sender_only() {
    let app = TestApp::spawn().await;
    let (mut interviewer, mut candidate, _, _) = paired_room(&app).await;

    interviewer.send_raw(r#"{"event":"ping"}"#).await;
    let msg = interviewer.recv().await;
    assert_eq!(msg["event"], "pong");
    candidate.expect_silence(QUIET).await;
}
