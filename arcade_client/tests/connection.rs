mod support;

use arcade_client::interface_adapters::net::{ConnectionHandle, ConnectionSettings, spawn_connection};
use arcade_client::interface_adapters::protocol::PongCodec;
use arcade_client::use_cases::NetEvent;
use arcade_client::use_cases::pong_session::{PongInbound, PongOutbound};
use std::time::Duration;

fn settings(url: String, idle_timeout: Duration) -> ConnectionSettings {
    ConnectionSettings {
        url,
        idle_timeout,
        outbound_capacity: 16,
        inbound_capacity: 16,
    }
}

fn connect(path: &str) -> ConnectionHandle<PongCodec> {
    let url = format!("{}{path}", support::ensure_server());
    spawn_connection::<PongCodec>(settings(url, Duration::from_secs(5)))
}

async fn next(handle: &mut ConnectionHandle<PongCodec>) -> NetEvent<PongInbound> {
    tokio::time::timeout(Duration::from_secs(5), handle.next_event())
        .await
        .expect("event within timeout")
        .expect("connection task still running")
}

#[tokio::test]
async fn when_server_sends_frames_then_unknown_types_are_skipped() {
    let mut handle = connect("/pong");

    assert_eq!(next(&mut handle).await, NetEvent::Opened);
    match next(&mut handle).await {
        NetEvent::Message(PongInbound::Connected {
            player_number,
            room_id,
            spectator,
            ..
        }) => {
            assert_eq!(player_number, 2);
            assert_eq!(room_id, "r1");
            assert!(!spectator);
        }
        other => panic!("expected connected, got {other:?}"),
    }
    match next(&mut handle).await {
        NetEvent::Message(PongInbound::GameState(snapshot)) => {
            assert_eq!(snapshot.ball_x, Some(100.0));
            assert_eq!(snapshot.game_active, Some(true));
            assert_eq!(snapshot.player2_y, None);
        }
        other => panic!("expected game state, got {other:?}"),
    }
}

#[tokio::test]
async fn when_client_sends_then_server_sees_the_encoded_frame() {
    let mut handle = connect("/echo");
    assert_eq!(next(&mut handle).await, NetEvent::Opened);

    handle.send(PongOutbound::PaddleMove { y: 42.0 });

    assert_eq!(
        next(&mut handle).await,
        NetEvent::Message(PongInbound::Error {
            message: r#"{"type":"paddle_move","y":42.0}"#.to_string()
        })
    );
}

#[tokio::test]
async fn when_server_closes_then_reason_is_reported() {
    let mut handle = connect("/close");
    assert_eq!(next(&mut handle).await, NetEvent::Opened);
    assert_eq!(
        next(&mut handle).await,
        NetEvent::Closed {
            reason: Some("bye".to_string())
        }
    );
}

#[tokio::test]
async fn when_server_goes_silent_then_connection_stalls() {
    let url = format!("{}/silent", support::ensure_server());
    let mut handle = spawn_connection::<PongCodec>(settings(url, Duration::from_millis(300)));

    assert_eq!(next(&mut handle).await, NetEvent::Opened);
    assert_eq!(next(&mut handle).await, NetEvent::Stalled);
}

#[tokio::test]
async fn when_nothing_listens_then_failure_is_reported_once() {
    let url = support::closed_port_url();
    let mut handle = spawn_connection::<PongCodec>(settings(url, Duration::from_secs(5)));

    assert!(matches!(next(&mut handle).await, NetEvent::Failed { .. }));
    let after = tokio::time::timeout(Duration::from_secs(5), handle.next_event())
        .await
        .expect("task finishes");
    assert_eq!(after, None);
}

#[tokio::test]
async fn when_closed_deliberately_then_queued_messages_are_flushed_first() {
    let id = uuid::Uuid::new_v4().to_string();
    let mut handle = connect(&format!("/record/{id}"));
    assert_eq!(next(&mut handle).await, NetEvent::Opened);

    handle.send(PongOutbound::Join {
        name: "Ada".to_string(),
    });
    handle.send(PongOutbound::Disconnect);
    handle.close();

    // No event follows a deliberate close; the task just ends.
    let after = tokio::time::timeout(Duration::from_secs(5), handle.next_event())
        .await
        .expect("task finishes");
    assert_eq!(after, None);

    let mut frames = Vec::new();
    for _ in 0..50 {
        frames = support::recorded(&id);
        if frames.len() == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(
        frames,
        vec![
            r#"{"type":"join","name":"Ada"}"#.to_string(),
            r#"{"type":"disconnect"}"#.to_string(),
        ]
    );
}

#[tokio::test]
async fn when_pong_loop_connects_then_server_state_is_adopted() {
    use arcade_client::domain::pong::Side;
    use arcade_client::domain::tuning::pong::PongTuning;
    use arcade_client::use_cases::{
        ClientLoop, ConnectionState, LoopCommand, LoopSettings, PongSession,
    };
    use std::time::Instant;

    let session = PongSession::new(
        "Ada".to_string(),
        PongTuning::default(),
        Duration::from_millis(2000),
    );
    let mut client = ClientLoop::new(session, LoopSettings::default());
    assert_eq!(client.start(), vec![LoopCommand::Connect]);
    let mut handle = connect("/pong");

    for _ in 0..3 {
        let event = next(&mut handle).await;
        for command in client.on_net_event(event, Instant::now()) {
            if let LoopCommand::Send(message) = command {
                handle.send(message);
            }
        }
    }

    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(client.session().side(), Side::Right);
    assert_eq!(client.session().room_id(), Some("r1"));
    assert_eq!(client.session().state().ball_x, 100.0);
    assert!(client.session().state().game_active);
}
