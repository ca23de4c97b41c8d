//! Session-level scenarios from spec.md §8, driven directly against
//! `SessionHandle` with an in-process mock transport (no real socket);
//! the teacher's own `room_flow.rs` drove a full two-client session this
//! way, just over its own (lightyear) transport instead of this repo's.

use std::sync::Arc;

use backend::app_service::mock::MockAppService;
use backend::app_service::{Challenge, ChallengeUser};
use backend::protocol::ServerMessage;
use backend::session::{PlayerId, SessionHandle};
use chess_engine::{Color, Square};
use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

fn challenge() -> Challenge {
    Challenge {
        from_user: ChallengeUser { username: "alice".to_string(), elo: 1500.0 },
        to_user: ChallengeUser { username: "bob".to_string(), elo: 1400.0 },
    }
}

async fn new_session() -> (SessionHandle, Uuid) {
    let (session, game_id, _mock) = new_session_with_mock().await;
    (session, game_id)
}

async fn new_session_with_mock() -> (SessionHandle, Uuid, Arc<MockAppService>) {
    let game_id = Uuid::new_v4();
    let mock = Arc::new(MockAppService::with_challenge(game_id, challenge()));
    let session = SessionHandle::spawn(game_id, mock.clone());
    (session, game_id, mock)
}

async fn bind(
    session: &SessionHandle,
    username: &str,
) -> (PlayerId, Color, UnboundedReceiver<ServerMessage>) {
    let id = PlayerId(Uuid::new_v4());
    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let color = session.bind_player(id, username.to_string(), tx).await.unwrap();
    (id, color, rx)
}

fn mv(sq: &str) -> Square {
    Square::from_notation(sq).unwrap()
}

async fn drain_until_game_ended(rx: &mut UnboundedReceiver<ServerMessage>) -> (Option<String>, String) {
    loop {
        match rx.recv().await.expect("session channel should not close before game_ended") {
            ServerMessage::GameEnded { winner_username, description } => return (winner_username, description),
            _ => continue,
        }
    }
}

#[tokio::test]
async fn scholars_mate_ends_with_white_as_winner() {
    let (session, _) = new_session().await;
    let (white_id, white_color, mut white_rx) = bind(&session, "alice").await;
    let (black_id, black_color, mut black_rx) = bind(&session, "bob").await;
    assert_eq!(white_color, Color::White);
    assert_eq!(black_color, Color::Black);

    let moves = [
        (white_id, "e2", "e4"),
        (black_id, "e7", "e5"),
        (white_id, "d1", "h5"),
        (black_id, "b8", "c6"),
        (white_id, "f1", "c4"),
        (black_id, "g8", "f6"),
        (white_id, "h5", "f7"),
    ];
    for (mover, from, to) in moves {
        session.submit_move(mover, mv(from), mv(to));
    }

    let (winner, _) = drain_until_game_ended(&mut white_rx).await;
    assert_eq!(winner, Some("alice".to_string()));
    let (winner, _) = drain_until_game_ended(&mut black_rx).await;
    assert_eq!(winner, Some("alice".to_string()));
}

#[tokio::test]
async fn threefold_repetition_by_knight_shuffle_ends_in_a_draw() {
    let (session, _) = new_session().await;
    let (white_id, _, mut white_rx) = bind(&session, "alice").await;
    let (black_id, _, mut black_rx) = bind(&session, "bob").await;

    let moves = [
        (white_id, "b1", "a3"),
        (black_id, "b8", "a6"),
        (white_id, "a3", "b1"),
        (black_id, "a6", "b8"),
        (white_id, "b1", "a3"),
        (black_id, "b8", "a6"),
        (white_id, "a3", "b1"),
        (black_id, "a6", "b8"),
    ];
    for (mover, from, to) in moves {
        session.submit_move(mover, mv(from), mv(to));
    }

    let (winner, description) = drain_until_game_ended(&mut white_rx).await;
    assert_eq!(winner, None);
    assert!(description.contains("repetition"));
    let (winner, _) = drain_until_game_ended(&mut black_rx).await;
    assert_eq!(winner, None);
}

#[tokio::test]
async fn resignation_mid_game_ends_the_session_immediately() {
    let (session, _) = new_session().await;
    let (white_id, _, _white_rx) = bind(&session, "alice").await;
    let (_black_id, _, mut black_rx) = bind(&session, "bob").await;

    session.submit_move(white_id, mv("e2"), mv("e4"));
    session.resign(white_id);

    let (winner, _) = drain_until_game_ended(&mut black_rx).await;
    assert_eq!(winner, Some("bob".to_string()));
}

#[tokio::test]
async fn draw_offer_can_be_accepted_to_end_the_game() {
    let (session, _) = new_session().await;
    let (white_id, _, mut white_rx) = bind(&session, "alice").await;
    let (black_id, _, mut black_rx) = bind(&session, "bob").await;

    session.offer_draw(white_id);
    session.respond_draw(black_id, true);

    let (winner, description) = drain_until_game_ended(&mut white_rx).await;
    assert_eq!(winner, None);
    assert!(description.contains("agreement"));
    let (winner, _) = drain_until_game_ended(&mut black_rx).await;
    assert_eq!(winner, None);
}

#[tokio::test]
async fn declined_draw_offer_does_not_end_the_game() {
    let (session, _) = new_session().await;
    let (white_id, _, mut white_rx) = bind(&session, "alice").await;
    let (black_id, _, _black_rx) = bind(&session, "bob").await;

    session.offer_draw(white_id);
    session.respond_draw(black_id, false);

    let mut saw_decline = false;
    for _ in 0..10 {
        match white_rx.recv().await {
            Some(ServerMessage::DrawDeclined) => {
                saw_decline = true;
                break;
            }
            Some(_) => continue,
            None => break,
        }
    }
    assert!(saw_decline);

    // The game is still live: a legal move from White still gets confirmed.
    session.submit_move(white_id, mv("e2"), mv("e4"));
    let mut saw_confirmation = false;
    for _ in 0..10 {
        match white_rx.recv().await {
            Some(ServerMessage::MoveConfirmed) => {
                saw_confirmation = true;
                break;
            }
            Some(_) => continue,
            None => break,
        }
    }
    assert!(saw_confirmation);
}

#[tokio::test]
async fn disconnect_mid_game_counts_as_resignation() {
    let (session, _) = new_session().await;
    let (white_id, _, white_rx) = bind(&session, "alice").await;
    let (_black_id, _, mut black_rx) = bind(&session, "bob").await;

    drop(white_rx);
    session.disconnect(white_id);

    let (winner, _) = drain_until_game_ended(&mut black_rx).await;
    assert_eq!(winner, Some("bob".to_string()));
}

#[tokio::test]
async fn lone_player_disconnecting_before_a_second_joins_is_aborted() {
    let (session, _game_id, mock) = new_session_with_mock().await;
    let (white_id, _, white_rx) = bind(&session, "alice").await;

    // No second player ever bound: there is no opponent to resign in favor
    // of, so this must not be reported as anyone's win, and spec.md §5
    // requires skipping external notification entirely for an abort.
    drop(white_rx);
    session.disconnect(white_id);

    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    assert!(mock.posted_results.lock().unwrap().is_empty());
}
