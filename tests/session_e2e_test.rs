//! Session against a scripted line server on localhost

use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tetrecs::adapter::{ChannelConfig, PlayerLives, Session};
use tetrecs::core::GameConfig;
use tetrecs::types::{GameAction, PieceKind};

type Received = Arc<Mutex<Vec<String>>>;

/// Answers `PIECE` from a repeating sequence, `SCORES` with a fixed board,
/// and stops reading after `DIE`.
fn spawn_server(pieces: Vec<u32>, greeting: &'static str) -> (u16, Received, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let received: Received = Arc::default();
    let log = Arc::clone(&received);

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        writer.write_all(greeting.as_bytes()).unwrap();

        let mut served = 0;
        for line in BufReader::new(stream).lines() {
            let Ok(line) = line else { break };
            log.lock().unwrap().push(line.clone());
            match line.as_str() {
                "PIECE" if !pieces.is_empty() => {
                    let piece = pieces[served % pieces.len()];
                    served += 1;
                    writeln!(writer, "PIECE {}", piece).unwrap();
                }
                "SCORES" => writeln!(writer, "SCORES me:0:2|rival:120:DEAD").unwrap(),
                "DIE" => break,
                _ => {}
            }
        }
    });

    (port, received, handle)
}

fn config(port: u16) -> ChannelConfig {
    ChannelConfig {
        port,
        ..ChannelConfig::default()
    }
}

fn pump_until(session: &mut Session, mut done: impl FnMut(&Session) -> bool) {
    let deadline = Instant::now() + Duration::from_secs(3);
    while !done(session) {
        assert!(Instant::now() < deadline, "timed out waiting on session");
        session.pump_blocking(Duration::from_millis(20)).unwrap();
    }
}

fn wait_for_line(received: &Received, wanted: &str) {
    let deadline = Instant::now() + Duration::from_secs(3);
    while !received.lock().unwrap().iter().any(|l| l == wanted) {
        assert!(Instant::now() < deadline, "server never got {:?}", wanted);
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn session_plays_a_multiplayer_match() {
    let (port, received, server) = spawn_server(vec![3, 0, 2, 9], "MSG rival:good luck\nDIE rival\n");

    let mut session = Session::multiplayer(config(port), GameConfig::default()).unwrap();
    assert!(session.is_multiplayer());
    session.start().unwrap();
    assert!(session.is_connected());

    let game = session.game();
    assert_eq!(game.current_piece().unwrap().kind(), PieceKind::Dot);
    assert_eq!(game.following_piece().unwrap().kind(), PieceKind::Line);

    // DIE from another player triggers a scoreboard request
    pump_until(&mut session, |s| {
        !s.scores().is_empty() && !s.chat().is_empty() && s.queued_pieces() >= 2
    });
    assert_eq!(session.chat()[0].from, "rival");
    assert_eq!(session.chat()[0].text, "good luck");
    assert_eq!(session.scores()[1].lives, PlayerLives::Dead);

    assert!(session.attempt_placement(2, 2).unwrap().is_placed());
    wait_for_line(
        &received,
        "BOARD 0 0 0 0 0 0 0 0 0 0 0 0 4 0 0 0 0 0 0 0 0 0 0 0 0",
    );

    session.game_mut().on_action_timer_expiry().unwrap();
    wait_for_line(&received, "LIVES 2");

    session.apply_action(GameAction::Leave).unwrap();
    server.join().unwrap();

    let lines = received.lock().unwrap().clone();
    assert_eq!(&lines[..3], &["PIECE", "PIECE", "PIECE"]);
    assert_eq!(lines.last().map(String::as_str), Some("DIE"));
    // three prefetched, two drawn at start, one per placement and expiry
    assert_eq!(lines.iter().filter(|l| *l == "PIECE").count(), 3 + 2 + 1 + 1);
}

#[test]
fn start_fails_when_server_closes_early() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let server = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        drop(stream);
    });

    let mut session = Session::multiplayer(config(port), GameConfig::default()).unwrap();
    server.join().unwrap();
    assert!(session.start().is_err());
    assert!(!session.game().is_running());
}

#[test]
fn waiting_for_pieces_is_bounded() {
    let (port, received, _server) = spawn_server(Vec::new(), "");

    let mut session = Session::multiplayer(config(port), GameConfig::default()).unwrap();
    let started = Instant::now();
    assert!(session
        .wait_for_pieces(2, Duration::from_millis(200))
        .is_err());
    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(session.queued_pieces(), 0);

    wait_for_line(&received, "PIECE");
}
