//! Session runtime.
//!
//! Bridges the single-threaded game with the async side: the action timer
//! and the server channel run on a tokio runtime owned by the session, and
//! everything they produce comes back as [`LoopEvent`]s that the caller
//! drains with [`Session::pump`] on the game's own thread.

use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use tokio::runtime::Runtime;
use tokio::sync::{mpsc, oneshot};

use crate::channel::{run_channel, ChannelConfig, MIN_PREFETCH};
use crate::core::{Game, GameConfig, Placement, PieceQueue, QueuedPieceSource, RandomPieceSource};
use crate::protocol::{ChatMessage, Command, PlayerScore, ServerMessage};
use crate::timer::{TimerGate, TokioActionTimer};
use crate::types::GameAction;

/// How long to wait for the server to accept the connection
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long to wait for the first two pieces before giving up on a match
pub const PREFETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Message delivered to the session loop
#[derive(Debug, Clone)]
pub enum LoopEvent {
    Server(ServerMessage),
    TimerExpired { generation: u64 },
    ChannelClosed,
}

/// Network half of a multiplayer session
struct NetLink {
    queue: PieceQueue,
    out_tx: mpsc::UnboundedSender<Command>,
    scores: Vec<PlayerScore>,
    chat: Vec<ChatMessage>,
    connected: bool,
}

impl NetLink {
    fn send(&self, cmd: Command) {
        let _ = self.out_tx.send(cmd);
    }
}

/// Running game plus the runtime that feeds it.
pub struct Session {
    // dropped before the runtime so the timer task is aborted first
    game: Game,
    events_rx: mpsc::UnboundedReceiver<LoopEvent>,
    gate: TimerGate,
    net: Option<NetLink>,
    rt: Runtime,
}

impl Session {
    /// Single-player session with a random piece source.
    ///
    /// A seed in `config` makes the piece sequence reproducible.
    pub fn solo(config: GameConfig) -> anyhow::Result<Self> {
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let (events_tx, events_rx) = mpsc::unbounded_channel::<LoopEvent>();

        let timer = TokioActionTimer::new(rt.handle().clone(), events_tx);
        let gate = timer.gate();
        let source = match config.seed {
            Some(seed) => RandomPieceSource::new(seed),
            None => RandomPieceSource::from_entropy(),
        };

        Ok(Self {
            game: Game::with_config(source, timer, config),
            events_rx,
            gate,
            net: None,
            rt,
        })
    }

    /// Multiplayer session: connects, wires the shared piece queue and
    /// score/lives mirroring, and sends the prefetch `PIECE` requests.
    ///
    /// The game is not started; call [`Session::start`].
    pub fn multiplayer(channel: ChannelConfig, config: GameConfig) -> anyhow::Result<Self> {
        let rt = Runtime::new().context("failed to create tokio runtime")?;
        let (events_tx, events_rx) = mpsc::unbounded_channel::<LoopEvent>();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<Command>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let prefetch = channel.prefetch.max(MIN_PREFETCH);
        let channel_tx = events_tx.clone();
        rt.spawn(async move {
            if let Err(e) = run_channel(channel, channel_tx, out_rx, Some(ready_tx)).await {
                eprintln!("[Channel] {:#}", e);
            }
        });

        let addr = match rt.block_on(tokio::time::timeout(CONNECT_TIMEOUT, ready_rx)) {
            Ok(Ok(addr)) => addr,
            Ok(Err(_)) => bail!("could not connect to the game server"),
            Err(_) => bail!("timed out connecting to the game server"),
        };
        println!("[Session] Joined match on {}", addr);

        let timer = TokioActionTimer::new(rt.handle().clone(), events_tx);
        let gate = timer.gate();

        // every draw asks the server for one more piece
        let queue = PieceQueue::new();
        let request_tx = out_tx.clone();
        let source = QueuedPieceSource::new(queue.clone(), move || {
            let _ = request_tx.send(Command::Piece);
        });

        let mut game = Game::with_config(source, timer, config);

        let score_tx = out_tx.clone();
        game.on_score_change(move |score| {
            let _ = score_tx.send(Command::Score(score));
            let _ = score_tx.send(Command::Scores);
        });
        let lives_tx = out_tx.clone();
        game.on_lives_change(move |lives| {
            let _ = lives_tx.send(Command::Lives(lives));
        });

        let net = NetLink {
            queue,
            out_tx,
            scores: Vec::new(),
            chat: Vec::new(),
            connected: true,
        };
        for _ in 0..prefetch {
            net.send(Command::Piece);
        }

        Ok(Self {
            game,
            events_rx,
            gate,
            net: Some(net),
            rt,
        })
    }

    /// Start the game. Multiplayer waits until the queue holds the first
    /// two pieces.
    pub fn start(&mut self) -> anyhow::Result<()> {
        if self.net.is_some() {
            self.wait_for_pieces(MIN_PREFETCH, PREFETCH_TIMEOUT)?;
        }
        self.game.start().context("failed to start game")?;
        println!("[Session] Game started");
        Ok(())
    }

    /// Block until the shared queue holds `count` pieces
    pub fn wait_for_pieces(&mut self, count: usize, timeout: Duration) -> anyhow::Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            self.pump()?;
            let Some(net) = self.net.as_ref() else {
                return Ok(());
            };
            if net.queue.len() >= count {
                return Ok(());
            }
            if !net.connected {
                bail!("server closed the connection before the match started");
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                bail!("timed out waiting for pieces ({} of {})", net.queue.len(), count);
            }
            let next = self
                .rt
                .block_on(tokio::time::timeout(remaining, self.events_rx.recv()));
            match next {
                Ok(Some(event)) => self.handle_event(event)?,
                Ok(None) => bail!("session event channel closed"),
                Err(_) => {}
            }
        }
    }

    /// Handle every event that has arrived. Returns how many were handled.
    pub fn pump(&mut self) -> anyhow::Result<usize> {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event)?;
            handled += 1;
        }
        Ok(handled)
    }

    /// Block for up to `timeout` until at least one event arrives, then
    /// handle everything pending. Returns how many were handled.
    pub fn pump_blocking(&mut self, timeout: Duration) -> anyhow::Result<usize> {
        let next = self
            .rt
            .block_on(tokio::time::timeout(timeout, self.events_rx.recv()));
        let mut handled = 0;
        if let Ok(Some(event)) = next {
            self.handle_event(event)?;
            handled += 1;
        }
        Ok(handled + self.pump()?)
    }

    fn handle_event(&mut self, event: LoopEvent) -> anyhow::Result<()> {
        match event {
            LoopEvent::TimerExpired { generation } => {
                if !self.gate.is_current(generation) {
                    println!("[Session] Dropping stale timer expiry {}", generation);
                    return Ok(());
                }
                self.game.on_action_timer_expiry()?;
                if self.game.is_game_over() {
                    println!("[Session] Game over with score {}", self.game.score());
                }
            }
            LoopEvent::Server(msg) => self.handle_server_message(msg),
            LoopEvent::ChannelClosed => {
                if let Some(net) = self.net.as_mut() {
                    net.connected = false;
                }
                println!("[Session] Server connection closed");
            }
        }
        Ok(())
    }

    fn handle_server_message(&mut self, msg: ServerMessage) {
        let Some(net) = self.net.as_mut() else {
            return;
        };
        match msg {
            ServerMessage::Piece(index) => {
                if let Err(e) = net.queue.add_piece(index) {
                    eprintln!("[Session] Dropping piece: {}", e);
                }
            }
            ServerMessage::Scores(scores) => net.scores = scores,
            ServerMessage::Msg(chat) => net.chat.push(chat),
            ServerMessage::Die(name) => {
                println!("[Session] {} left the match", name);
                net.send(Command::Scores);
            }
            ServerMessage::Error(text) => eprintln!("[Session] Server error: {}", text),
            ServerMessage::Unknown { .. } => {}
        }
    }

    /// Place the current piece centered at (x, y). A successful
    /// placement mirrors the board to the server.
    pub fn attempt_placement(&mut self, x: i8, y: i8) -> anyhow::Result<Placement> {
        let placement = self.game.attempt_placement(x, y)?;
        if placement.is_placed() {
            if let Some(net) = self.net.as_ref() {
                net.send(Command::Board(self.game.board().grid()));
            }
        }
        Ok(placement)
    }

    pub fn apply_action(&mut self, action: GameAction) -> anyhow::Result<()> {
        match action {
            GameAction::Place => {
                let aim = self.game.aim();
                self.attempt_placement(aim.x as i8, aim.y as i8)?;
            }
            GameAction::Leave => self.leave(),
            other => self.game.apply_action(other)?,
        }
        Ok(())
    }

    /// Stop the game and tell the server we left
    pub fn leave(&mut self) {
        self.game.stop();
        if let Some(net) = self.net.as_ref() {
            net.send(Command::Die);
        }
        println!("[Session] Left game with score {}", self.game.score());
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// For registering listeners and observers
    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn is_multiplayer(&self) -> bool {
        self.net.is_some()
    }

    pub fn is_connected(&self) -> bool {
        self.net.as_ref().is_some_and(|net| net.connected)
    }

    /// Pieces delivered but not yet drawn
    pub fn queued_pieces(&self) -> usize {
        self.net.as_ref().map_or(0, |net| net.queue.len())
    }

    /// Latest scoreboard from the server
    pub fn scores(&self) -> &[PlayerScore] {
        self.net
            .as_ref()
            .map(|net| net.scores.as_slice())
            .unwrap_or(&[])
    }

    pub fn chat(&self) -> &[ChatMessage] {
        self.net
            .as_ref()
            .map(|net| net.chat.as_slice())
            .unwrap_or(&[])
    }

    /// Send an arbitrary command to the server. No-op in solo sessions.
    pub fn send(&self, cmd: Command) {
        if let Some(net) = self.net.as_ref() {
            net.send(cmd);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::GamePhase;

    fn seeded(seed: u32) -> GameConfig {
        GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        }
    }

    #[test]
    fn solo_session_plays_without_network() {
        let mut session = Session::solo(seeded(99)).unwrap();
        assert!(!session.is_multiplayer());
        assert!(!session.is_connected());
        assert!(session.scores().is_empty());

        session.start().unwrap();
        assert!(session.game().is_running());
        assert!(session.game().current_piece().is_some());

        let placement = session.attempt_placement(2, 2).unwrap();
        assert!(placement.is_placed());
        assert_eq!(session.pump().unwrap(), 0);

        session.apply_action(GameAction::Leave).unwrap();
        assert_eq!(session.game().phase(), GamePhase::Stopped);
    }

    #[test]
    fn stale_timer_expiry_is_dropped() {
        let mut session = Session::solo(seeded(5)).unwrap();
        session.start().unwrap();

        session
            .handle_event(LoopEvent::TimerExpired { generation: u64::MAX })
            .unwrap();
        assert_eq!(session.game().lives(), 3);
    }

    #[test]
    fn multiplayer_fails_without_server() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let config = ChannelConfig {
            port,
            ..ChannelConfig::default()
        };
        assert!(Session::multiplayer(config, GameConfig::default()).is_err());
    }
}
