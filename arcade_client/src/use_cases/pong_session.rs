// Pong session: online paddle sync plus the offline demo against a bot.

use std::time::Duration;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use super::client_loop::{GameSession, SessionAction};
use super::types::Authority;
use crate::domain::input::InputState;
use crate::domain::pong::{self, PongInput, PongState, Side};
use crate::domain::tuning::pong::PongTuning;

pub const DEMO_ROOM: &str = "demo";
pub const BOT_NAME: &str = "AI Player";
const WAITING_NAME: &str = "Waiting...";
const SERVER_ERROR_FALLBACK: Duration = Duration::from_millis(1000);

/// Partial game state from the server. Missing fields keep their local value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PongSnapshot {
    pub ball_x: Option<f32>,
    pub ball_y: Option<f32>,
    pub ball_speed_x: Option<f32>,
    pub ball_speed_y: Option<f32>,
    pub player1_y: Option<f32>,
    pub player2_y: Option<f32>,
    pub player1_score: Option<u32>,
    pub player2_score: Option<u32>,
    pub game_active: Option<bool>,
    pub player1_name: Option<String>,
    pub player2_name: Option<String>,
}

impl PongSnapshot {
    /// Overwrites the fields present in the snapshot. `own_side` is client-owned and skipped.
    pub fn apply(&self, state: &mut PongState, own_side: Option<Side>) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(value) = value {
                *slot = value.clone();
            }
        }

        set(&mut state.ball_x, &self.ball_x);
        set(&mut state.ball_y, &self.ball_y);
        set(&mut state.ball_speed_x, &self.ball_speed_x);
        set(&mut state.ball_speed_y, &self.ball_speed_y);
        if own_side != Some(Side::Left) {
            set(&mut state.player1_y, &self.player1_y);
        }
        if own_side != Some(Side::Right) {
            set(&mut state.player2_y, &self.player2_y);
        }
        set(&mut state.player1_score, &self.player1_score);
        set(&mut state.player2_score, &self.player2_score);
        set(&mut state.game_active, &self.game_active);
        set(&mut state.player1_name, &self.player1_name);
        set(&mut state.player2_name, &self.player2_name);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PongInbound {
    Connected {
        player_number: u8,
        room_id: String,
        players_in_room: u32,
        player_name: Option<String>,
        spectator: bool,
        snapshot: Option<PongSnapshot>,
    },
    GameState(PongSnapshot),
    PlayerDisconnected {
        remaining_player: Option<u8>,
    },
    Error {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum PongOutbound {
    Join { name: String },
    PaddleMove { y: f32 },
    ResetGame,
    Disconnect,
}

pub struct PongSession {
    tuning: PongTuning,
    state: PongState,
    player_name: String,
    side: Side,
    room_id: Option<String>,
    players_in_room: u32,
    spectator: bool,
    demo: bool,
    last_sent_y: Option<f32>,
    fallback_delay: Duration,
    rng: StdRng,
}

impl PongSession {
    pub fn new(player_name: String, tuning: PongTuning, fallback_delay: Duration) -> Self {
        Self::with_rng(player_name, tuning, fallback_delay, StdRng::from_entropy())
    }

    pub fn with_rng(
        player_name: String,
        tuning: PongTuning,
        fallback_delay: Duration,
        rng: StdRng,
    ) -> Self {
        Self {
            state: PongState::new(&tuning),
            tuning,
            player_name,
            side: Side::Left,
            room_id: None,
            players_in_room: 0,
            spectator: false,
            demo: false,
            last_sent_y: None,
            fallback_delay,
            rng,
        }
    }

    pub fn state(&self) -> &PongState {
        &self.state
    }

    pub fn tuning(&self) -> &PongTuning {
        &self.tuning
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn room_id(&self) -> Option<&str> {
        self.room_id.as_deref()
    }

    pub fn is_demo(&self) -> bool {
        self.demo
    }

    /// Winner of a finished match, for the game-over banner.
    pub fn winner_name(&self) -> Option<&str> {
        if self.state.game_active {
            return None;
        }
        self.state
            .winner(&self.tuning)
            .map(|side| self.state.name(side))
    }

    fn steer_own_paddle(&mut self, input: &InputState) -> f32 {
        let y = pong::steer_paddle(self.state.paddle_y(self.side), input, &self.tuning);
        self.state.set_paddle_y(self.side, y);
        y
    }

    fn tick_demo(&mut self, input: &InputState) {
        if (input.start || input.reset) && !self.state.game_active {
            self.state.restart(&self.tuning, &mut self.rng);
        }

        let own = pong::steer_paddle(self.state.paddle_y(self.side), input, &self.tuning);
        let bot = pong::bot_paddle_y(&self.state, self.side.opponent(), &self.tuning);
        let paddles = match self.side {
            Side::Left => PongInput {
                player1_y: Some(own),
                player2_y: Some(bot),
            },
            Side::Right => PongInput {
                player1_y: Some(bot),
                player2_y: Some(own),
            },
        };

        let out = pong::step(&self.state, &paddles, 1.0, &self.tuning, &mut self.rng);
        self.state = out.state;
        if let Some(winner) = self.winner_name() {
            info!(winner, "demo match finished");
        }
    }

    fn tick_online(&mut self, input: &InputState) -> Vec<SessionAction<PongOutbound>> {
        let mut actions = Vec::new();
        if self.spectator {
            return actions;
        }
        if (input.start || input.reset) && !self.state.game_active {
            actions.push(SessionAction::Send(PongOutbound::ResetGame));
        }

        let y = self.steer_own_paddle(input);
        if self.state.game_active && self.last_sent_y != Some(y) {
            self.last_sent_y = Some(y);
            actions.push(SessionAction::Send(PongOutbound::PaddleMove { y }));
        }
        actions
    }
}

impl GameSession for PongSession {
    type Inbound = PongInbound;
    type Outbound = PongOutbound;

    fn name(&self) -> &'static str {
        "pong"
    }

    fn can_reconnect(&self) -> bool {
        !self.player_name.is_empty() && !self.demo
    }

    fn on_open(&mut self) -> Vec<PongOutbound> {
        self.demo = false;
        self.spectator = false;
        self.last_sent_y = None;
        self.state = PongState {
            player1_name: self.player_name.clone(),
            player2_name: WAITING_NAME.to_string(),
            ..PongState::new(&self.tuning)
        };
        vec![PongOutbound::Join {
            name: self.player_name.clone(),
        }]
    }

    fn on_message(&mut self, message: PongInbound) -> Vec<SessionAction<PongOutbound>> {
        match message {
            PongInbound::Connected {
                player_number,
                room_id,
                players_in_room,
                player_name,
                spectator,
                snapshot,
            } => {
                self.side = Side::from_player_number(player_number).unwrap_or(Side::Left);
                self.spectator = spectator;
                self.players_in_room = players_in_room;
                if let Some(snapshot) = snapshot {
                    // First sync adopts the server's paddles too.
                    snapshot.apply(&mut self.state, None);
                }
                if let Some(name) = player_name {
                    self.player_name = name;
                }
                info!(
                    player_number,
                    room_id = %room_id,
                    players_in_room,
                    spectator,
                    "joined pong room"
                );
                self.room_id = Some(room_id);
                if players_in_room >= 2 {
                    vec![SessionAction::Notice("game ready".to_string())]
                } else {
                    vec![SessionAction::Notice(
                        "waiting for opponent...".to_string(),
                    )]
                }
            }
            PongInbound::GameState(snapshot) => {
                let own = (!self.spectator).then_some(self.side);
                snapshot.apply(&mut self.state, own);
                Vec::new()
            }
            PongInbound::PlayerDisconnected { remaining_player } => {
                self.state.game_active = false;
                if remaining_player.is_some() {
                    self.state.player2_name = WAITING_NAME.to_string();
                }
                self.players_in_room = self.players_in_room.saturating_sub(1);
                vec![SessionAction::Notice(
                    "player disconnected - waiting for opponent...".to_string(),
                )]
            }
            PongInbound::Error { message } => {
                warn!(%message, "pong server error");
                vec![
                    SessionAction::Notice("server error - switching to demo".to_string()),
                    SessionAction::FallBack {
                        after: SERVER_ERROR_FALLBACK,
                    },
                ]
            }
        }
    }

    fn on_connection_lost(&mut self, establishing: bool) -> Vec<SessionAction<PongOutbound>> {
        if establishing {
            vec![
                SessionAction::Notice("connection failed - starting demo".to_string()),
                SessionAction::FallBack {
                    after: self.fallback_delay,
                },
            ]
        } else {
            vec![SessionAction::Notice(
                "disconnected - reconnecting...".to_string(),
            )]
        }
    }

    fn enter_local(&mut self) {
        self.demo = true;
        self.spectator = false;
        self.side = Side::Left;
        self.room_id = Some(DEMO_ROOM.to_string());
        self.players_in_room = 1;
        self.state.game_active = true;
        self.state.player1_name = self.player_name.clone();
        self.state.player2_name = BOT_NAME.to_string();
    }

    fn tick(&mut self, input: &InputState, authority: Authority) -> Vec<SessionAction<PongOutbound>> {
        if input.escape {
            return vec![SessionAction::Quit];
        }
        match authority {
            Authority::Remote => self.tick_online(input),
            Authority::Local if self.demo => {
                self.tick_demo(input);
                Vec::new()
            }
            Authority::Local => {
                self.steer_own_paddle(input);
                Vec::new()
            }
        }
    }

    fn farewell(&self) -> Vec<PongOutbound> {
        vec![PongOutbound::Disconnect]
    }

    fn hud(&self) -> String {
        let mut hud = format!(
            "{} {} : {} {}",
            self.state.player1_name,
            self.state.player1_score,
            self.state.player2_score,
            self.state.player2_name
        );
        if let Some(room) = &self.room_id {
            hud.push_str(&format!(
                " | room {room} | player {}",
                self.side.player_number()
            ));
        }
        if self.spectator {
            hud.push_str(" | spectating");
        }
        if let Some(winner) = self.winner_name() {
            hud.push_str(&format!(" | {winner} wins! Enter to play again"));
        }
        hud
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> PongSession {
        PongSession::with_rng(
            "Ada".to_string(),
            PongTuning::default(),
            Duration::from_millis(2000),
            StdRng::seed_from_u64(9),
        )
    }

    fn full_snapshot() -> PongSnapshot {
        PongSnapshot {
            ball_x: Some(120.0),
            ball_y: Some(80.0),
            ball_speed_x: Some(-7.0),
            ball_speed_y: Some(3.0),
            player1_y: Some(10.0),
            player2_y: Some(300.0),
            player1_score: Some(4),
            player2_score: Some(2),
            game_active: Some(true),
            player1_name: Some("Ada".to_string()),
            player2_name: Some("Bob".to_string()),
        }
    }

    fn joined(player_number: u8) -> PongSession {
        let mut session = session();
        session.on_open();
        session.on_message(PongInbound::Connected {
            player_number,
            room_id: "r1".to_string(),
            players_in_room: 2,
            player_name: None,
            spectator: false,
            snapshot: None,
        });
        session
    }

    #[test]
    fn when_same_snapshot_is_applied_twice_then_state_is_unchanged() {
        let mut session = joined(1);
        session.on_message(PongInbound::GameState(full_snapshot()));
        let once = session.state().clone();
        session.on_message(PongInbound::GameState(full_snapshot()));
        assert_eq!(session.state(), &once);
    }

    #[test]
    fn when_snapshot_is_applied_then_own_paddle_is_kept() {
        let mut session = joined(2);
        let own_before = session.state().player2_y;

        session.on_message(PongInbound::GameState(full_snapshot()));

        assert_eq!(session.state().player2_y, own_before);
        assert_eq!(session.state().player1_y, 10.0);
        assert_eq!(session.state().ball_x, 120.0);
        assert_eq!(session.state().player2_name, "Bob");
    }

    #[test]
    fn when_snapshot_is_partial_then_missing_fields_keep_their_values() {
        let mut session = joined(1);
        session.on_message(PongInbound::GameState(full_snapshot()));

        session.on_message(PongInbound::GameState(PongSnapshot {
            ball_x: Some(500.0),
            ..PongSnapshot::default()
        }));

        assert_eq!(session.state().ball_x, 500.0);
        assert_eq!(session.state().ball_y, 80.0);
        assert_eq!(session.state().player1_score, 4);
    }

    #[test]
    fn when_socket_opens_then_join_is_sent_and_opponent_is_waiting() {
        let mut session = session();
        assert_eq!(
            session.on_open(),
            vec![PongOutbound::Join {
                name: "Ada".to_string()
            }]
        );
        assert_eq!(session.state().player1_name, "Ada");
        assert_eq!(session.state().player2_name, "Waiting...");
        assert!(!session.state().game_active);
    }

    #[test]
    fn when_paddle_moves_online_then_one_update_is_sent_per_change() {
        let mut session = joined(1);
        session.on_message(PongInbound::GameState(PongSnapshot {
            game_active: Some(true),
            ..PongSnapshot::default()
        }));
        let down = InputState {
            down: true,
            ..InputState::default()
        };

        let first = session.tick(&down, Authority::Remote);
        let idle = session.tick(&InputState::default(), Authority::Remote);

        assert_eq!(
            first,
            vec![SessionAction::Send(PongOutbound::PaddleMove { y: 213.0 })]
        );
        assert!(idle.is_empty());
    }

    #[test]
    fn when_demo_starts_then_bot_opponent_plays_room_demo() {
        let mut session = session();
        session.enter_local();

        assert!(session.is_demo());
        assert_eq!(session.room_id(), Some(DEMO_ROOM));
        assert_eq!(session.state().player2_name, BOT_NAME);
        assert!(session.state().game_active);

        let ball_before = session.state().ball_x;
        session.tick(&InputState::default(), Authority::Local);
        assert_ne!(session.state().ball_x, ball_before);
    }

    #[test]
    fn when_opponent_leaves_then_match_pauses_and_slot_waits() {
        let mut session = joined(1);
        session.on_message(PongInbound::GameState(full_snapshot()));

        session.on_message(PongInbound::PlayerDisconnected {
            remaining_player: Some(1),
        });

        assert!(!session.state().game_active);
        assert_eq!(session.state().player2_name, "Waiting...");
    }

    #[test]
    fn when_server_reports_error_then_demo_follows_after_one_second() {
        let mut session = joined(1);
        let actions = session.on_message(PongInbound::Error {
            message: "room full".to_string(),
        });
        assert!(actions.contains(&SessionAction::FallBack {
            after: Duration::from_millis(1000)
        }));
    }

    #[test]
    fn when_reconnect_attempt_fails_then_demo_takes_over() {
        use crate::use_cases::{ClientLoop, ConnectionState, LoopCommand, LoopSettings, NetEvent};
        use std::time::Instant;

        let now = Instant::now();
        let mut client = ClientLoop::new(session(), LoopSettings::default());
        client.start();
        client.on_net_event(NetEvent::Opened, now);
        client.on_net_event(NetEvent::Closed { reason: None }, now);

        let retry_at = now + Duration::from_millis(3000);
        let idle = InputState::default();
        assert!(client.on_tick(&idle, retry_at).contains(&LoopCommand::Connect));
        client.on_net_event(NetEvent::Failed { reason: "refused".into() }, retry_at);
        client.on_tick(&idle, retry_at + Duration::from_millis(2000));

        assert_eq!(client.state(), ConnectionState::DemoFallback);
        assert!(client.session().is_demo());
        assert_eq!(client.session().room_id(), Some(DEMO_ROOM));
        assert_eq!(client.pending_reconnect(), None);
    }

    #[test]
    fn when_escape_is_pressed_then_session_quits() {
        let mut session = session();
        let escape = InputState {
            escape: true,
            ..InputState::default()
        };
        assert_eq!(
            session.tick(&escape, Authority::Local),
            vec![SessionAction::Quit]
        );
    }
}
