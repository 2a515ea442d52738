// Generic real-time client loop.
//
// Owns the connection state machine, the reconnect schedule and the demo deadline, and
// hands ticks and inbound messages to a per-game session. It never touches sockets: every
// side effect is returned as a `LoopCommand` for the runtime to execute.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use super::reconnect::{ReconnectPolicy, ReconnectSchedule};
use super::types::{Authority, ConnectionState, NetEvent};
use crate::domain::input::InputState;

/// Requests a session makes of the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionAction<O> {
    Send(O),
    Connect,
    Disconnect,
    /// Switch to the local simulation after `after`.
    FallBack { after: Duration },
    /// Switch to the local simulation now.
    GoLocal,
    Notice(String),
    Quit,
}

/// Side effects for the runtime.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopCommand<O> {
    Send(O),
    Connect,
    Disconnect,
    Quit,
}

pub trait GameSession {
    type Inbound: std::fmt::Debug;
    type Outbound: std::fmt::Debug;

    fn name(&self) -> &'static str;

    /// Whether the session dials the server as soon as the loop starts.
    fn connect_on_start(&self) -> bool {
        true
    }

    /// Retries only happen while the session still has a player identity.
    fn can_reconnect(&self) -> bool;

    /// Messages sent right after the socket opens (join).
    fn on_open(&mut self) -> Vec<Self::Outbound>;

    fn on_message(&mut self, message: Self::Inbound) -> Vec<SessionAction<Self::Outbound>>;

    /// `establishing` is true when the socket never opened.
    fn on_connection_lost(&mut self, establishing: bool) -> Vec<SessionAction<Self::Outbound>>;

    /// Starts the local simulation (demo, practice or single player).
    fn enter_local(&mut self);

    /// One fixed step. Under `Authority::Local` the session simulates; under `Remote` it
    /// only predicts client-owned fields and reports input.
    fn tick(&mut self, input: &InputState, authority: Authority) -> Vec<SessionAction<Self::Outbound>>;

    /// Messages sent before a deliberate disconnect.
    fn farewell(&self) -> Vec<Self::Outbound> {
        Vec::new()
    }

    /// HUD text for the status line.
    fn hud(&self) -> String;
}

#[derive(Debug, Clone, Copy)]
pub struct LoopSettings {
    pub reconnect: ReconnectPolicy,
    pub offline: bool,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            offline: false,
        }
    }
}

pub struct ClientLoop<S: GameSession> {
    session: S,
    state: ConnectionState,
    reconnect: ReconnectSchedule,
    demo_deadline: Option<Instant>,
    settings: LoopSettings,
    notice: Option<String>,
    // Set once the reconnect policy ran out; Enter dials again.
    gave_up: bool,
    running: bool,
}

impl<S: GameSession> ClientLoop<S> {
    pub fn new(session: S, settings: LoopSettings) -> Self {
        Self {
            session,
            state: ConnectionState::Disconnected,
            reconnect: ReconnectSchedule::new(settings.reconnect),
            demo_deadline: None,
            settings,
            notice: None,
            gave_up: false,
            running: true,
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending_reconnect(&self) -> Option<Instant> {
        self.reconnect.pending()
    }

    pub fn pending_demo(&self) -> Option<Instant> {
        self.demo_deadline
    }

    pub fn start(&mut self) -> Vec<LoopCommand<S::Outbound>> {
        info!(
            game = self.session.name(),
            offline = self.settings.offline,
            "client loop started"
        );
        let mut out = Vec::new();
        if self.settings.offline {
            self.enter_local(&mut out);
        } else if self.session.connect_on_start() {
            self.connect(&mut out);
        }
        out
    }

    pub fn on_net_event(
        &mut self,
        event: NetEvent<S::Inbound>,
        now: Instant,
    ) -> Vec<LoopCommand<S::Outbound>> {
        let mut out = Vec::new();
        match event {
            NetEvent::Opened => {
                if self.state != ConnectionState::Connecting {
                    debug!(state = %self.state, "ignoring late socket open");
                    return out;
                }
                info!(game = self.session.name(), "connected");
                self.state = ConnectionState::Connected;
                self.reconnect.reset();
                self.demo_deadline = None;
                self.notice = None;
                for message in self.session.on_open() {
                    out.push(LoopCommand::Send(message));
                }
            }
            NetEvent::Message(message) => {
                if self.state.authority() != Authority::Remote {
                    // Snapshots only apply while the server owns the state.
                    debug!(state = %self.state, ?message, "dropping message under local authority");
                    return out;
                }
                let actions = self.session.on_message(message);
                self.apply(actions, now, &mut out);
            }
            NetEvent::Failed { reason } => {
                if self.state != ConnectionState::Connecting {
                    return out;
                }
                self.state = ConnectionState::Disconnected;
                let retrying = self.reconnect.attempts() > 0;
                if retrying {
                    warn!(%reason, attempt = self.reconnect.attempts(), "reconnect attempt failed");
                } else {
                    warn!(%reason, "connection failed");
                }
                self.notice = Some(format!("connection failed: {reason}"));
                // Failed retries take the same fallback as a failed first dial.
                let actions = self.session.on_connection_lost(true);
                self.apply(actions, now, &mut out);
                if retrying
                    && self.state == ConnectionState::Disconnected
                    && self.demo_deadline.is_none()
                    && self.session.can_reconnect()
                {
                    self.schedule_reconnect(now);
                }
            }
            NetEvent::Closed { .. } | NetEvent::Stalled => {
                if self.state != ConnectionState::Connected {
                    return out;
                }
                match &event {
                    NetEvent::Stalled => warn!("connection stalled"),
                    _ => warn!("connection closed"),
                }
                self.state = ConnectionState::Disconnected;
                let actions = self.session.on_connection_lost(false);
                self.apply(actions, now, &mut out);
                if self.state == ConnectionState::Disconnected && self.session.can_reconnect() {
                    self.schedule_reconnect(now);
                }
            }
        }
        out
    }

    pub fn on_tick(&mut self, input: &InputState, now: Instant) -> Vec<LoopCommand<S::Outbound>> {
        let mut out = Vec::new();
        if self.reconnect.take_due(now) {
            if self.session.can_reconnect() {
                info!(attempt = self.reconnect.attempts(), "reconnecting");
                self.connect(&mut out);
            } else {
                debug!("reconnect skipped, no player identity");
            }
        }
        if self.demo_deadline.is_some_and(|deadline| deadline <= now) {
            self.demo_deadline = None;
            self.enter_local(&mut out);
        }
        if self.gave_up && input.start && self.state == ConnectionState::Disconnected {
            info!(game = self.session.name(), "retrying after user request");
            self.reconnect.reset();
            self.connect(&mut out);
        }

        let actions = self.session.tick(input, self.state.authority());
        self.apply(actions, now, &mut out);
        out
    }

    /// Stops every pending timer and closes the connection.
    pub fn shutdown(&mut self) -> Vec<LoopCommand<S::Outbound>> {
        let mut out = Vec::new();
        self.reconnect.cancel();
        self.demo_deadline = None;
        if self.state == ConnectionState::Connected {
            for message in self.session.farewell() {
                out.push(LoopCommand::Send(message));
            }
        }
        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Connecting
        ) {
            out.push(LoopCommand::Disconnect);
        }
        self.state = ConnectionState::Disconnected;
        self.running = false;
        info!(game = self.session.name(), "client loop stopped");
        out
    }

    pub fn status_line(&self) -> String {
        let mut line = format!("[{}] {}", self.state, self.session.hud());
        if let Some(notice) = &self.notice {
            line.push_str(" | ");
            line.push_str(notice);
        }
        line
    }

    fn apply(
        &mut self,
        actions: Vec<SessionAction<S::Outbound>>,
        now: Instant,
        out: &mut Vec<LoopCommand<S::Outbound>>,
    ) {
        for action in actions {
            match action {
                SessionAction::Send(message) => {
                    if self.state == ConnectionState::Connected {
                        out.push(LoopCommand::Send(message));
                    } else {
                        debug!(?message, "socket not open, dropping message");
                    }
                }
                SessionAction::Connect => {
                    // A user-requested dial starts a fresh retry budget.
                    if self.state == ConnectionState::Disconnected {
                        self.reconnect.reset();
                    }
                    self.connect(out);
                }
                SessionAction::Disconnect => self.disconnect(out),
                SessionAction::FallBack { after } => {
                    // Replaces any earlier fallback deadline.
                    self.demo_deadline = Some(now + after);
                }
                SessionAction::GoLocal => self.enter_local(out),
                SessionAction::Notice(text) => self.notice = Some(text),
                SessionAction::Quit => {
                    out.extend(self.shutdown());
                    out.push(LoopCommand::Quit);
                    return;
                }
            }
        }
    }

    fn connect(&mut self, out: &mut Vec<LoopCommand<S::Outbound>>) {
        if matches!(
            self.state,
            ConnectionState::Connecting | ConnectionState::Connected
        ) {
            return;
        }
        self.reconnect.cancel();
        self.demo_deadline = None;
        self.gave_up = false;
        self.state = ConnectionState::Connecting;
        self.notice = None;
        out.push(LoopCommand::Connect);
    }

    fn disconnect(&mut self, out: &mut Vec<LoopCommand<S::Outbound>>) {
        self.reconnect.cancel();
        self.demo_deadline = None;
        if self.state == ConnectionState::Connected {
            for message in self.session.farewell() {
                out.push(LoopCommand::Send(message));
            }
        }
        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Connecting
        ) {
            out.push(LoopCommand::Disconnect);
        }
        self.state = ConnectionState::Disconnected;
    }

    fn enter_local(&mut self, out: &mut Vec<LoopCommand<S::Outbound>>) {
        if matches!(
            self.state,
            ConnectionState::Connected | ConnectionState::Connecting
        ) {
            out.push(LoopCommand::Disconnect);
        }
        self.reconnect.cancel();
        self.demo_deadline = None;
        self.gave_up = false;
        self.state = ConnectionState::DemoFallback;
        info!(game = self.session.name(), "local simulation started");
        self.session.enter_local();
    }

    fn schedule_reconnect(&mut self, now: Instant) {
        match self.reconnect.schedule(now) {
            Some(delay) => {
                let attempt = self.reconnect.attempts();
                info!(delay_ms = delay.as_millis() as u64, attempt, "reconnect scheduled");
                self.notice = Some(match self.reconnect.policy().max_attempts() {
                    Some(max) => format!(
                        "reconnecting in {:.1}s ({attempt}/{max})",
                        delay.as_secs_f32()
                    ),
                    None => format!("reconnecting in {:.1}s", delay.as_secs_f32()),
                });
            }
            None => {
                warn!(attempts = self.reconnect.attempts(), "giving up on reconnecting");
                self.gave_up = true;
                self.notice = Some("server unreachable, press Enter to retry".to_string());
            }
        }
    }
}

/// Runs one frame's work, turning a panic into a logged error so the loop keeps going.
pub fn fault_boundary<T>(stage: &str, work: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(work)) {
        Ok(value) => Some(value),
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(stage, %reason, "frame failed; continuing");
            None
        }
    }
}
