// Terminal input sampler: folds crossterm key and mouse events into one InputState per tick.
//
// Terminals without key-release reporting get auto-expiring presses; the OS key repeat keeps
// a held key alive. Once a release event is seen, presses are held until released.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::domain::input::InputState;

const DEFAULT_KEY_HOLD: Duration = Duration::from_millis(150);
const DOUBLE_TAP: Duration = Duration::from_millis(300);
const TAP_FIRE: Duration = Duration::from_millis(100);
// Drag distance in world units before a tank drag picks a direction.
const DRAG_THRESHOLD: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Action {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Start,
    Escape,
    Multiplayer,
    Revive,
}

impl Action {
    fn held(self) -> bool {
        matches!(
            self,
            Action::Up | Action::Down | Action::Left | Action::Right | Action::Fire
        )
    }
}

fn map_key(key: &KeyEvent) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        // Raw mode swallows SIGINT.
        return matches!(key.code, KeyCode::Char('c')).then_some(Action::Escape);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('w') | KeyCode::Char('W') => Some(Action::Up),
        KeyCode::Down | KeyCode::Char('s') | KeyCode::Char('S') => Some(Action::Down),
        KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') => Some(Action::Left),
        KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') => Some(Action::Right),
        KeyCode::Char(' ') => Some(Action::Fire),
        KeyCode::Enter => Some(Action::Start),
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => Some(Action::Escape),
        KeyCode::Char('m') | KeyCode::Char('M') => Some(Action::Multiplayer),
        KeyCode::Char('r') | KeyCode::Char('R') => Some(Action::Revive),
        _ => None,
    }
}

/// How pointer drags turn into input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    /// Dominant axis of a long enough drag holds one direction.
    Directional,
    /// Vertical movement feeds `drag_dy` directly.
    Vertical,
}

#[derive(Debug, Clone, Copy)]
struct Drag {
    start: (f32, f32),
    last_y: f32,
    current: (f32, f32),
}

#[derive(Debug)]
pub struct InputSampler {
    mode: DragMode,
    key_hold: Duration,
    release_events: bool,
    // Held actions and the instant their auto-expiry runs out.
    held: HashMap<Action, Option<Instant>>,
    // One-shot actions latched until the next sample.
    pulses: Vec<Action>,
    drag: Option<Drag>,
    drag_dy: f32,
    last_tap: Option<Instant>,
    tap_fire_until: Option<Instant>,
    // World units per terminal cell.
    scale: (f32, f32),
}

impl InputSampler {
    pub fn new(mode: DragMode) -> Self {
        Self {
            mode,
            key_hold: DEFAULT_KEY_HOLD,
            release_events: false,
            held: HashMap::new(),
            pulses: Vec::new(),
            drag: None,
            drag_dy: 0.0,
            last_tap: None,
            tap_fire_until: None,
            scale: (1.0, 1.0),
        }
    }

    pub fn set_scale(&mut self, world_per_column: f32, world_per_row: f32) {
        self.scale = (world_per_column, world_per_row);
    }

    pub fn handle(&mut self, event: &Event, now: Instant) {
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(mouse) => self.handle_mouse(mouse, now),
            Event::FocusLost => self.held.clear(),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: &KeyEvent, now: Instant) {
        let Some(action) = map_key(key) else {
            return;
        };
        match key.kind {
            KeyEventKind::Release => {
                self.release_events = true;
                self.held.remove(&action);
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if action.held() {
                    let expiry = (!self.release_events).then(|| now + self.key_hold);
                    self.held.insert(action, expiry);
                } else if key.kind == KeyEventKind::Press && !self.pulses.contains(&action) {
                    self.pulses.push(action);
                }
            }
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, now: Instant) {
        let point = (
            mouse.column as f32 * self.scale.0,
            mouse.row as f32 * self.scale.1,
        );
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self
                    .last_tap
                    .is_some_and(|last| now.duration_since(last) < DOUBLE_TAP)
                {
                    self.tap_fire_until = Some(now + TAP_FIRE);
                }
                self.last_tap = Some(now);
                self.drag = Some(Drag {
                    start: point,
                    last_y: point.1,
                    current: point,
                });
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(drag) = &mut self.drag {
                    self.drag_dy += point.1 - drag.last_y;
                    drag.last_y = point.1;
                    drag.current = point;
                }
            }
            MouseEventKind::Up(MouseButton::Left) => self.drag = None,
            _ => {}
        }
    }

    /// Input for this tick. One-shot actions and drag deltas are consumed.
    pub fn sample(&mut self, now: Instant) -> InputState {
        self.held
            .retain(|_, expiry| expiry.is_none_or(|deadline| deadline > now));

        let is_held = |action: Action| self.held.contains_key(&action);
        let mut input = InputState {
            up: is_held(Action::Up),
            down: is_held(Action::Down),
            left: is_held(Action::Left),
            right: is_held(Action::Right),
            fire: is_held(Action::Fire),
            ..InputState::default()
        };

        if self.tap_fire_until.is_some_and(|until| until > now) {
            input.fire = true;
        } else {
            self.tap_fire_until = None;
        }

        for action in self.pulses.drain(..) {
            match action {
                Action::Start => input.start = true,
                Action::Escape => input.escape = true,
                Action::Multiplayer => input.multiplayer = true,
                Action::Revive => {
                    input.revive = true;
                    input.reset = true;
                }
                Action::Up | Action::Down | Action::Left | Action::Right | Action::Fire => {}
            }
        }

        match self.mode {
            DragMode::Vertical => input.drag_dy = self.drag_dy,
            DragMode::Directional => {
                if let Some(drag) = self.drag {
                    apply_direction(&mut input, drag);
                }
            }
        }
        self.drag_dy = 0.0;
        input
    }
}

fn apply_direction(input: &mut InputState, drag: Drag) {
    let dx = drag.current.0 - drag.start.0;
    let dy = drag.current.1 - drag.start.1;
    if dx.abs() > dy.abs() {
        if dx.abs() > DRAG_THRESHOLD {
            input.right = dx > 0.0;
            input.left = dx < 0.0;
        }
    } else if dy.abs() > DRAG_THRESHOLD {
        input.down = dy > 0.0;
        input.up = dy < 0.0;
    }
}
