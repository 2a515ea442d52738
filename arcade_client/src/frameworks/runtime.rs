// Framework bootstrap for the terminal client: tracing, the terminal, and the select loop
// that owns a `ClientLoop`.

use crate::domain::ports::{Canvas, RenderError};
use crate::frameworks::config::{self, ClientConfig};
use crate::interface_adapters::input::{DragMode, InputSampler};
use crate::interface_adapters::net::{ConnectionHandle, ConnectionSettings, spawn_connection};
use crate::interface_adapters::protocol::WireCodec;
use crate::interface_adapters::render::{TerminalCanvas, View};
use crate::use_cases::client_loop::fault_boundary;
use crate::use_cases::{ClientLoop, GameSession, LoopCommand, NetEvent};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::{cursor, execute, terminal};
use std::io::{Result, Stdout, Write, stdout};
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing_subscriber::fmt::MakeWriter;

const LOG_THROTTLE: Duration = Duration::from_secs(2);
// Time left for the connection task to flush farewell messages on exit.
const FAREWELL_GRACE: Duration = Duration::from_millis(250);
const KEY_POLL: Duration = Duration::from_millis(100);

/// Loads `.env` and the client config, then installs the tracing subscriber and the panic hook.
pub fn init_runtime() -> Result<ClientConfig> {
    let _ = dotenvy::dotenv();
    let config = ClientConfig::from_env().map_err(std::io::Error::other)?;

    // The terminal draws the game, so logs go to a file when one is configured.
    match &config.log_file {
        Some(path) => install_subscriber(Mutex::new(open_log(path)?)),
        None => install_subscriber(std::io::stderr),
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(config)
}

fn open_log(path: &Path) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}

fn install_subscriber<W>(writer: W)
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(writer)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_ansi(false)
            .with_writer(writer)
            .compact()
            .init();
    }
}

/// Raw mode plus the alternate screen; restored on drop, unwinding included.
struct TerminalGuard {
    enhanced_keys: bool,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        terminal::enable_raw_mode()?;
        let mut out = stdout();
        execute!(
            out,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture
        )?;
        // Key release events where the terminal supports them.
        let enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        if enhanced_keys {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
        }
        Ok(Self { enhanced_keys })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut out = stdout();
        if self.enhanced_keys {
            let _ = execute!(out, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(
            out,
            DisableMouseCapture,
            cursor::Show,
            terminal::LeaveAlternateScreen
        );
        let _ = terminal::disable_raw_mode();
    }
}

// Blocking crossterm reads live on their own thread; events reach the loop over a channel.
fn spawn_key_reader() -> mpsc::Receiver<Event> {
    let (tx, rx) = mpsc::channel(config::KEY_CHANNEL_CAPACITY);
    std::thread::spawn(move || {
        loop {
            match event::poll(KEY_POLL) {
                Ok(true) => match event::read() {
                    Ok(event) => {
                        if tx.blocking_send(event).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "terminal read failed");
                        break;
                    }
                },
                Ok(false) => {
                    if tx.is_closed() {
                        break;
                    }
                }
                Err(err) => {
                    tracing::error!(error = %err, "terminal poll failed");
                    break;
                }
            }
        }
    });
    rx
}

pub fn connection_settings(config: &ClientConfig) -> ConnectionSettings {
    ConnectionSettings {
        url: config.server_url.clone(),
        idle_timeout: config.idle_timeout,
        outbound_capacity: config::OUTBOUND_CHANNEL_CAPACITY,
        inbound_capacity: config::INBOUND_CHANNEL_CAPACITY,
    }
}

async fn next_net_event<C: WireCodec>(
    conn: &mut Option<ConnectionHandle<C>>,
) -> Option<NetEvent<C::Inbound>> {
    match conn {
        Some(handle) => handle.next_event().await,
        None => std::future::pending().await,
    }
}

/// Carries out the loop's commands. Returns false once the loop asked to quit.
fn execute_commands<C: WireCodec>(
    commands: Vec<LoopCommand<C::Outbound>>,
    conn: &mut Option<ConnectionHandle<C>>,
    settings: &ConnectionSettings,
) -> bool {
    let mut keep_running = true;
    for command in commands {
        match command {
            LoopCommand::Send(message) => match conn {
                Some(handle) => handle.send(message),
                None => tracing::debug!(?message, "no connection, dropping message"),
            },
            LoopCommand::Connect => {
                if let Some(old) = conn.take() {
                    old.close();
                }
                tracing::info!(url = %settings.url, "connecting");
                *conn = Some(spawn_connection::<C>(settings.clone()));
            }
            LoopCommand::Disconnect => {
                // The task flushes queued messages before it closes the socket.
                if let Some(handle) = conn.take() {
                    handle.close();
                }
            }
            LoopCommand::Quit => keep_running = false,
        }
    }
    keep_running
}

fn draw_frame<S: GameSession + View>(
    client: &ClientLoop<S>,
    canvas: &mut TerminalCanvas<Stdout>,
) -> std::result::Result<(), RenderError> {
    client.session().draw(canvas)?;
    canvas.status(&client.status_line())?;
    canvas.present()
}

/// Runs one game until the player quits or the process is interrupted.
pub async fn run<S, C>(
    mut client: ClientLoop<S>,
    settings: ConnectionSettings,
    drag: DragMode,
) -> Result<()>
where
    S: GameSession<Inbound = C::Inbound, Outbound = C::Outbound> + View,
    C: WireCodec,
{
    let guard = TerminalGuard::enter()?;
    let (columns, rows) = terminal::size()?;
    let mut canvas = TerminalCanvas::new(stdout(), columns, rows);
    let mut sampler = InputSampler::new(drag);
    let mut keys = spawn_key_reader();
    let mut keys_open = true;
    let mut conn: Option<ConnectionHandle<C>> = None;
    let mut last_render_log = Instant::now() - LOG_THROTTLE;

    let mut ticker = tokio::time::interval(config::TICK_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let commands = client.start();
    let mut running = execute_commands(commands, &mut conn, &settings);

    while running && client.is_running() {
        tokio::select! {
            _ = ticker.tick() => {
                let now = Instant::now();
                let input = sampler.sample(now);
                let commands = fault_boundary("update", || client.on_tick(&input, now))
                    .unwrap_or_default();
                running = execute_commands(commands, &mut conn, &settings);

                match fault_boundary("draw", || draw_frame(&client, &mut canvas)) {
                    Some(Ok(())) => {
                        let (cell_w, cell_h) = canvas.world_per_cell();
                        sampler.set_scale(cell_w, cell_h);
                    }
                    Some(Err(err)) => {
                        if last_render_log.elapsed() >= LOG_THROTTLE {
                            last_render_log = Instant::now();
                            tracing::error!(error = %err, "frame failed; continuing");
                        }
                    }
                    None => {}
                }
            }

            event = next_net_event(&mut conn) => match event {
                Some(event) => {
                    let commands = fault_boundary("network", || client.on_net_event(event, Instant::now()))
                        .unwrap_or_default();
                    running = execute_commands(commands, &mut conn, &settings);
                }
                None => {
                    tracing::debug!("connection task finished");
                    conn = None;
                }
            },

            key = keys.recv(), if keys_open => match key {
                Some(Event::Resize(columns, rows)) => canvas.resize(columns, rows),
                Some(event) => sampler.handle(&event, Instant::now()),
                None => {
                    tracing::warn!("terminal input closed");
                    keys_open = false;
                }
            },

            _ = &mut ctrl_c => {
                tracing::info!("interrupt received");
                break;
            }
        }
    }

    let had_connection = conn.is_some();
    let commands = client.shutdown();
    execute_commands(commands, &mut conn, &settings);
    if had_connection {
        tokio::time::sleep(FAREWELL_GRACE).await;
    }

    drop(guard);
    let _ = stdout().flush();
    Ok(())
}
