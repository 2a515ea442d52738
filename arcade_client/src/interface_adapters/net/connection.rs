use crate::interface_adapters::protocol::{ProtocolError, WireCodec};
use crate::use_cases::NetEvent;

use futures_util::{SinkExt, StreamExt};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, mpsc};
use tokio::time::{Instant, sleep_until};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, info_span, warn, Instrument};

const LOG_THROTTLE: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub enum NetError {
    // Categorizes connection failures so the loop can pick a policy.
    Connect(tungstenite::Error),
    Ws(tungstenite::Error),
    Encode(ProtocolError),
    EventsClosed,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Connect(err) => write!(f, "connect failed: {err}"),
            NetError::Ws(err) => write!(f, "websocket error: {err}"),
            NetError::Encode(err) => write!(f, "{err}"),
            NetError::EventsClosed => write!(f, "event receiver dropped"),
        }
    }
}

impl std::error::Error for NetError {}

#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub url: String,
    // A socket with no frame for this long is closed and reported as stalled.
    pub idle_timeout: Duration,
    pub outbound_capacity: usize,
    pub inbound_capacity: usize,
}

/// Owner side of one WebSocket connection. Dropping it stops the connection task.
pub struct ConnectionHandle<C: WireCodec> {
    outbound: mpsc::Sender<C::Outbound>,
    events: mpsc::Receiver<NetEvent<C::Inbound>>,
    shutdown: Arc<Notify>,
    last_full_log: std::time::Instant,
    _codec: PhantomData<C>,
}

impl<C: WireCodec> ConnectionHandle<C> {
    /// Fire-and-forget: never waits, drops the message when the queue is full or closed.
    pub fn send(&mut self, message: C::Outbound) {
        match self.outbound.try_send(message) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(message)) => {
                if should_log(&mut self.last_full_log) {
                    warn!(?message, "outbound queue full; dropping message");
                }
            }
            Err(mpsc::error::TrySendError::Closed(message)) => {
                debug!(?message, "connection closed; dropping message");
            }
        }
    }

    /// Next lifecycle event, or `None` once the task has finished.
    pub async fn next_event(&mut self) -> Option<NetEvent<C::Inbound>> {
        self.events.recv().await
    }

    /// Flushes queued messages, closes the socket and stops the task. No event follows.
    pub fn close(&self) {
        self.shutdown.notify_one();
    }
}

impl<C: WireCodec> Drop for ConnectionHandle<C> {
    fn drop(&mut self) {
        self.shutdown.notify_one();
    }
}

/// Spawns the connection task and returns its handle. Must run inside a tokio runtime.
pub fn spawn_connection<C: WireCodec>(settings: ConnectionSettings) -> ConnectionHandle<C> {
    let (outbound_tx, outbound_rx) = mpsc::channel::<C::Outbound>(settings.outbound_capacity);
    let (events_tx, events_rx) = mpsc::channel::<NetEvent<C::Inbound>>(settings.inbound_capacity);
    let shutdown = Arc::new(Notify::new());

    let span = info_span!("conn", url = %settings.url);
    tokio::spawn(
        run_connection::<C>(settings, events_tx, outbound_rx, shutdown.clone()).instrument(span),
    );

    ConnectionHandle {
        outbound: outbound_tx,
        events: events_rx,
        shutdown,
        last_full_log: std::time::Instant::now() - LOG_THROTTLE,
        _codec: PhantomData,
    }
}

fn should_log(last: &mut std::time::Instant) -> bool {
    if last.elapsed() >= LOG_THROTTLE {
        *last = std::time::Instant::now();
        true
    } else {
        false
    }
}

enum Ending {
    Closed(Option<String>),
    Stalled,
    // Closed on request; nothing is reported.
    Quiet,
}

enum LoopControl {
    Continue,
    Finished(Ending),
}

async fn run_connection<C: WireCodec>(
    settings: ConnectionSettings,
    events: mpsc::Sender<NetEvent<C::Inbound>>,
    mut outbound: mpsc::Receiver<C::Outbound>,
    shutdown: Arc<Notify>,
) {
    let connected = tokio::select! {
        result = connect_async(settings.url.as_str()) => result.map_err(NetError::Connect),
        _ = shutdown.notified() => {
            debug!("shutdown before connect finished");
            return;
        }
    };

    let socket = match connected {
        Ok((socket, _response)) => socket,
        Err(err) => {
            warn!(error = %err, "connection failed");
            let _ = events
                .send(NetEvent::Failed {
                    reason: err.to_string(),
                })
                .await;
            return;
        }
    };

    info!("connected");
    if events.send(NetEvent::Opened).await.is_err() {
        return;
    }

    let (mut sink, mut stream) = socket.split();
    let heartbeat = settings.idle_timeout / 2;
    let mut last_frame = Instant::now();
    let mut last_ping = Instant::now();
    let mut last_decode_log = std::time::Instant::now() - LOG_THROTTLE;
    let mut msgs_in: u64 = 0;
    let mut msgs_out: u64 = 0;

    let outcome: Result<Ending, NetError> = loop {
        let idle_deadline = last_frame + settings.idle_timeout;
        let ping_deadline = last_frame.max(last_ping) + heartbeat;

        let control = tokio::select! {
            incoming = stream.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    last_frame = Instant::now();
                    msgs_in += 1;
                    match C::decode(&text) {
                        Ok(message) => {
                            if events.send(NetEvent::Message(message)).await.is_err() {
                                break Err(NetError::EventsClosed);
                            }
                        }
                        Err(err) => {
                            if should_log(&mut last_decode_log) {
                                warn!(error = %err, "ignoring server message");
                            }
                        }
                    }
                    LoopControl::Continue
                }
                Some(Ok(Message::Close(frame))) => {
                    let reason = frame.map(|frame| {
                        let reason: &str = &frame.reason;
                        reason.to_string()
                    });
                    info!(?reason, "server closed the connection");
                    LoopControl::Finished(Ending::Closed(reason))
                }
                Some(Ok(_)) => {
                    // Ping, pong and binary frames only count as liveness.
                    last_frame = Instant::now();
                    LoopControl::Continue
                }
                Some(Err(err)) => {
                    warn!(error = %err, "websocket read failed");
                    LoopControl::Finished(Ending::Closed(Some(err.to_string())))
                }
                None => LoopControl::Finished(Ending::Closed(None)),
            },

            outgoing = outbound.recv() => match outgoing {
                Some(message) => {
                    let encoded = encode_frame::<C>(&message);
                    match encoded {
                        Ok(frame) => match sink.send(frame).await {
                            Ok(()) => {
                                msgs_out += 1;
                                LoopControl::Continue
                            }
                            Err(err) => {
                                let err = NetError::Ws(err);
                                warn!(error = %err, "websocket write failed");
                                LoopControl::Finished(Ending::Closed(Some(err.to_string())))
                            }
                        },
                        Err(err) => {
                            warn!(error = %err, ?message, "dropping message that failed to encode");
                            LoopControl::Continue
                        }
                    }
                }
                // Handle dropped without a close.
                None => LoopControl::Finished(Ending::Quiet),
            },

            _ = sleep_until(ping_deadline) => {
                last_ping = Instant::now();
                if let Err(err) = sink.send(Message::Ping(Vec::new().into())).await {
                    debug!(error = %err, "heartbeat ping failed");
                }
                LoopControl::Continue
            }

            _ = sleep_until(idle_deadline) => {
                warn!(idle_ms = settings.idle_timeout.as_millis() as u64, "no frames from server; closing");
                LoopControl::Finished(Ending::Stalled)
            }

            _ = shutdown.notified() => {
                // Deliberate close: flush what the loop queued (farewell messages) first.
                while let Ok(message) = outbound.try_recv() {
                    let encoded = encode_frame::<C>(&message);
                    let frame = match encoded {
                        Ok(frame) => frame,
                        Err(err) => {
                            warn!(error = %err, ?message, "dropping message that failed to encode");
                            continue;
                        }
                    };
                    if sink.send(frame).await.is_ok() {
                        msgs_out += 1;
                    }
                }
                LoopControl::Finished(Ending::Quiet)
            }
        };

        if let LoopControl::Finished(ending) = control {
            break Ok(ending);
        }
    };

    if let Err(err) = sink.close().await {
        debug!(error = %err, "socket close error");
    }
    info!(msgs_in, msgs_out, "connection finished");

    let event = match outcome {
        Ok(Ending::Closed(reason)) => NetEvent::Closed { reason },
        Ok(Ending::Stalled) => NetEvent::Stalled,
        Ok(Ending::Quiet) => return,
        Err(err) => {
            debug!(error = %err, "connection task exiting");
            return;
        }
    };
    let _ = events.send(event).await;
}

// Encodes before any await, so no borrow of the message lives across a yield point.
fn encode_frame<C: WireCodec>(message: &C::Outbound) -> Result<Message, NetError> {
    let text = C::encode(message).map_err(NetError::Encode)?;
    Ok(Message::Text(text.into()))
}
