// WebSocket client - owns the transport, the timer table and the
// dispatcher; performs the effects the core requests

use std::collections::HashMap;
use std::time::Duration;

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;

use crate::app::App;
use crate::command::{CommandId, Effect, TimerKey, RECONNECT_INTERVAL};
use crate::error::{QuayError, Result};
use crate::protocol::Notification;
use crate::settings::Settings;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsSink = SplitSink<WsStream, WsMessage>;
type WsSource = SplitStream<WsStream>;

pub struct Client {
    server: Url,
    secret: Option<String>,
    secret_attempted: bool,
    app: App,
    settings: Settings,
    /// One live timer per key; a new schedule replaces the old one.
    timers: HashMap<TimerKey, JoinHandle<()>>,
    commands_tx: mpsc::UnboundedSender<CommandId>,
    commands_rx: mpsc::UnboundedReceiver<CommandId>,
}

impl Client {
    pub fn new(server: &str, secret: Option<String>, settings: Settings) -> Result<Self> {
        let server = Url::parse(server).map_err(|e| QuayError::Address(e.to_string()))?;
        match server.scheme() {
            "ws" | "wss" => {}
            other => return Err(QuayError::Address(format!("unsupported scheme: {other}"))),
        }
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        Ok(Self {
            server,
            secret,
            secret_attempted: false,
            app: App::with_settings(&settings),
            settings,
            timers: HashMap::new(),
            commands_tx,
            commands_rx,
        })
    }

    /// Sender half for an embedding input surface; commands arrive on
    /// the dispatcher in send order.
    pub fn command_sender(&self) -> mpsc::UnboundedSender<CommandId> {
        self.commands_tx.clone()
    }

    /// Connect and serve until the core requests an exit. Transport
    /// loss triggers fixed-interval reconnection, indefinitely.
    pub async fn run(&mut self) -> Result<()> {
        loop {
            match connect_async(self.server.as_str()).await {
                Ok((stream, _response)) => {
                    tracing::info!(server = %self.server, "connected");
                    if self.serve(stream).await? {
                        return Ok(());
                    }
                    self.app.connection_lost();
                    self.app.take_effects();
                    tracing::warn!("connection lost, reconnecting");
                }
                Err(error) => {
                    tracing::debug!(%error, "connection attempt failed");
                }
            }
            self.cancel_all_timers();
            sleep(RECONNECT_INTERVAL).await;
        }
    }

    /// Serve one connection. Returns true when the core asked to exit.
    async fn serve(&mut self, stream: WsStream) -> Result<bool> {
        let (mut sink, mut source) = stream.split();
        self.app.connection_opened();
        if self.perform_effects(&mut sink).await? {
            return Ok(true);
        }
        loop {
            if !self.pump(&mut source).await? {
                return Ok(false);
            }
            self.try_stored_secret();
            if self.perform_effects(&mut sink).await? {
                return Ok(true);
            }
        }
    }

    /// Wait for one unit of work. Returns false when the transport is
    /// gone.
    async fn pump(&mut self, source: &mut WsSource) -> Result<bool> {
        tokio::select! {
            message = source.next() => match message {
                Some(Ok(WsMessage::Text(raw))) => {
                    match serde_json::from_str::<Notification>(raw.as_str()) {
                        Ok(notification) => self.app.handle_notification(notification),
                        Err(error) => tracing::warn!(%error, "undecodable notification"),
                    }
                    Ok(true)
                }
                Some(Ok(WsMessage::Close(_))) | None => Ok(false),
                Some(Ok(_)) => Ok(true),
                Some(Err(error)) => {
                    tracing::warn!(%error, "transport error");
                    Ok(false)
                }
            },
            command = self.commands_rx.recv() => match command {
                Some(command) => {
                    self.app.run(command);
                    Ok(true)
                }
                None => Err(QuayError::ChannelClosed),
            },
        }
    }

    /// A secret given on the command line answers the first
    /// authentication prompt unattended.
    fn try_stored_secret(&mut self) {
        if self.secret_attempted || !self.app.state.prompt.is_for_authentication {
            return;
        }
        let Some(secret) = self.secret.clone() else {
            return;
        };
        self.secret_attempted = true;
        self.app.run(CommandId::PromptInput(secret));
        self.app.run(CommandId::Confirm);
    }

    async fn perform_effects(&mut self, sink: &mut WsSink) -> Result<bool> {
        let mut exit = false;
        for effect in self.app.take_effects() {
            match effect {
                Effect::Render => {}
                Effect::Send(message) => {
                    let raw = serde_json::to_string(&message)?;
                    tracing::trace!(action = %message.action, "send");
                    sink.send(WsMessage::Text(raw.into()))
                        .await
                        .map_err(|e| QuayError::Transport(e.to_string()))?;
                }
                Effect::Schedule {
                    key,
                    delay,
                    command,
                } => self.schedule(key, delay, command),
                Effect::Cancel(key) => {
                    if let Some(handle) = self.timers.remove(&key) {
                        handle.abort();
                    }
                }
                Effect::OpenExternal(address) => {
                    // Browser hand-off belongs to the hosting surface
                    tracing::info!(%address, "external address requested");
                }
                Effect::Persist { key, value } => {
                    self.settings.set(&key, &value);
                    if let Err(error) = self.settings.save() {
                        tracing::warn!(%error, "settings not persisted");
                    }
                }
                Effect::Exit => exit = true,
            }
        }
        Ok(exit)
    }

    fn schedule(&mut self, key: TimerKey, delay: Duration, command: CommandId) {
        let tx = self.commands_tx.clone();
        let handle = tokio::spawn(async move {
            sleep(delay).await;
            let _ = tx.send(command);
        });
        if let Some(previous) = self.timers.insert(key, handle) {
            previous.abort();
        }
    }

    fn cancel_all_timers(&mut self) {
        for (_, handle) in self.timers.drain() {
            handle.abort();
        }
    }
}
