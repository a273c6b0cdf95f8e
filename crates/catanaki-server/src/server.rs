//! WebSocket server and connection handling.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::room::{GameRoom, RoomError};
use catanaki_core::{BoardLayout, Game, GameId, RandomSource, RngSource};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    /// All hosted games
    pub rooms: DashMap<GameId, GameRoom>,
    /// Mapping from connection ID to the game it joined
    pub connection_games: DashMap<Uuid, GameId>,
    /// Mapping from connection ID to its message sender
    pub connection_senders: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
    layout: BoardLayout,
    /// Seeds each new game's generator
    seeds: Mutex<Box<dyn RandomSource>>,
}

impl ServerState {
    pub fn new(layout: BoardLayout, seeds: Box<dyn RandomSource>) -> Self {
        Self {
            rooms: DashMap::new(),
            connection_games: DashMap::new(),
            connection_senders: DashMap::new(),
            layout,
            seeds: Mutex::new(seeds),
        }
    }

    /// Create a game with an id no other hosted game uses.
    pub fn create_game(&self) -> GameId {
        loop {
            let seed = match self.seeds.lock() {
                Ok(mut seeds) => seeds.next_u64(),
                Err(poisoned) => poisoned.into_inner().next_u64(),
            };
            let game = Game::new(&self.layout, Box::new(RngSource::seeded(seed)));
            let id = game.id().clone();
            if let dashmap::mapref::entry::Entry::Vacant(slot) = self.rooms.entry(id.clone()) {
                slot.insert(GameRoom::new(game));
                info!(game = %id, "game created");
                return id;
            }
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, connection: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.connection_senders.get(&connection) {
            let _ = sender.send(msg);
        }
    }

    /// Broadcast a message to every connection in a game.
    pub fn broadcast_to_room(&self, game_id: &GameId, msg: ServerMessage) {
        let members = match self.rooms.get(game_id) {
            Some(room) => room.member_ids(),
            None => return,
        };
        for member in members {
            self.send_to(member, msg.clone());
        }
    }

    fn send_error(&self, connection: Uuid, message: impl ToString) {
        self.send_to(
            connection,
            ServerMessage::Error {
                message: message.to_string(),
            },
        );
    }

    fn joined_game(&self, connection: Uuid) -> Option<GameId> {
        self.connection_games.get(&connection).map(|id| id.clone())
    }

    /// Serialize the game and push it to everyone in the room.
    fn broadcast_update(&self, game_id: &GameId) {
        let state = match self.rooms.get(game_id).map(|room| room.snapshot_json()) {
            Some(Ok(state)) => state,
            Some(Err(e)) => {
                error!(game = %game_id, "snapshot failed: {}", e);
                return;
            }
            None => return,
        };
        self.broadcast_to_room(game_id, ServerMessage::GameUpdate { state });
    }

    fn join(&self, connection: Uuid, game_id: &GameId) -> Result<(), String> {
        let info = match self.rooms.get_mut(game_id) {
            Some(mut room) => {
                room.join(connection);
                room.to_info()
            }
            None => return Err(format!("Game {} not found", game_id)),
        };

        if let Some(previous) = self.connection_games.insert(connection, game_id.clone()) {
            if &previous != game_id {
                self.leave(connection, &previous);
            }
        }

        self.send_to(connection, ServerMessage::JoinedGame { game: info });
        self.broadcast_update(game_id);
        Ok(())
    }

    /// Remove a connection from a game; the game goes away once it is empty
    /// and was never started.
    fn leave(&self, connection: Uuid, game_id: &GameId) {
        let remove = match self.rooms.get_mut(game_id) {
            Some(mut room) => room.leave(connection) && !room.game.has_started,
            None => false,
        };
        if remove {
            self.rooms.remove(game_id);
            info!(game = %game_id, "empty game removed");
        }
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(BoardLayout::standard(), Box::new(RngSource::from_entropy()))
    }
}

/// Run the WebSocket server.
pub async fn run_server(addr: SocketAddr, state: Arc<ServerState>) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!("Catanaki server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();

    let connection_id = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.connection_senders.insert(connection_id, tx);

    let welcome = ServerMessage::Welcome { connection_id };
    let msg_text = serde_json::to_string(&welcome)?;
    ws_sender.send(Message::Text(msg_text)).await?;

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text)).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Could not encode message: {}", e),
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(connection_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", connection_id, text);
                    state.send_error(connection_id, format!("Invalid message: {}", e));
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                state.send_to(connection_id, ServerMessage::Pong);
            }
            Err(e) => {
                error!("WebSocket error from {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    handle_disconnect(connection_id, &state);
    state.connection_senders.remove(&connection_id);
    send_task.abort();

    info!("Connection closed for {}", connection_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(connection: Uuid, msg: ClientMessage, state: &Arc<ServerState>) {
    match msg {
        ClientMessage::CreateGame => {
            let game_id = state.create_game();
            state.send_to(
                connection,
                ServerMessage::GameCreated {
                    game_id: game_id.clone(),
                },
            );
            if let Err(message) = state.join(connection, &game_id) {
                state.send_error(connection, message);
            }
        }

        ClientMessage::JoinGame { game_id } => {
            if let Err(message) = state.join(connection, &game_id) {
                state.send_error(connection, message);
            }
        }

        ClientMessage::CreatePlayer { name } => {
            let Some(game_id) = state.joined_game(connection) else {
                state.send_error(connection, RoomError::NotMember);
                return;
            };
            let result = match state.rooms.get_mut(&game_id) {
                Some(mut room) => room.create_player(connection, &name),
                None => Err(RoomError::NotMember),
            };
            match result {
                Ok(player) => {
                    state.send_to(connection, ServerMessage::PlayerCreated { player });
                    state.broadcast_update(&game_id);
                }
                Err(e) => state.send_error(connection, e),
            }
        }

        ClientMessage::StartGame => {
            let Some(game_id) = state.joined_game(connection) else {
                state.send_error(connection, RoomError::NotMember);
                return;
            };
            let result = match state.rooms.get_mut(&game_id) {
                Some(mut room) => room.start(connection),
                None => Err(RoomError::NotMember),
            };
            match result {
                Ok(()) => state.broadcast_update(&game_id),
                Err(e) => state.send_error(connection, e),
            }
        }

        ClientMessage::GameCommand { command } => {
            let Some(game_id) = state.joined_game(connection) else {
                state.send_error(connection, RoomError::NotMember);
                return;
            };
            // Guard is released at the end of this statement, before any broadcast
            let result = match state.rooms.get_mut(&game_id) {
                Some(mut room) => room.submit(connection, command),
                None => Err(RoomError::NotMember),
            };

            match result {
                Ok(events) => {
                    debug!(game = %game_id, events = events.len(), "command applied");
                    let events = events
                        .iter()
                        .filter_map(|e| serde_json::to_value(e).ok())
                        .collect();
                    state.send_to(
                        connection,
                        ServerMessage::CommandResult {
                            success: true,
                            events,
                            error: None,
                        },
                    );
                    state.broadcast_update(&game_id);
                }
                Err(e) => {
                    debug!(game = %game_id, "command rejected: {}", e);
                    state.send_to(
                        connection,
                        ServerMessage::CommandResult {
                            success: false,
                            events: vec![],
                            error: Some(e.to_string()),
                        },
                    );
                }
            }
        }

        ClientMessage::GetSnapshot => {
            let Some(game_id) = state.joined_game(connection) else {
                state.send_error(connection, RoomError::NotMember);
                return;
            };
            let result = match state.rooms.get(&game_id) {
                Some(room) => room.snapshot_json(),
                None => Err(RoomError::NotMember),
            };
            match result {
                Ok(game_state) => {
                    state.send_to(connection, ServerMessage::GameUpdate { state: game_state })
                }
                Err(e) => state.send_error(connection, e),
            }
        }

        ClientMessage::Ping => {
            state.send_to(connection, ServerMessage::Pong);
        }
    }
}

/// Handle connection disconnect.
fn handle_disconnect(connection: Uuid, state: &Arc<ServerState>) {
    if let Some((_, game_id)) = state.connection_games.remove(&connection) {
        state.leave(connection, &game_id);
        state.broadcast_update(&game_id);
    }
}
