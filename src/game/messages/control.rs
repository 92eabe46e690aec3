use crossbeam_channel::Receiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

use crate::game::resources::ConnectionId;

use super::{client::ClientMessage, server::ServerMessage};

/// Messages from the network layer to the game thread. Client tasks block on
/// `response_tx` until the game thread has installed the session.
pub enum ControlMessage {
    AddClient {
        client_message_rx: Receiver<ClientMessage>,
        server_message_tx: UnboundedSender<ServerMessage>,
        response_tx: oneshot::Sender<ConnectionId>,
    },
    RemoveClient {
        connection_id: ConnectionId,
    },
    Shutdown {
        response_tx: oneshot::Sender<()>,
    },
}
