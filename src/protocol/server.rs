use log::{info, warn};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use crate::game::messages::ControlMessage;
use crate::protocol::{Connection, ProtocolServerError};

/// Registers the connection with the game thread, then shuttles messages
/// both ways until either side ends it. The game thread signals a
/// server-initiated disconnect by dropping the session's outbound sender.
async fn run_connection(
    stream: TcpStream,
    control_message_tx: crossbeam_channel::Sender<ControlMessage>,
) -> Result<(), anyhow::Error> {
    let (client_message_tx, client_message_rx) = crossbeam_channel::unbounded();
    let (server_message_tx, mut server_message_rx) = tokio::sync::mpsc::unbounded_channel();
    let (response_tx, response_rx) = oneshot::channel();

    control_message_tx.send(ControlMessage::AddClient {
        client_message_rx,
        server_message_tx,
        response_tx,
    })?;
    let connection_id = response_rx.await?;

    let mut connection = Connection::new(stream);
    let result = loop {
        tokio::select! {
            message = connection.read_message() => {
                match message {
                    Ok(message) => {
                        client_message_tx.send(message).ok();
                    }
                    Err(error) => break Err(error),
                }
            }
            server_message = server_message_rx.recv() => {
                match server_message {
                    Some(message) => {
                        if let Err(error) = connection.write_message(&message).await {
                            break Err(error);
                        }
                    }
                    None => break Err(ProtocolServerError::ServerInitiatedDisconnect.into()),
                }
            }
        }
    };

    control_message_tx
        .send(ControlMessage::RemoveClient { connection_id })
        .ok();
    connection.shutdown().await;
    result
}

pub struct GameServer {
    listener: TcpListener,
    control_message_tx: crossbeam_channel::Sender<ControlMessage>,
}

impl GameServer {
    pub fn new(
        listener: TcpListener,
        control_message_tx: crossbeam_channel::Sender<ControlMessage>,
    ) -> GameServer {
        GameServer {
            listener,
            control_message_tx,
        }
    }

    pub async fn run(&mut self) {
        loop {
            let (socket, _) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(error) => {
                    warn!("accept failed: {}", error);
                    continue;
                }
            };
            let control_message_tx = self.control_message_tx.clone();
            tokio::spawn(async move {
                if let Ok(addr) = socket.peer_addr() {
                    info!("new connection from {:?}", addr);
                }
                if let Err(error) = run_connection(socket, control_message_tx).await {
                    info!("connection ended: {}", error);
                }
            });
        }
    }
}
