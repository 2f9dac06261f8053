use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::Extension;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::entities::Role;
use crate::realtime::{Event, Hub, Room};

pub async fn upgrade(
    ws: WebSocketUpgrade,
    Extension(hub): Extension<Arc<Hub>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle(socket, hub))
}

#[tracing::instrument(skip(socket, hub))]
async fn handle(mut socket: WebSocket, hub: Arc<Hub>) {
    // the first frame must declare who is connecting
    let (user_id, role) = match read_join(&mut socket).await {
        Some(join) => join,
        None => {
            tracing::warn!("connection did not join, closing...");
            let _ = socket.close().await;
            return;
        }
    };

    tracing::info!("joined {:?} room for user {:?}", role, user_id);

    let mut receivers = vec![hub.join(Room::User { role, user_id }).await];

    // providers also hear role-wide broadcasts such as new_request
    if role == Role::Provider {
        receivers.push(hub.join(Room::Role(Role::Provider)).await);
    }

    let (outbound_sender, outbound_receiver) = async_channel::unbounded::<Event>();

    let mut forwarders = vec![];

    for mut receiver in receivers {
        let outbound = outbound_sender.clone();

        forwarders.push(tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => {
                        if outbound.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("connection lagged, skipped {} events", skipped);
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
    }

    let (mut sink, mut stream) = socket.split();

    loop {
        tokio::select! {
            outbound = outbound_receiver.recv() => {
                let event = match outbound {
                    Ok(event) => event,
                    Err(_) => break,
                };

                let text = match serde_json::to_string(&event) {
                    Ok(text) => text,
                    Err(_) => continue,
                };

                if sink.send(Message::Text(text)).await.is_err() {
                    break;
                }
            }
            inbound = stream.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        // malformed frames are dropped at the boundary
                        if let Ok(event) = serde_json::from_str::<Event>(&text) {
                            for room in event.rooms() {
                                hub.publish(&room, event.clone()).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => continue,
                    Some(Err(_)) => break,
                }
            }
        }
    }

    // deterministic teardown: stop forwarding, then the receivers drop and
    // the rooms forget this connection
    for forwarder in forwarders.iter() {
        forwarder.abort();
    }

    tracing::info!("connection for user {:?} torn down", user_id);
}

async fn read_join(socket: &mut WebSocket) -> Option<(Uuid, Role)> {
    while let Some(frame) = socket.recv().await {
        match frame.ok()? {
            Message::Text(text) => {
                return match serde_json::from_str::<Event>(&text) {
                    Ok(Event::Join { user_id, role }) => Some((user_id, role)),
                    _ => None,
                };
            }
            Message::Close(_) => return None,
            // ignore pings and binary noise until the join arrives
            _ => continue,
        }
    }

    None
}
