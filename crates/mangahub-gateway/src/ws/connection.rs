use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
};
use futures_util::{Stream, StreamExt};
use mangahub_core::config::MAX_CHAT_FRAME_BYTES;
use mangahub_core::types::{ChatMessage, GUEST_USERNAME, GUEST_USER_ID};
use mangahub_hub::{Client, HubHandle, Sink};
use mangahub_users::Claims;
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::auth::AuthUser;
use crate::ws::sink::WsSink;

/// Who a WebSocket session speaks as. Fixed at upgrade time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    pub user_id: String,
    pub username: String,
}

impl SessionIdentity {
    pub fn guest() -> Self {
        Self {
            user_id: GUEST_USER_ID.to_string(),
            username: GUEST_USERNAME.to_string(),
        }
    }

    pub fn from_claims(claims: &Claims) -> Self {
        Self {
            user_id: claims.user_id.clone(),
            username: claims.username.clone(),
        }
    }
}

/// GET /ws/guest: anonymous session.
pub async fn guest_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let hub = state.hub.clone();
    ws.max_message_size(MAX_CHAT_FRAME_BYTES)
        .on_upgrade(move |socket| run_connection(socket, hub, SessionIdentity::guest()))
}

/// GET /ws/chat: token is checked before the upgrade is accepted.
pub async fn chat_handler(
    AuthUser(claims): AuthUser,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    info!(username = %claims.username, "chat connect attempt");
    let hub = state.hub.clone();
    let identity = SessionIdentity::from_claims(&claims);
    ws.max_message_size(MAX_CHAT_FRAME_BYTES)
        .on_upgrade(move |socket| run_connection(socket, hub, identity))
}

async fn run_connection(socket: WebSocket, hub: HubHandle, identity: SessionIdentity) {
    let (tx, rx) = socket.split();
    serve_client(hub, identity, WsSink::new(tx), rx).await;
}

/// Register `sink` with the hub, then pump inbound frames into broadcasts
/// until the peer goes away or the hub closes the client. Unregisters
/// exactly once on every exit path.
pub async fn serve_client<K, R>(hub: HubHandle, identity: SessionIdentity, sink: K, mut rx: R)
where
    K: Sink + 'static,
    R: Stream<Item = Result<Message, axum::Error>> + Unpin,
{
    let mut client = Client::new(identity.user_id.clone(), identity.username.clone(), sink);
    let mut closed = client.on_close();
    let id = match hub.register(client).await {
        Ok(id) => id,
        Err(e) => {
            warn!(error = %e, "hub unavailable, dropping session");
            return;
        }
    };
    info!(client = %id, username = %identity.username, "WS session registered");

    loop {
        let frame = tokio::select! {
            biased;
            _ = &mut closed => {
                info!(client = %id, "transport closed by hub, ending session");
                break;
            }
            frame = rx.next() => frame,
        };
        let text = match frame {
            Some(Ok(Message::Text(text))) => text.as_str().to_owned(),
            Some(Ok(Message::Binary(bytes))) => String::from_utf8_lossy(&bytes).into_owned(),
            Some(Ok(Message::Close(_))) | None => break,
            Some(Ok(_)) => continue,
            Some(Err(e)) => {
                debug!(client = %id, error = %e, "WS read error");
                break;
            }
        };

        let Some(message) = inbound_message(&text, &identity) else {
            debug!(client = %id, "malformed chat frame ignored");
            continue;
        };
        if hub.broadcast(message).await.is_err() {
            break;
        }
    }

    let _ = hub.unregister(id).await;
    info!(client = %id, "WS session closed");
}

/// Decode one inbound frame and replace any claimed identity with the
/// session's own.
pub fn inbound_message(text: &str, identity: &SessionIdentity) -> Option<ChatMessage> {
    serde_json::from_str::<ChatMessage>(text)
        .ok()
        .map(|m| m.stamped(&identity.user_id, &identity.username))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> SessionIdentity {
        SessionIdentity {
            user_id: "u-1".into(),
            username: "alice".into(),
        }
    }

    #[test]
    fn identity_is_overwritten() {
        let msg = inbound_message(
            r#"{"user_id":"admin","username":"root","message":"hi","timestamp":7}"#,
            &alice(),
        )
        .unwrap();
        assert_eq!(msg.user_id, "u-1");
        assert_eq!(msg.username, "alice");
        assert_eq!(msg.message, "hi");
        assert_eq!(msg.timestamp, 7);
    }

    #[test]
    fn message_only_frame_is_enough() {
        let msg = inbound_message(r#"{"message":"yo"}"#, &SessionIdentity::guest()).unwrap();
        assert_eq!(msg.user_id, "GUEST");
        assert_eq!(msg.username, "Guest_Viewer");
        assert_eq!(msg.timestamp, 0);
    }

    #[test]
    fn malformed_frames_are_dropped() {
        assert!(inbound_message("hello", &alice()).is_none());
        assert!(inbound_message(r#"{"message": 5}"#, &alice()).is_none());
    }
}
