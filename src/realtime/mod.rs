mod event;

pub use event::Event;

use std::collections::HashMap;

use tokio::sync::broadcast;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::entities::Role;

const ROOM_CAPACITY: usize = 64;

/// A logical room on the realtime channel. Clients land in their
/// `{role, user_id}` room on join; role-wide rooms carry broadcasts such as
/// `new_request` to every connected provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Room {
    User { role: Role, user_id: Uuid },
    Role(Role),
}

/// Routes events between customer and provider connections. Membership is a
/// broadcast receiver; dropping the receiver leaves the room, and rooms with
/// no members left are pruned on the next publish.
pub struct Hub {
    rooms: RwLock<HashMap<Room, broadcast::Sender<Event>>>,
}

impl Hub {
    pub fn new() -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn join(&self, room: Room) -> broadcast::Receiver<Event> {
        let mut rooms = self.rooms.write().await;

        match rooms.get(&room) {
            Some(sender) => sender.subscribe(),
            None => {
                let (sender, receiver) = broadcast::channel(ROOM_CAPACITY);
                rooms.insert(room, sender);
                receiver
            }
        }
    }

    /// Delivers an event to every current member of the room and reports the
    /// member count. An empty or unknown room delivers to nobody; that is not
    /// an error, the party simply is not connected.
    #[tracing::instrument(skip(self))]
    pub async fn publish(&self, room: &Room, event: Event) -> usize {
        let mut rooms = self.rooms.write().await;

        let sender = match rooms.get(room) {
            Some(sender) => sender,
            None => return 0,
        };

        match sender.send(event) {
            Ok(delivered) => delivered,
            Err(_) => {
                rooms.remove(room);
                0
            }
        }
    }
}

impl Default for Hub {
    fn default() -> Self {
        Self::new()
    }
}
