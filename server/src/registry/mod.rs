mod room;
mod room_registry;

pub use self::room::{Member, Room};
pub use self::room_registry::RoomRegistry;
