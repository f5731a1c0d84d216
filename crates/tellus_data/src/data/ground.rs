use serde::{Deserialize, Serialize};

/// A stack of items lying on the ground.
///
/// Stacks are unique per `(item_id, x, y, natural_spawn)`; quantity is
/// always positive and a stack is deleted when it reaches zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundItemStack {
    pub id: String,
    pub item_id: String,
    pub quantity: u32,
    pub x: u16,
    pub y: u16,
    pub spawned_at_tick: u64,
    pub natural_spawn: bool,
}

impl GroundItemStack {
    pub fn merge_key(&self) -> (String, u16, u16, bool) {
        (self.item_id.clone(), self.x, self.y, self.natural_spawn)
    }
}
