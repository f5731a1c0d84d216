//! Ground item stacks: natural spawns, decay, drops, and pickups.

use super::{CivSystem, GROUND_CAP};
use tellus_data::{GroundItemStack, WorldGrid};

impl CivSystem {
    /// Periodic natural spawns and old-stack decay, run from the faction
    /// upkeep pass.
    pub(crate) fn pass_ground_items(&mut self, world: &WorldGrid) {
        let tick = self.tick_count;
        if tick % self.config.ground_item_spawn_interval == 0 && !self.factions.is_empty() {
            let count = (1.0 + 0.5 * self.factions.len() as f64).floor() as usize;
            for _ in 0..count {
                self.spawn_natural_stack(world);
            }
        }
        if tick % self.config.ground_item_decay_interval == 0 {
            let decay_age = self.config.ground_item_decay_age;
            self.ground_items
                .retain(|g| tick.saturating_sub(g.spawned_at_tick) <= decay_age);
        }
    }

    fn spawn_natural_stack(&mut self, world: &WorldGrid) {
        if self.ground_items.len() >= GROUND_CAP {
            return;
        }
        // Spawn near a faction home so agents can plausibly find it.
        let faction_idx = self.rng.next_index(self.factions.len());
        let home = self.factions[faction_idx].home_center;
        let x = (home.x as i32 + self.rng.range_int(-8, 8) as i32).max(0);
        let y = (home.y as i32 + self.rng.range_int(-8, 8) as i32).max(0);
        if !world.in_bounds(x, y) {
            return;
        }
        let (x, y) = (x as u16, y as u16);
        if !world.is_land(x, y) {
            return;
        }
        let biome = world.biome_at(x, y);

        let candidates: Vec<&str> = self
            .items
            .items()
            .iter()
            .filter(|i| {
                i.natural_spawn
                    && (i.allowed_biomes.is_empty() || i.allowed_biomes.contains(&biome))
            })
            .map(|i| i.id.as_str())
            .collect();
        if candidates.is_empty() {
            return;
        }
        let item_id = candidates[self.rng.next_index(candidates.len())].to_string();
        let quantity = self.rng.range_int(1, 3) as u32;
        self.add_ground_stack(&item_id, quantity, x, y, true);
    }

    /// Adds quantity to the unique `(item, x, y, natural)` stack, creating
    /// it if missing.
    pub(crate) fn add_ground_stack(
        &mut self,
        item_id: &str,
        quantity: u32,
        x: u16,
        y: u16,
        natural_spawn: bool,
    ) {
        if quantity == 0 {
            return;
        }
        if let Some(stack) = self.ground_items.iter_mut().find(|g| {
            g.item_id == item_id && g.x == x && g.y == y && g.natural_spawn == natural_spawn
        }) {
            stack.quantity += quantity;
            return;
        }
        if self.ground_items.len() >= GROUND_CAP {
            return;
        }
        let id = self.next_id("ground");
        self.ground_items.push(GroundItemStack {
            id,
            item_id: item_id.to_string(),
            quantity,
            x,
            y,
            spawned_at_tick: self.tick_count,
            natural_spawn,
        });
    }

    /// Removes up to `quantity` from the stack at index, deleting it when
    /// it reaches zero. Returns the taken amount.
    pub(crate) fn take_from_stack(&mut self, stack_idx: usize, quantity: u32) -> u32 {
        let stack = &mut self.ground_items[stack_idx];
        let taken = quantity.min(stack.quantity);
        stack.quantity -= taken;
        if stack.quantity == 0 {
            self.ground_items.remove(stack_idx);
        }
        taken
    }

    /// Index of the nearest stack within the Chebyshev radius, if any.
    pub(crate) fn stack_near(&self, x: u16, y: u16, radius: i32) -> Option<usize> {
        let mut best: Option<(usize, i32)> = None;
        for (i, g) in self.ground_items.iter().enumerate() {
            let d = (g.x as i32 - x as i32)
                .abs()
                .max((g.y as i32 - y as i32).abs());
            if d <= radius && best.map(|(_, bd)| d < bd).unwrap_or(true) {
                best = Some((i, d));
            }
        }
        best.map(|(i, _)| i)
    }
}
