use serde::{Deserialize, Serialize};

/// Biome kinds carried in the world's tile field. The discriminant is the
/// on-wire byte value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum Biome {
    DeepWater = 0,
    ShallowWater = 1,
    Beach = 2,
    Grassland = 3,
    Savanna = 4,
    Shrubland = 5,
    Forest = 6,
    Jungle = 7,
    Swamp = 8,
    Hills = 9,
    Mountain = 10,
    Rock = 11,
    Scorched = 12,
    Lava = 13,
    Desert = 14,
}

impl Biome {
    pub const COUNT: usize = 15;

    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => Biome::DeepWater,
            1 => Biome::ShallowWater,
            2 => Biome::Beach,
            4 => Biome::Savanna,
            5 => Biome::Shrubland,
            6 => Biome::Forest,
            7 => Biome::Jungle,
            8 => Biome::Swamp,
            9 => Biome::Hills,
            10 => Biome::Mountain,
            11 => Biome::Rock,
            12 => Biome::Scorched,
            13 => Biome::Lava,
            14 => Biome::Desert,
            _ => Biome::Grassland,
        }
    }

    pub fn is_water(self) -> bool {
        matches!(self, Biome::DeepWater | Biome::ShallowWater)
    }

    /// Land excludes open water and molten tiles.
    pub fn is_land(self) -> bool {
        !self.is_water() && self != Biome::Lava
    }

    pub fn is_rocky(self) -> bool {
        matches!(self, Biome::Hills | Biome::Mountain | Biome::Rock)
    }

    pub fn is_clay_like(self) -> bool {
        matches!(self, Biome::Swamp | Biome::Beach)
    }

    pub fn is_forest_like(self) -> bool {
        matches!(
            self,
            Biome::Forest | Biome::Jungle | Biome::Savanna | Biome::Shrubland | Biome::Swamp
        )
    }

    /// Tiles that count as high ground for watchtower placement.
    pub fn is_elevated(self) -> bool {
        matches!(
            self,
            Biome::Hills | Biome::Mountain | Biome::Rock | Biome::Scorched
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            Biome::DeepWater => "deep_water",
            Biome::ShallowWater => "shallow_water",
            Biome::Beach => "beach",
            Biome::Grassland => "grassland",
            Biome::Savanna => "savanna",
            Biome::Shrubland => "shrubland",
            Biome::Forest => "forest",
            Biome::Jungle => "jungle",
            Biome::Swamp => "swamp",
            Biome::Hills => "hills",
            Biome::Mountain => "mountain",
            Biome::Rock => "rock",
            Biome::Scorched => "scorched",
            Biome::Lava => "lava",
            Biome::Desert => "desert",
        }
    }
}

/// Row-major grid world shared by every subsystem.
///
/// Parallel byte fields are indexed `y * width + x`. The engine mutates
/// `fertility` during foraging and `temperature`/`humidity`/`hazard` only
/// while applying world genesis; everything else treats the grid as
/// read-only within a tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGrid {
    pub width: u16,
    pub height: u16,
    pub seed: u32,
    pub tick: u64,
    pub tiles: Vec<u8>,
    pub temperature: Vec<u8>,
    pub humidity: Vec<u8>,
    pub fertility: Vec<u8>,
    pub hazard: Vec<u8>,
    pub plant_biomass: Vec<u8>,
}

impl WorldGrid {
    pub fn new(width: u16, height: u16, seed: u32, tiles: Vec<u8>) -> Self {
        let n = width as usize * height as usize;
        debug_assert_eq!(tiles.len(), n);
        Self {
            width,
            height,
            seed,
            tick: 0,
            tiles,
            temperature: vec![128; n],
            humidity: vec![128; n],
            fertility: vec![128; n],
            hazard: vec![0; n],
            plant_biomass: vec![96; n],
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    #[inline]
    pub fn biome_at(&self, x: u16, y: u16) -> Biome {
        Biome::from_u8(self.tiles[self.index(x, y)])
    }

    /// Normalized field reads in [0, 1].
    #[inline]
    pub fn fertility01(&self, x: u16, y: u16) -> f64 {
        self.fertility[self.index(x, y)] as f64 / 255.0
    }

    #[inline]
    pub fn hazard01(&self, x: u16, y: u16) -> f64 {
        self.hazard[self.index(x, y)] as f64 / 255.0
    }

    #[inline]
    pub fn humidity01(&self, x: u16, y: u16) -> f64 {
        self.humidity[self.index(x, y)] as f64 / 255.0
    }

    #[inline]
    pub fn temperature01(&self, x: u16, y: u16) -> f64 {
        self.temperature[self.index(x, y)] as f64 / 255.0
    }

    pub fn is_land(&self, x: u16, y: u16) -> bool {
        self.biome_at(x, y).is_land()
    }

    /// True when a tile next to (x, y) holds water, used by the hydration
    /// model.
    pub fn near_water(&self, x: u16, y: u16) -> bool {
        for dy in -1i32..=1 {
            for dx in -1i32..=1 {
                let (nx, ny) = (x as i32 + dx, y as i32 + dy);
                if self.in_bounds(nx, ny) && self.biome_at(nx as u16, ny as u16).is_water() {
                    return true;
                }
            }
        }
        false
    }
}
