//! Procedural map generation with terrain, hills, resources, villages and rivers.
//!
//! Terrain comes from two smooth noise fields (elevation and moisture)
//! plus a latitude term. Hills use a third field. Resources, villages and
//! river sources are rolled on the injected generator, so the same seed
//! always yields the same map on a given platform. The noise is `f64`
//! trigonometry and is not promised bit-identical across platforms.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::hex::Coord;
use crate::map::{Tile, TileMap};
use crate::terrain::{Resource, Terrain};

/// Probability that a mountain or snow tile seeds a river.
pub const RIVER_CHANCE: f64 = 0.6;

/// Max steps a river walks downhill.
pub const RIVER_MAX_STEPS: usize = 25;

/// Preset map dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MapSize {
    /// 20 x 18.
    #[default]
    Small,
    /// 30 x 24.
    Medium,
    /// 40 x 30.
    Large,
}

impl MapSize {
    /// `(width, height)` in tiles.
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Small => (20, 18),
            Self::Medium => (30, 24),
            Self::Large => (40, 30),
        }
    }
}

/// Map configuration for procedural generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Map width in tiles.
    pub width: u32,
    /// Map height in tiles.
    pub height: u32,
    /// Random seed for deterministic generation.
    pub seed: u64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self::small()
    }
}

impl MapConfig {
    /// Configuration for a preset size.
    #[must_use]
    pub const fn for_size(size: MapSize) -> Self {
        let (width, height) = size.dimensions();
        Self {
            width,
            height,
            seed: 12345,
        }
    }

    /// Create a small map (20x18).
    #[must_use]
    pub const fn small() -> Self {
        Self::for_size(MapSize::Small)
    }

    /// Create a medium map (30x24).
    #[must_use]
    pub const fn medium() -> Self {
        Self::for_size(MapSize::Medium)
    }

    /// Create a large map (40x30).
    #[must_use]
    pub const fn large() -> Self {
        Self::for_size(MapSize::Large)
    }

    /// Set the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Generate with a generator seeded from `self.seed`.
    #[must_use]
    pub fn generate(&self) -> TileMap {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        generate_map(self.width, self.height, &mut rng)
    }
}

/// Three octaves of `sin * cos` noise in `[0, 0.875]`.
fn fbm(x: f64, y: f64, seed: f64) -> f64 {
    let mut value = 0.0;
    let mut amplitude = 0.5;
    let mut frequency = 0.4;
    for _ in 0..3 {
        value += ((x * frequency + seed).sin() * (y * frequency + seed).cos() + 1.0) / 2.0 * amplitude;
        amplitude *= 0.5;
        frequency *= 2.0;
    }
    value
}

/// Noise fields sampled for one map.
#[derive(Debug, Clone, Copy)]
struct NoiseField {
    seed: f64,
}

impl NoiseField {
    fn elevation(self, c: Coord) -> f64 {
        fbm(f64::from(c.q), f64::from(c.r), self.seed)
    }

    fn moisture(self, c: Coord) -> f64 {
        fbm(f64::from(c.q) + 100.0, f64::from(c.r) + 100.0, self.seed + 50.0)
    }

    fn hills(self, c: Coord) -> f64 {
        fbm(f64::from(c.q) + 200.0, f64::from(c.r) + 200.0, self.seed + 100.0)
    }
}

fn classify(elevation: f64, moisture: f64, latitude: f64) -> Terrain {
    let terrain = if elevation < 0.35 {
        Terrain::Water
    } else if elevation > 0.85 {
        Terrain::Mountain
    } else if latitude > 0.8 {
        Terrain::Snow
    } else if latitude > 0.6 {
        Terrain::Tundra
    } else if moisture > 0.65 {
        Terrain::Forest
    } else if moisture < 0.2 {
        Terrain::Desert
    } else if elevation > 0.6 {
        Terrain::Plains
    } else {
        Terrain::Grassland
    };

    if latitude > 0.92 {
        Terrain::Snow
    } else {
        terrain
    }
}

fn roll_land_resource<R: Rng + ?Sized>(rng: &mut R) -> Option<Resource> {
    const TABLE: [(f64, Resource); 10] = [
        (0.97, Resource::Uranium),
        (0.95, Resource::Aluminum),
        (0.92, Resource::Oil),
        (0.89, Resource::Coal),
        (0.85, Resource::Iron),
        (0.82, Resource::Horses),
        (0.79, Resource::Gold),
        (0.75, Resource::Wheat),
        (0.72, Resource::Cattle),
        (0.70, Resource::Rice),
    ];
    let roll: f64 = rng.gen();
    TABLE
        .iter()
        .find(|(threshold, _)| roll > *threshold)
        .map(|&(_, resource)| resource)
}

fn roll_sea_resource<R: Rng + ?Sized>(rng: &mut R, elevation: f64) -> Option<Resource> {
    let coastal = elevation > 0.2 && elevation < 0.35;
    let roll: f64 = rng.gen();
    if coastal {
        (roll > 0.8).then_some(Resource::Fish)
    } else {
        (roll > 0.9).then_some(Resource::Whales)
    }
}

/// Generate a `width` x `height` map using `rng` for every random choice.
///
/// Rows run over `r` in `[-floor(h/2), h/2)`; each row is shifted by
/// `floor(r/2)` so the region is a rectangle on screen.
pub fn generate_map<R: Rng + ?Sized>(width: u32, height: u32, rng: &mut R) -> TileMap {
    let noise = NoiseField {
        seed: rng.gen_range(0.0..1000.0),
    };
    let (w, h) = (f64::from(width), f64::from(height));
    let half_h = (height / 2) as i32;
    let half_w = (width / 2) as i32;

    let mut tiles = TileMap::new();

    let mut r = -half_h;
    while f64::from(r) < h / 2.0 {
        let offset = r.div_euclid(2);
        let mut q = -half_w - offset;
        while f64::from(q) < w / 2.0 - f64::from(offset) {
            let coord = Coord::new(q, r);
            let elevation = noise.elevation(coord);
            let latitude = f64::from(r.abs()) / (h / 2.0);
            let terrain = classify(elevation, noise.moisture(coord), latitude);

            let mut tile = Tile::new(coord, terrain);
            tile.is_hill = !terrain.is_water()
                && terrain != Terrain::Mountain
                && noise.hills(coord) > 0.6;

            tile.resource = match terrain {
                Terrain::Water => roll_sea_resource(rng, elevation),
                Terrain::Snow | Terrain::Mountain => None,
                _ => roll_land_resource(rng),
            };

            tile.has_village = !terrain.is_water()
                && terrain != Terrain::Mountain
                && tile.resource.is_none()
                && rng.gen::<f64>() > 0.97;

            tiles.insert(tile);
            q += 1;
        }
        r += 1;
    }

    carve_rivers(&mut tiles, noise, rng);

    tracing::debug!(
        width,
        height,
        tiles = tiles.len(),
        rivers = tiles.iter().filter(|t| t.has_river()).count(),
        "generated map"
    );

    tiles
}

/// Walk each river downhill from its source, marking shared edges.
fn carve_rivers<R: Rng + ?Sized>(tiles: &mut TileMap, noise: NoiseField, rng: &mut R) {
    let sources: Vec<Coord> = tiles
        .iter()
        .filter(|t| matches!(t.terrain, Terrain::Mountain | Terrain::Snow))
        .map(|t| t.coord)
        .collect();

    for source in sources {
        if rng.gen::<f64>() > RIVER_CHANCE {
            continue;
        }

        let mut current = source;
        for _ in 0..RIVER_MAX_STEPS {
            let mut lowest: Option<Coord> = None;
            let mut min_elevation = noise.elevation(current);

            for neighbor in current.neighbors() {
                if !tiles.contains(neighbor) {
                    continue;
                }
                let elevation = noise.elevation(neighbor);
                if elevation < min_elevation {
                    min_elevation = elevation;
                    lowest = Some(neighbor);
                }
            }

            let Some(next) = lowest else {
                break;
            };
            tiles.set_river_between(current, next);

            if tiles.get(next).is_some_and(|t| t.terrain.is_water()) {
                break;
            }
            current = next;
        }
    }
}
