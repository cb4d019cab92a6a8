//! ASCII map renderer for terminal review.
//!
//! One character per tile, two columns per tile, odd rows shifted half a
//! tile so the hex grid reads correctly.

use std::collections::BTreeMap;
use std::fmt::Write;

use civ_core::map::{Tile, TileMap};
use civ_core::player::PlayerId;
use civ_core::state::GameState;
use civ_core::terrain::Terrain;

/// ASCII rendering configuration.
#[derive(Debug, Clone)]
pub struct AsciiConfig {
    /// Mark river tiles with `=`.
    pub show_rivers: bool,
    /// Mark hills with `n`.
    pub show_hills: bool,
    /// Draw cities and units.
    pub show_units: bool,
    /// Blank out tiles the human has not discovered.
    pub fog: bool,
    /// Show the legend.
    pub show_legend: bool,
    /// Use colored output (ANSI).
    pub use_color: bool,
}

impl Default for AsciiConfig {
    fn default() -> Self {
        Self {
            show_rivers: true,
            show_hills: true,
            show_units: true,
            fog: false,
            show_legend: true,
            use_color: false,
        }
    }
}

/// ANSI color codes.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";

    pub const BLUE: &str = "\x1b[34m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const GREEN: &str = "\x1b[32m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const WHITE: &str = "\x1b[37m";
    pub const GRAY: &str = "\x1b[90m";
}

const SEAT_COLORS: [&str; 5] = [
    colors::CYAN,
    colors::YELLOW,
    colors::MAGENTA,
    colors::GREEN,
    colors::BLUE,
];

fn seat_color(state: &GameState, owner: PlayerId) -> &'static str {
    if state.player(owner).is_ok_and(|p| p.is_barbarian()) {
        colors::RED
    } else {
        SEAT_COLORS[owner.0 as usize % SEAT_COLORS.len()]
    }
}

fn terrain_color(terrain: Terrain) -> &'static str {
    match terrain {
        Terrain::Water => colors::BLUE,
        Terrain::Grassland | Terrain::Forest => colors::GREEN,
        Terrain::Plains | Terrain::Desert => colors::YELLOW,
        Terrain::Snow | Terrain::Tundra => colors::WHITE,
        Terrain::Mountain => colors::GRAY,
    }
}

/// Terrain character with overlays, no pieces.
fn tile_char(tile: &Tile, config: &AsciiConfig) -> char {
    if tile.has_village {
        'v'
    } else if config.show_hills && tile.is_hill {
        'n'
    } else if config.show_rivers && tile.has_river() && !tile.terrain.is_water() {
        '='
    } else {
        tile.terrain.glyph()
    }
}

/// Tiles grouped into screen rows, each sorted by column.
fn rows(tiles: &TileMap) -> BTreeMap<i32, Vec<&Tile>> {
    let mut rows: BTreeMap<i32, Vec<&Tile>> = BTreeMap::new();
    for tile in tiles.iter() {
        rows.entry(tile.coord.r).or_default().push(tile);
    }
    for row in rows.values_mut() {
        row.sort_by_key(|t| t.coord.q);
    }
    rows
}

fn render_grid<F>(tiles: &TileMap, config: &AsciiConfig, mut cell: F) -> String
where
    F: FnMut(&Tile) -> (char, &'static str),
{
    let mut output = String::new();
    for (r, row) in rows(tiles) {
        if r.rem_euclid(2) == 1 {
            output.push(' ');
        }
        for tile in row {
            let (ch, color) = cell(tile);
            if config.use_color && !color.is_empty() {
                output.push_str(color);
                output.push(ch);
                output.push_str(colors::RESET);
            } else {
                output.push(ch);
            }
            output.push(' ');
        }
        let trimmed = output.trim_end_matches(' ').len();
        output.truncate(trimmed);
        output.push('\n');
    }
    output
}

fn legend(config: &AsciiConfig, with_pieces: bool) -> String {
    if !config.show_legend {
        return String::new();
    }
    let mut output = String::from("Legend: ");
    for terrain in Terrain::ALL {
        let _ = write!(output, "{}={terrain:?} ", terrain.glyph());
    }
    output.push_str("v=Village ");
    if config.show_hills {
        output.push_str("n=Hill ");
    }
    if config.show_rivers {
        output.push_str("==River ");
    }
    if with_pieces {
        output.push_str("#=City (UPPER=yours lower=others: unit initial)");
    }
    output.trim_end().to_string() + "\n"
}

/// Render a bare map.
pub fn render_map(tiles: &TileMap, config: &AsciiConfig) -> String {
    let mut output = render_grid(tiles, config, |tile| {
        (tile_char(tile, config), terrain_color(tile.terrain))
    });
    output.push_str(&legend(config, false));
    output
}

/// Render a game in progress with cities, units and optional fog.
pub fn render_state(state: &GameState, config: &AsciiConfig) -> String {
    let human = state.human_id();

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{}Turn {}{}",
        if config.use_color { colors::BOLD } else { "" },
        state.turn,
        if config.use_color { colors::RESET } else { "" }
    );

    output.push_str(&render_grid(&state.tiles, config, |tile| {
        if config.fog && !tile.is_discovered {
            return (' ', "");
        }
        if config.show_units {
            if let Some(city) = state.city_at(tile.coord) {
                return ('#', seat_color(state, city.owner));
            }
            let visible = !config.fog || tile.is_visible;
            if let Some(unit) = state.units_at(tile.coord).next().filter(|_| visible) {
                let initial = unit.kind.name().chars().next().unwrap_or('?');
                let ch = if Some(unit.owner) == human {
                    initial.to_ascii_uppercase()
                } else {
                    initial.to_ascii_lowercase()
                };
                return (ch, seat_color(state, unit.owner));
            }
        }
        (tile_char(tile, config), terrain_color(tile.terrain))
    }));

    output.push_str(&legend(config, config.show_units));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use civ_core::hex::Coord;
    use civ_core::map_generation::MapConfig;
    use civ_core::unit_kind::UnitKind;
    use civ_test_utils::fixtures::{place_city, place_unit, TestWorld, HUMAN};

    fn plain() -> AsciiConfig {
        AsciiConfig {
            show_legend: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_one_line_per_row() {
        let map = MapConfig::small().with_seed(4).generate();
        let text = render_map(&map, &plain());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 18);
        for line in &lines {
            assert_eq!(line.split_whitespace().count(), 20);
        }
    }

    #[test]
    fn test_overlays() {
        let state = TestWorld::new(1)
            .with_terrain(Coord::new(1, 0), Terrain::Water)
            .build();
        let mut tiles = state.tiles.clone();
        tiles.get_mut(Coord::new(0, 0)).unwrap().is_hill = true;
        tiles.get_mut(Coord::new(-1, 0)).unwrap().has_village = true;

        let text = render_map(&tiles, &plain());
        assert!(text.contains('n'));
        assert!(text.contains('v'));
        assert!(text.contains('~'));

        let no_hills = AsciiConfig {
            show_hills: false,
            ..plain()
        };
        assert!(!render_map(&tiles, &no_hills).contains('n'));
    }

    #[test]
    fn test_pieces_and_fog() {
        let mut state = TestWorld::new(2).with_ai("Trajan").build();
        place_city(&mut state, HUMAN, Coord::new(0, 0));
        place_unit(&mut state, HUMAN, UnitKind::Warrior, Coord::new(1, 0));
        place_unit(&mut state, PlayerId(1), UnitKind::Scout, Coord::new(-2, 0));

        let text = render_state(&state, &plain());
        assert!(text.starts_with("Turn 1"));
        assert!(text.contains('#'));
        assert!(text.contains('W'));
        assert!(text.contains('s'));

        let fogged = AsciiConfig { fog: true, ..plain() };
        let text = render_state(&state, &fogged);
        assert!(!text.contains('s'));
        assert!(!text.contains('#'));
    }

    #[test]
    fn test_legend_lists_terrain() {
        let map = MapConfig::small().with_seed(4).generate();
        let text = render_map(&map, &AsciiConfig::default());
        assert!(text.contains("~=Water"));
        assert!(text.contains("^=Mountain"));
    }

    #[test]
    fn test_color_wraps_cells() {
        let state = TestWorld::new(1).build();
        let config = AsciiConfig {
            use_color: true,
            ..plain()
        };
        assert!(render_map(&state.tiles, &config).contains(colors::RESET));
    }
}
