//! Game setup.

use std::f64::consts::TAU;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::hex::Coord;
use crate::map::TileMap;
use crate::map_generation::generate_map;
use crate::player::{DiplomaticRelation, Player, PlayerId, PlayerKind};
use crate::settings::{ConfigError, GameSettings};
use crate::state::{GameState, SYSTEM_SENDER};
use crate::terrain::Terrain;
use crate::unit_kind::UnitKind;

/// AI leader names, in seat order.
pub const AI_LEADERS: [&str; 4] = ["Gilgamesh", "Cleopatra", "Qin Shi Huang", "Trajan"];

/// Name of the barbarian player.
pub const BARBARIAN_NAME: &str = "Barbarians";

/// Starting gold for the human.
pub const HUMAN_START_GOLD: i32 = 100;

/// Starting gold for each AI.
pub const AI_START_GOLD: i32 = 50;

/// Opening line of every game log.
pub const WELCOME_MESSAGE: &str = "The dawn of history has arrived!";

/// Build the opening state for `settings`.
///
/// The human sits in seat 0, AIs follow, the barbarians come last. Every
/// civilization gets a settler and a warrior near an anchor on a circle
/// around the map center.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] if the settings fail validation.
pub fn start_game(settings: &GameSettings) -> Result<GameState, ConfigError> {
    settings.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(settings.seed);
    let (width, height) = settings.map_size.dimensions();
    let tiles = generate_map(width, height, &mut rng);

    let players = seat_players(settings);
    let civilizations: Vec<PlayerId> = players
        .iter()
        .filter(|p| !p.is_barbarian())
        .map(|p| p.id)
        .collect();

    let mut state = GameState::new(tiles, players, settings.seed);
    // Continue the stream the map was drawn from.
    state.rng = rng;

    let radius = f64::from(width.min(height)) / 2.0 - 4.0;
    for (index, &player) in civilizations.iter().enumerate() {
        let angle = index as f64 * TAU / civilizations.len() as f64;
        let anchor = Coord::new(
            (radius * angle.cos()).floor() as i32,
            (radius * angle.sin()).floor() as i32,
        );
        place_start_units(&mut state, player, anchor);
    }

    state.log(SYSTEM_SENDER, WELCOME_MESSAGE);
    state.refresh_visibility();

    tracing::info!(
        seed = settings.seed,
        players = settings.player_count,
        tiles = state.tiles.len(),
        "game started"
    );
    Ok(state)
}

fn seat_players(settings: &GameSettings) -> Vec<Player> {
    let mut players = vec![Player::new(PlayerId(0), settings.player_name.clone(), PlayerKind::Human)
        .with_gold(HUMAN_START_GOLD)];

    for seat in 1..settings.player_count {
        let name = AI_LEADERS[(seat as usize - 1) % AI_LEADERS.len()];
        players.push(Player::new(PlayerId(seat), name, PlayerKind::Ai).with_gold(AI_START_GOLD));
    }
    players.push(Player::new(
        PlayerId(settings.player_count),
        BARBARIAN_NAME,
        PlayerKind::Barbarian,
    ));

    let kinds: Vec<(PlayerId, bool)> = players.iter().map(|p| (p.id, p.is_barbarian())).collect();
    for player in &mut players {
        for &(other, other_is_barbarian) in &kinds {
            if other != player.id {
                let relation = DiplomaticRelation::initial(player.is_barbarian() || other_is_barbarian);
                player.diplomacy.insert(other, relation);
            }
        }
    }
    players
}

/// Nearest settleable tile to `anchor`. Ties go to the earlier tile.
fn start_tile(tiles: &TileMap, anchor: Coord) -> Option<Coord> {
    tiles
        .iter()
        .filter(|t| t.terrain.is_habitable())
        .min_by_key(|t| t.coord.distance(anchor))
        .map(|t| t.coord)
}

fn place_start_units(state: &mut GameState, player: PlayerId, anchor: Coord) {
    let Some(home) = start_tile(&state.tiles, anchor) else {
        tracing::warn!(%player, %anchor, "no land for start units");
        return;
    };

    let settler = state.spawn_unit(player, UnitKind::Settler, home);
    let escort = home.neighbors().into_iter().find(|&n| {
        state
            .tiles
            .get(n)
            .is_some_and(|t| !matches!(t.terrain, Terrain::Water | Terrain::Mountain))
    });
    let warrior = escort.map(|coord| state.spawn_unit(player, UnitKind::Warrior, coord));

    for id in [Some(settler), warrior].into_iter().flatten() {
        if let Some(unit) = state.units.get_mut(&id) {
            unit.moves_left = unit.max_moves;
        }
    }
}
