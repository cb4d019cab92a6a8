//! War, peace and gifts between players.

use rand::Rng;

use crate::error::{GameError, Result};
use crate::math::Fixed;
use crate::player::{DiplomaticRelation, DiplomaticStatus, PlayerId};
use crate::state::{GameState, SYSTEM_SENDER};

/// Base gold cost of a gift.
pub const GIFT_GOLD: u32 = 50;

/// Relationship gained by the receiver of a gift.
pub const GIFT_RELATIONSHIP: u8 = 10;

/// Relationship both sides hold right after a peace deal.
pub const PEACE_RELATIONSHIP: u8 = 30;

/// Chance a peace proposal is accepted.
pub const PEACE_ACCEPT_CHANCE: f64 = 0.5;

/// The relation `from` holds toward `to`, created on first use.
fn relation_mut(state: &mut GameState, from: PlayerId, to: PlayerId) -> Result<&mut DiplomaticRelation> {
    let either_barbarian =
        state.player(from)?.is_barbarian() || state.player(to)?.is_barbarian();
    Ok(state
        .player_mut(from)?
        .diplomacy
        .entry(to)
        .or_insert_with(|| DiplomaticRelation::initial(either_barbarian)))
}

fn check_pair(state: &GameState, a: PlayerId, b: PlayerId) -> Result<()> {
    state.player(a)?;
    state.player(b)?;
    if a == b {
        return Err(GameError::invalid("a player cannot negotiate with itself"));
    }
    Ok(())
}

/// Put `a` and `b` at war in both directions. No-op if already at war.
pub(crate) fn enter_war(state: &mut GameState, a: PlayerId, b: PlayerId) -> Result<()> {
    if state.player(a)?.is_at_war_with(b) && state.player(b)?.is_at_war_with(a) {
        return Ok(());
    }
    for (from, to) in [(a, b), (b, a)] {
        let relation = relation_mut(state, from, to)?;
        relation.status = DiplomaticStatus::War;
        relation.relationship = 0;
        relation.is_open_borders = false;
    }

    let names = (state.player(a)?.name.clone(), state.player(b)?.name.clone());
    tracing::info!(%a, %b, "war declared");
    state.log(SYSTEM_SENDER, format!("{} declared war on {}", names.0, names.1));
    Ok(())
}

/// `a` declares war on `b`.
pub fn declare_war(state: &GameState, a: PlayerId, b: PlayerId) -> Result<GameState> {
    check_pair(state, a, b)?;
    if state.player(a)?.is_at_war_with(b) {
        return Err(GameError::invalid("already at war"));
    }
    let mut next = state.clone();
    enter_war(&mut next, a, b)?;
    Ok(next)
}

/// `a` offers peace to `b`.
///
/// Barbarians never accept. Otherwise the offer is accepted on a coin
/// flip from the game's generator; a refusal is still a successful action
/// that only adds a log line.
pub fn propose_peace(state: &GameState, a: PlayerId, b: PlayerId) -> Result<GameState> {
    check_pair(state, a, b)?;
    if !state.player(a)?.is_at_war_with(b) {
        return Err(GameError::invalid("not at war"));
    }
    if state.player(a)?.is_barbarian() || state.player(b)?.is_barbarian() {
        return Err(GameError::invalid("barbarians do not negotiate"));
    }

    let mut next = state.clone();
    let accepted = next.rng.gen_bool(PEACE_ACCEPT_CHANCE);
    let their_name = next.player(b)?.name.clone();

    if accepted {
        for (from, to) in [(a, b), (b, a)] {
            let relation = relation_mut(&mut next, from, to)?;
            relation.status = DiplomaticStatus::Peace;
            relation.relationship = PEACE_RELATIONSHIP;
        }
        tracing::info!(%a, %b, "peace signed");
        next.log(SYSTEM_SENDER, format!("{their_name} accepted peace"));
    } else {
        next.log(SYSTEM_SENDER, format!("{their_name} refused peace"));
    }
    Ok(next)
}

/// `a` sends a gold gift to `b`, improving how `b` regards `a`.
pub fn send_gift(state: &GameState, a: PlayerId, b: PlayerId) -> Result<GameState> {
    check_pair(state, a, b)?;
    let cost = Fixed::from_num(state.modifiers(a).gift_cost(GIFT_GOLD));
    if state.player(a)?.gold < cost {
        return Err(GameError::invalid("not enough gold for a gift"));
    }

    let mut next = state.clone();
    next.player_mut(a)?.gold -= cost;
    next.player_mut(b)?.gold += cost;
    let relation = relation_mut(&mut next, b, a)?;
    relation.relationship = relation.relationship.saturating_add(GIFT_RELATIONSHIP).min(100);

    let their_name = next.player(b)?.name.clone();
    next.log(SYSTEM_SENDER, format!("Sent {cost} gold to {their_name}"));
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileMap;
    use crate::player::{Player, PlayerKind};
    use crate::policy::Policy;

    fn state() -> GameState {
        let mut human = Player::new(PlayerId(0), "Ada", PlayerKind::Human).with_gold(100);
        let mut ai = Player::new(PlayerId(1), "Trajan", PlayerKind::Ai).with_gold(50);
        let barbs = Player::new(PlayerId(2), "Barbarians", PlayerKind::Barbarian);
        human.diplomacy.insert(PlayerId(1), DiplomaticRelation::initial(false));
        ai.diplomacy.insert(PlayerId(0), DiplomaticRelation::initial(false));
        GameState::new(TileMap::new(), vec![human, ai, barbs], 5)
    }

    #[test]
    fn test_declare_war_is_mutual() {
        let s = declare_war(&state(), PlayerId(0), PlayerId(1)).unwrap();
        assert!(s.player(PlayerId(0)).unwrap().is_at_war_with(PlayerId(1)));
        assert!(s.player(PlayerId(1)).unwrap().is_at_war_with(PlayerId(0)));
        assert_eq!(s.player(PlayerId(1)).unwrap().diplomacy[&PlayerId(0)].relationship, 0);
        assert!(declare_war(&s, PlayerId(1), PlayerId(0)).is_err());
    }

    #[test]
    fn test_peace_needs_war_and_rejects_barbarians() {
        let s = state();
        assert!(propose_peace(&s, PlayerId(0), PlayerId(1)).is_err());
        assert!(propose_peace(&s, PlayerId(0), PlayerId(0)).is_err());
        let s = declare_war(&s, PlayerId(0), PlayerId(2)).unwrap();
        assert!(propose_peace(&s, PlayerId(0), PlayerId(2)).is_err());
    }

    #[test]
    fn test_peace_outcome_is_consistent() {
        let s = declare_war(&state(), PlayerId(0), PlayerId(1)).unwrap();
        let once = propose_peace(&s, PlayerId(0), PlayerId(1)).unwrap();
        let twice = propose_peace(&s, PlayerId(0), PlayerId(1)).unwrap();
        assert_eq!(once, twice);

        let ours = once.player(PlayerId(0)).unwrap().diplomacy[&PlayerId(1)];
        let theirs = once.player(PlayerId(1)).unwrap().diplomacy[&PlayerId(0)];
        assert_eq!(ours.status, theirs.status);
        if ours.status == DiplomaticStatus::Peace {
            assert_eq!(ours.relationship, PEACE_RELATIONSHIP);
        }
    }

    #[test]
    fn test_gift() {
        let s = send_gift(&state(), PlayerId(0), PlayerId(1)).unwrap();
        assert_eq!(s.player(PlayerId(0)).unwrap().gold, Fixed::from_num(50));
        assert_eq!(s.player(PlayerId(1)).unwrap().gold, Fixed::from_num(100));
        assert_eq!(s.player(PlayerId(1)).unwrap().diplomacy[&PlayerId(0)].relationship, 60);

        let s = send_gift(&s, PlayerId(0), PlayerId(1)).unwrap();
        assert!(send_gift(&s, PlayerId(0), PlayerId(1)).is_err());
    }

    #[test]
    fn test_diplomatic_league_halves_gift() {
        let mut s = state();
        s.player_mut(PlayerId(0))
            .unwrap()
            .active_policies
            .insert(Policy::DiplomaticLeague);
        let s = send_gift(&s, PlayerId(0), PlayerId(1)).unwrap();
        assert_eq!(s.player(PlayerId(0)).unwrap().gold, Fixed::from_num(75));
    }
}
