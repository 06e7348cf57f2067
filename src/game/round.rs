//! Round Lifecycle
//!
//! ```text
//!  RoundActive ──(≤ 1 alive)──▶ DraftPending ──(respawn)──▶ RoundActive
//!       │                                                        │
//!       └────────────(survivor reaches win score)───▶ GameOver ◀─┘
//! ```
//!
//! The draft screen is an external collaborator: the core offers each
//! player a few cards, the screen picks one, the core applies it.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::config::MatchConfig;
use crate::game::ability::AbilityCard;
use crate::game::events::GameEvent;
use crate::game::state::{MatchPhase, MatchState, PlayerId, PlayerState};

/// What the draft screen gets to see about the round.
#[derive(Clone, Debug, PartialEq)]
pub struct DraftContext {
    /// Round that just ended
    pub round: u32,
    /// Scores after the round was awarded
    pub scores: BTreeMap<PlayerId, u32>,
    /// Survivor of the round, if any
    pub round_winner: Option<PlayerId>,
}

/// Card picker shown between rounds.
pub trait DraftScreen {
    /// Choose one of `offered` for `player`, by index. `None` skips.
    fn pick(&mut self, ctx: &DraftContext, player: &PlayerState, offered: &[AbilityCard]) -> Option<usize>;
}

/// Always takes the first offered card.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstCardDraft;

impl DraftScreen for FirstCardDraft {
    fn pick(&mut self, _ctx: &DraftContext, _player: &PlayerState, offered: &[AbilityCard]) -> Option<usize> {
        if offered.is_empty() { None } else { Some(0) }
    }
}

/// Outcome of the per-tick round check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundOutcome {
    /// A draft ran and everyone respawned
    pub reset: bool,
    /// The match ended this tick
    pub game_over: bool,
}

/// Append newly dead players to the round's death list (once each).
pub fn record_deaths(state: &mut MatchState) {
    for (id, player) in &state.players {
        if player.is_dead && !state.dead_players.contains(id) {
            state.dead_players.push(*id);
        }
    }
}

/// Disable respawns once a living player has reached the win score.
///
/// A player who is already dead this round never wins, even if tied.
pub fn check_winner(state: &mut MatchState, config: &MatchConfig) -> bool {
    if state.disable_respawns {
        return true;
    }

    let winner = state
        .players
        .values()
        .find(|p| p.score >= config.win_score && !state.dead_players.contains(&p.id))
        .map(|p| (p.id, p.color));

    let Some((id, color)) = winner else {
        return false;
    };
    state.disable_respawns = true;
    state.winner = Some(id);
    state.winner_color = Some(color);
    info!("{} wins the match", id);
    state.push_event(GameEvent::game_over(state.tick, id, color));
    true
}

/// Resolve the round for this tick.
pub fn resolve_round(state: &mut MatchState, config: &MatchConfig, draft: &mut impl DraftScreen) -> RoundOutcome {
    let mut outcome = RoundOutcome::default();

    record_deaths(state);
    check_winner(state, config);

    let alive = state.players.len() - state.dead_players.len();
    if alive > 1 {
        return outcome;
    }

    if !state.disable_respawns {
        let survivor = state.players.values_mut().find(|p| !p.is_dead);
        let (winner_id, new_score) = match survivor {
            Some(player) => {
                player.score += 1;
                (Some(player.id), player.score)
            }
            None => (None, 0),
        };
        info!("Round {} over, survivor: {:?}", state.round, winner_id);
        state.push_event(GameEvent::round_won(state.tick, winner_id, new_score));
        check_winner(state, config);
    }

    if state.disable_respawns {
        state.phase = MatchPhase::GameOver;
        outcome.game_over = true;
        return outcome;
    }

    let round_winner = state.players.values().find(|p| !p.is_dead).map(|p| p.id);
    state.phase = MatchPhase::DraftPending;
    let changed = run_draft(state, config, draft, round_winner);
    for id in changed {
        if let Some(player) = state.players.get(&id) {
            let archetype = player.weapon.archetype;
            state.push_event(GameEvent::weapon_changed(state.tick, id, archetype));
        }
    }

    start_next_round(state);
    outcome.reset = true;
    outcome
}

/// Offer cards to every player and apply the picks.
///
/// Returns the players whose weapon was replaced.
pub fn run_draft(
    state: &mut MatchState,
    config: &MatchConfig,
    draft: &mut impl DraftScreen,
    round_winner: Option<PlayerId>,
) -> Vec<PlayerId> {
    let ctx = DraftContext {
        round: state.round,
        scores: state.players.iter().map(|(id, p)| (*id, p.score)).collect(),
        round_winner,
    };

    let mut changed = Vec::new();
    let ids: Vec<PlayerId> = state.players.keys().copied().collect();
    for id in ids {
        let offered: Vec<AbilityCard> = state
            .rng
            .sample_indices(state.deck.len(), config.draft_offer_size)
            .into_iter()
            .filter_map(|i| state.deck.get(i).cloned())
            .collect();

        let Some(player) = state.players.get_mut(&id) else {
            continue;
        };
        let Some(card) = draft.pick(&ctx, player, &offered).and_then(|i| offered.get(i)) else {
            debug!("{} skipped the draft", id);
            continue;
        };

        if card.apply(player) {
            changed.push(id);
        }
        debug!("{} drafted {}", id, card.name);
        let event = GameEvent::card_drafted(state.tick, id, card.name.as_str());
        state.push_event(event);
    }
    changed
}

/// Revive everyone, flush bullets, and respawn at the fixed corners.
fn start_next_round(state: &mut MatchState) {
    for player in state.players.values_mut() {
        player.is_dead = false;
        player.weapon.clear_bullets();
    }
    state.respawn_all();
    state.dead_players.clear();
    state.round += 1;
    state.phase = MatchPhase::RoundActive;
    info!("Round {} started", state.round);
    state.push_event(GameEvent::round_started(state.tick, state.round));
}
