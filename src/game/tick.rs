//! Simulation Tick
//!
//! One fixed step of the match. Inputs are keyed by `PlayerId` in a
//! `BTreeMap` so players always update in the same order, and every
//! random draw comes from the match RNG, so a recorded input stream
//! replays to the same state.

use std::collections::BTreeMap;

use tracing::trace;

use crate::config::MatchConfig;
use crate::game::events::GameEvent;
use crate::game::input::InputFrame;
use crate::game::player::update_player;
use crate::game::projectile::update_projectiles;
use crate::game::round::{resolve_round, DraftScreen};
use crate::game::state::{MatchPhase, MatchState, PlayerId};

/// Result of a tick.
#[derive(Debug, Default)]
pub struct TickResult {
    /// Events generated this tick
    pub events: Vec<GameEvent>,
    /// Whether the match is over
    pub match_ended: bool,
    /// A draft ran and every player respawned
    pub round_reset: bool,
    /// Winner (once the match is over)
    pub winner: Option<PlayerId>,
}

/// Run one simulation tick.
///
/// Players without an entry in `inputs` are treated as idle. `draft` is
/// only consulted on the tick a round ends.
pub fn tick(
    state: &mut MatchState,
    inputs: &BTreeMap<PlayerId, InputFrame>,
    config: &MatchConfig,
    draft: &mut impl DraftScreen,
) -> TickResult {
    let mut result = TickResult::default();

    match state.phase {
        MatchPhase::Waiting => return result,
        MatchPhase::GameOver => {
            result.match_ended = true;
            result.winner = state.winner;
            return result;
        }
        MatchPhase::RoundActive | MatchPhase::DraftPending => {}
    }

    // 0. Advance clock
    state.tick += 1;
    let now_ms = state.now_ms();
    let tick_no = state.tick;

    // 1. Players: gravity, movement, shield, reload, fire
    for (id, player) in state.players.iter_mut() {
        let intent = inputs.get(id).copied().unwrap_or_default().intent();
        update_player(
            player,
            &mut state.map,
            &intent,
            config,
            now_ms,
            tick_no,
            &mut state.pending_events,
        );
    }

    // 2. Physics blocks fall
    state.map.apply_gravity();

    // 3. Bullets: integrate, bounce, detonate, hit
    update_projectiles(state, config);

    // 4. Drop detonated objects
    let removed = state.map.remove_detonated();
    if removed > 0 {
        trace!("Removed {} detonated objects", removed);
    }

    // 5. Round bookkeeping and draft
    let outcome = resolve_round(state, config, draft);
    result.round_reset = outcome.reset;
    result.match_ended = outcome.game_over;
    result.winner = state.winner;

    result.events = state.take_events();
    result
}

/// Replay a match from recorded inputs.
///
/// Starts the match if it is still in the lobby. Stops early once the
/// match is decided.
pub fn replay_match(
    initial_state: MatchState,
    player_inputs: &BTreeMap<PlayerId, Vec<InputFrame>>,
    tick_count: u32,
    config: &MatchConfig,
    draft: &mut impl DraftScreen,
) -> (MatchState, Vec<GameEvent>) {
    let mut state = initial_state;
    let mut all_events = Vec::new();

    if state.phase == MatchPhase::Waiting && state.start_match().is_ok() {
        all_events.extend(state.take_events());
    }

    for t in 0..tick_count as usize {
        let tick_inputs: BTreeMap<PlayerId, InputFrame> = player_inputs
            .iter()
            .map(|(id, frames)| (*id, frames.get(t).copied().unwrap_or_default()))
            .collect();

        let result = tick(&mut state, &tick_inputs, config, draft);
        all_events.extend(result.events);

        if result.match_ended {
            break;
        }
    }

    (state, all_events)
}
