//! Gundown headless runner
//!
//! Plays a scripted three-player match on the stock arena and logs what
//! happens. Useful for soak-testing the simulation without a renderer.
//!
//! ```text
//! gundown [config.json] [max_ticks]
//! ```

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use gundown::{
    TICK_RATE, VERSION,
    game::{
        ability::AbilityCard,
        events::GameEventData,
        input::{GamepadFrame, InputFrame, MouseFrame},
        round::{DraftContext, DraftScreen},
        state::{Color, ControlScheme, MatchState, PlayerId, PlayerState},
        tick::tick,
    },
    Map, MatchConfig, Vec2,
};

/// Two minutes of play
const DEFAULT_MAX_TICKS: u64 = 120 * TICK_RATE as u64;

fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => MatchConfig::load(&path).with_context(|| format!("loading {}", path))?,
        None => MatchConfig::default(),
    };
    let max_ticks = match args.next() {
        Some(n) => n.parse().with_context(|| format!("bad tick count {:?}", n))?,
        None => DEFAULT_MAX_TICKS,
    };

    info!("Gundown v{}", VERSION);
    info!("Tick Rate: {} Hz, first to {}", config.tick_rate, config.win_score);

    let state = demo_match(&config, max_ticks)?;

    let snapshot = serde_json::to_string_pretty(&state).context("serializing final state")?;
    debug!("Final state:\n{}", snapshot);
    Ok(())
}

/// Picks whichever offered card it has seen drafted least often.
#[derive(Default)]
struct RotatingDraft {
    taken: BTreeMap<String, u32>,
}

impl DraftScreen for RotatingDraft {
    fn pick(&mut self, ctx: &DraftContext, player: &PlayerState, offered: &[AbilityCard]) -> Option<usize> {
        let (index, card) = offered
            .iter()
            .enumerate()
            .min_by_key(|(_, card)| self.taken.get(&card.name).copied().unwrap_or(0))?;
        *self.taken.entry(card.name.clone()).or_default() += 1;
        info!("Round {} draft: {} takes {:?}", ctx.round, player.id, card.name);
        Some(index)
    }
}

/// Scripted input: everyone chases and shoots at the next player over.
fn scripted_input(state: &MatchState, id: PlayerId, t: u64) -> InputFrame {
    let Some(me) = state.get_player(&id) else {
        return InputFrame::Idle;
    };
    let target = state
        .players
        .values()
        .filter(|p| p.id != id && !p.is_dead)
        .map(|p| p.center())
        .next()
        .unwrap_or(me.center());
    let toward = if target.x > me.center().x { 1.0 } else { -1.0 };
    let wander = ((t / 90 + id.0 as u64) % 3) as f32 - 1.0;

    match me.scheme {
        ControlScheme::Mouse => {
            let mut frame = MouseFrame::new(target).with(MouseFrame::FLAG_FIRE);
            frame = frame.with(if toward + wander > 0.0 { MouseFrame::FLAG_RIGHT } else { MouseFrame::FLAG_LEFT });
            if t % 45 == 0 {
                frame = frame.with(MouseFrame::FLAG_JUMP);
            }
            if t % 600 == 300 {
                frame = frame.with(MouseFrame::FLAG_SHIELD);
            }
            InputFrame::Mouse(frame)
        }
        ControlScheme::Gamepad { .. } => {
            let aim = Vec2::new(target.x - me.center().x, target.y - me.center().y);
            let length = aim.length().max(1.0);
            let mut frame = GamepadFrame {
                move_stick: Vec2::new((toward + wander).clamp(-1.0, 1.0), 0.0),
                aim_stick: aim.scale(1.0 / length),
                fire_trigger: if t % 20 < 12 { 1.0 } else { 0.0 },
                ..Default::default()
            };
            if t % 70 == id.0 as u64 * 10 {
                frame = frame.with(GamepadFrame::BUTTON_JUMP);
            }
            if t % 500 == 250 {
                frame = frame.with(GamepadFrame::BUTTON_SHIELD);
            }
            InputFrame::Gamepad(frame)
        }
    }
}

/// Run a scripted match.
fn demo_match(config: &MatchConfig, max_ticks: u64) -> Result<MatchState> {
    info!("=== Starting Demo Match ===");

    let mut state = MatchState::new(Map::default_arena(), config);
    state.add_player(ControlScheme::Mouse, Color::RED)?;
    state.add_player(ControlScheme::Gamepad { device: 0 }, Color::BLUE)?;
    state.add_player(ControlScheme::Gamepad { device: 1 }, Color::GREEN)?;
    state.start_match()?;

    for player in state.players.values() {
        info!("Added {} ({:?}) at ({:.0}, {:.0})", player.id, player.scheme, player.rect.x, player.rect.y);
    }

    let mut draft = RotatingDraft::default();
    let mut inputs: BTreeMap<PlayerId, InputFrame> = BTreeMap::new();
    let mut total_events = 0;
    let mut shots = 0u64;

    for t in 0..max_ticks {
        inputs.clear();
        for id in state.players.keys() {
            inputs.insert(*id, scripted_input(&state, *id, t));
        }

        let result = tick(&mut state, &inputs, config, &mut draft);
        total_events += result.events.len();

        // Report every 10 seconds
        if t % (10 * config.tick_rate as u64) == 0 {
            info!(
                "Tick {}: round {}, {} alive, {} bullets, {} events so far",
                t,
                state.round,
                state.alive_count(),
                state.bullet_count(),
                total_events
            );
        }

        // Log important events
        for event in &result.events {
            match &event.data {
                GameEventData::ShotFired { .. } => shots += 1,
                GameEventData::PlayerDied { victim_id, killer_id } => {
                    info!("{} killed by {:?}", victim_id, killer_id);
                }
                GameEventData::ObjectDetonated { object_id, bullets, .. } => {
                    info!("Object {:?} detonated ({} bullets)", object_id, bullets);
                }
                GameEventData::WeaponChanged { player_id, archetype } => {
                    info!("{} now holds a {}", player_id, archetype.name());
                }
                _ => {}
            }
        }

        if result.match_ended {
            info!("Match ended at tick {}", state.tick);
            break;
        }
    }

    info!("=== Match Results ===");
    match (state.winner, state.winner_color) {
        (Some(id), Some(color)) => info!("Winner: {} (rgb {}, {}, {})", id, color.r, color.g, color.b),
        _ => info!("No winner after {} ticks", state.tick),
    }
    for player in state.players.values() {
        info!("{}: {} points, {}", player.id, player.score, player.weapon.archetype.name());
    }
    info!("Shots fired: {}, total events: {}", shots, total_events);

    Ok(state)
}
