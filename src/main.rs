//! Wyrmdelve - headless soak driver
//!
//! Runs the simulation with scripted random steering and logs the
//! semantic event stream. Useful for exercising a whole run end to end
//! without a front end attached.

use anyhow::Result;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use wyrmdelve::world::rooms::Direction;
use wyrmdelve::{Difficulty, Game, GameEvent, GameSettings, Intent, PlayerId, RunPhase};
use wyrmdelve::entities::creature::CharacterKind;

/// Ticks to simulate before giving up on the run.
const MAX_TICKS: u64 = 200_000;
/// How often the driver considers a random turn, in ticks.
const STEER_INTERVAL: u64 = 24;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting Wyrmdelve v{}", env!("CARGO_PKG_VERSION"));

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xD24C0);
    let mut steer = StdRng::seed_from_u64(seed ^ 0x5EED);

    let mut game = Game::new(GameSettings {
        difficulty: Difficulty::Normal,
        characters: vec![CharacterKind::Ember],
        seed: Some(seed),
    });

    for _ in 0..MAX_TICKS {
        if game.tick % STEER_INTERVAL == 0 {
            let dir = match steer.gen_range(0..4) {
                0 => Direction::Up,
                1 => Direction::Down,
                2 => Direction::Left,
                _ => Direction::Right,
            };
            game.submit(PlayerId::One, Intent::Turn(dir));
        }

        game.advance();

        match game.phase() {
            RunPhase::ChoosingReward => {
                let pick = steer.gen_range(0..game.pending_rewards().len().max(1));
                game.submit(PlayerId::One, Intent::Confirm(pick));
            }
            RunPhase::GameOver | RunPhase::Victory => {}
            RunPhase::Running => {}
        }

        for event in game.drain_events() {
            match event {
                GameEvent::LevelUp { level } => log::info!("level {}", level),
                GameEvent::BossStirred { name } => log::info!("{} stirs", name),
                GameEvent::BossAppeared { name } => log::info!("{} appears", name),
                GameEvent::BossDefeated { name } => log::info!("{} falls", name),
                GameEvent::FloorAdvanced { floor } => log::info!("floor {}", floor),
                GameEvent::Victory => log::info!("victory"),
                GameEvent::GameOver => log::info!("game over"),
                other => log::debug!("{:?}", other),
            }
        }

        if matches!(game.phase(), RunPhase::GameOver | RunPhase::Victory) {
            break;
        }
    }

    let snap = game.snapshot();
    log::info!(
        "run ended: {:?} after {} ticks, floor {}, level {}, score {}",
        snap.phase,
        snap.tick,
        snap.hud.floor,
        snap.hud.level,
        snap.hud.score
    );
    Ok(())
}
