//! Projectiles and hit resolution
//!
//! Projectiles live in continuous coordinates and integrate every other
//! simulation tick. Each step resolves against the world in a fixed
//! order: wall, then crate, then enemies along the traveled ray, then
//! the boss.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::entities::boss::Boss;
use crate::entities::enemy::Enemy;
use crate::game::events::GameEvent;
use crate::progression::items::WeaponKind;
use crate::world::spatial::{CrateGrid, Position, WallGrid};

use super::status;
use crate::entities::creature::CharacterKind;

/// Integration steps a projectile survives.
pub const PROJECTILE_LIFE: u32 = 30;
/// Score for killing a walker.
pub const WALKER_SCORE: u32 = 30;
/// Chest drop chance from a slain walker.
pub const WALKER_CHEST_CHANCE: f64 = 0.25;
/// Base chest drop chance from a broken wall or crate.
pub const RUBBLE_CHEST_CHANCE: f64 = 0.04;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub damage: f32,
    pub weapon: WeaponKind,
    pub owner: CharacterKind,
    pub life: u32,
    pub pierce_left: u32,
    pub bounces_left: u32,
    /// Cannon stack depth; zero for everything else.
    pub heavy_stack: u32,
    pub crit: bool,
}

impl Projectile {
    pub fn tile(&self) -> Position {
        Position::new(self.x.round() as i32, self.y.round() as i32)
    }

    fn is_heavy(&self) -> bool {
        self.heavy_stack > 0
    }
}

/// Tunables the resolver reads from the shared inventory.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombatStats {
    /// Plasma stack depth, for chain radius.
    pub plasma_stack: u32,
    /// Lucky total, added to drop chances.
    pub lucky: f64,
    /// Miner total, xp per wall/crate destroyed.
    pub miner: f32,
}

/// Side effects of a resolution pass, applied by the caller.
#[derive(Debug, Clone, Default)]
pub struct CombatGains {
    pub xp: f32,
    pub score: u32,
    /// Chests dropped by kills and rubble.
    pub chests: Vec<Position>,
    /// Ember drops from slain walkers.
    pub ember_drops: Vec<Position>,
    pub boss_killed: bool,
}

/// Integrate and resolve every live projectile once.
pub fn update_projectiles(
    projectiles: &mut Vec<Projectile>,
    walls: &mut WallGrid,
    crates: &mut CrateGrid,
    enemies: &mut [Enemy],
    mut boss: Option<&mut Boss>,
    rng: &mut StdRng,
    stats: &CombatStats,
    events: &mut Vec<GameEvent>,
) -> CombatGains {
    let mut gains = CombatGains::default();

    let mut index = 0;
    while index < projectiles.len() {
        let keep = step_projectile(
            &mut projectiles[index],
            walls,
            crates,
            enemies,
            boss.as_deref_mut(),
            rng,
            stats,
            events,
            &mut gains,
        );
        if keep {
            index += 1;
        } else {
            projectiles.swap_remove(index);
        }
    }
    gains
}

/// Advance one projectile one step. Returns false when it is spent.
#[allow(clippy::too_many_arguments)]
fn step_projectile(
    proj: &mut Projectile,
    walls: &mut WallGrid,
    crates: &mut CrateGrid,
    enemies: &mut [Enemy],
    mut boss: Option<&mut Boss>,
    rng: &mut StdRng,
    stats: &CombatStats,
    events: &mut Vec<GameEvent>,
    gains: &mut CombatGains,
) -> bool {
    if proj.life == 0 {
        return false;
    }
    proj.life -= 1;

    let prev = (proj.x, proj.y);
    proj.x += proj.vx;
    proj.y += proj.vy;
    let tile = proj.tile();

    // --- Wall ---
    if walls.contains(tile.x, tile.y) {
        if proj.is_heavy() {
            detonate(tile, proj.heavy_stack, walls, crates, enemies, boss, rng, stats, events, gains);
            return false;
        }
        if proj.pierce_left > 0 {
            if walls.apply_pierce(tile.x, tile.y, proj.damage) {
                rubble_destroyed(tile, rng, stats, events, gains, true);
            }
            proj.pierce_left -= 1;
            return true;
        }
        if proj.bounces_left > 0 {
            proj.bounces_left -= 1;
            // Step back out of the wall and reflect whichever axis ran
            // into one.
            proj.x = prev.0;
            proj.y = prev.1;
            let ahead_x = Position::new((proj.x + proj.vx).round() as i32, proj.y.round() as i32);
            if walls.contains(ahead_x.x, ahead_x.y) {
                proj.vx = -proj.vx;
            } else {
                proj.vy = -proj.vy;
            }
            return true;
        }
        return false;
    }

    // --- Crate ---
    if crates.contains(tile.x, tile.y) {
        if proj.is_heavy() {
            detonate(tile, proj.heavy_stack, walls, crates, enemies, boss, rng, stats, events, gains);
            return false;
        }
        if crates.damage(tile.x, tile.y, proj.damage) {
            rubble_destroyed(tile, rng, stats, events, gains, false);
        }
        if proj.pierce_left > 0 {
            proj.pierce_left -= 1;
            return true;
        }
        return false;
    }

    // --- Enemies, sampled along the traveled ray ---
    let speed = (proj.vx.abs()).max(proj.vy.abs()).max(0.1);
    let samples = (speed * 2.0).ceil() as i32;
    for step in 1..=samples {
        let t = step as f32 / samples as f32;
        let sample = Position::new(
            (prev.0 + (proj.x - prev.0) * t).round() as i32,
            (prev.1 + (proj.y - prev.1) * t).round() as i32,
        );
        if let Some(hit) = enemies
            .iter()
            .position(|e| !e.dead && e.covers(sample))
        {
            status::apply_on_hit(rng, proj.weapon, proj.owner, &mut enemies[hit].status);
            let killed = enemies[hit].take_damage(proj.damage);
            if proj.weapon == WeaponKind::Plasma && stats.plasma_stack > 0 {
                chain_lightning(hit, proj.damage, stats.plasma_stack, enemies, events, gains, rng, stats);
            }
            if killed {
                walker_killed(&enemies[hit], rng, stats, events, gains);
            }
            if proj.is_heavy() {
                detonate(sample, proj.heavy_stack, walls, crates, enemies, boss, rng, stats, events, gains);
            }
            return false;
        }
    }

    // --- Boss ---
    if let Some(b) = boss.as_deref_mut() {
        if b.is_alive() && b.covers(tile) {
            status::apply_on_hit(rng, proj.weapon, proj.owner, &mut b.status);
            if b.take_damage(proj.damage) {
                gains.boss_killed = true;
            }
            if proj.is_heavy() {
                detonate(tile, proj.heavy_stack, walls, crates, enemies, Some(b), rng, stats, events, gains);
            }
            return false;
        }
    }

    true
}

/// Plasma splash: half damage to every other walker within a Manhattan
/// radius that widens with the stack.
#[allow(clippy::too_many_arguments)]
fn chain_lightning(
    source: usize,
    damage: f32,
    plasma_stack: u32,
    enemies: &mut [Enemy],
    events: &mut Vec<GameEvent>,
    gains: &mut CombatGains,
    rng: &mut StdRng,
    stats: &CombatStats,
) {
    let radius = 2 + (plasma_stack.saturating_sub(1)) as i32;
    let origin = enemies[source].pos;
    let mut chained = false;
    for i in 0..enemies.len() {
        if i == source || enemies[i].dead {
            continue;
        }
        if enemies[i].pos.manhattan_distance(&origin) <= radius {
            chained = true;
            if enemies[i].take_damage(damage * 0.5) {
                walker_killed(&enemies[i], rng, stats, events, gains);
            }
        }
    }
    if chained {
        events.push(GameEvent::LightningChained { from: origin });
    }
}

/// Cannon shell explosion: clears walls and crates within the radius,
/// damages walkers, and clips the boss if the blast reaches its rect.
#[allow(clippy::too_many_arguments)]
fn detonate(
    center: Position,
    heavy_stack: u32,
    walls: &mut WallGrid,
    crates: &mut CrateGrid,
    enemies: &mut [Enemy],
    boss: Option<&mut Boss>,
    rng: &mut StdRng,
    stats: &CombatStats,
    events: &mut Vec<GameEvent>,
    gains: &mut CombatGains,
) {
    let radius = 1.0 + (heavy_stack.saturating_sub(1)) as f32;
    let reach = radius.ceil() as i32;
    events.push(GameEvent::Explosion { at: center, radius });

    for dx in -reach..=reach {
        for dy in -reach..=reach {
            let dist = ((dx * dx + dy * dy) as f32).sqrt();
            if dist > radius {
                continue;
            }
            let (x, y) = (center.x + dx, center.y + dy);
            if walls.remove(x, y) {
                rubble_destroyed(Position::new(x, y), rng, stats, events, gains, true);
            }
            if crates.remove(x, y) {
                rubble_destroyed(Position::new(x, y), rng, stats, events, gains, false);
            }
        }
    }

    let blast_damage = 20.0 + 10.0 * heavy_stack as f32;
    for i in 0..enemies.len() {
        if enemies[i].dead {
            continue;
        }
        let dist = enemies[i].pos.manhattan_distance(&center);
        if dist as f32 <= radius + 1.0 && enemies[i].take_damage(blast_damage) {
            walker_killed(&enemies[i], rng, stats, events, gains);
        }
    }

    if let Some(b) = boss {
        if b.is_alive() {
            let dist = b.center().manhattan_distance(&center) as f32;
            if dist <= radius + b.width as f32 / 2.0 && b.take_damage(blast_damage) {
                gains.boss_killed = true;
            }
        }
    }
}

fn rubble_destroyed(
    at: Position,
    rng: &mut StdRng,
    stats: &CombatStats,
    events: &mut Vec<GameEvent>,
    gains: &mut CombatGains,
    was_wall: bool,
) {
    if was_wall {
        events.push(GameEvent::WallDestroyed { at });
    } else {
        events.push(GameEvent::CrateDestroyed { at });
    }
    gains.xp += stats.miner;
    if rng.gen_bool((RUBBLE_CHEST_CHANCE + stats.lucky).min(1.0)) {
        gains.chests.push(at);
        events.push(GameEvent::ChestDropped { at });
    }
}

fn walker_killed(
    enemy: &Enemy,
    rng: &mut StdRng,
    stats: &CombatStats,
    events: &mut Vec<GameEvent>,
    gains: &mut CombatGains,
) {
    events.push(GameEvent::EnemyKilled { at: enemy.pos });
    gains.score += WALKER_SCORE;
    gains.ember_drops.push(enemy.pos);
    if rng.gen_bool((WALKER_CHEST_CHANCE + stats.lucky).min(1.0)) {
        gains.chests.push(enemy.pos);
        events.push(GameEvent::ChestDropped { at: enemy.pos });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::boss::BossPhase;
    use rand::SeedableRng;

    fn proj(x: f32, y: f32, vx: f32, vy: f32) -> Projectile {
        Projectile {
            x,
            y,
            vx,
            vy,
            damage: 10.0,
            weapon: WeaponKind::Dragonfire,
            owner: CharacterKind::Ember,
            life: PROJECTILE_LIFE,
            pierce_left: 0,
            bounces_left: 0,
            heavy_stack: 0,
            crit: false,
        }
    }

    fn run_once(
        projectiles: &mut Vec<Projectile>,
        walls: &mut WallGrid,
        crates: &mut CrateGrid,
        enemies: &mut [Enemy],
        boss: Option<&mut Boss>,
    ) -> CombatGains {
        let mut rng = StdRng::seed_from_u64(1);
        let mut events = Vec::new();
        update_projectiles(
            projectiles,
            walls,
            crates,
            enemies,
            boss,
            &mut rng,
            &CombatStats::default(),
            &mut events,
        )
    }

    #[test]
    fn test_plain_shot_stops_on_wall() {
        let mut walls = WallGrid::new();
        walls.insert(6, 5);
        let mut crates = CrateGrid::new();
        let mut shots = vec![proj(5.0, 5.0, 1.0, 0.0)];
        run_once(&mut shots, &mut walls, &mut crates, &mut [], None);
        assert!(shots.is_empty());
        assert!(walls.contains(6, 5));
    }

    #[test]
    fn test_piercing_shot_grinds_wall_down() {
        let mut walls = WallGrid::new();
        walls.insert(6, 5);
        let mut crates = CrateGrid::new();
        // 10 damage per pass, threshold 50: five passes break through.
        for _ in 0..5 {
            let mut shot = proj(5.0, 5.0, 1.0, 0.0);
            shot.pierce_left = 1;
            let mut shots = vec![shot];
            run_once(&mut shots, &mut walls, &mut crates, &mut [], None);
        }
        assert!(!walls.contains(6, 5));
    }

    #[test]
    fn test_bounce_reflects_and_survives() {
        let mut walls = WallGrid::new();
        walls.insert(6, 5);
        let mut crates = CrateGrid::new();
        let mut shot = proj(5.0, 5.0, 1.0, 0.0);
        shot.bounces_left = 1;
        let mut shots = vec![shot];
        run_once(&mut shots, &mut walls, &mut crates, &mut [], None);
        assert_eq!(shots.len(), 1);
        assert!(shots[0].vx < 0.0);
        assert_eq!(shots[0].bounces_left, 0);
    }

    #[test]
    fn test_crate_breaks_after_enough_damage() {
        let mut walls = WallGrid::new();
        let mut crates = CrateGrid::new();
        crates.insert(6, 5);
        let mut shots = vec![proj(5.0, 5.0, 1.0, 0.0)];
        let _ = run_once(&mut shots, &mut walls, &mut crates, &mut [], None);
        // One 10-damage hit clears a 5 hp crate.
        assert!(!crates.contains(6, 5));
        assert!(shots.is_empty());
    }

    #[test]
    fn test_fast_shot_cannot_skip_over_enemy() {
        let mut walls = WallGrid::new();
        let mut crates = CrateGrid::new();
        let mut enemies = vec![Enemy::walker(1, Position::new(6, 5))];
        // Two tiles per step would jump clean over (6,5) without ray
        // sampling.
        let mut shots = vec![proj(5.0, 5.0, 2.0, 0.0)];
        run_once(&mut shots, &mut walls, &mut crates, &mut enemies, None);
        assert!(shots.is_empty());
        assert!(enemies[0].hp < enemies[0].max_hp);
    }

    #[test]
    fn test_walker_kill_scores_and_drops_ember() {
        let mut walls = WallGrid::new();
        let mut crates = CrateGrid::new();
        let mut enemies = vec![Enemy::walker(1, Position::new(6, 5))];
        enemies[0].hp = 5.0;
        let mut shots = vec![proj(5.0, 5.0, 1.0, 0.0)];
        let gains = run_once(&mut shots, &mut walls, &mut crates, &mut enemies, None);
        assert!(enemies[0].dead);
        assert_eq!(gains.score, WALKER_SCORE);
        assert_eq!(gains.ember_drops.len(), 1);
    }

    #[test]
    fn test_boss_takes_hits_and_dies() {
        let mut walls = WallGrid::new();
        let mut crates = CrateGrid::new();
        let mut boss = Boss::for_floor(1, Position::new(8, 5), false);
        boss.phase = BossPhase::Active;
        boss.hp = 5.0;
        let mut shots = vec![proj(5.0, 5.0, 1.0, 0.0)];
        let mut gains = CombatGains::default();
        let mut rng = StdRng::seed_from_u64(2);
        let mut events = Vec::new();
        // Step until the shot reaches the boss rect.
        for _ in 0..5 {
            if shots.is_empty() {
                break;
            }
            gains = update_projectiles(
                &mut shots,
                &mut walls,
                &mut crates,
                &mut [],
                Some(&mut boss),
                &mut rng,
                &CombatStats::default(),
                &mut events,
            );
        }
        assert!(gains.boss_killed);
        assert_eq!(boss.phase, BossPhase::Dead);
    }

    #[test]
    fn test_heavy_shell_detonates_on_wall() {
        let mut walls = WallGrid::new();
        walls.insert(6, 5);
        walls.insert(6, 6);
        walls.insert(7, 5);
        let mut crates = CrateGrid::new();
        let mut shot = proj(5.0, 5.0, 1.0, 0.0);
        shot.heavy_stack = 1;
        shot.weapon = WeaponKind::Cannon;
        let mut shots = vec![shot];
        run_once(&mut shots, &mut walls, &mut crates, &mut [], None);
        assert!(shots.is_empty());
        // Radius 1 blast clears the impact tile and orthogonal walls.
        assert!(!walls.contains(6, 5));
        assert!(!walls.contains(6, 6));
        assert!(!walls.contains(7, 5));
    }

    #[test]
    fn test_plasma_chains_to_neighbors() {
        let mut walls = WallGrid::new();
        let mut crates = CrateGrid::new();
        let mut enemies = vec![
            Enemy::walker(1, Position::new(6, 5)),
            Enemy::walker(1, Position::new(7, 5)),
            Enemy::walker(1, Position::new(20, 20)),
        ];
        let mut shot = proj(5.0, 5.0, 1.0, 0.0);
        shot.weapon = WeaponKind::Plasma;
        let mut shots = vec![shot];
        let mut rng = StdRng::seed_from_u64(3);
        let mut events = Vec::new();
        update_projectiles(
            &mut shots,
            &mut walls,
            &mut crates,
            &mut enemies,
            None,
            &mut rng,
            &CombatStats {
                plasma_stack: 1,
                ..Default::default()
            },
            &mut events,
        );
        assert!(enemies[1].hp < enemies[1].max_hp, "neighbor untouched");
        assert_eq!(enemies[2].hp, enemies[2].max_hp, "distant walker hit");
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::LightningChained { .. })));
    }

    #[test]
    fn test_projectile_expires() {
        let mut walls = WallGrid::new();
        let mut crates = CrateGrid::new();
        let mut shot = proj(5.0, 5.0, 0.5, 0.0);
        shot.life = 1;
        let mut shots = vec![shot];
        run_once(&mut shots, &mut walls, &mut crates, &mut [], None);
        assert_eq!(shots.len(), 1);
        run_once(&mut shots, &mut walls, &mut crates, &mut [], None);
        assert!(shots.is_empty());
    }
}
