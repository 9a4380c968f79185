//! Boss and walker behavior
//!
//! The boss gate handles the dormant-to-active transition and the lair
//! lockdown. Floors 1 and 2 chase on a fixed cadence; floor 3 runs the
//! telegraphed dash machine every tick. Walkers shamble toward the
//! nearest head on movement ticks when a player is close enough to
//! smell.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::entities::boss::{BossPhase, DashStage, DASH_DURATION_TICKS, DASH_PREPARE_TICKS};
use crate::game::events::GameEvent;
use crate::game::state::{Game, RunPhase};
use crate::game::tick::WALKER_CONTACT_DAMAGE;
use crate::progression::items::PassiveKind;
use crate::progression::items::WeaponKind;
use crate::world::generation;
use crate::world::rooms::room_key_of;
use crate::world::spatial::Position;

/// Base chance per movement tick that a walker steps.
const WALKER_STEP_CHANCE: f64 = 0.3;
/// Damage a walker takes when it bites into armored coils.
const WALKER_BITE_RECOIL: f32 = 10.0;

impl Game {
    // ========================================================================
    // Boss gate
    // ========================================================================

    /// Dormant-to-active machinery. A head crossing into the lair slams
    /// the doors and starts the countdown; the countdown drains by the
    /// party's current movement delay, so faster parties get less time
    /// to set up.
    pub(crate) fn update_boss_gate(&mut self, delay: u64) {
        match self.world.boss.phase {
            BossPhase::Dormant => {
                let Some(lair) = self.world.graph.boss_room() else {
                    return;
                };
                let lair_key = lair.key();
                if !self
                    .creatures
                    .iter()
                    .any(|c| room_key_of(c.head()) == lair_key)
                {
                    return;
                }
                let lair = lair.clone();
                for &dir in &lair.connections {
                    for (x, y) in generation::door_cells(&lair, dir) {
                        self.world.walls.insert(x, y);
                        self.world.boss_lock.push((x, y));
                    }
                }
                self.world.boss.phase = BossPhase::Spawning;
                self.events.push(GameEvent::BossStirred {
                    name: self.world.boss.name,
                });
                log::info!("{} stirs on floor {}", self.world.boss.name, self.floor);
            }
            BossPhase::Spawning => {
                self.world.boss.spawn_timer -= delay as f32;
                if self.world.boss.spawn_timer <= 0.0 {
                    self.world.boss.phase = BossPhase::Active;
                    self.events.push(GameEvent::BossAppeared {
                        name: self.world.boss.name,
                    });
                }
            }
            BossPhase::Active | BossPhase::Dead => {}
        }
    }

    /// Boss kill bookkeeping: score, unlock the lair, drop the exit
    /// portal just inside the old bounding rect.
    pub(crate) fn on_boss_defeated(&mut self) {
        self.score += 5_000;
        self.events.push(GameEvent::BossDefeated {
            name: self.world.boss.name,
        });
        for &(x, y) in &self.world.boss_lock {
            self.world.walls.remove(x, y);
        }
        self.world.boss_lock.clear();
        self.world.boss.trail.clear();
        let portal = self.world.boss.pos.offset(1, 1);
        self.world.exit_portal = Some(portal);
        self.events.push(GameEvent::PortalSpawned { at: portal });
        log::info!("{} defeated, portal at {:?}", self.world.boss.name, portal);
    }

    // ========================================================================
    // Boss behavior
    // ========================================================================

    pub(crate) fn boss_ai(&mut self) {
        if self.world.boss.phase != BossPhase::Active || self.world.boss.status.is_frozen() {
            return;
        }
        if self.floor >= 3 {
            self.boss_dash_ai();
        } else {
            self.boss_chase_ai();
        }
        // Any overlap with a head after moving is a hit.
        let heads: Vec<Position> = self.creatures.iter().map(|c| c.head()).collect();
        if heads.iter().any(|&h| self.world.boss.covers(h)) {
            self.damage_players(WALKER_CONTACT_DAMAGE);
        }
    }

    /// Floors 1 and 2: lumber toward the nearest head every `move_rate`
    /// ticks. Poison gums up the joints and doubles the interval. Coiled
    /// bodies block a chase step; only the dash plows past them.
    fn boss_chase_ai(&mut self) {
        let mut interval = self.world.boss.move_rate as u64;
        if self.world.boss.status.is_poisoned() {
            interval *= 2;
        }
        if self.tick % interval.max(1) != 0 {
            return;
        }
        let center = self.world.boss.center();
        let Some(target) = self.nearest_head(center) else {
            return;
        };
        let dx = (target.x - center.x).signum();
        let dy = (target.y - center.y).signum();
        // Larger axis first, the other as fallback.
        let steps = if (target.x - center.x).abs() >= (target.y - center.y).abs() {
            [(dx, 0), (0, dy)]
        } else {
            [(0, dy), (dx, 0)]
        };
        let bodies: Vec<Position> = self
            .creatures
            .iter()
            .flat_map(|c| c.body.iter().copied())
            .collect();
        for (sx, sy) in steps {
            if (sx, sy) == (0, 0) {
                continue;
            }
            let origin = self.world.boss.pos.offset(sx, sy);
            if self.boss_fits_at(origin)
                && !self
                    .world
                    .boss
                    .footprint_at(origin)
                    .any(|cell| bodies.contains(&cell))
            {
                self.world.boss.pos = origin;
                return;
            }
        }
    }

    /// Floor 3: rest, telegraph, then dash one cell per tick along a
    /// locked axis, scorching a trail behind.
    fn boss_dash_ai(&mut self) {
        let dash = self.world.boss.dash;
        match dash.stage {
            DashStage::Idle => {
                if dash.timer == 0 {
                    self.world.boss.dash.stage = DashStage::Preparing;
                    self.world.boss.dash.timer = DASH_PREPARE_TICKS;
                } else {
                    self.world.boss.dash.timer -= 1;
                }
            }
            DashStage::Preparing => {
                if dash.timer == 0 {
                    let dir = self.roll_dash_direction();
                    self.world.boss.dash.stage = DashStage::Dashing;
                    self.world.boss.dash.timer = DASH_DURATION_TICKS;
                    self.world.boss.dash.dir = dir;
                } else {
                    self.world.boss.dash.timer -= 1;
                }
            }
            DashStage::Dashing => {
                if dash.timer == 0 || dash.dir == (0, 0) {
                    self.world.boss.dash = Default::default();
                    return;
                }
                let origin = self.world.boss.pos.offset(dash.dir.0, dash.dir.1);
                if self.boss_fits_at(origin) {
                    let tail = self.world.boss.pos;
                    self.world.boss.trail.push(tail);
                    self.world.boss.pos = origin;
                    self.world.boss.dash.timer -= 1;
                } else {
                    // Slammed into something; the dash ends here.
                    self.world.boss.dash.timer = 0;
                }
                if self.world.boss.dash.timer == 0 {
                    self.world.boss.dash = Default::default();
                }
            }
        }
    }

    /// Pick a random creature and lock the dash to whichever axis holds
    /// more of the distance toward it.
    fn roll_dash_direction(&mut self) -> (i32, i32) {
        let center = self.world.boss.center();
        let Some(target) = self.creatures.choose(&mut self.rng).map(|c| c.head()) else {
            return (0, 0);
        };
        let dx = target.x - center.x;
        let dy = target.y - center.y;
        if dx == 0 && dy == 0 {
            return (0, 0);
        }
        if dx.abs() >= dy.abs() {
            (dx.signum(), 0)
        } else {
            (0, dy.signum())
        }
    }

    /// Whether the full bounding rect is clear of terrain at an origin.
    fn boss_fits_at(&self, origin: Position) -> bool {
        self.world
            .boss
            .footprint_at(origin)
            .all(|cell| !self.world.is_blocked(cell))
    }

    fn nearest_head(&self, from: Position) -> Option<Position> {
        self.creatures
            .iter()
            .map(|c| c.head())
            .min_by_key(|h| from.manhattan_distance(h))
    }

    // ========================================================================
    // Walkers
    // ========================================================================

    /// One shamble pass, run on movement ticks. Each walker close enough
    /// to a head rolls a step chance, then lurches one tile along a
    /// random axis toward it.
    pub(crate) fn enemy_ai(&mut self) {
        let mist = self.inventory.passive_total(PassiveKind::Mist);
        let detection = (15.0 - mist).max(3.0) as i32;
        let broadside = self.inventory.has_weapon(WeaponKind::Broadside);
        let heads: Vec<Position> = self.creatures.iter().map(|c| c.head()).collect();
        if heads.is_empty() {
            return;
        }
        let bodies: Vec<Position> = self
            .creatures
            .iter()
            .flat_map(|c| c.body.iter().copied())
            .collect();

        let mut retaliation = 0u32;
        for i in 0..self.world.enemies.len() {
            let (pos, frozen, poisoned, dead) = {
                let e = &self.world.enemies[i];
                (e.pos, e.status.is_frozen(), e.status.is_poisoned(), e.dead)
            };
            if dead || frozen {
                continue;
            }
            let Some(&target) = heads.iter().min_by_key(|h| pos.manhattan_distance(h)) else {
                continue;
            };
            if pos.manhattan_distance(&target) > detection {
                continue;
            }
            let mut chance = if poisoned {
                WALKER_STEP_CHANCE / 2.0
            } else {
                WALKER_STEP_CHANCE
            };
            if self.floor >= 3 {
                chance *= 2.0;
            }
            if !self.rng.gen_bool(chance.min(1.0)) {
                continue;
            }

            let dx = (target.x - pos.x).signum();
            let dy = (target.y - pos.y).signum();
            let step = if dx != 0 && (dy == 0 || self.rng.gen_bool(0.5)) {
                (dx, 0)
            } else if dy != 0 {
                (0, dy)
            } else {
                continue;
            };
            let origin = pos.offset(step.0, step.1);

            let footprint: Vec<Position> =
                self.world.enemies[i].footprint_at(origin).collect();
            if footprint.iter().any(|&c| self.world.is_blocked(c)) {
                continue;
            }
            if footprint.iter().any(|c| bodies.contains(c)) {
                // Biting into the coils. Spined broadside plating bites
                // back; otherwise the walker just bounces off.
                if broadside {
                    retaliation += 1;
                    let recoil = WALKER_BITE_RECOIL + self.xp.level as f32;
                    if self.world.enemies[i].take_damage(recoil) {
                        let at = self.world.enemies[i].pos;
                        self.on_walker_killed(at);
                    }
                }
                continue;
            }
            self.world.enemies[i].pos = origin;
        }
        if retaliation > 0 {
            self.damage_players(WALKER_CONTACT_DAMAGE);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::creature::CharacterKind;
    use crate::entities::enemy::Enemy;
    use crate::game::state::GameSettings;
    use crate::progression::difficulty::Difficulty;

    fn seeded_game() -> Game {
        Game::new(GameSettings {
            difficulty: Difficulty::Normal,
            characters: vec![CharacterKind::Ember],
            seed: Some(4242),
        })
    }

    /// Teleport the party into the boss lair without walking there.
    fn enter_lair(game: &mut Game) {
        let center = game
            .world
            .graph
            .boss_room()
            .map(|r| r.center())
            .unwrap_or_default();
        let head = game.creatures[0].head();
        // Land beside the boss rect, not inside it.
        let target = center.offset(-6, 0);
        game.creatures[0].translate(target.x - head.x, target.y - head.y);
    }

    #[test]
    fn test_boss_wakes_when_lair_entered() {
        let mut game = seeded_game();
        assert_eq!(game.world.boss.phase, BossPhase::Dormant);
        game.update_boss_gate(8);
        assert_eq!(game.world.boss.phase, BossPhase::Dormant, "woke too early");

        enter_lair(&mut game);
        game.update_boss_gate(8);
        assert_eq!(game.world.boss.phase, BossPhase::Spawning);
        assert!(!game.world.boss_lock.is_empty(), "doors not locked");
        for &(x, y) in &game.world.boss_lock {
            assert!(game.world.walls.contains(x, y));
        }
        let events = game.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::BossStirred { .. })));
    }

    #[test]
    fn test_spawn_countdown_drains_by_delay() {
        let mut game = seeded_game();
        enter_lair(&mut game);
        game.update_boss_gate(8);
        // 60 / 8 rounds up to 8 gate ticks.
        for _ in 0..8 {
            game.update_boss_gate(8);
        }
        assert_eq!(game.world.boss.phase, BossPhase::Active);
        let events = game.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::BossAppeared { .. })));
    }

    #[test]
    fn test_boss_defeat_unlocks_doors_and_drops_portal() {
        let mut game = seeded_game();
        enter_lair(&mut game);
        game.update_boss_gate(8);
        let locked = game.world.boss_lock.clone();
        game.on_boss_defeated();
        assert!(game.world.boss_lock.is_empty());
        for (x, y) in locked {
            assert!(!game.world.walls.contains(x, y));
        }
        assert_eq!(
            game.world.exit_portal,
            Some(game.world.boss.pos.offset(1, 1))
        );
        let events = game.drain_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::BossDefeated { .. })));
        assert!(events
            .iter()
            .any(|e| matches!(e, GameEvent::PortalSpawned { .. })));
    }

    #[test]
    fn test_chase_closes_distance() {
        let mut game = seeded_game();
        enter_lair(&mut game);
        game.world.boss.phase = BossPhase::Active;
        let head = game.creatures[0].head();
        let before = game.world.boss.center().manhattan_distance(&head);
        for _ in 0..40 {
            game.tick += 1;
            game.boss_ai();
        }
        let after = game.world.boss.center().manhattan_distance(&head);
        assert!(after < before, "boss never closed in ({before} -> {after})");
    }

    #[test]
    fn test_chase_never_steps_onto_creature_body() {
        let mut game = seeded_game();
        enter_lair(&mut game);
        game.world.boss.phase = BossPhase::Active;
        // Park the body column flush against the rect's west edge, right
        // in the chase path.
        let boss_pos = game.world.boss.pos;
        let head = game.creatures[0].head();
        game.creatures[0].translate(boss_pos.x - 1 - head.x, boss_pos.y - head.y);
        for _ in 0..40 {
            game.tick += 1;
            game.boss_ai();
            let overlapped = game.creatures[0]
                .body
                .iter()
                .any(|&seg| game.world.boss.covers(seg));
            assert!(!overlapped, "boss stepped onto a body segment");
        }
    }

    #[test]
    fn test_frozen_boss_holds_still() {
        let mut game = seeded_game();
        enter_lair(&mut game);
        game.world.boss.phase = BossPhase::Active;
        game.world.boss.status.freeze();
        let pos = game.world.boss.pos;
        for _ in 0..20 {
            game.tick += 1;
            game.boss_ai();
        }
        assert_eq!(game.world.boss.pos, pos);
    }

    #[test]
    fn test_dash_machine_cycles_and_leaves_trail() {
        let mut game = Game::new(GameSettings {
            difficulty: Difficulty::Normal,
            characters: vec![CharacterKind::Ember],
            seed: Some(4242),
        });
        game.floor = 3;
        enter_lair(&mut game);
        game.world.boss.phase = BossPhase::Active;
        // Rush through idle and telegraph.
        game.world.boss.dash.timer = 0;
        game.boss_ai();
        assert_eq!(game.world.boss.dash.stage, DashStage::Preparing);
        game.world.boss.dash.timer = 0;
        game.boss_ai();
        assert_eq!(game.world.boss.dash.stage, DashStage::Dashing);

        let start = game.world.boss.pos;
        for _ in 0..DASH_DURATION_TICKS + 2 {
            game.boss_ai();
        }
        // Dash always terminates back in idle, whatever it hit.
        assert_eq!(game.world.boss.dash.stage, DashStage::Idle);
        if game.world.boss.pos != start {
            assert!(!game.world.boss.trail.is_empty());
        }
    }

    #[test]
    fn test_distant_walker_ignores_party() {
        let mut game = seeded_game();
        game.world.enemies.clear();
        let head = game.creatures[0].head();
        let far = head.offset(20, 20);
        game.world.enemies.push(Enemy::walker(1, far));
        for _ in 0..50 {
            game.enemy_ai();
        }
        assert_eq!(game.world.enemies[0].pos, far);
    }

    #[test]
    fn test_nearby_walker_approaches() {
        let mut game = seeded_game();
        game.world.enemies.clear();
        let head = game.creatures[0].head();
        let near = head.offset(5, 0);
        game.world.enemies.push(Enemy::walker(1, near));
        let before = near.manhattan_distance(&head);
        for _ in 0..60 {
            game.enemy_ai();
        }
        let after = game.world.enemies[0].pos.manhattan_distance(&head);
        assert!(after < before, "walker never approached");
    }

    #[test]
    fn test_mist_shrinks_detection() {
        let mut game = seeded_game();
        game.world.enemies.clear();
        for _ in 0..4 {
            game.inventory.acquire_passive(PassiveKind::Mist);
        }
        // 15 - 12 = 3: a walker five tiles out no longer smells anyone.
        let head = game.creatures[0].head();
        let near = head.offset(5, 0);
        game.world.enemies.push(Enemy::walker(1, near));
        for _ in 0..60 {
            game.enemy_ai();
        }
        assert_eq!(game.world.enemies[0].pos, near);
    }

    #[test]
    fn test_walker_biting_coils_takes_recoil() {
        let mut game = seeded_game();
        game.inventory.acquire_weapon(WeaponKind::Broadside);
        game.world.enemies.clear();
        let head = game.creatures[0].head();
        // Adjacent to a body segment, so any step toward it bites.
        let spot = head.offset(1, 1);
        game.world.enemies.push(Enemy::walker(1, spot));
        let hp = game.world.enemies[0].max_hp;
        for _ in 0..80 {
            game.enemy_ai();
            if game.world.enemies.is_empty() || game.world.enemies[0].hp < hp {
                break;
            }
        }
        let bitten = game
            .world
            .enemies
            .first()
            .map(|e| e.hp < hp || e.dead)
            .unwrap_or(true);
        assert!(bitten, "walker never bit the coils");
    }
}
