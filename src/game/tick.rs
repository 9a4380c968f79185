//! The tick pipeline
//!
//! One `advance()` call is one simulation tick. Projectiles integrate
//! every other tick, the magnet pulls every fifth, and bodies move on
//! the cadence derived from level, difficulty, and weapon mass. All
//! collision resolution for creature movement lives here.

use rand::Rng;

use crate::combat::projectile::{self, Projectile, PROJECTILE_LIFE, WALKER_CHEST_CHANCE, WALKER_SCORE};
use crate::combat::status::POISON_DAMAGE;
use crate::entities::boss::BossPhase;
use crate::entities::creature::CharacterKind;
use crate::entities::pickups::{Chest, Food, FoodKind};
use crate::game::events::GameEvent;
use crate::game::state::{Game, RunPhase, DEVOUR_COOLDOWN_BASE, HEADBUTT_CHEST_CHANCE, REGEN_INTERVAL};
use crate::progression::inventory;
use crate::progression::items::{PassiveKind, WeaponKind};
use crate::progression::rewards;
use crate::world::rooms::{room_key_of, Direction, ROOM_HEIGHT, ROOM_WIDTH};
use crate::world::spatial::Position;

/// Contact damage from walking into a live walker (and from a walker
/// shambling into a body).
pub(crate) const WALKER_CONTACT_DAMAGE: f32 = 20.0;
/// Damage from biting your own (or your partner's) body.
const SELF_BITE_DAMAGE: f32 = 10.0;

impl Game {
    /// Advance the simulation one tick. Does nothing while paused, dead,
    /// victorious, or frozen on a reward choice (intents still queue).
    pub fn advance(&mut self) {
        if self.paused || self.phase != RunPhase::Running {
            return;
        }
        self.tick += 1;
        let delay = self.move_delay();

        if self.invincible > 0 {
            self.invincible -= 1;
        }
        if self.devour_timer > 0.0 {
            self.devour_timer -= 1.0;
        }
        self.tick_regen();
        self.tick_statuses();
        self.update_boss_gate(delay);
        self.boss_ai();

        if self.tick % 2 == 0 {
            self.resolve_projectiles();
        }
        if self.tick % 5 == 0 {
            self.magnet_pull();
        }
        self.fire_weapons();

        if self.phase == RunPhase::Running && self.tick % delay == 0 {
            self.enemy_ai();
            self.move_bodies(delay);
        }

        self.world.enemies.retain(|e| !e.dead);
    }

    // ========================================================================
    // Timers and statuses
    // ========================================================================

    fn tick_regen(&mut self) {
        if !self.inventory.has_passive(PassiveKind::Heart) {
            return;
        }
        self.regen_clock += 1;
        if self.regen_clock >= REGEN_INTERVAL {
            self.regen_clock = 0;
            if self.hp < self.max_hp {
                self.heal(self.max_hp * 0.05);
            }
        }
    }

    fn tick_statuses(&mut self) {
        for i in 0..self.world.enemies.len() {
            if self.world.enemies[i].dead {
                continue;
            }
            let tick = self.world.enemies[i].status.tick();
            if tick.poison_proc && self.world.enemies[i].take_damage(POISON_DAMAGE) {
                let pos = self.world.enemies[i].pos;
                self.on_walker_killed(pos);
            }
        }

        if self.world.boss.is_alive() {
            let tick = self.world.boss.status.tick();
            if tick.poison_proc && self.world.boss.phase == BossPhase::Active {
                let dmg = self.world.boss.max_hp * 0.005 + 5.0;
                if self.world.boss.take_damage(dmg) {
                    self.on_boss_defeated();
                }
            }
        }
        self.world.boss.trail.tick();
    }

    /// Kill bookkeeping shared by projectiles, poison, and retaliation:
    /// score, an ember drop, and a chest roll.
    pub(crate) fn on_walker_killed(&mut self, pos: Position) {
        self.events.push(GameEvent::EnemyKilled { at: pos });
        self.score += WALKER_SCORE;
        self.world.food.push(Food::wildfire(pos));
        let lucky = self.inventory.passive_total(PassiveKind::Lucky) as f64;
        if self.rng.gen_bool((WALKER_CHEST_CHANCE + lucky).min(1.0)) {
            self.world.chests.push(Chest::new(pos));
            self.events.push(GameEvent::ChestDropped { at: pos });
        }
    }

    // ========================================================================
    // Projectiles
    // ========================================================================

    fn resolve_projectiles(&mut self) {
        let stats = self.combat_stats();
        let mut events = Vec::new();
        let gains = projectile::update_projectiles(
            &mut self.world.projectiles,
            &mut self.world.walls,
            &mut self.world.crates,
            &mut self.world.enemies,
            Some(&mut self.world.boss),
            &mut self.rng,
            &stats,
            &mut events,
        );
        self.events.extend(events);
        self.score += gains.score;
        for pos in gains.ember_drops {
            self.world.food.push(Food::wildfire(pos));
        }
        for pos in gains.chests {
            self.world.chests.push(Chest::new(pos));
        }
        if gains.boss_killed {
            self.on_boss_defeated();
        }
        self.gain_xp(gains.xp);
    }

    // ========================================================================
    // Firing
    // ========================================================================

    fn fire_weapons(&mut self) {
        let speed_total = self.inventory.passive_total(PassiveKind::Swiftness);
        let berserk_total = self.inventory.passive_total(PassiveKind::Berserk);
        let damage_percent = self.inventory.passive_total(PassiveKind::DamageUp);
        let broadside_stack = self.inventory.weapon_stack(WeaponKind::Broadside);
        let pierce = self.inventory.passive_stack(PassiveKind::Pierce);
        let bounce = self.inventory.passive_stack(PassiveKind::Bounce);
        let true_aim = self.inventory.has_passive(PassiveKind::TrueAim);
        let missing = 1.0 - (self.hp / self.max_hp).clamp(0.0, 1.0);

        struct Shooter {
            kind: CharacterKind,
            dir: (f32, f32),
            head: Position,
            segments: Vec<Position>,
            horizontal: bool,
        }
        let shooters: Vec<Shooter> = self
            .creatures
            .iter()
            .map(|c| {
                let dir = match (true_aim, c.aim) {
                    (true, Some(aim)) => aim,
                    _ => (c.last_dir.0 as f32, c.last_dir.1 as f32),
                };
                Shooter {
                    kind: c.kind,
                    dir,
                    head: c.head(),
                    segments: c.body.iter().copied().collect(),
                    horizontal: c.last_dir.1 == 0,
                }
            })
            .collect();

        for slot in 0..self.inventory.weapons.len() {
            let (kind, stack, last_fired) = {
                let s = &self.inventory.weapons[slot];
                (s.kind, s.stack, s.last_fired)
            };
            let mut fire_delay = (kind.fire_rate() as f32 - speed_total * 10.0).max(5.0);
            if berserk_total > 0.0 {
                fire_delay = (fire_delay - fire_delay * missing * berserk_total).max(2.0);
            }
            if self.tick.saturating_sub(last_fired) <= fire_delay as u64 {
                continue;
            }
            self.inventory.weapons[slot].last_fired = self.tick;

            let speed = kind.projectile_speed();
            for shooter in &shooters {
                let damage = inventory::projectile_damage(
                    kind,
                    stack,
                    shooter.kind.damage_modifier(),
                    damage_percent,
                    broadside_stack,
                );
                match kind {
                    WeaponKind::Broadside => {
                        // Volleys from every other segment, perpendicular
                        // to the direction of travel, both ways.
                        let (pa, pb) = if shooter.horizontal {
                            ((0.0, -1.0), (0.0, 1.0))
                        } else {
                            ((-1.0, 0.0), (1.0, 0.0))
                        };
                        for segment in shooter.segments.iter().step_by(2) {
                            for &(vx, vy) in &[pa, pb] {
                                self.spawn_shot(kind, shooter.kind, *segment, (vx, vy), speed, damage, pierce, bounce, stack);
                            }
                        }
                    }
                    WeaponKind::Hydra => {
                        let (dx, dy) = shooter.dir;
                        let sides = [(dx, dy), (-dy, dx), (dy, -dx)];
                        for &(vx, vy) in &sides {
                            self.spawn_shot(kind, shooter.kind, shooter.head, (vx, vy), speed, damage, pierce, bounce, stack);
                        }
                    }
                    _ => {
                        self.spawn_shot(kind, shooter.kind, shooter.head, shooter.dir, speed, damage, pierce, bounce, stack);
                    }
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn_shot(
        &mut self,
        kind: WeaponKind,
        owner: CharacterKind,
        from: Position,
        dir: (f32, f32),
        speed: f32,
        damage: f32,
        pierce: u32,
        bounce: u32,
        stack: u32,
    ) {
        let len = (dir.0 * dir.0 + dir.1 * dir.1).sqrt();
        if len < 1e-3 {
            return;
        }
        let crit = self.roll_crit();
        self.world.projectiles.push(Projectile {
            x: from.x as f32,
            y: from.y as f32,
            vx: dir.0 / len * speed,
            vy: dir.1 / len * speed,
            damage: if crit { damage * 2.0 } else { damage },
            weapon: kind,
            owner,
            life: PROJECTILE_LIFE,
            pierce_left: pierce,
            bounces_left: bounce,
            heavy_stack: if kind == WeaponKind::Cannon { stack } else { 0 },
            crit,
        });
    }

    // ========================================================================
    // Magnet
    // ========================================================================

    fn magnet_pull(&mut self) {
        let stack = self.inventory.passive_stack(PassiveKind::Magnet);
        if stack == 0 {
            return;
        }
        let range = 1.5 + 0.5 * (stack - 1) as f32;
        let heads: Vec<Position> = self.creatures.iter().map(|c| c.head()).collect();
        if heads.is_empty() {
            return;
        }

        let mut eaten_food = Vec::new();
        for (fi, item) in self.world.food.iter_mut().enumerate() {
            if let Some((ci, head)) = closest_head(&heads, item.pos) {
                let dist = euclid(item.pos, head);
                if dist < 0.8 {
                    eaten_food.push((fi, ci));
                } else if dist <= range {
                    item.pos = pull_step(item.pos, head);
                }
            }
        }
        // Back-to-front so indices stay valid.
        eaten_food.sort_by(|a, b| b.0.cmp(&a.0));
        for (fi, ci) in eaten_food {
            let item = self.world.food.remove(fi);
            self.consume_food(item.kind, ci);
        }

        let mut opened = Vec::new();
        for (pi, chest) in self.world.chests.iter_mut().enumerate() {
            if let Some((_, head)) = closest_head(&heads, chest.pos) {
                let dist = euclid(chest.pos, head);
                if dist < 0.8 {
                    opened.push(pi);
                } else if dist <= range {
                    chest.pos = pull_step(chest.pos, head);
                }
            }
        }
        opened.sort_by(|a, b| b.cmp(a));
        for pi in opened {
            self.world.chests.remove(pi);
            self.open_chest();
        }
    }

    // ========================================================================
    // Consumption
    // ========================================================================

    fn consume_food(&mut self, kind: FoodKind, creature: usize) {
        match kind {
            FoodKind::Sheep => {
                let devour_total = self.inventory.passive_total(PassiveKind::Devour);
                let mut healing = 5.0;
                if devour_total > 0.0 {
                    healing += (self.max_hp * 0.1 * devour_total).floor();
                    let stack = self.inventory.passive_stack(PassiveKind::Devour);
                    let mult = 1.0 + 0.5 * stack.saturating_sub(1) as f32;
                    self.gain_xp((5.0 * mult).floor());
                }
                self.heal(healing);
                self.score += 10;
            }
            FoodKind::Wildfire => {
                let scholar = self.inventory.passive_total(PassiveKind::Scholar);
                self.gain_xp(2.0 * (1.0 + scholar));
                self.score += 25;
            }
        }
        if let Some(flag) = self.pending_growth.get_mut(creature) {
            *flag = true;
        }
    }

    fn open_chest(&mut self) {
        let choices = rewards::chest_choices(&mut self.rng, &self.inventory);
        self.offer_rewards(choices);
    }

    // ========================================================================
    // Body movement
    // ========================================================================

    fn move_bodies(&mut self, delay: u64) {
        for creature in &mut self.creatures {
            if let Some(velocity) = creature.pop_intent() {
                creature.velocity = velocity;
            }
        }

        self.consume_under_heads();
        self.resolve_premove_enemy_overlap();

        if self.check_room_transition() {
            return;
        }

        let impact = self.impact_damage(delay);
        for ci in 0..self.creatures.len() {
            if self.phase != RunPhase::Running && self.phase != RunPhase::ChoosingReward {
                return;
            }
            let next = self.creatures[ci].next_head();
            // Heading sticks even when the step below is blocked.
            self.creatures[ci].mark_direction();

            // Boss bounding box, solid only once it is awake.
            if self.world.boss.phase == BossPhase::Active && self.world.boss.covers(next) {
                self.damage_players(impact);
                continue;
            }

            // Live walker: a ready devour eats through, otherwise solid.
            if let Some(ei) = self
                .world
                .enemies
                .iter()
                .position(|e| !e.dead && e.covers(next))
            {
                if self.devour_ready() {
                    self.devour_enemy(ei);
                } else {
                    self.damage_players(WALKER_CONTACT_DAMAGE);
                    continue;
                }
            }

            // Terrain: a missing room is as solid as any wall.
            if self.world.is_wall_or_rock(next) {
                self.damage_players(impact);
                continue;
            }

            // Crate: shatters on impact and the body rolls onto the
            // cleared tile in the same move.
            if self.world.crates.contains(next.x, next.y) {
                self.headbutt_crate(next, impact);
            }

            if self.world.exit_portal == Some(next) {
                self.advance_floor();
                return;
            }

            // Own or ally body.
            if self.creatures.iter().any(|c| c.occupies(next)) {
                self.damage_players(SELF_BITE_DAMAGE);
                continue;
            }

            // Clear: eat whatever waits on the target tile, then move.
            if let Some(fi) = self.world.food.iter().position(|f| f.pos == next) {
                let item = self.world.food.remove(fi);
                self.consume_food(item.kind, ci);
            }
            if let Some(pi) = self.world.chests.iter().position(|c| c.pos == next) {
                self.world.chests.remove(pi);
                self.open_chest();
            }

            let grow = std::mem::take(&mut self.pending_growth[ci]);
            self.creatures[ci].advance(next, grow);
            self.apply_diet(ci);
        }
    }

    /// Magnet drops items onto occupied tiles between moves; sweep the
    /// current head cells before computing the next ones.
    fn consume_under_heads(&mut self) {
        for ci in 0..self.creatures.len() {
            let head = self.creatures[ci].head();
            while let Some(fi) = self.world.food.iter().position(|f| f.pos == head) {
                let item = self.world.food.remove(fi);
                self.consume_food(item.kind, ci);
            }
            while let Some(pi) = self.world.chests.iter().position(|c| c.pos == head) {
                self.world.chests.remove(pi);
                self.open_chest();
            }
        }
    }

    /// A walker that wandered onto a head bites and is crushed.
    fn resolve_premove_enemy_overlap(&mut self) {
        let heads: Vec<Position> = self.creatures.iter().map(|c| c.head()).collect();
        let mut bitten = false;
        for enemy in &mut self.world.enemies {
            if !enemy.dead && heads.iter().any(|&h| enemy.covers(h)) {
                enemy.dead = true;
                bitten = true;
            }
        }
        if bitten {
            self.damage_players(WALKER_CONTACT_DAMAGE);
        }
    }

    fn devour_enemy(&mut self, enemy_index: usize) {
        let stack = self.inventory.passive_stack(PassiveKind::Devour);
        let healing = self.max_hp * 0.1 * stack as f32;
        self.heal(healing);
        let mult = 1.0 + 0.5 * stack.saturating_sub(1) as f32;
        self.gain_xp((5.0 * mult).floor());
        self.score += 50;
        self.devour_timer =
            (DEVOUR_COOLDOWN_BASE * (1.0 - 0.15 * stack.saturating_sub(1) as f32).max(0.2)).floor();
        self.world.enemies[enemy_index].dead = true;
        self.events.push(GameEvent::DevourUsed { healed: healing });
    }

    fn headbutt_crate(&mut self, at: Position, impact: f32) {
        self.world.crates.remove(at.x, at.y);
        self.events.push(GameEvent::CrateDestroyed { at });
        let miner = self.inventory.passive_total(PassiveKind::Miner);
        self.gain_xp(miner);
        let lucky = self.inventory.passive_total(PassiveKind::Lucky) as f64;
        if self.rng.gen_bool((HEADBUTT_CHEST_CHANCE + lucky).min(1.0)) {
            self.world.chests.push(Chest::new(at));
            self.events.push(GameEvent::ChestDropped { at });
        }
        // Armor plating absorbs the splinters entirely.
        if !self.inventory.has_passive(PassiveKind::Armor) {
            self.damage_players((impact / 2.0).floor());
        }
    }

    fn apply_diet(&mut self, creature_index: usize) {
        if !self.inventory.has_passive(PassiveKind::Diet) {
            return;
        }
        if !self.creatures[creature_index].shed_tail() {
            self.inventory.remove_passive(PassiveKind::Diet);
            self.events.push(GameEvent::DietComplete);
        }
    }

    // ========================================================================
    // Room transitions
    // ========================================================================

    /// If any creature's next head crosses into a different existing
    /// room, teleport the whole party there atomically and skip the rest
    /// of this movement tick.
    fn check_room_transition(&mut self) -> bool {
        let mut transition: Option<((i32, i32), Direction)> = None;
        for creature in &self.creatures {
            let here = room_key_of(creature.head());
            let next = creature.next_head();
            let there = room_key_of(next);
            if there != here && self.world.graph.get(there).is_some() {
                if let Some(dir) = Direction::from_delta(creature.velocity.0, creature.velocity.1)
                {
                    transition = Some((there, dir));
                    break;
                }
            }
        }
        let Some((room_key, entry_dir)) = transition else {
            return false;
        };

        let Some(room) = self.world.graph.get_mut(room_key) else {
            return false;
        };
        room.explored = true;
        let (bx, by) = room.base();
        let mid_x = bx + ROOM_WIDTH / 2;
        let mid_y = by + ROOM_HEIGHT / 2;
        // One tile in from the entry side, centered on the door.
        let anchor = match entry_dir {
            Direction::Right => Position::new(bx + 1, mid_y),
            Direction::Left => Position::new(bx + ROOM_WIDTH - 2, mid_y),
            Direction::Down => Position::new(mid_x, by + 1),
            Direction::Up => Position::new(mid_x, by + ROOM_HEIGHT - 2),
        };

        for (i, creature) in self.creatures.iter_mut().enumerate() {
            let spread = 2 * i as i32;
            let target = match entry_dir {
                Direction::Left | Direction::Right => anchor.offset(0, spread),
                Direction::Up | Direction::Down => anchor.offset(spread, 0),
            };
            let head = creature.head();
            creature.translate(target.x - head.x, target.y - head.y);
            creature.mark_direction();
        }
        log::debug!("party entered room {:?} heading {:?}", room_key, entry_dir);
        true
    }
}

fn closest_head(heads: &[Position], from: Position) -> Option<(usize, Position)> {
    heads
        .iter()
        .enumerate()
        .min_by_key(|(_, h)| from.manhattan_distance(h))
        .map(|(i, &h)| (i, h))
}

fn euclid(a: Position, b: Position) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

/// One-tile pull toward a head, preferring the longer axis.
fn pull_step(from: Position, toward: Position) -> Position {
    let dx = toward.x - from.x;
    let dy = toward.y - from.y;
    if dx.abs() >= dy.abs() && dx != 0 {
        from.offset(dx.signum(), 0)
    } else if dy != 0 {
        from.offset(0, dy.signum())
    } else {
        from
    }
}
