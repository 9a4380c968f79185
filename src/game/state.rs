//! Core game state
//!
//! `Game` owns the whole simulation: the world aggregate, both player
//! creatures, the shared inventory and xp pool, the rng, and the event
//! queue. All mutation flows through `&mut self`; front ends read via
//! snapshots and the event channel.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::combat::projectile::{CombatStats, Projectile};
use crate::entities::boss::Boss;
use crate::entities::creature::{CharacterKind, Creature};
use crate::entities::enemy::Enemy;
use crate::entities::pickups::{Chest, Food};
use crate::game::events::GameEvent;
use crate::game::input::{Intent, PlayerId};
use crate::progression::difficulty::Difficulty;
use crate::progression::inventory::{AcquireOutcome, Inventory};
use crate::progression::items::{PassiveKind, WeaponKind};
use crate::progression::rewards::{self, RewardChoice};
use crate::progression::xp::XpState;
use crate::save::profile::{self, Profile};
use crate::world::generation;
use crate::world::rooms::RoomGraph;
use crate::world::spatial::{CrateGrid, Position, WallGrid};

/// Starting (and base maximum) hp.
pub const BASE_MAX_HP: f32 = 100.0;
/// Ticks of damage immunity after being hurt.
pub const INVINCIBILITY_TICKS: u32 = 30;
/// Base cooldown between devours.
pub const DEVOUR_COOLDOWN_BASE: f32 = 300.0;
/// Ticks between Wyrm Heart regeneration pulses.
pub const REGEN_INTERVAL: u32 = 300;
/// Chest drop chance when a head smashes a crate.
pub const HEADBUTT_CHEST_CHANCE: f64 = 0.03;

/// Run configuration chosen before the first tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettings {
    pub difficulty: Difficulty,
    /// One or two characters; the second player shares hp, xp, score
    /// and inventory.
    pub characters: Vec<CharacterKind>,
    /// Fixed seed for reproducible runs; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl GameSettings {
    pub fn solo(character: CharacterKind, difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            characters: vec![character],
            seed: None,
        }
    }
}

/// Coarse run phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    Running,
    /// Frozen on a three-way reward choice.
    ChoosingReward,
    GameOver,
    Victory,
}

/// Everything that exists on the current floor.
#[derive(Debug, Clone)]
pub struct World {
    pub graph: RoomGraph,
    pub walls: WallGrid,
    pub crates: CrateGrid,
    pub food: Vec<Food>,
    pub chests: Vec<Chest>,
    pub enemies: Vec<Enemy>,
    pub projectiles: Vec<Projectile>,
    pub boss: Boss,
    pub exit_portal: Option<Position>,
    /// Wall plugs inserted while the boss room is locked.
    pub boss_lock: Vec<(i32, i32)>,
}

impl World {
    /// Solid terrain: outside every room counts as rock.
    pub fn is_wall_or_rock(&self, pos: Position) -> bool {
        self.graph.room_at(pos).is_none() || self.walls.contains(pos.x, pos.y)
    }

    /// Terrain plus crates.
    pub fn is_blocked(&self, pos: Position) -> bool {
        self.is_wall_or_rock(pos) || self.crates.contains(pos.x, pos.y)
    }
}

pub struct Game {
    pub settings: GameSettings,
    pub(crate) rng: StdRng,
    pub world: World,
    pub creatures: Vec<Creature>,
    pub inventory: Inventory,
    pub xp: XpState,
    pub hp: f32,
    pub max_hp: f32,
    pub score: u32,
    pub floor: u32,
    pub tick: u64,
    pub paused: bool,
    pub(crate) phase: RunPhase,
    pub(crate) devour_timer: f32,
    pub(crate) invincible: u32,
    pub(crate) regen_clock: u32,
    pub(crate) pending_rewards: Vec<RewardChoice>,
    /// Per-creature growth owed at the next body move.
    pub(crate) pending_growth: Vec<bool>,
    pub(crate) events: Vec<GameEvent>,
    pub(crate) profile: Profile,
}

impl Game {
    pub fn new(settings: GameSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let profile = profile::load();
        let inventory = Inventory::starting(
            &settings
                .characters
                .iter()
                .map(|c| c.starting_weapon())
                .collect::<Vec<_>>(),
        );

        let mut game = Self {
            settings,
            rng,
            world: World {
                graph: RoomGraph::new(),
                walls: WallGrid::new(),
                crates: CrateGrid::new(),
                food: Vec::new(),
                chests: Vec::new(),
                enemies: Vec::new(),
                projectiles: Vec::new(),
                boss: Boss::for_floor(1, Position::new(0, 0), false),
                exit_portal: None,
                boss_lock: Vec::new(),
            },
            creatures: Vec::new(),
            inventory,
            xp: XpState::new(),
            hp: BASE_MAX_HP,
            max_hp: BASE_MAX_HP,
            score: 0,
            floor: 1,
            tick: 0,
            paused: false,
            phase: RunPhase::Running,
            devour_timer: 0.0,
            invincible: 0,
            regen_clock: 0,
            pending_rewards: Vec::new(),
            pending_growth: Vec::new(),
            events: Vec::new(),
            profile,
        };
        game.generate_floor();
        log::info!(
            "new run: {:?}, {} player(s), difficulty {}",
            game.settings.characters,
            game.settings.characters.len(),
            game.settings.difficulty.name()
        );
        game
    }

    /// Regenerate the world for the current floor and respawn the party
    /// at the origin room.
    pub(crate) fn generate_floor(&mut self) {
        let generated = generation::generate(
            &mut self.rng,
            self.floor,
            self.settings.difficulty,
            &self.settings.characters,
        );
        self.world = World {
            graph: generated.graph,
            walls: generated.walls,
            crates: generated.crates,
            food: generated.food,
            chests: Vec::new(),
            enemies: generated.enemies,
            projectiles: Vec::new(),
            boss: generated.boss,
            exit_portal: None,
            boss_lock: Vec::new(),
        };
        self.spawn_creatures();
        self.invincible = 0;
        self.regen_clock = 0;
    }

    fn spawn_creatures(&mut self) {
        let center = self
            .world
            .graph
            .get((0, 0))
            .map(|r| r.center())
            .unwrap_or_default();
        self.creatures = self
            .settings
            .characters
            .iter()
            .enumerate()
            .map(|(i, &kind)| Creature::spawn(kind, center.offset(2 * i as i32, 0)))
            .collect();
        self.pending_growth = vec![false; self.creatures.len()];
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Feed one normalized intent into the simulation. Turns queue even
    /// while paused so buffered play feels responsive on unpause.
    pub fn submit(&mut self, player: PlayerId, intent: Intent) {
        match intent {
            Intent::Turn(dir) => {
                if let Some(creature) = self.creatures.get_mut(player.index()) {
                    creature.queue_intent(dir);
                }
            }
            Intent::Aim(x, y) => {
                if let Some(creature) = self.creatures.get_mut(player.index()) {
                    let len = (x * x + y * y).sqrt();
                    if len > 1e-3 {
                        creature.aim = Some((x / len, y / len));
                    }
                }
            }
            Intent::ClearAim => {
                if let Some(creature) = self.creatures.get_mut(player.index()) {
                    creature.aim = None;
                }
            }
            Intent::Confirm(index) => self.choose_reward(index),
            Intent::Cancel => {
                // A pending reward cannot be dismissed, only deferred.
                log::debug!("cancel ignored in phase {:?}", self.phase);
            }
            Intent::Pause => self.paused = true,
            Intent::Resume => self.paused = false,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn pending_rewards(&self) -> &[RewardChoice] {
        &self.pending_rewards
    }

    /// Drain the semantic event queue.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    // ========================================================================
    // Rewards
    // ========================================================================

    pub(crate) fn offer_rewards(&mut self, choices: Vec<RewardChoice>) {
        log::debug!("rewards offered: {:?}", choices);
        self.events.push(GameEvent::RewardsOffered {
            choices: choices.clone(),
        });
        self.pending_rewards = choices;
        self.phase = RunPhase::ChoosingReward;
    }

    /// Resolve a pending reward choice by index.
    pub fn choose_reward(&mut self, index: usize) {
        if self.phase != RunPhase::ChoosingReward {
            return;
        }
        let Some(&choice) = self.pending_rewards.get(index) else {
            return;
        };
        self.apply_reward(choice);
        self.pending_rewards.clear();
        self.phase = RunPhase::Running;
    }

    fn apply_reward(&mut self, choice: RewardChoice) {
        match choice {
            RewardChoice::Heal => {
                self.hp = self.max_hp;
                self.events.push(GameEvent::ItemAcquired { choice });
            }
            RewardChoice::Weapon(kind) => match self.inventory.acquire_weapon(kind) {
                AcquireOutcome::Added => self.events.push(GameEvent::ItemAcquired { choice }),
                AcquireOutcome::Upgraded(stack) => {
                    self.events.push(GameEvent::ItemUpgraded { choice, stack })
                }
                AcquireOutcome::Rejected => {
                    self.events.push(GameEvent::InventoryFull { choice })
                }
            },
            RewardChoice::Passive(kind) => match self.inventory.acquire_passive(kind) {
                AcquireOutcome::Added => {
                    self.on_passive_gained(kind);
                    self.events.push(GameEvent::ItemAcquired { choice });
                }
                AcquireOutcome::Upgraded(stack) => {
                    self.on_passive_gained(kind);
                    self.events.push(GameEvent::ItemUpgraded { choice, stack });
                }
                AcquireOutcome::Rejected => {
                    self.events.push(GameEvent::InventoryFull { choice })
                }
            },
        }
    }

    fn on_passive_gained(&mut self, kind: PassiveKind) {
        if kind == PassiveKind::Heart {
            self.max_hp += PassiveKind::Heart.per_stack_value();
            self.hp = (self.hp + 5.0).min(self.max_hp);
        }
    }

    // ========================================================================
    // Shared pools
    // ========================================================================

    /// Grant xp to the shared pool; a level-up opens a reward choice.
    pub(crate) fn gain_xp(&mut self, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        if self.xp.grant(amount) {
            log::debug!("level up to {}", self.xp.level);
            self.events.push(GameEvent::LevelUp {
                level: self.xp.level,
            });
            let choices = rewards::level_up_choices(&mut self.rng, &self.inventory);
            self.offer_rewards(choices);
        }
    }

    /// Hurt the shared hp pool, respecting armor and the invincibility
    /// window. Any hit that lands always costs at least one point.
    pub(crate) fn damage_players(&mut self, amount: f32) {
        if self.invincible > 0 || matches!(self.phase, RunPhase::GameOver | RunPhase::Victory) {
            return;
        }
        let reduction = self.inventory.passive_total(PassiveKind::Armor) * 2.0;
        let dealt = (amount - reduction).max(1.0);
        self.hp -= dealt;
        self.invincible = INVINCIBILITY_TICKS;
        self.events.push(GameEvent::CreatureHurt { damage: dealt });
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.phase = RunPhase::GameOver;
            self.events.push(GameEvent::GameOver);
            log::info!("run over on floor {} with score {}", self.floor, self.score);
        }
    }

    pub(crate) fn heal(&mut self, amount: f32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }

    // ========================================================================
    // Derived values
    // ========================================================================

    /// Ticks between body movements. Levels speed the body up, Cannon
    /// mass drags it down, Storm stacks trim it, floor of two.
    pub(crate) fn move_delay(&self) -> u64 {
        let speed_val =
            (8 - (self.xp.level / 5) as i32) * self.settings.difficulty.speed_mult();
        let base = speed_val.max(3) as f32;
        let heavy = self.inventory.weapon_stack(WeaponKind::Cannon) as f32;
        let rapid = self.inventory.weapon_stack(WeaponKind::Storm) as i32;
        let delay = base * (1.0 + 0.1 * heavy) * 0.9f32.powi(rapid);
        delay.floor().max(2.0) as u64
    }

    /// Collision damage scaled by how fast the body is moving.
    pub(crate) fn impact_damage(&self, delay: u64) -> f32 {
        let speed_factor = 10.0 / delay.max(1) as f32;
        (20.0 * (speed_factor * 0.5).max(1.0)).floor()
    }

    pub(crate) fn devour_ready(&self) -> bool {
        self.inventory.has_passive(PassiveKind::Devour) && self.devour_timer <= 0.0
    }

    pub(crate) fn combat_stats(&self) -> CombatStats {
        CombatStats {
            plasma_stack: self.inventory.weapon_stack(WeaponKind::Plasma),
            lucky: self.inventory.passive_total(PassiveKind::Lucky) as f64,
            miner: self.inventory.passive_total(PassiveKind::Miner),
        }
    }

    /// Roll a crit against the accumulated crit chance.
    pub(crate) fn roll_crit(&mut self) -> bool {
        let chance = self.inventory.passive_total(PassiveKind::CritChance) as f64;
        chance > 0.0 && self.rng.gen_bool(chance.min(1.0))
    }

    // ========================================================================
    // Run lifecycle
    // ========================================================================

    /// Step through the exit portal.
    pub(crate) fn advance_floor(&mut self) {
        if self.floor >= crate::world::rooms::MAX_FLOORS {
            self.phase = RunPhase::Victory;
            self.events.push(GameEvent::Victory);
            self.score += 10_000;
            self.profile.unlock_all();
            if let Err(e) = profile::save(&self.profile) {
                log::warn!("failed to save profile: {}", e);
            }
            log::info!("victory with score {}", self.score);
            return;
        }
        self.floor += 1;
        log::info!("descending to floor {}", self.floor);
        self.generate_floor();
        self.events.push(GameEvent::FloorAdvanced { floor: self.floor });
    }
}
