//! Simulation engine, the core of the game.
//!
//! `SimulationEngine` owns the entity store, processes player commands,
//! runs all systems in a fixed order, and produces `WorldSnapshot`s.
//! Completely headless, so runs are deterministic and testable.

use std::collections::VecDeque;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use starfall_core::commands::{PlayerCommand, PlayerInput};
use starfall_core::constants::{DIFFICULTY_STEP, LEVEL_TRANSITION_TICKS};
use starfall_core::content::ContentDef;
use starfall_core::enums::GamePhase;
use starfall_core::error::ConfigError;
use starfall_core::events::GameEvent;
use starfall_core::registry::ContentRegistry;
use starfall_core::state::WorldSnapshot;
use starfall_core::types::{Playfield, SimTime};

use crate::context::TickContext;
use crate::event_queue::{EventQueue, ScheduledAction};
use crate::store::EntityStore;
use crate::systems;
use crate::systems::abilities::CooldownAbilityManager;
use crate::systems::boss::BossPhaseController;
use crate::systems::spawn_director::SpawnDirector;
use crate::systems::stats::{RunStats, StatTracker};
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    pub playfield: Playfield,
    /// Raw content tables, validated once in `SimulationEngine::new`.
    pub content: ContentDef,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            playfield: Playfield::default(),
            content: ContentDef::builtin(),
        }
    }
}

/// The simulation engine. Owns the entity store and all sim state.
pub struct SimulationEngine {
    registry: ContentRegistry,
    seed: u64,
    playfield: Playfield,
    store: EntityStore,
    time: SimTime,
    phase: GamePhase,
    paused: bool,
    level: u32,
    difficulty: f64,
    rng: ChaCha8Rng,
    command_queue: VecDeque<PlayerCommand>,
    input: PlayerInput,
    events: Vec<GameEvent>,
    player: Option<Entity>,

    queue: EventQueue,
    director: SpawnDirector,
    cooldowns: CooldownAbilityManager,
    boss: BossPhaseController,
    stats: StatTracker,
}

impl SimulationEngine {
    /// Validate the content tables and create an idle engine.
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        let registry = ContentRegistry::validate(&config.content)?;
        info!(
            seed = config.seed,
            enemies = registry.enemies.len(),
            bosses = registry.bosses.len(),
            levels = registry.levels.len(),
            "content validated"
        );
        Ok(Self {
            registry,
            seed: config.seed,
            playfield: config.playfield,
            store: EntityStore::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            paused: false,
            level: 1,
            difficulty: 1.0,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            command_queue: VecDeque::new(),
            input: PlayerInput::default(),
            events: Vec::new(),
            player: None,
            queue: EventQueue::new(),
            director: SpawnDirector::default(),
            cooldowns: CooldownAbilityManager::new(),
            boss: BossPhaseController::new(),
            stats: StatTracker::new(),
        })
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Player intent sampled by every following tick until replaced.
    pub fn set_input(&mut self, input: PlayerInput) {
        self.input = input;
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        self.process_commands();

        let mut unlocked = Vec::new();
        if self.phase == GamePhase::Active && !self.paused {
            unlocked = self.run_systems();
            self.time.advance();
        }

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            self.store.world(),
            &self.registry,
            &self.time,
            self.phase,
            self.paused,
            self.level,
            &self.boss,
            self.stats.stats(),
            events,
            unlocked,
        )
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Current 1-based level number.
    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn difficulty(&self) -> f64 {
        self.difficulty
    }

    /// Get a reference to the entity world (for testing/inspection).
    pub fn world(&self) -> &World {
        self.store.world()
    }

    pub fn registry(&self) -> &ContentRegistry {
        &self.registry
    }

    pub fn stats(&self) -> &RunStats {
        self.stats.stats()
    }

    /// Every achievement unlocked during the current run.
    pub fn achievements(&self) -> &[String] {
        self.stats.unlocked()
    }

    pub fn player(&self) -> Option<Entity> {
        self.player
    }

    pub(crate) fn context(&self) -> TickContext {
        TickContext {
            tick: self.time.tick,
            dt: self.time.dt(),
            playfield: self.playfield,
            level: self.level,
            difficulty: self.difficulty,
        }
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut EntityStore {
        &mut self.store
    }

    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartRun { level } => {
                if self.phase != GamePhase::Active {
                    self.start_run(level);
                }
            }
            PlayerCommand::Restart => {
                self.reset();
                self.phase = GamePhase::Idle;
                info!("run discarded");
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.paused = true;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Active {
                    self.paused = false;
                }
            }
            PlayerCommand::TogglePause => {
                if self.phase == GamePhase::Active {
                    self.paused = !self.paused;
                }
            }
        }
    }

    /// Drop every entity and all run state. The RNG is reseeded so every run
    /// from the same config plays out identically.
    fn reset(&mut self) {
        self.rng = ChaCha8Rng::seed_from_u64(self.seed);
        self.store.clear();
        self.queue.clear();
        self.cooldowns.clear();
        self.boss.clear();
        self.stats.clear();
        self.director = SpawnDirector::default();
        self.events.clear();
        self.time = SimTime::default();
        self.paused = false;
        self.player = None;
        self.level = 1;
        self.difficulty = 1.0;
    }

    fn start_run(&mut self, level: u32) {
        self.reset();
        self.phase = GamePhase::Active;
        let ctx = self.context();
        self.player = Some(world_setup::spawn_player(&mut self.store, &self.registry, &ctx));
        info!(seed = self.seed, level, "run started");
        self.start_level(level);
    }

    /// Level boundary: pick the profile, arm the spawn schedules, queue the
    /// boss and reset window-scoped stats.
    fn start_level(&mut self, level: u32) {
        self.level = level.max(1);
        let cycle = (self.level - 1) / self.registry.levels.len().max(1) as u32;
        self.difficulty = 1.0 + DIFFICULTY_STEP * f64::from(cycle);

        let now = self.time.tick;
        let spec = self.registry.level(self.level);
        self.director = SpawnDirector::for_level(spec, now, &mut self.rng);
        if let Some(boss) = spec.boss {
            self.queue
                .schedule(now + spec.boss_at_tick, ScheduledAction::SpawnBoss { boss });
        }
        self.stats.reset_window();
        self.events.push(GameEvent::LevelStarted {
            level: self.level,
            profile: spec.key.clone(),
        });
        info!(level = self.level, profile = %spec.key, difficulty = self.difficulty, "level started");
    }

    /// Run all systems in the fixed per-tick order. Returns newly unlocked
    /// achievement ids.
    fn run_systems(&mut self) -> Vec<String> {
        // 1. Spawns: arm due schedules, then apply everything the queue says
        //    is due.
        let ctx = self.context();
        self.director.poll(
            &ctx,
            &self.registry,
            self.registry.level(self.level),
            &mut self.rng,
            &mut self.queue,
        );
        for action in self.queue.drain_due(ctx.tick) {
            self.apply_action(action);
        }

        // A level change above alters level and difficulty.
        let ctx = self.context();

        // 2. Motion
        systems::movement::run(&mut self.store, &ctx, &mut self.rng, &self.input);

        // 3. Firing
        systems::abilities::run(
            &mut self.cooldowns,
            &mut self.store,
            &self.registry,
            &ctx,
            &self.input,
            &mut self.boss,
            &mut self.rng,
            &mut self.events,
        );

        // 4. Collision (notifies the boss controller of every health change)
        systems::collision::run(
            &mut self.store,
            &self.registry,
            &ctx,
            &mut self.rng,
            &mut self.cooldowns,
            &mut self.boss,
            &mut self.events,
        );

        // 5. Boss defeat side effects
        if let Some(defeated) = self.boss.take_defeated() {
            self.cooldowns.release(&[defeated.entity]);
            let cancelled = self.queue.cancel(ScheduledAction::is_escort);
            self.director
                .end_boss(self.registry.level(self.level), ctx.tick, &mut self.rng);
            self.queue
                .schedule(ctx.tick + LEVEL_TRANSITION_TICKS, ScheduledAction::AdvanceLevel);
            debug!(boss = %defeated.key, cancelled, "boss encounter closed");
        }

        // 6. Cleanup
        systems::cleanup::run(&mut self.store, &mut self.cooldowns);
        if self.player.map_or(true, |p| !self.store.is_alive(p)) {
            self.phase = GamePhase::GameOver;
            info!(tick = ctx.tick, score = self.stats.stats().score, "game over");
        }

        // 7. Stats and achievements
        let player_id = self.player.map(EntityStore::id);
        self.stats
            .run(&self.registry.achievements, player_id, &mut self.events)
    }

    fn apply_action(&mut self, action: ScheduledAction) {
        let ctx = self.context();
        match action {
            ScheduledAction::SpawnEnemy {
                archetype,
                position,
                escort,
            } => {
                // Ordinary waves stay out of a boss fight.
                if !escort && self.boss.is_engaged() {
                    return;
                }
                if let Some(entity) = world_setup::spawn_enemy(
                    &mut self.store,
                    &self.registry,
                    &ctx,
                    &mut self.rng,
                    archetype,
                    position,
                    1.0,
                ) {
                    self.cooldowns.prime_loadout(self.store.world(), entity, ctx.tick);
                    debug!(archetype = archetype.0, escort, x = position.x, "enemy spawned");
                }
            }
            ScheduledAction::SpawnPowerUp { power_up } => {
                world_setup::spawn_power_up(&mut self.store, &self.registry, &ctx, &mut self.rng, power_up);
            }
            ScheduledAction::SpawnHazard { hazard } => {
                world_setup::spawn_hazard(&mut self.store, &self.registry, &ctx, &mut self.rng, hazard);
            }
            ScheduledAction::SpawnBoss { boss } => {
                if self.boss.is_engaged() {
                    return;
                }
                let Some(spec) = self.registry.boss(boss) else {
                    return;
                };
                if let Some(entity) =
                    world_setup::spawn_boss(&mut self.store, &self.registry, &ctx, &mut self.rng, boss)
                {
                    self.boss.begin(entity, boss, spec, ctx.tick);
                    self.director.begin_boss(spec.escort, ctx.tick);
                    let dropped = self.queue.cancel(ScheduledAction::is_wave_member);
                    self.events.push(GameEvent::BossArrived {
                        entity: EntityStore::id(entity),
                        boss: spec.key.clone(),
                    });
                    info!(boss = %spec.key, level = self.level, dropped, "boss arrived");
                }
            }
            ScheduledAction::AdvanceLevel => self.start_level(self.level + 1),
        }
    }
}
