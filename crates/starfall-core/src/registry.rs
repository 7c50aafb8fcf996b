//! Validated content tables.
//!
//! `ContentRegistry::validate` is the single place configuration can fail.
//! It resolves every string reference to a typed index, parses behavior tags,
//! and range-checks numeric fields. The simulation only ever sees the result.

use std::collections::HashMap;

use crate::content::*;
use crate::enums::{AttackSelection, BehaviorTag};
use crate::error::ConfigError;
use crate::types::{AbilityId, ArchetypeId, BossId, HazardId, PowerUpId};

/// Weighted random table over resolved ids.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable<T> {
    entries: Vec<(T, u32)>,
    total: u32,
}

impl<T: Copy> WeightedTable<T> {
    /// `None` when the weights do not fit in a `u32` total.
    pub fn new(entries: Vec<(T, u32)>) -> Option<Self> {
        let total = entries
            .iter()
            .try_fold(0u32, |acc, (_, w)| acc.checked_add(*w))?;
        Some(Self { entries, total })
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    pub fn total_weight(&self) -> u32 {
        self.total
    }

    pub fn entries(&self) -> &[(T, u32)] {
        &self.entries
    }

    /// Entry whose cumulative weight band contains `roll` (`0..total_weight`).
    pub fn pick(&self, roll: u32) -> Option<T> {
        let mut acc = 0u32;
        for &(item, weight) in &self.entries {
            acc += weight;
            if roll < acc {
                return Some(item);
            }
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnergySpec {
    pub max: f64,
    pub regen_per_tick: f64,
}

#[derive(Debug, Clone)]
pub struct PlayerSpec {
    pub health: f64,
    pub radius: f64,
    pub speed: f64,
    pub energy: Option<EnergySpec>,
    pub abilities: Vec<AbilityId>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeathBehavior {
    None,
    Split {
        child: ArchetypeId,
        scale: f64,
        offset: f64,
    },
    Burst {
        ability: AbilityId,
    },
}

#[derive(Debug, Clone)]
pub struct EnemySpec {
    pub key: String,
    pub behavior: BehaviorTag,
    pub health: f64,
    pub radius: f64,
    pub speed: f64,
    pub reward: u64,
    pub contact_damage: f64,
    pub dies_on_contact: bool,
    pub abilities: Vec<AbilityId>,
    pub death: DeathBehavior,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscortSpec {
    pub archetype: ArchetypeId,
    pub count: u32,
    pub interval_ticks: u64,
}

#[derive(Debug, Clone)]
pub struct BossSpec {
    pub key: String,
    pub behavior: BehaviorTag,
    pub health: f64,
    pub radius: f64,
    pub speed: f64,
    pub reward: u64,
    pub contact_damage: f64,
    pub phases: u32,
    pub attack_pool: Vec<AbilityId>,
    pub attack_cooldown_ticks: u64,
    pub phase_cooldown_factor: f64,
    pub selection: AttackSelection,
    pub escort: Option<EscortSpec>,
}

#[derive(Debug, Clone)]
pub struct LevelSpec {
    pub key: String,
    pub enemy_waves: Option<ScheduleDef>,
    pub wave_min: u32,
    pub wave_max: u32,
    pub enemies: WeightedTable<ArchetypeId>,
    pub power_up_schedule: Option<ScheduleDef>,
    pub power_ups: WeightedTable<PowerUpId>,
    pub hazard_schedule: Option<ScheduleDef>,
    pub hazards: WeightedTable<HazardId>,
    pub boss: Option<BossId>,
    pub boss_at_tick: u64,
}

/// Content tables with every reference resolved.
#[derive(Debug, Clone)]
pub struct ContentRegistry {
    pub player: PlayerSpec,
    pub abilities: Vec<AbilityDef>,
    pub enemies: Vec<EnemySpec>,
    pub bosses: Vec<BossSpec>,
    pub power_ups: Vec<PowerUpDef>,
    pub hazards: Vec<HazardDef>,
    pub levels: Vec<LevelSpec>,
    pub achievements: Vec<AchievementDef>,
}

/// Key → index map for one table, rejecting duplicates.
struct KeyIndex {
    map: HashMap<String, u16>,
}

impl KeyIndex {
    fn build<'a>(
        table: &'static str,
        keys: impl Iterator<Item = &'a str>,
    ) -> Result<Self, ConfigError> {
        let mut map = HashMap::new();
        for (i, key) in keys.enumerate() {
            let index = u16::try_from(i)
                .map_err(|_| ConfigError::invalid(key, "table size", "too many entries"))?;
            if map.insert(key.to_string(), index).is_some() {
                return Err(ConfigError::DuplicateKey {
                    table,
                    key: key.to_string(),
                });
            }
        }
        Ok(Self { map })
    }

    fn get(&self, key: &str) -> Option<u16> {
        self.map.get(key).copied()
    }
}

fn parse_behavior(owner: &str, tag: &str) -> Result<BehaviorTag, ConfigError> {
    match tag.parse::<BehaviorTag>() {
        // The player tag is reserved for the player ship.
        Ok(BehaviorTag::Player) | Err(_) => Err(ConfigError::UnknownBehavior {
            owner: owner.to_string(),
            tag: tag.to_string(),
        }),
        Ok(parsed) => Ok(parsed),
    }
}

fn require_positive(key: &str, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, field, format!("must be > 0, got {value}")))
    }
}

fn require_non_negative(key: &str, field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(key, field, format!("must be >= 0, got {value}")))
    }
}

fn validate_schedule(key: &str, schedule: &Option<ScheduleDef>) -> Result<(), ConfigError> {
    if let Some(s) = schedule {
        if s.base_interval_ticks == 0 {
            return Err(ConfigError::invalid(key, "base_interval_ticks", "must be >= 1"));
        }
        if s.jitter_ticks >= s.base_interval_ticks {
            return Err(ConfigError::invalid(
                key,
                "jitter_ticks",
                format!(
                    "jitter {} must be smaller than base interval {}",
                    s.jitter_ticks, s.base_interval_ticks
                ),
            ));
        }
    }
    Ok(())
}

fn validate_ability(def: &AbilityDef) -> Result<(), ConfigError> {
    let key = def.key.as_str();
    require_non_negative(key, "damage", def.damage)?;
    require_positive(key, "speed", def.speed)?;
    require_positive(key, "radius", def.radius)?;
    require_non_negative(key, "energy_cost", def.energy_cost)?;
    if def.interval_ticks == 0 {
        return Err(ConfigError::invalid(key, "interval_ticks", "must be >= 1"));
    }
    if def.ttl_ticks == 0 {
        return Err(ConfigError::invalid(key, "ttl_ticks", "must be >= 1"));
    }
    match def.pattern {
        AbilityPattern::Single | AbilityPattern::Piercing => {}
        AbilityPattern::Spread { count, arc_degrees } => {
            if count == 0 {
                return Err(ConfigError::invalid(key, "pattern.count", "must be >= 1"));
            }
            if !(0.0..=360.0).contains(&arc_degrees) {
                return Err(ConfigError::invalid(
                    key,
                    "pattern.arc_degrees",
                    "must be within 0..=360",
                ));
            }
        }
        AbilityPattern::Homing { turn_rate } => {
            require_positive(key, "pattern.turn_rate", turn_rate)?;
        }
        AbilityPattern::Explosive { radius } => {
            require_positive(key, "pattern.radius", radius)?;
        }
        AbilityPattern::Chain {
            jumps,
            range,
            falloff,
        } => {
            if jumps == 0 {
                return Err(ConfigError::invalid(key, "pattern.jumps", "must be >= 1"));
            }
            require_positive(key, "pattern.range", range)?;
            if !(falloff > 0.0 && falloff <= 1.0) {
                return Err(ConfigError::invalid(
                    key,
                    "pattern.falloff",
                    "must be within (0, 1]",
                ));
            }
        }
    }
    Ok(())
}

impl ContentRegistry {
    /// Validate raw tables. Returns the first problem found, naming its key.
    pub fn validate(def: &ContentDef) -> Result<Self, ConfigError> {
        let abilities = KeyIndex::build("ability", def.abilities.iter().map(|a| a.key.as_str()))?;
        let enemies = KeyIndex::build("enemy", def.enemies.iter().map(|e| e.key.as_str()))?;
        let bosses = KeyIndex::build("boss", def.bosses.iter().map(|b| b.key.as_str()))?;
        let power_ups =
            KeyIndex::build("power-up", def.power_ups.iter().map(|p| p.key.as_str()))?;
        let hazards = KeyIndex::build("hazard", def.hazards.iter().map(|h| h.key.as_str()))?;
        KeyIndex::build("level", def.levels.iter().map(|l| l.key.as_str()))?;
        KeyIndex::build(
            "achievement",
            def.achievements.iter().map(|a| a.id.as_str()),
        )?;

        let ability_ref = |key: &str, owner: &str| -> Result<AbilityId, ConfigError> {
            abilities
                .get(key)
                .map(AbilityId)
                .ok_or_else(|| ConfigError::UnknownAbility {
                    key: key.to_string(),
                    referenced_by: owner.to_string(),
                })
        };
        let archetype_ref = |key: &str, owner: &str| -> Result<ArchetypeId, ConfigError> {
            enemies
                .get(key)
                .map(ArchetypeId)
                .ok_or_else(|| ConfigError::UnknownArchetype {
                    key: key.to_string(),
                    referenced_by: owner.to_string(),
                })
        };

        for ability in &def.abilities {
            validate_ability(ability)?;
        }

        let player = Self::validate_player(&def.player, &ability_ref)?;

        let mut enemy_specs = Vec::with_capacity(def.enemies.len());
        for enemy in &def.enemies {
            enemy_specs.push(Self::validate_enemy(enemy, &ability_ref, &archetype_ref)?);
        }
        // A split child may not split again, so one death yields at most two.
        for spec in &enemy_specs {
            if let DeathBehavior::Split { child, .. } = spec.death {
                let child_spec = &enemy_specs[child.0 as usize];
                if matches!(child_spec.death, DeathBehavior::Split { .. }) {
                    return Err(ConfigError::invalid(
                        &spec.key,
                        "death.child",
                        format!("child '{}' must not split again", child_spec.key),
                    ));
                }
            }
        }

        let mut boss_specs = Vec::with_capacity(def.bosses.len());
        for boss in &def.bosses {
            boss_specs.push(Self::validate_boss(boss, &ability_ref, &archetype_ref)?);
        }

        for p in &def.power_ups {
            require_non_negative(&p.key, "magnitude", p.magnitude)?;
            require_positive(&p.key, "radius", p.radius)?;
            if p.lifetime_ticks == 0 {
                return Err(ConfigError::invalid(&p.key, "lifetime_ticks", "must be >= 1"));
            }
            if p.kind.is_timed() && p.duration_ticks == 0 {
                return Err(ConfigError::invalid(
                    &p.key,
                    "duration_ticks",
                    "timed power-ups need a duration",
                ));
            }
        }

        for h in &def.hazards {
            require_positive(&h.key, "radius", h.radius)?;
            require_non_negative(&h.key, "intensity", h.intensity)?;
            require_non_negative(&h.key, "speed", h.speed)?;
            if h.ttl_ticks == 0 {
                return Err(ConfigError::invalid(&h.key, "ttl_ticks", "must be >= 1"));
            }
        }

        if def.levels.is_empty() {
            return Err(ConfigError::invalid("levels", "levels", "at least one level required"));
        }
        let mut level_specs = Vec::with_capacity(def.levels.len());
        for level in &def.levels {
            let key = level.key.as_str();
            validate_schedule(key, &level.enemy_waves)?;
            validate_schedule(key, &level.power_up_schedule)?;
            validate_schedule(key, &level.hazard_schedule)?;
            if level.wave_min == 0 || level.wave_min > level.wave_max {
                return Err(ConfigError::invalid(
                    key,
                    "wave_min",
                    format!(
                        "need 1 <= wave_min <= wave_max, got {}..{}",
                        level.wave_min, level.wave_max
                    ),
                ));
            }

            let mut enemy_table = Vec::new();
            for w in &level.enemies {
                Self::check_weight(key, w)?;
                enemy_table.push((archetype_ref(w.key.as_str(), key)?, w.weight));
            }
            let mut power_up_table = Vec::new();
            for w in &level.power_ups {
                Self::check_weight(key, w)?;
                let id = power_ups.get(&w.key).map(PowerUpId).ok_or_else(|| {
                    ConfigError::UnknownPowerUp {
                        key: w.key.clone(),
                        referenced_by: key.to_string(),
                    }
                })?;
                power_up_table.push((id, w.weight));
            }
            let mut hazard_table = Vec::new();
            for w in &level.hazards {
                Self::check_weight(key, w)?;
                let id = hazards.get(&w.key).map(HazardId).ok_or_else(|| {
                    ConfigError::UnknownHazard {
                        key: w.key.clone(),
                        referenced_by: key.to_string(),
                    }
                })?;
                hazard_table.push((id, w.weight));
            }
            let boss = match &level.boss {
                Some(b) => Some(bosses.get(b).map(BossId).ok_or_else(|| {
                    ConfigError::UnknownBoss {
                        key: b.clone(),
                        referenced_by: key.to_string(),
                    }
                })?),
                None => None,
            };

            level_specs.push(LevelSpec {
                key: level.key.clone(),
                enemy_waves: level.enemy_waves,
                wave_min: level.wave_min,
                wave_max: level.wave_max,
                enemies: Self::weighted(key, "enemies", enemy_table)?,
                power_up_schedule: level.power_up_schedule,
                power_ups: Self::weighted(key, "power_ups", power_up_table)?,
                hazard_schedule: level.hazard_schedule,
                hazards: Self::weighted(key, "hazards", hazard_table)?,
                boss,
                boss_at_tick: level.boss_at_tick,
            });
        }

        for a in &def.achievements {
            let zero = match a.predicate {
                AchievementPredicate::Kills { count }
                | AchievementPredicate::BossesDefeated { count }
                | AchievementPredicate::PowerUpsCollected { count }
                | AchievementPredicate::ShotsFired { count } => count == 0,
                AchievementPredicate::Score { points } => points == 0,
                AchievementPredicate::SurvivalSecs { secs } => secs == 0,
                AchievementPredicate::Flawless { ticks } => ticks == 0,
            };
            if zero {
                return Err(ConfigError::invalid(&a.id, "predicate", "threshold must be > 0"));
            }
        }

        Ok(Self {
            player,
            abilities: def.abilities.clone(),
            enemies: enemy_specs,
            bosses: boss_specs,
            power_ups: def.power_ups.clone(),
            hazards: def.hazards.clone(),
            levels: level_specs,
            achievements: def.achievements.clone(),
        })
    }

    /// Validated built-in tables.
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::validate(&ContentDef::builtin())
    }

    fn check_weight(level: &str, w: &WeightedDef) -> Result<(), ConfigError> {
        if w.weight == 0 {
            return Err(ConfigError::invalid(
                level,
                "weight",
                format!("entry '{}' has zero weight", w.key),
            ));
        }
        Ok(())
    }

    fn weighted<T: Copy>(
        level: &str,
        field: &'static str,
        entries: Vec<(T, u32)>,
    ) -> Result<WeightedTable<T>, ConfigError> {
        WeightedTable::new(entries)
            .ok_or_else(|| ConfigError::invalid(level, field, "total weight overflows u32"))
    }

    fn validate_player(
        def: &PlayerDef,
        ability_ref: &impl Fn(&str, &str) -> Result<AbilityId, ConfigError>,
    ) -> Result<PlayerSpec, ConfigError> {
        require_positive("player", "health", def.health)?;
        require_positive("player", "radius", def.radius)?;
        require_positive("player", "speed", def.speed)?;
        require_non_negative("player", "energy", def.energy)?;
        require_non_negative("player", "energy_regen_per_tick", def.energy_regen_per_tick)?;
        if def.abilities.is_empty() {
            return Err(ConfigError::invalid("player", "abilities", "at least one required"));
        }
        let abilities = def
            .abilities
            .iter()
            .map(|k| ability_ref(k.as_str(), "player"))
            .collect::<Result<Vec<_>, _>>()?;
        let energy = (def.energy > 0.0).then_some(EnergySpec {
            max: def.energy,
            regen_per_tick: def.energy_regen_per_tick,
        });
        Ok(PlayerSpec {
            health: def.health,
            radius: def.radius,
            speed: def.speed,
            energy,
            abilities,
        })
    }

    fn validate_enemy(
        def: &EnemyDef,
        ability_ref: &impl Fn(&str, &str) -> Result<AbilityId, ConfigError>,
        archetype_ref: &impl Fn(&str, &str) -> Result<ArchetypeId, ConfigError>,
    ) -> Result<EnemySpec, ConfigError> {
        let key = def.key.as_str();
        let behavior = parse_behavior(key, &def.behavior)?;
        require_positive(key, "health", def.health)?;
        require_positive(key, "radius", def.radius)?;
        require_non_negative(key, "speed", def.speed)?;
        require_non_negative(key, "contact_damage", def.contact_damage)?;
        let abilities = def
            .abilities
            .iter()
            .map(|a| ability_ref(a.as_str(), key))
            .collect::<Result<Vec<_>, _>>()?;
        let death = match &def.death {
            DeathDef::None => DeathBehavior::None,
            DeathDef::Split {
                child,
                scale,
                offset,
            } => {
                if !(*scale > 0.0 && *scale < 1.0) {
                    return Err(ConfigError::invalid(
                        key,
                        "death.scale",
                        "split children must be strictly smaller (0 < scale < 1)",
                    ));
                }
                require_positive(key, "death.offset", *offset)?;
                DeathBehavior::Split {
                    child: archetype_ref(child.as_str(), key)?,
                    scale: *scale,
                    offset: *offset,
                }
            }
            DeathDef::Burst { ability } => DeathBehavior::Burst {
                ability: ability_ref(ability.as_str(), key)?,
            },
        };
        Ok(EnemySpec {
            key: def.key.clone(),
            behavior,
            health: def.health,
            radius: def.radius,
            speed: def.speed,
            reward: def.reward,
            contact_damage: def.contact_damage,
            dies_on_contact: def.dies_on_contact,
            abilities,
            death,
        })
    }

    fn validate_boss(
        def: &BossDef,
        ability_ref: &impl Fn(&str, &str) -> Result<AbilityId, ConfigError>,
        archetype_ref: &impl Fn(&str, &str) -> Result<ArchetypeId, ConfigError>,
    ) -> Result<BossSpec, ConfigError> {
        let key = def.key.as_str();
        let behavior = parse_behavior(key, &def.behavior)?;
        require_positive(key, "health", def.health)?;
        require_positive(key, "radius", def.radius)?;
        require_non_negative(key, "speed", def.speed)?;
        require_non_negative(key, "contact_damage", def.contact_damage)?;
        if def.phases == 0 {
            return Err(ConfigError::invalid(key, "phases", "must be >= 1"));
        }
        if def.attack_pool.is_empty() {
            return Err(ConfigError::MalformedAttackPool {
                boss: def.key.clone(),
                reason: "attack pool is empty".to_string(),
            });
        }
        let mut attack_pool = Vec::with_capacity(def.attack_pool.len());
        for attack in &def.attack_pool {
            let id = ability_ref(attack.as_str(), key).map_err(|_| ConfigError::MalformedAttackPool {
                boss: def.key.clone(),
                reason: format!("unknown ability '{attack}'"),
            })?;
            attack_pool.push(id);
        }
        if def.attack_cooldown_ticks == 0 {
            return Err(ConfigError::MalformedAttackPool {
                boss: def.key.clone(),
                reason: "attack cooldown must be >= 1 tick".to_string(),
            });
        }
        if !(def.phase_cooldown_factor > 0.0 && def.phase_cooldown_factor <= 1.0) {
            return Err(ConfigError::invalid(
                key,
                "phase_cooldown_factor",
                "must be within (0, 1]",
            ));
        }
        let escort = match &def.escort {
            Some(e) => {
                if e.count == 0 || e.interval_ticks == 0 {
                    return Err(ConfigError::invalid(
                        key,
                        "escort",
                        "escort count and interval must be >= 1",
                    ));
                }
                Some(EscortSpec {
                    archetype: archetype_ref(e.archetype.as_str(), key)?,
                    count: e.count,
                    interval_ticks: e.interval_ticks,
                })
            }
            None => None,
        };
        Ok(BossSpec {
            key: def.key.clone(),
            behavior,
            health: def.health,
            radius: def.radius,
            speed: def.speed,
            reward: def.reward,
            contact_damage: def.contact_damage,
            phases: def.phases,
            attack_pool,
            attack_cooldown_ticks: def.attack_cooldown_ticks,
            phase_cooldown_factor: def.phase_cooldown_factor,
            selection: def.selection,
            escort,
        })
    }

    // --- Lookups ---

    pub fn ability(&self, id: AbilityId) -> Option<&AbilityDef> {
        self.abilities.get(id.0 as usize)
    }

    pub fn enemy(&self, id: ArchetypeId) -> Option<&EnemySpec> {
        self.enemies.get(id.0 as usize)
    }

    pub fn boss(&self, id: BossId) -> Option<&BossSpec> {
        self.bosses.get(id.0 as usize)
    }

    pub fn power_up(&self, id: PowerUpId) -> Option<&PowerUpDef> {
        self.power_ups.get(id.0 as usize)
    }

    pub fn hazard(&self, id: HazardId) -> Option<&HazardDef> {
        self.hazards.get(id.0 as usize)
    }

    /// Level profile for a 1-based level number; profiles repeat in a cycle.
    pub fn level(&self, level: u32) -> &LevelSpec {
        let index = (level.max(1) - 1) as usize % self.levels.len();
        &self.levels[index]
    }

    pub fn find_archetype(&self, key: &str) -> Option<ArchetypeId> {
        self.enemies
            .iter()
            .position(|e| e.key == key)
            .map(|i| ArchetypeId(i as u16))
    }

    pub fn find_ability(&self, key: &str) -> Option<AbilityId> {
        self.abilities
            .iter()
            .position(|a| a.key == key)
            .map(|i| AbilityId(i as u16))
    }

    pub fn find_boss(&self, key: &str) -> Option<BossId> {
        self.bosses
            .iter()
            .position(|b| b.key == key)
            .map(|i| BossId(i as u16))
    }
}
