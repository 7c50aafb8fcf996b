//! Built-in content tables for the default game.
//!
//! Two level profiles, each ending in a boss. Profiles repeat with a health
//! multiplier once the list is exhausted.

use crate::content::*;
use crate::enums::{AttackSelection, HazardKind, PowerUpKind};

fn ability(
    key: &str,
    pattern: AbilityPattern,
    damage: f64,
    speed: f64,
    interval_ticks: u64,
    energy_cost: f64,
    ttl_ticks: u32,
    radius: f64,
) -> AbilityDef {
    AbilityDef {
        key: key.to_string(),
        pattern,
        damage,
        speed,
        interval_ticks,
        energy_cost,
        ttl_ticks,
        radius,
    }
}

fn enemy(key: &str, behavior: &str, health: f64, radius: f64, speed: f64, reward: u64) -> EnemyDef {
    EnemyDef {
        key: key.to_string(),
        behavior: behavior.to_string(),
        health,
        radius,
        speed,
        reward,
        contact_damage: 20.0,
        dies_on_contact: false,
        abilities: Vec::new(),
        death: DeathDef::None,
    }
}

fn weighted(key: &str, weight: u32) -> WeightedDef {
    WeightedDef {
        key: key.to_string(),
        weight,
    }
}

fn power_up(key: &str, kind: PowerUpKind, magnitude: f64, duration_ticks: u32) -> PowerUpDef {
    PowerUpDef {
        key: key.to_string(),
        kind,
        magnitude,
        duration_ticks,
        lifetime_ticks: 480,
        radius: 12.0,
    }
}

fn hazard(key: &str, kind: HazardKind, radius: f64, intensity: f64, ttl: u32, speed: f64) -> HazardDef {
    HazardDef {
        key: key.to_string(),
        kind,
        radius,
        intensity,
        ttl_ticks: ttl,
        speed,
    }
}

fn achievement(id: &str, predicate: AchievementPredicate) -> AchievementDef {
    AchievementDef {
        id: id.to_string(),
        predicate,
    }
}

impl ContentDef {
    pub fn builtin() -> Self {
        let abilities = vec![
            // Player weapons
            ability("blaster", AbilityPattern::Single, 1.0, 520.0, 12, 2.0, 90, 4.0),
            ability("lance", AbilityPattern::Piercing, 2.0, 640.0, 40, 12.0, 75, 5.0),
            ability(
                "seeker",
                AbilityPattern::Homing { turn_rate: 4.0 },
                1.5,
                380.0,
                30,
                8.0,
                150,
                5.0,
            ),
            // Enemy weapons
            ability("enemy_shot", AbilityPattern::Single, 10.0, 260.0, 90, 0.0, 180, 5.0),
            ability(
                "enemy_spread",
                AbilityPattern::Spread {
                    count: 3,
                    arc_degrees: 30.0,
                },
                8.0,
                240.0,
                120,
                0.0,
                180,
                5.0,
            ),
            ability(
                "splinter_ring",
                AbilityPattern::Spread {
                    count: 8,
                    arc_degrees: 360.0,
                },
                6.0,
                200.0,
                1,
                0.0,
                120,
                4.0,
            ),
            // Boss weapons
            ability(
                "boss_barrage",
                AbilityPattern::Spread {
                    count: 7,
                    arc_degrees: 90.0,
                },
                10.0,
                280.0,
                20,
                0.0,
                200,
                6.0,
            ),
            ability(
                "boss_bomb",
                AbilityPattern::Explosive { radius: 60.0 },
                20.0,
                180.0,
                20,
                0.0,
                240,
                10.0,
            ),
            ability(
                "boss_arc",
                AbilityPattern::Chain {
                    jumps: 2,
                    range: 120.0,
                    falloff: 0.5,
                },
                15.0,
                320.0,
                20,
                0.0,
                200,
                6.0,
            ),
        ];

        let mut weaver = enemy("weaver", "oscillating", 2.0, 14.0, 80.0, 150);
        weaver.abilities = vec!["enemy_shot".to_string()];
        let orbiter = enemy("orbiter", "orbiting", 3.0, 14.0, 40.0, 200);
        let mut charger = enemy("charger", "charge", 2.0, 16.0, 70.0, 200);
        charger.contact_damage = 25.0;
        let seeker = enemy("seeker_drone", "homing", 2.0, 12.0, 110.0, 200);
        let mut blinker = enemy("blinker", "teleport", 2.0, 14.0, 50.0, 250);
        blinker.abilities = vec!["enemy_shot".to_string()];
        let mut phantom = enemy("phantom", "cloaked", 3.0, 16.0, 60.0, 300);
        phantom.abilities = vec!["enemy_spread".to_string()];
        let mut rammer = enemy("rammer", "kamikaze", 1.0, 12.0, 90.0, 150);
        rammer.contact_damage = 30.0;
        rammer.dies_on_contact = true;
        let mut splitter = enemy("splitter", "straight", 3.0, 22.0, 70.0, 250);
        splitter.death = DeathDef::Split {
            child: "basic".to_string(),
            scale: 0.5,
            offset: 22.0,
        };
        let mut bomber = enemy("bomber", "straight", 4.0, 20.0, 60.0, 300);
        bomber.death = DeathDef::Burst {
            ability: "splinter_ring".to_string(),
        };

        let enemies = vec![
            enemy("basic", "straight", 1.0, 14.0, 90.0, 100),
            weaver,
            orbiter,
            charger,
            seeker,
            blinker,
            phantom,
            rammer,
            splitter,
            bomber,
        ];

        let bosses = vec![
            BossDef {
                key: "dreadnought".to_string(),
                behavior: "oscillating".to_string(),
                health: 300.0,
                radius: 48.0,
                speed: 0.0,
                reward: 5000,
                contact_damage: 40.0,
                phases: 3,
                attack_pool: vec!["boss_barrage".to_string(), "boss_bomb".to_string()],
                attack_cooldown_ticks: 90,
                phase_cooldown_factor: 0.7,
                selection: AttackSelection::Sequential,
                escort: None,
            },
            BossDef {
                key: "hive_queen".to_string(),
                behavior: "orbiting".to_string(),
                health: 400.0,
                radius: 52.0,
                speed: 0.0,
                reward: 8000,
                contact_damage: 40.0,
                phases: 4,
                attack_pool: vec![
                    "enemy_spread".to_string(),
                    "boss_arc".to_string(),
                    "boss_barrage".to_string(),
                ],
                attack_cooldown_ticks: 100,
                phase_cooldown_factor: 0.75,
                selection: AttackSelection::Random,
                escort: Some(EscortDef {
                    archetype: "rammer".to_string(),
                    count: 2,
                    interval_ticks: 300,
                }),
            },
        ];

        let power_ups = vec![
            power_up("repair_kit", PowerUpKind::Repair, 25.0, 0),
            power_up("battery", PowerUpKind::Recharge, 50.0, 0),
            power_up("upgrade_core", PowerUpKind::Upgrade, 1.0, 0),
            power_up("bounty", PowerUpKind::ScoreBonus, 500.0, 0),
            power_up("overdrive", PowerUpKind::RapidFire, 2.0, 600),
            power_up("scatter", PowerUpKind::SpreadShot, 2.0, 600),
            power_up("barrier", PowerUpKind::Shield, 40.0, 900),
        ];

        let hazards = vec![
            hazard("asteroid", HazardKind::Asteroid, 22.0, 15.0, 900, 60.0),
            hazard("mine", HazardKind::Mine, 12.0, 30.0, 1200, 0.0),
            hazard("radiation", HazardKind::Radiation, 70.0, 0.5, 600, 0.0),
            hazard("gravity_well", HazardKind::GravityWell, 120.0, 60.0, 600, 0.0),
        ];

        let levels = vec![
            LevelDef {
                key: "outer_rim".to_string(),
                enemy_waves: Some(ScheduleDef {
                    base_interval_ticks: 240,
                    jitter_ticks: 60,
                }),
                wave_min: 3,
                wave_max: 5,
                enemies: vec![
                    weighted("basic", 5),
                    weighted("weaver", 3),
                    weighted("charger", 2),
                    weighted("splitter", 1),
                ],
                power_up_schedule: Some(ScheduleDef {
                    base_interval_ticks: 900,
                    jitter_ticks: 200,
                }),
                power_ups: vec![
                    weighted("repair_kit", 3),
                    weighted("overdrive", 1),
                    weighted("upgrade_core", 1),
                    weighted("battery", 2),
                ],
                hazard_schedule: Some(ScheduleDef {
                    base_interval_ticks: 1200,
                    jitter_ticks: 300,
                }),
                hazards: vec![weighted("asteroid", 3), weighted("mine", 1)],
                boss: Some("dreadnought".to_string()),
                boss_at_tick: 3600,
            },
            LevelDef {
                key: "nebula".to_string(),
                enemy_waves: Some(ScheduleDef {
                    base_interval_ticks: 200,
                    jitter_ticks: 50,
                }),
                wave_min: 3,
                wave_max: 6,
                enemies: vec![
                    weighted("basic", 3),
                    weighted("orbiter", 2),
                    weighted("seeker_drone", 2),
                    weighted("blinker", 2),
                    weighted("phantom", 1),
                    weighted("rammer", 2),
                    weighted("bomber", 1),
                ],
                power_up_schedule: Some(ScheduleDef {
                    base_interval_ticks: 800,
                    jitter_ticks: 200,
                }),
                power_ups: vec![
                    weighted("repair_kit", 2),
                    weighted("scatter", 1),
                    weighted("barrier", 1),
                    weighted("bounty", 1),
                ],
                hazard_schedule: Some(ScheduleDef {
                    base_interval_ticks: 900,
                    jitter_ticks: 300,
                }),
                hazards: vec![
                    weighted("asteroid", 2),
                    weighted("radiation", 1),
                    weighted("gravity_well", 1),
                ],
                boss: Some("hive_queen".to_string()),
                boss_at_tick: 4800,
            },
        ];

        let achievements = vec![
            achievement("first_blood", AchievementPredicate::Kills { count: 1 }),
            achievement("centurion", AchievementPredicate::Kills { count: 100 }),
            achievement("high_roller", AchievementPredicate::Score { points: 10_000 }),
            achievement("survivor", AchievementPredicate::SurvivalSecs { secs: 120 }),
            achievement("giant_slayer", AchievementPredicate::BossesDefeated { count: 1 }),
            achievement("collector", AchievementPredicate::PowerUpsCollected { count: 5 }),
            achievement("trigger_happy", AchievementPredicate::ShotsFired { count: 500 }),
            achievement("untouchable", AchievementPredicate::Flawless { ticks: 1800 }),
        ];

        ContentDef {
            player: PlayerDef {
                health: 100.0,
                radius: 14.0,
                speed: 260.0,
                energy: 100.0,
                energy_regen_per_tick: 0.35,
                abilities: vec!["blaster".to_string(), "seeker".to_string()],
            },
            abilities,
            enemies,
            bosses,
            power_ups,
            hazards,
            levels,
            achievements,
        }
    }
}
