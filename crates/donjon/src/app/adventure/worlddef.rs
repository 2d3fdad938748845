/// Registration dataset for the shipped adventure: three connected maps,
/// their portals, and the NPC rosters. Object names here are a contract
/// with the map XML under `assets/base/maps/`.
fn build_world(catalog: &MapCatalog) -> Result<WorldRegistry, WorldBuildError> {
    let player = Actor::new(Vec2::ZERO, PLAYER_SPEED, PLAYER_HP, PLAYER_ATTACK);
    let mut registry = WorldRegistry::new(player);

    registry.register(
        catalog,
        "world",
        vec![PortalConfig::new("enter_dungeon", "dungeon", "spawn_dungeon")],
        vec![npc_config(
            "mushroom",
            4,
            &[
                "Oh, a traveler. We do not see many of those.",
                "The dungeon to the north swallowed three of my cousins.",
                "If you must go in, keep your blade close.",
                "Do not say the mushroom never warned you.",
            ],
        )],
    )?;

    registry.register(
        catalog,
        "dungeon",
        vec![
            PortalConfig::new("exit_dungeon", "world", "enter_dungeon_exit"),
            PortalConfig::new("enter_dungeon_2", "dungeon_2", "spawn_dungeon_2"),
        ],
        vec![
            npc_config(
                "bandit",
                1,
                &[
                    "This corridor is mine, stranger.",
                    "Your coin or your blood. Pick fast.",
                ],
            ),
            npc_config(
                "wizard",
                1,
                &[
                    "Another fool stumbles into my study.",
                    "Leave, or become a component.",
                ],
            ),
            npc_config(
                "knight",
                1,
                &[
                    "Halt. None pass the lower stair.",
                    "I swore an oath to guard this door.",
                    "Draw your weapon, then.",
                ],
            ),
        ],
    )?;

    registry.register(
        catalog,
        "dungeon_2",
        vec![PortalConfig::new(
            "exit_dungeon_2",
            "dungeon",
            "enter_dungeon_2_exit",
        )],
        Vec::new(),
    )?;

    registry.validate()?;
    registry.set_current_map("world")?;
    registry.teleport_player("player")?;
    Ok(registry)
}

fn npc_config(name: &str, waypoint_count: usize, pages: &[&str]) -> NpcConfig {
    NpcConfig {
        name: name.to_string(),
        waypoint_count,
        dialog_pages: pages.iter().map(ToString::to_string).collect(),
        hp: NPC_HP,
        attack_strength: NPC_ATTACK,
        base_speed: NPC_BASE_SPEED,
    }
}
