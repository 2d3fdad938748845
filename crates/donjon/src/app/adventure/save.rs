type SaveLoadResult<T> = Result<T, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct SavedVec2 {
    x: f32,
    y: f32,
}

impl SavedVec2 {
    fn from_vec2(value: Vec2) -> Self {
        Self {
            x: value.x,
            y: value.y,
        }
    }

    fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedActor {
    position: SavedVec2,
    facing: Facing,
    hp: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedNpc {
    name: String,
    position: SavedVec2,
    facing: Facing,
    hp: i32,
    waypoint_index: usize,
    defeated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SavedMap {
    name: String,
    npcs: Vec<SavedNpc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct SaveGame {
    save_version: u32,
    current_map: String,
    player: SavedActor,
    maps: Vec<SavedMap>,
}

fn save_file_path() -> SaveLoadResult<PathBuf> {
    let app_paths = resolve_app_paths().map_err(|error| format!("resolve app paths: {error}"))?;
    Ok(app_paths.cache_dir.join("saves").join(SAVE_FILE))
}

fn build_save_game(registry: &WorldRegistry) -> SaveGame {
    let maps = registry
        .maps
        .iter()
        .map(|map| {
            let mut npcs: Vec<SavedNpc> = map
                .npcs
                .iter()
                .map(|npc| SavedNpc {
                    name: npc.name.clone(),
                    position: SavedVec2::from_vec2(npc.actor.position),
                    facing: npc.actor.facing,
                    hp: npc.actor.hp,
                    waypoint_index: npc.patrol.current,
                    defeated: false,
                })
                .collect();
            for name in &map.defeated_npcs {
                npcs.push(SavedNpc {
                    name: name.clone(),
                    position: SavedVec2 { x: 0.0, y: 0.0 },
                    facing: Facing::Down,
                    hp: 0,
                    waypoint_index: 0,
                    defeated: true,
                });
            }
            SavedMap {
                name: map.name.clone(),
                npcs,
            }
        })
        .collect();

    SaveGame {
        save_version: SAVE_VERSION,
        current_map: registry.current_map_name().to_string(),
        player: SavedActor {
            position: SavedVec2::from_vec2(registry.player().position),
            facing: registry.player().facing,
            hp: registry.player().hp,
        },
        maps,
    }
}

fn write_save(save: &SaveGame, path: &std::path::Path) -> SaveLoadResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|error| format!("create save dir '{}': {error}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(save)
        .map_err(|error| format!("encode save json: {error}"))?;
    fs::write(path, json).map_err(|error| format!("write save '{}': {error}", path.display()))
}

fn read_save(path: &std::path::Path) -> SaveLoadResult<SaveGame> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("read save '{}': {error}", path.display()))?;
    parse_save_game_json(&raw)
}

fn parse_save_game_json(raw: &str) -> SaveLoadResult<SaveGame> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    match serde_path_to_error::deserialize::<_, SaveGame>(&mut deserializer) {
        Ok(save) => Ok(save),
        Err(error) => {
            let path = error.path().to_string();
            let source = error.into_inner();
            if path.is_empty() || path == "." {
                Err(format!("parse save json: {source}"))
            } else {
                Err(format!("parse save json at {path}: {source}"))
            }
        }
    }
}

fn validation_err(path: &str, message: impl Into<String>) -> String {
    format!("validation failed at {path}: {}", message.into())
}

fn expected_actual(
    path: &str,
    expected: impl std::fmt::Display,
    actual: impl std::fmt::Display,
) -> String {
    validation_err(path, format!("expected {expected}, got {actual}"))
}

/// Field-by-field check against a freshly built registry, so applying the
/// save afterwards cannot miss. Failures leave the running game untouched.
fn validate_save_game(save: &SaveGame, registry: &WorldRegistry) -> SaveLoadResult<()> {
    if save.save_version != SAVE_VERSION {
        return Err(expected_actual(
            "save_version",
            SAVE_VERSION,
            save.save_version,
        ));
    }
    if registry.map(&save.current_map).is_none() {
        return Err(expected_actual(
            "current_map",
            "a registered map name",
            &save.current_map,
        ));
    }
    validate_finite("player.position.x", save.player.position.x)?;
    validate_finite("player.position.y", save.player.position.y)?;

    for (map_index, saved_map) in save.maps.iter().enumerate() {
        let map_path = format!("maps[{map_index}].name");
        let Some(map) = registry.map(&saved_map.name) else {
            return Err(expected_actual(
                &map_path,
                "a registered map name",
                &saved_map.name,
            ));
        };

        for (npc_index, saved_npc) in saved_map.npcs.iter().enumerate() {
            let npc_path = format!("maps[{map_index}].npcs[{npc_index}]");
            let Some(npc) = map.npcs.iter().find(|npc| npc.name == saved_npc.name) else {
                return Err(expected_actual(
                    &format!("{npc_path}.name"),
                    format!("an NPC registered on map '{}'", saved_map.name),
                    &saved_npc.name,
                ));
            };
            if saved_npc.defeated {
                continue;
            }
            validate_finite(&format!("{npc_path}.position.x"), saved_npc.position.x)?;
            validate_finite(&format!("{npc_path}.position.y"), saved_npc.position.y)?;
            let waypoint_count = npc.patrol.waypoints.len();
            if waypoint_count > 0 && saved_npc.waypoint_index >= waypoint_count {
                return Err(expected_actual(
                    &format!("{npc_path}.waypoint_index"),
                    format!("index below {waypoint_count}"),
                    saved_npc.waypoint_index,
                ));
            }
        }
    }
    Ok(())
}

fn validate_finite(path: &str, value: f32) -> SaveLoadResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(expected_actual(path, "finite number", value))
    }
}

/// Applies a validated save onto a freshly built registry: positions,
/// facings, hit points, waypoint indices, roster removals, current map.
fn apply_save_game(save: &SaveGame, registry: &mut WorldRegistry) -> SaveLoadResult<()> {
    validate_save_game(save, registry)?;

    for saved_map in &save.maps {
        let Some(map) = registry.map_mut(&saved_map.name) else {
            continue;
        };
        for saved_npc in &saved_map.npcs {
            if saved_npc.defeated {
                continue;
            }
            if let Some(npc) = map.npcs.iter_mut().find(|npc| npc.name == saved_npc.name) {
                npc.actor.set_position(saved_npc.position.to_vec2());
                npc.actor.facing = saved_npc.facing;
                npc.actor.hp = saved_npc.hp;
                npc.actor.commit_frame();
                npc.patrol.current = saved_npc.waypoint_index;
            }
        }
        let defeated: Vec<String> = saved_map
            .npcs
            .iter()
            .filter(|npc| npc.defeated)
            .map(|npc| npc.name.clone())
            .collect();
        map.npcs.retain(|npc| !defeated.contains(&npc.name));
        map.defeated_npcs = defeated;
    }

    registry
        .set_current_map(&save.current_map)
        .map_err(|error| error.to_string())?;
    let player = registry.player_mut();
    player.set_position(save.player.position.to_vec2());
    player.facing = save.player.facing;
    player.hp = save.player.hp;
    player.commit_frame();
    Ok(())
}
