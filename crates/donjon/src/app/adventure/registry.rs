#[derive(Debug, Error, PartialEq, Eq)]
enum WorldBuildError {
    #[error("map '{map}' not found in the compiled catalog")]
    MapNotInCatalog { map: String },
    #[error("map '{map}' has no named object '{object}'")]
    MissingNamedObject { map: String, object: String },
    #[error("portal '{portal}' on map '{map}' targets unregistered map '{target}'")]
    PortalTargetNotRegistered {
        map: String,
        portal: String,
        target: String,
    },
}

/// One-directional map connection. The trigger rect lives on the owning
/// map; the spawn point lives on the target map.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PortalConfig {
    trigger_name: String,
    target_map: String,
    spawn_name: String,
}

impl PortalConfig {
    fn new(trigger_name: &str, target_map: &str, spawn_name: &str) -> Self {
        Self {
            trigger_name: trigger_name.to_string(),
            target_map: target_map.to_string(),
            spawn_name: spawn_name.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct NpcConfig {
    name: String,
    waypoint_count: usize,
    dialog_pages: Vec<String>,
    hp: i32,
    attack_strength: i32,
    base_speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct Npc {
    name: String,
    actor: Actor,
    patrol: PatrolController,
    dialog_pages: Vec<String>,
    base_speed: f32,
}

#[derive(Debug, Clone, PartialEq)]
struct MapRuntime {
    name: String,
    walls: Vec<Rect>,
    portals: Vec<PortalConfig>,
    npcs: Vec<Npc>,
    defeated_npcs: Vec<String>,
    named_rects: HashMap<String, Rect>,
}

impl MapRuntime {
    fn named_rect(&self, name: &str) -> Option<Rect> {
        self.named_rects.get(name).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct InteractionStart {
    npc_index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PortalCrossing {
    from_map: String,
    to_map: String,
    spawn_name: String,
}

/// Owns every loaded map, the NPC rosters, the single current-map pointer,
/// and the player actor. All positions are in the current map's pixel
/// space; rendering is the scene's job.
#[derive(Debug, Clone, PartialEq)]
struct WorldRegistry {
    maps: Vec<MapRuntime>,
    current_map: usize,
    player: Actor,
}

impl WorldRegistry {
    fn new(player: Actor) -> Self {
        Self {
            maps: Vec::new(),
            current_map: 0,
            player,
        }
    }

    /// Builds a map runtime from the compiled catalog. Every portal
    /// trigger and NPC waypoint name must resolve against map data here;
    /// a miss is a fatal build error. Re-registering a name replaces the
    /// previous entry.
    fn register(
        &mut self,
        catalog: &MapCatalog,
        map_name: &str,
        portals: Vec<PortalConfig>,
        npc_configs: Vec<NpcConfig>,
    ) -> Result<(), WorldBuildError> {
        let def = catalog
            .map_by_name(map_name)
            .ok_or_else(|| WorldBuildError::MapNotInCatalog {
                map: map_name.to_string(),
            })?;

        let named_rects: HashMap<String, Rect> = def
            .named_objects()
            .iter()
            .map(|object| (object.name.clone(), object.rect()))
            .collect();

        for portal in &portals {
            if !named_rects.contains_key(&portal.trigger_name) {
                return Err(WorldBuildError::MissingNamedObject {
                    map: map_name.to_string(),
                    object: portal.trigger_name.clone(),
                });
            }
        }

        let mut npcs = Vec::with_capacity(npc_configs.len());
        for config in npc_configs {
            let mut waypoints = Vec::with_capacity(config.waypoint_count);
            for n in 1..=config.waypoint_count {
                let waypoint_name = format!("{}_path{n}", config.name);
                let rect = named_rects.get(&waypoint_name).copied().ok_or_else(|| {
                    WorldBuildError::MissingNamedObject {
                        map: map_name.to_string(),
                        object: waypoint_name.clone(),
                    }
                })?;
                waypoints.push(rect);
            }

            let spawn = waypoints
                .first()
                .map(Rect::top_left)
                .unwrap_or(Vec2::ZERO);
            let mut actor = Actor::new(spawn, config.base_speed, config.hp, config.attack_strength);
            actor.commit_frame();

            npcs.push(Npc {
                name: config.name,
                actor,
                patrol: PatrolController::new(waypoints),
                dialog_pages: config.dialog_pages,
                base_speed: config.base_speed,
            });
        }

        let runtime = MapRuntime {
            name: map_name.to_string(),
            walls: def.collision_rects().to_vec(),
            portals,
            npcs,
            defeated_npcs: Vec::new(),
            named_rects,
        };

        if let Some(existing) = self.maps.iter_mut().find(|map| map.name == map_name) {
            *existing = runtime;
        } else {
            self.maps.push(runtime);
        }
        Ok(())
    }

    /// Cross-map checks deferred until every map is registered: portal
    /// targets must exist and their spawn points must resolve.
    fn validate(&self) -> Result<(), WorldBuildError> {
        for map in &self.maps {
            for portal in &map.portals {
                let Some(target) = self.maps.iter().find(|m| m.name == portal.target_map) else {
                    return Err(WorldBuildError::PortalTargetNotRegistered {
                        map: map.name.clone(),
                        portal: portal.trigger_name.clone(),
                        target: portal.target_map.clone(),
                    });
                };
                if !target.named_rects.contains_key(&portal.spawn_name) {
                    return Err(WorldBuildError::MissingNamedObject {
                        map: target.name.clone(),
                        object: portal.spawn_name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn set_current_map(&mut self, name: &str) -> Result<(), WorldBuildError> {
        let index = self
            .maps
            .iter()
            .position(|map| map.name == name)
            .ok_or_else(|| WorldBuildError::MapNotInCatalog {
                map: name.to_string(),
            })?;
        self.current_map = index;
        Ok(())
    }

    /// Repositions the player at a named point of the current map and
    /// commits the frame immediately, so the same tick's wall pass cannot
    /// revert the teleport.
    fn teleport_player(&mut self, point_name: &str) -> Result<(), WorldBuildError> {
        let map = &self.maps[self.current_map];
        let rect = map
            .named_rect(point_name)
            .ok_or_else(|| WorldBuildError::MissingNamedObject {
                map: map.name.clone(),
                object: point_name.to_string(),
            })?;
        self.player.set_position(rect.top_left());
        self.player.commit_frame();
        Ok(())
    }

    /// One simulation tick on the current map: commit, move, patrol,
    /// portals, proximity freeze, wall collision, in that order. Reports
    /// the portal crossing, if one fired, so the scene can swap tilemaps.
    fn update(&mut self, player_direction: Option<Facing>) -> Option<PortalCrossing> {
        self.player.commit_frame();
        for npc in &mut self.maps[self.current_map].npcs {
            npc.actor.commit_frame();
        }

        if let Some(direction) = player_direction {
            self.player.move_dir(direction);
        }

        for npc in &mut self.maps[self.current_map].npcs {
            npc.patrol.tick(&mut npc.actor);
        }

        self.player.recompute_derived();
        for npc in &mut self.maps[self.current_map].npcs {
            npc.actor.recompute_derived();
        }

        let crossing = self.check_portals();

        let map = &mut self.maps[self.current_map];
        for npc in &mut map.npcs {
            if npc.actor.feet.intersects(&self.player.bounds) {
                npc.actor.speed = 0.0;
            } else {
                npc.actor.speed = npc.base_speed;
            }
        }

        if self.player.feet.first_intersection(&map.walls).is_some() {
            self.player.revert();
        }
        for npc in &mut map.npcs {
            if npc.actor.feet.first_intersection(&map.walls).is_some() {
                npc.actor.revert();
            }
        }

        crossing
    }

    /// First portal in registration order whose trigger rect contains the
    /// player's feet wins; later portals are not considered this tick.
    fn check_portals(&mut self) -> Option<PortalCrossing> {
        let map = &self.maps[self.current_map];
        let fired = map.portals.iter().find_map(|portal| {
            let trigger = map.named_rect(&portal.trigger_name)?;
            self.player
                .feet
                .intersects(&trigger)
                .then(|| (portal.clone(), map.name.clone()))
        });

        let (portal, from_map) = fired?;
        if self.set_current_map(&portal.target_map).is_err() {
            return None;
        }
        if self.teleport_player(&portal.spawn_name).is_err() {
            return None;
        }
        Some(PortalCrossing {
            from_map,
            to_map: portal.target_map,
            spawn_name: portal.spawn_name,
        })
    }

    /// Explicit, player-triggered interaction scan: the first NPC on the
    /// current map whose feet intersect the player's full bounds. Zero
    /// qualifying NPCs is a silent no-op.
    fn check_interaction(&self) -> Option<InteractionStart> {
        self.maps[self.current_map]
            .npcs
            .iter()
            .position(|npc| npc.actor.feet.intersects(&self.player.bounds))
            .map(|npc_index| InteractionStart { npc_index })
    }

    fn remove_npc(&mut self, npc_index: usize) -> Option<Npc> {
        let map = &mut self.maps[self.current_map];
        if npc_index >= map.npcs.len() {
            return None;
        }
        let npc = map.npcs.remove(npc_index);
        map.defeated_npcs.push(npc.name.clone());
        Some(npc)
    }

    fn player(&self) -> &Actor {
        &self.player
    }

    fn player_mut(&mut self) -> &mut Actor {
        &mut self.player
    }

    fn current_map_name(&self) -> &str {
        &self.maps[self.current_map].name
    }

    fn current_map(&self) -> &MapRuntime {
        &self.maps[self.current_map]
    }

    fn map(&self, name: &str) -> Option<&MapRuntime> {
        self.maps.iter().find(|map| map.name == name)
    }

    fn map_mut(&mut self, name: &str) -> Option<&mut MapRuntime> {
        self.maps.iter_mut().find(|map| map.name == name)
    }

    /// Split borrow for combat: the player lives outside the map vector,
    /// so both sides can be mutated at once.
    fn player_and_npc_mut(&mut self, npc_index: usize) -> Option<(&mut Actor, &mut Npc)> {
        let npc = self.maps[self.current_map].npcs.get_mut(npc_index)?;
        Some((&mut self.player, npc))
    }

    fn npc(&self, npc_index: usize) -> Option<&Npc> {
        self.maps[self.current_map].npcs.get(npc_index)
    }
}
