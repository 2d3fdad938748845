#[derive(Debug, Clone, PartialEq)]
enum GameMode {
    Explore,
    Dialog { npc_index: usize },
    Combat(CombatEncounter),
    GameOver { ticks_left: u32 },
}

#[derive(Debug, Clone, PartialEq)]
struct CombatEncounter {
    npc_index: usize,
    npc_name: String,
    session: CombatSession,
    ticks_until_turn: u32,
    last_event: String,
}

/// The whole game as one engine scene: world registry simulation in
/// Explore mode, dialog and combat as paused-world modes, death banner
/// ending in a hard reset. The render world is a mirror the scene keeps
/// in sync; the registry never draws.
struct AdventureScene {
    music_enabled: bool,
    music: Option<MusicPlayer>,
    registry: Option<WorldRegistry>,
    mode: GameMode,
    dialog: DialogSession,
    welcome_ticks_left: u32,
    player_entity: Option<EntityId>,
    npc_entities: Vec<(String, EntityId)>,
}

impl AdventureScene {
    fn new(music_enabled: bool) -> Self {
        Self {
            music_enabled,
            music: None,
            registry: None,
            mode: GameMode::Explore,
            dialog: DialogSession::default(),
            welcome_ticks_left: 0,
            player_entity: None,
            npc_entities: Vec::new(),
        }
    }

    fn respawn_render_entities(&mut self, world: &mut SceneWorld) {
        if let Some(id) = self.player_entity.take() {
            world.despawn(id);
        }
        for (_, id) in self.npc_entities.drain(..) {
            world.despawn(id);
        }
        let Some(registry) = self.registry.as_ref() else {
            return;
        };

        let player = registry.player();
        self.player_entity = Some(world.spawn(
            Transform::at(player.position),
            RenderableDesc {
                kind: RenderableKind::Sprite {
                    sheet_key: PLAYER_SPRITE_KEY.to_string(),
                    region: player.sheet_region(),
                },
                debug_name: "player",
            },
        ));
        for npc in &registry.current_map().npcs {
            let id = world.spawn(
                Transform::at(npc.actor.position),
                RenderableDesc {
                    kind: RenderableKind::Sprite {
                        sheet_key: npc.name.clone(),
                        region: npc.actor.sheet_region(),
                    },
                    debug_name: "npc",
                },
            );
            self.npc_entities.push((npc.name.clone(), id));
        }
    }

    fn sync_render_entities(&self, world: &mut SceneWorld) {
        let Some(registry) = self.registry.as_ref() else {
            return;
        };
        if let Some(id) = self.player_entity {
            if let Some(entity) = world.find_entity_mut(id) {
                entity.transform.position = registry.player().position;
                entity.renderable.kind = RenderableKind::Sprite {
                    sheet_key: PLAYER_SPRITE_KEY.to_string(),
                    region: registry.player().sheet_region(),
                };
            }
        }
        for (name, id) in &self.npc_entities {
            let Some(npc) = registry
                .current_map()
                .npcs
                .iter()
                .find(|npc| &npc.name == name)
            else {
                continue;
            };
            if let Some(entity) = world.find_entity_mut(*id) {
                entity.transform.position = npc.actor.position;
                entity.renderable.kind = RenderableKind::Sprite {
                    sheet_key: name.clone(),
                    region: npc.actor.sheet_region(),
                };
            }
        }
    }

    fn center_camera(&self, world: &mut SceneWorld) {
        if let Some(registry) = self.registry.as_ref() {
            world.camera_mut().position = registry.player().bounds.center();
        }
    }

    /// Swap the tilemap to the current map and rebuild the render roster.
    fn apply_map_switch(&mut self, world: &mut SceneWorld) {
        let tilemap = {
            let Some(registry) = self.registry.as_ref() else {
                return;
            };
            let Some(catalog) = world.map_catalog() else {
                return;
            };
            match tilemap_for(catalog, registry.current_map_name()) {
                Ok(tilemap) => tilemap,
                Err(error) => {
                    warn!(error = %error, "tilemap_swap_failed");
                    return;
                }
            }
        };
        world.set_tilemap(tilemap);
        self.respawn_render_entities(world);
    }

    fn tick_explore(&mut self, input: &InputSnapshot, world: &mut SceneWorld) -> GameMode {
        let direction = input.held_direction().and_then(facing_from_action);
        let crossing = self
            .registry
            .as_mut()
            .and_then(|registry| registry.update(direction));
        if let Some(crossing) = crossing {
            info!(
                from = %crossing.from_map,
                to = %crossing.to_map,
                spawn = %crossing.spawn_name,
                "map_switched"
            );
            self.apply_map_switch(world);
        }

        if input.interact_pressed() {
            if let Some(start) = self
                .registry
                .as_ref()
                .and_then(|registry| registry.check_interaction())
            {
                return self.begin_interaction(start.npc_index);
            }
        }
        GameMode::Explore
    }

    fn begin_interaction(&mut self, npc_index: usize) -> GameMode {
        let Some(registry) = self.registry.as_ref() else {
            return GameMode::Explore;
        };
        let Some(npc) = registry.npc(npc_index) else {
            return GameMode::Explore;
        };
        info!(
            npc = %npc.name,
            map = %registry.current_map_name(),
            "interaction_started"
        );
        self.dialog.start(vec![DialogBlock {
            speaker: npc.name.clone(),
            pages: npc.dialog_pages.clone(),
        }]);
        if self.dialog.is_active() {
            GameMode::Dialog { npc_index }
        } else {
            // No pages to read: combat still follows the interaction.
            self.begin_combat(npc_index)
        }
    }

    fn begin_combat(&mut self, npc_index: usize) -> GameMode {
        let Some(npc) = self
            .registry
            .as_ref()
            .and_then(|registry| registry.npc(npc_index))
        else {
            return GameMode::Explore;
        };
        GameMode::Combat(CombatEncounter {
            npc_index,
            npc_name: npc.name.clone(),
            session: CombatSession::new(),
            ticks_until_turn: COMBAT_TURN_INTERVAL_TICKS,
            last_event: String::new(),
        })
    }

    fn tick_dialog(&mut self, npc_index: usize, input: &InputSnapshot) -> GameMode {
        if input.interact_pressed() {
            self.dialog.skip_page();
        } else {
            self.dialog.tick();
        }
        if self.dialog.is_active() {
            GameMode::Dialog { npc_index }
        } else {
            info!("dialog_finished");
            self.begin_combat(npc_index)
        }
    }

    fn tick_combat(&mut self, mut encounter: CombatEncounter, world: &mut SceneWorld) -> GameMode {
        if !encounter.session.is_over() {
            if encounter.ticks_until_turn > 0 {
                encounter.ticks_until_turn -= 1;
            }
            if encounter.ticks_until_turn == 0 {
                let Some(registry) = self.registry.as_mut() else {
                    return GameMode::Explore;
                };
                let Some((player, npc)) = registry.player_and_npc_mut(encounter.npc_index) else {
                    return GameMode::Explore;
                };
                if let Some(report) = encounter.session.advance_turn(player, &mut npc.actor) {
                    let attacker_name = match report.attacker {
                        CombatSide::Player => "player",
                        CombatSide::Npc => encounter.npc_name.as_str(),
                    };
                    info!(
                        attacker = attacker_name,
                        damage = report.damage,
                        player_hp = report.player_hp,
                        npc_hp = report.npc_hp,
                        state = ?report.state_after,
                        "combat_turn"
                    );
                    encounter.last_event =
                        format!("{attacker_name} hits for {}", report.damage);
                    encounter.ticks_until_turn = COMBAT_TURN_INTERVAL_TICKS;
                }
            }
        }

        match encounter.session.state() {
            CombatState::NpcDefeated => {
                info!(npc = %encounter.npc_name, "npc_defeated");
                info!(outcome = "npc_defeated", "combat_finished");
                if let Some(registry) = self.registry.as_mut() {
                    registry.remove_npc(encounter.npc_index);
                }
                self.respawn_render_entities(world);
                GameMode::Explore
            }
            CombatState::PlayerDefeated => {
                info!("player_defeated");
                info!(outcome = "player_defeated", "combat_finished");
                GameMode::GameOver {
                    ticks_left: DEATH_BANNER_TICKS,
                }
            }
            CombatState::PlayerTurn | CombatState::NpcTurn => GameMode::Combat(encounter),
        }
    }

    fn handle_save(&self) {
        let Some(registry) = self.registry.as_ref() else {
            return;
        };
        let save = build_save_game(registry);
        let written = save_file_path().and_then(|path| write_save(&save, &path).map(|()| path));
        match written {
            Ok(path) => info!(path = %path.display(), "save_written"),
            Err(error) => warn!(error = %error, "save_failed"),
        }
    }

    fn handle_load(&mut self, world: &mut SceneWorld) {
        let save = match save_file_path().and_then(|path| read_save(&path)) {
            Ok(save) => save,
            Err(error) => {
                warn!(error = %error, "load_failed");
                return;
            }
        };

        // Validate and apply against a fresh world so defeated NPCs can
        // come back when the save says they are alive.
        let rebuilt = {
            let Some(catalog) = world.map_catalog() else {
                warn!(error = "map catalog not available", "load_failed");
                return;
            };
            build_world(catalog)
                .map_err(|error| error.to_string())
                .and_then(|mut registry| {
                    apply_save_game(&save, &mut registry).map(|()| registry)
                })
        };
        match rebuilt {
            Ok(registry) => {
                self.registry = Some(registry);
                self.mode = GameMode::Explore;
                self.dialog = DialogSession::default();
                self.apply_map_switch(world);
                info!("save_loaded");
            }
            Err(error) => warn!(error = %error, "load_failed"),
        }
    }

    fn build_ui_frame(&self, world: &mut SceneWorld) {
        let registry = self.registry.as_ref();
        let ui = world.ui_frame_mut();
        ui.clear();

        match &self.mode {
            GameMode::GameOver { .. } => {
                ui.banner = Some(Banner {
                    title: DEATH_BANNER_TITLE.to_string(),
                });
                return;
            }
            GameMode::Dialog { .. } => {
                if let (Some(speaker), Some(page)) =
                    (self.dialog.current_speaker(), self.dialog.current_page())
                {
                    ui.dialog = Some(DialogPanel {
                        speaker: speaker.to_string(),
                        text: page.to_string(),
                        revealed_chars: self.dialog.revealed_chars(),
                    });
                }
            }
            GameMode::Combat(encounter) => {
                if let Some(registry) = registry {
                    let npc_hp = registry
                        .npc(encounter.npc_index)
                        .map(|npc| npc.actor.hp)
                        .unwrap_or(0);
                    ui.combat = Some(CombatPanel {
                        player_hp: registry.player().hp,
                        npc_name: encounter.npc_name.clone(),
                        npc_hp,
                        last_event: encounter.last_event.clone(),
                    });
                }
            }
            GameMode::Explore => {}
        }

        if self.welcome_ticks_left > 0 {
            ui.help_lines
                .push("Move with WASD or the arrows, talk with Space".to_string());
            ui.help_lines
                .push("F5 saves, F9 loads, F3 toggles the overlay, Escape quits".to_string());
        }
    }

    fn mode_name(&self) -> &'static str {
        match self.mode {
            GameMode::Explore => "explore",
            GameMode::Dialog { .. } => "dialog",
            GameMode::Combat(_) => "combat",
            GameMode::GameOver { .. } => "game_over",
        }
    }
}

impl Scene for AdventureScene {
    fn load(&mut self, world: &mut SceneWorld) -> Result<(), String> {
        let (registry, tilemap) = {
            let catalog = world
                .map_catalog()
                .ok_or_else(|| "map catalog not available".to_string())?;
            let registry = build_world(catalog).map_err(|error| error.to_string())?;
            let tilemap = tilemap_for(catalog, registry.current_map_name())?;
            (registry, tilemap)
        };
        world.set_tilemap(tilemap);
        self.registry = Some(registry);
        self.mode = GameMode::Explore;
        self.dialog = DialogSession::default();
        self.welcome_ticks_left = WELCOME_BANNER_TICKS;
        self.respawn_render_entities(world);
        self.center_camera(world);

        if self.music_enabled && self.music.is_none() {
            self.music = match resolve_app_paths() {
                Ok(paths) => start_music(&paths.base_content_dir.join("audio")),
                Err(error) => {
                    warn!(error = %error, "music_unavailable");
                    None
                }
            };
        }
        Ok(())
    }

    fn update(
        &mut self,
        _fixed_dt_seconds: f32,
        input: &InputSnapshot,
        world: &mut SceneWorld,
    ) -> SceneCommand {
        if self.registry.is_none() {
            return SceneCommand::None;
        }

        if input.zoom_delta_steps() != 0 {
            world.camera_mut().apply_zoom_steps(input.zoom_delta_steps());
        }
        if input.save_pressed() {
            self.handle_save();
        }
        if input.load_pressed() {
            self.handle_load(world);
        }
        if self.welcome_ticks_left > 0 {
            self.welcome_ticks_left -= 1;
        }

        let mut command = SceneCommand::None;
        let mode = std::mem::replace(&mut self.mode, GameMode::Explore);
        self.mode = match mode {
            GameMode::Explore => self.tick_explore(input, world),
            GameMode::Dialog { npc_index } => self.tick_dialog(npc_index, input),
            GameMode::Combat(encounter) => self.tick_combat(encounter, world),
            GameMode::GameOver { ticks_left } => {
                let remaining = ticks_left.saturating_sub(1);
                if remaining == 0 {
                    command = SceneCommand::HardReset;
                }
                GameMode::GameOver {
                    ticks_left: remaining,
                }
            }
        };

        self.sync_render_entities(world);
        self.center_camera(world);
        self.build_ui_frame(world);
        command
    }

    fn unload(&mut self, _world: &mut SceneWorld) {
        self.music = None;
        self.registry = None;
        self.dialog = DialogSession::default();
        self.mode = GameMode::Explore;
        self.welcome_ticks_left = 0;
        self.player_entity = None;
        self.npc_entities.clear();
    }

    fn debug_title(&self, _world: &SceneWorld) -> Option<String> {
        let registry = self.registry.as_ref()?;
        Some(format!(
            "Dungeon et Donjon [{}]",
            registry.current_map_name()
        ))
    }

    fn debug_lines(&self, _world: &SceneWorld) -> Option<Vec<String>> {
        let registry = self.registry.as_ref()?;
        let player = registry.player();
        Some(vec![
            format!("Map {}", registry.current_map_name()),
            format!("Mode {}", self.mode_name()),
            format!(
                "Player {:.0},{:.0} hp {}",
                player.position.x, player.position.y, player.hp
            ),
        ])
    }
}

fn facing_from_action(action: InputAction) -> Option<Facing> {
    match action {
        InputAction::MoveUp => Some(Facing::Up),
        InputAction::MoveDown => Some(Facing::Down),
        InputAction::MoveLeft => Some(Facing::Left),
        InputAction::MoveRight => Some(Facing::Right),
        InputAction::Quit => None,
    }
}

fn tilemap_for(catalog: &MapCatalog, map_name: &str) -> Result<Tilemap, String> {
    let def = catalog
        .map_by_name(map_name)
        .ok_or_else(|| format!("map '{map_name}' not found in the compiled catalog"))?;
    Tilemap::from_map_def(def).map_err(|error| error.to_string())
}
