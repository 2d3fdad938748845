use super::*;

use std::path::Path;

use engine::{compile_map_catalog, AppPaths};
use tempfile::TempDir;

const DT: f32 = 1.0 / 60.0;

fn test_app_paths(root: &Path) -> AppPaths {
    let base = root.join("assets").join("base");
    let cache = root.join("cache");
    fs::create_dir_all(base.join("maps")).expect("maps dir");
    fs::create_dir_all(&cache).expect("cache dir");
    AppPaths {
        root: root.to_path_buf(),
        base_content_dir: base,
        cache_dir: cache,
    }
}

fn catalog_from_maps(maps: &[(&str, &str)]) -> (MapCatalog, TempDir) {
    let temp = TempDir::new().expect("temp dir");
    let paths = test_app_paths(temp.path());
    for (file_name, content) in maps {
        fs::write(paths.base_content_dir.join("maps").join(file_name), content)
            .expect("write map xml");
    }
    let catalog = compile_map_catalog(&paths).expect("compile catalog");
    (catalog, temp)
}

/// Catalog compiled from the real maps shipped under `assets/base/maps`.
fn shipped_catalog() -> (MapCatalog, TempDir) {
    let temp = TempDir::new().expect("temp dir");
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("..").join("..");
    let paths = AppPaths {
        root: root.clone(),
        base_content_dir: root.join("assets").join("base"),
        cache_dir: temp.path().to_path_buf(),
    };
    let catalog = compile_map_catalog(&paths).expect("compile shipped maps");
    (catalog, temp)
}

fn loaded_scene() -> (AdventureScene, SceneWorld, TempDir) {
    let (catalog, temp) = shipped_catalog();
    let mut world = SceneWorld::default();
    world.set_map_catalog(catalog);
    let mut scene = AdventureScene::new(false);
    scene.load(&mut world).expect("scene load");
    world.apply_pending();
    (scene, world, temp)
}

fn stand_on_first_npc(scene: &mut AdventureScene) {
    let registry = scene.registry.as_mut().expect("registry");
    let npc_position = registry.current_map().npcs[0].actor.position;
    registry.player_mut().set_position(npc_position);
    registry.player_mut().commit_frame();
}

// --- actor ---

#[test]
fn actor_moves_by_speed_and_reverts_to_committed_position() {
    let mut actor = Actor::new(Vec2::new(10.0, 10.0), 2.0, 100, 10);
    actor.commit_frame();
    actor.move_dir(Facing::Right);
    actor.move_dir(Facing::Down);
    assert_eq!(actor.position, Vec2::new(12.0, 12.0));

    actor.revert();
    assert_eq!(actor.position, Vec2::new(10.0, 10.0));
    assert_eq!(actor.bounds.top_left(), Vec2::new(10.0, 10.0));
}

#[test]
fn actor_feet_hug_the_bottom_center_of_the_bounds() {
    let actor = Actor::new(Vec2::new(40.0, 60.0), 1.0, 10, 1);
    assert_eq!(actor.bounds, Rect::new(40.0, 60.0, 23.0, 32.0));
    assert_eq!(actor.feet.width, ACTOR_BOUNDS_WIDTH * 0.5);
    assert_eq!(actor.feet.height, ACTOR_FEET_HEIGHT);
    assert_eq!(actor.feet.midbottom(), actor.bounds.midbottom());
}

#[test]
fn walk_animation_cycles_through_three_frames() {
    let mut actor = Actor::new(Vec2::ZERO, 2.0, 100, 10);
    assert_eq!(actor.walk_frame, 0);
    // Gain per step is speed * 8; the frame flips when the accumulator
    // reaches 100, so at speed 2 that is every 7th step.
    for _ in 0..7 {
        actor.move_dir(Facing::Right);
    }
    assert_eq!(actor.walk_frame, 1);
    for _ in 0..14 {
        actor.move_dir(Facing::Right);
    }
    assert_eq!(actor.walk_frame, 0);
}

#[test]
fn sheet_region_tracks_facing_row_and_walk_frame() {
    let mut actor = Actor::new(Vec2::ZERO, 2.0, 100, 10);
    let down = actor.sheet_region();
    assert_eq!((down.x, down.y), (0, 0));
    assert_eq!((down.width, down.height), (23, 32));

    actor.move_dir(Facing::Up);
    assert_eq!(actor.sheet_region().y, 3 * 32);

    for _ in 0..7 {
        actor.move_dir(Facing::Left);
    }
    let left = actor.sheet_region();
    assert_eq!(left.y, 32);
    assert_eq!(left.x, 23);
}

// --- patrol ---

fn square_patrol() -> PatrolController {
    PatrolController::new(vec![
        Rect::new(32.0, 32.0, 16.0, 16.0),
        Rect::new(96.0, 32.0, 16.0, 16.0),
        Rect::new(96.0, 96.0, 16.0, 16.0),
        Rect::new(32.0, 96.0, 16.0, 16.0),
    ])
}

#[test]
fn patrol_walks_the_square_and_wraps_back_to_the_first_waypoint() {
    let mut patrol = square_patrol();
    let mut actor = Actor::new(Vec2::new(32.0, 32.0), 16.0, 50, 7);

    for expected_index in [1, 2, 3, 0] {
        for _ in 0..3 {
            actor.commit_frame();
            patrol.tick(&mut actor);
        }
        assert_eq!(patrol.current, expected_index);
    }
}

#[test]
fn patrol_facing_follows_the_segment_direction() {
    let mut patrol = square_patrol();
    let mut actor = Actor::new(Vec2::new(32.0, 32.0), 16.0, 50, 7);

    patrol.tick(&mut actor);
    assert_eq!(actor.facing, Facing::Right);

    while patrol.current == 0 {
        patrol.tick(&mut actor);
    }
    patrol.tick(&mut actor);
    assert_eq!(actor.facing, Facing::Down);
}

#[test]
fn patrol_alignment_tolerance_is_strict() {
    // Offset by exactly the tolerance on both axes: neither axis counts as
    // aligned and the actor never moves.
    let mut patrol = PatrolController::new(vec![
        Rect::new(0.0, 0.0, 16.0, 16.0),
        Rect::new(3.0, 3.0, 16.0, 16.0),
    ]);
    let mut actor = Actor::new(Vec2::ZERO, 1.0, 50, 7);
    for _ in 0..20 {
        patrol.tick(&mut actor);
    }
    assert_eq!(actor.position, Vec2::ZERO);

    // Just inside the tolerance the vertical axis counts as aligned.
    let mut patrol = PatrolController::new(vec![
        Rect::new(0.0, 0.0, 16.0, 16.0),
        Rect::new(64.0, 2.9, 16.0, 16.0),
    ]);
    let mut actor = Actor::new(Vec2::ZERO, 1.0, 50, 7);
    patrol.tick(&mut actor);
    assert_eq!(actor.facing, Facing::Right);
    assert_eq!(actor.position.x, 1.0);
}

#[test]
fn patrol_with_fewer_than_two_waypoints_is_a_no_op() {
    let mut patrol = PatrolController::new(vec![Rect::new(0.0, 0.0, 16.0, 16.0)]);
    let mut actor = Actor::new(Vec2::new(5.0, 5.0), 1.0, 50, 7);
    for _ in 0..10 {
        patrol.tick(&mut actor);
    }
    assert_eq!(actor.position, Vec2::new(5.0, 5.0));
    assert_eq!(patrol.current, 0);
}

// --- dialog ---

#[test]
fn dialog_reveal_is_monotonic_and_pages_advance_when_fully_revealed() {
    let mut session = DialogSession::default();
    session.start(vec![DialogBlock {
        speaker: "guard".to_string(),
        pages: vec!["ab".to_string(), "c".to_string()],
    }]);
    assert!(session.is_active());
    assert_eq!(session.current_speaker(), Some("guard"));
    assert_eq!(session.current_page(), Some("ab"));
    assert_eq!(session.revealed_chars(), 0);

    session.tick();
    assert_eq!(session.revealed_chars(), 1);
    session.tick();
    // Page fully revealed; the cursor moved to the next page.
    assert_eq!(session.current_page(), Some("c"));
    assert_eq!(session.revealed_chars(), 0);

    session.tick();
    assert!(!session.is_active());
    assert_eq!(session.current_page(), None);
}

#[test]
fn dialog_skip_jumps_a_whole_page_per_press() {
    let mut session = DialogSession::default();
    session.start(vec![DialogBlock {
        speaker: "guard".to_string(),
        pages: vec!["first page".to_string(), "second page".to_string()],
    }]);

    session.skip_page();
    assert!(session.is_active());
    assert_eq!(session.current_page(), Some("second page"));
    session.skip_page();
    assert!(!session.is_active());
}

#[test]
fn dialog_renders_every_page_across_queued_blocks() {
    let mut session = DialogSession::default();
    session.start(vec![
        DialogBlock {
            speaker: "guard".to_string(),
            pages: vec!["a".to_string(), "b".to_string()],
        },
        DialogBlock {
            speaker: "captain".to_string(),
            pages: vec!["c".to_string()],
        },
    ]);

    let mut pages_seen = Vec::new();
    while session.is_active() {
        let speaker = session.current_speaker().expect("speaker").to_string();
        let page = session.current_page().expect("page").to_string();
        pages_seen.push((speaker, page));
        session.skip_page();
    }
    assert_eq!(
        pages_seen,
        vec![
            ("guard".to_string(), "a".to_string()),
            ("guard".to_string(), "b".to_string()),
            ("captain".to_string(), "c".to_string()),
        ]
    );
}

#[test]
fn dialog_with_no_pages_never_activates() {
    let mut session = DialogSession::default();
    session.start(vec![DialogBlock {
        speaker: "mute".to_string(),
        pages: Vec::new(),
    }]);
    assert!(!session.is_active());
    session.tick();
    session.skip_page();
    assert!(!session.is_active());
}

// --- combat ---

#[test]
fn combat_exchange_is_deterministic_and_player_acts_first() {
    let mut player = Actor::new(Vec2::ZERO, PLAYER_SPEED, PLAYER_HP, PLAYER_ATTACK);
    let mut npc = Actor::new(Vec2::ZERO, NPC_BASE_SPEED, NPC_HP, NPC_ATTACK);
    let mut session = CombatSession::new();

    let mut reports = Vec::new();
    while !session.is_over() {
        reports.push(session.advance_turn(&mut player, &mut npc).expect("turn"));
    }

    assert_eq!(reports.len(), 9);
    assert_eq!(reports[0].attacker, CombatSide::Player);
    assert_eq!(reports[0].npc_hp, 40);
    assert_eq!(reports[1].attacker, CombatSide::Npc);
    assert_eq!(reports[1].player_hp, 93);
    assert_eq!(reports[8].state_after, CombatState::NpcDefeated);
    assert_eq!(player.hp, 72);
    assert_eq!(npc.hp, 0);

    // Terminal states absorb further turns.
    assert!(session.advance_turn(&mut player, &mut npc).is_none());
    assert_eq!(player.hp, 72);
}

#[test]
fn combat_reports_player_defeat_when_hp_runs_out() {
    let mut player = Actor::new(Vec2::ZERO, PLAYER_SPEED, 7, PLAYER_ATTACK);
    let mut npc = Actor::new(Vec2::ZERO, NPC_BASE_SPEED, NPC_HP, NPC_ATTACK);
    let mut session = CombatSession::new();

    session.advance_turn(&mut player, &mut npc).expect("player turn");
    let report = session.advance_turn(&mut player, &mut npc).expect("npc turn");
    assert_eq!(report.state_after, CombatState::PlayerDefeated);
    assert_eq!(player.hp, 0);
    assert!(session.is_over());
}

// --- registry ---

const PORTAL_WORLD_MAP: &str = r#"<map name="world" width="4" height="4" tile_size="16" tileset="tilesets/overworld">
    <objects>
        <rect name="player" x="100" y="100" w="16" h="16"/>
        <rect name="enter_dungeon" x="120" y="120" w="16" h="16"/>
    </objects>
</map>"#;

const PORTAL_DUNGEON_MAP: &str = r#"<map name="dungeon" width="4" height="4" tile_size="16" tileset="tilesets/dungeon">
    <objects>
        <rect name="spawn_dungeon" x="10" y="10" w="16" h="16"/>
        <rect name="spawn_alt" x="50" y="50" w="16" h="16"/>
    </objects>
</map>"#;

const ARENA_MAP: &str = r#"<map name="arena" width="4" height="4" tile_size="16" tileset="tilesets/overworld">
    <objects>
        <rect name="player" x="60" y="100" w="16" h="16"/>
        <rect name="guard_path1" x="0" y="100" w="16" h="16"/>
        <rect name="guard_path2" x="200" y="100" w="16" h="16"/>
    </objects>
</map>"#;

const PINNED_MAP: &str = r#"<map name="pinned" width="4" height="4" tile_size="16" tileset="tilesets/overworld">
    <objects>
        <rect name="player" x="100" y="100" w="16" h="16"/>
        <rect name="guard_path1" x="0" y="100" w="16" h="16"/>
        <rect name="guard_path2" x="200" y="100" w="16" h="16"/>
        <rect kind="collision" x="64" y="120" w="16" h="16"/>
        <rect kind="collision" x="120" y="100" w="16" h="48"/>
    </objects>
</map>"#;

fn guard_config() -> NpcConfig {
    NpcConfig {
        name: "guard".to_string(),
        waypoint_count: 2,
        dialog_pages: vec!["Stop right there.".to_string()],
        hp: NPC_HP,
        attack_strength: NPC_ATTACK,
        base_speed: NPC_BASE_SPEED,
    }
}

fn registry_on(catalog: &MapCatalog, map_name: &str, npcs: Vec<NpcConfig>) -> WorldRegistry {
    let player = Actor::new(Vec2::ZERO, PLAYER_SPEED, PLAYER_HP, PLAYER_ATTACK);
    let mut registry = WorldRegistry::new(player);
    registry
        .register(catalog, map_name, Vec::new(), npcs)
        .expect("register map");
    registry.validate().expect("validate");
    registry.set_current_map(map_name).expect("current map");
    registry.teleport_player("player").expect("player spawn");
    registry
}

#[test]
fn portal_crossing_switches_map_and_teleports_in_the_same_tick() {
    let (catalog, _temp) = catalog_from_maps(&[
        ("world.xml", PORTAL_WORLD_MAP),
        ("dungeon.xml", PORTAL_DUNGEON_MAP),
    ]);
    let player = Actor::new(Vec2::ZERO, PLAYER_SPEED, PLAYER_HP, PLAYER_ATTACK);
    let mut registry = WorldRegistry::new(player);
    registry
        .register(
            &catalog,
            "world",
            vec![PortalConfig::new("enter_dungeon", "dungeon", "spawn_dungeon")],
            Vec::new(),
        )
        .expect("register world");
    registry
        .register(&catalog, "dungeon", Vec::new(), Vec::new())
        .expect("register dungeon");
    registry.validate().expect("validate");
    registry.set_current_map("world").expect("current map");
    registry.teleport_player("player").expect("player spawn");

    assert!(registry.update(Some(Facing::Right)).is_none());
    let crossing = registry.update(Some(Facing::Right)).expect("crossing");
    assert_eq!(
        crossing,
        PortalCrossing {
            from_map: "world".to_string(),
            to_map: "dungeon".to_string(),
            spawn_name: "spawn_dungeon".to_string(),
        }
    );
    assert_eq!(registry.current_map_name(), "dungeon");
    // The teleport survives the rest of the tick; no wall pass reverts it.
    assert_eq!(registry.player().position, Vec2::new(10.0, 10.0));
}

#[test]
fn first_registered_portal_wins_when_triggers_overlap() {
    let world = r#"<map name="world" width="4" height="4" tile_size="16" tileset="tilesets/overworld">
        <objects>
            <rect name="player" x="100" y="100" w="16" h="16"/>
            <rect name="door_a" x="120" y="120" w="16" h="16"/>
            <rect name="door_b" x="120" y="120" w="8" h="8"/>
        </objects>
    </map>"#;
    let (catalog, _temp) =
        catalog_from_maps(&[("world.xml", world), ("dungeon.xml", PORTAL_DUNGEON_MAP)]);
    let player = Actor::new(Vec2::ZERO, PLAYER_SPEED, PLAYER_HP, PLAYER_ATTACK);
    let mut registry = WorldRegistry::new(player);
    registry
        .register(
            &catalog,
            "world",
            vec![
                PortalConfig::new("door_a", "dungeon", "spawn_dungeon"),
                PortalConfig::new("door_b", "dungeon", "spawn_alt"),
            ],
            Vec::new(),
        )
        .expect("register world");
    registry
        .register(&catalog, "dungeon", Vec::new(), Vec::new())
        .expect("register dungeon");
    registry.validate().expect("validate");
    registry.set_current_map("world").expect("current map");
    registry.teleport_player("player").expect("player spawn");

    registry.update(Some(Facing::Right));
    let crossing = registry.update(Some(Facing::Right)).expect("crossing");
    assert_eq!(crossing.spawn_name, "spawn_dungeon");
    assert_eq!(registry.player().position, Vec2::new(10.0, 10.0));
}

#[test]
fn player_stops_at_walls_and_stays_stopped() {
    let (catalog, _temp) = catalog_from_maps(&[("pinned.xml", PINNED_MAP)]);
    let mut registry = registry_on(&catalog, "pinned", Vec::new());

    for _ in 0..10 {
        registry.update(Some(Facing::Right));
    }
    // One full step fits before the wall at x=120; the next is reverted
    // every tick.
    assert_eq!(registry.player().position, Vec2::new(102.0, 100.0));
}

#[test]
fn npc_pinned_by_a_wall_never_reaches_its_waypoint() {
    let (catalog, _temp) = catalog_from_maps(&[("pinned.xml", PINNED_MAP)]);
    let mut registry = registry_on(&catalog, "pinned", vec![guard_config()]);

    for _ in 0..100 {
        registry.update(None);
    }
    let npc = registry.npc(0).expect("guard");
    assert_eq!(npc.actor.position, Vec2::new(46.0, 100.0));
    assert_eq!(npc.patrol.current, 0);
}

#[test]
fn npc_freezes_next_to_the_player_and_resumes_when_they_leave() {
    let (catalog, _temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let mut registry = registry_on(&catalog, "arena", vec![guard_config()]);

    for _ in 0..100 {
        registry.update(None);
    }
    let frozen_x = registry.npc(0).expect("guard").actor.position.x;
    assert_eq!(frozen_x, 43.0);
    assert_eq!(registry.npc(0).expect("guard").actor.speed, 0.0);

    registry.player_mut().set_position(Vec2::new(400.0, 100.0));
    registry.player_mut().commit_frame();
    registry.update(None);
    registry.update(None);
    let npc = registry.npc(0).expect("guard");
    assert_eq!(npc.actor.speed, NPC_BASE_SPEED);
    assert!(npc.actor.position.x > frozen_x);
}

#[test]
fn interaction_scan_needs_feet_overlapping_the_player_bounds() {
    let (catalog, _temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let mut registry = registry_on(&catalog, "arena", vec![guard_config()]);

    assert_eq!(registry.check_interaction(), None);
    for _ in 0..100 {
        registry.update(None);
    }
    assert_eq!(
        registry.check_interaction(),
        Some(InteractionStart { npc_index: 0 })
    );
}

#[test]
fn registering_a_missing_waypoint_is_a_build_error() {
    let (catalog, _temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let player = Actor::new(Vec2::ZERO, PLAYER_SPEED, PLAYER_HP, PLAYER_ATTACK);
    let mut registry = WorldRegistry::new(player);
    let mut config = guard_config();
    config.waypoint_count = 3;
    let err = registry
        .register(&catalog, "arena", Vec::new(), vec![config])
        .expect_err("missing waypoint");
    assert_eq!(
        err,
        WorldBuildError::MissingNamedObject {
            map: "arena".to_string(),
            object: "guard_path3".to_string(),
        }
    );
}

#[test]
fn portal_to_an_unregistered_map_fails_validation() {
    let (catalog, _temp) = catalog_from_maps(&[("world.xml", PORTAL_WORLD_MAP)]);
    let player = Actor::new(Vec2::ZERO, PLAYER_SPEED, PLAYER_HP, PLAYER_ATTACK);
    let mut registry = WorldRegistry::new(player);
    registry
        .register(
            &catalog,
            "world",
            vec![PortalConfig::new("enter_dungeon", "dungeon", "spawn_dungeon")],
            Vec::new(),
        )
        .expect("register world");
    let err = registry.validate().expect_err("unregistered target");
    assert!(matches!(
        err,
        WorldBuildError::PortalTargetNotRegistered { .. }
    ));
}

// --- save / load ---

#[test]
fn save_round_trips_through_json_onto_a_fresh_world() {
    let (catalog, temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let mut registry = registry_on(&catalog, "arena", vec![guard_config()]);

    registry.player_mut().set_position(Vec2::new(140.0, 80.0));
    registry.player_mut().facing = Facing::Left;
    registry.player_mut().hp = 55;
    {
        let (_, npc) = registry.player_and_npc_mut(0).expect("guard");
        npc.actor.set_position(Vec2::new(70.0, 100.0));
        npc.actor.hp = 20;
        npc.patrol.current = 1;
    }

    let save = build_save_game(&registry);
    let path = temp.path().join("cache").join("saves").join(SAVE_FILE);
    write_save(&save, &path).expect("write save");
    let loaded = read_save(&path).expect("read save");
    assert_eq!(loaded, save);

    let mut fresh = registry_on(&catalog, "arena", vec![guard_config()]);
    apply_save_game(&loaded, &mut fresh).expect("apply save");
    assert_eq!(fresh.player().position, Vec2::new(140.0, 80.0));
    assert_eq!(fresh.player().facing, Facing::Left);
    assert_eq!(fresh.player().hp, 55);
    let npc = fresh.npc(0).expect("guard");
    assert_eq!(npc.actor.position, Vec2::new(70.0, 100.0));
    assert_eq!(npc.actor.hp, 20);
    assert_eq!(npc.patrol.current, 1);
}

#[test]
fn defeated_npcs_stay_defeated_across_a_save() {
    let (catalog, _temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let mut registry = registry_on(&catalog, "arena", vec![guard_config()]);
    registry.remove_npc(0).expect("remove guard");

    let save = build_save_game(&registry);
    let mut fresh = registry_on(&catalog, "arena", vec![guard_config()]);
    assert_eq!(fresh.current_map().npcs.len(), 1);
    apply_save_game(&save, &mut fresh).expect("apply save");
    assert!(fresh.current_map().npcs.is_empty());
    assert_eq!(fresh.current_map().defeated_npcs, vec!["guard".to_string()]);
}

#[test]
fn save_with_a_wrong_version_is_rejected_with_expected_and_actual() {
    let (catalog, _temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let mut registry = registry_on(&catalog, "arena", vec![guard_config()]);
    let mut save = build_save_game(&registry);
    save.save_version = 2;
    let err = apply_save_game(&save, &mut registry).expect_err("version mismatch");
    assert!(err.contains("expected 1, got 2"), "{err}");
}

#[test]
fn save_with_an_out_of_range_waypoint_is_rejected() {
    let (catalog, _temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let mut registry = registry_on(&catalog, "arena", vec![guard_config()]);
    let mut save = build_save_game(&registry);
    save.maps[0].npcs[0].waypoint_index = 5;
    let err = apply_save_game(&save, &mut registry).expect_err("waypoint range");
    assert!(err.contains("waypoint_index"), "{err}");
}

#[test]
fn save_with_an_unknown_npc_is_rejected() {
    let (catalog, _temp) = catalog_from_maps(&[("arena.xml", ARENA_MAP)]);
    let mut registry = registry_on(&catalog, "arena", vec![guard_config()]);
    let mut save = build_save_game(&registry);
    save.maps[0].npcs[0].name = "impostor".to_string();
    let err = apply_save_game(&save, &mut registry).expect_err("unknown npc");
    assert!(err.contains("impostor"), "{err}");
}

#[test]
fn malformed_save_json_reports_the_field_path() {
    let err = parse_save_game_json(r#"{"save_version": true}"#).expect_err("parse error");
    assert!(err.contains("save_version"), "{err}");
}

// --- shipped world definition ---

#[test]
fn shipped_world_builds_with_three_maps_and_the_full_roster() {
    let (catalog, _temp) = shipped_catalog();
    let registry = build_world(&catalog).expect("build world");

    assert_eq!(registry.current_map_name(), "world");
    let mushroom = &registry.map("world").expect("world").npcs[0];
    assert_eq!(mushroom.name, "mushroom");
    assert_eq!(mushroom.patrol.waypoints.len(), 4);
    assert_eq!(mushroom.dialog_pages.len(), 4);

    let dungeon = registry.map("dungeon").expect("dungeon");
    let names: Vec<&str> = dungeon.npcs.iter().map(|npc| npc.name.as_str()).collect();
    assert_eq!(names, vec!["bandit", "wizard", "knight"]);
    assert!(registry.map("dungeon_2").expect("dungeon_2").npcs.is_empty());
}

// --- scene ---

#[test]
fn scene_load_spawns_the_world_roster_and_shows_the_welcome_help() {
    let (mut scene, mut world, _temp) = loaded_scene();

    assert!(world.tilemap().is_some());
    assert_eq!(world.entity_count(), 2);
    let title = scene.debug_title(&world).expect("title");
    assert!(title.contains("world"), "{title}");

    scene.update(DT, &InputSnapshot::empty(), &mut world);
    assert!(!world.ui_frame().help_lines.is_empty());
}

#[test]
fn welcome_help_disappears_after_its_timer() {
    let (mut scene, mut world, _temp) = loaded_scene();
    let idle = InputSnapshot::empty();
    for _ in 0..WELCOME_BANNER_TICKS + 1 {
        scene.update(DT, &idle, &mut world);
        world.apply_pending();
    }
    assert!(world.ui_frame().help_lines.is_empty());
}

#[test]
fn interacting_with_an_npc_opens_dialog_with_a_typewriter_reveal() {
    let (mut scene, mut world, _temp) = loaded_scene();
    stand_on_first_npc(&mut scene);

    let interact = InputSnapshot::empty().with_interact_pressed(true);
    let idle = InputSnapshot::empty();
    scene.update(DT, &interact, &mut world);
    assert!(matches!(scene.mode, GameMode::Dialog { .. }));

    scene.update(DT, &idle, &mut world);
    let first = world.ui_frame().dialog.clone().expect("dialog panel");
    assert_eq!(first.speaker, "mushroom");
    scene.update(DT, &idle, &mut world);
    let second = world.ui_frame().dialog.clone().expect("dialog panel");
    assert!(second.revealed_chars > first.revealed_chars);
}

#[test]
fn dialog_flows_into_combat_and_victory_removes_the_npc() {
    let (mut scene, mut world, _temp) = loaded_scene();
    stand_on_first_npc(&mut scene);

    let interact = InputSnapshot::empty().with_interact_pressed(true);
    let idle = InputSnapshot::empty();
    scene.update(DT, &interact, &mut world);
    // The mushroom has four pages; each interact press skips one.
    for _ in 0..4 {
        scene.update(DT, &interact, &mut world);
    }
    assert!(matches!(scene.mode, GameMode::Combat(_)));

    // Nine turns at one turn per interval finish the fight.
    for _ in 0..9 * COMBAT_TURN_INTERVAL_TICKS + 1 {
        scene.update(DT, &idle, &mut world);
        world.apply_pending();
    }

    assert!(matches!(scene.mode, GameMode::Explore));
    let registry = scene.registry.as_ref().expect("registry");
    assert_eq!(registry.player().hp, 72);
    assert!(registry.current_map().npcs.is_empty());
    assert_eq!(
        registry.current_map().defeated_npcs,
        vec!["mushroom".to_string()]
    );
    assert_eq!(world.entity_count(), 1);
}

#[test]
fn combat_panel_reports_both_sides_during_the_fight() {
    let (mut scene, mut world, _temp) = loaded_scene();
    stand_on_first_npc(&mut scene);

    let interact = InputSnapshot::empty().with_interact_pressed(true);
    let idle = InputSnapshot::empty();
    for _ in 0..5 {
        scene.update(DT, &interact, &mut world);
    }
    assert!(matches!(scene.mode, GameMode::Combat(_)));

    for _ in 0..COMBAT_TURN_INTERVAL_TICKS {
        scene.update(DT, &idle, &mut world);
    }
    let panel = world.ui_frame().combat.clone().expect("combat panel");
    assert_eq!(panel.npc_name, "mushroom");
    assert_eq!(panel.player_hp, 100);
    assert_eq!(panel.npc_hp, 40);
    assert!(panel.last_event.contains("player"), "{}", panel.last_event);
}

#[test]
fn player_defeat_shows_the_death_banner_then_requests_a_hard_reset() {
    let (mut scene, mut world, _temp) = loaded_scene();
    stand_on_first_npc(&mut scene);
    scene.registry.as_mut().expect("registry").player_mut().hp = 7;

    let interact = InputSnapshot::empty().with_interact_pressed(true);
    let idle = InputSnapshot::empty();
    for _ in 0..5 {
        scene.update(DT, &interact, &mut world);
    }
    // Two turns: the player hits first, then the counterattack lands.
    for _ in 0..2 * COMBAT_TURN_INTERVAL_TICKS {
        scene.update(DT, &idle, &mut world);
    }
    assert!(matches!(scene.mode, GameMode::GameOver { .. }));
    let banner = world.ui_frame().banner.clone().expect("banner");
    assert_eq!(banner.title, DEATH_BANNER_TITLE);

    let mut reset = false;
    for _ in 0..DEATH_BANNER_TICKS + 1 {
        if scene.update(DT, &idle, &mut world) == SceneCommand::HardReset {
            reset = true;
            break;
        }
    }
    assert!(reset);
}

#[test]
fn zoom_input_adjusts_the_camera() {
    let (mut scene, mut world, _temp) = loaded_scene();
    let before = world.camera().zoom;
    let zoom_out = InputSnapshot::empty().with_zoom_delta_steps(-2);
    scene.update(DT, &zoom_out, &mut world);
    assert!(world.camera().zoom < before);
}
