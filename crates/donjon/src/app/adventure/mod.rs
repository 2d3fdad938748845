use std::collections::HashMap;
use std::fs;
use std::io::BufReader;
use std::path::PathBuf;

use engine::{
    resolve_app_paths, Banner, CombatPanel, DialogPanel, EntityId, InputAction, InputSnapshot,
    MapCatalog, Rect, RenderableDesc, RenderableKind, Scene, SceneCommand, SceneWorld,
    SpriteRegion, Tilemap, Transform, Vec2,
};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const TICKS_PER_SECOND: u32 = 60;

const PLAYER_HP: i32 = 100;
const PLAYER_ATTACK: i32 = 10;
const PLAYER_SPEED: f32 = 2.0;
const NPC_HP: i32 = 50;
const NPC_ATTACK: i32 = 7;
const NPC_BASE_SPEED: f32 = 1.0;

const ACTOR_BOUNDS_WIDTH: f32 = 23.0;
const ACTOR_BOUNDS_HEIGHT: f32 = 32.0;
const ACTOR_FEET_HEIGHT: f32 = 8.0;
const WALK_FRAMES_PER_FACING: u32 = 3;
const WALK_ANIMATION_GAIN_PER_STEP: f32 = 8.0;
const WALK_ANIMATION_FLIP_AT: f32 = 100.0;

const PATROL_ALIGNMENT_TOLERANCE: f32 = 3.0;

const COMBAT_TURN_INTERVAL_TICKS: u32 = 30;
const WELCOME_BANNER_TICKS: u32 = 5 * TICKS_PER_SECOND;
const DEATH_BANNER_TICKS: u32 = 3 * TICKS_PER_SECOND;
const DEATH_BANNER_TITLE: &str = "You died";

const SAVE_VERSION: u32 = 1;
const SAVE_FILE: &str = "adventure.json";

const MUSIC_FILE: &str = "lost_woods.ogg";
const MUSIC_VOLUME: f32 = 0.05;

const PLAYER_SPRITE_KEY: &str = "player";

include!("actor.rs");
include!("patrol.rs");
include!("dialog.rs");
include!("combat.rs");
include!("registry.rs");
include!("worlddef.rs");
include!("save.rs");
include!("audio.rs");
include!("scene_impl.rs");

pub(crate) fn build_scene() -> Box<dyn Scene> {
    Box::new(AdventureScene::new(true))
}
