#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Facing {
    Up,
    Down,
    Left,
    Right,
}

const FACING_COUNT: usize = 4;

/// Sprite sheet row per facing. Sheets lay walk cycles out one row per
/// direction: down, left, right, up from the top.
const FACING_SHEET_ROWS: [u32; FACING_COUNT] = [3, 0, 1, 2];

impl Facing {
    const fn index(self) -> usize {
        match self {
            Facing::Up => 0,
            Facing::Down => 1,
            Facing::Left => 2,
            Facing::Right => 3,
        }
    }
}

/// Shared positional and combat state for the player and NPCs. Movement is
/// speculative: `move_dir` applies the step, the registry's wall pass calls
/// `revert` if the resulting feet rect ended up inside a wall.
#[derive(Debug, Clone, PartialEq)]
struct Actor {
    position: Vec2,
    previous_position: Vec2,
    facing: Facing,
    speed: f32,
    bounds: Rect,
    feet: Rect,
    hp: i32,
    attack_strength: i32,
    walk_frame: u32,
    walk_accumulator: f32,
}

impl Actor {
    fn new(position: Vec2, speed: f32, hp: i32, attack_strength: i32) -> Self {
        let mut actor = Self {
            position,
            previous_position: position,
            facing: Facing::Down,
            speed,
            bounds: Rect::default(),
            feet: Rect::default(),
            hp,
            attack_strength,
            walk_frame: 0,
            walk_accumulator: 0.0,
        };
        actor.recompute_derived();
        actor
    }

    /// Snapshot the current position as the rollback target. Exactly once
    /// per tick, before any movement.
    fn commit_frame(&mut self) {
        self.previous_position = self.position;
    }

    fn move_dir(&mut self, facing: Facing) {
        self.facing = facing;
        match facing {
            Facing::Up => self.position.y -= self.speed,
            Facing::Down => self.position.y += self.speed,
            Facing::Left => self.position.x -= self.speed,
            Facing::Right => self.position.x += self.speed,
        }
        self.advance_walk_animation();
    }

    fn advance_walk_animation(&mut self) {
        self.walk_accumulator += self.speed * WALK_ANIMATION_GAIN_PER_STEP;
        if self.walk_accumulator >= WALK_ANIMATION_FLIP_AT {
            self.walk_accumulator = 0.0;
            self.walk_frame = (self.walk_frame + 1) % WALK_FRAMES_PER_FACING;
        }
    }

    /// Roll back to the last committed position. The derived rects are
    /// recomputed immediately so later checks in the same tick see a
    /// coherent actor.
    fn revert(&mut self) {
        self.position = self.previous_position;
        self.recompute_derived();
    }

    fn recompute_derived(&mut self) {
        self.bounds = Rect::from_top_left(self.position, ACTOR_BOUNDS_WIDTH, ACTOR_BOUNDS_HEIGHT);
        let mut feet = Rect::new(0.0, 0.0, ACTOR_BOUNDS_WIDTH * 0.5, ACTOR_FEET_HEIGHT);
        feet.set_midbottom(self.bounds.midbottom());
        self.feet = feet;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.recompute_derived();
    }

    fn sheet_region(&self) -> SpriteRegion {
        SpriteRegion {
            x: self.walk_frame * ACTOR_BOUNDS_WIDTH as u32,
            y: FACING_SHEET_ROWS[self.facing.index()] * ACTOR_BOUNDS_HEIGHT as u32,
            width: ACTOR_BOUNDS_WIDTH as u32,
            height: ACTOR_BOUNDS_HEIGHT as u32,
        }
    }
}
