/// Waypoint-following state machine. The movement axis comes from the
/// geometry of the current waypoint versus its cyclic successor, so the
/// motion is orthogonal and grid-like; ties prefer vertical correction.
#[derive(Debug, Clone, PartialEq)]
struct PatrolController {
    waypoints: Vec<Rect>,
    current: usize,
}

impl PatrolController {
    fn new(waypoints: Vec<Rect>) -> Self {
        Self {
            waypoints,
            current: 0,
        }
    }

    fn tick(&mut self, actor: &mut Actor) {
        if self.waypoints.len() < 2 {
            return;
        }

        let target_index = (self.current + 1) % self.waypoints.len();
        let current = self.waypoints[self.current];
        let target = self.waypoints[target_index];

        let horizontal_aligned = (current.x - target.x).abs() < PATROL_ALIGNMENT_TOLERANCE;
        let vertical_aligned = (current.y - target.y).abs() < PATROL_ALIGNMENT_TOLERANCE;

        if current.y < target.y && horizontal_aligned {
            actor.move_dir(Facing::Down);
        } else if current.y > target.y && horizontal_aligned {
            actor.move_dir(Facing::Up);
        } else if current.x > target.x && vertical_aligned {
            actor.move_dir(Facing::Left);
        } else if current.x < target.x && vertical_aligned {
            actor.move_dir(Facing::Right);
        }

        actor.recompute_derived();
        if actor.bounds.intersects(&target) {
            self.current = target_index;
        }
    }
}
