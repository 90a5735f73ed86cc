//! Per-tick observation of a [`Game`], recomputed on demand and never cached.

use crate::game::Game;
use crate::pos::{Dir, Pos};
use serde::{Deserialize, Serialize};

/// Ray directions, clockwise from Up.
pub const VISION_DIRECTIONS: [(i32, i32); 8] = [
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (-1, -1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WallDistances {
    pub up: i32,
    pub down: i32,
    pub left: i32,
    pub right: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoodSense {
    pub dx: i32,
    pub dy: i32,
    pub distance: f64,
    /// `atan2(dy, dx)` in radians, within (-π, π].
    pub angle: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Danger {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl Danger {
    pub fn toward(&self, dir: Dir) -> bool {
        match dir {
            Dir::Up => self.up,
            Dir::Down => self.down,
            Dir::Left => self.left,
            Dir::Right => self.right,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ray {
    /// Steps to the first body or food cell, or to the last in-bounds cell when nothing was hit.
    /// A ray that finds food says nothing about what lies beyond it.
    pub distance: u32,
    pub food_found: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub heading: Dir,
    pub walls: WallDistances,
    pub food: FoodSense,
    pub danger: Danger,
    pub vision: [Ray; 8],
}

pub fn observe(game: &Game) -> Observation {
    let head = game.head();
    let food = game.food();
    let (dx, dy) = (food.x - head.x, food.y - head.y);
    let (fx, fy) = (f64::from(dx), f64::from(dy));

    let danger_at = |dir: Dir| game.collision_at(head.step(dir)).is_some();

    Observation {
        heading: game.heading(),
        walls: WallDistances {
            up: head.y,
            down: game.height() - 1 - head.y,
            left: head.x,
            right: game.width() - 1 - head.x,
        },
        food: FoodSense {
            dx,
            dy,
            distance: fx.hypot(fy),
            angle: fy.atan2(fx),
        },
        danger: Danger {
            up: danger_at(Dir::Up),
            down: danger_at(Dir::Down),
            left: danger_at(Dir::Left),
            right: danger_at(Dir::Right),
        },
        vision: VISION_DIRECTIONS.map(|d| cast(game, head, d)),
    }
}

fn cast(game: &Game, from: Pos, dir: (i32, i32)) -> Ray {
    let food = game.food();
    let mut p = from.offset(dir);
    let mut steps = 1;
    while game.is_in_bounds(p) {
        if p == food {
            return Ray { distance: steps, food_found: true };
        }
        if game.is_occupied_by_snake(p, false) {
            return Ray { distance: steps, food_found: false };
        }
        p = p.offset(dir);
        steps += 1;
    }
    Ray { distance: steps - 1, food_found: false }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;

    fn game(snake: &[Pos], heading: Dir, food: Pos) -> Game {
        Game::from_parts(GameConfig::default(), snake.iter().copied(), heading, food).unwrap()
    }

    #[test]
    fn wall_distances_from_centre() {
        let g = game(&[Pos::new(12, 12)], Dir::Right, Pos::new(0, 0));
        let w = g.observation().walls;
        assert_eq!((w.up, w.down, w.left, w.right), (12, 12, 12, 12));
    }

    #[test]
    fn food_vector_and_angle() {
        let g = game(&[Pos::new(10, 10)], Dir::Right, Pos::new(13, 14));
        let f = g.observation().food;
        assert_eq!((f.dx, f.dy), (3, 4));
        assert!((f.distance - 5.0).abs() < 1e-12);
        assert!((f.angle - 4f64.atan2(3.0)).abs() < 1e-12);

        let g = game(&[Pos::new(10, 10)], Dir::Right, Pos::new(4, 10));
        assert!((g.observation().food.angle - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn empty_ray_stops_at_last_cell_inside() {
        let g = game(&[Pos::new(0, 0)], Dir::Right, Pos::new(0, 24));
        let v = g.observation().vision;
        // Up leaves the grid immediately.
        assert_eq!(v[0], Ray { distance: 0, food_found: false });
        // Right runs across the whole row.
        assert_eq!(v[2], Ray { distance: 24, food_found: false });
        // Down-Right diagonal.
        assert_eq!(v[3], Ray { distance: 24, food_found: false });
        // Down finds the food in the corner.
        assert_eq!(v[4], Ray { distance: 24, food_found: true });
    }

    #[test]
    fn ray_stops_on_body() {
        let snake = [
            Pos::new(5, 5),
            Pos::new(6, 5),
            Pos::new(6, 4),
            Pos::new(5, 4),
            Pos::new(4, 4),
        ];
        let g = game(&snake, Dir::Down, Pos::new(20, 20));
        let v = g.observation().vision;
        assert_eq!(v[0], Ray { distance: 1, food_found: false });
        assert_eq!(v[1], Ray { distance: 1, food_found: false });
        assert_eq!(v[2], Ray { distance: 1, food_found: false });
        assert_eq!(v[7], Ray { distance: 1, food_found: false });
        assert_eq!(v[6], Ray { distance: 5, food_found: false });
        assert_eq!(v[3], Ray { distance: 15, food_found: true });
    }

    #[test]
    fn danger_uses_the_moving_tail_rule() {
        // Tail at (4, 5) is free to enter; the neck at (5, 4) is not.
        let snake = [Pos::new(5, 5), Pos::new(5, 4), Pos::new(4, 4), Pos::new(4, 5)];
        let g = game(&snake, Dir::Down, Pos::new(20, 20));
        let d = g.observation().danger;
        assert!(d.up);
        assert!(!d.left);
        assert!(!d.down);
        assert!(!d.right);
    }

    #[test]
    fn danger_at_the_wall() {
        let g = game(&[Pos::new(0, 24)], Dir::Left, Pos::new(5, 5));
        let d = g.observation().danger;
        assert!(d.left && d.down);
        assert!(!d.up && !d.right);
        assert!(d.toward(Dir::Left));
    }
}
