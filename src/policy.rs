//! The seam between sensing and acting. Anything that maps an [`Observation`]
//! to a [`Dir`] can drive a game: the greedy heuristic below, a trained
//! network from [`crate::brain`], or a plain closure.

use crate::pos::Dir;
use crate::sensors::Observation;

pub trait Policy {
    fn decide(&mut self, observation: &Observation) -> Dir;
}

impl<F> Policy for F
where
    F: FnMut(&Observation) -> Dir,
{
    fn decide(&mut self, observation: &Observation) -> Dir {
        self(observation)
    }
}

/// Chases food along the horizontal axis first, then the vertical one.
#[derive(Clone, Copy, Debug, Default)]
pub struct Greedy;

impl Policy for Greedy {
    fn decide(&mut self, observation: &Observation) -> Dir {
        greedy(observation)
    }
}

const FALLBACK_ORDER: [Dir; 4] = [Dir::Up, Dir::Right, Dir::Down, Dir::Left];

pub fn greedy(obs: &Observation) -> Dir {
    let (dx, dy) = (obs.food.dx, obs.food.dy);
    let danger = &obs.danger;

    let toward_food = [
        (dx < 0, Dir::Left),
        (dx > 0, Dir::Right),
        (dy < 0, Dir::Up),
        (dy > 0, Dir::Down),
    ];
    if let Some(&(_, dir)) = toward_food
        .iter()
        .find(|&&(wanted, dir)| wanted && !danger.toward(dir))
    {
        return dir;
    }

    FALLBACK_ORDER
        .into_iter()
        .find(|&dir| !danger.toward(dir))
        // Boxed in: keep going and accept the crash.
        .unwrap_or(obs.heading)
}
