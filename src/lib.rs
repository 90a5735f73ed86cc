//! Snake simulation engine with an 8-ray sensor array and pluggable policies.
//!
//! A [`Game`] owns every piece of simulation state; drivers feed it actions
//! chosen by a [`Policy`] from its [`Observation`] and call [`Game::step`].

pub mod brain;
pub mod config;
pub mod energy;
pub mod episode;
pub mod game;
pub mod policy;
pub mod pos;
pub mod sensors;

pub use brain::{Genome, NeuralPolicy};
pub use config::{ConfigError, GameConfig};
pub use episode::{EpisodeReport, run_episode};
pub use game::{Game, GameOver, GameOverCause, LayoutError, Status, StepOutcome};
pub use policy::{Greedy, Policy};
pub use pos::{Dir, Pos};
pub use sensors::Observation;
