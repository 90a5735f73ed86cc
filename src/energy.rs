use crate::config::GameConfig;
use serde::{Deserialize, Serialize};

/// Survival budget. Drained on every step that does not eat, topped up on food.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Energy {
    value: i32,
    decrease: u32,
    increase: u32,
}

impl Energy {
    pub fn new(initial: i32, decrease: u32, increase: u32) -> Self {
        Self { value: initial, decrease, increase }
    }

    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.initial_energy,
            config.energy_decrease_per_step,
            config.energy_increase_per_food,
        )
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn feed(&mut self) {
        self.value = self.value.saturating_add_unsigned(self.increase);
    }

    /// Charges one step. Returns true once the budget has reached zero or below.
    pub fn drain(&mut self) -> bool {
        self.value = self.value.saturating_sub_unsigned(self.decrease);
        self.is_exhausted()
    }

    pub fn is_exhausted(&self) -> bool {
        self.value <= 0
    }
}
