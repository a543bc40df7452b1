//! One-shot utilities from the utility menu.
//!
//! Stateless: each call draws a fresh value and nothing is remembered.

use rand::Rng;

pub const DICE_SIDES: u32 = 6;
pub const RANDOM_MAX: u32 = 100;

/// Roll a six-sided die (1..=6).
pub fn roll_dice() -> u32 {
    rand::thread_rng().gen_range(1..=DICE_SIDES)
}

/// Uniform number in 0..=100.
pub fn random_number() -> u32 {
    rand::thread_rng().gen_range(0..=RANDOM_MAX)
}
