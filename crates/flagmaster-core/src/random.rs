//! Injectable randomness.
//!
//! The engine never touches a global RNG. Country selection and option
//! ordering draw from the [`GameRng`] it is built with, so a seed replays a
//! whole game.

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// The random source owned by a [`QuizEngine`](crate::QuizEngine).
pub type GameRng = Box<dyn RngCore + Send>;

/// A reproducible RNG for `seed`, or one seeded from the operating system.
pub fn game_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}
