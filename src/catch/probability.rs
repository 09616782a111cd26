use rand::Rng;

pub const MAX_CATCH_PROBABILITY: f64 = 0.9;
pub const MIN_CATCH_PROBABILITY: f64 = 0.05;

/// Base experience at which the decaying part of the curve drops by a factor of e.
const DECAY_SCALE: f64 = 600.0;

/// Chance of a catch succeeding, in `[MIN_CATCH_PROBABILITY, MAX_CATCH_PROBABILITY]`.
///
/// Decays exponentially with base experience: 0 gives the maximum, very large values
/// approach the minimum.
pub fn probability(base_experience: u32) -> f64 {
    let decayed = MAX_CATCH_PROBABILITY * (-(base_experience as f64) / DECAY_SCALE).exp();
    (decayed + MIN_CATCH_PROBABILITY).clamp(MIN_CATCH_PROBABILITY, MAX_CATCH_PROBABILITY)
}

/// Source of uniform draws in `[0, 1)`.
pub trait RandomSource: Send + Sync {
    fn draw(&self) -> f64;
}

pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn draw(&self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Always returns the same draw. Used to force catch outcomes.
pub struct FixedDraw(pub f64);

impl RandomSource for FixedDraw {
    fn draw(&self) -> f64 {
        self.0
    }
}

/// Rolls once against [`probability`].
pub fn attempt(base_experience: u32, random: &dyn RandomSource) -> bool {
    random.draw() < probability(base_experience)
}
