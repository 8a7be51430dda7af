//! # Villager Memory
//!
//! Obtained memories: things a villager has seen or done, scored for
//! recall. Each memory carries recency, importance, and relevance scores
//! (0-10) plus a decay multiplier that erodes with simulated time, so old
//! gossip stops crowding out fresh observations in prompts.

use serde::{Deserialize, Serialize};

/// Multiplier applied per simulated hour of decay.
pub const DECAY_PER_HOUR: f32 = 0.95;

/// A single obtained memory with its recall scores.
///
/// # Examples
///
/// ```
/// use hamlet::Memory;
///
/// let memory = Memory::new("Saw Edric by the well", 8.0, 3.0, 5.0);
/// assert_eq!(memory.prompt_weight(), 16);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    pub text: String,
    /// How recent the memory is, 0-10.
    pub recency: f32,
    /// How important the event was, 0-10.
    pub importance: f32,
    /// How relevant it is to the villager's concerns, 0-10.
    pub relevance: f32,
    /// Decay multiplier, starts at 1 and shrinks over time.
    pub multiplier: f32,
    /// Whether the relevance score still awaits an inference pass.
    #[serde(default)]
    pub pending_score: bool,
}

impl Memory {
    /// Creates a fresh memory with full decay multiplier.
    pub fn new(text: impl Into<String>, recency: f32, importance: f32, relevance: f32) -> Self {
        Self {
            text: text.into(),
            recency,
            importance,
            relevance,
            multiplier: 1.0,
            pending_score: false,
        }
    }

    /// Creates a memory carrying the placeholder relevance score until an
    /// inference pass rates it.
    pub fn unscored(text: impl Into<String>, recency: f32, importance: f32) -> Self {
        let mut memory = Self::new(
            text,
            recency,
            importance,
            crate::config::DEFAULT_RELEVANCE as f32,
        );
        memory.pending_score = true;
        memory
    }

    /// Recall weight: score sum scaled by the decay multiplier.
    pub fn weight(&self) -> f32 {
        (self.recency + self.relevance + self.importance) * self.multiplier
    }

    /// Weight rounded to an integer for prompt serialization.
    pub fn prompt_weight(&self) -> i32 {
        self.weight().round() as i32
    }

    /// Applies decay for a stretch of simulated hours.
    pub fn decay(&mut self, hours: f32) {
        self.multiplier *= DECAY_PER_HOUR.powf(hours);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_is_score_sum_times_multiplier() {
        let mut memory = Memory::new("test", 4.0, 2.0, 6.0);
        assert_eq!(memory.weight(), 12.0);
        memory.multiplier = 0.5;
        assert_eq!(memory.weight(), 6.0);
        assert_eq!(memory.prompt_weight(), 6);
    }

    #[test]
    fn test_unscored_starts_at_the_default_relevance() {
        let memory = Memory::unscored("test", 9.0, 2.0);
        assert!(memory.pending_score);
        assert_eq!(
            memory.relevance,
            crate::config::DEFAULT_RELEVANCE as f32
        );
        assert!(!Memory::new("test", 9.0, 2.0, 5.0).pending_score);
    }

    #[test]
    fn test_decay_compounds_per_hour() {
        let mut memory = Memory::new("test", 5.0, 5.0, 5.0);
        memory.decay(1.0);
        assert!((memory.multiplier - DECAY_PER_HOUR).abs() < 1e-5);
        memory.decay(2.0);
        assert!((memory.multiplier - DECAY_PER_HOUR.powf(3.0)).abs() < 1e-5);
    }

    #[test]
    fn test_prompt_weight_rounds() {
        let mut memory = Memory::new("test", 3.0, 3.0, 3.0);
        memory.multiplier = 0.95;
        // 9 * 0.95 = 8.55 rounds to 9
        assert_eq!(memory.prompt_weight(), 9);
    }
}
