//! Candidate entries
//!
//! Weights become repetitions in the display list, and the list is shuffled
//! before a drop so slot position carries no ordering bias.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A named entry with an integer weight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    #[serde(default = "default_weight")]
    pub weight: u32,
}

fn default_weight() -> u32 {
    1
}

impl Entry {
    pub fn new(name: impl Into<String>, weight: u32) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }

    /// Parse `name` or `name:weight`; a bad weight keeps the whole text as the name
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some((name, weight)) = text.rsplit_once(':') {
            if let Ok(weight) = weight.trim().parse() {
                let name = name.trim();
                if !name.is_empty() {
                    return Some(Self::new(name, weight));
                }
            }
        }
        Some(Self::new(text, 1))
    }
}

/// One display name per unit of weight; zero-weight entries vanish
pub fn expand_weighted(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .flat_map(|e| std::iter::repeat_n(e.name.clone(), e.weight as usize))
        .collect()
}

/// Fisher-Yates shuffle into a new list
pub fn shuffled<T: Clone, R: Rng + ?Sized>(list: &[T], rng: &mut R) -> Vec<T> {
    let mut out = list.to_vec();
    out.shuffle(rng);
    out
}
