//! Order in which dynamic slots commit to their final character.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use thiserror::Error;

/// Lock direction.
///
/// Accepts `forward`/`reverse`/`random` and the short `ltr`/`rtl` spellings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid direction '{0}'; expected one of: forward, reverse, random, ltr, rtl")]
pub struct ParseDirectionError(String);

impl Direction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Reverse => "reverse",
            Self::Random => "random",
        }
    }
}

impl FromStr for Direction {
    type Err = ParseDirectionError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "forward" | "ltr" => Ok(Self::Forward),
            "reverse" | "rtl" => Ok(Self::Reverse),
            "random" => Ok(Self::Random),
            _ => Err(ParseDirectionError(raw.to_string())),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = ParseDirectionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A permutation of dynamic ranks `[0, n)`.
///
/// Rank `k` is committed before rank `k + 1`; `order[k]` is the position of
/// the slot within the dynamic subsequence, not its absolute index.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LockOrder(Vec<usize>);

impl LockOrder {
    pub fn generate<R: Rng + ?Sized>(n: usize, direction: Direction, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..n).collect();
        match direction {
            Direction::Forward => {}
            Direction::Reverse => order.reverse(),
            Direction::Random => order.shuffle(rng),
        }
        Self(order)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, rank: usize) -> Option<usize> {
        self.0.get(rank).copied()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}
