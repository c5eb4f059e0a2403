//! Policies for bounding how many valid records are kept in memory.
//!
//! Every policy consumes a fallible record stream and returns the kept
//! records in input order. Errors from the stream abort sampling.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng as _, SeedableRng as _};
use serde::{Deserialize, Serialize};

/// Seed used for reservoir sampling when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// How many records to keep from the stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SamplePolicy {
    /// Keep every record.
    #[default]
    All,
    /// Keep the first `limit` records and stop reading.
    Head {
        /// Maximum number of records to keep.
        limit: usize,
    },
    /// Keep the last `limit` records in file order.
    Tail {
        /// Maximum number of records to keep.
        limit: usize,
    },
    /// Keep a uniform random sample of `limit` records (Algorithm R).
    ///
    /// The same seed over the same input always selects the same records.
    Reservoir {
        /// Maximum number of records to keep.
        limit: usize,
        /// RNG seed.
        #[serde(default = "default_seed")]
        seed: u64,
    },
}

const fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl SamplePolicy {
    /// Maximum number of records this policy keeps, if bounded.
    #[must_use]
    pub const fn limit(&self) -> Option<usize> {
        match self {
            Self::All => None,
            Self::Head { limit } | Self::Tail { limit } | Self::Reservoir { limit, .. } => {
                Some(*limit)
            }
        }
    }

    /// Drains `items` according to the policy.
    ///
    /// # Errors
    ///
    /// Returns the first error yielded by `items`.
    pub fn sample<T, E, I>(&self, items: I) -> Result<Vec<T>, E>
    where
        I: IntoIterator<Item = Result<T, E>>,
    {
        match *self {
            Self::All => items.into_iter().collect(),
            Self::Head { limit } => items.into_iter().take(limit).collect(),
            Self::Tail { limit } => tail(items, limit),
            Self::Reservoir { limit, seed } => reservoir(items, limit, seed),
        }
    }
}

impl std::fmt::Display for SamplePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => write!(f, "all records"),
            Self::Head { limit } => write!(f, "first {limit} records"),
            Self::Tail { limit } => write!(f, "last {limit} records"),
            Self::Reservoir { limit, seed } => {
                write!(f, "random sample of {limit} records (seed {seed})")
            }
        }
    }
}

/// Caps the up-front allocation for large limits.
const MAX_PREALLOCATE: usize = 1 << 16;

fn tail<T, E, I>(items: I, limit: usize) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut window = VecDeque::with_capacity(limit.min(MAX_PREALLOCATE));
    for item in items {
        let item = item?;
        if limit == 0 {
            continue;
        }
        if window.len() == limit {
            window.pop_front();
        }
        window.push_back(item);
    }
    Ok(window.into())
}

fn reservoir<T, E, I>(items: I, limit: usize, seed: u64) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Result<T, E>>,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let mut kept: Vec<(usize, T)> = Vec::with_capacity(limit.min(MAX_PREALLOCATE));

    for (i, item) in items.into_iter().enumerate() {
        let item = item?;
        if kept.len() < limit {
            kept.push((i, item));
        } else if limit > 0 {
            let j = rng.random_range(0..=i);
            if j < limit {
                kept[j] = (i, item);
            }
        }
    }

    kept.sort_unstable_by_key(|(i, _)| *i);
    Ok(kept.into_iter().map(|(_, item)| item).collect())
}
