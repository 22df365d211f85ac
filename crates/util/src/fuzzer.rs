//! Seeded random object-graph generation for differential tests.
//!
//! Uses the xoshiro256** PRNG so the same seed always produces the same
//! graph and the same mutation script. The whole workspace is single-owner
//! single-thread, so the rng lives in a `RefCell` rather than a lock.

use rand::rngs::OsRng;
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use serde_json::{Map, Number, Value};
use std::cell::RefCell;

/// A seeded generator of random JSON object graphs.
///
/// # Examples
///
/// ```
/// use json_cow_util::Fuzzer;
///
/// let fuzzer = Fuzzer::new(Some(0x5eed_c0de));
/// let graph = fuzzer.random_graph(3, 4);
/// assert!(graph.is_object());
/// ```
pub struct Fuzzer {
    /// The seed used to initialize the PRNG.
    pub seed: u64,
    rng: RefCell<Xoshiro256StarStar>,
}

impl Fuzzer {
    /// Create a new fuzzer; a missing seed is drawn from `OsRng`.
    pub fn new(seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(|| OsRng.next_u64());
        Self {
            seed,
            rng: RefCell::new(Xoshiro256StarStar::seed_from_u64(seed)),
        }
    }

    /// Random integer in `[min, max]` (inclusive).
    pub fn random_int(&self, min: i64, max: i64) -> i64 {
        self.rng.borrow_mut().gen_range(min..=max)
    }

    /// Random f64 in `[0, 1)`.
    pub fn random(&self) -> f64 {
        self.rng.borrow_mut().gen::<f64>()
    }

    /// Pick a random element from a slice.
    pub fn pick<'a, T>(&self, elements: &'a [T]) -> &'a T {
        let idx = self.rng.borrow_mut().gen_range(0..elements.len());
        &elements[idx]
    }

    /// Short lowercase attribute key, `k0`..`k15`.
    pub fn random_key(&self) -> String {
        format!("k{}", self.random_int(0, 15))
    }

    /// Random scalar: null, bool, small integer, or short string.
    pub fn random_scalar(&self) -> Value {
        match self.random_int(0, 4) {
            0 => Value::Null,
            1 => Value::Bool(self.random_int(0, 1) == 1),
            2 => Value::Number(Number::from(self.random_int(-50, 50))),
            3 => Value::String(format!("s{}", self.random_int(0, 99))),
            _ => Value::String(String::new()),
        }
    }

    /// Random object graph of at most `depth` nested levels with up to
    /// `breadth` entries per aggregate. The root is always an object so it
    /// can serve as a proxy target with named attributes.
    pub fn random_graph(&self, depth: usize, breadth: usize) -> Value {
        let mut map = Map::new();
        let entries = self.random_int(1, breadth.max(1) as i64) as usize;
        for _ in 0..entries {
            map.insert(self.random_key(), self.random_value(depth.saturating_sub(1), breadth));
        }
        Value::Object(map)
    }

    fn random_value(&self, depth: usize, breadth: usize) -> Value {
        if depth == 0 {
            return self.random_scalar();
        }
        match self.random_int(0, 3) {
            0 => self.random_scalar(),
            1 => {
                let len = self.random_int(0, breadth.max(1) as i64) as usize;
                let mut items = Vec::with_capacity(len);
                for _ in 0..len {
                    items.push(self.random_value(depth - 1, breadth));
                }
                Value::Array(items)
            }
            _ => self.random_graph(depth, breadth),
        }
    }
}
