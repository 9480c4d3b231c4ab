//! The generator-composition layer (spec.md §4.7.4, §4.8, §6.2).
//!
//! The random-value primitive source is explicitly out of scope (spec.md
//! §1) — only the `Rand` contract matters. This module defines that
//! contract, a default implementation over `rand::rngs::StdRng` for
//! callers who don't want to supply their own, the generator type specs
//! compose (`Gen`), per-path/per-name overrides, and the recursion
//! counter that bounds generation through recursive named specs.

use std::collections::HashMap;
use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::value::{QualifiedName, Value};

/// The primitive source every generator is built from. Implementations
/// must be deterministic given a seed (spec.md §6.2); this crate calls
/// only the methods below, never a global PRNG.
pub trait Rand {
    fn integer(&mut self) -> i64;
    fn range(&mut self, lo: i64, hi: i64) -> i64;
    /// A float uniformly distributed in `[lo, hi]`. Not named in the
    /// distilled primitive list of §6.2 (which predates `float_in`,
    /// §6.1) — added because no combination of `integer`/`range` can
    /// honestly produce one; see DESIGN.md.
    fn float_range(&mut self, lo: f64, hi: f64) -> f64;
    fn bool(&mut self) -> bool;
    /// Picks uniformly among `choices`; panics on an empty slice, same
    /// as every other "choose from a nonempty set" operation here.
    fn choose<'a>(&mut self, choices: &'a [Value]) -> &'a Value;
    /// Picks a size in `0..=max` for the caller to build a collection or
    /// string from. A free function rather than the generic
    /// size-then-build combinator `rand`-flavored APIs often expose,
    /// since a generic method can't be called through `&mut dyn Rand`.
    fn sized(&mut self, max: usize) -> usize;
    /// Weighted choice among generators.
    fn freq(&mut self, weighted: &[(u32, Gen)]) -> Value;
    /// Uniform choice among generators.
    fn branch(&mut self, gens: &[Gen]) -> Value;
    fn string(&mut self, max_len: usize) -> String;
}

/// A composed generator: given a `Rand`, produce one `Value`.
pub type Gen = Arc<dyn Fn(&mut dyn Rand) -> Value + Send + Sync>;

pub fn gen_fn<F>(f: F) -> Gen
where
    F: Fn(&mut dyn Rand) -> Value + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Deterministic default `Rand` over `rand`'s `StdRng`.
pub struct StdRand {
    rng: StdRng,
}

impl StdRand {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl Rand for StdRand {
    fn integer(&mut self) -> i64 {
        self.rng.gen()
    }

    fn range(&mut self, lo: i64, hi: i64) -> i64 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    fn float_range(&mut self, lo: f64, hi: f64) -> f64 {
        if lo >= hi {
            return lo;
        }
        self.rng.gen_range(lo..=hi)
    }

    fn bool(&mut self) -> bool {
        self.rng.gen()
    }

    fn choose<'a>(&mut self, choices: &'a [Value]) -> &'a Value {
        let i = self.rng.gen_range(0..choices.len());
        &choices[i]
    }

    fn sized(&mut self, max: usize) -> usize {
        if max == 0 { 0 } else { self.rng.gen_range(0..=max) }
    }

    fn freq(&mut self, weighted: &[(u32, Gen)]) -> Value {
        let total: u32 = weighted.iter().map(|(w, _)| *w).sum();
        let mut pick = self.rng.gen_range(0..total.max(1));
        for (w, g) in weighted {
            if pick < *w {
                return g(self);
            }
            pick -= w;
        }
        unreachable!("weights sum to total by construction")
    }

    fn branch(&mut self, gens: &[Gen]) -> Value {
        let i = self.rng.gen_range(0..gens.len());
        gens[i](self)
    }

    fn string(&mut self, max_len: usize) -> String {
        const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
        let len = if max_len == 0 { 0 } else { self.rng.gen_range(0..=max_len) };
        (0..len)
            .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
            .collect()
    }
}

/// A key into the override table: either a registered spec name or a
/// literal path (spec.md glossary "Overrides").
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OverrideKey {
    Name(QualifiedName),
    Path(Vec<String>),
}

/// A map from registered name or path to a generator that should be used
/// instead of a sub-spec's default.
#[derive(Clone, Default)]
pub struct Overrides {
    by_name: HashMap<QualifiedName, Gen>,
    by_path: HashMap<Vec<String>, Gen>,
}

impl Overrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: QualifiedName, gen: Gen) -> Self {
        self.by_name.insert(name, gen);
        self
    }

    pub fn with_path(mut self, path: Vec<String>, gen: Gen) -> Self {
        self.by_path.insert(path, gen);
        self
    }

    /// Path overrides take precedence over name overrides, since a path
    /// override is the more specific request.
    pub fn lookup(&self, name: Option<&QualifiedName>, path: &[String]) -> Option<Gen> {
        if let Some(g) = self.by_path.get(path) {
            return Some(Arc::clone(g));
        }
        name.and_then(|n| self.by_name.get(n)).cloned()
    }
}

/// Per-`id` re-entry counter bounding recursive `Alt`/`Rep` generation
/// (spec.md §4.7.4). Cloned (cheaply, it's small) on each branch so that
/// sibling branches don't share counts, matching the rule that the limit
/// is "per recursive path," not global.
#[derive(Clone, Default)]
pub struct RMap {
    counts: HashMap<usize, usize>,
}

impl RMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-entry count so far for `id`.
    pub fn count(&self, id: usize) -> usize {
        *self.counts.get(&id).unwrap_or(&0)
    }

    /// A new map with `id`'s count incremented by one.
    pub fn entered(&self, id: usize) -> Self {
        let mut next = self.clone();
        *next.counts.entry(id).or_insert(0) += 1;
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn std_rand_is_deterministic_given_a_seed() {
        let mut a = StdRand::seeded(42);
        let mut b = StdRand::seeded(42);
        let xs: Vec<i64> = (0..10).map(|_| a.range(0, 1000)).collect();
        let ys: Vec<i64> = (0..10).map(|_| b.range(0, 1000)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn rmap_counts_are_per_branch() {
        let base = RMap::new();
        let a = base.entered(1);
        let b = base.entered(1);
        assert_eq!(a.count(1), 1);
        assert_eq!(b.count(1), 1);
        let aa = a.entered(1);
        assert_eq!(aa.count(1), 2);
        assert_eq!(a.count(1), 1, "entered() must not mutate the original");
    }

    #[test]
    fn override_path_beats_name() {
        let name = QualifiedName::new("ns", "x");
        let by_name = gen_fn(|_| Value::Int(1));
        let by_path = gen_fn(|_| Value::Int(2));
        let overrides = Overrides::new()
            .with_name(name.clone(), by_name)
            .with_path(vec!["root".into()], by_path);
        let mut r = StdRand::seeded(1);
        let g = overrides.lookup(Some(&name), &["root".to_string()]).unwrap();
        assert_eq!(g(&mut r), Value::Int(2));
        let g2 = overrides.lookup(Some(&name), &["elsewhere".to_string()]).unwrap();
        assert_eq!(g2(&mut r), Value::Int(1));
    }
}
