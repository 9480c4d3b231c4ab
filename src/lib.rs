//! A composable data-shape specification and validation engine.
//!
//! A [`core::Spec`] carries a shared `conform`/`unform`/`explain`/`gen`
//! contract over a closed set of variants (§3): predicates and their
//! combinators (`and`/`or`/`tuple`/`nilable`/`conformer`), collection
//! specs (`every`/`coll_of`/`map_of`/`hash_of`), a mapping spec
//! (`keys`/`merge`), a sequence-regex sub-engine (`cat`/`alt`/
//! `zero_or_more`/`one_or_more`/`zero_or_one`/`constrained`), and
//! function specs (`fspec`). Specs may be registered under a qualified
//! name in a process-wide [`registry`] and referenced recursively.

pub mod collection;
pub mod config;
pub mod core;
pub mod error;
pub mod explain;
pub mod fspec;
pub mod gen;
pub mod keys;
pub mod regexop;
pub mod registry;
pub mod scalar;
pub mod value;

pub use collection::{coll_of, every, hash_of, map_of, EveryOptions, IntoKind};
pub use core::{PredRef, Problem, Spec, SpecKind};
pub use error::{Error, Result};
pub use explain::{explain_data, explain_str, ExplainData};
pub use fspec::{fspec, Callable, FailureCase};
pub use gen::{Gen, OverrideKey, Overrides, RMap, Rand, StdRand};
pub use keys::{and_keys, keys, merge, or_keys, KeyExpr};
pub use regexop::{alt, cat, constrained, one_or_more, zero_or_more, zero_or_one};
pub use registry::{def, def_alias, get, reg_resolve, reset as reset_registry};
pub use scalar::{and, conformer, float_in, nilable, or, predicate, tuple, PredicateKind, TypeTag};
pub use value::{OrderedMap, QualifiedName, Value};

/// `conform(spec, v)` — decide validity and, for conforming specs,
/// destructure (spec.md §3, §4.2).
pub fn conform(spec: &Spec, v: &Value) -> Option<Value> {
    spec.conform(v)
}

/// `unform(spec, v)` — inverse of `conform` on the conformed image.
pub fn unform(spec: &Spec, v: &Value) -> Value {
    spec.unform(v)
}

/// `valid?(spec, v)`.
pub fn valid(spec: &Spec, v: &Value) -> bool {
    spec.valid(v)
}

/// `explain(spec, v)` — writes the formatted explanation to stdout
/// (spec.md §6.1; `to stdout` per the conceptual API surface).
pub fn explain(spec: &Spec, v: &Value) {
    println!("{}", explain_data(spec, v));
}

/// `gen(spec, overrides?)` — build a generator for `spec`, honoring
/// `overrides` by registered name or path.
pub fn gen(spec: &Spec, overrides: &Overrides) -> Option<Gen> {
    spec.gen(overrides, &[], &RMap::new())
}

/// `with_gen(spec, gen)` — attach an explicit generator override.
pub fn with_gen(spec: Spec, generator: Gen) -> Spec {
    spec.with_gen(generator)
}

/// `exercise(spec, n, overrides)` — generate `n` values and pair each
/// with its conformed form (SPEC_FULL.md §14; mirrors the well-known
/// `clojure.spec` contract, never detailed beyond its name in spec.md
/// §6.1).
pub fn exercise(spec: &Spec, n: usize, overrides: &Overrides, rand: &mut dyn Rand) -> Result<Vec<(Value, Option<Value>)>> {
    let generator = gen(spec, overrides).ok_or_else(|| Error::NoGen {
        path: "<exercise>".into(),
        spec: spec.name().cloned(),
    })?;
    Ok((0..n)
        .map(|_| {
            let v = generator(rand);
            let conformed = spec.conform(&v);
            (v, conformed)
        })
        .collect())
}

/// `assert(spec, v)` — raises [`Error::AssertionFailed`] carrying the
/// explanation when `config::check_asserts()` is true and `v` does not
/// conform; otherwise returns `v` unchanged (spec.md §7, §6.1).
pub fn assert(spec: &Spec, v: Value) -> Result<Value> {
    if !config::check_asserts() {
        return Ok(v);
    }
    if spec.valid(&v) {
        return Ok(v);
    }
    Err(Error::AssertionFailed(Box::new(explain_data(spec, &v))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    #[test]
    fn conform_and_unform_round_trip_through_and() {
        let s = and(vec![
            predicate(PredicateKind::Type(TypeTag::Int)),
            conformer(
                |v| match v {
                    Value::Int(n) => Some(Value::Int(n + 1)),
                    _ => None,
                },
                |v| match v {
                    Value::Int(n) => Value::Int(n - 1),
                    _ => v.clone(),
                },
            ),
        ]);
        let conformed = conform(&s, &Value::Int(41)).unwrap();
        assert_eq!(conformed, Value::Int(42));
        assert_eq!(unform(&s, &conformed), Value::Int(41));
    }

    #[test]
    fn explain_str_reports_success_and_failure() {
        let s = predicate(PredicateKind::Type(TypeTag::Int));
        assert_eq!(explain_str(&s, &Value::Int(1)), "Success!");
        assert!(explain_str(&s, &Value::from("x")).contains("fails"));
    }

    #[test]
    fn exercise_generates_n_conformed_pairs() {
        let s = predicate(PredicateKind::Type(TypeTag::Int));
        let mut rand = StdRand::seeded(11);
        let pairs = exercise(&s, 5, &Overrides::new(), &mut rand).unwrap();
        assert_eq!(pairs.len(), 5);
        assert!(pairs.iter().all(|(_, c)| c.is_some()));
    }

    #[test]
    #[serial]
    fn assert_is_a_noop_unless_check_asserts_is_enabled() {
        config::set_check_asserts(false);
        let s = predicate(PredicateKind::Type(TypeTag::Int));
        assert!(assert(&s, Value::from("not an int")).is_ok());

        config::set_check_asserts(true);
        let err = assert(&s, Value::from("not an int")).unwrap_err();
        assert!(matches!(err, Error::AssertionFailed(_)));
        config::set_check_asserts(false);
    }

    #[test]
    #[serial]
    fn def_and_get_round_trip() {
        registry::reset();
        let name = QualifiedName::new("t", "lib_round_trip");
        def(name.clone(), std::sync::Arc::new(predicate(PredicateKind::Type(TypeTag::Bool)).named(name.clone()))).unwrap();
        let resolved = get(&name).unwrap();
        assert!(resolved.valid(&Value::Bool(true)));
        assert!(!resolved.valid(&Value::Int(1)));
    }
}
