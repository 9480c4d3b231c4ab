//! L0 — the process-wide registry mapping qualified names to specs.
//!
//! Modeled as an atomic swap of an immutable snapshot (spec.md §5, §9):
//! readers take a cheap `Arc` clone of the current map and never block;
//! `def`/`reset` install a brand-new map built from the old one. No
//! reader ever observes a torn view, and no lock is held across a user
//! predicate call.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::core::Spec;
use crate::error::{Error, Result};
use crate::value::QualifiedName;

/// A registry entry is either a concrete spec or an alias to another name.
#[derive(Clone)]
enum Entry {
    Spec(Arc<Spec>),
    Alias(QualifiedName),
}

type Snapshot = HashMap<QualifiedName, Entry>;

static REGISTRY: OnceLock<RwLock<Arc<Snapshot>>> = OnceLock::new();

fn cell() -> &'static RwLock<Arc<Snapshot>> {
    REGISTRY.get_or_init(|| RwLock::new(Arc::new(builtins())))
}

fn snapshot() -> Arc<Snapshot> {
    Arc::clone(&cell().read().expect("registry lock poisoned"))
}

fn swap(f: impl FnOnce(&Snapshot) -> Snapshot) {
    let mut guard = cell().write().expect("registry lock poisoned");
    let next = f(&guard);
    *guard = Arc::new(next);
}

/// Register `name` as `spec_or_alias`. `spec` must already carry `name`
/// as its own name (spec.md §3 "A registered spec's name equals the key
/// under which it is stored").
pub fn def(name: QualifiedName, spec: Arc<Spec>) -> Result<()> {
    if !name.is_qualified() {
        return Err(Error::UnqualifiedName(name.local));
    }
    tracing::debug!(%name, "registering spec");
    swap(|old| {
        let mut next = old.clone();
        next.insert(name, Entry::Spec(spec));
        next
    });
    Ok(())
}

/// Register `name` as an alias for `target` — `get(name)` and friends
/// will resolve through to whatever `target` currently resolves to.
pub fn def_alias(name: QualifiedName, target: QualifiedName) -> Result<()> {
    if !name.is_qualified() {
        return Err(Error::UnqualifiedName(name.local));
    }
    tracing::debug!(%name, %target, "registering alias");
    swap(|old| {
        let mut next = old.clone();
        next.insert(name, Entry::Alias(target));
        next
    });
    Ok(())
}

/// Look up a registered spec by name, following alias chains.
pub fn get(name: &QualifiedName) -> Option<Arc<Spec>> {
    reg_resolve(name).ok()
}

/// Follow `name`'s alias chain until a concrete spec is found.
/// Errors if the chain ends in an unregistered name.
pub fn reg_resolve(name: &QualifiedName) -> Result<Arc<Spec>> {
    let snap = snapshot();
    let mut current = name.clone();
    let mut hops = 0usize;
    loop {
        match snap.get(&current) {
            Some(Entry::Spec(s)) => return Ok(Arc::clone(s)),
            Some(Entry::Alias(next)) => {
                hops += 1;
                if hops > snap.len() + 1 {
                    // An alias cycle with no concrete spec at the end;
                    // treat as unresolved rather than loop forever.
                    return Err(Error::UnresolvedName(name.clone()));
                }
                current = next.clone();
            }
            None => return Err(Error::UnresolvedName(name.clone())),
        }
    }
}

/// Reset the registry to just the built-in set (spec.md §6.3).
pub fn reset() {
    tracing::debug!("resetting registry to built-ins");
    let mut guard = cell().write().expect("registry lock poisoned");
    *guard = Arc::new(builtins());
}

fn builtins() -> Snapshot {
    use crate::scalar::{predicate, PredicateKind};
    let mut m = HashMap::new();
    let mut reg = |ns: &str, local: &str, kind: PredicateKind| {
        let name = QualifiedName::new(ns, local);
        let spec = Arc::new(predicate(kind).named(name.clone()));
        m.insert(name, Entry::Spec(spec));
    };
    reg("specula", "any", PredicateKind::Any);
    reg("specula", "boolean", PredicateKind::Type(crate::scalar::TypeTag::Bool));
    reg(
        "specula",
        "positive_integer",
        PredicateKind::IntPredicate(|n| n > 0),
    );
    reg(
        "specula",
        "natural_integer",
        PredicateKind::IntPredicate(|n| n >= 0),
    );
    reg(
        "specula",
        "negative_integer",
        PredicateKind::IntPredicate(|n| n < 0),
    );
    reg("specula", "empty", PredicateKind::Empty);
    m
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{and, predicate, PredicateKind};
    use serial_test::serial;

    #[test]
    fn unqualified_name_rejected() {
        let s = Arc::new(predicate(PredicateKind::Any));
        let err = def(QualifiedName::local("oops"), s).unwrap_err();
        assert!(matches!(err, Error::UnqualifiedName(_)));
    }

    #[test]
    #[serial]
    fn alias_chain_resolves() {
        let name = QualifiedName::new("t", "int_alias_test");
        let target = QualifiedName::new("t", "int_target_test");
        def(target.clone(), Arc::new(predicate(PredicateKind::Type(crate::scalar::TypeTag::Int)).named(target.clone()))).unwrap();
        def_alias(name.clone(), target.clone()).unwrap();
        let resolved = reg_resolve(&name).unwrap();
        assert_eq!(resolved.name(), Some(&target));
    }

    #[test]
    #[serial]
    fn unresolved_name_errors() {
        let err = reg_resolve(&QualifiedName::new("t", "definitely_missing_xyz")).unwrap_err();
        assert!(matches!(err, Error::UnresolvedName(_)));
    }

    #[test]
    #[serial]
    fn builtins_present_after_reset() {
        reset();
        assert!(get(&QualifiedName::new("specula", "any")).is_some());
        assert!(get(&QualifiedName::new("specula", "positive_integer")).is_some());
        // Re-define something, then reset and confirm it's gone.
        def(
            QualifiedName::new("t", "scratch"),
            Arc::new(and(vec![predicate(PredicateKind::Any)])),
        )
        .unwrap();
        assert!(get(&QualifiedName::new("t", "scratch")).is_some());
        reset();
        assert!(get(&QualifiedName::new("t", "scratch")).is_none());
    }
}
