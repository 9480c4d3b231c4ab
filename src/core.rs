//! L1 — the shared spec contract and the closed sum type every spec
//! variant is an arm of (spec.md §3, §4.2, §9 "Dynamic dispatch on spec
//! variant").
//!
//! Every operation recurses through [`Spec::conform`]/[`Spec::unform`]/
//! [`Spec::explain`]/[`Spec::gen`]; variant-specific behavior lives in
//! `scalar`, `collection`, `keys`, `regexop`, and `fspec`, and is reached
//! here by one `match`. There is deliberately no trait-object dispatch —
//! the set of variants is closed and known, so a sum type is simpler and
//! cheaper than a vtable.

use std::sync::Arc;

use crate::collection::EverySpec;
use crate::fspec::FSpec;
use crate::gen::{Gen, Overrides, RMap};
use crate::keys::{KeysSpec, MergeSpec};
use crate::regexop::RegexSpec;
use crate::scalar::{AndSpec, ConformerSpec, NilableSpec, OrSpec, PredicateSpec, TupleSpec};
use crate::value::{QualifiedName, Value};

/// A single recorded failure (spec.md §3 "Problem").
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    /// Position inside the spec tree.
    pub path: Vec<Value>,
    /// What was being checked.
    pub pred: PredRef,
    /// The value that failed.
    pub val: Value,
    /// Set when a callable predicate raised instead of returning false.
    pub reason: Option<String>,
    /// Chain of named specs traversed to reach this failure.
    pub via: Vec<QualifiedName>,
    /// Position inside the value itself.
    pub in_: Vec<Value>,
}

/// What a [`Problem`] was checking against, kept structured so
/// `explain`'s formatter can render it without re-deriving it from text.
#[derive(Debug, Clone, PartialEq)]
pub enum PredRef {
    Predicate(crate::scalar::PredicateKind),
    /// `or`/`alt` branch exhaustion: one problem per failed branch,
    /// tagged with the branch's key.
    Branch(String, Box<PredRef>),
    /// The `key?` marker of spec.md §4.6: a presence requirement that
    /// was not met.
    KeyPresence(crate::keys::KeyExpr),
    /// Delegating to a nested spec's own predicate (e.g. a value-spec
    /// failure inside `keys`, or a tuple/cat element).
    Nested(Box<PredRef>),
    /// A regex-op structural failure ("Extra input" / "Insufficient
    /// input", spec.md §4.7.2).
    Structural(&'static str),
    /// Exact-length / count mismatches, `tuple`'s arity, etc.
    Message(String),
}

impl std::fmt::Display for PredRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PredRef::Predicate(k) => write!(f, "{k}"),
            PredRef::Branch(_, inner) => write!(f, "{inner}"),
            PredRef::KeyPresence(expr) => write!(f, "{expr}"),
            PredRef::Nested(inner) => write!(f, "{inner}"),
            PredRef::Structural(s) => write!(f, "{s}"),
            PredRef::Message(s) => write!(f, "{s}"),
        }
    }
}

/// The closed set of spec variants (spec.md §3).
pub enum SpecKind {
    Predicate(PredicateSpec),
    And(AndSpec),
    Or(OrSpec),
    Tuple(TupleSpec),
    Nilable(NilableSpec),
    Conformer(ConformerSpec),
    Every(EverySpec),
    Keys(KeysSpec),
    Merge(MergeSpec),
    Regex(RegexSpec),
    F(FSpec),
}

/// A composable description of a value's shape.
///
/// Specs are value-typed and cheap to share (`Arc` internally wherever a
/// spec holds other specs); once registered they are not mutated, only
/// the registry's name-to-spec mapping is (spec.md §3 "Lifecycle").
pub struct Spec {
    pub(crate) kind: SpecKind,
    name: Option<QualifiedName>,
    gen_override: Option<Gen>,
}

impl Spec {
    pub(crate) fn new(kind: SpecKind) -> Self {
        Self {
            kind,
            name: None,
            gen_override: None,
        }
    }

    /// Attach a name, as `def` does at registration time.
    pub fn named(mut self, name: QualifiedName) -> Self {
        self.name = Some(name);
        self
    }

    pub fn name(&self) -> Option<&QualifiedName> {
        self.name.as_ref()
    }

    /// Replace this spec's default generator.
    pub fn with_gen(mut self, gen: Gen) -> Self {
        self.gen_override = Some(gen);
        self
    }

    /// Whether `conform` may return something other than `v` itself.
    pub fn is_conformer(&self) -> bool {
        match &self.kind {
            SpecKind::Predicate(_) => false,
            SpecKind::And(a) => a.specs.iter().any(|s| s.is_conformer()),
            SpecKind::Or(_) => true, // always returns [k, v]
            SpecKind::Tuple(_) => true, // destructures into a seq of conformed elements
            SpecKind::Nilable(n) => n.inner.is_conformer(),
            SpecKind::Conformer(_) => true,
            SpecKind::Every(e) => e.conform_all,
            SpecKind::Keys(_) => true,
            SpecKind::Merge(_) => true,
            SpecKind::Regex(_) => true,
            SpecKind::F(_) => false,
        }
    }

    /// Decide validity and, for conforming specs, destructure.
    /// Total: exactly one of a conformed value or `None` (`INVALID`).
    pub fn conform(&self, v: &Value) -> Option<Value> {
        match &self.kind {
            SpecKind::Predicate(p) => p.conform(v),
            SpecKind::And(a) => a.conform(v),
            SpecKind::Or(o) => o.conform(v),
            SpecKind::Tuple(t) => t.conform(v),
            SpecKind::Nilable(n) => n.conform(v),
            SpecKind::Conformer(c) => c.conform(v),
            SpecKind::Every(e) => e.conform(v),
            SpecKind::Keys(k) => k.conform(v),
            SpecKind::Merge(m) => m.conform(v),
            SpecKind::Regex(r) => r.conform(v),
            SpecKind::F(_) => None,
        }
    }

    pub fn valid(&self, v: &Value) -> bool {
        self.conform(v).is_some()
    }

    /// Inverse of `conform` on the conformed image; identity for
    /// non-transforming specs.
    pub fn unform(&self, v: &Value) -> Value {
        match &self.kind {
            SpecKind::Predicate(_) => v.clone(),
            SpecKind::And(a) => a.unform(v),
            SpecKind::Or(o) => o.unform(v),
            SpecKind::Tuple(t) => t.unform(v),
            SpecKind::Nilable(n) => n.unform(v),
            SpecKind::Conformer(c) => c.unform(v),
            SpecKind::Every(e) => e.unform(v),
            SpecKind::Keys(k) => k.unform(v),
            SpecKind::Merge(m) => m.unform(v),
            SpecKind::Regex(r) => r.unform(v),
            SpecKind::F(_) => v.clone(),
        }
    }

    /// `None` iff `conform(v) != None`; otherwise at least one problem.
    pub fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Option<Vec<Problem>> {
        if self.valid(v) {
            return None;
        }
        let via = self.extend_via(via);
        let problems = match &self.kind {
            SpecKind::Predicate(p) => p.explain(path, &via, in_, v),
            SpecKind::And(a) => a.explain(path, &via, in_, v),
            SpecKind::Or(o) => o.explain(path, &via, in_, v),
            SpecKind::Tuple(t) => t.explain(path, &via, in_, v),
            SpecKind::Nilable(n) => n.explain(path, &via, in_, v),
            SpecKind::Conformer(c) => c.explain(path, &via, in_, v),
            SpecKind::Every(e) => e.explain(path, &via, in_, v),
            SpecKind::Keys(k) => k.explain(path, &via, in_, v),
            SpecKind::Merge(m) => m.explain(path, &via, in_, v),
            SpecKind::Regex(r) => r.explain(path, &via, in_, v),
            SpecKind::F(_) => vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("fspec validation requires calling the function; use Spec::fspec_validate".into()),
                val: v.clone(),
                reason: None,
                via,
                in_: in_.to_vec(),
            }],
        };
        Some(problems)
    }

    fn extend_via(&self, via: &[QualifiedName]) -> Vec<QualifiedName> {
        let mut v = via.to_vec();
        if let Some(name) = &self.name {
            v.push(name.clone());
        }
        v
    }

    /// Compose a generator for this spec, consulting `overrides` by this
    /// spec's registered name or by `path`. `None` means generation is
    /// impossible without an override.
    pub fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        if let Some(g) = overrides.lookup(self.name(), path) {
            return Some(g);
        }
        if let Some(g) = &self.gen_override {
            return Some(Arc::clone(g));
        }
        match &self.kind {
            SpecKind::Predicate(p) => p.gen(),
            SpecKind::And(a) => a.gen(overrides, path, rmap),
            SpecKind::Or(o) => o.gen(overrides, path, rmap),
            SpecKind::Tuple(t) => t.gen(overrides, path, rmap),
            SpecKind::Nilable(n) => n.gen(overrides, path, rmap),
            SpecKind::Conformer(_) => None,
            SpecKind::Every(e) => e.gen(overrides, path, rmap),
            SpecKind::Keys(k) => k.gen(overrides, path, rmap),
            SpecKind::Merge(m) => m.gen(overrides, path, rmap),
            SpecKind::Regex(r) => r.gen(overrides, path, rmap),
            SpecKind::F(_) => None,
        }
    }

    /// Run an `fspec`'s generative trials against `f` (spec.md §4.8).
    /// `false` for every other variant — fspec is the one spec kind
    /// whose contract operates on a callable, not a [`Value`].
    pub fn fspec_validate(&self, f: &crate::fspec::Callable, rand: &mut dyn crate::gen::Rand) -> bool {
        match &self.kind {
            SpecKind::F(fs) => fs.validate(f, rand),
            _ => false,
        }
    }

    /// The smallest failing trial from the most recent `fspec_validate`
    /// call, if any.
    pub fn fspec_failure(&self) -> Option<crate::fspec::FailureCase> {
        match &self.kind {
            SpecKind::F(fs) => fs.last_failure(),
            _ => None,
        }
    }
}
