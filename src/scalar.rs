//! L2 — scalar specs: `predicate`, `and`, `or`, `tuple`, `nilable`,
//! `conformer` (spec.md §4.3, §4.4).

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use crate::core::{PredRef, Problem, Spec, SpecKind};
use crate::gen::{Gen, Overrides, RMap};
use crate::value::{QualifiedName, Value};

/// The four predicate shapes of spec.md §4.3, plus the handful of
/// primitive-typed variants the built-in registry (§6.3) needs and
/// `float_in` (§6.1, detailed in SPEC_FULL.md §14).
#[derive(Clone)]
pub enum PredicateKind {
    /// Matches anything.
    Any,
    /// Type-membership test.
    Type(TypeTag),
    /// Value-set membership.
    Set(Vec<Value>),
    /// Full-string pattern match against `Value::String`.
    Pattern(Regex),
    /// An arbitrary callable. A raised panic is caught and reported as
    /// the problem's `reason` rather than propagating (spec.md §7).
    Fn(Arc<dyn Fn(&Value) -> bool + Send + Sync>),
    /// `int -> bool`, used for the `positive_integer`/`natural_integer`/
    /// `negative_integer` built-ins (§6.3) where `Fn(&Value) -> bool`
    /// would be needlessly indirect.
    IntPredicate(fn(i64) -> bool),
    /// `empty` built-in: matches an empty string, seq, or map.
    Empty,
    /// `float_in(min, max, infinite, nan)` (§6.1, §14).
    FloatIn {
        min: f64,
        max: f64,
        infinite: bool,
        nan: bool,
    },
}

impl fmt::Debug for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl PartialEq for PredicateKind {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredicateKind::Any => write!(f, "any?"),
            PredicateKind::Type(t) => write!(f, "{t}"),
            PredicateKind::Set(vs) => {
                write!(f, "#{{")?;
                for (i, v) in vs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, "}}")
            }
            PredicateKind::Pattern(re) => write!(f, "/{}/", re.as_str()),
            PredicateKind::Fn(_) => write!(f, "<predicate>"),
            PredicateKind::IntPredicate(_) => write!(f, "<int-predicate>"),
            PredicateKind::Empty => write!(f, "empty?"),
            PredicateKind::FloatIn { min, max, infinite, nan } => {
                write!(f, "float_in({min}, {max}, infinite={infinite}, nan={nan})")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    Nil,
    Bool,
    Int,
    Float,
    Numeric,
    String,
    Symbol,
    Seq,
    Map,
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TypeTag::Nil => "Nil",
            TypeTag::Bool => "Bool",
            TypeTag::Int => "Integer",
            TypeTag::Float => "Float",
            TypeTag::Numeric => "Numeric",
            TypeTag::String => "String",
            TypeTag::Symbol => "Symbol",
            TypeTag::Seq => "Seq",
            TypeTag::Map => "Map",
        };
        write!(f, "{s}")
    }
}

impl TypeTag {
    fn test(self, v: &Value) -> bool {
        match self {
            TypeTag::Nil => matches!(v, Value::Nil),
            TypeTag::Bool => matches!(v, Value::Bool(_)),
            TypeTag::Int => matches!(v, Value::Int(_)),
            TypeTag::Float => matches!(v, Value::Float(_)),
            TypeTag::Numeric => v.is_numeric(),
            TypeTag::String => matches!(v, Value::String(_)),
            TypeTag::Symbol => matches!(v, Value::Symbol(_)),
            TypeTag::Seq => matches!(v, Value::Seq(_)),
            TypeTag::Map => matches!(v, Value::Map(_)),
        }
    }
}

impl PredicateKind {
    pub fn test(&self, v: &Value) -> bool {
        match self {
            PredicateKind::Any => true,
            PredicateKind::Type(t) => t.test(v),
            PredicateKind::Set(vs) => vs.contains(v),
            PredicateKind::Pattern(re) => v.as_str().is_some_and(|s| {
                re.find(s).is_some_and(|m| m.start() == 0 && m.end() == s.len())
            }),
            PredicateKind::Fn(f) => f(v),
            PredicateKind::IntPredicate(f) => matches!(v, Value::Int(n) if f(*n)),
            PredicateKind::Empty => match v {
                Value::String(s) => s.is_empty(),
                Value::Seq(s) => s.is_empty(),
                Value::Map(m) => m.is_empty(),
                _ => false,
            },
            PredicateKind::FloatIn { min, max, infinite, nan } => match v {
                Value::Float(x) if x.is_nan() => *nan,
                Value::Float(x) if x.is_infinite() => *infinite,
                Value::Float(x) => *x >= *min && *x <= *max,
                _ => false,
            },
        }
    }

    fn gen(&self) -> Option<Gen> {
        use crate::gen::gen_fn;
        match self.clone() {
            PredicateKind::Any => Some(gen_fn(|r| {
                r.branch(&[
                    gen_fn(|r| Value::Bool(r.bool())),
                    gen_fn(|r| Value::Int(r.range(-1000, 1000))),
                    gen_fn(|r| Value::String(r.string(10))),
                ])
            })),
            PredicateKind::Type(TypeTag::Bool) => Some(gen_fn(|r| Value::Bool(r.bool()))),
            PredicateKind::Type(TypeTag::Int) | PredicateKind::Type(TypeTag::Numeric) => {
                Some(gen_fn(|r| Value::Int(r.range(-1000, 1000))))
            }
            PredicateKind::Type(TypeTag::Float) => {
                Some(gen_fn(|r| Value::Float(r.float_range(-1000.0, 1000.0))))
            }
            PredicateKind::Type(TypeTag::String) => Some(gen_fn(|r| Value::String(r.string(10)))),
            PredicateKind::Type(TypeTag::Nil) => Some(gen_fn(|_| Value::Nil)),
            PredicateKind::Set(vs) if !vs.is_empty() => {
                Some(gen_fn(move |r| r.choose(&vs).clone()))
            }
            PredicateKind::IntPredicate(f) => {
                // Sample a plausible range and retry until it matches;
                // bounded by the caller via fspec_iterations-style loops
                // elsewhere, so a generous fixed cap here is enough.
                Some(gen_fn(move |r| {
                    for _ in 0..256 {
                        let n = r.range(-10_000, 10_000);
                        if f(n) {
                            return Value::Int(n);
                        }
                    }
                    Value::Int(1)
                }))
            }
            PredicateKind::Empty => Some(gen_fn(|_| Value::Seq(vec![]))),
            PredicateKind::FloatIn { min, max, infinite, nan } => Some(gen_fn(move |r| {
                if nan && r.range(0, 9) == 0 {
                    return Value::Float(f64::NAN);
                }
                if infinite && r.range(0, 9) == 0 {
                    return Value::Float(if r.bool() { f64::INFINITY } else { f64::NEG_INFINITY });
                }
                Value::Float(r.float_range(min, max))
            })),
            _ => None,
        }
    }
}

pub struct PredicateSpec {
    pub kind: PredicateKind,
}

impl PredicateSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        self.kind.test(v).then(|| v.clone())
    }

    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        vec![Problem {
            path: path.to_vec(),
            pred: PredRef::Predicate(self.kind.clone()),
            val: v.clone(),
            reason: None,
            via: via.to_vec(),
            in_: in_.to_vec(),
        }]
    }

    pub(crate) fn gen(&self) -> Option<Gen> {
        self.kind.gen()
    }
}

/// Wrap `kind` as a [`Spec`]. Mirrors `reg_resolve`'s behavior of
/// treating a bare predicate passed to `def` as an implicit `predicate`
/// spec (spec.md §4.1).
pub fn predicate(kind: PredicateKind) -> Spec {
    Spec::new(SpecKind::Predicate(PredicateSpec { kind }))
}

pub fn float_in(min: f64, max: f64, infinite: bool, nan: bool) -> Spec {
    predicate(PredicateKind::FloatIn { min, max, infinite, nan })
}

pub struct AndSpec {
    pub specs: Vec<Arc<Spec>>,
}

impl AndSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        let mut current = v.clone();
        for s in &self.specs {
            current = s.conform(&current)?;
        }
        Some(current)
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        let mut current = v.clone();
        for s in self.specs.iter().rev() {
            current = s.unform(&current);
        }
        current
    }

    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        let mut current = v.clone();
        for s in &self.specs {
            match s.conform(&current) {
                Some(next) => current = next,
                None => return s.explain(path, via, in_, &current).unwrap_or_default(),
            }
        }
        vec![]
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        // Only the first conjunct's shape can be generated from scratch;
        // later conjuncts are treated as additional constraints checked
        // after the fact (retried up to a fixed bound).
        let first = self.specs.first()?.gen(overrides, path, rmap)?;
        let rest = self.specs.clone();
        Some(crate::gen::gen_fn(move |r| {
            for _ in 0..100 {
                let v = first(r);
                if rest.iter().skip(1).all(|s| s.valid(&v)) {
                    return v;
                }
            }
            first(r)
        }))
    }
}

pub fn and(specs: Vec<Spec>) -> Spec {
    Spec::new(SpecKind::And(AndSpec {
        specs: specs.into_iter().map(Arc::new).collect(),
    }))
}

pub struct OrSpec {
    pub branches: Vec<(String, Arc<Spec>)>,
}

impl OrSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        for (k, s) in &self.branches {
            if let Some(c) = s.conform(v) {
                return Some(Value::Seq(vec![Value::String(k.clone()), c]));
            }
        }
        None
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        match v {
            Value::Seq(items) if items.len() == 2 => {
                if let Value::String(k) = &items[0] {
                    if let Some((_, s)) = self.branches.iter().find(|(bk, _)| bk == k) {
                        return s.unform(&items[1]);
                    }
                }
                v.clone()
            }
            _ => v.clone(),
        }
    }

    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        self.branches
            .iter()
            .flat_map(|(k, s)| {
                let mut branch_path = path.to_vec();
                branch_path.push(Value::String(k.clone()));
                s.explain(&branch_path, via, in_, v).unwrap_or_default()
            })
            .collect()
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        let gens: Vec<Gen> = self
            .branches
            .iter()
            .filter_map(|(_, s)| s.gen(overrides, path, rmap))
            .collect();
        if gens.is_empty() {
            return None;
        }
        Some(crate::gen::gen_fn(move |r| r.branch(&gens)))
    }
}

/// `or(k1:p1, …, kn:pn)` — strictly left-to-right preference (spec.md
/// §4.7.3, §8 "Left-to-right preference").
pub fn or(branches: Vec<(String, Spec)>) -> Spec {
    Spec::new(SpecKind::Or(OrSpec {
        branches: branches.into_iter().map(|(k, s)| (k, Arc::new(s))).collect(),
    }))
}

pub struct TupleSpec {
    pub specs: Vec<Arc<Spec>>,
}

impl TupleSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        let items = v.as_seq()?;
        if items.len() != self.specs.len() {
            return None;
        }
        let mut out = Vec::with_capacity(items.len());
        for (s, item) in self.specs.iter().zip(items) {
            out.push(s.conform(item)?);
        }
        Some(Value::Seq(out))
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        match v.as_seq() {
            Some(items) if items.len() == self.specs.len() => Value::Seq(
                self.specs
                    .iter()
                    .zip(items)
                    .map(|(s, item)| s.unform(item))
                    .collect(),
            ),
            _ => v.clone(),
        }
    }

    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        let Some(items) = v.as_seq() else {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("expected a sequence".into()),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        };
        if items.len() != self.specs.len() {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message(format!(
                    "expected exactly {} elements, got {}",
                    self.specs.len(),
                    items.len()
                )),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        }
        let mut problems = vec![];
        for (i, (s, item)) in self.specs.iter().zip(items).enumerate() {
            if s.conform(item).is_none() {
                let mut p = path.to_vec();
                p.push(Value::Int(i as i64));
                let mut iv = in_.to_vec();
                iv.push(Value::Int(i as i64));
                problems.extend(s.explain(&p, via, &iv, item).unwrap_or_default());
            }
        }
        problems
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        let mut gens = Vec::with_capacity(self.specs.len());
        for (i, s) in self.specs.iter().enumerate() {
            let mut p = path.to_vec();
            p.push(i.to_string());
            gens.push(s.gen(overrides, &p, rmap)?);
        }
        Some(crate::gen::gen_fn(move |r| {
            Value::Seq(gens.iter().map(|g| g(r)).collect())
        }))
    }
}

pub fn tuple(specs: Vec<Spec>) -> Spec {
    Spec::new(SpecKind::Tuple(TupleSpec {
        specs: specs.into_iter().map(Arc::new).collect(),
    }))
}

pub struct NilableSpec {
    pub inner: Arc<Spec>,
}

impl NilableSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        if matches!(v, Value::Nil) {
            Some(Value::Nil)
        } else {
            self.inner.conform(v)
        }
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        if matches!(v, Value::Nil) {
            Value::Nil
        } else {
            self.inner.unform(v)
        }
    }

    /// "Reports problems against both branches only when both fail"
    /// (spec.md §4.4) — but we're only called once `conform` has
    /// already failed, and nil never fails both branches at once, so
    /// this always means the inner spec failed on a non-nil value.
    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        self.inner.explain(path, via, in_, v).unwrap_or_default()
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        let inner = self.inner.gen(overrides, path, rmap)?;
        Some(crate::gen::gen_fn(move |r| {
            if r.range(0, 9) == 0 {
                Value::Nil
            } else {
                inner(r)
            }
        }))
    }
}

pub fn nilable(inner: Spec) -> Spec {
    Spec::new(SpecKind::Nilable(NilableSpec {
        inner: Arc::new(inner),
    }))
}

pub struct ConformerSpec {
    pub f: Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>,
    pub finv: Arc<dyn Fn(&Value) -> Value + Send + Sync>,
}

impl ConformerSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        (self.f)(v)
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        (self.finv)(v)
    }

    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        vec![Problem {
            path: path.to_vec(),
            pred: PredRef::Message("conformer function".into()),
            val: v.clone(),
            reason: None,
            via: via.to_vec(),
            in_: in_.to_vec(),
        }]
    }
}

/// `conformer(f, finv?)`. Per the DESIGN.md resolution of spec.md §9's
/// open question, `finv` is required, not defaulted to identity — a
/// conformer built without a genuine inverse does not round-trip, and a
/// required parameter makes that a compile-time decision instead of a
/// silent runtime one.
pub fn conformer(
    f: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    finv: impl Fn(&Value) -> Value + Send + Sync + 'static,
) -> Spec {
    Spec::new(SpecKind::Conformer(ConformerSpec {
        f: Arc::new(f),
        finv: Arc::new(finv),
    }))
}
