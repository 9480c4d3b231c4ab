//! L5 — the sequence-regex sub-engine (spec.md §4.7, "the heart").
//!
//! A regex op describes a grammar over predicates and is matched against
//! a finite sequence via Brzozowski derivatives: `deriv(r, x)` is the
//! regex accepting the suffixes of `L(r)` after consuming `x`. Folding
//! `deriv` over a sequence and checking `accept_nil?`/`preturn` at the
//! end is the whole algorithm; everything else in this module is that
//! recursion spelled out per node type.
//!
//! A regex op is not itself a [`Spec`] — it is wrapped by [`RegexSpec`]
//! to act as one at a sequence boundary. Embedding a `Regex`-kind `Spec`
//! as a term inside another regex makes it consume exactly one element
//! (the nested sequence); that's the only place the two layers meet.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::{PredRef, Problem, Spec, SpecKind};
use crate::gen::{Gen, Overrides, RMap, Rand};
use crate::value::{OrderedMap, QualifiedName, Value};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Reserved for the transient `Alt` nodes built internally while merging
/// `deriv`'s "continue this term" / "advance to the next term" branches.
/// Those nodes never outlive a single `deriv` call, so they take no part
/// in recursion-limit accounting.
const TRANSIENT_ID: usize = usize::MAX;

/// A node in the grammar (spec.md §4.7.1): `{Accept, Pcat, Alt, Rep, Amp}`
/// plus `Pred`, the leaf wrapping an ordinary value-spec as a one-element
/// consuming term.
#[derive(Clone)]
pub enum RegexOp {
    Accept(Value),
    Pred(Arc<Spec>),
    Pcat {
        done: Vec<(Option<String>, Value)>,
        remaining: Vec<(Option<String>, Arc<RegexOp>)>,
    },
    Alt {
        id: usize,
        preds: Vec<(Option<String>, Arc<RegexOp>)>,
    },
    Rep {
        p1: Arc<RegexOp>,
        p2: Arc<RegexOp>,
        ret: Vec<Value>,
        splice: bool,
        id: usize,
        at_seed: bool,
    },
    Amp {
        p1: Arc<RegexOp>,
        preds: Vec<Arc<Spec>>,
    },
}

fn sym_key(k: &str) -> Value {
    Value::Symbol(QualifiedName::local(k.to_string()))
}

fn build_ordered(terms: &[(Option<String>, Value)]) -> Value {
    if terms.iter().all(|(k, _)| k.is_some()) && !terms.is_empty() {
        let mut m = OrderedMap::new();
        for (k, v) in terms {
            m.insert(sym_key(k.as_deref().unwrap()), v.clone());
        }
        Value::Map(m)
    } else {
        Value::Seq(terms.iter().map(|(_, v)| v.clone()).collect())
    }
}

/// Union two or more already-computed derivative branches. `deriv`'s
/// `Pcat`/`Rep` cases each produce up to two candidate continuations
/// ("stay on this term" vs "advance past it"); this is the binary union
/// that combines them, represented internally as an ordinary (unkeyed,
/// untracked) `Alt`.
fn merge_branches(mut branches: Vec<RegexOp>) -> Option<RegexOp> {
    match branches.len() {
        0 => None,
        1 => branches.pop(),
        _ => Some(RegexOp::Alt {
            id: TRANSIENT_ID,
            preds: branches.into_iter().map(|b| (None, Arc::new(b))).collect(),
        }),
    }
}

pub fn accept_nil(op: &RegexOp) -> bool {
    match op {
        RegexOp::Accept(_) => true,
        RegexOp::Pred(_) => false,
        RegexOp::Pcat { remaining, .. } => remaining.iter().all(|(_, p)| accept_nil(p)),
        RegexOp::Alt { preds, .. } => preds.iter().any(|(_, p)| accept_nil(p)),
        RegexOp::Rep { p1, at_seed, .. } => *at_seed || accept_nil(p1),
        RegexOp::Amp { p1, preds } => {
            accept_nil(p1) && {
                let v = preturn(p1);
                preds.iter().all(|p| p.valid(&v))
            }
        }
    }
}

/// The value this node would yield if input ended right now. Only
/// meaningful when `accept_nil(op)` holds.
pub fn preturn(op: &RegexOp) -> Value {
    match op {
        RegexOp::Accept(v) => v.clone(),
        RegexOp::Pred(_) => Value::Nil,
        RegexOp::Pcat { done, remaining } => {
            let mut terms = done.clone();
            for (k, p) in remaining {
                terms.push((k.clone(), preturn(p)));
            }
            build_ordered(&terms)
        }
        RegexOp::Alt { preds, .. } => {
            for (k, p) in preds {
                if accept_nil(p) {
                    let v = preturn(p);
                    return match k {
                        Some(name) => Value::Seq(vec![sym_key(name), v]),
                        None => v,
                    };
                }
            }
            Value::Nil
        }
        RegexOp::Rep { p1, ret, splice, at_seed, .. } => {
            if *at_seed {
                Value::Seq(ret.clone())
            } else {
                let mut items = ret.clone();
                push_rep_item(&mut items, preturn(p1), *splice);
                Value::Seq(items)
            }
        }
        RegexOp::Amp { p1, .. } => preturn(p1),
    }
}

fn push_rep_item(items: &mut Vec<Value>, v: Value, splice: bool) {
    if splice {
        if let Value::Seq(inner) = v {
            items.extend(inner);
            return;
        }
    }
    items.push(v);
}

/// The regex accepting `L(op)`'s suffixes after consuming `x`. `None` is
/// the empty language — `x` cannot be consumed from this state at all.
pub fn deriv(op: &RegexOp, x: &Value) -> Option<RegexOp> {
    match op {
        RegexOp::Accept(_) => None,
        RegexOp::Pred(spec) => spec.conform(x).map(RegexOp::Accept),
        RegexOp::Pcat { done, remaining } => {
            let (first_key, first_op) = remaining.first()?;
            let rest = &remaining[1..];
            let mut branches = vec![];
            if let Some(d) = deriv(first_op, x) {
                let mut new_remaining = vec![(first_key.clone(), Arc::new(d))];
                new_remaining.extend_from_slice(rest);
                branches.push(RegexOp::Pcat {
                    done: done.clone(),
                    remaining: new_remaining,
                });
            }
            if accept_nil(first_op) {
                let mut new_done = done.clone();
                new_done.push((first_key.clone(), preturn(first_op)));
                let advanced = RegexOp::Pcat {
                    done: new_done,
                    remaining: rest.to_vec(),
                };
                if let Some(next) = deriv(&advanced, x) {
                    branches.push(next);
                }
            }
            merge_branches(branches)
        }
        RegexOp::Alt { id, preds } => {
            let derived: Vec<(Option<String>, Arc<RegexOp>)> = preds
                .iter()
                .filter_map(|(k, p)| deriv(p, x).map(|d| (k.clone(), Arc::new(d))))
                .collect();
            if derived.is_empty() {
                None
            } else {
                Some(RegexOp::Alt { id: *id, preds: derived })
            }
        }
        RegexOp::Rep { p1, p2, ret, splice, id, .. } => {
            let mut branches = vec![];
            if let Some(d1) = deriv(p1, x) {
                branches.push(RegexOp::Rep {
                    p1: Arc::new(d1),
                    p2: Arc::clone(p2),
                    ret: ret.clone(),
                    splice: *splice,
                    id: *id,
                    at_seed: false,
                });
            }
            if accept_nil(p1) {
                let mut new_ret = ret.clone();
                push_rep_item(&mut new_ret, preturn(p1), *splice);
                if let Some(d2) = deriv(p2, x) {
                    branches.push(RegexOp::Rep {
                        p1: Arc::new(d2),
                        p2: Arc::clone(p2),
                        ret: new_ret,
                        splice: *splice,
                        id: *id,
                        at_seed: false,
                    });
                }
            }
            merge_branches(branches)
        }
        RegexOp::Amp { p1, preds } => match deriv(p1, x)? {
            RegexOp::Accept(v) => {
                if preds.iter().all(|p| p.valid(&v)) {
                    Some(RegexOp::Accept(v))
                } else {
                    None
                }
            }
            other => Some(RegexOp::Amp {
                p1: Arc::new(other),
                preds: preds.clone(),
            }),
        },
    }
}

pub fn re_conform(mut op: RegexOp, xs: &[Value]) -> Option<Value> {
    for x in xs {
        op = deriv(&op, x)?;
    }
    accept_nil(&op).then(|| preturn(&op))
}

fn op_explain(
    path: &[Value],
    via: &[QualifiedName],
    in_: &[Value],
    op: &RegexOp,
    x: &Value,
    idx: usize,
) -> Vec<Problem> {
    match op {
        RegexOp::Pred(spec) => {
            let mut p = path.to_vec();
            p.push(Value::Int(idx as i64));
            let mut iv = in_.to_vec();
            iv.push(Value::Int(idx as i64));
            spec.explain(&p, via, &iv, x).unwrap_or_default()
        }
        RegexOp::Pcat { remaining, .. } => match remaining.first() {
            Some((_, first)) => op_explain(path, via, in_, first, x, idx),
            None => vec![extra_input(path, via, in_, x)],
        },
        RegexOp::Alt { preds, .. } => preds
            .iter()
            .flat_map(|(_, p)| op_explain(path, via, in_, p, x, idx))
            .collect(),
        RegexOp::Rep { p1, .. } => op_explain(path, via, in_, p1, x, idx),
        RegexOp::Amp { p1, .. } => op_explain(path, via, in_, p1, x, idx),
        RegexOp::Accept(_) => vec![extra_input(path, via, in_, x)],
    }
}

fn extra_input(path: &[Value], via: &[QualifiedName], in_: &[Value], x: &Value) -> Problem {
    Problem {
        path: path.to_vec(),
        pred: PredRef::Structural("Extra input"),
        val: x.clone(),
        reason: None,
        via: via.to_vec(),
        in_: in_.to_vec(),
    }
}

pub fn re_explain(
    path: &[Value],
    via: &[QualifiedName],
    in_: &[Value],
    op: RegexOp,
    xs: &[Value],
) -> Vec<Problem> {
    let mut cur = op;
    for (i, x) in xs.iter().enumerate() {
        if matches!(cur, RegexOp::Accept(_)) {
            return vec![extra_input(path, via, in_, x)];
        }
        match deriv(&cur, x) {
            Some(next) => cur = next,
            None => return op_explain(path, via, in_, &cur, x, i),
        }
    }
    if accept_nil(&cur) {
        vec![]
    } else {
        vec![Problem {
            path: path.to_vec(),
            pred: PredRef::Structural("Insufficient input"),
            val: Value::Nil,
            reason: None,
            via: via.to_vec(),
            in_: in_.to_vec(),
        }]
    }
}

/// The per-`Rand`-call raw-element producer a node generates into its
/// enclosing sequence. Kept distinct from [`Gen`] (which yields one
/// [`Value`]) because a regex node generates a *run* of raw elements,
/// not a single conformed value — `Pcat` concatenates its children's
/// runs, `Rep` repeats one, and so on.
type ElemGen = Arc<dyn Fn(&mut dyn Rand) -> Vec<Value> + Send + Sync>;

fn elem_gen(op: &RegexOp, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<ElemGen> {
    match op {
        RegexOp::Accept(_) => Some(Arc::new(|_: &mut dyn Rand| vec![])),
        RegexOp::Pred(spec) => {
            let g = spec.gen(overrides, path, rmap)?;
            Some(Arc::new(move |r: &mut dyn Rand| vec![g(r)]))
        }
        RegexOp::Pcat { remaining, .. } => {
            let mut child_gens = Vec::with_capacity(remaining.len());
            for (i, (k, p)) in remaining.iter().enumerate() {
                let mut child_path = path.to_vec();
                child_path.push(k.clone().unwrap_or_else(|| i.to_string()));
                child_gens.push(elem_gen(p, overrides, &child_path, rmap)?);
            }
            Some(Arc::new(move |r: &mut dyn Rand| {
                child_gens.iter().flat_map(|g| g(r)).collect()
            }))
        }
        RegexOp::Alt { id, preds } => {
            if rmap.count(*id) >= crate::config::recursion_limit() {
                return None;
            }
            let next_rmap = rmap.entered(*id);
            let gens: Vec<ElemGen> = preds
                .iter()
                .filter_map(|(_, p)| elem_gen(p, overrides, path, &next_rmap))
                .collect();
            if gens.is_empty() {
                return None;
            }
            Some(Arc::new(move |r: &mut dyn Rand| {
                let i = r.range(0, gens.len() as i64 - 1) as usize;
                gens[i](r)
            }))
        }
        RegexOp::Rep { p2, splice, id, .. } => {
            if rmap.count(*id) >= crate::config::recursion_limit() {
                return Some(Arc::new(|_: &mut dyn Rand| vec![]));
            }
            let next_rmap = rmap.entered(*id);
            let body = elem_gen(p2, overrides, path, &next_rmap)?;
            let max = crate::config::DEFAULT_GEN_MAX;
            let splice = *splice;
            Some(Arc::new(move |r: &mut dyn Rand| {
                let n = r.sized(max);
                let mut items = vec![];
                for _ in 0..n {
                    let chunk = body(r);
                    if splice {
                        items.extend(chunk);
                    } else if chunk.len() == 1 {
                        items.push(chunk.into_iter().next().unwrap());
                    } else {
                        items.push(Value::Seq(chunk));
                    }
                }
                items
            }))
        }
        RegexOp::Amp { p1, preds } => {
            let body = elem_gen(p1, overrides, path, rmap)?;
            let check_op = (**p1).clone();
            let preds = preds.clone();
            let iterations = crate::config::fspec_iterations();
            Some(Arc::new(move |r: &mut dyn Rand| {
                for _ in 0..iterations {
                    let elems = body(r);
                    if let Some(v) = re_conform(check_op.clone(), &elems) {
                        if preds.iter().all(|p| p.valid(&v)) {
                            return elems;
                        }
                    }
                }
                body(r)
            }))
        }
    }
}

/// Destructure a conformed value back to front, inverting each leaf via
/// its own spec. Covers the shapes the public constructors below ever
/// produce (flat `cat`, single-branch `alt`, homogeneous `rep`); a regex
/// built by splicing raw `RegexOp`s together more exotically than these
/// constructors do is out of scope, same as this crate's other
/// narrowly-scoped `unform` corners.
fn op_unform(op: &RegexOp, v: &Value) -> Value {
    match op {
        RegexOp::Accept(_) => v.clone(),
        RegexOp::Pred(spec) => spec.unform(v),
        RegexOp::Pcat { remaining, .. } => {
            let keyed = !remaining.is_empty() && remaining.iter().all(|(k, _)| k.is_some());
            let items: Vec<Value> = if keyed {
                match v {
                    Value::Map(m) => remaining
                        .iter()
                        .map(|(k, _)| {
                            m.get(&sym_key(k.as_deref().unwrap())).cloned().unwrap_or(Value::Nil)
                        })
                        .collect(),
                    _ => return v.clone(),
                }
            } else {
                match v {
                    Value::Seq(s) => s.clone(),
                    _ => return v.clone(),
                }
            };
            let unformed: Vec<Value> = remaining
                .iter()
                .zip(items.iter())
                .map(|((_, p), item)| op_unform(p, item))
                .collect();
            Value::Seq(unformed)
        }
        RegexOp::Alt { preds, .. } => {
            if let Value::Seq(items) = v {
                if items.len() == 2 {
                    if let Value::Symbol(sym) = &items[0] {
                        if let Some((_, p)) =
                            preds.iter().find(|(k, _)| k.as_deref() == Some(sym.local.as_str()))
                        {
                            return op_unform(p, &items[1]);
                        }
                    }
                }
            }
            preds.first().map(|(_, p)| op_unform(p, v)).unwrap_or_else(|| v.clone())
        }
        RegexOp::Rep { p2, .. } => match v {
            Value::Seq(items) => Value::Seq(items.iter().map(|i| op_unform(p2, i)).collect()),
            _ => v.clone(),
        },
        RegexOp::Amp { p1, .. } => op_unform(p1, v),
    }
}

/// Wraps a [`RegexOp`] to act as an ordinary [`Spec`] at a sequence
/// boundary (spec.md §4.7).
pub struct RegexSpec {
    pub op: RegexOp,
}

impl RegexSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        let xs = v.as_seq()?;
        re_conform(self.op.clone(), xs)
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        op_unform(&self.op, v)
    }

    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        let Some(xs) = v.as_seq() else {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("expected a sequence".into()),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        };
        re_explain(path, via, in_, self.op.clone(), xs)
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        let eg = elem_gen(&self.op, overrides, path, rmap)?;
        Some(crate::gen::gen_fn(move |r| Value::Seq(eg(r))))
    }
}

fn wrap_term(spec: Spec) -> Arc<RegexOp> {
    Arc::new(RegexOp::Pred(Arc::new(spec)))
}

/// `cat(k1:p1, …)` — ordered concatenation into a keyed mapping
/// (spec.md §4.7).
pub fn cat(terms: Vec<(&str, Spec)>) -> Spec {
    let remaining = terms
        .into_iter()
        .map(|(k, s)| (Some(k.to_string()), wrap_term(s)))
        .collect();
    Spec::new(SpecKind::Regex(RegexSpec {
        op: RegexOp::Pcat { done: vec![], remaining },
    }))
}

/// `alt(k1:p1, …)` — first-match alternation (spec.md §4.7.3).
pub fn alt(branches: Vec<(&str, Spec)>) -> Spec {
    let preds = branches
        .into_iter()
        .map(|(k, s)| (Some(k.to_string()), wrap_term(s)))
        .collect();
    Spec::new(SpecKind::Regex(RegexSpec {
        op: RegexOp::Alt { id: next_id(), preds },
    }))
}

fn rep_op(pred: Spec, splice: bool) -> RegexOp {
    let body = wrap_term(pred);
    RegexOp::Rep {
        p1: Arc::clone(&body),
        p2: body,
        ret: vec![],
        splice,
        id: next_id(),
        at_seed: true,
    }
}

/// `zero_or_more(p)`.
pub fn zero_or_more(pred: Spec) -> Spec {
    Spec::new(SpecKind::Regex(RegexSpec { op: rep_op(pred, false) }))
}

/// `one_or_more(p)`, implemented as `constrained(zero_or_more(p), non_empty)`
/// — the engine's own use of `Amp` (spec.md §4.7.1).
pub fn one_or_more(pred: Spec) -> Spec {
    let rep = rep_op(pred, false);
    let non_empty: Arc<Spec> = Arc::new(crate::scalar::predicate(
        crate::scalar::PredicateKind::Fn(Arc::new(|v: &Value| matches!(v, Value::Seq(s) if !s.is_empty()))),
    ));
    Spec::new(SpecKind::Regex(RegexSpec {
        op: RegexOp::Amp {
            p1: Arc::new(rep),
            preds: vec![non_empty],
        },
    }))
}

/// `zero_or_one(p)` — accepts zero elements or exactly one matching `p`.
pub fn zero_or_one(pred: Spec) -> Spec {
    let preds = vec![
        (None, wrap_term(pred)),
        (None, Arc::new(RegexOp::Accept(Value::Nil))),
    ];
    Spec::new(SpecKind::Regex(RegexSpec {
        op: RegexOp::Alt { id: next_id(), preds },
    }))
}

/// `constrained(r, …preds)` (`amp`) — matches `r`'s grammar, then applies
/// the conjunction of `preds` to the resulting value (spec.md §4.7.1).
/// `r` must itself be built from `cat`/`alt`/`zero_or_more`/etc.; a plain
/// value-spec is treated as a one-element grammar.
pub fn constrained(r: Spec, preds: Vec<Spec>) -> Spec {
    let p1 = match r.kind {
        SpecKind::Regex(rs) => Arc::new(rs.op),
        other => Arc::new(RegexOp::Pred(Arc::new(Spec::new(other)))),
    };
    Spec::new(SpecKind::Regex(RegexSpec {
        op: RegexOp::Amp {
            p1,
            preds: preds.into_iter().map(Arc::new).collect(),
        },
    }))
}

impl fmt::Debug for RegexOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegexOp::Accept(v) => write!(f, "Accept({v})"),
            RegexOp::Pred(_) => write!(f, "Pred(..)"),
            RegexOp::Pcat { remaining, .. } => write!(f, "Pcat({} remaining)", remaining.len()),
            RegexOp::Alt { preds, .. } => write!(f, "Alt({} branches)", preds.len()),
            RegexOp::Rep { .. } => write!(f, "Rep"),
            RegexOp::Amp { .. } => write!(f, "Amp"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{predicate, PredicateKind, TypeTag};
    use pretty_assertions::assert_eq;

    fn qn_local(s: &str) -> Value {
        Value::Symbol(QualifiedName::local(s))
    }

    #[test]
    fn cat_conforms_to_keyed_map() {
        let s = cat(vec![
            ("qty", predicate(PredicateKind::Type(TypeTag::Numeric))),
            ("unit", predicate(PredicateKind::Type(TypeTag::String))),
        ]);
        let v = Value::Seq(vec![Value::Int(2), Value::from("teaspoon")]);
        let conformed = s.conform(&v).unwrap();
        let mut expected = OrderedMap::new();
        expected.insert(qn_local("qty"), Value::Int(2));
        expected.insert(qn_local("unit"), Value::from("teaspoon"));
        assert_eq!(conformed, Value::Map(expected));
    }

    #[test]
    fn cat_reports_problem_at_failing_element() {
        let s = cat(vec![
            ("qty", predicate(PredicateKind::Type(TypeTag::Numeric))),
            ("unit", predicate(PredicateKind::Type(TypeTag::Symbol))),
        ]);
        let v = Value::Seq(vec![Value::Int(2), Value::from("teaspoon")]);
        assert_eq!(s.conform(&v), None);
        let problems = s.explain(&[], &[], &[], &v).unwrap();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].path, vec![Value::Int(1)]);
        assert_eq!(problems[0].val, Value::from("teaspoon"));
    }

    #[test]
    fn zero_or_more_matches_any_length_including_zero() {
        let s = zero_or_more(predicate(PredicateKind::Type(TypeTag::Int)));
        assert_eq!(s.conform(&Value::Seq(vec![])), Some(Value::Seq(vec![])));
        assert_eq!(
            s.conform(&Value::Seq(vec![Value::Int(1), Value::Int(2)])),
            Some(Value::Seq(vec![Value::Int(1), Value::Int(2)]))
        );
        assert_eq!(s.conform(&Value::Seq(vec![Value::from("x")])), None);
    }

    #[test]
    fn one_or_more_rejects_empty() {
        let s = one_or_more(predicate(PredicateKind::Type(TypeTag::Int)));
        assert_eq!(s.conform(&Value::Seq(vec![])), None);
        assert_eq!(
            s.conform(&Value::Seq(vec![Value::Int(1)])),
            Some(Value::Seq(vec![Value::Int(1)]))
        );
    }

    #[test]
    fn zero_or_one_accepts_absent_or_single() {
        let s = zero_or_one(predicate(PredicateKind::Type(TypeTag::Int)));
        assert_eq!(s.conform(&Value::Seq(vec![])), Some(Value::Nil));
        assert_eq!(s.conform(&Value::Seq(vec![Value::Int(7)])), Some(Value::Int(7)));
        assert_eq!(s.conform(&Value::Seq(vec![Value::Int(1), Value::Int(2)])), None);
    }

    #[test]
    fn nested_cat_reported_via_extra_and_insufficient_input() {
        let s = cat(vec![("n", predicate(PredicateKind::Type(TypeTag::Int)))]);
        let too_many = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        let problems = s.explain(&[], &[], &[], &too_many).unwrap();
        assert!(matches!(&problems[0].pred, PredRef::Structural("Extra input")));

        let too_few = Value::Seq(vec![]);
        let problems = s.explain(&[], &[], &[], &too_few).unwrap();
        assert!(matches!(&problems[0].pred, PredRef::Structural("Insufficient input")));
    }
}
