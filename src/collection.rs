//! L3 — collection specs: `every`/`coll_of`/`map_of`/`hash_of` (spec.md
//! §4.5).

use std::sync::Arc;

use crate::core::{PredRef, Problem, Spec, SpecKind};
use crate::gen::{Gen, Overrides, RMap};
use crate::scalar::{predicate, PredicateKind, TypeTag};
use crate::value::{OrderedMap, QualifiedName, Value};

/// What kind of container `into`/`coll_of` rebuilds (spec.md §4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntoKind {
    Seq,
    Map,
    Set,
}

#[derive(Clone)]
pub struct EveryOptions {
    pub kind: Option<Arc<Spec>>,
    pub count: Option<usize>,
    pub min_count: Option<usize>,
    pub max_count: Option<usize>,
    pub distinct: bool,
    pub into: IntoKind,
    pub gen_max: usize,
    pub gen: Option<Gen>,
}

impl Default for EveryOptions {
    fn default() -> Self {
        Self {
            kind: None,
            count: None,
            min_count: None,
            max_count: None,
            distinct: false,
            into: IntoKind::Seq,
            gen_max: crate::config::DEFAULT_GEN_MAX,
            gen: None,
        }
    }
}

pub struct EverySpec {
    pub pred: Arc<Spec>,
    pub options: EveryOptions,
    /// `true` for `coll_of`/`map_of`/`hash_of` (exhaustive, rebuilding);
    /// `false` for `every` (sampling, pass-through).
    pub conform_all: bool,
}

impl EverySpec {
    fn count_ok(&self, n: usize) -> bool {
        if let Some(c) = self.options.count {
            if n != c {
                return false;
            }
        }
        if let Some(min) = self.options.min_count {
            if n < min {
                return false;
            }
        }
        if let Some(max) = self.options.max_count {
            if n > max {
                return false;
            }
        }
        true
    }

    fn distinct_ok(&self, items: &[Value]) -> bool {
        if !self.options.distinct {
            return true;
        }
        for (i, a) in items.iter().enumerate() {
            for b in &items[i + 1..] {
                if a == b {
                    return false;
                }
            }
        }
        true
    }

    fn kind_ok(&self, v: &Value) -> bool {
        self.options.kind.as_ref().is_none_or(|k| k.valid(v))
    }

    fn items_of(v: &Value) -> Option<Vec<Value>> {
        match v {
            Value::Seq(items) => Some(items.clone()),
            Value::Map(m) => Some(m.iter().map(|(k, v)| Value::Seq(vec![k.clone(), v.clone()])).collect()),
            _ => None,
        }
    }

    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        if !self.kind_ok(v) {
            return None;
        }
        let items = Self::items_of(v)?;
        if !self.count_ok(items.len()) || !self.distinct_ok(&items) {
            return None;
        }

        if !self.conform_all {
            // Sampling mode: check at most coll_check_limit elements,
            // never rebuild the container (spec.md §4.5).
            let limit = crate::config::coll_check_limit();
            return items
                .iter()
                .take(limit)
                .all(|item| self.pred.valid(item))
                .then(|| v.clone());
        }

        let mut conformed = Vec::with_capacity(items.len());
        for item in &items {
            conformed.push(self.pred.conform(item)?);
        }
        Some(self.rebuild(conformed))
    }

    fn rebuild(&self, conformed: Vec<Value>) -> Value {
        match self.options.into {
            IntoKind::Seq | IntoKind::Set => Value::Seq(conformed),
            IntoKind::Map => {
                let mut m = OrderedMap::new();
                for item in conformed {
                    if let Value::Seq(pair) = item {
                        if pair.len() == 2 {
                            m.insert(pair[0].clone(), pair[1].clone());
                            continue;
                        }
                    }
                }
                Value::Map(m)
            }
        }
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        if !self.conform_all {
            return v.clone();
        }
        match v {
            Value::Seq(items) => Value::Seq(items.iter().map(|i| self.pred.unform(i)).collect()),
            Value::Map(m) => Value::Map(
                m.iter()
                    .map(|(k, val)| {
                        let pair = self.pred.unform(&Value::Seq(vec![k.clone(), val.clone()]));
                        match pair {
                            Value::Seq(p) if p.len() == 2 => (p[0].clone(), p[1].clone()),
                            _ => (k.clone(), val.clone()),
                        }
                    })
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
        if !self.kind_ok(v) {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("wrong container kind".into()),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        }
        let Some(items) = Self::items_of(v) else {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("expected a collection".into()),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        };
        if !self.count_ok(items.len()) {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("element count out of range".into()),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        }
        if !self.distinct_ok(&items) {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("elements must be distinct".into()),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        }
        let limit = if self.conform_all {
            items.len()
        } else {
            crate::config::coll_check_limit()
        };
        let error_limit = crate::config::coll_error_limit();
        let mut problems = vec![];
        for (i, item) in items.iter().take(limit).enumerate() {
            if self.pred.conform(item).is_none() {
                let mut p = path.to_vec();
                p.push(Value::Int(i as i64));
                let mut iv = in_.to_vec();
                iv.push(Value::Int(i as i64));
                problems.extend(self.pred.explain(&p, via, &iv, item).unwrap_or_default());
                if problems.len() >= error_limit {
                    break;
                }
            }
        }
        problems
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        if let Some(g) = &self.options.gen {
            return Some(Arc::clone(g));
        }
        let elem = self.pred.gen(overrides, path, rmap)?;
        let max = self.options.min_count.unwrap_or(0).max(
            self.options
                .count
                .unwrap_or(self.options.max_count.unwrap_or(self.options.gen_max).min(self.options.gen_max)),
        );
        let into = self.options.into;
        let min = self.options.min_count.unwrap_or(0);
        Some(crate::gen::gen_fn(move |r| {
            let span = max.saturating_sub(min);
            let extra = r.sized(span);
            let items: Vec<Value> = (0..min + extra).map(|_| elem(r)).collect();
            match into {
                IntoKind::Seq | IntoKind::Set => Value::Seq(items),
                IntoKind::Map => {
                    let mut m = OrderedMap::new();
                    for it in items {
                        if let Value::Seq(pair) = it {
                            if pair.len() == 2 {
                                m.insert(pair[0].clone(), pair[1].clone());
                            }
                        }
                    }
                    Value::Map(m)
                }
            }
        }))
    }
}

/// `every(pred, options)` — sampling membership check (spec.md §4.5).
pub fn every(pred: Spec, options: EveryOptions) -> Spec {
    Spec::new(SpecKind::Every(EverySpec {
        pred: Arc::new(pred),
        options,
        conform_all: false,
    }))
}

/// `coll_of(pred, options)` — exhaustive, rebuilding conform.
pub fn coll_of(pred: Spec, options: EveryOptions) -> Spec {
    Spec::new(SpecKind::Every(EverySpec {
        pred: Arc::new(pred),
        options,
        conform_all: true,
    }))
}

/// `map_of(key_pred, val_pred, options)` reduces to `every` over 2-tuples
/// with an associative `kind` (spec.md §4.5).
pub fn map_of(key_pred: Spec, val_pred: Spec, mut options: EveryOptions) -> Spec {
    options.into = IntoKind::Map;
    options.kind = Some(Arc::new(predicate(PredicateKind::Type(TypeTag::Map))));
    let pair = crate::scalar::tuple(vec![key_pred, val_pred]);
    coll_of(pair, options)
}

/// `hash_of` is `map_of` under a name that makes the associative-kind
/// requirement explicit at call sites; semantically identical.
pub fn hash_of(key_pred: Spec, val_pred: Spec, options: EveryOptions) -> Spec {
    map_of(key_pred, val_pred, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::{predicate, PredicateKind, TypeTag};
    use pretty_assertions::assert_eq;

    #[test]
    fn every_samples_and_does_not_rebuild() {
        let s = every(predicate(PredicateKind::Type(TypeTag::Int)), EveryOptions::default());
        let v = Value::Seq(vec![Value::Int(1), Value::Int(2), Value::Int(3)]);
        assert_eq!(s.conform(&v), Some(v.clone()));
    }

    #[test]
    fn coll_of_is_exhaustive() {
        let s = coll_of(predicate(PredicateKind::Type(TypeTag::Int)), EveryOptions::default());
        let bad = Value::Seq(vec![Value::Int(1), Value::from("nope"), Value::Int(3)]);
        assert_eq!(s.conform(&bad), None);
        let good = Value::Seq(vec![Value::Int(1), Value::Int(2)]);
        assert_eq!(s.conform(&good), Some(good));
    }

    #[test]
    fn count_and_distinct_options() {
        let mut opts = EveryOptions {
            distinct: true,
            ..Default::default()
        };
        opts.min_count = Some(2);
        opts.max_count = Some(4);
        let s = every(predicate(PredicateKind::Any), opts);
        assert_eq!(s.conform(&Value::Seq(vec![Value::Int(1)])), None);
        assert_eq!(
            s.conform(&Value::Seq(vec![Value::Int(1), Value::Int(1)])),
            None
        );
        assert_eq!(
            s.conform(&Value::Seq(vec![Value::Int(1), Value::Int(2)])),
            Some(Value::Seq(vec![Value::Int(1), Value::Int(2)]))
        );
    }
}
