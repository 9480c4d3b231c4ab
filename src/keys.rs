//! L4 — the keys spec: required/optional qualified and unqualified keys,
//! `and_keys`/`or_keys` presence expressions, and `merge` (spec.md §4.6).

use std::fmt;
use std::sync::Arc;

use crate::core::{PredRef, Problem, Spec, SpecKind};
use crate::gen::{Gen, Overrides, RMap};
use crate::registry;
use crate::value::{OrderedMap, QualifiedName, Value};

/// A key-presence requirement tree (spec.md §4.6, §9 "Key expressions").
/// Leaves are qualified names; interior nodes are logical AND/OR. Kept
/// in problems verbatim so the formatter can print the whole expression
/// a reader failed, not just the leaf (spec.md §4.6 "`or` reported as a
/// single problem citing the whole expression").
#[derive(Debug, Clone, PartialEq)]
pub enum KeyExpr {
    Leaf(QualifiedName),
    And(Vec<KeyExpr>),
    Or(Vec<KeyExpr>),
}

impl fmt::Display for KeyExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyExpr::Leaf(n) => write!(f, "{n}"),
            KeyExpr::And(es) => {
                write!(f, "(and")?;
                for e in es {
                    write!(f, " {e}")?;
                }
                write!(f, ")")
            }
            KeyExpr::Or(es) => {
                write!(f, "(or")?;
                for e in es {
                    write!(f, " {e}")?;
                }
                write!(f, ")")
            }
        }
    }
}

pub fn and_keys(exprs: Vec<KeyExpr>) -> KeyExpr {
    KeyExpr::And(exprs)
}

pub fn or_keys(exprs: Vec<KeyExpr>) -> KeyExpr {
    KeyExpr::Or(exprs)
}

impl KeyExpr {
    /// Every qualified name this expression mentions.
    pub fn leaves(&self) -> Vec<&QualifiedName> {
        match self {
            KeyExpr::Leaf(n) => vec![n],
            KeyExpr::And(es) | KeyExpr::Or(es) => es.iter().flat_map(|e| e.leaves()).collect(),
        }
    }

    /// Does `present` (a presence test over either full-qualified or
    /// local-only names, per `unqualified` mode) satisfy this
    /// expression?
    fn satisfied(&self, present: &dyn Fn(&QualifiedName) -> bool) -> bool {
        match self {
            KeyExpr::Leaf(n) => present(n),
            KeyExpr::And(es) => es.iter().all(|e| e.satisfied(present)),
            KeyExpr::Or(es) => es.iter().any(|e| e.satisfied(present)),
        }
    }

    /// One problem per unsatisfied leaf for `and` (flattened to the
    /// first missing child would under-report — spec.md says "first
    /// missing child" for `and`, meaning `and`'s own failure is reported
    /// once per violated leaf, not once for the whole node), and a
    /// single whole-expression problem for `or` when no branch is
    /// satisfied (spec.md §4.6).
    fn missing(&self, present: &dyn Fn(&QualifiedName) -> bool) -> Vec<KeyExpr> {
        match self {
            KeyExpr::Leaf(n) => {
                if present(n) {
                    vec![]
                } else {
                    vec![self.clone()]
                }
            }
            KeyExpr::And(es) => es.iter().flat_map(|e| e.missing(present)).collect(),
            KeyExpr::Or(_) => {
                if self.satisfied(present) {
                    vec![]
                } else {
                    vec![self.clone()]
                }
            }
        }
    }
}

pub struct KeysSpec {
    pub req: Vec<KeyExpr>,
    pub opt: Vec<KeyExpr>,
    pub req_un: Vec<KeyExpr>,
    pub opt_un: Vec<KeyExpr>,
}

impl KeysSpec {
    fn present_keys(v: &Value) -> Option<Vec<QualifiedName>> {
        let m = v.as_map()?;
        Some(
            m.iter()
                .filter_map(|(k, _)| match k {
                    Value::Symbol(n) => Some(n.clone()),
                    _ => None,
                })
                .collect(),
        )
    }

    fn qualified_present(keys: &[QualifiedName]) -> impl Fn(&QualifiedName) -> bool + '_ {
        move |n: &QualifiedName| keys.contains(n)
    }

    fn unqualified_present(keys: &[QualifiedName]) -> impl Fn(&QualifiedName) -> bool + '_ {
        move |n: &QualifiedName| keys.iter().any(|k| k.local == n.local)
    }

    fn all_missing(&self, keys: &[QualifiedName]) -> Vec<KeyExpr> {
        let qpresent = Self::qualified_present(keys);
        let upresent = Self::unqualified_present(keys);
        let mut missing = vec![];
        for e in &self.req {
            missing.extend(e.missing(&qpresent));
        }
        for e in &self.req_un {
            missing.extend(e.missing(&upresent));
        }
        missing
    }

    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        let keys = Self::present_keys(v)?;
        if !self.all_missing(&keys).is_empty() {
            return None;
        }
        let m = v.as_map()?;
        let mut out = OrderedMap::new();
        for (k, val) in m.iter() {
            out.insert(k.clone(), val.clone());
            let Value::Symbol(name) = k else { continue };
            if name.is_qualified() {
                if let Some(spec) = registry::get(name) {
                    let conformed = spec.conform(val)?;
                    out.insert(k.clone(), conformed);
                }
            }
        }
        Some(Value::Map(out))
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        let Some(m) = v.as_map() else { return v.clone() };
        let mut out = OrderedMap::new();
        for (k, val) in m.iter() {
            let unformed = if let Value::Symbol(name) = k {
                if name.is_qualified() {
                    registry::get(name).map(|s| s.unform(val)).unwrap_or_else(|| val.clone())
                } else {
                    val.clone()
                }
            } else {
                val.clone()
            };
            out.insert(k.clone(), unformed);
        }
        Value::Map(out)
    }

    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        let Some(keys) = Self::present_keys(v) else {
            return vec![Problem {
                path: path.to_vec(),
                pred: PredRef::Message("expected a mapping".into()),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            }];
        };
        let mut problems: Vec<Problem> = self
            .all_missing(&keys)
            .into_iter()
            .map(|expr| Problem {
                path: path.to_vec(),
                pred: PredRef::KeyPresence(expr),
                val: v.clone(),
                reason: None,
                via: via.to_vec(),
                in_: in_.to_vec(),
            })
            .collect();

        if let Some(m) = v.as_map() {
            for (k, val) in m.iter() {
                let Value::Symbol(name) = k else { continue };
                if !name.is_qualified() {
                    continue;
                }
                let Some(spec) = registry::get(name) else { continue };
                if spec.conform(val).is_none() {
                    let mut p = path.to_vec();
                    p.push(k.clone());
                    let mut iv = in_.to_vec();
                    iv.push(k.clone());
                    problems.extend(spec.explain(&p, via, &iv, val).unwrap_or_default());
                }
            }
        }
        problems
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        let mut required = vec![];
        for e in &self.req {
            required.extend(e.leaves().into_iter().cloned());
        }
        for e in &self.req_un {
            required.extend(e.leaves().into_iter().cloned());
        }
        let mut entries: Vec<(QualifiedName, Gen)> = vec![];
        for name in &required {
            let spec = registry::get(name)?;
            let mut p = path.to_vec();
            p.push(name.to_string());
            entries.push((name.clone(), spec.gen(overrides, &p, rmap)?));
        }
        Some(crate::gen::gen_fn(move |r| {
            let mut m = OrderedMap::new();
            for (name, g) in &entries {
                m.insert(Value::Symbol(name.clone()), g(r));
            }
            Value::Map(m)
        }))
    }
}

pub fn keys(req: Vec<KeyExpr>, opt: Vec<KeyExpr>, req_un: Vec<KeyExpr>, opt_un: Vec<KeyExpr>) -> Spec {
    Spec::new(SpecKind::Keys(KeysSpec {
        req,
        opt,
        req_un,
        opt_un,
    }))
}

pub struct MergeSpec {
    pub specs: Vec<Arc<Spec>>,
}

impl MergeSpec {
    pub(crate) fn conform(&self, v: &Value) -> Option<Value> {
        let mut out = OrderedMap::new();
        for s in &self.specs {
            let conformed = s.conform(v)?;
            if let Value::Map(m) = conformed {
                for (k, val) in m.iter() {
                    out.insert(k.clone(), val.clone());
                }
            }
        }
        Some(Value::Map(out))
    }

    pub(crate) fn unform(&self, v: &Value) -> Value {
        v.clone()
    }

    /// Deliberately does not deduplicate: a bad key is reported once per
    /// component that mentions it (spec.md §9 "`merge` double-reporting"
    /// — preserved verbatim, not "fixed").
    pub(crate) fn explain(
        &self,
        path: &[Value],
        via: &[QualifiedName],
        in_: &[Value],
        v: &Value,
    ) -> Vec<Problem> {
        self.specs
            .iter()
            .flat_map(|s| s.explain(path, via, in_, v).unwrap_or_default())
            .collect()
    }

    pub(crate) fn gen(&self, overrides: &Overrides, path: &[String], rmap: &RMap) -> Option<Gen> {
        let gens: Vec<Gen> = self
            .specs
            .iter()
            .map(|s| s.gen(overrides, path, rmap))
            .collect::<Option<_>>()?;
        Some(crate::gen::gen_fn(move |r| {
            let mut out = OrderedMap::new();
            for g in &gens {
                if let Value::Map(m) = g(r) {
                    for (k, v) in m.iter() {
                        out.insert(k.clone(), v.clone());
                    }
                }
            }
            Value::Map(out)
        }))
    }
}

pub fn merge(specs: Vec<Spec>) -> Spec {
    Spec::new(SpecKind::Merge(MergeSpec {
        specs: specs.into_iter().map(Arc::new).collect(),
    }))
}
