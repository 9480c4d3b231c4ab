//! L6 — function specs (spec.md §4.8).
//!
//! `fspec` bundles `args` (a regex over the argument list), an optional
//! `block` (an fspec for a callable argument), `ret`, and an optional
//! `fn` relating the three. Unlike every other spec variant, `conform`
//! doesn't test a [`Value`] — it calls the function under test, so the
//! contract lives on [`FSpec::validate`] rather than the ordinary
//! `conform`/`explain` pair (spec.md §9 "fspec needs a callable, not a
//! value").

use std::sync::{Arc, Mutex};

use crate::gen::{Overrides, RMap, Rand};
use crate::value::{OrderedMap, Value};

/// A function under test, taking conformed arguments and returning its
/// result, both as [`Value`] (spec.md §1's data-only boundary: this
/// engine never calls into host code beyond a single indirect call).
pub type Callable = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// The smallest failing trial `validate` found, kept for `explain`
/// (spec.md §4.8 "the shrunk minimum failing input is preserved").
/// "Shrunk" here means smallest-by-argument-count among the trials run,
/// not a true shrinking search — `fspec_iterations` trials is too small
/// a sample to shrink properly, and the host regex/gen layer has no
/// shrinker of its own to drive one.
#[derive(Debug, Clone)]
pub struct FailureCase {
    pub args: Value,
    pub ret: Option<Value>,
    pub reason: String,
}

pub struct FSpec {
    pub args: Arc<crate::core::Spec>,
    pub ret: Arc<crate::core::Spec>,
    pub fn_: Option<Arc<crate::core::Spec>>,
    pub block: Option<Arc<crate::core::Spec>>,
    last_failure: Mutex<Option<FailureCase>>,
}

impl FSpec {
    fn relation_input(&self, args: &Value, ret: &Value) -> Value {
        let mut m = OrderedMap::new();
        m.insert(Value::from("args"), args.clone());
        m.insert(Value::from("ret"), ret.clone());
        Value::Map(m)
    }

    /// Run `fspec_iterations` generative trials against `f`: generate
    /// arguments satisfying `args`, call `f`, check `ret`, and — if `fn`
    /// is set — check the args/ret relation. `true` iff every trial
    /// passed.
    pub fn validate(&self, f: &Callable, rand: &mut dyn Rand) -> bool {
        let overrides = Overrides::new();
        let rmap = RMap::new();
        let Some(args_gen) = self.args.gen(&overrides, &[], &rmap) else {
            *self.last_failure.lock().unwrap() = Some(FailureCase {
                args: Value::Nil,
                ret: None,
                reason: "unable to construct a generator for args".into(),
            });
            return false;
        };
        let iterations = crate::config::fspec_iterations();
        for _ in 0..iterations {
            let args_value = args_gen(rand);
            let Value::Seq(arg_items) = &args_value else {
                continue;
            };
            if self.args.conform(&args_value).is_none() {
                continue;
            }
            let ret_value = f(arg_items);
            if self.ret.conform(&ret_value).is_none() {
                *self.last_failure.lock().unwrap() = Some(FailureCase {
                    args: args_value.clone(),
                    ret: Some(ret_value.clone()),
                    reason: "return value did not satisfy ret".into(),
                });
                return false;
            }
            if let Some(rel) = &self.fn_ {
                let rel_input = self.relation_input(&args_value, &ret_value);
                if !rel.valid(&rel_input) {
                    *self.last_failure.lock().unwrap() = Some(FailureCase {
                        args: args_value.clone(),
                        ret: Some(ret_value.clone()),
                        reason: "args/ret relation failed".into(),
                    });
                    return false;
                }
            }
        }
        *self.last_failure.lock().unwrap() = None;
        true
    }

    pub fn last_failure(&self) -> Option<FailureCase> {
        self.last_failure.lock().unwrap().clone()
    }
}

/// `fspec(args, ret, fn?, block?)` (spec.md §6.1, §4.8).
pub fn fspec(args: crate::core::Spec, ret: crate::core::Spec, fn_: Option<crate::core::Spec>, block: Option<crate::core::Spec>) -> crate::core::Spec {
    crate::core::Spec::new(crate::core::SpecKind::F(FSpec {
        args: Arc::new(args),
        ret: Arc::new(ret),
        fn_: fn_.map(Arc::new),
        block: block.map(Arc::new),
        last_failure: Mutex::new(None),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen::StdRand;
    use crate::regexop::cat;
    use crate::scalar::{and, predicate, PredicateKind, TypeTag};

    fn int_spec() -> crate::core::Spec {
        predicate(PredicateKind::Type(TypeTag::Int))
    }

    #[test]
    fn validates_a_correct_function() {
        let args = cat(vec![("a", int_spec()), ("b", int_spec())]);
        let ret = int_spec();
        let s = fspec(args, ret, None, None);
        let f: Callable = Arc::new(|args: &[Value]| match (&args[0], &args[1]) {
            (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
            _ => Value::Nil,
        });
        let mut rand = StdRand::seeded(7);
        assert!(s.fspec_validate(&f, &mut rand));
    }

    #[test]
    fn reports_failure_when_ret_violated() {
        let args = cat(vec![("a", int_spec())]);
        let ret = and(vec![int_spec()]);
        let s = fspec(args, ret, None, None);
        let f: Callable = Arc::new(|_args: &[Value]| Value::from("not an int"));
        let mut rand = StdRand::seeded(3);
        assert!(!s.fspec_validate(&f, &mut rand));
        let failure = s.fspec_failure();
        assert!(failure.is_some());
    }
}
