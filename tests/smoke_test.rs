//! Smoke test exercising the public API surface end-to-end: registry,
//! conform, explain, gen, and exercise together against a single spec.

use serial_test::serial;
use specula::*;

#[test]
#[serial]
fn smoke_test_person_keys_spec() {
    registry::reset();

    let first_name = QualifiedName::new("person", "first_name");
    let age = QualifiedName::new("person", "age");
    def(first_name.clone(), std::sync::Arc::new(predicate(PredicateKind::Type(TypeTag::String)).named(first_name.clone()))).unwrap();
    def(
        age.clone(),
        std::sync::Arc::new(and(vec![predicate(PredicateKind::Type(TypeTag::Int)), predicate(PredicateKind::IntPredicate(|n| n >= 0))]).named(age.clone())),
    )
    .unwrap();

    let person = keys(
        vec![KeyExpr::Leaf(first_name.clone()), KeyExpr::Leaf(age.clone())],
        vec![],
        vec![],
        vec![],
    );

    let mut good = OrderedMap::new();
    good.insert(Value::Symbol(first_name.clone()), Value::from("Ada"));
    good.insert(Value::Symbol(age.clone()), Value::Int(30));
    let good_v = Value::Map(good);
    assert!(valid(&person, &good_v));
    assert_eq!(explain_data(&person, &good_v).to_string(), "Success!");

    let mut bad = OrderedMap::new();
    bad.insert(Value::Symbol(first_name.clone()), Value::from("Ada"));
    bad.insert(Value::Symbol(age.clone()), Value::Int(-1));
    let bad_v = Value::Map(bad);
    assert!(!valid(&person, &bad_v));
    let problems = explain_data(&person, &bad_v).problems;
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].path, vec![Value::Symbol(age.clone())]);

    let mut rand = StdRand::seeded(99);
    let pairs = exercise(&person, 10, &Overrides::new(), &mut rand).unwrap();
    assert_eq!(pairs.len(), 10);
    for (raw, conformed) in &pairs {
        assert!(valid(&person, raw));
        assert!(conformed.is_some());
    }

    registry::reset();
}

#[test]
#[serial]
fn smoke_test_fspec_validation() {
    let args = regexop::cat(vec![
        ("a", predicate(PredicateKind::Type(TypeTag::Int))),
        ("b", predicate(PredicateKind::Type(TypeTag::Int))),
    ]);
    let ret = predicate(PredicateKind::Type(TypeTag::Int));
    let s = fspec(args, ret, None, None);

    let add: Callable = std::sync::Arc::new(|args: &[Value]| match (&args[0], &args[1]) {
        (Value::Int(a), Value::Int(b)) => Value::Int(a + b),
        _ => Value::Nil,
    });
    let mut rand = StdRand::seeded(5);
    assert!(s.fspec_validate(&add, &mut rand));

    let broken: Callable = std::sync::Arc::new(|_args: &[Value]| Value::from("not an int"));
    let mut rand2 = StdRand::seeded(5);
    assert!(!s.fspec_validate(&broken, &mut rand2));
    assert!(s.fspec_failure().is_some());
}
