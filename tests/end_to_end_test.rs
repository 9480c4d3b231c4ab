//! End-to-end scenarios (spec.md §8.3), one case per bullet.

use rstest::rstest;
use serial_test::serial;
use specula::*;

fn sym(s: &str) -> Value {
    Value::Symbol(QualifiedName::local(s))
}

#[test]
fn scenario_1_cat_rejects_plain_string_as_symbol() {
    let s = regexop::cat(vec![
        ("qty", predicate(PredicateKind::Type(TypeTag::Numeric))),
        ("unit", predicate(PredicateKind::Type(TypeTag::Symbol))),
    ]);
    let v = Value::Seq(vec![Value::Int(2), Value::from("teaspoon")]);
    assert_eq!(conform(&s, &v), None);
    let problems = explain_data(&s, &v).problems;
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].path, vec![Value::Int(1)]);
    assert_eq!(problems[0].val, Value::from("teaspoon"));
    assert!(matches!(&problems[0].pred, PredRef::Predicate(PredicateKind::Type(TypeTag::Symbol))));
}

#[test]
fn scenario_2_or_prefers_left_to_right_and_reports_both_branches() {
    let s = or(vec![
        ("name".into(), predicate(PredicateKind::Type(TypeTag::String))),
        ("id".into(), predicate(PredicateKind::Type(TypeTag::Int))),
    ]);
    assert_eq!(
        conform(&s, &Value::from("abc")),
        Some(Value::Seq(vec![Value::from("name"), Value::from("abc")]))
    );
    assert_eq!(
        conform(&s, &Value::Int(42)),
        Some(Value::Seq(vec![Value::from("id"), Value::Int(42)]))
    );
    let bad = sym("foo");
    assert_eq!(conform(&s, &bad), None);
    let problems = explain_data(&s, &bad).problems;
    assert_eq!(problems.len(), 2);
}

#[rstest]
#[case(vec![], Some(Value::Seq(vec![])))]
#[case(vec![sym("a"), sym("b"), sym("c")], Some(Value::Seq(vec![sym("a"), sym("b"), sym("c")])))]
#[case(vec![Value::Int(1)], None)]
fn scenario_3_zero_or_more_symbol(#[case] items: Vec<Value>, #[case] expected: Option<Value>) {
    let s = regexop::zero_or_more(predicate(PredicateKind::Type(TypeTag::Symbol)));
    assert_eq!(conform(&s, &Value::Seq(items)), expected);
}

#[test]
fn scenario_4_nested_cat_over_two_zero_or_more_spans() {
    let names = regexop::zero_or_more(predicate(PredicateKind::Type(TypeTag::String)));
    let nums = regexop::zero_or_more(predicate(PredicateKind::Type(TypeTag::Numeric)));
    let s = regexop::cat(vec![
        ("names_tag", predicate(PredicateKind::Type(TypeTag::Symbol))),
        ("names", names),
        ("nums_tag", predicate(PredicateKind::Type(TypeTag::Symbol))),
        ("nums", nums),
    ]);
    let v = Value::Seq(vec![
        sym("names"),
        Value::Seq(vec![Value::from("a"), Value::from("b")]),
        sym("nums"),
        Value::Seq(vec![Value::Int(1), Value::Int(2)]),
    ]);
    let conformed = conform(&s, &v).unwrap();
    let m = conformed.as_map().unwrap();
    assert_eq!(m.get(&sym("names_tag")), Some(&sym("names")));
    assert_eq!(
        m.get(&sym("names")),
        Some(&Value::Seq(vec![Value::from("a"), Value::from("b")]))
    );
    assert_eq!(m.get(&sym("nums_tag")), Some(&sym("nums")));
    assert_eq!(
        m.get(&sym("nums")),
        Some(&Value::Seq(vec![Value::Int(1), Value::Int(2)]))
    );
}

#[test]
#[serial]
fn scenario_5_keys_with_registered_email_regex() {
    registry::reset();
    let email_re = regex::Regex::new(r"^[^@]+@[^@]+$").unwrap();
    let email_spec = and(vec![
        predicate(PredicateKind::Type(TypeTag::String)),
        predicate(PredicateKind::Pattern(email_re)),
    ]);
    let email_name = QualifiedName::new("ns", "email");
    def(email_name.clone(), std::sync::Arc::new(email_spec.named(email_name.clone()))).unwrap();

    let s = keys(
        vec![
            KeyExpr::Leaf(QualifiedName::new("ns", "first")),
            KeyExpr::Leaf(QualifiedName::new("ns", "last")),
            KeyExpr::Leaf(email_name.clone()),
        ],
        vec![KeyExpr::Leaf(QualifiedName::new("ns", "phone"))],
        vec![],
        vec![],
    );

    let mut missing_email = OrderedMap::new();
    missing_email.insert(Value::Symbol(QualifiedName::new("ns", "first")), Value::from("Jo"));
    missing_email.insert(Value::Symbol(QualifiedName::new("ns", "last")), Value::from("Doe"));
    let v = Value::Map(missing_email);
    let problems = explain_data(&s, &v).problems;
    assert_eq!(problems.len(), 1);
    assert!(matches!(&problems[0].pred, PredRef::KeyPresence(KeyExpr::Leaf(n)) if *n == email_name));

    let mut bad_email = OrderedMap::new();
    bad_email.insert(Value::Symbol(QualifiedName::new("ns", "first")), Value::from("Jo"));
    bad_email.insert(Value::Symbol(QualifiedName::new("ns", "last")), Value::from("Doe"));
    bad_email.insert(Value::Symbol(email_name.clone()), Value::from("n/a"));
    let v2 = Value::Map(bad_email);
    let problems2 = explain_data(&s, &v2).problems;
    assert_eq!(problems2.len(), 1);
    assert_eq!(problems2[0].path, vec![Value::Symbol(email_name.clone())]);
    registry::reset();
}

#[test]
fn scenario_6_tuple_of_floats_rejects_int_element() {
    let s = tuple(vec![
        predicate(PredicateKind::Type(TypeTag::Float)),
        predicate(PredicateKind::Type(TypeTag::Float)),
        predicate(PredicateKind::Type(TypeTag::Float)),
    ]);
    let v = Value::Seq(vec![Value::Float(1.1), Value::Float(2.2), Value::Int(3)]);
    assert_eq!(conform(&s, &v), None);
    let problems = explain_data(&s, &v).problems;
    assert_eq!(problems.len(), 1);
    assert_eq!(problems[0].path, vec![Value::Int(2)]);
    assert_eq!(problems[0].val, Value::Int(3));
}
