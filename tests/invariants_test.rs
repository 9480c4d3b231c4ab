//! Crate-level round-trip and validity invariants (spec.md §8), exercised
//! against hand-built specs rather than arbitrary spec generation — this
//! is testing the engine itself, not the `gen` feature it exposes.

use proptest::prelude::*;
use specula::*;

fn int_in_range() -> impl Strategy<Value = i64> {
    -1000i64..1000
}

proptest! {
    #[test]
    fn valid_iff_conform_some_iff_explain_none(n in int_in_range()) {
        let s = predicate(PredicateKind::Type(TypeTag::Int));
        let v = Value::Int(n);
        prop_assert!(valid(&s, &v));
        prop_assert!(conform(&s, &v).is_some());
        prop_assert!(explain_data(&s, &v).is_success());
    }

    #[test]
    fn invalid_iff_conform_none_iff_explain_some(s in "[a-z]{1,8}") {
        let spec = predicate(PredicateKind::Type(TypeTag::Int));
        let v = Value::from(s);
        prop_assert!(!valid(&spec, &v));
        prop_assert!(conform(&spec, &v).is_none());
        prop_assert!(!explain_data(&spec, &v).is_success());
    }

    #[test]
    fn and_conformer_round_trips_through_unform(n in int_in_range()) {
        let s = and(vec![
            predicate(PredicateKind::Type(TypeTag::Int)),
            conformer(
                |v| match v {
                    Value::Int(n) => Some(Value::Int(n * 2)),
                    _ => None,
                },
                |v| match v {
                    Value::Int(n) => Value::Int(n / 2),
                    _ => v.clone(),
                },
            ),
        ]);
        let v = Value::Int(n);
        let conformed = conform(&s, &v).unwrap();
        prop_assert_eq!(unform(&s, &conformed), v);
    }

    #[test]
    fn tuple_round_trips_each_element(a in int_in_range(), b in int_in_range()) {
        let s = tuple(vec![
            predicate(PredicateKind::Type(TypeTag::Int)),
            predicate(PredicateKind::Type(TypeTag::Int)),
        ]);
        let v = Value::Seq(vec![Value::Int(a), Value::Int(b)]);
        let conformed = conform(&s, &v).unwrap();
        prop_assert_eq!(unform(&s, &conformed), v);
    }

    #[test]
    fn regex_cat_round_trips(a in int_in_range(), b in "[a-z]{1,6}") {
        let s = regexop::cat(vec![
            ("n", predicate(PredicateKind::Type(TypeTag::Int))),
            ("s", predicate(PredicateKind::Type(TypeTag::String))),
        ]);
        let v = Value::Seq(vec![Value::Int(a), Value::from(b)]);
        let conformed = conform(&s, &v).unwrap();
        prop_assert_eq!(unform(&s, &conformed), v);
    }

    #[test]
    fn coll_of_exhaustive_fails_on_any_bad_element(good_len in 0usize..8) {
        let s = coll_of(predicate(PredicateKind::Type(TypeTag::Int)), EveryOptions::default());
        let mut items: Vec<Value> = (0..good_len as i64).map(Value::Int).collect();
        items.push(Value::from("bad"));
        prop_assert_eq!(conform(&s, &Value::Seq(items)), None);
    }

    #[test]
    fn gen_produces_values_the_spec_accepts(seed in any::<u64>()) {
        let s = predicate(PredicateKind::Type(TypeTag::Int));
        let mut rand = StdRand::seeded(seed);
        let g = gen(&s, &Overrides::new()).unwrap();
        let v = g(&mut rand);
        prop_assert!(valid(&s, &v));
    }
}
