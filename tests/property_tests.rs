//! Write-then-reparse properties over generated inputs.

use proptest::prelude::*;
use strata::{strata, Value};

proptest! {
    #[test]
    fn i64_scalars_round_trip(n in any::<i64>()) {
        let value = strata!({ "n": (n) });
        let text = strata::to_string(&value).unwrap();
        let doc = strata::from_str(&text).unwrap();
        prop_assert_eq!(doc.get("n").unwrap().to_i64().unwrap(), n);
    }

    #[test]
    fn finite_f64_scalars_round_trip(
        x in any::<f64>().prop_filter("finite", |x| x.is_finite())
    ) {
        let value = strata!({ "x": (x) });
        let text = strata::to_string(&value).unwrap();
        let doc = strata::from_str(&text).unwrap();
        let back = doc.get("x").unwrap().to_f64().unwrap();
        prop_assert_eq!(back.to_bits(), x.to_bits());
    }

    #[test]
    fn arbitrary_strings_round_trip(s in any::<String>()) {
        let value = strata!({ "s": (s.clone()) });
        let text = strata::to_string(&value).unwrap();
        let doc = strata::from_str(&text).unwrap();
        prop_assert_eq!(doc.get("s").unwrap().text().unwrap(), s);
    }

    #[test]
    fn name_like_scalars_stay_bare(s in "[A-Za-z_][A-Za-z0-9_.]{0,16}") {
        let value = strata!({ "v": (s.clone()) });
        let text = strata::to_string(&value).unwrap();
        prop_assert!(!text.contains('"'));
        let doc = strata::from_str(&text).unwrap();
        prop_assert_eq!(doc.get("v").unwrap().text().unwrap(), s);
    }

    #[test]
    fn maps_with_name_keys_round_trip(
        entries in prop::collection::btree_map("[a-z][a-z0-9_]{0,8}", any::<i32>(), 1..8)
    ) {
        let mut map = strata::StrataMap::new();
        for (key, n) in &entries {
            map.insert(key.clone(), Value::from(*n));
        }
        let value = Value::Map(map);
        let text = strata::to_string(&value).unwrap();
        let doc = strata::from_str(&text).unwrap();
        prop_assert_eq!(Value::Map(doc.into_root()), value);
    }

    #[test]
    fn integer_lists_round_trip(items in prop::collection::vec(any::<i32>(), 0..10)) {
        let list: Vec<Value> = items.iter().copied().map(Value::from).collect();
        let value = strata!({ "items": (Value::from(list)) });
        let text = strata::to_string(&value).unwrap();
        let doc = strata::from_str(&text).unwrap();
        prop_assert_eq!(Value::Map(doc.into_root()), value);
    }
}
