/// Builds a [`Value`](crate::Value) from an inline literal.
///
/// Maps use `{ "key": value }`, lists use `[ a, b ]`, `null` is the null
/// value, and anything else goes through [`Value::from`](crate::Value).
/// Non-literal expressions in value position need parentheses:
/// `strata!({ "x": (point.x) })`.
///
/// # Examples
///
/// ```rust
/// use strata::strata;
///
/// let value = strata!({
///     "name": "Alice",
///     "scores": [1, 2, 3],
///     "address": null
/// });
/// assert_eq!(value.get("name").unwrap().text().unwrap(), "Alice");
/// assert_eq!(value.get("scores").unwrap().at(2).unwrap().to_i32().unwrap(), 3);
/// assert!(value.get("address").unwrap().is_null());
/// ```
#[macro_export]
macro_rules! strata {
    (null) => {
        $crate::Value::Null
    };

    ([]) => {
        $crate::Value::List($crate::List::new())
    };

    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::from(::std::vec![$($crate::strata!($elem)),*])
    };

    ({}) => {
        $crate::Value::Map($crate::StrataMap::new())
    };

    ({ $($key:literal : $value:tt),* $(,)? }) => {{
        let mut map = $crate::StrataMap::new();
        $(
            map.insert($key.to_string(), $crate::strata!($value));
        )*
        $crate::Value::Map(map)
    }};

    ($other:expr) => {
        $crate::Value::from($other)
    };
}
