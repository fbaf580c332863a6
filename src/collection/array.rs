//! Sequence helpers.

use std::cmp::Ordering;

/// Collect any iterable into a `Vec`.
pub fn make_array<I: IntoIterator>(items: I) -> Vec<I::Item> {
    items.into_iter().collect()
}

/// Order keys by their numeric value.
///
/// Keys that don't parse as numbers compare equal to everything, so the
/// (stable) sort leaves them where they were.
pub fn numeric_key_order(a: &str, b: &str) -> Ordering {
    match (a.trim().parse::<f64>(), b.trim().parse::<f64>()) {
        (Ok(a), Ok(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        _ => Ordering::Equal,
    }
}

/// Sort the entries of a keyed collection and concatenate their values.
///
/// Each value is itself a sequence, spliced into the output in key order.
/// `compare` defaults to [`numeric_key_order`].
pub fn trans_object_attr_into_array<K, V, I, F>(entries: I, compare: Option<F>) -> Vec<V::Item>
where
    K: AsRef<str>,
    V: IntoIterator,
    I: IntoIterator<Item = (K, V)>,
    F: FnMut(&str, &str) -> Ordering,
{
    let mut entries: Vec<(K, V)> = entries.into_iter().collect();
    match compare {
        Some(mut compare) => entries.sort_by(|(a, _), (b, _)| compare(a.as_ref(), b.as_ref())),
        None => entries.sort_by(|(a, _), (b, _)| numeric_key_order(a.as_ref(), b.as_ref())),
    }

    entries.into_iter().flat_map(|(_, values)| values).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    type KeyOrder = fn(&str, &str) -> Ordering;

    #[test]
    fn test_make_array() {
        assert_eq!(make_array("abc".chars()), vec!['a', 'b', 'c']);
        assert!(make_array(Vec::<u8>::new()).is_empty());
    }

    #[test]
    fn test_numeric_key_order() {
        assert_eq!(numeric_key_order("2", "10"), Ordering::Less);
        assert_eq!(numeric_key_order("10", "2"), Ordering::Greater);
        assert_eq!(numeric_key_order("1.5", "1.5"), Ordering::Equal);
        assert_eq!(numeric_key_order("a", "1"), Ordering::Equal);
    }

    #[test]
    fn test_flatten_by_numeric_keys() {
        let mut levels = HashMap::new();
        levels.insert("10", vec!["ten"]);
        levels.insert("2", vec!["two", "deux"]);
        levels.insert("1", vec!["one"]);

        let ordered = trans_object_attr_into_array(levels, None::<KeyOrder>);
        assert_eq!(ordered, vec!["one", "two", "deux", "ten"]);
    }

    #[test]
    fn test_flatten_with_custom_order() {
        let entries = vec![("a", vec![1]), ("c", vec![3]), ("b", vec![2])];

        let ordered = trans_object_attr_into_array(entries, Some(|a: &str, b: &str| b.cmp(a)));
        assert_eq!(ordered, vec![3, 2, 1]);
    }

    #[test]
    fn test_flatten_keeps_unparseable_keys_in_place() {
        let entries = vec![("x", vec![1]), ("y", vec![2])];
        let ordered = trans_object_attr_into_array(entries, None::<KeyOrder>);
        assert_eq!(ordered, vec![1, 2]);
    }
}
