//! Deterministic ordering of filter results
//!
//! Filters yield items in callback order, which depends on who registered
//! first. Lists shown to users go through these helpers instead.

use std::collections::BTreeSet;

use steward_core::Result;

/// Sort and deduplicate
pub fn sorted_unique<T: Ord>(items: impl IntoIterator<Item = T>) -> Vec<T> {
    items.into_iter().collect::<BTreeSet<_>>().into_iter().collect()
}

/// Stable sort on the first field, keeping duplicates
pub fn sorted_by_first<K: Ord, V>(items: impl IntoIterator<Item = (K, V)>) -> Vec<(K, V)> {
    let mut items: Vec<_> = items.into_iter().collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));
    items
}

/// [`sorted_unique`] over a fallible stream; the first error wins
pub fn try_sorted_unique<T: Ord>(items: impl IntoIterator<Item = Result<T>>) -> Result<Vec<T>> {
    let set = items.into_iter().collect::<Result<BTreeSet<_>>>()?;
    Ok(set.into_iter().collect())
}

/// [`sorted_by_first`] over a fallible stream; the first error wins
pub fn try_sorted_by_first<K: Ord, V>(
    items: impl IntoIterator<Item = Result<(K, V)>>,
) -> Result<Vec<(K, V)>> {
    let items = items.into_iter().collect::<Result<Vec<_>>>()?;
    Ok(sorted_by_first(items))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use steward_core::Error;

    #[test]
    fn test_sorted_unique() {
        assert_eq!(sorted_unique(["b", "a", "b", "c"]), vec!["a", "b", "c"]);
        assert!(sorted_unique(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_sorted_by_first_is_stable() {
        let sorted = sorted_by_first([("b", 1), ("a", 2), ("b", 0), ("a", 1)]);
        assert_eq!(sorted, vec![("a", 2), ("a", 1), ("b", 1), ("b", 0)]);
    }

    #[test]
    fn test_try_variants_propagate_first_error() {
        let items = vec![
            Ok("a"),
            Err(Error::Message("first".into())),
            Err(Error::Message("second".into())),
        ];
        let err = try_sorted_unique(items).unwrap_err();
        assert_eq!(err.to_string(), "first");

        let ok: Vec<Result<(&str, u8)>> = vec![Ok(("z", 1)), Ok(("y", 2))];
        assert_eq!(try_sorted_by_first(ok).unwrap(), vec![("y", 2), ("z", 1)]);
    }
}
