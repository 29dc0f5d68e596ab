//! This crate contains utility functions for displaying iterators and
//! types in a nice and structured way.

/// Join iterators over string types using the given separator
///
/// This function can be used to join iterators over string types using the
/// given separator. The separator can be any string, including an empty string.
/// It will not be appended to the end of the result.
///
/// # Example
///
/// ```
/// use orbit_display_utils::join_iterator;
///
/// let list = vec!["a", "b", "c"];
/// assert_eq!(join_iterator(list.iter(), ", "), "a, b, c");
/// ```
pub fn join_iterator<T: ToString + Sized, U: Iterator<Item = T>, S: Into<String>>(
    list: U,
    sep: S,
) -> String {
    list.map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(sep.into().as_str())
}

/// Join an iterator into a product-style string using the `×` separator
///
/// Used for displaying boxes as products of their coordinate intervals.
///
/// # Example
///
/// ```
/// use orbit_display_utils::join_product;
///
/// let list = vec!["[0, 1]", "[2, 3]"];
/// assert_eq!(join_product(list.iter()), "[0, 1] × [2, 3]");
/// ```
pub fn join_product<T: ToString + Sized, U: Iterator<Item = T>>(list: U) -> String {
    join_iterator(list, " × ")
}

#[cfg(test)]
mod tests {
    use crate::{join_iterator, join_product};

    #[test]
    fn test_join_iterator() {
        assert_eq!(join_iterator(vec![1, 2, 3].iter(), ","), "1,2,3");
        assert_eq!(join_iterator(Vec::<u32>::new().iter(), ","), "");
        assert_eq!(join_iterator(vec!["x"].iter(), ", "), "x");
    }

    #[test]
    fn test_join_product() {
        assert_eq!(join_product(vec!["[0, 1]"].iter()), "[0, 1]");
        assert_eq!(
            join_product(vec!["[0, 1]", "[1, 2]"].iter()),
            "[0, 1] × [1, 2]"
        );
    }

}
