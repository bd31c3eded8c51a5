//! Named parameters attached to a request.
//!
//! Routers merge the values they capture from the request path or the
//! `Host` header into a [`PathParams`] map carried by the request.

use std::collections::HashMap;
use std::collections::hash_map::Iter;

/// Parameter map from a declared placeholder name to its captured value.
///
/// Inserting a name that is already present overwrites the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    inner: HashMap<String, String>,
}

impl PathParams {
    /// Creates an empty PathParams instance with no parameters
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if there are no path parameters
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of path parameters
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Gets the value of a path parameter by its name
    /// Returns None if the parameter doesn't exist
    #[inline]
    pub fn get(&self, key: impl AsRef<str>) -> Option<&str> {
        self.inner.get(key.as_ref()).map(String::as_str)
    }

    /// Stores `value` under `name`, returning the value it replaced.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.inner.insert(name.into(), value.into())
    }

    pub fn iter(&self) -> Iter<'_, String, String> {
        self.inner.iter()
    }
}

impl<'a> IntoIterator for &'a PathParams {
    type Item = (&'a String, &'a String);
    type IntoIter = Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_overwrites() {
        let mut params = PathParams::empty();
        assert!(params.is_empty());

        assert_eq!(params.insert("id", "1"), None);
        assert_eq!(params.insert("id", "2"), Some("1".to_string()));
        assert_eq!(params.get("id"), Some("2"));
        assert_eq!(params.get("missing"), None);
        assert_eq!(params.len(), 1);
    }
}
