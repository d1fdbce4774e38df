//! Path parameter storage.
//!
//! Report routes carry one or two parameters, so they are kept inline in a
//! small vector and only spill to the heap for unusual routes.

use smallvec::SmallVec;

/// Maximum number of parameters stored inline (stack allocated).
const INLINE_PARAMS: usize = 4;

/// Path parameters captured by a route match, as (name, value) pairs.
///
/// # Example
///
/// ```rust
/// use folio_extract::Params;
///
/// let mut params = Params::new();
/// params.push("format", "pdf");
///
/// assert_eq!(params.get("format"), Some("pdf"));
/// assert_eq!(params.get("unknown"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates a new empty parameter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter to the set.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns the value for a parameter by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns an iterator over the parameters.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        assert!(params.is_empty());

        params.push("format", "xls");
        params.push("variant", "alternative");

        assert_eq!(params.len(), 2);
        assert_eq!(params.get("format"), Some("xls"));
        assert_eq!(params.get("variant"), Some("alternative"));
        assert_eq!(params.get("unknown"), None);
    }

    #[test]
    fn test_params_iter_keeps_order() {
        let params: Params = vec![
            ("a".to_string(), "1".to_string()),
            ("b".to_string(), "2".to_string()),
        ]
        .into_iter()
        .collect();

        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("a", "1"), ("b", "2")]);
    }

    #[test]
    fn test_params_spill_past_inline_capacity() {
        let mut params = Params::new();
        for i in 0..10 {
            params.push(format!("key{i}"), format!("value{i}"));
        }

        assert_eq!(params.len(), 10);
        assert_eq!(params.get("key7"), Some("value7"));
    }
}
