//! Case-insensitive header map that preserves original capitalization and
//! insertion order for output.

/// HTTP header collection. Lookup is case-insensitive; iteration yields the
/// names with the capitalization they were added with, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    // (lowercase name, original-case name, value)
    entries: Vec<(String, String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a header. A replaced header keeps its position but
    /// takes the new capitalization and value. Name and value are trimmed.
    pub fn set(&mut self, name: &str, value: &str) {
        let name = name.trim();
        let value = value.trim();
        if name.is_empty() {
            return;
        }
        let lower = name.to_ascii_lowercase();
        if let Some(entry) = self.entries.iter_mut().find(|(l, ..)| *l == lower) {
            entry.1 = name.to_string();
            entry.2 = value.to_string();
        } else {
            self.entries.push((lower, name.to_string(), value.to_string()));
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        let lower = name.trim().to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(l, ..)| *l == lower)
            .map(|(_, _, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates `(original-case name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(_, n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: AsRef<str>, V: AsRef<str>> Extend<(N, V)> for Headers {
    fn extend<T: IntoIterator<Item = (N, V)>>(&mut self, iter: T) {
        for (name, value) in iter {
            self.set(name.as_ref(), value.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let mut headers = Headers::new();
        headers.set("Content-Type", "text/html");
        assert_eq!(headers.get("content-type"), Some("text/html"));
        assert_eq!(headers.get("CONTENT-TYPE"), Some("text/html"));
        assert!(headers.contains("Content-type"));
        assert!(!headers.contains("Accept"));
    }

    #[test]
    fn iteration_preserves_original_case_and_order() {
        let mut headers = Headers::new();
        headers.set("X-First", "1");
        headers.set("content-length", "42");
        headers.set("X-Last", "3");
        let pairs: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(
            pairs,
            vec![("X-First", "1"), ("content-length", "42"), ("X-Last", "3")]
        );
    }

    #[test]
    fn set_replaces_in_place_with_new_capitalization() {
        let mut headers = Headers::new();
        headers.set("x-token", "a");
        headers.set("Accept", "*/*");
        headers.set("X-Token", "b");
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("X-TOKEN"), Some("b"));
        let pairs: Vec<(&str, &str)> = headers.iter().collect();
        assert_eq!(pairs[0], ("X-Token", "b"), "replaced entry keeps position");
    }

    #[test]
    fn names_and_values_are_trimmed() {
        let mut headers = Headers::new();
        headers.set("  Host ", " example.com ");
        assert_eq!(headers.get("host"), Some("example.com"));
        headers.set("", "ignored");
        assert_eq!(headers.len(), 1);
    }
}
