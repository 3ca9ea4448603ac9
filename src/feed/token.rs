//! Parse events delivered by the tokenizer to the dispatcher.

use std::fmt;

/// A namespace-qualified element or attribute name.
///
/// Unqualified names (no default namespace in scope, or unprefixed
/// attributes) carry `namespace: None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<String>,
    pub local: String,
}

impl QName {
    /// Builds a name without a namespace.
    pub fn local(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    /// Builds a name bound to `namespace`.
    pub fn qualified(namespace: impl Into<String>, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local: local.into(),
        }
    }

    /// Returns the local name when this name belongs to `namespace`.
    pub fn local_in(&self, namespace: &str) -> Option<&str> {
        match self.namespace.as_deref() {
            Some(ns) if ns == namespace => Some(&self.local),
            _ => None,
        }
    }

    /// True for an unqualified name equal to `local`.
    pub fn is_unqualified(&self, local: &str) -> bool {
        self.namespace.is_none() && self.local == local
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.local_in(namespace) == Some(local)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// Attributes of a start tag, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(QName, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: QName, value: impl Into<String>) {
        self.0.push((name, value.into()));
    }

    /// Looks up an unqualified attribute such as `rel` or `href`.
    pub fn get(&self, local: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(name, _)| name.is_unqualified(local))
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.0.iter().map(|(name, value)| (name, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    /// Collects unqualified `(name, value)` pairs. Mostly useful in tests.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (QName::local(k), v.into()))
                .collect(),
        )
    }
}

/// One atomic parse event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    ElementStart { name: QName, attributes: Attributes },
    ElementEnd { name: QName },
    Text(String),
}

impl Token {
    pub fn start(name: QName, attributes: Attributes) -> Self {
        Token::ElementStart { name, attributes }
    }

    pub fn end(name: QName) -> Self {
        Token::ElementEnd { name }
    }

    pub fn text(chunk: impl Into<String>) -> Self {
        Token::Text(chunk.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_in_matches_namespace_only() {
        let name = QName::qualified("http://www.w3.org/2005/Atom", "feed");
        assert_eq!(name.local_in("http://www.w3.org/2005/Atom"), Some("feed"));
        assert_eq!(name.local_in("http://example.com/"), None);
        assert!(!name.is_unqualified("feed"));
    }

    #[test]
    fn test_attribute_lookup_ignores_qualified_names() {
        let mut attrs = Attributes::new();
        attrs.push(QName::qualified("http://www.w3.org/XML/1998/namespace", "lang"), "en");
        attrs.push(QName::local("rel"), "self");

        assert_eq!(attrs.get("rel"), Some("self"));
        assert_eq!(attrs.get("lang"), None);
        assert_eq!(attrs.len(), 2);
    }

    #[test]
    fn test_display_uses_clark_notation() {
        assert_eq!(QName::qualified("urn:x", "y").to_string(), "{urn:x}y");
        assert_eq!(QName::local("rss").to_string(), "rss");
    }
}
