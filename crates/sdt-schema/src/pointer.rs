//! # Schema Paths
//!
//! `SchemaPath` is a JSON pointer (RFC 6901) in URI-fragment form (`#/a/b`)
//! identifying a location inside the *augmented* document.
//!
//! Augmentation wraps every node in a `oneOf` whose alternative 0 is the
//! original node, so the location of a child is always computed through the
//! parent's alternative 0: `R/oneOf/0/properties/<name>`. The helpers on
//! this type are the only place that arithmetic lives.

use std::fmt;

use crate::error::SchemaError;

/// A parsed JSON pointer. Tokens are stored unescaped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaPath {
    tokens: Vec<String>,
}

impl SchemaPath {
    /// The document root, `#`.
    pub fn root() -> Self {
        Self::default()
    }

    /// Build a path from unescaped tokens.
    pub fn from_tokens<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a local reference (`#`, `#/definitions/a~1b`, `#/a%20b`).
    ///
    /// # Errors
    ///
    /// Returns `SchemaError::InvalidPointer` if the string is not a
    /// fragment-only JSON pointer.
    pub fn parse(pointer: &str) -> Result<Self, SchemaError> {
        let invalid = || SchemaError::InvalidPointer(pointer.to_string());
        let fragment = pointer.strip_prefix('#').ok_or_else(invalid)?;
        if fragment.is_empty() {
            return Ok(Self::root());
        }
        let body = fragment.strip_prefix('/').ok_or_else(invalid)?;
        let tokens = body
            .split('/')
            .map(|raw| {
                let decoded = urlencoding::decode(raw).map_err(|_| invalid())?;
                Ok(decoded.replace("~1", "/").replace("~0", "~"))
            })
            .collect::<Result<_, SchemaError>>()?;
        Ok(Self { tokens })
    }

    /// Whether `reference` is a fragment-only pointer into the current
    /// document rather than a remote URI.
    pub fn is_local(reference: &str) -> bool {
        reference.starts_with('#')
    }

    /// Append one token.
    pub fn push(&self, token: impl Into<String>) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.push(token.into());
        Self { tokens }
    }

    /// Append several tokens.
    pub fn join<S: AsRef<str>>(&self, rest: &[S]) -> Self {
        let mut tokens = self.tokens.clone();
        tokens.extend(rest.iter().map(|t| t.as_ref().to_string()));
        Self { tokens }
    }

    /// Location of the unwrapped original inside an augmented node.
    pub fn original(&self) -> Self {
        self.join(&["oneOf", "0"])
    }

    /// Location of the augmented `items` schema of this node.
    pub fn items(&self) -> Self {
        self.original().push("items")
    }

    /// Location of the augmented schema for property `name` of this node.
    pub fn property(&self, name: &str) -> Self {
        self.original().join(&["properties", name])
    }

    /// Location of the augmented `additionalProperties` schema of this node.
    pub fn additional_properties(&self) -> Self {
        self.original().push("additionalProperties")
    }

    /// Location of the augmented definition `name` under `keyword`
    /// (`definitions` or `$defs`).
    pub fn definition(&self, keyword: &str, name: &str) -> Self {
        self.original().join(&[keyword, name])
    }

    /// Unescaped tokens.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Whether this is the document root.
    pub fn is_root(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Plain RFC 6901 form (`/a/b`), as accepted by `Value::pointer`.
    pub fn to_json_pointer(&self) -> String {
        self.tokens
            .iter()
            .map(|t| format!("/{}", escape(t)))
            .collect()
    }
}

fn escape(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

impl fmt::Display for SchemaPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("#")?;
        for token in &self.tokens {
            write!(f, "/{}", urlencoding::encode(&escape(token)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_renders_as_hash() {
        assert_eq!(SchemaPath::root().to_string(), "#");
        assert!(SchemaPath::parse("#").unwrap().is_root());
    }

    #[test]
    fn child_paths_go_through_alternative_zero() {
        let r = SchemaPath::parse("#/properties/template").unwrap();
        assert_eq!(r.items().to_string(), "#/properties/template/oneOf/0/items");
        assert_eq!(
            r.property("a").to_string(),
            "#/properties/template/oneOf/0/properties/a"
        );
        assert_eq!(
            r.additional_properties().to_string(),
            "#/properties/template/oneOf/0/additionalProperties"
        );
    }

    #[test]
    fn nested_children_accumulate_layers() {
        let r = SchemaPath::root().property("a").items();
        assert_eq!(r.to_string(), "#/oneOf/0/properties/a/oneOf/0/items");
    }

    #[test]
    fn tokens_are_escaped() {
        let p = SchemaPath::root().push("a/b").push("c~d");
        assert_eq!(p.to_string(), "#/a~1b/c~0d");
        assert_eq!(p.to_json_pointer(), "/a~1b/c~0d");
    }

    #[test]
    fn non_fragment_characters_are_percent_encoded() {
        let p = SchemaPath::root().push("first name").push("$defs");
        assert_eq!(p.to_string(), "#/first%20name/%24defs");
    }

    #[test]
    fn parse_round_trips_display() {
        let p = SchemaPath::root()
            .property("a/b")
            .definition("$defs", "x y")
            .push("c~d");
        assert_eq!(SchemaPath::parse(&p.to_string()).unwrap(), p);
    }

    #[test]
    fn parse_rejects_remote_and_relative() {
        assert!(SchemaPath::parse("https://example.com/s.json").is_err());
        assert!(SchemaPath::parse("#definitions").is_err());
        assert!(!SchemaPath::is_local("other.json#/a"));
        assert!(SchemaPath::is_local("#/a"));
    }
}
