//! Deterministic cache key derivation from structured query parameters.
//!
//! Listing queries hash a canonical form of their parameters so keys have a
//! fixed length and never embed unbounded filter text. Entity lookups use the
//! identifier directly.
//!
//! Canonicalisation:
//!
//! 1. The descriptor is serialised to a JSON object with `serde_json`.
//! 2. The object is flattened into `(path, value)` pairs. Nested objects
//!    contribute dotted paths (`filters.category`), arrays contribute index
//!    segments (`tags[0]`) and `null` fields are dropped. Object keys have
//!    `\`, `.`, `[` and `{` escaped with `\`, so a literal `a.b` key and a
//!    nested `a` → `b` path stay distinct. Empty arrays and objects emit a
//!    `tags[]` / `filters{}` marker pair instead of vanishing.
//! 3. Pairs are sorted by path and form-urlencoded (`page=1&size=10`).
//! 4. The key is `<operation>:<hex sha256 of the canonical form>`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use sha2::{Digest, Sha256};
use thiserror::Error;

use super::ports::{CacheKey, CacheKeyValidationError};

/// Failures raised while deriving a cache key.
///
/// These are fatal to the query: they are reported before any cache or
/// source call is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyDerivationError {
    /// Operation prefix is blank or contains whitespace or `:`.
    #[error("invalid cache key operation `{operation}`")]
    InvalidOperation {
        /// Rejected operation prefix.
        operation: String,
    },
    /// The descriptor could not be serialised.
    #[error("failed to serialise query descriptor: {message}")]
    Serialization {
        /// Serializer failure description.
        message: String,
    },
    /// The descriptor did not serialise to a JSON object.
    #[error("query descriptor must serialise to an object")]
    NotAnObject,
    /// Entity identifier is empty.
    #[error("entity identifier must not be empty")]
    EmptyIdentifier,
    /// The assembled key failed validation.
    #[error(transparent)]
    InvalidKey(#[from] CacheKeyValidationError),
}

/// Structured description of one query, used to derive its cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryDescriptor {
    /// Paginated listing; holds the sorted canonical `(path, value)` pairs.
    Pagination(Vec<(String, String)>),
    /// Single entity lookup by scalar identifier.
    Entity(String),
}

impl QueryDescriptor {
    /// Describe a paginated listing from any serialisable parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`KeyDerivationError::Serialization`] when serialisation
    /// fails and [`KeyDerivationError::NotAnObject`] when the parameters are
    /// not a struct or map.
    ///
    /// # Examples
    ///
    /// ```
    /// use pagination::PageRequest;
    /// use product_cache::domain::QueryDescriptor;
    ///
    /// let request = PageRequest::new(1, 10).expect("valid request");
    /// let descriptor = QueryDescriptor::pagination(&request).expect("descriptor");
    /// assert_eq!(descriptor.canonical_form(), "page=1&size=10");
    /// ```
    pub fn pagination<P>(parameters: &P) -> Result<Self, KeyDerivationError>
    where
        P: Serialize + ?Sized,
    {
        let value = serde_json::to_value(parameters).map_err(|err| {
            KeyDerivationError::Serialization {
                message: err.to_string(),
            }
        })?;
        if !value.is_object() {
            return Err(KeyDerivationError::NotAnObject);
        }
        let mut pairs = Vec::new();
        flatten(None, &value, &mut pairs);
        pairs.sort();
        Ok(Self::Pagination(pairs))
    }

    /// Describe a lookup of a single entity.
    pub fn entity(id: impl fmt::Display) -> Self {
        Self::Entity(id.to_string())
    }

    /// Canonical string form: urlencoded pairs or the raw identifier.
    pub fn canonical_form(&self) -> String {
        match self {
            Self::Pagination(pairs) => url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(pairs.iter())
                .finish(),
            Self::Entity(id) => id.clone(),
        }
    }
}

fn flatten(path: Option<&str>, value: &Value, out: &mut Vec<(String, String)>) {
    let here = path.unwrap_or_default();
    match value {
        Value::Null => {}
        Value::Object(map) if map.is_empty() && path.is_some() => {
            out.push((format!("{here}{{}}"), String::new()));
        }
        Value::Object(map) => {
            for (name, nested) in map {
                let segment = escape_segment(name);
                let child = match path {
                    Some(parent) => format!("{parent}.{segment}"),
                    None => segment,
                };
                flatten(Some(child.as_str()), nested, out);
            }
        }
        Value::Array(items) if items.is_empty() => out.push((format!("{here}[]"), String::new())),
        Value::Array(items) => {
            for (index, nested) in items.iter().enumerate() {
                flatten(Some(format!("{here}[{index}]").as_str()), nested, out);
            }
        }
        Value::String(text) => out.push((here.to_owned(), text.clone())),
        scalar => out.push((here.to_owned(), scalar.to_string())),
    }
}

fn escape_segment(name: &str) -> String {
    let mut escaped = String::with_capacity(name.len());
    for c in name.chars() {
        if matches!(c, '\\' | '.' | '[' | '{') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn validate_operation(operation: &str) -> Result<(), KeyDerivationError> {
    let invalid = operation.is_empty()
        || operation
            .chars()
            .any(|c| c.is_whitespace() || c == ':');
    if invalid {
        return Err(KeyDerivationError::InvalidOperation {
            operation: operation.to_owned(),
        });
    }
    Ok(())
}

/// Derive the cache key for `operation` and `descriptor`.
///
/// Pure and deterministic: the same operation and logically equal descriptor
/// always yield the same key.
///
/// # Errors
///
/// Returns [`KeyDerivationError`] for an invalid operation prefix, an empty
/// entity identifier, or a key that fails [`CacheKey`] validation.
///
/// # Examples
///
/// ```
/// use product_cache::domain::{QueryDescriptor, derive_key};
///
/// let key = derive_key("ProductById", &QueryDescriptor::entity(42)).expect("key");
/// assert_eq!(key.as_str(), "ProductById:42");
/// ```
pub fn derive_key(
    operation: &str,
    descriptor: &QueryDescriptor,
) -> Result<CacheKey, KeyDerivationError> {
    validate_operation(operation)?;
    let suffix = match descriptor {
        QueryDescriptor::Pagination(_) => {
            hex::encode(Sha256::digest(descriptor.canonical_form().as_bytes()))
        }
        QueryDescriptor::Entity(id) if id.is_empty() => {
            return Err(KeyDerivationError::EmptyIdentifier);
        }
        QueryDescriptor::Entity(id) => id.clone(),
    };
    Ok(CacheKey::new(format!("{operation}:{suffix}"))?)
}

#[cfg(test)]
mod tests {
    //! Determinism, canonicalisation and collision coverage for key derivation.
    use std::collections::{BTreeMap, HashSet};

    use pagination::PageRequest;
    use rstest::rstest;
    use serde::Serialize;
    use serde_json::json;

    use super::*;

    fn sha256_hex(input: &str) -> String {
        hex::encode(Sha256::digest(input.as_bytes()))
    }

    #[rstest]
    fn pagination_key_hashes_canonical_query() {
        let request = PageRequest::new(1, 10).expect("valid request");
        let descriptor = QueryDescriptor::pagination(&request).expect("descriptor");
        let key = derive_key("ListX", &descriptor).expect("key");
        assert_eq!(key.as_str(), format!("ListX:{}", sha256_hex("page=1&size=10")));
    }

    #[derive(Serialize)]
    struct SizeFirst {
        size: u32,
        page: u32,
    }

    #[derive(Serialize)]
    struct PageFirst {
        page: u32,
        size: u32,
    }

    #[rstest]
    fn field_order_does_not_change_key() {
        let a = QueryDescriptor::pagination(&SizeFirst { size: 10, page: 1 }).expect("a");
        let b = QueryDescriptor::pagination(&PageFirst { page: 1, size: 10 }).expect("b");
        assert_eq!(
            derive_key("ListX", &a).expect("key a"),
            derive_key("ListX", &b).expect("key b")
        );
    }

    #[rstest]
    fn filter_insertion_order_does_not_change_key() {
        let forward = PageRequest::new(2, 20)
            .and_then(|r| r.with_filter("category", "books"))
            .and_then(|r| r.with_filter("brand", "acme"))
            .expect("valid request");
        let reversed = PageRequest::new(2, 20)
            .and_then(|r| r.with_filter("brand", "acme"))
            .and_then(|r| r.with_filter("category", "books"))
            .expect("valid request");
        let a = QueryDescriptor::pagination(&forward).expect("a");
        let b = QueryDescriptor::pagination(&reversed).expect("b");
        assert_eq!(a.canonical_form(), "filters.brand=acme&filters.category=books&page=2&size=20");
        assert_eq!(derive_key("ListProducts", &a), derive_key("ListProducts", &b));
    }

    #[rstest]
    fn filter_values_are_encoded() {
        let request = PageRequest::new(1, 10)
            .and_then(|r| r.with_filter("name", "a&size=99"))
            .expect("valid request");
        let descriptor = QueryDescriptor::pagination(&request).expect("descriptor");
        assert_eq!(
            descriptor.canonical_form(),
            "filters.name=a%26size%3D99&page=1&size=10"
        );
    }

    #[rstest]
    fn entity_key_uses_identifier_verbatim() {
        let key = derive_key("EntityById", &QueryDescriptor::entity(42)).expect("key");
        assert_eq!(key.as_str(), "EntityById:42");
    }

    #[rstest]
    fn pagination_keys_have_fixed_length() {
        let long_filter = "x".repeat(4096);
        let request = PageRequest::new(1, 10)
            .and_then(|r| r.with_filter("name", long_filter))
            .expect("valid request");
        let short = derive_key(
            "ListProducts",
            &QueryDescriptor::pagination(&PageRequest::default()).expect("descriptor"),
        )
        .expect("key");
        let long = derive_key(
            "ListProducts",
            &QueryDescriptor::pagination(&request).expect("descriptor"),
        )
        .expect("key");
        assert_eq!(short.as_str().len(), long.as_str().len());
        assert_eq!(long.as_str().len(), "ListProducts:".len() + 64);
    }

    #[rstest]
    #[case("")]
    #[case("List Products")]
    #[case("List:Products")]
    fn invalid_operations_are_rejected(#[case] operation: &str) {
        let err = derive_key(operation, &QueryDescriptor::entity(1)).expect_err("invalid op");
        assert!(matches!(err, KeyDerivationError::InvalidOperation { .. }));
    }

    #[rstest]
    fn empty_identifier_is_rejected() {
        let err = derive_key("ProductById", &QueryDescriptor::entity("")).expect_err("empty id");
        assert_eq!(err, KeyDerivationError::EmptyIdentifier);
    }

    #[rstest]
    fn whitespace_identifier_is_rejected() {
        let err = derive_key("ProductById", &QueryDescriptor::entity("4 2")).expect_err("ws id");
        assert_eq!(
            err,
            KeyDerivationError::InvalidKey(CacheKeyValidationError::ContainsWhitespace)
        );
    }

    #[rstest]
    fn non_object_descriptor_is_rejected() {
        let err = QueryDescriptor::pagination(&vec![1, 2]).expect_err("array rejected");
        assert_eq!(err, KeyDerivationError::NotAnObject);
    }

    #[rstest]
    fn unserialisable_descriptor_is_rejected() {
        let mut map = BTreeMap::new();
        map.insert(vec![1_u8], 1_u32);
        let err = QueryDescriptor::pagination(&map).expect_err("non-string keys rejected");
        assert!(matches!(err, KeyDerivationError::Serialization { .. }));
    }

    #[derive(Serialize)]
    struct Nested {
        page: u32,
        tags: Vec<&'static str>,
        cursor: Option<String>,
    }

    #[rstest]
    fn arrays_and_nulls_flatten_predictably() {
        let descriptor = QueryDescriptor::pagination(&Nested {
            page: 3,
            tags: vec!["red", "blue"],
            cursor: None,
        })
        .expect("descriptor");
        assert_eq!(
            descriptor.canonical_form(),
            "page=3&tags%5B0%5D=red&tags%5B1%5D=blue"
        );
    }

    #[rstest]
    #[case::dotted_name_vs_nested_object(
        json!({"page": 1, "filters": {"a.b": "x"}}),
        json!({"page": 1, "filters": {"a": {"b": "x"}}})
    )]
    #[case::array_vs_index_keyed_object(
        json!({"page": 1, "tags": ["x"]}),
        json!({"page": 1, "tags": {"0": "x"}})
    )]
    #[case::bracketed_name_vs_array(
        json!({"page": 1, "tags[0]": "x"}),
        json!({"page": 1, "tags": ["x"]})
    )]
    #[case::empty_array_vs_absent(json!({"page": 1, "tags": []}), json!({"page": 1}))]
    #[case::empty_object_vs_absent(json!({"page": 1, "filters": {}}), json!({"page": 1}))]
    #[case::empty_array_vs_empty_object(
        json!({"page": 1, "tags": []}),
        json!({"page": 1, "tags": {}})
    )]
    #[case::empty_top_level_name_vs_flat(
        json!({"page": 1, "": {"size": 2}}),
        json!({"page": 1, "size": 2})
    )]
    #[case::empty_array_vs_bracket_string(
        json!({"page": 1, "tags": []}),
        json!({"page": 1, "tags[]": ""})
    )]
    fn structurally_distinct_descriptors_get_distinct_keys(
        #[case] left: serde_json::Value,
        #[case] right: serde_json::Value,
    ) {
        let left_descriptor = QueryDescriptor::pagination(&left).expect("left descriptor");
        let right_descriptor = QueryDescriptor::pagination(&right).expect("right descriptor");
        assert_ne!(
            left_descriptor.canonical_form(),
            right_descriptor.canonical_form()
        );
        assert_ne!(
            derive_key("ListX", &left_descriptor).expect("left key"),
            derive_key("ListX", &right_descriptor).expect("right key")
        );
    }

    #[rstest]
    fn escaped_names_are_stable() {
        let descriptor =
            QueryDescriptor::pagination(&json!({"filters": {"a.b": "x", "c\\": "y"}}))
                .expect("descriptor");
        assert_eq!(
            descriptor.canonical_form(),
            "filters.a%5C.b=x&filters.c%5C%5C=y"
        );
    }

    #[rstest]
    fn ten_thousand_descriptors_do_not_collide() {
        let mut keys = HashSet::new();
        let mut count = 0_usize;
        for page in 1..=100_u32 {
            for size in 1..=100_u32 {
                let mut request = PageRequest::new(page, size).expect("valid request");
                if size % 3 == 0 {
                    request = request
                        .with_filter("category", format!("c{}", page % 7))
                        .expect("valid filter");
                }
                let descriptor = QueryDescriptor::pagination(&request).expect("descriptor");
                keys.insert(derive_key("ListProducts", &descriptor).expect("key"));
                count += 1;
            }
        }
        assert_eq!(count, 10_000);
        assert_eq!(keys.len(), count);
    }
}
