//! Remote metadata fetcher.
//!
//! The service answers `GET getMetadataFields.json?type=<key>` with a JSON
//! array of field records. Records are returned in service order.

use serde::{Deserialize, Deserializer, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;

use reqwest::blocking::Client;
use tracing::debug;

use crate::config::Settings;
use crate::error::{MetadataError, Result};

/// One documented data column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataField {
    #[serde(rename = "seq_num", deserialize_with = "de_seq_num")]
    pub sequence_number: i64,
    pub field_name: String,
    pub field_description: String,
    /// Allowed values as free text; `null` on the wire becomes empty.
    #[serde(deserialize_with = "de_nullable_string")]
    pub controlled_values: String,
}

/// Anything that can produce the field list for a metadata type.
pub trait MetadataSource {
    fn fetch_fields(&self, type_key: &str) -> Result<Vec<MetadataField>>;
}

/// Decode a response body into field records.
pub fn decode_fields(type_key: &str, body: &str) -> Result<Vec<MetadataField>> {
    serde_json::from_str(body).map_err(|source| MetadataError::Decode {
        type_key: type_key.to_string(),
        source,
    })
}

/// Blocking HTTP client for the metadata service.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    endpoint: String,
}

impl HttpSource {
    /// Build a client for the endpoint and timeout in `settings`.
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .user_agent(concat!("npn-metadata/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|source| MetadataError::Fetch {
                type_key: "(client setup)".to_string(),
                source,
            })?;
        Ok(Self {
            client,
            endpoint: settings.endpoint(),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl MetadataSource for HttpSource {
    fn fetch_fields(&self, type_key: &str) -> Result<Vec<MetadataField>> {
        debug!(endpoint = %self.endpoint, type_key, "fetching metadata fields");
        let fetch_err = |source: reqwest::Error| MetadataError::Fetch {
            type_key: type_key.to_string(),
            source,
        };

        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("type", type_key)])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .and_then(reqwest::blocking::Response::text)
            .map_err(fetch_err)?;

        let fields = decode_fields(type_key, &body)?;
        debug!(type_key, fields = fields.len(), "decoded metadata fields");
        Ok(fields)
    }
}

/// Memoizes one fetch per type key.
///
/// A category appears in both the composite and its dedicated workbook;
/// both sheets are rendered from the same response.
#[derive(Debug)]
pub struct CachedSource<S> {
    inner: S,
    cache: RefCell<HashMap<String, Vec<MetadataField>>>,
}

impl<S: MetadataSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct type keys fetched so far.
    pub fn cached_types(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: MetadataSource> MetadataSource for CachedSource<S> {
    fn fetch_fields(&self, type_key: &str) -> Result<Vec<MetadataField>> {
        if let Some(hit) = self.cache.borrow().get(type_key) {
            debug!(type_key, "metadata cache hit");
            return Ok(hit.clone());
        }
        let fields = self.inner.fetch_fields(type_key)?;
        self.cache
            .borrow_mut()
            .insert(type_key.to_string(), fields.clone());
        Ok(fields)
    }
}

impl<S: MetadataSource + ?Sized> MetadataSource for &S {
    fn fetch_fields(&self, type_key: &str) -> Result<Vec<MetadataField>> {
        (**self).fetch_fields(type_key)
    }
}

fn de_seq_num<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeqNum {
        Int(i64),
        Text(String),
    }

    match SeqNum::deserialize(deserializer)? {
        SeqNum::Int(n) => Ok(n),
        SeqNum::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("seq_num {s:?} is not an integer"))),
    }
}

fn de_nullable_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn decodes_records_in_service_order() {
        let body = r#"[
            {"seq_num": 2, "field_name": "Year", "field_description": "Observation year", "controlled_values": ""},
            {"seq_num": "1", "field_name": "Site_ID", "field_description": "Site id", "controlled_values": null}
        ]"#;
        let fields = decode_fields("raw", body).unwrap();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].sequence_number, 2);
        assert_eq!(fields[0].field_name, "Year");
        assert_eq!(fields[1].sequence_number, 1);
        assert_eq!(fields[1].controlled_values, "");
    }

    #[test]
    fn empty_array_is_no_fields() {
        assert!(decode_fields("raw", "[]").unwrap().is_empty());
    }

    #[test]
    fn missing_field_is_a_decode_error() {
        let body = r#"[{"seq_num": 1, "field_name": "Year", "controlled_values": ""}]"#;
        let err = decode_fields("raw", body).unwrap_err();
        assert!(err.is_fetch());
        assert!(matches!(err, MetadataError::Decode { ref type_key, .. } if type_key == "raw"));
    }

    #[test]
    fn non_json_is_a_decode_error() {
        let err = decode_fields("site_summarized", "<html>502</html>").unwrap_err();
        assert!(matches!(err, MetadataError::Decode { .. }));
    }

    #[test]
    fn non_numeric_seq_num_is_rejected() {
        let body = r#"[{"seq_num": "abc", "field_name": "a", "field_description": "b", "controlled_values": ""}]"#;
        assert!(decode_fields("raw", body).is_err());
    }

    struct Counting {
        calls: Cell<usize>,
    }

    impl MetadataSource for Counting {
        fn fetch_fields(&self, type_key: &str) -> Result<Vec<MetadataField>> {
            self.calls.set(self.calls.get() + 1);
            Ok(vec![MetadataField {
                sequence_number: 1,
                field_name: type_key.to_string(),
                field_description: String::new(),
                controlled_values: String::new(),
            }])
        }
    }

    #[test]
    fn cached_source_fetches_each_type_once() {
        let cached = CachedSource::new(Counting {
            calls: Cell::new(0),
        });
        let first = cached.fetch_fields("raw").unwrap();
        let second = cached.fetch_fields("raw").unwrap();
        cached.fetch_fields("magnitude").unwrap();
        assert_eq!(first, second);
        assert_eq!(cached.cached_types(), 2);
        assert_eq!(cached.into_inner().calls.get(), 2);
    }
}
