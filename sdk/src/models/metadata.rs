use {
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
};

/// Response headers of a `HEAD` request for a blob. Header names are
/// lower-cased.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct BlobMetadata {
    pub headers: BTreeMap<String, String>,
}

impl BlobMetadata {
    pub fn new(headers: BTreeMap<String, String>) -> Self {
        Self {
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value))
                .collect(),
        }
    }

    /// Look up a header by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn content_length(&self) -> Option<u64> {
        self.get("content-length")?.parse().ok()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get("content-type")
    }

    pub fn etag(&self) -> Option<&str> {
        self.get("etag")
    }
}
