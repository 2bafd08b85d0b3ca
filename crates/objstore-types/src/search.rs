use std::collections::BTreeMap;

/// One hit returned by a search.
///
/// A hit either carries its value (`body`, `labels`, `fields_json`) or,
/// when that single result could not be resolved, a pre-serialized
/// `error_json` explaining why. One failing hit never fails the search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObjectSearchResult {
    /// Always emitted, even when empty.
    pub uid: String,
    pub kind: String,
    pub name: String,
    pub description: String,
    /// Unix milliseconds.
    pub updated: i64,
    pub updated_by: String,
    pub body: Vec<u8>,
    /// `None` leaves `labels` out; an empty map is still written.
    pub labels: Option<BTreeMap<String, String>>,
    /// JSON text describing a per-hit failure. Spliced verbatim.
    pub error_json: Vec<u8>,
    /// JSON text holding extracted fields. Spliced verbatim.
    pub fields_json: Vec<u8>,
}

impl ObjectSearchResult {
    pub fn new(uid: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            kind: kind.into(),
            ..Default::default()
        }
    }

    pub fn is_error(&self) -> bool {
        !self.error_json.is_empty()
    }

    /// Turn this hit into an error slot: value fields are dropped, the
    /// identifying metadata is kept.
    pub fn into_error(self, error_json: Vec<u8>) -> Self {
        Self {
            uid: self.uid,
            kind: self.kind,
            error_json,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_error_drops_value_fields() {
        let mut hit = ObjectSearchResult::new("d1", "dashboard");
        hit.name = "Main".into();
        hit.body = b"{}".to_vec();
        hit.fields_json = b"{\"panels\":3}".to_vec();
        hit.labels = Some(BTreeMap::from([("team".to_string(), "a".to_string())]));

        let failed = hit.into_error(b"{\"code\":403}".to_vec());
        assert!(failed.is_error());
        assert_eq!(failed.uid, "d1");
        assert_eq!(failed.kind, "dashboard");
        assert!(failed.body.is_empty());
        assert!(failed.fields_json.is_empty());
        assert!(failed.labels.is_none());
        assert!(failed.name.is_empty());
    }
}
