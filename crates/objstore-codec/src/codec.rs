use std::io::Write;

use objstore_types::{ObjectSearchResult, RawObject, ReadObjectResponse, WriteObjectResponse};

use crate::decode;
use crate::encode::WireEncode;
use crate::error::CodecResult;
use crate::stream::JsonStream;

/// Entry points for encoding records to, and decoding them from, the wire.
pub struct ObjectCodec;

impl ObjectCodec {
    /// Encode one record into a fresh buffer.
    pub fn encode<T: WireEncode + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
        let mut stream = JsonStream::new(Vec::with_capacity(256));
        value.encode(&mut stream)?;
        stream.into_inner()
    }

    /// Encode one record and hand the finished document to `writer`.
    ///
    /// The document is built completely before the first byte reaches the
    /// writer, so an encoding failure never leaves a partial document
    /// behind. A write failure is returned as-is.
    pub fn encode_into<T, W>(value: &T, mut writer: W) -> CodecResult<()>
    where
        T: WireEncode + ?Sized,
        W: Write,
    {
        let buf = Self::encode(value)?;
        writer.write_all(&buf)?;
        writer.flush()?;
        Ok(())
    }

    pub fn decode_raw_object(data: &[u8]) -> CodecResult<RawObject> {
        decode::decode_raw_object(data)
    }

    pub fn decode_search_result(data: &[u8]) -> CodecResult<ObjectSearchResult> {
        decode::decode_search_result(data)
    }

    pub fn decode_read_response(data: &[u8]) -> CodecResult<ReadObjectResponse> {
        decode::decode_read_response(data)
    }

    pub fn decode_write_response(data: &[u8]) -> CodecResult<WriteObjectResponse> {
        decode::decode_write_response(data)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::error::CodecError;
    use objstore_types::*;
    use proptest::prelude::*;
    use serde_json::Value;

    fn encode_str<T: WireEncode>(value: &T) -> String {
        String::from_utf8(ObjectCodec::encode(value).unwrap()).unwrap()
    }

    fn full_object() -> RawObject {
        RawObject {
            uid: "d1".into(),
            kind: "dashboard".into(),
            version: "3".into(),
            created: 1000,
            updated: 2000,
            created_by: "user:1".into(),
            updated_by: "user:2".into(),
            body: br#"{"a":1}"#.to_vec(),
            etag: "abc".into(),
            size: 7,
            sync: Some(RawObjectSyncInfo {
                source: "provisioning".into(),
                time: 5,
            }),
        }
    }

    // -----------------------------------------------------------------------
    // RawObject layout
    // -----------------------------------------------------------------------

    #[test]
    fn raw_object_full_layout() {
        assert_eq!(
            encode_str(&full_object()),
            concat!(
                r#"{"UID":"d1","kind":"dashboard","version":"3","updated":2000,"#,
                r#""updatedBy":"user:2","created":1000,"createdBy":"user:1","#,
                r#""body":{"a":1},"etag":"abc","size":7,"#,
                r#""sync":{"source":"provisioning","time":5}}"#
            )
        );
    }

    #[test]
    fn raw_object_empty_keeps_uid_only() {
        assert_eq!(encode_str(&RawObject::default()), r#"{"UID":""}"#);
    }

    #[test]
    fn raw_object_sparse_has_no_stray_separators() {
        let obj = RawObject {
            uid: "x".into(),
            created_by: "me".into(),
            size: 3,
            ..Default::default()
        };
        assert_eq!(encode_str(&obj), r#"{"UID":"x","createdBy":"me","size":3}"#);
    }

    #[test]
    fn raw_object_binary_body_uses_base64() {
        let obj = RawObject::new("b", "blob").with_body(vec![0xFF, 0x00, 0x10]);
        let out = encode_str(&obj);
        assert_eq!(out, r#"{"UID":"b","kind":"blob","body_base64":"/wAQ","size":3}"#);
        assert!(!out.contains(r#""body":"#));
    }

    #[test]
    fn raw_object_json_body_spliced_verbatim() {
        let body = br#"{ "nested": [1, "two", null] }"#;
        let obj = RawObject::new("j", "").with_body(body.to_vec());
        let out = encode_str(&obj);
        assert!(out.contains(r#""body":{ "nested": [1, "two", null] }"#));
        assert!(!out.contains("body_base64"));
    }

    #[test]
    fn raw_object_json_string_body_not_requoted() {
        let obj = RawObject::new("s", "").with_body(br#""hello""#.to_vec());
        assert_eq!(encode_str(&obj), r#"{"UID":"s","body":"hello","size":7}"#);
    }

    #[test]
    fn raw_object_empty_sync_is_still_written() {
        let obj = RawObject {
            uid: "x".into(),
            sync: Some(RawObjectSyncInfo::default()),
            ..Default::default()
        };
        assert_eq!(encode_str(&obj), r#"{"UID":"x","sync":{}}"#);
    }

    #[test]
    fn raw_object_negative_timestamp_is_present() {
        let obj = RawObject {
            uid: "x".into(),
            updated: -1,
            ..Default::default()
        };
        assert_eq!(encode_str(&obj), r#"{"UID":"x","updated":-1}"#);
    }

    // -----------------------------------------------------------------------
    // ObjectSearchResult layout
    // -----------------------------------------------------------------------

    #[test]
    fn search_result_full_layout() {
        let hit = ObjectSearchResult {
            uid: "d1".into(),
            kind: "dashboard".into(),
            name: "Main".into(),
            description: "Top".into(),
            updated: 9,
            updated_by: "u".into(),
            body: b"[1]".to_vec(),
            labels: Some(BTreeMap::from([
                ("team".to_string(), "a".to_string()),
                ("env".to_string(), "prod".to_string()),
            ])),
            error_json: Vec::new(),
            fields_json: br#"{"panels":2}"#.to_vec(),
        };
        assert_eq!(
            encode_str(&hit),
            concat!(
                r#"{"UID":"d1","kind":"dashboard","name":"Main","description":"Top","#,
                r#""updated":9,"updatedBy":"u","body":[1],"#,
                r#""labels":{"env":"prod","team":"a"},"fields":{"panels":2}}"#
            )
        );
    }

    #[test]
    fn search_result_error_slot() {
        let hit = ObjectSearchResult::new("d2", "dashboard")
            .into_error(br#"{"code":403,"message":"denied"}"#.to_vec());
        assert_eq!(
            encode_str(&hit),
            r#"{"UID":"d2","kind":"dashboard","error":{"code":403,"message":"denied"}}"#
        );
    }

    #[test]
    fn search_result_empty_labels_map_is_written() {
        let hit = ObjectSearchResult {
            uid: "x".into(),
            labels: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert_eq!(encode_str(&hit), r#"{"UID":"x","labels":{}}"#);
    }

    // -----------------------------------------------------------------------
    // Response layouts
    // -----------------------------------------------------------------------

    #[test]
    fn read_response_without_object_writes_null() {
        assert_eq!(encode_str(&ReadObjectResponse::default()), r#"{"object":null}"#);
    }

    #[test]
    fn read_response_with_summary() {
        let resp = ReadObjectResponse {
            object: Some(RawObject::new("a", "k")),
            summary_json: br#"{"name":"A"}"#.to_vec(),
        };
        assert_eq!(
            encode_str(&resp),
            r#"{"object":{"UID":"a","kind":"k"},"summary":{"name":"A"}}"#
        );
    }

    #[test]
    fn write_response_status_is_a_name() {
        let resp = WriteObjectResponse {
            status: WriteStatus::Created,
            object: Some(RawObject::new("a", "k")),
            ..Default::default()
        };
        assert_eq!(
            encode_str(&resp),
            r#"{"status":"created","object":{"UID":"a","kind":"k"}}"#
        );
    }

    #[test]
    fn write_response_conflict_layout() {
        let current = RawObject {
            uid: "a".into(),
            version: "2".into(),
            etag: "new".into(),
            ..Default::default()
        };
        let resp =
            WriteObjectResponse::conflict(current, ObjectErrorInfo::new(409, "etag mismatch"));
        assert_eq!(
            encode_str(&resp),
            concat!(
                r#"{"status":"conflict","error":{"code":409,"message":"etag mismatch"},"#,
                r#""object":{"UID":"a","version":"2","etag":"new"}}"#
            )
        );
    }

    #[test]
    fn error_info_details_raw() {
        let err = ObjectErrorInfo::new(400, "bad").with_details(br#"{"field":"UID"}"#.to_vec());
        assert_eq!(
            encode_str(&err),
            r#"{"code":400,"message":"bad","details":{"field":"UID"}}"#
        );
    }

    #[test]
    fn batch_read_layout() {
        let resp = BatchReadObjectResponse {
            results: vec![
                BatchReadResult::Found(ReadObjectResponse::new(RawObject::new("a", "k"))),
                BatchReadResult::Failed(ObjectErrorInfo::new(404, "not found")),
            ],
        };
        assert_eq!(
            encode_str(&resp),
            concat!(
                r#"{"results":[{"object":{"UID":"a","kind":"k"}},"#,
                r#"{"object":null,"error":{"code":404,"message":"not found"}}]}"#
            )
        );
    }

    #[test]
    fn delete_layout() {
        let resp = DeleteObjectResponse::with_status(DeleteStatus::NotFound);
        assert_eq!(encode_str(&resp), r#"{"status":"not_found"}"#);
    }

    #[test]
    fn history_layout() {
        let resp = ObjectHistoryResponse {
            uid: "a".into(),
            kind: "k".into(),
            versions: vec![
                ObjectVersionInfo {
                    version: "2".into(),
                    updated: 20,
                    updated_by: "u".into(),
                    size: 4,
                    etag: "e2".into(),
                    comment: "fix".into(),
                },
                ObjectVersionInfo {
                    version: "1".into(),
                    ..Default::default()
                },
            ],
            next_page_token: "2".into(),
        };
        assert_eq!(
            encode_str(&resp),
            concat!(
                r#"{"UID":"a","kind":"k","versions":[{"version":"2","updated":20,"#,
                r#""updated_by":"u","size":4,"etag":"e2","comment":"fix"},"#,
                r#"{"version":"1"}],"next_page_token":"2"}"#
            )
        );
    }

    #[test]
    fn search_response_empty() {
        assert_eq!(encode_str(&ObjectSearchResponse::default()), r#"{"results":[]}"#);
    }

    #[test]
    fn encode_into_writer() {
        let mut out = Vec::new();
        ObjectCodec::encode_into(&RawObject::new("a", ""), &mut out).unwrap();
        assert_eq!(out, br#"{"UID":"a"}"#);
    }

    #[test]
    fn encode_into_closed_writer_fails() {
        struct Closed;
        impl Write for Closed {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }
        let err = ObjectCodec::encode_into(&full_object(), Closed).unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }

    // -----------------------------------------------------------------------
    // Decoding
    // -----------------------------------------------------------------------

    #[test]
    fn decode_full_object_roundtrip() {
        let obj = full_object();
        let decoded = ObjectCodec::decode_raw_object(&ObjectCodec::encode(&obj).unwrap()).unwrap();
        assert_eq!(decoded, obj);
    }

    #[test]
    fn decode_requires_uid() {
        assert!(ObjectCodec::decode_raw_object(br#"{"kind":"k"}"#).is_err());
    }

    #[test]
    fn decode_rejects_both_bodies() {
        let err = ObjectCodec::decode_raw_object(br#"{"UID":"a","body":1,"body_base64":"AQ=="}"#)
            .unwrap_err();
        assert!(matches!(err, CodecError::InvalidField { field: "body", .. }));
    }

    #[test]
    fn decode_write_response_roundtrip() {
        let resp = WriteObjectResponse {
            status: WriteStatus::Updated,
            error: None,
            object: Some(full_object()),
            summary_json: br#"{"name":"x"}"#.to_vec(),
        };
        let decoded =
            ObjectCodec::decode_write_response(&ObjectCodec::encode(&resp).unwrap()).unwrap();
        assert_eq!(decoded, resp);
    }

    #[test]
    fn decode_write_response_unknown_status() {
        assert!(ObjectCodec::decode_write_response(br#"{"status":"CREATED"}"#).is_err());
    }

    #[test]
    fn decode_read_response_null_object() {
        let decoded = ObjectCodec::decode_read_response(br#"{"object":null}"#).unwrap();
        assert_eq!(decoded, ReadObjectResponse::default());
    }

    #[test]
    fn decode_search_result_roundtrip() {
        let hit = ObjectSearchResult {
            uid: "h".into(),
            kind: "k".into(),
            body: vec![0, 1, 2, 250],
            labels: Some(BTreeMap::from([("a".to_string(), String::new())])),
            fields_json: b"[true]".to_vec(),
            ..Default::default()
        };
        let decoded =
            ObjectCodec::decode_search_result(&ObjectCodec::encode(&hit).unwrap()).unwrap();
        assert_eq!(decoded, hit);
    }

    #[test]
    fn literal_bodies_round_trip() {
        for body in [&b"null"[..], b"true", b"false", b"0"] {
            let obj = RawObject::new("n", "k").with_body(body);
            let out = ObjectCodec::encode(&obj).unwrap();
            let decoded = ObjectCodec::decode_raw_object(&out).unwrap();
            assert_eq!(decoded.body, body, "{}", String::from_utf8_lossy(&out));
        }
    }

    #[test]
    fn null_raw_slots_decode_as_null() {
        let read =
            ObjectCodec::decode_read_response(br#"{"object":null,"summary":null}"#).unwrap();
        assert_eq!(read.summary_json, b"null");

        let hit = ObjectCodec::decode_search_result(
            br#"{"UID":"h","body":null,"error":null,"fields":null}"#,
        )
        .unwrap();
        assert_eq!(hit.body, b"null");
        assert_eq!(hit.error_json, b"null");
        assert_eq!(hit.fields_json, b"null");

        let write = ObjectCodec::decode_write_response(
            br#"{"status":"error","error":{"code":1,"details":null}}"#,
        )
        .unwrap();
        assert_eq!(write.error.unwrap().details_json, b"null");
    }

    #[test]
    fn missing_raw_slots_stay_empty() {
        let hit = ObjectCodec::decode_search_result(br#"{"UID":"h"}"#).unwrap();
        assert!(hit.body.is_empty());
        assert!(hit.error_json.is_empty());
        assert!(hit.fields_json.is_empty());
    }

    // -----------------------------------------------------------------------
    // Properties
    // -----------------------------------------------------------------------

    fn body_strategy() -> impl Strategy<Value = Vec<u8>> {
        prop_oneof![
            Just(Vec::new()),
            Just(b"null".to_vec()),
            Just(b"true".to_vec()),
            Just(b"false".to_vec()),
            prop::collection::vec(any::<u8>(), 1..48),
            "[a-z]{1,8}".prop_map(|k| format!(r#"{{"{k}":[1,true,null,"v"]}}"#).into_bytes()),
            any::<i64>().prop_map(|n| n.to_string().into_bytes()),
            ".{0,16}".prop_map(|s| serde_json::to_vec(&s).unwrap()),
        ]
    }

    fn raw_object_strategy() -> impl Strategy<Value = RawObject> {
        (
            (".{0,12}", "[a-z]{0,8}", "[0-9]{0,3}", any::<i64>(), any::<i64>()),
            (".{0,12}", ".{0,12}", body_strategy(), "[0-9a-f]{0,16}", any::<i64>()),
            prop::option::of(("[a-z/]{0,12}", any::<i64>())),
        )
            .prop_map(
                |(
                    (uid, kind, version, created, updated),
                    (created_by, updated_by, body, etag, size),
                    sync,
                )| RawObject {
                    uid,
                    kind,
                    version,
                    created,
                    updated,
                    created_by,
                    updated_by,
                    body,
                    etag,
                    size,
                    sync: sync.map(|(source, time)| RawObjectSyncInfo { source, time }),
                },
            )
    }

    proptest! {
        #[test]
        fn field_present_iff_non_zero(obj in raw_object_strategy()) {
            let out = ObjectCodec::encode(&obj).unwrap();
            let value: Value = serde_json::from_slice(&out).unwrap();
            let map = value.as_object().unwrap();

            prop_assert!(map.contains_key("UID"));
            prop_assert_eq!(map.contains_key("kind"), !obj.kind.is_empty());
            prop_assert_eq!(map.contains_key("version"), !obj.version.is_empty());
            prop_assert_eq!(map.contains_key("created"), obj.created != 0);
            prop_assert_eq!(map.contains_key("updated"), obj.updated != 0);
            prop_assert_eq!(map.contains_key("createdBy"), !obj.created_by.is_empty());
            prop_assert_eq!(map.contains_key("updatedBy"), !obj.updated_by.is_empty());
            prop_assert_eq!(map.contains_key("etag"), !obj.etag.is_empty());
            prop_assert_eq!(map.contains_key("size"), obj.size != 0);
            prop_assert_eq!(map.contains_key("sync"), obj.sync.is_some());

            let json_body = !obj.body.is_empty() && crate::body::is_valid_json(&obj.body);
            let b64_body = !obj.body.is_empty() && !json_body;
            prop_assert_eq!(map.contains_key("body"), json_body);
            prop_assert_eq!(map.contains_key("body_base64"), b64_body);
        }

        #[test]
        fn raw_object_roundtrip(obj in raw_object_strategy()) {
            // Whitespace around an embedded body is not part of the value.
            prop_assume!(
                !crate::body::is_valid_json(&obj.body)
                    || obj.body.trim_ascii() == obj.body.as_slice()
            );
            let out = ObjectCodec::encode(&obj).unwrap();
            let decoded = ObjectCodec::decode_raw_object(&out).unwrap();
            prop_assert_eq!(decoded, obj);
        }

        #[test]
        fn write_status_never_numeric(idx in 0usize..5) {
            let status = [
                WriteStatus::Error,
                WriteStatus::Created,
                WriteStatus::Updated,
                WriteStatus::Unchanged,
                WriteStatus::Conflict,
            ][idx];
            let resp = WriteObjectResponse { status, ..Default::default() };
            let out = ObjectCodec::encode(&resp).unwrap();
            let value: Value = serde_json::from_slice(&out).unwrap();
            prop_assert_eq!(value["status"].as_str(), Some(status.as_str()));
        }
    }
}
