use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// server-side metadata for one stored sample
///
/// only the fields the client acts on are typed; everything else the server
/// returns is kept in `extra` untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireRecord")]
pub struct FileRecord {
    /// content hash as reported by the server
    #[serde(rename = "md5")]
    pub hash: String,
    /// free-text comment
    pub comment: String,
    /// comma-delimited tag list
    pub tags: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// decoding shape of a record; a `hash` key stays in `extra`
#[derive(Deserialize)]
struct WireRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    md5: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    comment: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    tags: String,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl From<WireRecord> for FileRecord {
    fn from(wire: WireRecord) -> Self {
        // fall back to `hash` when `md5` is absent
        let hash = if wire.md5.is_empty() {
            wire.extra
                .get("hash")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        } else {
            wire.md5
        };
        Self {
            hash,
            comment: wire.comment,
            tags: wire.tags,
            extra: wire.extra,
        }
    }
}

impl FileRecord {
    /// individual tags, trimmed, empty entries skipped
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// existing tags with `more` appended after a comma
    ///
    /// the comma is written even when there are no tags yet.
    pub fn merged_tags(&self, more: &str) -> String {
        format!("{},{}", self.tags, more)
    }

    /// existing comment with `more` appended on a new line
    pub fn merged_comment(&self, more: &str) -> String {
        format!("{}\n{}", self.comment, more)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// body of a `getfile` response
#[derive(Clone, Debug, Deserialize)]
pub(crate) struct FileEnvelope {
    pub file: FileRecord,
}

/// one page of a `getfiles` listing
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Page {
    #[serde(default, deserialize_with = "null_as_empty_vec")]
    pub files: Vec<FileRecord>,
}

impl Page {
    /// an empty page ends a listing
    pub fn is_last(&self) -> bool {
        self.files.is_empty()
    }
}

fn null_as_empty_vec<'de, D>(deserializer: D) -> Result<Vec<FileRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<FileRecord>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_decode() {
        let record: FileRecord = serde_json::from_value(json!({
            "md5": "5d41402abc4b2a76b9719d911017c592",
            "comment": "dropper",
            "tags": "x,y",
            "size": 5,
            "vendor": "emotet"
        }))
        .unwrap();

        assert_eq!(record.hash, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(record.comment, "dropper");
        assert_eq!(record.tags, "x,y");
        assert_eq!(record.extra.get("size"), Some(&json!(5)));
        assert_eq!(record.extra.get("vendor"), Some(&json!("emotet")));
    }

    #[test]
    fn test_record_decode_missing_and_null_fields() {
        let record: FileRecord =
            serde_json::from_value(json!({ "hash": "abc", "comment": null })).unwrap();
        assert_eq!(record.hash, "abc");
        assert_eq!(record.comment, "");
        assert_eq!(record.tags, "");
        assert_eq!(record.extra.len(), 1);
    }

    #[test]
    fn test_record_decode_md5_and_hash_keys() {
        let record: FileRecord = serde_json::from_value(json!({
            "md5": "5d41402abc4b2a76b9719d911017c592",
            "hash": "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            "tags": "x"
        }))
        .unwrap();
        assert_eq!(record.hash, "5d41402abc4b2a76b9719d911017c592");
        assert_eq!(record.tags, "x");
        assert_eq!(
            record.extra.get("hash"),
            Some(&json!("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"))
        );
    }

    #[test]
    fn test_record_serializes_md5() {
        let record = FileRecord {
            hash: "abc".to_string(),
            ..Default::default()
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["md5"], "abc");
        assert!(value.get("hash").is_none());
    }

    #[test]
    fn test_tag_list() {
        let record = FileRecord {
            tags: "x, y,,z ".to_string(),
            ..Default::default()
        };
        assert_eq!(record.tag_list(), ["x", "y", "z"]);
    }

    #[test]
    fn test_merge() {
        let record = FileRecord {
            tags: "x,y".to_string(),
            comment: "first".to_string(),
            ..Default::default()
        };
        assert_eq!(record.merged_tags("newtag"), "x,y,newtag");
        assert_eq!(record.merged_comment("second"), "first\nsecond");

        let blank = FileRecord::default();
        assert_eq!(blank.merged_tags("newtag"), ",newtag");
        assert_eq!(blank.merged_comment("note"), "\nnote");
    }

    #[test]
    fn test_page_decode() {
        let page: Page = serde_json::from_value(json!({
            "files": [{ "md5": "a" }, { "md5": "b" }]
        }))
        .unwrap();
        assert_eq!(page.files.len(), 2);
        assert!(!page.is_last());

        let empty: Page = serde_json::from_value(json!({ "files": [] })).unwrap();
        assert!(empty.is_last());

        let missing: Page = serde_json::from_value(json!({ "status": "ok" })).unwrap();
        assert!(missing.is_last());

        let null: Page = serde_json::from_value(json!({ "files": null })).unwrap();
        assert!(null.is_last());
    }
}
