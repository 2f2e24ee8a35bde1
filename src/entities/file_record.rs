use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A file attached to a routing operation or work order operation.
///
/// Stored inline as part of the owner's `attachments` JSON column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<Uuid>,
}

/// Ordered attachment list persisted as a single JSON array
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(transparent)]
pub struct FileRecordList(pub Vec<FileRecord>);

impl FileRecordList {
    /// Returns a copy with `record` appended.
    pub fn with_added(&self, record: FileRecord) -> Self {
        let mut files = self.0.clone();
        files.push(record);
        Self(files)
    }

    /// Returns a copy without any record whose id is `file_id`.
    /// Unknown ids leave the list unchanged.
    pub fn without(&self, file_id: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|f| f.id != file_id)
                .cloned()
                .collect(),
        )
    }

    pub fn into_inner(self) -> Vec<FileRecord> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: format!("{id}.pdf"),
            url: format!("/api/files/download/{id}"),
            size: Some(1024),
            mime_type: Some("application/pdf".into()),
            uploaded_at: Utc::now(),
            uploaded_by: None,
        }
    }

    #[test]
    fn add_keeps_insertion_order() {
        let list = FileRecordList::default()
            .with_added(record("a"))
            .with_added(record("b"));
        let ids: Vec<_> = list.0.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn removing_unknown_id_is_a_no_op() {
        let list = FileRecordList(vec![record("a"), record("b")]);
        assert_eq!(list.without("zzz"), list);
        assert_eq!(list.without("a").0.len(), 1);
    }

    #[test]
    fn serializes_with_camel_case_and_omits_empty_optionals() {
        let mut rec = record("x");
        rec.size = None;
        rec.mime_type = None;
        let json = serde_json::to_value(&rec).unwrap();
        assert!(json.get("uploadedAt").is_some());
        assert!(json.get("mimeType").is_none());
        assert!(json.get("size").is_none());
    }
}
