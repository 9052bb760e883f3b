use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Metadata of one uploaded document. The raw bytes live on disk under
/// [`Document::stored_name`]; only the numeric id is referenced from
/// application drafts.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: i32,
    pub applicant_id: String,
    /// Original file name, sanitized.
    pub file_name: String,
    /// Storage name embedding the id: `<id>_<file_name>`.
    pub stored_name: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: NaiveDateTime,
}

/// Raw upload handed to the document gateway: original name, declared type,
/// and the file bytes.
#[derive(Clone, Debug)]
pub struct DocumentUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Debug)]
pub struct NewDocument {
    pub applicant_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
}

impl NewDocument {
    pub fn new(
        applicant_id: impl Into<String>,
        file_name: &str,
        content_type: impl Into<String>,
        size_bytes: i64,
    ) -> Self {
        Self {
            applicant_id: applicant_id.into(),
            file_name: sanitize_file_name(file_name),
            content_type: content_type.into(),
            size_bytes,
        }
    }
}

/// Builds the storage name a document is persisted under. The id prefix is a
/// contract with [`parse_document_id`]; both sides must change together.
pub fn stored_name(id: i32, file_name: &str) -> String {
    format!("{id}_{file_name}")
}

/// Extracts the document id embedded in a previously saved path.
///
/// The last path segment must match `<digits>_<rest>`; the leading digit run
/// is the id. Any other shape yields `None`. This is the parsing side of the
/// `<id>_<name>` storage convention and is relied on by every section's
/// resume-from-upload logic.
pub fn parse_document_id(path: &str) -> Option<i64> {
    let segment = path.rsplit('/').next()?;
    let (prefix, _) = segment.split_once('_')?;
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    prefix.parse().ok()
}

/// Resolves a file field to a document id: a freshly uploaded id wins, else
/// the id embedded in the previously saved path.
pub fn resolve_file_id(uploaded: Option<i64>, existing_path: Option<&str>) -> Option<i64> {
    uploaded.or_else(|| existing_path.and_then(parse_document_id))
}

/// Strips path separators and control characters from an applicant-supplied
/// file name, leaving a name safe to embed in a storage path.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "document".to_string()
    } else {
        cleaned
    }
}
