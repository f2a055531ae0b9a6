use serde::{Deserialize, Serialize};

/// Metadata of a document or topic the user can chat with.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentInfo {
    /// Display name of the document.
    #[serde(default)]
    pub alias: String,
    /// Whether the document finished processing and accepts questions.
    #[serde(default)]
    pub status: bool,
    /// Vector index of the document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector_id: Option<String>,
    /// Storage path of the original file.
    #[serde(
        default,
        rename = "S3_directory",
        skip_serializing_if = "Option::is_none"
    )]
    pub s3_directory: Option<String>,
}
