//! JSON request bodies accepted by the folder endpoints.
//!
//! Every field is optional at the serde level so that an absent, `null` or
//! empty value can be reported as "Missing fields" instead of a generic
//! deserialization failure.

use serde::Deserialize;

/// Body of `/create-folder` and `/list-files`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderRequest {
    pub user_id: Option<String>,
    pub folder_name: Option<String>,
}

/// Body of `/get-presigned-url`, `/get-download-url` and `/delete-file`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRequest {
    pub user_id: Option<String>,
    pub folder_name: Option<String>,
    pub file_name: Option<String>,
}

/// Parts of a folder request once every required field is present.
#[derive(Debug, PartialEq, Eq)]
pub struct FolderParts {
    pub user_id: String,
    pub folder_name: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct FileParts {
    pub user_id: String,
    pub folder_name: String,
    pub file_name: String,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl FolderRequest {
    /// Returns `None` if any required field is absent or empty.
    pub fn into_parts(self) -> Option<FolderParts> {
        Some(FolderParts {
            user_id: required(self.user_id)?,
            folder_name: required(self.folder_name)?,
        })
    }
}

impl FileRequest {
    /// Returns `None` if any required field is absent or empty.
    pub fn into_parts(self) -> Option<FileParts> {
        Some(FileParts {
            user_id: required(self.user_id)?,
            folder_name: required(self.folder_name)?,
            file_name: required(self.file_name)?,
        })
    }
}
