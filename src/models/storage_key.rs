//! Storage keys of the form `userId/folderName[/fileName]`.
//!
//! Every segment is checked against a fixed identifier policy before it is
//! joined, so a caller-supplied value can never add path segments or reach
//! into another user's prefix.

use std::fmt;
use thiserror::Error;

/// Name of the zero-byte object that marks a folder as existing.
pub const FOLDER_MARKER: &str = ".keep";

// Three segments of this size stay well under the 1024-byte S3 key limit.
const MAX_SEGMENT_LEN: usize = 255;

/// Punctuation accepted in folder and file names besides alphanumerics.
const NAME_PUNCTUATION: &[char] = &[' ', '-', '_', '.', '(', ')', '+', '@', ',', '=', '!', '~', '\''];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("`{field}` {reason}")]
    InvalidSegment {
        field: &'static str,
        reason: &'static str,
    },
}

/// Which identifier a segment came from; each has its own character set.
#[derive(Clone, Copy, Debug)]
enum Segment {
    User,
    Folder,
    File,
}

impl Segment {
    fn field(self) -> &'static str {
        match self {
            Segment::User => "userId",
            Segment::Folder => "folderName",
            Segment::File => "fileName",
        }
    }

    fn allows(self, c: char) -> bool {
        match self {
            Segment::User => c.is_ascii_alphanumeric() || c == '-' || c == '_',
            Segment::Folder | Segment::File => c.is_alphanumeric() || NAME_PUNCTUATION.contains(&c),
        }
    }

    fn check(self, value: &str) -> Result<(), KeyError> {
        let invalid = |reason| KeyError::InvalidSegment {
            field: self.field(),
            reason,
        };

        if value.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if value.len() > MAX_SEGMENT_LEN {
            return Err(invalid("must be at most 255 bytes"));
        }
        if value.trim() != value {
            return Err(invalid("cannot begin or end with whitespace"));
        }
        if value == "." || value == ".." {
            return Err(invalid("cannot be a relative path segment"));
        }
        if !value.chars().all(|c| self.allows(c)) {
            return Err(invalid("contains characters outside the allowed set"));
        }
        if matches!(self, Segment::File) && value == FOLDER_MARKER {
            return Err(invalid("is reserved for folder markers"));
        }
        Ok(())
    }
}

/// A validated object key inside the gateway's bucket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageKey(String);

impl StorageKey {
    /// `userId/folderName/` — the listing prefix of a folder.
    pub fn folder_prefix(user_id: &str, folder_name: &str) -> Result<Self, KeyError> {
        Segment::User.check(user_id)?;
        Segment::Folder.check(folder_name)?;
        Ok(Self(format!("{user_id}/{folder_name}/")))
    }

    /// `userId/folderName/.keep`
    pub fn folder_marker(user_id: &str, folder_name: &str) -> Result<Self, KeyError> {
        let prefix = Self::folder_prefix(user_id, folder_name)?;
        Ok(Self(prefix.0 + FOLDER_MARKER))
    }

    /// `userId/folderName/fileName`
    pub fn file(user_id: &str, folder_name: &str, file_name: &str) -> Result<Self, KeyError> {
        let prefix = Self::folder_prefix(user_id, folder_name)?;
        Segment::File.check(file_name)?;
        Ok(Self(prefix.0 + file_name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// True for any key that names a folder marker, at any depth.
pub fn is_folder_marker(key: &str) -> bool {
    key.strip_suffix(FOLDER_MARKER)
        .is_some_and(|rest| rest.ends_with('/'))
}
