//! Request/response bodies and the storage key helper.
//!
//! The gateway owns no persisted entities; these types describe the JSON
//! contract and the bucket keys it derives from it.

pub mod requests;
pub mod responses;
pub mod storage_key;
