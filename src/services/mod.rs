pub mod backend;
#[cfg(test)]
pub mod recording_backend;
pub mod storage_service;
