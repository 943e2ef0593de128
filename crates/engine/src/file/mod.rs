//! Upload collaborator.
//!
//! The publishing engine treats file storage as an external collaborator:
//! it hands over bytes and persists only the returned reference path. An
//! upload failure is recoverable: the publisher reports it as a validation
//! error and the content write does not proceed.

mod storage;

pub use storage::{LocalUploadStore, UploadError, UploadStore, MAX_UPLOAD_SIZE};
