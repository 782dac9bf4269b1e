//! Object storage adapters for attachment bytes.

mod filesystem_object_store;

pub use filesystem_object_store::FilesystemObjectStore;
