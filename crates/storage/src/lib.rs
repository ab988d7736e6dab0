#![forbid(unsafe_code)]

pub mod document;
pub mod repository;

pub use repository::{
    InMemoryCatalog, InMemoryResults, ResultsRepository, SessionCatalog, Storage, StorageError,
};
