//! Storage implementations standing in for the hosted backend

pub mod in_memory;

pub use in_memory::{InMemoryBlobStore, InMemoryIdentityProvider, InMemoryRecordService};
