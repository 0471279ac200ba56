//! Non-database storage

mod memory;

pub use memory::InMemoryRepositoryProvider;
