//! Process-local adapters used when no database is configured and by tests.

mod in_memory_allocation_store;
mod in_memory_member_directory;

pub use in_memory_allocation_store::InMemoryAllocationStore;
pub use in_memory_member_directory::InMemoryMemberDirectory;
