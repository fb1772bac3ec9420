pub mod error;
pub mod memory;
pub mod pg;
pub mod resource_repo;

pub use memory::MemoryResourceStore;
pub use pg::PgResourceStore;
pub use resource_repo::{
    NewResource, Page, ResourceChanges, ResourceKind, ResourceRecord, ResourceStore,
};
