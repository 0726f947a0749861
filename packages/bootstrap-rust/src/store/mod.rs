pub mod directory;
pub mod memory;

pub use directory::DirectoryDocumentStore;
pub use memory::MemoryDocumentStore;
