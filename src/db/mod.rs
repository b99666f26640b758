pub mod memory;
pub mod model;
pub mod repo;

pub use memory::MemoryRepository;
pub use model::*;
pub use repo::*;
