pub mod ownership;
pub mod pagination;
pub mod reaction;
pub mod thread;

pub use ownership::*;
pub use pagination::*;
pub use reaction::*;
