pub mod client;
pub mod genres;

pub use client::{TmdbClient, TmdbError};
pub use genres::genre_id;
