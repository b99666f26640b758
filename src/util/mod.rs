pub mod lenient;
mod query;

pub use query::QueryParams;
