//! Document-store seam: a backend trait over bson documents, the MongoDB
//! implementation, and an in-memory fake for tests.

mod backend;
mod memory;
mod mongo;

pub use backend::{DocumentBackend, FindOptions, WriteOp};
pub use memory::MemoryBackend;
pub use mongo::MongoBackend;

/// Collection holding categories
pub const CATEGORIES: &str = "categories";
/// Collection holding subcategories
pub const SUBCATEGORIES: &str = "subcategories";
/// Collection holding products
pub const PRODUCTS: &str = "products";
