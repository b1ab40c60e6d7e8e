//! Domain module - catalog entries, brand keys, naming rules and published records
//!
//! Nothing in here touches the network or the filesystem; the jobs in
//! `application` and the adapters in `infrastructure` build on these types.

pub mod brand;
pub mod naming;
pub mod product;
pub mod record;

// Re-export commonly used items for convenience
pub use brand::BrandKey;
pub use product::ProductEntry;
pub use record::PublishedRecord;
