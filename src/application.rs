//! Application layer: the two batch jobs and their run reports

pub mod collector;
pub mod publisher;
pub mod report;

pub use collector::Collector;
pub use publisher::Publisher;
pub use report::{CollectorReport, PublisherReport};
