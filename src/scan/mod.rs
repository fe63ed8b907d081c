//! Container scanning strategies.
//!
//! Both strategies stream `(entity, origin container)` hits into the result
//! aggregator, report progress once per item, and honor a cooperative
//! cancellation flag checked between items.

pub mod files;
pub mod live;
