//! Load targets for transformed batches
//!
//! Each sink takes the batch by reference, treats an absent batch as a
//! no-op (`Ok(false)`), and reports success as a boolean. The two sinks
//! are independent: one failing never blocks the other.

pub mod object;
pub mod relational;

pub use object::ObjectSink;
pub use relational::RelationalSink;
