//! Services module for the billing engine.

pub mod allocator;
pub mod engine;
pub mod payments;
pub mod presence;
pub mod reconciliation;
pub mod store;

pub use allocator::{allocate, electricity_amount, Allocation, RateTable};
pub use engine::{BillingEngine, CloseOutcome, CloseWarning};
pub use payments::{all_payers_paid, billable_types};
pub use store::{MemoryStore, RoomStore};
