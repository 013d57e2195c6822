//! Domain models for the billing engine.

mod charge;
mod cycle;
mod member;
mod payment;
mod room;

pub use charge::{round2, MemberCharge};
pub use cycle::{BillingCycle, CycleInputs, CycleStatus};
pub use member::Member;
pub use payment::{BillType, PaymentRecord, PaymentStatus};
pub use room::{Room, WaterBillingMode};
