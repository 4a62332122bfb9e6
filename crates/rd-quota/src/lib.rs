pub mod guard;
pub mod migrations;
pub mod store;

pub use guard::{Admission, DenyReason};
pub use store::{ChargeOutcome, LimitChange, StoreError, UsageRecord, UsageStore};
