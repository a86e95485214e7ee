pub mod transaction;

pub use transaction::{new_tracking_id, Transaction, PENDING_STATUS};
