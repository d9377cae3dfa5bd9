mod actor;
mod transaction;

pub use actor::{Actor, Role};
pub use transaction::{Transaction, TransactionStatus};
