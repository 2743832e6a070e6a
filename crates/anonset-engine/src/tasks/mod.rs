//! Task wrappers over [`AnonymitySetService`](crate::AnonymitySetService)

pub mod anonymity;

pub use anonymity::{AnonymitySetTask, BatchAnonymitySetTask, TransactionAmounts};
