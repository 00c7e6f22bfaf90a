pub mod contract;
mod error;
pub mod helpers;
mod mock;
pub mod msg;
pub mod ownership;
pub mod state;

pub use crate::error::ContractError;
