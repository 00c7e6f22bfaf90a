use cosmwasm_std::StdError;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    #[error("Sender is not the registry owner")]
    NotOwner {},

    #[error("Account {account} is not authorized")]
    OwnableUnauthorizedAccount { account: String },

    #[error("Invalid owner {owner:?}")]
    OwnableInvalidOwner { owner: String },

    #[error("Amount must be greater than zero")]
    InvalidAmount {},

    #[error("Lock duration must be greater than zero")]
    InvalidLockDuration {},

    #[error("No lock found for this account")]
    InvalidLockIndex {},

    #[error("Insufficient token balance")]
    InsufficientBalance {},

    #[error("Token transfer failed")]
    TokenTransferFailed {},

    #[error("Tokens already withdrawn")]
    TokensAlreadyWithdrawn {},

    #[error("Tokens are still locked")]
    TokensStillLocked {},
}
