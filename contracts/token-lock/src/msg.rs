use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Timestamp, Uint128};

use crate::state::LockRecord;

#[cw_serde]
pub struct InstantiateMsg {
    /// cw20 token contract to hold in custody
    pub token_address: String,
}

#[cw_serde]
pub enum ExecuteMsg {
    /// Owner only. Pull `amount` tokens from the sender and lock them for
    /// `user_address` during `lock_duration` seconds. Requires a prior cw20 allowance.
    LockTokens {
        user_address: String,
        amount: Uint128,
        lock_duration: u64,
    },
    /// Owner only. Release a matured lock to its user
    WithdrawTokens { user: String },
    /// Nominate a new owner. The nominee must accept before taking over
    TransferOwnership { new_owner: String },
    /// Called by the pending owner to complete a transfer
    AcceptOwnership {},
    /// Leave the contract without owner. Owner gated operations are disabled afterwards
    RenounceOwnership {},
}

#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Returns the lock of an account, zero valued if none exists
    #[returns(LockDetailsResponse)]
    GetLockDetails { user: String },
    /// Same as GetLockDetails
    #[returns(LockDetailsResponse)]
    UserLocks { user: String },
    #[returns(OwnerResponse)]
    Owner {},
    #[returns(PendingOwnerResponse)]
    PendingOwner {},
    /// Returns the cw20 token held in custody
    #[returns(TokenResponse)]
    Token {},
}

#[cw_serde]
pub struct LockDetailsResponse {
    pub amount: Uint128,
    pub start_lock_time: Timestamp,
    pub end_lock_time: Timestamp,
    pub is_withdrawn: bool,
}

impl From<LockRecord> for LockDetailsResponse {
    fn from(lock: LockRecord) -> Self {
        LockDetailsResponse {
            amount: lock.amount,
            start_lock_time: lock.start_lock_time,
            end_lock_time: lock.end_lock_time,
            is_withdrawn: lock.is_withdrawn,
        }
    }
}

#[cw_serde]
pub struct OwnerResponse {
    pub owner: Option<Addr>,
}

#[cw_serde]
pub struct PendingOwnerResponse {
    pub pending_owner: Option<Addr>,
}

#[cw_serde]
pub struct TokenResponse {
    pub token: Addr,
}
