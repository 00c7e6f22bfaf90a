use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{Addr, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Config {
    /// cw20 token held in custody
    pub token: Addr,
}

/// Administrative roles. `owner` is `None` once ownership is renounced.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Ownership {
    pub owner: Option<Addr>,
    pub pending_owner: Option<Addr>,
}

/// Single lock slot per account; a new lock overwrites the previous one.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct LockRecord {
    pub amount: Uint128,
    pub start_lock_time: Timestamp,
    pub end_lock_time: Timestamp,
    pub is_withdrawn: bool,
}

impl Default for LockRecord {
    fn default() -> Self {
        LockRecord {
            amount: Uint128::zero(),
            start_lock_time: Timestamp::from_seconds(0),
            end_lock_time: Timestamp::from_seconds(0),
            is_withdrawn: false,
        }
    }
}

impl LockRecord {
    pub fn is_matured(&self, now: Timestamp) -> bool {
        now.seconds() >= self.end_lock_time.seconds()
    }
}

pub const CONFIG: Item<Config> = Item::new("config");
pub const OWNERSHIP: Item<Ownership> = Item::new("ownership");
pub const USER_LOCKS: Map<&Addr, LockRecord> = Map::new("user_locks");
