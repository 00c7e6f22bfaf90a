use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use cosmwasm_std::{
    to_binary, Addr, CosmosMsg, QuerierWrapper, StdResult, Timestamp, Uint128, WasmMsg,
};
use cw20::Cw20ExecuteMsg;

use crate::error::ContractError;
use crate::msg::{
    ExecuteMsg, LockDetailsResponse, OwnerResponse, PendingOwnerResponse, QueryMsg, TokenResponse,
};

/// Fixed scale between a display amount and the smallest token unit.
pub const TOKEN_DECIMALS: usize = 18;

const SECONDS_PER_DAY: u64 = 86400;
const MAX_REMAINING_DAYS: u64 = 36500;

/// TokenLockContract is a wrapper around Addr that provides a lot of helpers
/// for working with this contract from other contracts or clients.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct TokenLockContract(pub Addr);

impl TokenLockContract {
    pub fn addr(&self) -> Addr {
        self.0.clone()
    }

    pub fn call<T: Into<ExecuteMsg>>(&self, msg: T) -> StdResult<CosmosMsg> {
        let msg = to_binary(&msg.into())?;
        Ok(WasmMsg::Execute {
            contract_addr: self.addr().into(),
            msg,
            funds: vec![],
        }
        .into())
    }

    /// Grants this contract an allowance on `token`. Must be sent before `lock_tokens`.
    pub fn approve(&self, token: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
        approve_msg(token, &self.0, amount)
    }

    pub fn lock_tokens(
        &self,
        user_address: impl Into<String>,
        amount: Uint128,
        lock_duration: u64,
    ) -> StdResult<CosmosMsg> {
        self.call(ExecuteMsg::LockTokens {
            user_address: user_address.into(),
            amount,
            lock_duration,
        })
    }

    pub fn withdraw_tokens(&self, user: impl Into<String>) -> StdResult<CosmosMsg> {
        self.call(ExecuteMsg::WithdrawTokens { user: user.into() })
    }

    pub fn transfer_ownership(&self, new_owner: impl Into<String>) -> StdResult<CosmosMsg> {
        self.call(ExecuteMsg::TransferOwnership {
            new_owner: new_owner.into(),
        })
    }

    pub fn accept_ownership(&self) -> StdResult<CosmosMsg> {
        self.call(ExecuteMsg::AcceptOwnership {})
    }

    pub fn renounce_ownership(&self) -> StdResult<CosmosMsg> {
        self.call(ExecuteMsg::RenounceOwnership {})
    }

    pub fn lock_details(
        &self,
        querier: &QuerierWrapper,
        user: impl Into<String>,
    ) -> StdResult<LockDetailsResponse> {
        querier.query_wasm_smart(self.addr(), &QueryMsg::GetLockDetails { user: user.into() })
    }

    pub fn owner(&self, querier: &QuerierWrapper) -> StdResult<OwnerResponse> {
        querier.query_wasm_smart(self.addr(), &QueryMsg::Owner {})
    }

    pub fn pending_owner(&self, querier: &QuerierWrapper) -> StdResult<PendingOwnerResponse> {
        querier.query_wasm_smart(self.addr(), &QueryMsg::PendingOwner {})
    }

    pub fn token(&self, querier: &QuerierWrapper) -> StdResult<TokenResponse> {
        querier.query_wasm_smart(self.addr(), &QueryMsg::Token {})
    }
}

/// cw20 approval letting `spender` pull up to `amount` of `token`.
pub fn approve_msg(token: &Addr, spender: &Addr, amount: Uint128) -> StdResult<CosmosMsg> {
    let msg = Cw20ExecuteMsg::IncreaseAllowance {
        spender: spender.into(),
        amount,
        expires: None,
    };
    Ok(WasmMsg::Execute {
        contract_addr: token.into(),
        msg: to_binary(&msg)?,
        funds: vec![],
    }
    .into())
}

/// Converts a decimal string such as `"12.5"` into smallest token units.
pub fn parse_token_amount(input: &str) -> Result<Uint128, ContractError> {
    let input = input.trim();
    let (whole, fraction) = input.split_once('.').unwrap_or((input, ""));

    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty())
        || !is_digits(whole)
        || !is_digits(fraction)
        || fraction.len() > TOKEN_DECIMALS
    {
        return Err(ContractError::InvalidAmount {});
    }

    let whole: u128 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| ContractError::InvalidAmount {})?
    };
    let fraction: u128 = if fraction.is_empty() {
        0
    } else {
        format!("{:0<width$}", fraction, width = TOKEN_DECIMALS)
            .parse()
            .map_err(|_| ContractError::InvalidAmount {})?
    };

    whole
        .checked_mul(unit())
        .and_then(|units| units.checked_add(fraction))
        .map(Uint128::new)
        .ok_or(ContractError::InvalidAmount {})
}

/// Display form of a unit amount, without trailing fractional zeros.
pub fn format_token_amount(amount: Uint128) -> String {
    let whole = amount.u128() / unit();
    let fraction = amount.u128() % unit();
    if fraction == 0 {
        return whole.to_string();
    }

    let fraction = format!("{:0>width$}", fraction, width = TOKEN_DECIMALS);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}

/// Share of `balance` for the percentage shortcuts, rounded down.
pub fn preset_amount(balance: Uint128, percent: u8) -> Uint128 {
    balance.multiply_ratio(u128::from(percent.min(100)), 100u128)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, JsonSchema)]
pub enum LockPeriod {
    Day,
    Week,
    Month,
    Year,
}

impl LockPeriod {
    pub fn duration_seconds(&self) -> u64 {
        let days = match self {
            LockPeriod::Day => 1,
            LockPeriod::Week => 7,
            LockPeriod::Month => 30,
            LockPeriod::Year => 365,
        };
        days * SECONDS_PER_DAY
    }
}

/// Lock duration that ends at `unlock_at`.
pub fn lock_duration_until(now: Timestamp, unlock_at: Timestamp) -> Result<u64, ContractError> {
    match unlock_at.seconds().checked_sub(now.seconds()) {
        Some(duration) if duration > 0 => Ok(duration),
        _ => Err(ContractError::InvalidLockDuration {}),
    }
}

/// Countdown until `end`, e.g. `"1d 2h 3m 4s"`. Returns `"0"` once matured.
pub fn format_remaining(now: Timestamp, end: Timestamp) -> String {
    let remaining = match end.seconds().checked_sub(now.seconds()) {
        Some(secs) if secs > 0 => secs,
        _ => return "0".to_string(),
    };
    if remaining > MAX_REMAINING_DAYS * SECONDS_PER_DAY {
        return "Invalid timestamp".to_string();
    }

    let parts = [
        (remaining / SECONDS_PER_DAY, "d"),
        ((remaining % SECONDS_PER_DAY) / 3600, "h"),
        ((remaining % 3600) / 60, "m"),
        (remaining % 60, "s"),
    ];
    parts
        .iter()
        .filter(|(value, _)| *value > 0)
        .map(|(value, suffix)| format!("{}{}", value, suffix))
        .collect::<Vec<_>>()
        .join(" ")
}

fn unit() -> u128 {
    10u128.pow(TOKEN_DECIMALS as u32)
}
