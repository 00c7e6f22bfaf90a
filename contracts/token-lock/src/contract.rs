#[cfg(not(feature = "library"))]
use cosmwasm_std::entry_point;
use cosmwasm_std::{
    to_binary, Addr, Binary, Deps, DepsMut, Env, MessageInfo, QuerierWrapper, Reply, Response,
    StdError, StdResult, SubMsg, SubMsgResult, Timestamp, Uint128, WasmMsg,
};

use crate::error::ContractError;
use crate::msg::{ExecuteMsg, InstantiateMsg, LockDetailsResponse, QueryMsg, TokenResponse};
use crate::ownership::{
    initialize_owner, is_owner, query_owner, query_pending_owner, try_accept_ownership,
    try_renounce_ownership, try_transfer_ownership,
};
use crate::state::{Config, LockRecord, CONFIG, USER_LOCKS};

use cw2::set_contract_version;
use cw20::{AllowanceResponse, BalanceResponse, Cw20ExecuteMsg, Cw20QueryMsg};

// version info for migration info
const CONTRACT_NAME: &str = "crates.io:cw-disper-token-lock";
const CONTRACT_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const LOCK_TRANSFER_REPLY_ID: u64 = 1;
pub const WITHDRAW_TRANSFER_REPLY_ID: u64 = 2;

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let config = Config {
        token: deps.api.addr_validate(&msg.token_address)?,
    };
    CONFIG.save(deps.storage, &config)?;
    initialize_owner(deps.storage, info.sender.clone())?;

    let res = Response::new()
        .add_attribute("action", "instantiate")
        .add_attribute("owner", info.sender)
        .add_attribute("token", config.token);
    Ok(res)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::LockTokens {
            user_address,
            amount,
            lock_duration,
        } => try_lock_tokens(deps, env, info, user_address, amount, lock_duration),
        ExecuteMsg::WithdrawTokens { user } => try_withdraw_tokens(deps, env, info, user),
        ExecuteMsg::TransferOwnership { new_owner } => {
            try_transfer_ownership(deps, info, new_owner)
        }
        ExecuteMsg::AcceptOwnership {} => try_accept_ownership(deps, info),
        ExecuteMsg::RenounceOwnership {} => try_renounce_ownership(deps, info),
    }
}

pub fn try_lock_tokens(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    user_address: String,
    amount: Uint128,
    lock_duration: u64,
) -> Result<Response, ContractError> {
    assert_registry_owner(deps.as_ref(), &info.sender)?;

    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {});
    }
    if lock_duration == 0 {
        return Err(ContractError::InvalidLockDuration {});
    }

    // records keep whole seconds
    let current_time = Timestamp::from_seconds(env.block.time.seconds());
    let end_lock_time =
        lock_end(current_time, lock_duration).ok_or(ContractError::InvalidLockDuration {})?;
    let user = deps.api.addr_validate(&user_address)?;

    let config = CONFIG.load(deps.storage)?;
    let balance = query_token_balance(&deps.querier, &config.token, &info.sender)?;
    if balance < amount {
        return Err(ContractError::InsufficientBalance {});
    }
    let allowance = query_token_allowance(
        &deps.querier,
        &config.token,
        &info.sender,
        &env.contract.address,
    )?;
    if allowance < amount {
        return Err(ContractError::TokenTransferFailed {});
    }

    let lock = LockRecord {
        amount,
        start_lock_time: current_time,
        end_lock_time,
        is_withdrawn: false,
    };
    if let Some(prev) = USER_LOCKS.may_load(deps.storage, &user)? {
        if !prev.is_withdrawn {
            deps.api.debug(&format!(
                "token-lock: overwriting unwithdrawn lock of {} for {}",
                prev.amount, user
            ));
        }
    }
    USER_LOCKS.save(deps.storage, &user, &lock)?;

    let pull = Cw20ExecuteMsg::TransferFrom {
        owner: info.sender.to_string(),
        recipient: env.contract.address.to_string(),
        amount,
    };
    let res = Response::new()
        .add_attribute("action", "lock_tokens")
        .add_attribute("from", info.sender)
        .add_attribute("user", user)
        .add_attribute("amount", amount)
        .add_attribute("end_lock_time", end_lock_time.seconds().to_string())
        .add_submessage(token_msg(&config.token, &pull, LOCK_TRANSFER_REPLY_ID)?);
    Ok(res)
}

pub fn try_withdraw_tokens(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    user: String,
) -> Result<Response, ContractError> {
    assert_registry_owner(deps.as_ref(), &info.sender)?;

    let user = deps.api.addr_validate(&user)?;
    let mut lock = USER_LOCKS
        .may_load(deps.storage, &user)?
        .ok_or(ContractError::InvalidLockIndex {})?;

    if lock.is_withdrawn {
        return Err(ContractError::TokensAlreadyWithdrawn {});
    }
    if !lock.is_matured(env.block.time) {
        return Err(ContractError::TokensStillLocked {});
    }
    if lock.amount.is_zero() {
        return Err(ContractError::InvalidLockIndex {});
    }

    let config = CONFIG.load(deps.storage)?;
    let custody = query_token_balance(&deps.querier, &config.token, &env.contract.address)?;
    if custody < lock.amount {
        return Err(ContractError::InsufficientBalance {});
    }

    lock.is_withdrawn = true;
    USER_LOCKS.save(deps.storage, &user, &lock)?;

    let release = Cw20ExecuteMsg::Transfer {
        recipient: user.to_string(),
        amount: lock.amount,
    };
    let res = Response::new()
        .add_attribute("action", "withdraw_tokens")
        .add_attribute("from", info.sender)
        .add_attribute("user", user)
        .add_attribute("amount", lock.amount)
        .add_submessage(token_msg(
            &config.token,
            &release,
            WITHDRAW_TRANSFER_REPLY_ID,
        )?);
    Ok(res)
}

/// Only called when a token transfer fails. Returning an error reverts the
/// whole transaction, lock record included.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        LOCK_TRANSFER_REPLY_ID | WITHDRAW_TRANSFER_REPLY_ID => match msg.result {
            SubMsgResult::Err(err) => {
                deps.api.debug(&format!("token-lock: token transfer rejected: {}", err));
                Err(ContractError::TokenTransferFailed {})
            }
            SubMsgResult::Ok(_) => Ok(Response::default()),
        },
        id => Err(StdError::generic_err(format!("Unknown reply id {}", id)).into()),
    }
}

fn assert_registry_owner(deps: Deps, sender: &Addr) -> Result<(), ContractError> {
    if !is_owner(deps.storage, sender)? {
        return Err(ContractError::NotOwner {});
    }
    Ok(())
}

fn lock_end(start: Timestamp, duration: u64) -> Option<Timestamp> {
    duration
        .checked_mul(1_000_000_000)
        .and_then(|nanos| start.nanos().checked_add(nanos))
        .map(Timestamp::from_nanos)
}

fn token_msg(token: &Addr, msg: &Cw20ExecuteMsg, reply_id: u64) -> StdResult<SubMsg> {
    let exec = WasmMsg::Execute {
        contract_addr: token.to_string(),
        msg: to_binary(msg)?,
        funds: vec![],
    };
    Ok(SubMsg::reply_on_error(exec, reply_id))
}

fn query_token_balance(
    querier: &QuerierWrapper,
    token: &Addr,
    address: &Addr,
) -> StdResult<Uint128> {
    let res: BalanceResponse = querier.query_wasm_smart(
        token,
        &Cw20QueryMsg::Balance {
            address: address.to_string(),
        },
    )?;
    Ok(res.balance)
}

fn query_token_allowance(
    querier: &QuerierWrapper,
    token: &Addr,
    owner: &Addr,
    spender: &Addr,
) -> StdResult<Uint128> {
    let res: AllowanceResponse = querier.query_wasm_smart(
        token,
        &Cw20QueryMsg::Allowance {
            owner: owner.to_string(),
            spender: spender.to_string(),
        },
    )?;
    Ok(res.allowance)
}

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, _env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::GetLockDetails { user } | QueryMsg::UserLocks { user } => {
            to_binary(&query_lock_details(deps, user)?)
        }
        QueryMsg::Owner {} => to_binary(&query_owner(deps)?),
        QueryMsg::PendingOwner {} => to_binary(&query_pending_owner(deps)?),
        QueryMsg::Token {} => to_binary(&query_token(deps)?),
    }
}

fn query_lock_details(deps: Deps, user: String) -> StdResult<LockDetailsResponse> {
    let user = deps.api.addr_validate(&user)?;
    let lock = USER_LOCKS.may_load(deps.storage, &user)?.unwrap_or_default();

    Ok(lock.into())
}

fn query_token(deps: Deps) -> StdResult<TokenResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(TokenResponse {
        token: config.token,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{mock_dependencies_with_token, TokenQuerier, TOKEN};
    use cosmwasm_std::testing::{mock_env, mock_info, MockApi, MockStorage, MOCK_CONTRACT_ADDR};
    use cosmwasm_std::{from_binary, OwnedDeps};

    type TestDeps = OwnedDeps<MockStorage, MockApi, TokenQuerier>;

    fn setup() -> TestDeps {
        let mut deps = mock_dependencies_with_token();
        let msg = InstantiateMsg {
            token_address: TOKEN.into(),
        };
        let info = mock_info("creator", &[]);
        let _res = instantiate(deps.as_mut(), mock_env(), info, msg).unwrap();

        deps.querier.set_balance("creator", 10_000);
        deps.querier.set_allowance("creator", MOCK_CONTRACT_ADDR, 10_000);
        deps
    }

    fn env_at(seconds: u64) -> Env {
        let mut env = mock_env();
        env.block.time = Timestamp::from_seconds(seconds);
        env
    }

    fn lock_msg(user: &str, amount: u128, lock_duration: u64) -> ExecuteMsg {
        ExecuteMsg::LockTokens {
            user_address: user.into(),
            amount: Uint128::new(amount),
            lock_duration,
        }
    }

    fn withdraw_msg(user: &str) -> ExecuteMsg {
        ExecuteMsg::WithdrawTokens { user: user.into() }
    }

    fn lock_details(deps: &TestDeps, user: &str) -> LockDetailsResponse {
        let msg = QueryMsg::GetLockDetails { user: user.into() };
        let res = query(deps.as_ref(), mock_env(), msg).unwrap();
        from_binary(&res).unwrap()
    }

    #[test]
    fn proper_initialization() {
        let mut deps = mock_dependencies_with_token();

        let msg = InstantiateMsg {
            token_address: TOKEN.into(),
        };
        let info = mock_info("creator", &[]);

        // we can just call .unwrap() to assert this was a success
        let res = instantiate(deps.as_mut(), mock_env(), info, msg).unwrap();
        assert_eq!(0, res.messages.len());

        let res = query(deps.as_ref(), mock_env(), QueryMsg::Token {}).unwrap();
        let value: TokenResponse = from_binary(&res).unwrap();
        assert_eq!(TOKEN, value.token.as_str());

        // no lock yet, zero valued record
        let value = lock_details(&deps, "alice");
        assert_eq!(Uint128::zero(), value.amount);
        assert_eq!(0, value.start_lock_time.seconds());
        assert_eq!(0, value.end_lock_time.seconds());
        assert!(!value.is_withdrawn);
    }

    #[test]
    fn lock() {
        let mut deps = setup();
        let info = mock_info("creator", &[]);

        // only owner
        let res = execute(
            deps.as_mut(),
            env_at(1000),
            mock_info("anyone", &[]),
            lock_msg("alice", 1000, 86400),
        );
        match res {
            Err(ContractError::NotOwner {}) => {}
            _ => panic!("Must return NotOwner error"),
        }

        // zero amount
        let res = execute(
            deps.as_mut(),
            env_at(1000),
            info.clone(),
            lock_msg("alice", 0, 86400),
        );
        match res {
            Err(ContractError::InvalidAmount {}) => {}
            _ => panic!("Must return InvalidAmount error"),
        }

        // zero duration
        let res = execute(
            deps.as_mut(),
            env_at(1000),
            info.clone(),
            lock_msg("alice", 1000, 0),
        );
        match res {
            Err(ContractError::InvalidLockDuration {}) => {}
            _ => panic!("Must return InvalidLockDuration error"),
        }

        // end time out of range
        let res = execute(
            deps.as_mut(),
            env_at(1000),
            info.clone(),
            lock_msg("alice", 1000, u64::MAX),
        );
        match res {
            Err(ContractError::InvalidLockDuration {}) => {}
            _ => panic!("Must return InvalidLockDuration error"),
        }

        // lock funds
        let res = execute(
            deps.as_mut(),
            env_at(1000),
            info,
            lock_msg("alice", 1000, 86400),
        )
        .unwrap();
        assert_eq!(1, res.messages.len());
        let pull = Cw20ExecuteMsg::TransferFrom {
            owner: "creator".into(),
            recipient: MOCK_CONTRACT_ADDR.into(),
            amount: Uint128::new(1000),
        };
        assert_eq!(
            res.messages[0],
            SubMsg::reply_on_error(
                WasmMsg::Execute {
                    contract_addr: TOKEN.into(),
                    msg: to_binary(&pull).unwrap(),
                    funds: vec![],
                },
                LOCK_TRANSFER_REPLY_ID
            )
        );

        let value = lock_details(&deps, "alice");
        assert_eq!(Uint128::new(1000), value.amount);
        assert_eq!(1000, value.start_lock_time.seconds());
        assert_eq!(87400, value.end_lock_time.seconds());
        assert!(!value.is_withdrawn);

        // UserLocks is the same view
        let msg = QueryMsg::UserLocks {
            user: "alice".into(),
        };
        let res = query(deps.as_ref(), mock_env(), msg).unwrap();
        let same: LockDetailsResponse = from_binary(&res).unwrap();
        assert_eq!(value, same);
    }

    #[test]
    fn failed_lock_keeps_previous_record() {
        let mut deps = setup();
        let info = mock_info("creator", &[]);

        execute(
            deps.as_mut(),
            env_at(100),
            info.clone(),
            lock_msg("alice", 500, 60),
        )
        .unwrap();
        let before = lock_details(&deps, "alice");

        let res = execute(
            deps.as_mut(),
            env_at(120),
            info.clone(),
            lock_msg("alice", 0, 60),
        );
        assert_eq!(Err(ContractError::InvalidAmount {}), res);

        // not enough balance
        let res = execute(
            deps.as_mut(),
            env_at(120),
            info.clone(),
            lock_msg("alice", 20_000, 60),
        );
        assert_eq!(Err(ContractError::InsufficientBalance {}), res);

        // not enough allowance
        deps.querier.set_allowance("creator", MOCK_CONTRACT_ADDR, 100);
        let res = execute(deps.as_mut(), env_at(120), info, lock_msg("alice", 300, 60));
        assert_eq!(Err(ContractError::TokenTransferFailed {}), res);

        assert_eq!(before, lock_details(&deps, "alice"));
    }

    #[test]
    fn relock_overwrites() {
        let mut deps = setup();
        let info = mock_info("creator", &[]);

        execute(
            deps.as_mut(),
            env_at(100),
            info.clone(),
            lock_msg("alice", 500, 3600),
        )
        .unwrap();
        execute(
            deps.as_mut(),
            env_at(200),
            info,
            lock_msg("alice", 300, 60),
        )
        .unwrap();

        let value = lock_details(&deps, "alice");
        assert_eq!(Uint128::new(300), value.amount);
        assert_eq!(200, value.start_lock_time.seconds());
        assert_eq!(260, value.end_lock_time.seconds());
        assert!(!value.is_withdrawn);
    }

    #[test]
    fn withdraw() {
        let mut deps = setup();
        let info = mock_info("creator", &[]);

        execute(
            deps.as_mut(),
            env_at(1000),
            info.clone(),
            lock_msg("alice", 1000, 86400),
        )
        .unwrap();
        deps.querier.set_balance(MOCK_CONTRACT_ADDR, 1000);

        // cannot withdraw until matured
        let res = execute(
            deps.as_mut(),
            env_at(87399),
            info.clone(),
            withdraw_msg("alice"),
        );
        match res {
            Err(ContractError::TokensStillLocked {}) => {}
            _ => panic!("Must return TokensStillLocked error"),
        }

        // only owner
        let res = execute(
            deps.as_mut(),
            env_at(87400),
            mock_info("alice", &[]),
            withdraw_msg("alice"),
        );
        match res {
            Err(ContractError::NotOwner {}) => {}
            _ => panic!("Must return NotOwner error"),
        }

        // matured exactly at end time
        let res = execute(
            deps.as_mut(),
            env_at(87400),
            info.clone(),
            withdraw_msg("alice"),
        )
        .unwrap();
        assert_eq!(1, res.messages.len());
        let release = Cw20ExecuteMsg::Transfer {
            recipient: "alice".into(),
            amount: Uint128::new(1000),
        };
        assert_eq!(
            res.messages[0],
            SubMsg::reply_on_error(
                WasmMsg::Execute {
                    contract_addr: TOKEN.into(),
                    msg: to_binary(&release).unwrap(),
                    funds: vec![],
                },
                WITHDRAW_TRANSFER_REPLY_ID
            )
        );

        let value = lock_details(&deps, "alice");
        assert!(value.is_withdrawn);
        assert_eq!(Uint128::new(1000), value.amount);

        // second withdraw
        let res = execute(deps.as_mut(), env_at(87401), info, withdraw_msg("alice"));
        match res {
            Err(ContractError::TokensAlreadyWithdrawn {}) => {}
            _ => panic!("Must return TokensAlreadyWithdrawn error"),
        }
    }

    #[test]
    fn sub_second_block_time() {
        let mut deps = setup();
        let info = mock_info("creator", &[]);

        let mut env = mock_env();
        env.block.time = Timestamp::from_nanos(1_000_999_999_999);
        execute(deps.as_mut(), env, info.clone(), lock_msg("alice", 1000, 1)).unwrap();
        deps.querier.set_balance(MOCK_CONTRACT_ADDR, 1000);

        let value = lock_details(&deps, "alice");
        assert_eq!(Timestamp::from_seconds(1000), value.start_lock_time);
        assert_eq!(Timestamp::from_seconds(1001), value.end_lock_time);

        // still inside second 1000
        let mut env = mock_env();
        env.block.time = Timestamp::from_nanos(1_000_999_999_999);
        let res = execute(deps.as_mut(), env, info.clone(), withdraw_msg("alice"));
        assert_eq!(Err(ContractError::TokensStillLocked {}), res);

        // matured at the first block of second 1001
        execute(deps.as_mut(), env_at(1001), info, withdraw_msg("alice")).unwrap();
        assert!(lock_details(&deps, "alice").is_withdrawn);
    }

    #[test]
    fn withdraw_missing_lock() {
        let mut deps = setup();
        let info = mock_info("creator", &[]);

        let res = execute(deps.as_mut(), env_at(1000), info, withdraw_msg("alice"));
        match res {
            Err(ContractError::InvalidLockIndex {}) => {}
            _ => panic!("Must return InvalidLockIndex error"),
        }
    }

    #[test]
    fn withdraw_without_custody() {
        let mut deps = setup();
        let info = mock_info("creator", &[]);

        execute(
            deps.as_mut(),
            env_at(0),
            info.clone(),
            lock_msg("alice", 1000, 10),
        )
        .unwrap();
        deps.querier.set_balance(MOCK_CONTRACT_ADDR, 999);

        let res = execute(deps.as_mut(), env_at(10), info, withdraw_msg("alice"));
        assert_eq!(Err(ContractError::InsufficientBalance {}), res);
        assert!(!lock_details(&deps, "alice").is_withdrawn);
    }

    #[test]
    fn rejected_transfer() {
        let mut deps = setup();

        for id in [LOCK_TRANSFER_REPLY_ID, WITHDRAW_TRANSFER_REPLY_ID] {
            let msg = Reply {
                id,
                result: SubMsgResult::Err("insufficient allowance".into()),
            };
            let err = reply(deps.as_mut(), mock_env(), msg).unwrap_err();
            assert_eq!(ContractError::TokenTransferFailed {}, err);
        }

        let msg = Reply {
            id: 99,
            result: SubMsgResult::Err("boom".into()),
        };
        let err = reply(deps.as_mut(), mock_env(), msg).unwrap_err();
        assert!(matches!(err, ContractError::Std(StdError::GenericErr { .. })));
    }
}
