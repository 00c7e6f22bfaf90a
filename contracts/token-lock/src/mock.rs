#![cfg(test)]

use std::collections::HashMap;
use std::marker::PhantomData;

use cosmwasm_std::testing::{MockApi, MockQuerier, MockStorage};
use cosmwasm_std::{
    from_binary, from_slice, to_binary, Empty, OwnedDeps, Querier, QuerierResult, QueryRequest,
    SystemError, SystemResult, Uint128, WasmQuery,
};
use cw20::{AllowanceResponse, BalanceResponse, Cw20QueryMsg, Expiration};

pub const TOKEN: &str = "token";

pub fn mock_dependencies_with_token() -> OwnedDeps<MockStorage, MockApi, TokenQuerier> {
    OwnedDeps {
        storage: MockStorage::default(),
        api: MockApi::default(),
        querier: TokenQuerier::new(TOKEN),
        custom_query_type: PhantomData,
    }
}

/// Answers cw20 `Balance` and `Allowance` queries for a single token contract.
pub struct TokenQuerier {
    base: MockQuerier,
    token: String,
    balances: HashMap<String, Uint128>,
    allowances: HashMap<(String, String), Uint128>,
}

impl TokenQuerier {
    pub fn new(token: &str) -> Self {
        TokenQuerier {
            base: MockQuerier::default(),
            token: token.to_string(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
        }
    }

    pub fn set_balance(&mut self, address: &str, amount: u128) {
        self.balances.insert(address.to_string(), Uint128::new(amount));
    }

    pub fn set_allowance(&mut self, owner: &str, spender: &str, amount: u128) {
        self.allowances.insert(
            (owner.to_string(), spender.to_string()),
            Uint128::new(amount),
        );
    }

    fn handle_cw20(&self, msg: Cw20QueryMsg) -> QuerierResult {
        let res = match msg {
            Cw20QueryMsg::Balance { address } => to_binary(&BalanceResponse {
                balance: self.balances.get(&address).copied().unwrap_or_default(),
            }),
            Cw20QueryMsg::Allowance { owner, spender } => to_binary(&AllowanceResponse {
                allowance: self
                    .allowances
                    .get(&(owner, spender))
                    .copied()
                    .unwrap_or_default(),
                expires: Expiration::Never {},
            }),
            _ => {
                return SystemResult::Err(SystemError::UnsupportedRequest {
                    kind: "cw20 query".to_string(),
                })
            }
        };
        SystemResult::Ok(res.into())
    }
}

impl Querier for TokenQuerier {
    fn raw_query(&self, bin_request: &[u8]) -> QuerierResult {
        let request: QueryRequest<Empty> = match from_slice(bin_request) {
            Ok(v) => v,
            Err(e) => {
                return SystemResult::Err(SystemError::InvalidRequest {
                    error: format!("Parsing query request: {}", e),
                    request: bin_request.into(),
                })
            }
        };

        match &request {
            QueryRequest::Wasm(WasmQuery::Smart { contract_addr, msg }) => {
                if contract_addr != &self.token {
                    return SystemResult::Err(SystemError::NoSuchContract {
                        addr: contract_addr.clone(),
                    });
                }
                match from_binary(msg) {
                    Ok(msg) => self.handle_cw20(msg),
                    Err(e) => SystemResult::Err(SystemError::InvalidRequest {
                        error: e.to_string(),
                        request: msg.clone(),
                    }),
                }
            }
            _ => self.base.handle_query(&request),
        }
    }
}
