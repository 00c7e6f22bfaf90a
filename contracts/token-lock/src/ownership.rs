//! Two-step ownership transfer.
//!
//! The owner nominates a successor with `TransferOwnership`; nothing changes
//! until the nominee calls `AcceptOwnership`. Renouncing leaves the contract
//! without owner for good.

use cosmwasm_std::{Addr, Deps, DepsMut, Event, MessageInfo, Response, StdResult, Storage};

use crate::error::ContractError;
use crate::msg::{OwnerResponse, PendingOwnerResponse};
use crate::state::{Ownership, OWNERSHIP};

const NO_OWNER: &str = "none";

pub fn initialize_owner(storage: &mut dyn Storage, owner: Addr) -> StdResult<()> {
    let ownership = Ownership {
        owner: Some(owner),
        pending_owner: None,
    };
    OWNERSHIP.save(storage, &ownership)
}

pub fn is_owner(storage: &dyn Storage, sender: &Addr) -> StdResult<bool> {
    let ownership = OWNERSHIP.load(storage)?;
    Ok(ownership.owner.as_ref() == Some(sender))
}

/// Fails with `OwnableUnauthorizedAccount` unless `sender` is the current owner.
pub fn assert_owner(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    if !is_owner(storage, sender)? {
        return Err(ContractError::OwnableUnauthorizedAccount {
            account: sender.to_string(),
        });
    }
    Ok(())
}

pub fn try_transfer_ownership(
    deps: DepsMut,
    info: MessageInfo,
    new_owner: String,
) -> Result<Response, ContractError> {
    assert_owner(deps.storage, &info.sender)?;

    if new_owner.trim().is_empty() {
        return Err(ContractError::OwnableInvalidOwner { owner: new_owner });
    }
    let new_owner = deps
        .api
        .addr_validate(&new_owner)
        .map_err(|_| ContractError::OwnableInvalidOwner {
            owner: new_owner.clone(),
        })?;

    OWNERSHIP.update(deps.storage, |mut ownership| -> StdResult<_> {
        ownership.pending_owner = Some(new_owner.clone());
        Ok(ownership)
    })?;

    let event = Event::new("ownership_transfer_started")
        .add_attribute("previous_owner", &info.sender)
        .add_attribute("new_owner", &new_owner);
    let res = Response::new()
        .add_attribute("action", "transfer_ownership")
        .add_attribute("from", info.sender)
        .add_attribute("pending_owner", new_owner)
        .add_event(event);
    Ok(res)
}

pub fn try_accept_ownership(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    let mut ownership = OWNERSHIP.load(deps.storage)?;
    match ownership.pending_owner {
        Some(ref pending) if pending == &info.sender => {}
        _ => {
            return Err(ContractError::OwnableUnauthorizedAccount {
                account: info.sender.to_string(),
            })
        }
    }

    let previous_owner = ownership
        .owner
        .take()
        .map(String::from)
        .unwrap_or_else(|| NO_OWNER.to_string());
    ownership.owner = ownership.pending_owner.take();
    OWNERSHIP.save(deps.storage, &ownership)?;

    let event = Event::new("ownership_transferred")
        .add_attribute("previous_owner", previous_owner)
        .add_attribute("new_owner", &info.sender);
    let res = Response::new()
        .add_attribute("action", "accept_ownership")
        .add_attribute("owner", info.sender)
        .add_event(event);
    Ok(res)
}

pub fn try_renounce_ownership(deps: DepsMut, info: MessageInfo) -> Result<Response, ContractError> {
    assert_owner(deps.storage, &info.sender)?;

    let ownership = Ownership {
        owner: None,
        pending_owner: None,
    };
    OWNERSHIP.save(deps.storage, &ownership)?;
    deps.api
        .debug(&format!("token-lock: ownership renounced by {}", info.sender));

    let event = Event::new("ownership_transferred")
        .add_attribute("previous_owner", &info.sender)
        .add_attribute("new_owner", NO_OWNER);
    let res = Response::new()
        .add_attribute("action", "renounce_ownership")
        .add_attribute("from", info.sender)
        .add_event(event);
    Ok(res)
}

pub fn query_owner(deps: Deps) -> StdResult<OwnerResponse> {
    let ownership = OWNERSHIP.load(deps.storage)?;
    Ok(OwnerResponse {
        owner: ownership.owner,
    })
}

pub fn query_pending_owner(deps: Deps) -> StdResult<PendingOwnerResponse> {
    let ownership = OWNERSHIP.load(deps.storage)?;
    Ok(PendingOwnerResponse {
        pending_owner: ownership.pending_owner,
    })
}
