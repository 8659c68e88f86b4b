//! Builders of decoded events, as delivered by [`crate::stream::raw`].

use alloy::primitives::{Address, TxHash, U256};

use crate::{
    abi::{
        IVault::{self, IVaultEvents},
        IVaultFactory::{self, IVaultFactoryEvents},
    },
    stream::{RawBlockEvents, RawEvent},
    types::{self, ChainEvent},
};

fn raw(address: Address, event: ChainEvent) -> RawEvent {
    RawEvent::new(address, TxHash::ZERO, 0, 0, event)
}

pub fn vault_created(factory: Address, user: Address, vault: Address) -> RawEvent {
    raw(
        factory,
        ChainEvent::Factory(IVaultFactoryEvents::VaultCreated(IVaultFactory::VaultCreated {
            user,
            vault,
        })),
    )
}

pub fn deposit(vault: Address, user: Address, quote_amount: U256, shares_minted: U256) -> RawEvent {
    raw(
        vault,
        ChainEvent::Vault(IVaultEvents::Deposit(IVault::Deposit {
            user,
            quoteAmount: quote_amount,
            sharesMinted: shares_minted,
        })),
    )
}

pub fn withdraw(
    vault: Address,
    user: Address,
    quote_returned: U256,
    base_returned: U256,
    shares_burned: U256,
) -> RawEvent {
    raw(
        vault,
        ChainEvent::Vault(IVaultEvents::Withdraw(IVault::Withdraw {
            user,
            quoteReturned: quote_returned,
            baseReturned: base_returned,
            sharesBurned: shares_burned,
        })),
    )
}

pub fn rebalance(vault: Address) -> RawEvent {
    raw(vault, ChainEvent::Vault(IVaultEvents::Rebalance(IVault::Rebalance {})))
}

pub fn rebalanced(vault: Address) -> RawEvent {
    raw(vault, ChainEvent::Vault(IVaultEvents::Rebalanced(IVault::Rebalanced {})))
}

/// Block with the events, each emitted by a separate transaction.
pub fn block(block_number: u64, block_timestamp: u64, events: Vec<RawEvent>) -> RawBlockEvents {
    let events = events
        .into_iter()
        .enumerate()
        .map(|(i, e)| {
            RawEvent::new(
                e.address(),
                TxHash::with_last_byte(i as u8),
                i as u64,
                i as u64,
                e.event().clone(),
            )
        })
        .collect();
    RawBlockEvents::new(types::StateInstant::new(block_number, block_timestamp), events)
}
