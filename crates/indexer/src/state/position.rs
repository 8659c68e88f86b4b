use alloy::primitives::{Address, U256};

use crate::types;

/// Identity of a [`UserPosition`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PositionKey {
    pub user: Address,
    pub vault: Address,
}

/// Cumulative accounting of a user's deposits into and withdrawals from a
/// vault.
///
/// Cumulative amounts never decrease, share balance never goes below zero.
#[derive(Clone, Copy, derive_more::Debug, PartialEq, Eq)]
pub struct UserPosition {
    user: Address,
    vault: Address,
    #[debug("{quote_deposited}")]
    quote_deposited: U256,
    #[debug("{quote_withdrawn}")]
    quote_withdrawn: U256,
    #[debug("{base_returned}")]
    base_returned: U256,
    #[debug("{shares}")]
    shares: U256,
    instant: types::StateInstant,
}

impl UserPosition {
    pub(crate) fn empty(instant: types::StateInstant, user: Address, vault: Address) -> Self {
        Self {
            user,
            vault,
            quote_deposited: U256::ZERO,
            quote_withdrawn: U256::ZERO,
            base_returned: U256::ZERO,
            shares: U256::ZERO,
            instant,
        }
    }

    pub fn key(&self) -> PositionKey { PositionKey { user: self.user, vault: self.vault } }

    /// Entity ID, `<user>-<vault>`.
    pub fn id(&self) -> String {
        format!("{}-{}", super::id_hex(self.user), super::id_hex(self.vault))
    }

    pub fn user(&self) -> Address { self.user }

    pub fn vault(&self) -> Address { self.vault }

    /// Total quote asset deposited over the lifetime of the position.
    pub fn quote_deposited(&self) -> U256 { self.quote_deposited }

    /// Total quote asset returned on withdrawals.
    pub fn quote_withdrawn(&self) -> U256 { self.quote_withdrawn }

    /// Total base asset returned on withdrawals.
    pub fn base_returned(&self) -> U256 { self.base_returned }

    /// Current vault share balance.
    pub fn shares(&self) -> U256 { self.shares }

    /// Instant the position was last updated at.
    pub fn instant(&self) -> types::StateInstant { self.instant }

    pub(crate) fn deposit(&mut self, instant: types::StateInstant, quote: U256, shares: U256) {
        self.quote_deposited = self.quote_deposited.saturating_add(quote);
        self.shares = self.shares.saturating_add(shares);
        self.instant = instant;
    }

    /// Applies a withdrawal, returning the part of the burned shares not
    /// covered by the recorded balance, if any.
    pub(crate) fn withdraw(
        &mut self,
        instant: types::StateInstant,
        quote: U256,
        base: U256,
        shares_burned: U256,
    ) -> Option<U256> {
        self.quote_withdrawn = self.quote_withdrawn.saturating_add(quote);
        self.base_returned = self.base_returned.saturating_add(base);
        self.instant = instant;
        match self.shares.checked_sub(shares_burned) {
            Some(shares) => {
                self.shares = shares;
                None
            },
            None => {
                let shortfall = shares_burned - self.shares;
                self.shares = U256::ZERO;
                Some(shortfall)
            },
        }
    }
}

#[cfg(feature = "display")]
impl std::fmt::Display for UserPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} in {} shares: {} deposited: {} withdrawn: {} base returned: {}]",
            self.user,
            self.vault,
            self.shares,
            self.quote_deposited,
            self.quote_withdrawn,
            self.base_returned,
        )
    }
}

#[cfg(feature = "display")]
impl tabled::Tabled for UserPosition {
    const LENGTH: usize = 7;

    fn fields(&self) -> Vec<std::borrow::Cow<'_, str>> {
        vec![
            self.user.to_string().into(),
            self.vault.to_string().into(),
            self.shares.to_string().into(),
            self.quote_deposited.to_string().into(),
            self.quote_withdrawn.to_string().into(),
            self.base_returned.to_string().into(),
            self.instant.to_string().into(),
        ]
    }

    fn headers() -> Vec<std::borrow::Cow<'static, str>> {
        vec![
            "User".into(),
            "Vault".into(),
            "Shares".into(),
            "Deposited".into(),
            "Withdrawn".into(),
            "Base Returned".into(),
            "Updated".into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position() -> UserPosition {
        UserPosition::empty(
            types::StateInstant::new(1, 0),
            Address::repeat_byte(1),
            Address::repeat_byte(2),
        )
    }

    #[test]
    fn test_deposit_then_partial_withdraw() {
        let mut pos = position();
        pos.deposit(types::StateInstant::new(2, 10), U256::from(1000), U256::from(900));
        assert_eq!(pos.quote_deposited(), U256::from(1000));
        assert_eq!(pos.shares(), U256::from(900));

        let shortfall = pos.withdraw(
            types::StateInstant::new(3, 20),
            U256::from(500),
            U256::from(7),
            U256::from(400),
        );
        assert_eq!(shortfall, None);
        assert_eq!(pos.shares(), U256::from(500));
        assert_eq!(pos.quote_withdrawn(), U256::from(500));
        assert_eq!(pos.base_returned(), U256::from(7));
        assert_eq!(pos.quote_deposited(), U256::from(1000));
        assert_eq!(pos.instant(), types::StateInstant::new(3, 20));
    }

    #[test]
    fn test_withdraw_more_than_balance_floors_at_zero() {
        let mut pos = position();
        pos.deposit(types::StateInstant::new(2, 10), U256::from(100), U256::from(100));
        let shortfall = pos.withdraw(
            types::StateInstant::new(3, 20),
            U256::from(150),
            U256::ZERO,
            U256::from(250),
        );
        assert_eq!(shortfall, Some(U256::from(150)));
        assert_eq!(pos.shares(), U256::ZERO);
        assert_eq!(pos.quote_withdrawn(), U256::from(150));
    }
}
