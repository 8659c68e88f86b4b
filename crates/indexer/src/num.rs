//! Fixed-point share price math and decimal conversion.

use alloy::primitives::{U256, U512};
use fastnum::{UD256, decimal::Context};

/// Number of decimals share prices are expressed with.
pub const PRICE_DECIMALS: u8 = 18;

/// Fixed-point scale of share prices, `10^18`.
pub const SCALE: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Price of one vault share in underlying asset units, scaled by [`SCALE`].
///
/// A vault with no shares issued has price 0.
pub fn share_price(total_assets: U256, total_supply: U256) -> U256 {
    if total_supply.is_zero() {
        return U256::ZERO;
    }
    // Widened so `total_assets * SCALE` never overflows
    let price = U512::from(total_assets) * U512::from(SCALE) / U512::from(total_supply);
    U256::saturating_from(price)
}

/// Converter of fixed-point integers with a particular number of decimals
/// into decimal numbers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Converter {
    decimals: u8,
}

impl Converter {
    pub const fn new(decimals: u8) -> Self { Self { decimals } }

    /// Converts the fixed-point integer into a decimal number, exactly.
    pub fn from_unsigned(&self, value: U256) -> UD256 {
        UD256::from_parts(
            fastnum::U256::from_digits(*value.as_limbs()),
            -i32::from(self.decimals),
            Context::default(),
        )
    }
}

/// Converter of share prices, see [`PRICE_DECIMALS`].
pub const PRICE_CONVERTER: Converter = Converter::new(PRICE_DECIMALS);
