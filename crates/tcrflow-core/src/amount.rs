//! Token amounts and allowance resolution.

use crate::error::FlowError;
use alloy_primitives::U256;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A non-negative token quantity.
///
/// Backed by a 256-bit unsigned integer, the full value domain of ledger
/// token balances. All arithmetic is exact.
///
/// # Examples
///
/// ```
/// use tcrflow_core::Amount;
///
/// let amount: Amount = "100000000000000000000".parse()?;
/// assert_eq!(amount.to_string(), "100000000000000000000");
///
/// assert!("-5".parse::<Amount>().is_err());
/// # Ok::<(), tcrflow_core::FlowError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(U256);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(U256::ZERO);

    /// Wraps a raw 256-bit value.
    pub fn new(value: U256) -> Self {
        Self(value)
    }

    /// Parses a base-10 string.
    ///
    /// # Errors
    ///
    /// Returns [`FlowError::InvalidAmount`] for empty, signed, non-decimal
    /// or out-of-range input. Surrounding whitespace is not stripped.
    pub fn from_decimal(input: &str) -> Result<Self, FlowError> {
        if input.is_empty() {
            return Err(FlowError::invalid_amount(input, "empty amount"));
        }
        if input.starts_with('-') {
            return Err(FlowError::invalid_amount(input, "amount must not be negative"));
        }
        if !input.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FlowError::invalid_amount(input, "amount must be a base-10 integer"));
        }
        input
            .parse::<U256>()
            .map(Self)
            .map_err(|_| FlowError::invalid_amount(input, "amount exceeds 256 bits"))
    }

    /// Returns the underlying 256-bit value.
    pub fn as_u256(&self) -> U256 {
        self.0
    }

    /// Returns `true` if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Exact subtraction; `None` if `rhs` is larger.
    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Self)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = FlowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal(s)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(U256::from(value))
    }
}

impl From<U256> for Amount {
    fn from(value: U256) -> Self {
        Self(value)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

/// Required versus currently approved allowance for one pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowanceState {
    /// Amount the upcoming action will spend.
    pub required: Amount,
    /// Amount the spender is already allowed to transfer.
    pub approved: Amount,
}

impl AllowanceState {
    /// Creates a new allowance state.
    pub fn new(required: Amount, approved: Amount) -> Self {
        Self { required, approved }
    }

    /// Returns `true` if the approved amount does not cover the requirement.
    pub fn needs_top_up(&self) -> bool {
        self.approved < self.required
    }

    /// Missing allowance, present only when a top-up is needed.
    pub fn deficit(&self) -> Option<Amount> {
        if self.needs_top_up() {
            self.required.checked_sub(self.approved)
        } else {
            None
        }
    }

    /// Resolves this state. See [`resolve`].
    pub fn resolve(&self) -> Resolution {
        match self.deficit() {
            Some(deficit) => Resolution::TopUp { deficit },
            None => Resolution::Sufficient,
        }
    }
}

/// Outcome of an allowance check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The approved amount already covers the requirement.
    Sufficient,
    /// More allowance must be approved before acting.
    TopUp {
        /// Exact shortfall, always greater than zero.
        deficit: Amount,
    },
}

impl Resolution {
    /// Returns `true` for [`Resolution::TopUp`].
    pub fn needs_top_up(&self) -> bool {
        matches!(self, Resolution::TopUp { .. })
    }

    /// Returns the deficit for [`Resolution::TopUp`].
    pub fn deficit(&self) -> Option<Amount> {
        match self {
            Resolution::TopUp { deficit } => Some(*deficit),
            Resolution::Sufficient => None,
        }
    }
}

/// Decides whether `approved` must be topped up to cover `required`.
///
/// # Examples
///
/// ```
/// use tcrflow_core::{resolve, Amount, Resolution};
///
/// let r = resolve(Amount::from(100), Amount::from(40));
/// assert_eq!(r, Resolution::TopUp { deficit: Amount::from(60) });
///
/// assert_eq!(resolve(Amount::from(100), Amount::from(150)), Resolution::Sufficient);
/// ```
pub fn resolve(required: Amount, approved: Amount) -> Resolution {
    AllowanceState::new(required, approved).resolve()
}

/// Like [`resolve`], but parses both amounts from decimal strings first.
///
/// # Errors
///
/// Returns [`FlowError::InvalidAmount`] if either input is malformed.
pub fn resolve_decimal(required: &str, approved: &str) -> Result<Resolution, FlowError> {
    Ok(resolve(required.parse()?, approved.parse()?))
}
