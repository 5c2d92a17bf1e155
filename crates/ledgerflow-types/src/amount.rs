use crate::error::TypesError;
use std::fmt;
use std::str::FromStr;

/// Currency amount in the smallest unit.
///
/// Arithmetic is explicit: every operation that can leave the `u128`
/// range is `checked_*` or `saturating_*`. There are no operator impls.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(u128);

impl Amount {
    pub const ZERO: Self = Self(0);
    pub const MAX: Self = Self(u128::MAX);

    pub const fn new(value: u128) -> Self {
        Self(value)
    }

    pub const fn get(&self) -> u128 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition
    pub fn checked_add(&self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(&self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Checked multiplication by a scalar
    pub fn checked_mul(&self, factor: u128) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    pub fn saturating_add(&self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    pub fn saturating_sub(&self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// `floor(self * percent / 100)`.
    ///
    /// Split as `(self / 100) * percent + (self % 100) * percent / 100` so no
    /// intermediate exceeds the result. `None` only when the result itself
    /// does not fit, which needs `percent > 100`.
    pub fn percent_of(&self, percent: u8) -> Option<Self> {
        let p = u128::from(percent);
        let (whole, rest) = (self.0 / 100, self.0 % 100);
        whole.checked_mul(p)?.checked_add(rest * p / 100).map(Self)
    }

    /// `ceil(self * percent / 100)`, split the same way as [`Amount::percent_of`].
    pub fn percent_of_ceil(&self, percent: u8) -> Option<Self> {
        let p = u128::from(percent);
        let (whole, rest) = (self.0 / 100, self.0 % 100);
        whole.checked_mul(p)?.checked_add((rest * p + 99) / 100).map(Self)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(u128::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self(u128::from(value))
    }
}

impl From<Amount> for u128 {
    fn from(value: Amount) -> Self {
        value.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl FromStr for Amount {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned: String = s.chars().filter(|c| *c != '_').collect();
        if cleaned.is_empty() {
            return Err(TypesError::InvalidAmount(s.to_string()));
        }
        Ok(Self(cleaned.parse::<u128>()?))
    }
}
