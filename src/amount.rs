//! Exact decimal amounts as the platform formats them
//!
//! Balances arrive as decimal strings ("1.000000", "50.00"). They are kept as
//! an integer mantissa plus a scale so the fee reserve can be taken off
//! without going through floating point.

use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Largest number of fractional digits accepted
pub const MAX_SCALE: u32 = 36;

/// Non-negative decimal amount: `mantissa / 10^scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Amount {
    mantissa: u128,
    scale: u32,
}

impl Amount {
    /// Zero with the given number of fractional digits
    pub fn zero(scale: u32) -> Self {
        Self { mantissa: 0, scale }
    }

    /// Parse a platform amount string
    ///
    /// Accepts plain digits with an optional fractional part. Signs,
    /// exponents and empty parts are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        if int_part.is_empty() || (s.contains('.') && frac_part.is_empty()) {
            return Err(Error::Decode(format!("Invalid amount: {:?}", s)));
        }

        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(Error::Decode(format!("Invalid amount: {:?}", s)));
        }

        let scale = frac_part.len() as u32;
        if scale > MAX_SCALE {
            return Err(Error::Decode(format!(
                "Amount {:?} has more than {} decimals",
                s, MAX_SCALE
            )));
        }

        let mantissa = format!("{}{}", int_part, frac_part)
            .parse::<u128>()
            .map_err(|_| Error::Decode(format!("Amount out of range: {:?}", s)))?;

        Ok(Self { mantissa, scale })
    }

    /// Number of fractional digits
    pub fn scale(&self) -> u32 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }

    /// This amount minus `percent`% of it, rounded down to the input's scale
    ///
    /// `0` returns the same amount, `100` returns zero.
    pub fn less_percent(&self, percent: u8) -> Result<Self> {
        self.less_percent_to_scale(percent, self.scale)
    }

    /// This amount minus `percent`% of it, with at most `max_scale` decimals
    ///
    /// The product is exact at two decimal places finer than the input, then
    /// truncated to `max_scale`. Truncation always rounds toward zero, so what
    /// stays behind is never less than the reserve. Trailing zeros are trimmed
    /// but never below the smaller of the input scale and `max_scale`.
    pub fn less_percent_to_scale(&self, percent: u8, max_scale: u32) -> Result<Self> {
        if percent > 100 {
            return Err(Error::Config(format!(
                "Percentage must be between 0 and 100, got {}",
                percent
            )));
        }

        let mut mantissa = self
            .mantissa
            .checked_mul(u128::from(100 - percent))
            .ok_or_else(|| Error::Decode(format!("Amount {} too large", self)))?;
        let mut scale = self.scale + 2;

        if scale > max_scale {
            let divisor = 10u128
                .checked_pow(scale - max_scale)
                .ok_or_else(|| Error::Decode(format!("Scale {} out of range", max_scale)))?;
            mantissa /= divisor;
            scale = max_scale;
        }

        let floor = self.scale.min(max_scale);
        while scale > floor && mantissa % 10 == 0 {
            mantissa /= 10;
            scale -= 1;
        }

        Ok(Self { mantissa, scale })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.mantissa);
        }

        let scale = self.scale as usize;
        let digits = format!("{:0>width$}", self.mantissa, width = scale + 1);
        let (int_part, frac_part) = digits.split_at(digits.len() - scale);
        write!(f, "{}.{}", int_part, frac_part)
    }
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amt(s: &str) -> Amount {
        Amount::parse(s).unwrap()
    }

    #[test]
    fn test_display_preserves_platform_format() {
        for s in ["0", "1", "1.000000", "50.00", "0.000001", "123456.789"] {
            assert_eq!(amt(s).to_string(), s);
        }
    }

    #[test]
    fn test_rejects_malformed() {
        for s in ["", ".5", "5.", "-1", "+1", "1e5", "1.2.3", "abc", " 1"] {
            assert!(Amount::parse(s).is_err(), "accepted {:?}", s);
        }
    }

    #[test]
    fn test_rejects_excess_scale() {
        let s = format!("0.{}", "1".repeat(37));
        assert!(Amount::parse(&s).is_err());
    }

    #[test]
    fn test_fee_reserve_twenty_percent() {
        assert_eq!(amt("1.000000").less_percent(20).unwrap().to_string(), "0.800000");
        assert_eq!(amt("10").less_percent(20).unwrap().to_string(), "8");
        assert_eq!(amt("0.05").less_percent(20).unwrap().to_string(), "0.04");
    }

    #[test]
    fn test_fee_reserve_rounds_down_to_input_scale() {
        // 0.000001 * 0.8 = 0.0000008, below the smallest unit the balance uses
        assert!(amt("0.000001").less_percent(20).unwrap().is_zero());
        // 0.000003 * 0.67 = 0.00000201
        assert_eq!(amt("0.000003").less_percent(33).unwrap().to_string(), "0.000002");
        assert_eq!(amt("7").less_percent(15).unwrap().to_string(), "5");
        assert_eq!(amt("7.00").less_percent(15).unwrap().to_string(), "5.95");
    }

    #[test]
    fn test_fee_reserve_to_token_decimals() {
        // balance already at full token precision
        let balance = amt("0.123456789012345679");
        let sent = balance.less_percent_to_scale(20, 18).unwrap();
        assert_eq!(sent.to_string(), "0.098765431209876543");
        assert!(sent.scale() <= 18);

        // a finer token keeps the extra digits
        assert_eq!(amt("0.000001").less_percent_to_scale(20, 18).unwrap().to_string(), "0.0000008");
        assert_eq!(amt("1.000000").less_percent_to_scale(20, 18).unwrap().to_string(), "0.800000");
    }

    #[test]
    fn test_fee_reserve_bounds() {
        let balance = amt("0.523100");
        assert_eq!(balance.less_percent(0).unwrap(), balance);
        assert_eq!(balance.less_percent(0).unwrap().to_string(), "0.523100");

        let all = balance.less_percent(100).unwrap();
        assert!(all.is_zero());
        assert_eq!(all.to_string(), "0.000000");

        assert!(balance.less_percent(101).is_err());
    }

    #[test]
    fn test_serde_as_string() {
        let a: Amount = serde_json::from_str(r#""2.50""#).unwrap();
        assert_eq!(a.to_string(), "2.50");
        assert_eq!(serde_json::to_string(&a).unwrap(), r#""2.50""#);
        assert!(serde_json::from_str::<Amount>(r#""-2""#).is_err());
    }
}
