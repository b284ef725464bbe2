//! Fixed-point money value scaled to hundredths of the base currency.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Precision of a [`Unit`]: two decimal places.
const PRECISION: i64 = 100;

/// A monetary amount stored as an integer number of hundredths.
///
/// Arithmetic on `Unit` is ordinary integer arithmetic; there is no implicit
/// rounding after `+`/`-`, only at the `from_f64` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Unit(i64);

impl Unit {
    pub const ZERO: Unit = Unit(0);

    /// Rounds `f` to the nearest hundredth and returns the scaled [`Unit`].
    ///
    /// `±0.0`, `NaN`, and `±infinity` all map to zero.
    pub fn from_f64(f: f64) -> Unit {
        if !f.is_finite() || f == 0.0 {
            return Unit(0);
        }
        Unit((f * PRECISION as f64).round() as i64)
    }

    /// Rounds `f` to the nearest hundredth using round-half-to-even, the
    /// convention the Accrual engine uses for percent-rule computation.
    pub fn from_f64_banker(f: f64) -> Unit {
        if !f.is_finite() || f == 0.0 {
            return Unit(0);
        }
        Unit((f * PRECISION as f64).round_ties_even() as i64)
    }

    /// A whole-percent share of `self`, rounded half-to-even to the
    /// hundredth. `percent` is a plain integer (`30` means 30%).
    pub fn percent_of(self, percent: i64) -> Unit {
        Unit::from_f64_banker(self.to_f64() * percent as f64 / 100.0)
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / PRECISION as f64
    }

    /// Scaled integer representation (hundredths). Used by the sqlx codec.
    pub fn as_scaled_i64(self) -> i64 {
        self.0
    }

    pub fn from_scaled_i64(v: i64) -> Unit {
        Unit(v)
    }

    pub fn checked_add(self, other: Unit) -> Option<Unit> {
        self.0.checked_add(other.0).map(Unit)
    }

    pub fn checked_sub(self, other: Unit) -> Option<Unit> {
        self.0.checked_sub(other.0).map(Unit)
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }
}

impl std::ops::Add for Unit {
    type Output = Unit;
    fn add(self, rhs: Unit) -> Unit {
        Unit(self.0 + rhs.0)
    }
}

impl std::ops::Sub for Unit {
    type Output = Unit;
    fn sub(self, rhs: Unit) -> Unit {
        Unit(self.0 - rhs.0)
    }
}

impl std::iter::Sum for Unit {
    fn sum<I: Iterator<Item = Unit>>(iter: I) -> Unit {
        iter.fold(Unit::ZERO, |acc, u| acc + u)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.to_f64())
    }
}

impl Serialize for Unit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Unit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: Option<f64> = Option::deserialize(deserializer)?;
        Ok(Unit::from_f64(value.unwrap_or(0.0)))
    }
}

impl sqlx::Type<sqlx::Postgres> for Unit {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Encode<'_, sqlx::Postgres> for Unit {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> sqlx::encode::IsNull {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

impl sqlx::Decode<'_, sqlx::Postgres> for Unit {
    fn decode(
        value: sqlx::postgres::PgValueRef<'_>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let raw = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Unit(raw))
    }
}

/// Nullable variant for columns where `NULL` means "no accrual yet", as
/// opposed to an explicit zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullUnit {
    pub unit: Unit,
    pub valid: bool,
}

impl Serialize for NullUnit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if self.valid {
            self.unit.serialize(serializer)
        } else {
            serializer.serialize_none()
        }
    }
}

impl sqlx::Type<sqlx::Postgres> for NullUnit {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl sqlx::Decode<'_, sqlx::Postgres> for NullUnit {
    fn decode(
        value: sqlx::postgres::PgValueRef<'_>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        if value.is_null() {
            return Ok(NullUnit { unit: Unit::ZERO, valid: false });
        }
        let raw = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(NullUnit { unit: Unit(raw), valid: true })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn special_cases_map_to_zero() {
        assert_eq!(Unit::from_f64(0.0), Unit::ZERO);
        assert_eq!(Unit::from_f64(-0.0), Unit::ZERO);
        assert_eq!(Unit::from_f64(f64::NAN), Unit::ZERO);
        assert_eq!(Unit::from_f64(f64::INFINITY), Unit::ZERO);
        assert_eq!(Unit::from_f64(f64::NEG_INFINITY), Unit::ZERO);
    }

    #[test]
    fn rounds_half_to_nearest_hundredth() {
        assert_eq!(Unit::from_f64(749.997).to_f64(), 750.00);
        assert_eq!(Unit::from_f64(2499.99).as_scaled_i64(), 249_999);
    }

    #[test]
    fn json_roundtrip() {
        let u = Unit::from_f64(123.45);
        let json = serde_json::to_string(&u).unwrap();
        let back: Unit = serde_json::from_str(&json).unwrap();
        assert_eq!(u, back);
    }

    #[test]
    fn json_null_decodes_to_zero() {
        let back: Unit = serde_json::from_str("null").unwrap();
        assert_eq!(back, Unit::ZERO);
    }

    #[test]
    fn percent_of_matches_tefal_example() {
        let price = Unit::from_f64(2499.99);
        assert_eq!(price.percent_of(30), Unit::from_f64(750.00));
    }

    #[test]
    fn banker_rounding_breaks_ties_to_even() {
        assert_eq!(Unit::from_f64_banker(0.125).as_scaled_i64(), 12);
        assert_eq!(Unit::from_f64_banker(0.135).as_scaled_i64(), 14);
    }

    #[quickcheck]
    fn format_is_within_half_cent(f: f64) -> bool {
        if !f.is_finite() || f.abs() >= 1e12 {
            return true;
        }
        let got = Unit::from_f64(f).to_f64();
        (got - f).abs() <= 5e-3
    }
}
