use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Number of coupon payments per year. The wire representation is the
/// plain count: 1 = annual, 2 = semi-annual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum CouponFrequency {
    Annual,
    SemiAnnual,
}

impl CouponFrequency {
    pub fn per_year(self) -> u32 {
        match self {
            CouponFrequency::Annual => 1,
            CouponFrequency::SemiAnnual => 2,
        }
    }

    /// Length of one coupon period in calendar months.
    pub fn months_per_period(self) -> i32 {
        12 / self.per_year() as i32
    }

    pub fn as_decimal(self) -> Decimal {
        Decimal::from(self.per_year())
    }
}

impl TryFrom<u8> for CouponFrequency {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(CouponFrequency::Annual),
            2 => Ok(CouponFrequency::SemiAnnual),
            other => Err(format!(
                "Coupon frequency must be 1 (annual) or 2 (semi-annual), got {other}"
            )),
        }
    }
}

impl From<CouponFrequency> for u8 {
    fn from(value: CouponFrequency) -> Self {
        value.per_year() as u8
    }
}

/// One row of the periodic cash-flow schedule, in ascending period order.
/// Field names follow the wire format consumed by the serving layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowRow {
    /// 1-based sequential period number.
    pub period: u32,
    /// Schedule start date advanced by `period * (12 / frequency)` months.
    pub payment_date: NaiveDate,
    /// Fixed periodic coupon = face value * annual rate / frequency.
    pub coupon_payment: Money,
    /// Running sum of coupon payments through this period (no compounding).
    pub cumulative_interest: Money,
    /// Face value until the final period, 0 at maturity (bullet repayment).
    pub remaining_principal: Money,
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    /// Numeric degeneracy flags (rate clamping, solver fallback, fractional
    /// period truncation). Never fatal.
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coupon_frequency_round_trips_through_wire_count() {
        let annual: CouponFrequency = serde_json::from_str("1").unwrap();
        assert_eq!(annual, CouponFrequency::Annual);
        assert_eq!(serde_json::to_string(&annual).unwrap(), "1");

        let semi: CouponFrequency = serde_json::from_str("2").unwrap();
        assert_eq!(semi, CouponFrequency::SemiAnnual);
        assert_eq!(semi.months_per_period(), 6);
    }

    #[test]
    fn coupon_frequency_rejects_unsupported_counts() {
        let err = serde_json::from_str::<CouponFrequency>("4");
        assert!(err.is_err());
    }

    #[test]
    fn cash_flow_row_serializes_camel_case() {
        let row = CashFlowRow {
            period: 1,
            payment_date: NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
            coupon_payment: Decimal::new(250000, 4),
            cumulative_interest: Decimal::new(250000, 4),
            remaining_principal: Decimal::from(1000),
        };

        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("paymentDate").is_some());
        assert!(json.get("remainingPrincipal").is_some());
        assert!(json.get("payment_date").is_none());
    }
}
