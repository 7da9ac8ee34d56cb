//! Full bond calculation: closed-form metrics, YTM solve, and cash-flow
//! schedule, assembled into a single output record.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{BondAnalyticsError, FieldViolation};
use crate::schedule;
use crate::solver::{self, YtmMethod};
use crate::types::{
    with_metadata, CashFlowRow, ComputationOutput, CouponFrequency, Money, Rate, Years,
};
use crate::BondResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Upper bound on face value and market price, guarding against extreme
/// compounding overflow.
const MAX_MONETARY_INPUT: Decimal = dec!(1000000000);

/// Hard maturity cap; bounds the schedule length and the pricing loops.
const MAX_YEARS_TO_MATURITY: Decimal = dec!(100);

/// Yields are reported to 6 decimal places, monetary totals to 4.
const YIELD_DP: u32 = 6;
const MONETARY_DP: u32 = 4;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input parameters for a bond calculation. Field names follow the wire
/// format consumed by the serving layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondInputs {
    /// Principal repaid at maturity.
    pub face_value: Money,
    /// Nominal annual coupon as a fraction of face value (0.05 = 5%).
    pub annual_coupon_rate: Rate,
    /// Observed trading price.
    pub market_price: Money,
    /// Time to redemption in years.
    pub years_to_maturity: Years,
    /// Coupon payments per year: 1 = annual, 2 = semi-annual.
    pub coupon_frequency: CouponFrequency,
    /// Root-finding strategy for the YTM solve. Defaults to bisection.
    #[serde(default)]
    pub ytm_method: YtmMethod,
    /// Anchor for the cash-flow schedule. Defaults to today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_start_date: Option<NaiveDate>,
}

/// Complete output of a bond calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BondOutputs {
    /// Annual coupon income divided by market price.
    pub current_yield: Rate,
    /// Annualized yield to maturity; `None` when no root is bracketed.
    pub ytm: Option<Rate>,
    /// Periodic coupon times the number of periods.
    pub total_interest_earned: Money,
    /// Trading above face value. Mutually exclusive with `is_discount`;
    /// both false at par.
    pub is_premium: bool,
    /// Trading below face value.
    pub is_discount: bool,
    pub cash_flow_schedule: Vec<CashFlowRow>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the full calculation. The input is never mutated; every call builds
/// a fresh result.
///
/// An unsolvable YTM is not an error: the output carries `ytm: None` and
/// every other field is still populated.
pub fn calculate(inputs: &BondInputs) -> BondResult<ComputationOutput<BondOutputs>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_inputs(inputs)?;
    let periods = schedule::resolve_period_count(
        inputs.years_to_maturity,
        inputs.coupon_frequency,
        &mut warnings,
    )?;

    let freq = inputs.coupon_frequency.as_decimal();
    let annual_coupon = inputs.face_value * inputs.annual_coupon_rate;
    let periodic_coupon = annual_coupon / freq;

    let current_yield = annual_coupon / inputs.market_price;

    let ytm = solver::solve_ytm(
        inputs.ytm_method,
        inputs.market_price,
        periodic_coupon,
        inputs.face_value,
        periods,
        inputs.coupon_frequency,
        &mut warnings,
    );

    let total_interest_earned = periodic_coupon * Decimal::from(periods);

    let start_date = inputs
        .schedule_start_date
        .unwrap_or_else(|| Utc::now().date_naive());
    let cash_flow_schedule = schedule::schedule_rows(
        inputs.face_value,
        inputs.annual_coupon_rate,
        inputs.coupon_frequency,
        periods,
        start_date,
    );

    let outputs = BondOutputs {
        current_yield: current_yield.round_dp(YIELD_DP),
        ytm: ytm.map(|r| r.round_dp(YIELD_DP)),
        total_interest_earned: total_interest_earned.round_dp(MONETARY_DP),
        is_premium: inputs.market_price > inputs.face_value,
        is_discount: inputs.market_price < inputs.face_value,
        cash_flow_schedule,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "ytm_method": inputs.ytm_method,
        "annualization": "nominal (periodic rate x frequency)",
        "principal_repayment": "bullet at maturity",
        "rounding": { "yield_dp": YIELD_DP, "monetary_dp": MONETARY_DP },
    });

    Ok(with_metadata(
        "Fixed-coupon bullet bond analytics",
        &assumptions,
        warnings,
        elapsed,
        outputs,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_inputs(inputs: &BondInputs) -> BondResult<()> {
    let mut violations = Vec::new();

    if inputs.face_value <= Decimal::ZERO {
        violations.push(FieldViolation::new(
            "face_value",
            "Face value must be positive",
        ));
    } else if inputs.face_value > MAX_MONETARY_INPUT {
        violations.push(FieldViolation::new(
            "face_value",
            "Face value must not exceed 1,000,000,000",
        ));
    }

    if inputs.annual_coupon_rate < Decimal::ZERO || inputs.annual_coupon_rate > Decimal::ONE {
        violations.push(FieldViolation::new(
            "annual_coupon_rate",
            "Annual coupon rate must be between 0 and 1",
        ));
    }

    if inputs.market_price <= Decimal::ZERO {
        violations.push(FieldViolation::new(
            "market_price",
            "Market price must be positive",
        ));
    } else if inputs.market_price > MAX_MONETARY_INPUT {
        violations.push(FieldViolation::new(
            "market_price",
            "Market price must not exceed 1,000,000,000",
        ));
    }

    if inputs.years_to_maturity <= Decimal::ZERO {
        violations.push(FieldViolation::new(
            "years_to_maturity",
            "Years to maturity must be positive",
        ));
    } else if inputs.years_to_maturity > MAX_YEARS_TO_MATURITY {
        violations.push(FieldViolation::new(
            "years_to_maturity",
            "Years to maturity must not exceed 100",
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(BondAnalyticsError::Validation(violations))
    }
}
