//! Periodic cash-flow schedule for a bullet bond.
//!
//! Payment dates use calendar month arithmetic (start date advanced by
//! `period * (12 / frequency)` months) with the day clamped to the target
//! month's length. Principal is repaid in full at maturity: every row
//! carries the face value except the last, which drops to zero.

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::{BondAnalyticsError, FieldViolation};
use crate::types::{
    with_metadata, CashFlowRow, ComputationOutput, CouponFrequency, Money, Rate, Years,
};
use crate::BondResult;

/// Monetary figures in schedule rows are rounded to this many places.
const MONETARY_DP: u32 = 4;

/// Input for building a cash-flow schedule on its own, without a full
/// calculation. The orchestrator bypasses this and calls
/// [`schedule_rows`] with its already-resolved period count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub face_value: Money,
    /// Nominal annual coupon as a fraction of face value (0.05 = 5%).
    pub annual_coupon_rate: Rate,
    pub coupon_frequency: CouponFrequency,
    pub years_to_maturity: Years,
    /// First period is dated one coupon interval after this. Defaults to
    /// today.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Build the full schedule from a standalone request, validating bounds
/// and resolving the period count.
pub fn build_schedule(input: &ScheduleInput) -> BondResult<ComputationOutput<Vec<CashFlowRow>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_schedule_input(input)?;
    let periods = resolve_period_count(input.years_to_maturity, input.coupon_frequency, &mut warnings)?;

    let start_date = input.start_date.unwrap_or_else(|| Utc::now().date_naive());
    let rows = schedule_rows(
        input.face_value,
        input.annual_coupon_rate,
        input.coupon_frequency,
        periods,
        start_date,
    );

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "principal_repayment": "bullet at maturity",
        "date_arithmetic": "calendar months, day clamped to month end",
        "monetary_dp": MONETARY_DP,
    });

    Ok(with_metadata(
        "Bullet bond cash-flow schedule",
        &assumptions,
        warnings,
        elapsed,
        rows,
    ))
}

/// Produce `periods` rows in ascending period order.
pub fn schedule_rows(
    face_value: Money,
    annual_coupon_rate: Rate,
    frequency: CouponFrequency,
    periods: u32,
    start_date: NaiveDate,
) -> Vec<CashFlowRow> {
    let coupon_payment = face_value * annual_coupon_rate / frequency.as_decimal();
    let months_per_period = frequency.months_per_period();

    let mut rows = Vec::with_capacity(periods as usize);
    let mut cumulative = Decimal::ZERO;

    for period in 1..=periods {
        cumulative += coupon_payment;

        let payment_date = add_months(start_date, period as i32 * months_per_period);
        let remaining_principal = if period == periods {
            Decimal::ZERO
        } else {
            face_value
        };

        rows.push(CashFlowRow {
            period,
            payment_date,
            coupon_payment: coupon_payment.round_dp(MONETARY_DP),
            cumulative_interest: cumulative.round_dp(MONETARY_DP),
            remaining_principal: remaining_principal.round_dp(MONETARY_DP),
        });
    }

    rows
}

/// Number of coupon periods implied by the maturity and frequency.
///
/// `years * frequency` is rounded to the nearest whole period (half away
/// from zero); a non-integral product is accepted with a warning, while a
/// product that rounds to zero is a validation failure.
pub fn resolve_period_count(
    years_to_maturity: Years,
    frequency: CouponFrequency,
    warnings: &mut Vec<String>,
) -> BondResult<u32> {
    let raw = years_to_maturity * frequency.as_decimal();
    let rounded = raw.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

    let periods = rounded.to_u32().unwrap_or(0);
    if periods == 0 {
        return Err(BondAnalyticsError::Validation(vec![FieldViolation::new(
            "years_to_maturity",
            format!(
                "Maturity of {years_to_maturity} years at {} payments per year \
                 yields no whole coupon period",
                frequency.per_year()
            ),
        )]));
    }

    if rounded != raw {
        warnings.push(format!(
            "Non-integral period count {raw} rounded to {periods}"
        ));
    }

    Ok(periods)
}

fn validate_schedule_input(input: &ScheduleInput) -> BondResult<()> {
    let mut violations = Vec::new();

    if input.face_value <= Decimal::ZERO {
        violations.push(FieldViolation::new(
            "face_value",
            "Face value must be positive",
        ));
    }
    if input.annual_coupon_rate < Decimal::ZERO || input.annual_coupon_rate > Decimal::ONE {
        violations.push(FieldViolation::new(
            "annual_coupon_rate",
            "Annual coupon rate must be between 0 and 1",
        ));
    }
    if input.years_to_maturity <= Decimal::ZERO || input.years_to_maturity > Decimal::from(100) {
        violations.push(FieldViolation::new(
            "years_to_maturity",
            "Years to maturity must be positive and at most 100",
        ));
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(BondAnalyticsError::Validation(violations))
    }
}

/// Add a number of months to a date, clamping the day to the month's max.
fn add_months(date: NaiveDate, months: i32) -> NaiveDate {
    let total_months = date.year() * 12 + date.month() as i32 - 1 + months;
    let new_year = total_months.div_euclid(12);
    let new_month = (total_months.rem_euclid(12) + 1) as u32;
    let max_day = days_in_month(new_year, new_month);
    let day = date.day().min(max_day);
    NaiveDate::from_ymd_opt(new_year, new_month, day).unwrap_or(date)
}

/// Number of days in a given month/year.
fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn annual_schedule_has_one_row_per_year() {
        let rows = schedule_rows(
            dec!(1000),
            dec!(0.05),
            CouponFrequency::Annual,
            10,
            date(2024, 1, 15),
        );

        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].payment_date, date(2025, 1, 15));
        assert_eq!(rows[9].payment_date, date(2034, 1, 15));
        for row in &rows {
            assert_eq!(row.coupon_payment, dec!(50.0000));
        }
    }

    #[test]
    fn semi_annual_dates_advance_six_months() {
        let rows = schedule_rows(
            dec!(1000),
            dec!(0.05),
            CouponFrequency::SemiAnnual,
            4,
            date(2024, 3, 10),
        );

        let dates: Vec<NaiveDate> = rows.iter().map(|r| r.payment_date).collect();
        assert_eq!(
            dates,
            vec![
                date(2024, 9, 10),
                date(2025, 3, 10),
                date(2025, 9, 10),
                date(2026, 3, 10),
            ]
        );
    }

    #[test]
    fn month_end_days_clamp() {
        // August 31st + 6 months lands on February 29th in a leap year.
        let rows = schedule_rows(
            dec!(1000),
            dec!(0.05),
            CouponFrequency::SemiAnnual,
            2,
            date(2023, 8, 31),
        );

        assert_eq!(rows[0].payment_date, date(2024, 2, 29));
        assert_eq!(rows[1].payment_date, date(2024, 8, 31));
    }

    #[test]
    fn cumulative_interest_accumulates_the_coupon() {
        let rows = schedule_rows(
            dec!(1000),
            dec!(0.06),
            CouponFrequency::SemiAnnual,
            4,
            date(2024, 1, 1),
        );

        let cumulative: Vec<Decimal> = rows.iter().map(|r| r.cumulative_interest).collect();
        assert_eq!(cumulative, vec![dec!(30), dec!(60), dec!(90), dec!(120)]);
    }

    #[test]
    fn principal_is_bullet_repaid_at_maturity() {
        let rows = schedule_rows(
            dec!(1000),
            dec!(0.05),
            CouponFrequency::Annual,
            5,
            date(2024, 1, 1),
        );

        for row in &rows[..4] {
            assert_eq!(row.remaining_principal, dec!(1000));
        }
        assert_eq!(rows[4].remaining_principal, Decimal::ZERO);
    }

    #[test]
    fn monetary_figures_round_to_four_places() {
        let rows = schedule_rows(
            dec!(999.99),
            dec!(0.0123),
            CouponFrequency::SemiAnnual,
            2,
            date(2024, 1, 1),
        );

        // 999.99 * 0.0123 / 2 = 6.1499385
        assert_eq!(rows[0].coupon_payment, dec!(6.1499));
        assert_eq!(rows[1].cumulative_interest, dec!(12.2999));
    }

    #[test]
    fn period_count_is_years_times_frequency() {
        let mut warnings = Vec::new();
        let periods =
            resolve_period_count(dec!(10), CouponFrequency::SemiAnnual, &mut warnings).unwrap();
        assert_eq!(periods, 20);
        assert!(warnings.is_empty());
    }

    #[test]
    fn fractional_period_count_rounds_with_warning() {
        let mut warnings = Vec::new();
        let periods =
            resolve_period_count(dec!(2.75), CouponFrequency::SemiAnnual, &mut warnings).unwrap();
        assert_eq!(periods, 6);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("rounded"));
    }

    #[test]
    fn zero_period_count_is_rejected() {
        let mut warnings = Vec::new();
        let err = resolve_period_count(dec!(0.1), CouponFrequency::Annual, &mut warnings);
        assert!(matches!(err, Err(BondAnalyticsError::Validation(_))));
    }

    #[test]
    fn standalone_schedule_validates_bounds() {
        let input = ScheduleInput {
            face_value: Decimal::ZERO,
            annual_coupon_rate: dec!(1.5),
            coupon_frequency: CouponFrequency::Annual,
            years_to_maturity: dec!(10),
            start_date: None,
        };

        let err = build_schedule(&input).unwrap_err();
        let violations = err.violations().expect("validation failure expected");
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn standalone_schedule_builds_rows() {
        let input = ScheduleInput {
            face_value: dec!(1000),
            annual_coupon_rate: dec!(0.05),
            coupon_frequency: CouponFrequency::SemiAnnual,
            years_to_maturity: dec!(3),
            start_date: Some(date(2024, 6, 30)),
        };

        let output = build_schedule(&input).unwrap();
        assert_eq!(output.result.len(), 6);
        assert!(output.warnings.is_empty());
        assert_eq!(output.result[5].remaining_principal, Decimal::ZERO);
    }
}
