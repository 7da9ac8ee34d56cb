//! Present value of a fixed-coupon bullet bond at a periodic discount rate.
//!
//! Both functions are pure and total for any rate above -100%. Discount
//! factors are accumulated by repeated multiplication rather than `powd`,
//! and all intermediate steps use checked arithmetic: when compounding
//! overflows the Decimal range the result saturates (price at
//! `Decimal::MAX`, derivative at `Decimal::MIN`). The solver only inspects
//! the sign of `price - market_price` in that regime, so saturation is a
//! usable stand-in for the mathematically unbounded value near -100%.

use rust_decimal::Decimal;

use crate::types::{Money, Rate};

/// Present value of the coupon stream plus principal:
///
///   price(r) = sum_{t=1}^{n} coupon / (1+r)^t + face / (1+r)^n
///
/// `rate` is the periodic discount rate and must stay above -1.
pub fn bond_price(rate: Rate, coupon: Money, face_value: Money, periods: u32) -> Money {
    let one_plus_r = Decimal::ONE + rate;
    let mut price = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for _ in 0..periods {
        discount = match discount.checked_mul(one_plus_r) {
            Some(d) => d,
            // Compounding overflow: the remaining terms are negligible.
            None => return price,
        };
        if discount.is_zero() {
            // Rate pinned near -100%: discounted payments explode.
            return Decimal::MAX;
        }
        let term = match coupon.checked_div(discount) {
            Some(t) => t,
            None => return Decimal::MAX,
        };
        price = match price.checked_add(term) {
            Some(p) => p,
            None => return Decimal::MAX,
        };
    }

    match face_value
        .checked_div(discount)
        .and_then(|pv| price.checked_add(pv))
    {
        Some(p) => p,
        None => Decimal::MAX,
    }
}

/// Analytic first derivative of [`bond_price`] with respect to the rate:
///
///   d(price)/dr = -sum_{t=1}^{n} t * coupon / (1+r)^(t+1)
///                 - n * face / (1+r)^(n+1)
///
/// Always non-positive for non-negative cash flows. Used by the
/// Newton-Raphson strategy.
pub fn bond_price_derivative(rate: Rate, coupon: Money, face_value: Money, periods: u32) -> Decimal {
    let one_plus_r = Decimal::ONE + rate;
    let mut derivative = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for t in 1..=periods {
        discount = match discount.checked_mul(one_plus_r) {
            Some(d) => d,
            None => return derivative,
        };
        let denom = match discount.checked_mul(one_plus_r) {
            Some(d) if !d.is_zero() => d,
            _ => return Decimal::MIN,
        };
        let term = match Decimal::from(t)
            .checked_mul(coupon)
            .and_then(|num| num.checked_div(denom))
        {
            Some(v) => v,
            None => return Decimal::MIN,
        };
        derivative = match derivative.checked_sub(term) {
            Some(v) => v,
            None => return Decimal::MIN,
        };
    }

    let denom = match discount.checked_mul(one_plus_r) {
        Some(d) if !d.is_zero() => d,
        _ => return Decimal::MIN,
    };
    match Decimal::from(periods)
        .checked_mul(face_value)
        .and_then(|num| num.checked_div(denom))
        .and_then(|pv| derivative.checked_sub(pv))
    {
        Some(v) => v,
        None => Decimal::MIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn par_bond_prices_at_face() {
        // Coupon rate equal to the discount rate: PV = face value
        let price = bond_price(dec!(0.05), dec!(50), dec!(1000), 10);
        assert!(
            (price - dec!(1000)).abs() < dec!(0.0000001),
            "par bond should price at face, got {price}"
        );
    }

    #[test]
    fn zero_rate_prices_at_undiscounted_sum() {
        let price = bond_price(Decimal::ZERO, dec!(25), dec!(1000), 20);
        assert_eq!(price, dec!(1500));
    }

    #[test]
    fn price_decreases_as_rate_rises() {
        let low = bond_price(dec!(0.03), dec!(50), dec!(1000), 10);
        let high = bond_price(dec!(0.07), dec!(50), dec!(1000), 10);
        assert!(high < low, "price must be decreasing in the rate");
    }

    #[test]
    fn price_saturates_near_negative_hundred_percent() {
        let price = bond_price(dec!(-0.9999), dec!(50), dec!(1000), 10);
        assert_eq!(price, Decimal::MAX);
    }

    #[test]
    fn deep_compounding_converges_to_zero_price() {
        // (1+r)^n overflows Decimal at 100% per period over 200 periods;
        // the remaining discounted terms are negligible, not an error.
        let price = bond_price(dec!(1.0), dec!(25), dec!(1000), 200);
        assert!(price >= Decimal::ZERO);
        assert!(price < dec!(30), "deeply discounted price should be tiny, got {price}");
    }

    #[test]
    fn derivative_matches_finite_difference() {
        let coupon = dec!(50);
        let face = dec!(1000);
        let r = dec!(0.05);
        let h = dec!(0.000001);

        let analytic = bond_price_derivative(r, coupon, face, 10);
        let numeric =
            (bond_price(r + h, coupon, face, 10) - bond_price(r - h, coupon, face, 10)) / (dec!(2) * h);

        assert!(analytic < Decimal::ZERO);
        assert!(
            (analytic - numeric).abs() < dec!(0.01),
            "analytic {analytic} vs finite difference {numeric}"
        );
    }

    #[test]
    fn zero_coupon_derivative_only_carries_principal() {
        let derivative = bond_price_derivative(Decimal::ZERO, Decimal::ZERO, dec!(1000), 10);
        // -n * face / (1+0)^(n+1) = -10000
        assert_eq!(derivative, dec!(-10000));
    }
}
