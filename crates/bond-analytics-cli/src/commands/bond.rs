use chrono::NaiveDate;
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use bond_analytics_core::calculator::{self, BondInputs};
use bond_analytics_core::pricing;
use bond_analytics_core::schedule::{self, ScheduleInput};
use bond_analytics_core::solver::YtmMethod;
use bond_analytics_core::types::CouponFrequency;

use crate::input;

/// Arguments for a full bond calculation
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct CalculateArgs {
    /// Face (par) value of the bond
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate as a decimal (e.g. 0.05 for 5%)
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Observed market price
    #[arg(long)]
    pub market_price: Option<Decimal>,

    /// Years to maturity
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Coupon payments per year: 1 = annual, 2 = semi-annual
    #[arg(long)]
    pub frequency: Option<u8>,

    /// YTM root-finding strategy: bisection or newton-raphson
    #[arg(long, default_value = "bisection")]
    pub method: String,

    /// Schedule anchor date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let inputs: BondInputs = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        BondInputs {
            face_value: args
                .face_value
                .ok_or("--face-value is required (or provide --input)")?,
            annual_coupon_rate: args
                .coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            market_price: args
                .market_price
                .ok_or("--market-price is required (or provide --input)")?,
            years_to_maturity: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            coupon_frequency: parse_frequency(
                args.frequency
                    .ok_or("--frequency is required (or provide --input)")?,
            )?,
            ytm_method: parse_method(&args.method)?,
            schedule_start_date: args.start_date,
        }
    };

    let result = calculator::calculate(&inputs)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a standalone cash-flow schedule
#[derive(Args)]
pub struct ScheduleArgs {
    /// Face (par) value of the bond
    #[arg(long)]
    pub face_value: Option<Decimal>,

    /// Annual coupon rate as a decimal
    #[arg(long)]
    pub coupon_rate: Option<Decimal>,

    /// Years to maturity
    #[arg(long)]
    pub years: Option<Decimal>,

    /// Coupon payments per year: 1 = annual, 2 = semi-annual
    #[arg(long)]
    pub frequency: Option<u8>,

    /// Schedule anchor date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let schedule_input: ScheduleInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        ScheduleInput {
            face_value: args
                .face_value
                .ok_or("--face-value is required (or provide --input)")?,
            annual_coupon_rate: args
                .coupon_rate
                .ok_or("--coupon-rate is required (or provide --input)")?,
            coupon_frequency: parse_frequency(
                args.frequency
                    .ok_or("--frequency is required (or provide --input)")?,
            )?,
            years_to_maturity: args
                .years
                .ok_or("--years is required (or provide --input)")?,
            start_date: args.start_date,
        }
    };

    let result = schedule::build_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for pricing at an explicit discount rate
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PriceArgs {
    /// Annual discount rate as a decimal
    #[arg(long)]
    pub rate: Decimal,

    /// Face (par) value of the bond
    #[arg(long)]
    pub face_value: Decimal,

    /// Annual coupon rate as a decimal
    #[arg(long)]
    pub coupon_rate: Decimal,

    /// Years to maturity
    #[arg(long)]
    pub years: Decimal,

    /// Coupon payments per year: 1 = annual, 2 = semi-annual
    #[arg(long, default_value_t = 1)]
    pub frequency: u8,
}

pub fn run_price(args: PriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let frequency = parse_frequency(args.frequency)?;

    let mut warnings = Vec::new();
    let periods = schedule::resolve_period_count(args.years, frequency, &mut warnings)?;

    let periodic_rate = args.rate / frequency.as_decimal();
    if periodic_rate <= Decimal::NEGATIVE_ONE {
        return Err("periodic discount rate must stay above -100%".into());
    }
    let periodic_coupon = args.face_value * args.coupon_rate / frequency.as_decimal();
    let price = pricing::bond_price(periodic_rate, periodic_coupon, args.face_value, periods);

    Ok(serde_json::json!({
        "result": {
            "price": price.round_dp(4),
            "periodicRate": periodic_rate,
            "periods": periods,
        },
        "warnings": warnings,
    }))
}

fn parse_frequency(value: u8) -> Result<CouponFrequency, Box<dyn std::error::Error>> {
    CouponFrequency::try_from(value).map_err(Into::into)
}

fn parse_method(value: &str) -> Result<YtmMethod, Box<dyn std::error::Error>> {
    match value {
        "bisection" => Ok(YtmMethod::Bisection),
        "newton" | "newton-raphson" => Ok(YtmMethod::NewtonRaphson),
        other => Err(format!(
            "unknown YTM method '{other}' (expected 'bisection' or 'newton-raphson')"
        )
        .into()),
    }
}
