use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::ViabilityError;
use crate::types::{Money, Rate};
use crate::ViabilityResult;

/// Convergence tolerance on |NPV| for the IRR root-find.
pub const IRR_TOLERANCE: Decimal = dec!(0.0000001);
/// Iteration budget for the IRR root-find.
pub const MAX_IRR_ITERATIONS: u32 = 100;
/// Lower clamp on the candidate rate (-99%).
pub const MIN_IRR_RATE: Decimal = dec!(-0.99);
/// Upper clamp on the candidate rate (1000%).
pub const MAX_IRR_RATE: Decimal = dec!(10.0);

/// Net Present Value of a series of cash flows, first flow at t = 0.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> ViabilityResult<Money> {
    if rate <= dec!(-1) {
        return Err(ViabilityError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(ViabilityError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Returns `ConvergenceFailure` if |NPV| does not drop below
/// [`IRR_TOLERANCE`] within [`MAX_IRR_ITERATIONS`]; callers must treat
/// that as "unavailable", never as a 0% rate.
pub fn irr(cash_flows: &[Money], guess: Rate) -> ViabilityResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(ViabilityError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        // Iterative discount factor avoids powd inside the hot loop
        let mut discount = Decimal::ONE;
        for (t, cf) in cash_flows.iter().enumerate() {
            if t > 0 {
                discount *= one_plus_r;
            }
            if discount.is_zero() {
                break;
            }
            npv_val += cf / discount;
            if t > 0 {
                let t_dec = Decimal::from(t as i64);
                dnpv -= t_dec * cf / (discount * one_plus_r);
            }
        }

        if npv_val.abs() < IRR_TOLERANCE {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(ViabilityError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < MIN_IRR_RATE {
            rate = MIN_IRR_RATE;
        } else if rate > MAX_IRR_RATE {
            rate = MAX_IRR_RATE;
        }
    }

    Err(ViabilityError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv(rate, cash_flows).unwrap_or(Decimal::MAX),
    })
}
