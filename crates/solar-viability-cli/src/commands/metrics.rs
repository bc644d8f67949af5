use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use solar_viability_core::time_value;
use solar_viability_core::types::with_metadata;
use solar_viability_core::ViabilityError;

/// Arguments for a standalone NPV calculation.
#[derive(Args)]
pub struct NpvArgs {
    /// Discount rate as a fraction (e.g. 0.08 for 8%)
    #[arg(long)]
    pub rate: Decimal,

    /// Comma-separated cash flows, first at t = 0 (outflows negative)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<Decimal>,
}

/// Arguments for a standalone IRR calculation.
#[derive(Args)]
pub struct IrrArgs {
    /// Comma-separated cash flows, first at t = 0 (outflows negative)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true, required = true)]
    pub cash_flows: Vec<Decimal>,

    /// Initial guess for the Newton-Raphson iteration
    #[arg(long, default_value = "0.10")]
    pub guess: Decimal,
}

pub fn run_npv(args: NpvArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let npv = time_value::npv(args.rate, &args.cash_flows)?;

    let output = with_metadata(
        "Net Present Value (discrete annual discounting)",
        &json!({
            "rate": args.rate,
            "periods": args.cash_flows.len(),
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        json!({ "npv": npv }),
    );

    Ok(serde_json::to_value(output)?)
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();

    // Non-convergence is an answer, not a failure: the rate is reported
    // as null with a warning, matching the full evaluation.
    let mut warnings = Vec::new();
    let irr: Option<Decimal> = match time_value::irr(&args.cash_flows, args.guess) {
        Ok(rate) => Some(rate),
        Err(ViabilityError::ConvergenceFailure {
            iterations,
            last_delta,
            ..
        }) => {
            warnings.push(format!(
                "IRR did not converge after {iterations} iterations (last delta {last_delta}); no rate reported"
            ));
            None
        }
        Err(e) => return Err(e.into()),
    };

    let output = with_metadata(
        "Internal Rate of Return (Newton-Raphson)",
        &json!({
            "guess": args.guess,
            "tolerance": time_value::IRR_TOLERANCE,
            "max_iterations": time_value::MAX_IRR_ITERATIONS,
            "periods": args.cash_flows.len(),
        }),
        warnings,
        start.elapsed().as_micros() as u64,
        json!({ "irr": irr }),
    );

    Ok(serde_json::to_value(output)?)
}
