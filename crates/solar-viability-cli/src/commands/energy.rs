use std::time::Instant;

use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use solar_viability_core::energy::MonthlyEnergyProfile;
use solar_viability_core::types::with_metadata;

/// Arguments for the monthly energy balance.
#[derive(Args)]
pub struct BalanceArgs {
    /// Twelve comma-separated monthly generation estimates, kWh
    #[arg(long, value_delimiter = ',', required = true)]
    pub generation: Vec<Decimal>,

    /// Twelve comma-separated monthly consumption readings, kWh
    #[arg(long, value_delimiter = ',', required = true)]
    pub consumption: Vec<Decimal>,
}

pub fn run_balance(args: BalanceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let profile = MonthlyEnergyProfile::from_slices(&args.generation, &args.consumption)?;
    let balance = profile.monthly_balance();

    let annual_self_consumed: Decimal = balance.iter().map(|m| m.self_consumed).sum();
    let annual_imported: Decimal = balance.iter().map(|m| m.imported).sum();
    let annual_exported: Decimal = balance.iter().map(|m| m.exported).sum();

    let output = with_metadata(
        "Monthly net-metering energy balance",
        &json!({
            "annual_generation": profile.annual_generation(),
            "annual_self_consumed": annual_self_consumed,
            "annual_imported": annual_imported,
            "annual_exported": annual_exported,
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        balance.to_vec(),
    );

    Ok(serde_json::to_value(output)?)
}
