use std::time::Instant;

use clap::Args;
use serde_json::{json, Value};

use solar_viability_core::tariff::RegulatorySchedule;
use solar_viability_core::types::with_metadata;

use crate::input;

/// Arguments for the surcharge lookup.
#[derive(Args)]
pub struct SurchargeArgs {
    /// Calendar year to resolve
    #[arg(long)]
    pub year: i32,

    /// Path to a JSON file with a custom schedule; defaults to the
    /// built-in 2023-2028 ramp
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_surcharge(args: SurchargeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();

    let schedule: RegulatorySchedule = match args.input {
        Some(ref path) => input::file::read_json(path)?,
        None => RegulatorySchedule::default(),
    };
    let fraction = schedule.surcharge_fraction(args.year);

    let output = with_metadata(
        "Wire-use fee surcharge lookup",
        &json!({
            "year": args.year,
            "custom_schedule": args.input.is_some(),
        }),
        Vec::new(),
        start.elapsed().as_micros() as u64,
        json!({ "surcharge_fraction": fraction }),
    );

    Ok(serde_json::to_value(output)?)
}
