use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::Value;

use solar_viability_core::cashflow::ProjectFinancials;
use solar_viability_core::energy::MonthlyEnergyProfile;
use solar_viability_core::tariff::TariffClass;
use solar_viability_core::viability::{evaluate_project, ViabilityInput};

use crate::input;

/// Arguments for the full viability run.
///
/// A JSON document (via `--input` or piped stdin) supports the complete
/// configuration including remote units and custom schedules; the flags
/// cover the common flat-tariff single-unit case.
#[derive(Args)]
pub struct EvaluateArgs {
    /// Path to a JSON file with the full ViabilityInput document
    #[arg(long)]
    pub input: Option<String>,

    /// Capital expenditure
    #[arg(long)]
    pub capex: Option<Decimal>,

    /// Project horizon in years
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Calendar year of the first operating year
    #[arg(long, default_value = "2024")]
    pub base_year: i32,

    /// Discount rate as a fraction (e.g. 0.08 for 8%)
    #[arg(long, default_value = "0.08")]
    pub discount_rate: Decimal,

    /// Annual energy-price inflation as a fraction
    #[arg(long, default_value = "0.045")]
    pub energy_inflation: Decimal,

    /// Annual panel output degradation as a fraction
    #[arg(long, default_value = "0.005")]
    pub degradation: Decimal,

    /// End-of-life salvage value as a fraction of capex
    #[arg(long, default_value = "0")]
    pub salvage_pct: Decimal,

    /// First-year O&M cost as a fraction of capex
    #[arg(long, default_value = "0.01")]
    pub om_cost_pct: Decimal,

    /// Annual O&M cost inflation as a fraction
    #[arg(long, default_value = "0")]
    pub om_inflation: Decimal,

    /// Twelve comma-separated monthly generation estimates, kWh
    #[arg(long, value_delimiter = ',')]
    pub generation: Option<Vec<Decimal>>,

    /// Twelve comma-separated monthly consumption readings, kWh
    #[arg(long, value_delimiter = ',')]
    pub consumption: Option<Vec<Decimal>>,

    /// Flat tariff commodity component, currency/kWh
    #[arg(long)]
    pub energy_price: Option<Decimal>,

    /// Flat tariff wire/transport component, currency/kWh
    #[arg(long)]
    pub transport_price: Option<Decimal>,
}

pub fn run_evaluate(args: EvaluateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let viability_input: ViabilityInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        build_from_flags(&args)?
    };

    let result = evaluate_project(&viability_input)?;
    Ok(serde_json::to_value(result)?)
}

fn build_from_flags(args: &EvaluateArgs) -> Result<ViabilityInput, Box<dyn std::error::Error>> {
    let generation = args
        .generation
        .as_deref()
        .ok_or("--generation is required (or provide --input)")?;
    let consumption = args
        .consumption
        .as_deref()
        .ok_or("--consumption is required (or provide --input)")?;
    let profile = MonthlyEnergyProfile::from_slices(generation, consumption)?;

    Ok(ViabilityInput {
        financials: ProjectFinancials {
            capex: args.capex.ok_or("--capex is required (or provide --input)")?,
            horizon_years: args
                .horizon
                .ok_or("--horizon is required (or provide --input)")?,
            base_year: args.base_year,
            discount_rate: args.discount_rate,
            energy_inflation: args.energy_inflation,
            degradation_rate: args.degradation,
            salvage_pct: args.salvage_pct,
            om_cost_pct: args.om_cost_pct,
            om_inflation: args.om_inflation,
        },
        profile,
        local_tariff: TariffClass::FlatRate {
            energy_price: args
                .energy_price
                .ok_or("--energy-price is required (or provide --input)")?,
            transport_price: args.transport_price.unwrap_or(dec!(0)),
        },
        remote_units: Vec::new(),
        schedule: Default::default(),
        credit_policy: Default::default(),
    })
}
