use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::allocation::RemoteUnit;
use crate::cashflow::{project_cash_flows, ProjectFinancials};
use crate::energy::MonthlyEnergyProfile;
use crate::metrics::{compute_metrics, FinancialResult};
use crate::tariff::{CreditPolicy, RegulatorySchedule, TariffClass};
use crate::types::{with_metadata, ComputationOutput};
use crate::ViabilityResult;

/// Full configuration of one viability run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViabilityInput {
    pub financials: ProjectFinancials,
    pub profile: MonthlyEnergyProfile,
    pub local_tariff: TariffClass,
    #[serde(default)]
    pub remote_units: Vec<RemoteUnit>,
    #[serde(default)]
    pub schedule: RegulatorySchedule,
    #[serde(default)]
    pub credit_policy: CreditPolicy,
}

/// Run the full viability analysis for one project.
///
/// A deterministic pure computation: validates the configuration,
/// projects the year-0..=horizon cash flows, and derives the investment
/// metrics. Safe to call concurrently for independent projects.
pub fn evaluate_project(
    input: &ViabilityInput,
) -> ViabilityResult<ComputationOutput<FinancialResult>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let cash_flows = project_cash_flows(
        &input.financials,
        &input.profile,
        &input.local_tariff,
        &input.remote_units,
        &input.schedule,
        input.credit_policy,
        &mut warnings,
    )?;

    let result = compute_metrics(&input.financials, cash_flows, &mut warnings)?;

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Distributed-generation viability projection (net metering, wire-fee ramp)",
        &serde_json::json!({
            "capex": input.financials.capex.to_string(),
            "horizon_years": input.financials.horizon_years,
            "base_year": input.financials.base_year,
            "discount_rate": input.financials.discount_rate.to_string(),
            "energy_inflation": input.financials.energy_inflation.to_string(),
            "degradation_rate": input.financials.degradation_rate.to_string(),
            "remote_units": input.remote_units.iter().filter(|u| u.enabled).count(),
            "credit_policy": format!("{:?}", input.credit_policy),
        }),
        warnings,
        elapsed,
        result,
    ))
}
