use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::allocation::{allocate_month, validate_remote_units, CreditValuation, RemoteUnit};
use crate::energy::MonthlyEnergyProfile;
use crate::error::ViabilityError;
use crate::tariff::{CreditPolicy, RegulatorySchedule, TariffClass};
use crate::types::{Energy, Money, Rate};
use crate::ViabilityResult;

/// Financial configuration of one project. All rates are fractions
/// (0.08 = 8%), converted at the caller's boundary exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectFinancials {
    /// Equipment and installation cost, paid in full at year 0.
    pub capex: Money,
    /// Projection horizon in years, at least 1.
    pub horizon_years: u32,
    /// Calendar year of the first operating year (regulatory lookups).
    pub base_year: i32,
    /// Discount rate for present-value metrics.
    pub discount_rate: Rate,
    /// Annual energy-price inflation applied to all tariff components.
    pub energy_inflation: Rate,
    /// Annual panel output degradation.
    pub degradation_rate: Rate,
    /// End-of-life salvage value as a fraction of capex.
    pub salvage_pct: Rate,
    /// First-year O&M cost as a fraction of capex.
    pub om_cost_pct: Rate,
    /// Annual O&M cost inflation.
    pub om_inflation: Rate,
}

impl ProjectFinancials {
    pub fn validate(&self) -> ViabilityResult<()> {
        let invalid = |field: &str, reason: String| ViabilityError::InvalidInput {
            field: field.into(),
            reason,
        };

        if self.capex <= Decimal::ZERO {
            return Err(invalid("capex", "Capital expenditure must be positive".into()));
        }
        if self.horizon_years == 0 {
            return Err(invalid("horizon_years", "Project horizon must be at least 1 year".into()));
        }
        if self.discount_rate <= Decimal::NEGATIVE_ONE {
            return Err(invalid("discount_rate", "Discount rate must be greater than -100%".into()));
        }
        if self.energy_inflation <= Decimal::NEGATIVE_ONE {
            return Err(invalid("energy_inflation", "Inflation rate must be greater than -100%".into()));
        }
        if self.om_inflation <= Decimal::NEGATIVE_ONE {
            return Err(invalid("om_inflation", "Inflation rate must be greater than -100%".into()));
        }
        if self.degradation_rate < Decimal::ZERO || self.degradation_rate > Decimal::ONE {
            return Err(invalid(
                "degradation_rate",
                format!("Degradation must be in [0, 1], got {}", self.degradation_rate),
            ));
        }
        if self.salvage_pct < Decimal::ZERO {
            return Err(invalid("salvage_pct", "Salvage value cannot be negative".into()));
        }
        if self.om_cost_pct < Decimal::ZERO {
            return Err(invalid("om_cost_pct", "O&M cost cannot be negative".into()));
        }

        Ok(())
    }
}

/// One settled year of the projection. Computed once, immutable after.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowYear {
    /// 0 = project start (capex outflow, no production).
    pub year: u32,
    pub net_cash_flow: Money,
    pub cumulative_nominal: Money,
    pub cumulative_discounted: Money,
    /// Inflated local import price in effect this year.
    pub tariff_rate: Money,
    /// Regulatory surcharge fraction in effect this year.
    pub surcharge: Rate,
    /// Degraded annual generation, kWh.
    pub energy_generated: Energy,
    pub om_cost: Money,
}

/// Project the full year-0..=horizon cash-flow series.
///
/// Configuration errors surface here before any year is produced; the
/// only silent corrections are the documented non-negative energy clamps
/// in the monthly balance.
pub fn project_cash_flows(
    financials: &ProjectFinancials,
    profile: &MonthlyEnergyProfile,
    local_tariff: &TariffClass,
    remote_units: &[RemoteUnit],
    schedule: &RegulatorySchedule,
    policy: CreditPolicy,
    warnings: &mut Vec<String>,
) -> ViabilityResult<Vec<CashFlowYear>> {
    financials.validate()?;
    local_tariff.validate("local_tariff")?;
    validate_remote_units(remote_units)?;

    let horizon = financials.horizon_years;
    let mut years = Vec::with_capacity(horizon as usize + 1);

    let mut cumulative_nominal = -financials.capex;
    let mut cumulative_discounted = -financials.capex;
    years.push(CashFlowYear {
        year: 0,
        net_cash_flow: -financials.capex,
        cumulative_nominal,
        cumulative_discounted,
        tariff_rate: Decimal::ZERO,
        surcharge: Decimal::ZERO,
        energy_generated: Decimal::ZERO,
        om_cost: Decimal::ZERO,
    });

    let one_plus_r = Decimal::ONE + financials.discount_rate;
    let mut discount = Decimal::ONE;
    let mut total_uncredited = Decimal::ZERO;

    for year in 1..=horizon {
        let age = Decimal::from(year - 1);
        let degradation_factor = (Decimal::ONE - financials.degradation_rate).powd(age);
        let degraded = profile.scaled_generation(degradation_factor);
        let balances = degraded.monthly_balance();

        let calendar_year = financials.base_year + year as i32 - 1;
        let surcharge = schedule.surcharge_fraction(calendar_year);
        let import_price = local_tariff.import_cost(year, financials.energy_inflation);
        let demand_charge = local_tariff.monthly_demand_charge(year, financials.energy_inflation);

        let ctx = CreditValuation {
            year,
            inflation: financials.energy_inflation,
            surcharge,
            policy,
            local_tariff,
        };

        let mut cost_without_system = Decimal::ZERO;
        let mut cost_with_system = Decimal::ZERO;
        for (month, balance) in balances.iter().enumerate() {
            let consumption = balance.self_consumed + balance.imported;
            cost_without_system += consumption * import_price;

            let allocation = allocate_month(balance.exported, month, remote_units, &ctx);
            total_uncredited += allocation.uncredited;
            cost_with_system +=
                balance.imported * import_price + demand_charge - allocation.total_value();
        }

        let om_cost = financials.capex
            * financials.om_cost_pct
            * (Decimal::ONE + financials.om_inflation).powd(age);

        let mut net_cash_flow = (cost_without_system - cost_with_system) - om_cost;
        if year == horizon {
            net_cash_flow += financials.capex * financials.salvage_pct;
        }

        cumulative_nominal += net_cash_flow;
        discount *= one_plus_r;
        if discount.is_zero() {
            return Err(ViabilityError::DivisionByZero {
                context: format!("cash-flow discount factor at year {year}"),
            });
        }
        cumulative_discounted += net_cash_flow / discount;

        years.push(CashFlowYear {
            year,
            net_cash_flow,
            cumulative_nominal,
            cumulative_discounted,
            tariff_rate: import_price,
            surcharge,
            energy_generated: degraded.annual_generation(),
            om_cost,
        });
    }

    if total_uncredited > Decimal::ZERO {
        warnings.push(format!(
            "{total_uncredited} kWh of allocated export credits exceeded remote-unit consumption and carried no value"
        ));
    }

    Ok(years)
}
