use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::cashflow::{CashFlowYear, ProjectFinancials};
use crate::error::ViabilityError;
use crate::time_value;
use crate::types::{Money, Rate, Years};
use crate::ViabilityResult;

/// Initial guess for the IRR root-find.
const IRR_INITIAL_GUESS: Decimal = dec!(0.10);

/// Investment metrics derived from an immutable cash-flow series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialResult {
    pub npv: Money,
    /// `None` when the root-find did not converge — distinct from a
    /// genuine 0% IRR.
    pub irr: Option<Rate>,
    /// Years to recover capex from nominal flows; `horizon + 1` means
    /// never within the horizon.
    pub simple_payback_years: Years,
    /// Same, accumulating discounted flows.
    pub discounted_payback_years: Years,
    /// Levelized cost of energy, currency per kWh.
    pub lcoe: Money,
    pub roi: Rate,
    pub profitability_index: Decimal,
    pub cash_flows: Vec<CashFlowYear>,
}

/// Derive all investment metrics from a projected cash-flow series.
///
/// Read-only over the series; a malformed series (empty, or a lone year
/// 0) is a reported configuration error, not a partial result.
pub fn compute_metrics(
    financials: &ProjectFinancials,
    cash_flows: Vec<CashFlowYear>,
    warnings: &mut Vec<String>,
) -> ViabilityResult<FinancialResult> {
    if cash_flows.len() < 2 {
        return Err(ViabilityError::InsufficientData(
            "Metrics require year 0 plus at least one projection year".into(),
        ));
    }
    if financials.capex <= Decimal::ZERO {
        return Err(ViabilityError::DivisionByZero {
            context: "ROI/profitability index with non-positive capex".into(),
        });
    }

    let horizon = (cash_flows.len() - 1) as u32;
    let flows: Vec<Money> = cash_flows.iter().map(|y| y.net_cash_flow).collect();

    let npv = time_value::npv(financials.discount_rate, &flows)?;

    let irr = match time_value::irr(&flows, IRR_INITIAL_GUESS) {
        Ok(rate) => Some(rate),
        Err(ViabilityError::ConvergenceFailure { iterations, .. }) => {
            warnings.push(format!(
                "IRR did not converge within {iterations} iterations; reported as unavailable"
            ));
            None
        }
        Err(e) => return Err(e),
    };

    let simple_payback_years = payback(&cash_flows, horizon, |y| y.cumulative_nominal);
    let discounted_payback_years = payback(&cash_flows, horizon, |y| y.cumulative_discounted);

    let lcoe = compute_lcoe(financials, &cash_flows, warnings)?;

    let total_nominal_savings: Money = cash_flows[1..].iter().map(|y| y.net_cash_flow).sum();
    let roi = (total_nominal_savings - financials.capex) / financials.capex;
    let profitability_index = (npv + financials.capex) / financials.capex;

    Ok(FinancialResult {
        npv,
        irr,
        simple_payback_years,
        discounted_payback_years,
        lcoe,
        roi,
        profitability_index,
        cash_flows,
    })
}

/// First year the cumulative series turns non-negative, linearly
/// interpolated within the crossing year. `horizon + 1` when it never
/// does.
fn payback(
    cash_flows: &[CashFlowYear],
    horizon: u32,
    accessor: impl Fn(&CashFlowYear) -> Money,
) -> Years {
    let first_cumulative = accessor(&cash_flows[0]);
    if first_cumulative >= Decimal::ZERO {
        return Decimal::ZERO;
    }

    let mut prev_cumulative = first_cumulative;
    for (i, year) in cash_flows.iter().enumerate().skip(1) {
        let cumulative = accessor(year);
        if cumulative >= Decimal::ZERO {
            // Interpolate within the crossing year. The step from the
            // previous cumulative to this one is the year's contribution
            // on the same (nominal or discounted) basis.
            let step = cumulative - prev_cumulative;
            let fraction = if step > Decimal::ZERO {
                -prev_cumulative / step
            } else {
                Decimal::ZERO
            };
            return Decimal::from(i as u32 - 1) + fraction;
        }
        prev_cumulative = cumulative;
    }

    Decimal::from(horizon + 1)
}

/// Total discounted lifecycle cost (capex + O&M − salvage) over total
/// discounted generated energy.
fn compute_lcoe(
    financials: &ProjectFinancials,
    cash_flows: &[CashFlowYear],
    warnings: &mut Vec<String>,
) -> ViabilityResult<Money> {
    let one_plus_r = Decimal::ONE + financials.discount_rate;

    let mut discounted_cost = financials.capex;
    let mut discounted_energy = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for year in &cash_flows[1..] {
        discount *= one_plus_r;
        if discount.is_zero() {
            return Err(ViabilityError::DivisionByZero {
                context: format!("LCOE discount factor at year {}", year.year),
            });
        }
        discounted_cost += year.om_cost / discount;
        discounted_energy += year.energy_generated / discount;
    }

    // `discount` now holds the horizon-year factor
    discounted_cost -= financials.capex * financials.salvage_pct / discount;

    if discounted_energy.is_zero() {
        warnings.push("No energy generated over the horizon; LCOE reported as zero".into());
        return Ok(Decimal::ZERO);
    }

    Ok(discounted_cost / discounted_energy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn financials(capex: Money, horizon_years: u32, discount_rate: Rate) -> ProjectFinancials {
        ProjectFinancials {
            capex,
            horizon_years,
            base_year: 2023,
            discount_rate,
            energy_inflation: Decimal::ZERO,
            degradation_rate: Decimal::ZERO,
            salvage_pct: Decimal::ZERO,
            om_cost_pct: Decimal::ZERO,
            om_inflation: Decimal::ZERO,
        }
    }

    /// Build a series by hand: year 0 outflow, then constant net flows.
    fn series(capex: Money, net: Money, years: u32, rate: Rate) -> Vec<CashFlowYear> {
        let one_plus_r = Decimal::ONE + rate;
        let mut out = vec![CashFlowYear {
            year: 0,
            net_cash_flow: -capex,
            cumulative_nominal: -capex,
            cumulative_discounted: -capex,
            tariff_rate: Decimal::ZERO,
            surcharge: Decimal::ZERO,
            energy_generated: Decimal::ZERO,
            om_cost: Decimal::ZERO,
        }];
        let mut cumulative_nominal = -capex;
        let mut cumulative_discounted = -capex;
        let mut discount = Decimal::ONE;
        for year in 1..=years {
            cumulative_nominal += net;
            discount *= one_plus_r;
            cumulative_discounted += net / discount;
            out.push(CashFlowYear {
                year,
                net_cash_flow: net,
                cumulative_nominal,
                cumulative_discounted,
                tariff_rate: Decimal::ZERO,
                surcharge: Decimal::ZERO,
                energy_generated: dec!(12000),
                om_cost: Decimal::ZERO,
            });
        }
        out
    }

    #[test]
    fn test_npv_zero_rate_is_plain_sum() {
        let fin = financials(dec!(1000), 4, Decimal::ZERO);
        let flows = series(dec!(1000), dec!(300), 4, Decimal::ZERO);
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        assert_eq!(result.npv, dec!(200));
    }

    #[test]
    fn test_simple_payback_interpolates() {
        // 1000 recovered at 300/year: crossing inside year 4 at 1/3
        let fin = financials(dec!(1000), 6, Decimal::ZERO);
        let flows = series(dec!(1000), dec!(300), 6, Decimal::ZERO);
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        let expected = dec!(3) + dec!(100) / dec!(300);
        assert!((result.simple_payback_years - expected).abs() < dec!(0.000001));
    }

    #[test]
    fn test_payback_sentinel_when_never_recovered() {
        let fin = financials(dec!(1000), 5, dec!(0.08));
        let flows = series(dec!(1000), dec!(-50), 5, dec!(0.08));
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        assert_eq!(result.simple_payback_years, dec!(6));
        assert_eq!(result.discounted_payback_years, dec!(6));
    }

    #[test]
    fn test_discounted_payback_lags_simple() {
        let fin = financials(dec!(1000), 10, dec!(0.10));
        let flows = series(dec!(1000), dec!(300), 10, dec!(0.10));
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        assert!(result.discounted_payback_years > result.simple_payback_years);
    }

    #[test]
    fn test_positive_flows_pay_back_within_horizon() {
        let fin = financials(dec!(1000), 6, Decimal::ZERO);
        let flows = series(dec!(1000), dec!(300), 6, Decimal::ZERO);
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        assert!(result.simple_payback_years <= dec!(6));
    }

    #[test]
    fn test_irr_unavailable_when_no_sign_change() {
        let fin = financials(dec!(1000), 3, dec!(0.08));
        let flows = series(dec!(1000), dec!(-100), 3, dec!(0.08));
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        assert!(result.irr.is_none());
        assert!(warnings.iter().any(|w| w.contains("IRR")));
    }

    #[test]
    fn test_irr_converged_satisfies_npv_zero() {
        let fin = financials(dec!(1000), 5, dec!(0.08));
        let flows = series(dec!(1000), dec!(300), 5, dec!(0.08));
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        let rate = result.irr.expect("should converge");
        let nominal: Vec<Money> = result.cash_flows.iter().map(|y| y.net_cash_flow).collect();
        let residual = crate::time_value::npv(rate, &nominal).unwrap();
        assert!(residual.abs() < dec!(0.001));
    }

    #[test]
    fn test_roi_and_profitability_index() {
        let fin = financials(dec!(1000), 4, Decimal::ZERO);
        let flows = series(dec!(1000), dec!(500), 4, Decimal::ZERO);
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        // Savings 2000 over capex 1000
        assert_eq!(result.roi, dec!(1));
        // NPV at 0% = 1000; PI = (1000 + 1000) / 1000 = 2
        assert_eq!(result.profitability_index, dec!(2));
    }

    #[test]
    fn test_lcoe_hand_computed() {
        // 2 years, rate 0: cost = capex 1000, energy = 24000 kWh
        let fin = financials(dec!(1000), 2, Decimal::ZERO);
        let flows = series(dec!(1000), dec!(100), 2, Decimal::ZERO);
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        let expected = dec!(1000) / dec!(24000);
        assert!((result.lcoe - expected).abs() < dec!(0.000001));
    }

    #[test]
    fn test_lcoe_zero_energy_warns() {
        let fin = financials(dec!(1000), 2, Decimal::ZERO);
        let mut flows = series(dec!(1000), dec!(-10), 2, Decimal::ZERO);
        for y in &mut flows {
            y.energy_generated = Decimal::ZERO;
        }
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, flows, &mut warnings).unwrap();
        assert_eq!(result.lcoe, Decimal::ZERO);
        assert!(warnings.iter().any(|w| w.contains("LCOE")));
    }

    #[test]
    fn test_payback_zero_when_nothing_to_recover() {
        let flows = series(Decimal::ZERO, dec!(100), 3, Decimal::ZERO);
        assert_eq!(payback(&flows, 3, |y| y.cumulative_nominal), Decimal::ZERO);
    }

    #[test]
    fn test_rejects_empty_series() {
        let fin = financials(dec!(1000), 2, Decimal::ZERO);
        let mut warnings = Vec::new();
        let result = compute_metrics(&fin, Vec::new(), &mut warnings);
        assert!(matches!(result, Err(ViabilityError::InsufficientData(_))));
    }
}
