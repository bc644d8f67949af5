use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use solar_viability_core::allocation::RemoteUnit;
use solar_viability_core::cashflow::ProjectFinancials;
use solar_viability_core::energy::MonthlyEnergyProfile;
use solar_viability_core::tariff::{CreditPolicy, RegulatorySchedule, TariffClass};
use solar_viability_core::types::MONTHS;
use solar_viability_core::viability::{evaluate_project, ViabilityInput};
use solar_viability_core::ViabilityError;

// ===========================================================================
// Reference scenario: surplus residential system, flat tariff
// ===========================================================================

/// capex 100k, 1000 kWh/mo generation vs 600 kWh/mo consumption,
/// flat tariff 0.75/kWh (0.45 energy + 0.30 wire), 25-year horizon,
/// 8% discount, 4.5% inflation, 0.5%/yr degradation.
fn reference_input() -> ViabilityInput {
    ViabilityInput {
        financials: ProjectFinancials {
            capex: dec!(100000),
            horizon_years: 25,
            base_year: 2023,
            discount_rate: dec!(0.08),
            energy_inflation: dec!(0.045),
            degradation_rate: dec!(0.005),
            salvage_pct: Decimal::ZERO,
            om_cost_pct: dec!(0.01),
            om_inflation: dec!(0.045),
        },
        profile: MonthlyEnergyProfile {
            generation: [dec!(1000); MONTHS],
            consumption: [dec!(600); MONTHS],
        },
        local_tariff: TariffClass::FlatRate {
            energy_price: dec!(0.45),
            transport_price: dec!(0.30),
        },
        remote_units: Vec::new(),
        schedule: RegulatorySchedule::default(),
        credit_policy: CreditPolicy::DiscountTransportOnly,
    }
}

#[test]
fn test_reference_scenario_positive_cash_flows() {
    let output = evaluate_project(&reference_input()).unwrap();
    let result = &output.result;

    for year in &result.cash_flows[1..] {
        assert!(
            year.net_cash_flow > Decimal::ZERO,
            "year {}: expected positive net cash flow, got {}",
            year.year,
            year.net_cash_flow
        );
    }
}

#[test]
fn test_reference_scenario_first_year_figure() {
    // Hand-derived: without-system cost 600*12*0.75 = 5400; exports
    // 400*12 credited at 0.45 + 0.85*0.30 = 0.705 => 3384; O&M 1000.
    let output = evaluate_project(&reference_input()).unwrap();
    let year1 = &output.result.cash_flows[1];
    assert_eq!(year1.net_cash_flow, dec!(7784.00));
}

#[test]
fn test_reference_scenario_payback_and_npv() {
    let output = evaluate_project(&reference_input()).unwrap();
    let result = &output.result;

    assert!(
        result.simple_payback_years < dec!(20),
        "payback should be well under the 25-year horizon, got {}",
        result.simple_payback_years
    );
    assert!(
        result.npv > Decimal::ZERO,
        "NPV should be positive, got {}",
        result.npv
    );
    assert!(
        result.profitability_index > Decimal::ONE,
        "PI should exceed 1 when NPV > 0, got {}",
        result.profitability_index
    );
}

#[test]
fn test_reference_scenario_irr_exceeds_discount_rate() {
    let output = evaluate_project(&reference_input()).unwrap();
    let irr = output.result.irr.expect("IRR should converge");
    // NPV > 0 at 8% implies the zero-NPV rate sits above 8%
    assert!(irr > dec!(0.08), "IRR {irr} should exceed the discount rate");
}

#[test]
fn test_reference_scenario_lcoe_positive_and_sane() {
    let output = evaluate_project(&reference_input()).unwrap();
    let lcoe = output.result.lcoe;
    // ~116k of discounted cost over ~123k discounted kWh
    assert!(lcoe > dec!(0.5) && lcoe < dec!(1.5), "LCOE out of range: {lcoe}");
}

#[test]
fn test_full_credit_policy_lowers_value() {
    let transport_only = evaluate_project(&reference_input()).unwrap();

    let mut input = reference_input();
    input.credit_policy = CreditPolicy::DiscountFullCredit;
    let full_credit = evaluate_project(&input).unwrap();

    assert!(
        full_credit.result.npv < transport_only.result.npv,
        "discounting the whole credit must not improve NPV"
    );
}

// ===========================================================================
// Degenerate scenario: no generation at all
// ===========================================================================

#[test]
fn test_zero_generation_scenario() {
    let mut input = reference_input();
    input.profile.generation = [Decimal::ZERO; MONTHS];
    let output = evaluate_project(&input).unwrap();
    let result = &output.result;

    for year in &result.cash_flows[1..] {
        assert_eq!(
            year.net_cash_flow, -year.om_cost,
            "year {}: with no generation the only flow is O&M",
            year.year
        );
    }
    assert!(result.npv < Decimal::ZERO);
    assert_eq!(result.simple_payback_years, dec!(26), "horizon + 1 sentinel");
    assert_eq!(result.discounted_payback_years, dec!(26));
    assert!(result.irr.is_none(), "no sign change, IRR must be unavailable");
    assert!(output.warnings.iter().any(|w| w.contains("IRR")));
}

// ===========================================================================
// Remote units
// ===========================================================================

fn remote_tou_unit(share: Decimal) -> RemoteUnit {
    RemoteUnit {
        enabled: true,
        share,
        tariff: TariffClass::PeakOffPeak {
            peak_energy_price: dec!(1.20),
            off_peak_energy_price: dec!(0.40),
            peak_transport_price: dec!(0.50),
            off_peak_transport_price: dec!(0.25),
            peak_consumption_share: dec!(0.20),
            contracted_demand: None,
            demand_price: None,
        },
        consumption: [dec!(2000); MONTHS],
    }
}

#[test]
fn test_overcommitted_remote_shares_rejected() {
    let mut input = reference_input();
    input.remote_units = vec![remote_tou_unit(dec!(0.60)), remote_tou_unit(dec!(0.60))];

    let result = evaluate_project(&input);
    assert!(
        matches!(
            result,
            Err(ViabilityError::InvalidInput { ref field, .. }) if field == "remote_units"
        ),
        "expected a remote_units configuration error, got {result:?}"
    );
}

#[test]
fn test_remote_allocation_changes_credit_value_only() {
    // Same exported volume; moving 40% of it to a cheaper-credit unit
    // must change value, not energy accounting.
    let local_only = evaluate_project(&reference_input()).unwrap();

    let mut input = reference_input();
    let mut unit = remote_tou_unit(dec!(0.40));
    // Off-peak credit (0.40 + 0.25 wire) is below the local 0.45 + 0.30
    unit.tariff = TariffClass::PeakOffPeak {
        peak_energy_price: dec!(1.20),
        off_peak_energy_price: dec!(0.30),
        peak_transport_price: dec!(0.50),
        off_peak_transport_price: dec!(0.15),
        peak_consumption_share: dec!(0.20),
        contracted_demand: None,
        demand_price: None,
    };
    input.remote_units = vec![unit];
    let with_remote = evaluate_project(&input).unwrap();

    assert!(with_remote.result.npv < local_only.result.npv);
    assert_eq!(
        with_remote.result.cash_flows[1].energy_generated,
        local_only.result.cash_flows[1].energy_generated
    );
}

#[test]
fn test_disabled_remote_unit_is_inert() {
    let baseline = evaluate_project(&reference_input()).unwrap();

    let mut input = reference_input();
    let mut unit = remote_tou_unit(dec!(0.60));
    unit.enabled = false;
    input.remote_units = vec![unit];
    let with_disabled = evaluate_project(&input).unwrap();

    assert_eq!(baseline.result.npv, with_disabled.result.npv);
}

// ===========================================================================
// Configuration errors surface before projection
// ===========================================================================

#[test]
fn test_invalid_capex_rejected() {
    let mut input = reference_input();
    input.financials.capex = dec!(-5000);
    assert!(matches!(
        evaluate_project(&input),
        Err(ViabilityError::InvalidInput { ref field, .. }) if field == "capex"
    ));
}

#[test]
fn test_zero_horizon_rejected() {
    let mut input = reference_input();
    input.financials.horizon_years = 0;
    assert!(evaluate_project(&input).is_err());
}

#[test]
fn test_negative_tariff_rejected() {
    let mut input = reference_input();
    input.local_tariff = TariffClass::FlatRate {
        energy_price: dec!(-0.45),
        transport_price: dec!(0.30),
    };
    assert!(matches!(
        evaluate_project(&input),
        Err(ViabilityError::InvalidInput { ref field, .. }) if field == "local_tariff"
    ));
}

// ===========================================================================
// Schedule interaction
// ===========================================================================

#[test]
fn test_post_ramp_base_year_uses_full_surcharge() {
    let mut input = reference_input();
    input.financials.base_year = 2030;
    let output = evaluate_project(&input).unwrap();
    for year in &output.result.cash_flows[1..] {
        assert_eq!(year.surcharge, Decimal::ONE, "year {}", year.year);
    }

    // Full surcharge from day one means strictly less value than the
    // ramped-in 2023 start.
    let ramped = evaluate_project(&reference_input()).unwrap();
    assert!(output.result.npv < ramped.result.npv);
}

#[test]
fn test_pre_ramp_years_carry_no_surcharge() {
    let mut input = reference_input();
    input.financials.base_year = 2020;
    input.financials.horizon_years = 3;
    let output = evaluate_project(&input).unwrap();
    // 2020..2022 all precede the tabulated ramp
    for year in &output.result.cash_flows[1..] {
        assert_eq!(year.surcharge, Decimal::ZERO, "year {}", year.year);
    }
}
