use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};

use crate::error::ViabilityError;
use crate::types::{Money, Rate};
use crate::ViabilityResult;

/// Which part of an exported kWh's credit the wire-use fee discounts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditPolicy {
    /// Only the transport/wire component is charged back; the commodity
    /// portion is always credited in full.
    #[default]
    DiscountTransportOnly,
    /// The whole credit shrinks with the ramp.
    DiscountFullCredit,
}

/// Jurisdiction tariff class for one metered unit.
///
/// Both variants split each price into a commodity (energy) and a wire
/// (transport) component so the regulatory ramp can discount only the
/// wire portion of export credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TariffClass {
    /// Single-rate class: one price pair for every hour of the day.
    FlatRate {
        energy_price: Money,
        transport_price: Money,
    },
    /// Time-of-use class with an optional contracted-demand charge.
    PeakOffPeak {
        peak_energy_price: Money,
        off_peak_energy_price: Money,
        peak_transport_price: Money,
        off_peak_transport_price: Money,
        /// Fraction of the unit's consumption falling in peak hours.
        peak_consumption_share: Rate,
        /// Contracted demand in kW; requires `demand_price`.
        #[serde(skip_serializing_if = "Option::is_none")]
        contracted_demand: Option<Decimal>,
        /// Price per kW of contracted demand per month.
        #[serde(skip_serializing_if = "Option::is_none")]
        demand_price: Option<Money>,
    },
}

/// Compound price inflation from the base year: `(1 + rate)^(year - 1)`,
/// so year 1 prices are the configured base prices.
pub fn inflation_factor(rate: Rate, year: u32) -> Rate {
    debug_assert!(year >= 1);
    (Decimal::ONE + rate).powd(Decimal::from(year - 1))
}

impl TariffClass {
    /// Reject negative prices, out-of-range shares, and half-configured
    /// demand charges before any projection runs.
    pub fn validate(&self, field: &str) -> ViabilityResult<()> {
        let invalid = |reason: String| ViabilityError::InvalidInput {
            field: field.into(),
            reason,
        };

        match self {
            TariffClass::FlatRate {
                energy_price,
                transport_price,
            } => {
                if *energy_price < Decimal::ZERO || *transport_price < Decimal::ZERO {
                    return Err(invalid("Tariff prices must be non-negative".into()));
                }
            }
            TariffClass::PeakOffPeak {
                peak_energy_price,
                off_peak_energy_price,
                peak_transport_price,
                off_peak_transport_price,
                peak_consumption_share,
                contracted_demand,
                demand_price,
            } => {
                let prices = [
                    peak_energy_price,
                    off_peak_energy_price,
                    peak_transport_price,
                    off_peak_transport_price,
                ];
                if prices.iter().any(|p| **p < Decimal::ZERO) {
                    return Err(invalid("Tariff prices must be non-negative".into()));
                }
                if *peak_consumption_share < Decimal::ZERO
                    || *peak_consumption_share > Decimal::ONE
                {
                    return Err(invalid(format!(
                        "peak_consumption_share must be in [0, 1], got {peak_consumption_share}"
                    )));
                }
                match (contracted_demand, demand_price) {
                    (Some(d), Some(p)) => {
                        if *d < Decimal::ZERO || *p < Decimal::ZERO {
                            return Err(invalid(
                                "Contracted demand and demand price must be non-negative".into(),
                            ));
                        }
                    }
                    (None, None) => {}
                    _ => {
                        return Err(invalid(
                            "contracted_demand and demand_price must be set together".into(),
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Effective cost of one imported kWh in project year `year`.
    ///
    /// The time-of-use class blends peak and off-peak pricing by the
    /// configured peak consumption share.
    pub fn import_cost(&self, year: u32, inflation: Rate) -> Money {
        let factor = inflation_factor(inflation, year);
        match self {
            TariffClass::FlatRate {
                energy_price,
                transport_price,
            } => (energy_price + transport_price) * factor,
            TariffClass::PeakOffPeak {
                peak_energy_price,
                off_peak_energy_price,
                peak_transport_price,
                off_peak_transport_price,
                peak_consumption_share,
                ..
            } => {
                let peak = (peak_energy_price + peak_transport_price) * peak_consumption_share;
                let off_peak = (off_peak_energy_price + off_peak_transport_price)
                    * (Decimal::ONE - peak_consumption_share);
                (peak + off_peak) * factor
            }
        }
    }

    /// Effective credit for one exported kWh in project year `year`,
    /// discounted by the regulatory `surcharge` fraction per `policy`.
    ///
    /// Exports from the time-of-use class are valued at off-peak rates;
    /// solar injection happens outside the evening peak window.
    pub fn export_credit(
        &self,
        year: u32,
        inflation: Rate,
        surcharge: Rate,
        policy: CreditPolicy,
    ) -> Money {
        let factor = inflation_factor(inflation, year);
        let (energy, transport) = match self {
            TariffClass::FlatRate {
                energy_price,
                transport_price,
            } => (*energy_price, *transport_price),
            TariffClass::PeakOffPeak {
                off_peak_energy_price,
                off_peak_transport_price,
                ..
            } => (*off_peak_energy_price, *off_peak_transport_price),
        };

        let credit = match policy {
            CreditPolicy::DiscountTransportOnly => {
                energy + (Decimal::ONE - surcharge) * transport
            }
            CreditPolicy::DiscountFullCredit => {
                (Decimal::ONE - surcharge) * (energy + transport)
            }
        };
        credit * factor
    }

    /// Fixed monthly demand charge in project year `year`, independent of
    /// the energy flows. Zero for classes without a contracted demand.
    pub fn monthly_demand_charge(&self, year: u32, inflation: Rate) -> Money {
        match self {
            TariffClass::PeakOffPeak {
                contracted_demand: Some(demand),
                demand_price: Some(price),
                ..
            } => demand * price * inflation_factor(inflation, year),
            _ => Decimal::ZERO,
        }
    }
}
