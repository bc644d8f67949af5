use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ViabilityError;
use crate::types::{Energy, Rate, MONTHS};
use crate::ViabilityResult;

/// Twelve months of estimated generation and metered consumption, kWh,
/// indexed Jan..Dec.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyEnergyProfile {
    pub generation: [Energy; MONTHS],
    pub consumption: [Energy; MONTHS],
}

/// Physical split of one month's energy flows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBalance {
    /// Generation consumed on site without touching the grid.
    pub self_consumed: Energy,
    /// Energy drawn from the grid (consumption not covered by generation).
    pub imported: Energy,
    /// Surplus generation injected into the grid.
    pub exported: Energy,
}

impl MonthlyEnergyProfile {
    /// Build a profile from slices, rejecting anything that is not exactly
    /// 12 entries per series. Upstream data of the wrong shape never
    /// reaches the balance calculator.
    pub fn from_slices(generation: &[Energy], consumption: &[Energy]) -> ViabilityResult<Self> {
        let generation: [Energy; MONTHS] =
            generation
                .try_into()
                .map_err(|_| ViabilityError::InvalidInput {
                    field: "generation".into(),
                    reason: format!("Expected {MONTHS} monthly entries, got {}", generation.len()),
                })?;
        let consumption: [Energy; MONTHS] =
            consumption
                .try_into()
                .map_err(|_| ViabilityError::InvalidInput {
                    field: "consumption".into(),
                    reason: format!(
                        "Expected {MONTHS} monthly entries, got {}",
                        consumption.len()
                    ),
                })?;
        Ok(Self {
            generation,
            consumption,
        })
    }

    /// The same profile with every month's generation scaled by `factor`
    /// (panel output degradation). Consumption is untouched.
    pub fn scaled_generation(&self, factor: Rate) -> Self {
        let mut scaled = self.clone();
        for g in &mut scaled.generation {
            *g *= factor;
        }
        scaled
    }

    /// Split each month into self-consumed, imported, and exported energy.
    ///
    /// Negative inputs are clamped to zero before the split, so for every
    /// month `self_consumed + exported == generation` and
    /// `self_consumed + imported == consumption` hold on the clamped
    /// values.
    pub fn monthly_balance(&self) -> [MonthlyBalance; MONTHS] {
        let mut out = [MonthlyBalance {
            self_consumed: Decimal::ZERO,
            imported: Decimal::ZERO,
            exported: Decimal::ZERO,
        }; MONTHS];

        for (m, slot) in out.iter_mut().enumerate() {
            let gen = self.generation[m].max(Decimal::ZERO);
            let cons = self.consumption[m].max(Decimal::ZERO);
            let self_consumed = gen.min(cons);
            *slot = MonthlyBalance {
                self_consumed,
                imported: cons - self_consumed,
                exported: gen - self_consumed,
            };
        }

        out
    }

    /// Total annual generation after clamping negatives to zero.
    pub fn annual_generation(&self) -> Energy {
        self.generation
            .iter()
            .map(|g| (*g).max(Decimal::ZERO))
            .sum()
    }
}
