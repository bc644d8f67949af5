use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ViabilityError;
use crate::types::Rate;
use crate::ViabilityResult;

/// Year-indexed wire-use fee ramp.
///
/// The jurisdiction charges an increasing fraction of the transport
/// component back against credited exports, year by year, until the
/// schedule runs out and the full fee applies. Injected wherever a
/// surcharge is needed so tests and other jurisdictions can supply their
/// own table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<i32, Rate>", into = "BTreeMap<i32, Rate>")]
pub struct RegulatorySchedule {
    entries: BTreeMap<i32, Rate>,
}

// Deserialization runs the same checks as `new()`, so a schedule read
// from JSON can never carry an out-of-range or decreasing ramp.
impl TryFrom<BTreeMap<i32, Rate>> for RegulatorySchedule {
    type Error = ViabilityError;

    fn try_from(entries: BTreeMap<i32, Rate>) -> Result<Self, Self::Error> {
        Self::new(entries)
    }
}

impl From<RegulatorySchedule> for BTreeMap<i32, Rate> {
    fn from(schedule: RegulatorySchedule) -> Self {
        schedule.entries
    }
}

impl RegulatorySchedule {
    /// Build a schedule, rejecting fractions outside [0, 1] and ramps
    /// that decrease between tabulated years.
    pub fn new(entries: BTreeMap<i32, Rate>) -> ViabilityResult<Self> {
        if entries.is_empty() {
            return Err(ViabilityError::InvalidInput {
                field: "entries".into(),
                reason: "Regulatory schedule must tabulate at least one year".into(),
            });
        }

        let mut prev = Decimal::ZERO;
        for (year, fraction) in &entries {
            if *fraction < Decimal::ZERO || *fraction > Decimal::ONE {
                return Err(ViabilityError::InvalidInput {
                    field: "entries".into(),
                    reason: format!("Surcharge fraction for {year} must be in [0, 1], got {fraction}"),
                });
            }
            if *fraction < prev {
                return Err(ViabilityError::InvalidInput {
                    field: "entries".into(),
                    reason: format!("Surcharge ramp must be non-decreasing; {year} drops to {fraction}"),
                });
            }
            prev = *fraction;
        }

        Ok(Self { entries })
    }

    /// Surcharge fraction in effect for `year`.
    ///
    /// Exact tabulated years return their value; anything beyond the last
    /// tabulated year is the full surcharge (1.0); anything before the
    /// first tabulated year carries no surcharge.
    pub fn surcharge_fraction(&self, year: i32) -> Rate {
        if let Some(fraction) = self.entries.get(&year) {
            return *fraction;
        }
        // new() rejects empty tables, so both bounds exist
        let first = *self.entries.keys().next().unwrap_or(&i32::MAX);
        let last = *self.entries.keys().next_back().unwrap_or(&i32::MIN);
        if year > last {
            Decimal::ONE
        } else if year < first {
            Decimal::ZERO
        } else {
            // Gap year inside the table: carry the latest tabulated value forward
            self.entries
                .range(..year)
                .next_back()
                .map(|(_, f)| *f)
                .unwrap_or(Decimal::ZERO)
        }
    }
}

impl Default for RegulatorySchedule {
    /// Statutory ramp: 15% in 2023 stepping 15 points per year to 90% in
    /// 2028, full fee from 2029 on.
    fn default() -> Self {
        let entries = BTreeMap::from([
            (2023, dec!(0.15)),
            (2024, dec!(0.30)),
            (2025, dec!(0.45)),
            (2026, dec!(0.60)),
            (2027, dec!(0.75)),
            (2028, dec!(0.90)),
        ]);
        Self { entries }
    }
}
