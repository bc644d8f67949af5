use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ViabilityError;
use crate::tariff::{CreditPolicy, TariffClass};
use crate::types::{Energy, Money, Rate, MONTHS};
use crate::ViabilityResult;

/// A generating site can name at most three beneficiary units.
pub const MAX_REMOTE_UNITS: usize = 3;

/// A secondary metered account receiving a share of exported credits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteUnit {
    pub enabled: bool,
    /// Fraction of exported credits sent to this unit, in [0, 1].
    pub share: Rate,
    pub tariff: TariffClass,
    /// The unit's own monthly consumption, kWh.
    pub consumption: [Energy; MONTHS],
}

/// Everything needed to turn allocated kWh into currency for one month.
#[derive(Debug, Clone, Copy)]
pub struct CreditValuation<'a> {
    pub year: u32,
    pub inflation: Rate,
    pub surcharge: Rate,
    pub policy: CreditPolicy,
    pub local_tariff: &'a TariffClass,
}

/// One remote unit's slice of a month's exports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitAllocation {
    /// kWh allocated to the unit (proportional, never capped).
    pub allocated: Energy,
    /// kWh actually credited — capped at the unit's own consumption,
    /// since a credit cannot push a bill negative.
    pub credited: Energy,
    /// Currency value of the credited energy at the unit's own tariff.
    pub value: Money,
}

/// Full allocation of one month's exported energy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthAllocation {
    /// Residual kWh kept by the generating unit.
    pub local_energy: Energy,
    /// Value of the local residual at the local tariff.
    pub local_value: Money,
    pub remote: Vec<UnitAllocation>,
    /// Allocated-but-uncreditable kWh across remote units this month.
    pub uncredited: Energy,
}

impl MonthAllocation {
    /// Total credit value for the month, local plus remote.
    pub fn total_value(&self) -> Money {
        self.local_value + self.remote.iter().map(|u| u.value).sum::<Money>()
    }
}

/// Check the remote-unit configuration before any cash-flow work and
/// return the total share claimed by enabled units.
pub fn validate_remote_units(units: &[RemoteUnit]) -> ViabilityResult<Rate> {
    if units.len() > MAX_REMOTE_UNITS {
        return Err(ViabilityError::InvalidInput {
            field: "remote_units".into(),
            reason: format!("At most {MAX_REMOTE_UNITS} remote units are supported, got {}", units.len()),
        });
    }

    let mut total_share = Decimal::ZERO;
    for (i, unit) in units.iter().enumerate() {
        if unit.share < Decimal::ZERO || unit.share > Decimal::ONE {
            return Err(ViabilityError::InvalidInput {
                field: format!("remote_units[{i}].share"),
                reason: format!("Share must be in [0, 1], got {}", unit.share),
            });
        }
        unit.tariff.validate(&format!("remote_units[{i}].tariff"))?;
        if unit.enabled {
            total_share += unit.share;
        }
    }

    if total_share > Decimal::ONE {
        return Err(ViabilityError::InvalidInput {
            field: "remote_units".into(),
            reason: format!(
                "Enabled remote-unit shares sum to {total_share}; the total must not exceed 1.0"
            ),
        });
    }

    Ok(total_share)
}

/// Distribute one month's exported energy across the enabled remote units
/// and the implicit local residual, then value each slice at its own
/// tariff.
///
/// The energy split is strictly proportional: the local residual plus all
/// unit allocations always sum to exactly `exported`. No carry-over
/// between months.
pub fn allocate_month(
    exported: Energy,
    month: usize,
    units: &[RemoteUnit],
    ctx: &CreditValuation<'_>,
) -> MonthAllocation {
    let mut remote = Vec::with_capacity(units.len());
    let mut remote_energy = Decimal::ZERO;
    let mut uncredited = Decimal::ZERO;

    for unit in units {
        if !unit.enabled {
            continue;
        }
        let allocated = exported * unit.share;
        let credited = allocated.min(unit.consumption[month].max(Decimal::ZERO));
        let value = credited
            * unit
                .tariff
                .export_credit(ctx.year, ctx.inflation, ctx.surcharge, ctx.policy);
        remote_energy += allocated;
        uncredited += allocated - credited;
        remote.push(UnitAllocation {
            allocated,
            credited,
            value,
        });
    }

    let local_energy = exported - remote_energy;
    let local_value = local_energy
        * ctx
            .local_tariff
            .export_credit(ctx.year, ctx.inflation, ctx.surcharge, ctx.policy);

    MonthAllocation {
        local_energy,
        local_value,
        remote,
        uncredited,
    }
}
