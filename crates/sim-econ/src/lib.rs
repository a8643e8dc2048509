#![deny(warnings)]

//! Growth-rate model for the yearly simulation step.
//!
//! Pure functions only: per-sector rates from the committed allocation,
//! the year, and the active modifiers/flags; and index application with
//! the hard floor of 10. Light industry takes no modifiers at all; it is
//! deliberately insulated from efficiency effects.

use serde::{Deserialize, Serialize};
use sim_core::{
    validate_allocation, Allocation, Flags, Modifiers, SectorIndices, ValidationError, INDEX_FLOOR,
};
use thiserror::Error;

/// Annual aid contribution to the heavy-industry base rate while it lasts.
const SOVIET_AID: f64 = 0.08;
/// Aid ends from this year on regardless of the split flag.
const AID_CUTOFF_YEAR: i32 = 1960;

const HEAVY_BASE: f64 = 0.12;
const HEAVY_LEVER: f64 = 2.2;
/// Heavy share above this gets the concentrated-investment bonus.
const HEAVY_PUSH_THRESHOLD: u8 = 45;
const HEAVY_PUSH_BONUS: f64 = 1.1;

const LIGHT_BASE: f64 = 0.10;
const LIGHT_LEVER: f64 = 1.4;

const AGRI_BASE: f64 = 0.04;
const AGRI_LEVER: f64 = 1.0;
/// Flat penalty subtracted from the agricultural rate in famine years,
/// after the efficiency multiplier. Can drive the rate negative.
const FAMINE_PENALTY: f64 = 0.04;
const FAMINE_YEARS: std::ops::RangeInclusive<i32> = 1959..=1961;

/// Errors produced by the validating model entry point.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EconError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// Rates are only meaningful for a fully committed budget.
    #[error("allocation must total exactly 100%, got {0}%")]
    Unbalanced(u16),
}

/// Per-sector growth rates for one completed turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthRates {
    pub heavy: f64,
    pub light: f64,
    pub agri: f64,
}

/// Soviet aid term: positive only before the cutoff year and while the
/// split has not happened. From 1960 on the term is zero either way.
pub fn soviet_aid(year: i32, flags: &Flags) -> f64 {
    if year < AID_CUTOFF_YEAR && !flags.soviet_split {
        SOVIET_AID
    } else {
        0.0
    }
}

/// Whether the aid is gone for good, by withdrawal or by the cutoff.
/// Presentation-layer status; the rate math uses [`soviet_aid`] directly.
pub fn soviet_aid_lost(year: i32, flags: &Flags) -> bool {
    year >= AID_CUTOFF_YEAR || flags.soviet_split
}

/// Compute per-sector growth rates for one turn.
///
/// Total over in-range input; callers that cannot guarantee a validated,
/// balanced allocation should use [`compute_rates_checked`]. The heavy
/// push bonus keys on the input share for this turn, not a running total.
pub fn compute_rates(
    allocation: &Allocation,
    year: i32,
    modifiers: &Modifiers,
    flags: &Flags,
) -> GrowthRates {
    let aid = soviet_aid(year, flags);

    let mut heavy = (HEAVY_BASE + aid + modifiers.heavy_bonus)
        * (allocation.heavy as f64 / 100.0)
        * HEAVY_LEVER
        * modifiers.heavy_efficiency;
    if allocation.heavy > HEAVY_PUSH_THRESHOLD {
        heavy *= HEAVY_PUSH_BONUS;
    }

    let light = LIGHT_BASE * (allocation.light as f64 / 100.0) * LIGHT_LEVER;

    let mut agri =
        AGRI_BASE * (allocation.agri as f64 / 100.0) * AGRI_LEVER * modifiers.agri_efficiency;
    if FAMINE_YEARS.contains(&year) {
        agri -= FAMINE_PENALTY;
    }

    GrowthRates { heavy, light, agri }
}

/// Validating wrapper around [`compute_rates`]: rejects out-of-range
/// shares, unbalanced totals, and years outside the horizon.
pub fn compute_rates_checked(
    allocation: &Allocation,
    year: i32,
    modifiers: &Modifiers,
    flags: &Flags,
) -> Result<GrowthRates, EconError> {
    sim_core::validate_year(year)?;
    validate_allocation(allocation)?;
    if !allocation.is_balanced() {
        return Err(EconError::Unbalanced(allocation.total()));
    }
    Ok(compute_rates(allocation, year, modifiers, flags))
}

/// Apply one turn of growth to the running indices.
///
/// The stored result is clamped to [`INDEX_FLOOR`]; the rate itself is
/// never clamped, so a reported negative rate survives even when the
/// stored index hits the floor.
pub fn apply_rates(indices: &SectorIndices, rates: &GrowthRates) -> SectorIndices {
    SectorIndices {
        heavy: (indices.heavy * (1.0 + rates.heavy)).max(INDEX_FLOOR),
        light: (indices.light * (1.0 + rates.light)).max(INDEX_FLOOR),
        agri: (indices.agri * (1.0 + rates.agri)).max(INDEX_FLOOR),
    }
}
