#![deny(warnings)]

//! Core domain models and invariants for the five-year-plan simulator.
//!
//! This crate defines the serializable state types shared across the
//! simulation with validation helpers to guarantee basic invariants
//! (budget-share bounds, the sector-index floor, the year range).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// First simulated year.
pub const START_YEAR: i32 = 1953;
/// Last simulated year; the session ends after this year's report.
pub const END_YEAR: i32 = 1962;
/// Entering this year pauses the session for the first-plan summary.
pub const PHASE_TWO_YEAR: i32 = 1958;
/// Hard lower bound applied to every sector index after a growth step.
pub const INDEX_FLOOR: f64 = 10.0;
/// Inclusive lower bound for a single sector's budget share, in percent.
pub const SHARE_MIN: u8 = 5;
/// Inclusive upper bound for a single sector's budget share, in percent.
pub const SHARE_MAX: u8 = 90;

/// The three economic sectors of the plan.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sector {
    /// Heavy industry: steel, machinery, defense.
    Heavy,
    /// Light industry: consumer goods.
    Light,
    /// Agriculture: grain and livestock.
    Agri,
}

/// Running economic output indices, one per sector.
///
/// Unitless; each grows multiplicatively per turn and never drops below
/// [`INDEX_FLOOR`]. Milestone checks measure growth against the fixed
/// [`SectorIndices::INITIAL`] values, not against the previous turn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SectorIndices {
    pub heavy: f64,
    pub light: f64,
    pub agri: f64,
}

impl SectorIndices {
    /// Index values at the start of 1953.
    pub const INITIAL: SectorIndices = SectorIndices {
        heavy: 100.0,
        light: 150.0,
        agri: 750.0,
    };

    /// Combined output across the three sectors.
    pub fn total(&self) -> f64 {
        self.heavy + self.light + self.agri
    }

    pub fn get(&self, sector: Sector) -> f64 {
        match sector {
            Sector::Heavy => self.heavy,
            Sector::Light => self.light,
            Sector::Agri => self.agri,
        }
    }

    /// Growth ratio of a sector against its fixed initial value:
    /// `(current / initial) - 1`.
    pub fn growth_ratio(&self, sector: Sector) -> f64 {
        self.get(sector) / Self::INITIAL.get(sector) - 1.0
    }
}

/// Multiplicative and additive growth adjustments.
///
/// Mutated only by accepted scripted-event deltas, which always add onto
/// the prior value rather than replacing it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    /// Multiplier on the heavy-industry growth rate.
    pub heavy_efficiency: f64,
    /// Multiplier on the agricultural growth rate.
    pub agri_efficiency: f64,
    /// Additive term in the heavy-industry base rate.
    pub heavy_bonus: f64,
    /// Reserved for future effects; not consumed by the growth formulas.
    pub stability: f64,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            heavy_efficiency: 1.0,
            agri_efficiency: 1.0,
            heavy_bonus: 0.0,
            stability: 1.0,
        }
    }
}

/// Permanent milestone markers. Once set, never cleared within a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    /// The Great Leap was launched in 1958.
    pub great_leap: bool,
    /// The Soviet split happened; also ends the aid bonus early.
    pub soviet_split: bool,
}

/// The overall development line chosen at session start.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Goal {
    Industrial,
    Agricultural,
}

impl Goal {
    /// Budget split seeded when this goal is selected.
    pub fn default_allocation(self) -> Allocation {
        match self {
            Goal::Industrial => Allocation {
                heavy: 55,
                light: 25,
                agri: 20,
            },
            Goal::Agricultural => Allocation {
                heavy: 30,
                light: 35,
                agri: 35,
            },
        }
    }
}

/// Mutually exclusive engine states governing which player actions are valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Setup,
    Playing,
    Report,
    Summary,
}

/// Player budget split for a single turn, in whole percent.
///
/// Transient caller-side input: the session never stores it. A commit
/// requires every share within [`SHARE_MIN`]..=[`SHARE_MAX`] and the
/// total to be exactly 100.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub heavy: u8,
    pub light: u8,
    pub agri: u8,
}

impl Allocation {
    pub fn total(&self) -> u16 {
        self.heavy as u16 + self.light as u16 + self.agri as u16
    }

    pub fn is_balanced(&self) -> bool {
        self.total() == 100
    }

    /// Adjust one sector's pending share. Affects only this value; no
    /// simulation state is touched until the allocation is committed.
    pub fn set(&mut self, sector: Sector, percent: u8) {
        match sector {
            Sector::Heavy => self.heavy = percent,
            Sector::Light => self.light = percent,
            Sector::Agri => self.agri = percent,
        }
    }
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A single share outside the slider bounds.
    #[error("{sector:?} share {percent}% is outside [5, 90]")]
    ShareOutOfRange { sector: Sector, percent: u8 },
    /// Year outside the simulated horizon [1953, 1962].
    #[error("year {0} is out of supported range [1953, 1962]")]
    YearOutOfRange(i32),
}

/// Validate per-sector share bounds. Balance (total == 100) is a commit
/// precondition checked by the engine, not a per-share invariant.
pub fn validate_allocation(allocation: &Allocation) -> Result<(), ValidationError> {
    for (sector, percent) in [
        (Sector::Heavy, allocation.heavy),
        (Sector::Light, allocation.light),
        (Sector::Agri, allocation.agri),
    ] {
        if !(SHARE_MIN..=SHARE_MAX).contains(&percent) {
            return Err(ValidationError::ShareOutOfRange { sector, percent });
        }
    }
    Ok(())
}

/// Validate that a year lies within the simulated horizon.
pub fn validate_year(year: i32) -> Result<(), ValidationError> {
    if !(START_YEAR..=END_YEAR).contains(&year) {
        return Err(ValidationError::YearOutOfRange(year));
    }
    Ok(())
}
