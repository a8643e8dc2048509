#![deny(warnings)]

//! Scripted historical events keyed by simulation year.
//!
//! The registry separates narrative copy from mutation: each [`EventId`]
//! carries an [`EventSpec`] (compiled-in text) and a declarative
//! [`EffectDelta`] applied through the single [`apply_delta`] reducer, so
//! every effect is unit-testable in isolation. Declining an event applies
//! nothing.

use serde::{Deserialize, Serialize};
use sim_core::{Flags, Modifiers};

/// Identifier for a scripted event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventId {
    /// 1955: the agricultural collectivization drive.
    Collectivization,
    /// 1956: completion of the socialist transformation.
    SocialistTransformation,
    /// 1958: the Great Leap decision.
    GreatLeap,
    /// 1960: Soviet experts recalled, contracts torn up.
    SovietWithdrawal,
}

/// Narrative record for a scripted event. Copy only; the mutation lives
/// in the event's [`EffectDelta`].
#[derive(Clone, Copy, Debug, Serialize)]
pub struct EventSpec {
    pub id: EventId,
    /// Year whose report presents the decision.
    pub year: i32,
    pub title: &'static str,
    pub description: &'static str,
    pub accept_label: &'static str,
    pub decline_label: &'static str,
    /// Shown after the player accepts.
    pub result_text: &'static str,
}

/// Declarative mutation attached to an accepted event.
///
/// Numeric fields are deltas added onto the prior modifier values, never
/// replacements; flag fields are one-way sets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectDelta {
    pub heavy_efficiency_add: f64,
    pub agri_efficiency_add: f64,
    pub heavy_bonus_add: f64,
    pub stability_add: f64,
    pub set_great_leap: bool,
    pub set_soviet_split: bool,
}

/// The full scripted-event table, in year order.
pub const EVENTS: [EventSpec; 4] = [
    EventSpec {
        id: EventId::Collectivization,
        year: 1955,
        title: "Agricultural Collectivization",
        description: "To concentrate the nation's strength, the center proposes accelerating \
                      collectivization, folding scattered smallholdings into collective farms \
                      so grain can be marshalled more effectively for industry.",
        accept_label: "Carry it out (agri efficiency +15%, heavy +5%)",
        decline_label: "Hold off (keep things as they are)",
        result_text: "Collectivization is under way; rural resources now flow more readily \
                      into industrial construction.",
    },
    EventSpec {
        id: EventId::SocialistTransformation,
        year: 1956,
        title: "The Transformation Completed",
        description: "The socialist transformation is essentially complete and public \
                      ownership dominates the economy. Tighten the planned system further?",
        accept_label: "Consolidate (stability rises across industry)",
        decline_label: "Stay flexible (light industry keeps its vigor)",
        result_text: "The system is further consolidated; the state's hand in allocating \
                      resources grows stronger.",
    },
    EventSpec {
        id: EventId::GreatLeap,
        year: 1958,
        title: "The Great Leap Decision",
        description: "The call to overtake Britain and catch America grows loud. Launch a \
                      mass campaign of backyard steel furnaces and people's communes?",
        accept_label: "Launch it (heavy industry surges, at great risk)",
        decline_label: "Develop soberly (avoid the gamble)",
        result_text: "A construction fever sweeps the country; steel output soars while farm \
                      work is thrown into disarray.",
    },
    EventSpec {
        id: EventId::SovietWithdrawal,
        year: 1960,
        title: "Soviet Withdrawal Crisis",
        description: "Relations with the Soviet Union have soured; Moscow prepares to recall \
                      every expert and tear up the contracts. How do we respond?",
        accept_label: "Self-reliance (spend resources on our own R&D)",
        decline_label: "Scale back (lower the targets, play it safe)",
        result_text: "In the spirit of self-reliance the programs continue; the hardship \
                      forges independent engineering capability.",
    },
];

impl EventId {
    /// Narrative record for this event.
    pub fn spec(self) -> &'static EventSpec {
        let idx = match self {
            EventId::Collectivization => 0,
            EventId::SocialistTransformation => 1,
            EventId::GreatLeap => 2,
            EventId::SovietWithdrawal => 3,
        };
        &EVENTS[idx]
    }

    /// Declarative effect applied when the event is accepted.
    pub fn effect(self) -> EffectDelta {
        match self {
            EventId::Collectivization => EffectDelta {
                agri_efficiency_add: 0.15,
                heavy_bonus_add: 0.05,
                ..EffectDelta::default()
            },
            EventId::SocialistTransformation => EffectDelta {
                stability_add: 0.1,
                ..EffectDelta::default()
            },
            EventId::GreatLeap => EffectDelta {
                heavy_efficiency_add: 0.5,
                agri_efficiency_add: -0.3,
                set_great_leap: true,
                ..EffectDelta::default()
            },
            EventId::SovietWithdrawal => EffectDelta {
                heavy_efficiency_add: 0.1,
                set_soviet_split: true,
                ..EffectDelta::default()
            },
        }
    }
}

/// Scripted event presented in the given year's report, if any.
pub fn event_for_year(year: i32) -> Option<&'static EventSpec> {
    EVENTS.iter().find(|e| e.year == year)
}

/// Reducer for accepted effects: deltas add onto the prior modifier
/// values and flags latch on, never off.
pub fn apply_delta(delta: &EffectDelta, modifiers: &mut Modifiers, flags: &mut Flags) {
    modifiers.heavy_efficiency += delta.heavy_efficiency_add;
    modifiers.agri_efficiency += delta.agri_efficiency_add;
    modifiers.heavy_bonus += delta.heavy_bonus_add;
    modifiers.stability += delta.stability_add;
    flags.great_leap |= delta.set_great_leap;
    flags.soviet_split |= delta.set_soviet_split;
}
