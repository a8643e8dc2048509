#![deny(warnings)]

//! Turn controller for the ten-year session.
//!
//! A [`Session`] owns the durable [`GameState`] and is its only writer.
//! Player actions drive the phase machine setup → playing → report →
//! summary: `commit_budget` runs the growth model and looks up the
//! scripted event for the year, `resolve_event`/`advance_year` apply the
//! decision and step the calendar (evaluating the rocket latches), and
//! [`classify`] produces the ending and achievements once the terminal
//! summary is reached.

use serde::{Deserialize, Serialize};
use sim_core::{
    validate_allocation, Allocation, Flags, Goal, Modifiers, Phase, Sector, SectorIndices,
    ValidationError, END_YEAR, PHASE_TWO_YEAR, START_YEAR,
};
use sim_econ::{apply_rates, compute_rates, GrowthRates};
use sim_events::{apply_delta, event_for_year, EventId};
use thiserror::Error;
use tracing::{debug, info};

/// Heavy growth ratio (against the fixed initial index) required to start
/// the rocket program.
const ROCKET_HEAVY_RATIO: f64 = 1.5;
/// Light growth ratio required alongside it.
const ROCKET_LIGHT_RATIO: f64 = 0.25;
/// Heavy growth ratio required for a successful launch, evaluable only on
/// the transition into the final year.
const LAUNCH_HEAVY_RATIO: f64 = 3.0;

/// Errors surfaced by session actions.
///
/// `UnbalancedBudget` is the one recoverable, player-facing rejection; the
/// rest flag caller bugs (wrong phase, wrong moment) and never mutate state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("action requires phase {expected:?}, session is in {actual:?}")]
    PhaseViolation { expected: Phase, actual: Phase },
    /// Budget shares must total exactly 100 to commit.
    #[error("budget must total exactly 100%, got {total}%")]
    UnbalancedBudget { total: u16 },
    #[error(transparent)]
    InvalidAllocation(#[from] ValidationError),
    /// A scripted event awaits a decision before the year can advance.
    #[error("a pending event must be resolved first")]
    EventPending,
    /// `resolve_event` called with nothing to resolve.
    #[error("no event is pending in this report")]
    NoPendingEvent,
    /// The ten-year horizon is not yet complete.
    #[error("the final summary has not been reached")]
    NotFinished,
    /// The terminal summary has been reached; only `restart` is valid.
    #[error("the session has ended")]
    SessionOver,
}

/// Snapshot of the just-completed turn, present only during `report`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    /// The year the committed budget covered.
    pub year: i32,
    pub rates: GrowthRates,
    /// Scripted event awaiting a decision, if the year has one.
    pub event: Option<EventId>,
}

/// Durable simulation state. Created once per session in `setup` and
/// mutated exclusively by [`Session`] methods.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub year: i32,
    pub indices: SectorIndices,
    pub goal: Option<Goal>,
    pub rocket_program_started: bool,
    pub rocket_launched: bool,
    pub modifiers: Modifiers,
    pub flags: Flags,
    pub phase: Phase,
    pub report: Option<ReportData>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            year: START_YEAR,
            indices: SectorIndices::INITIAL,
            goal: None,
            rocket_program_started: false,
            rocket_launched: false,
            modifiers: Modifiers::default(),
            flags: Flags::default(),
            phase: Phase::Setup,
            report: None,
        }
    }
}

/// A single-player session: the sole owner and writer of [`GameState`].
///
/// Every action validates its phase precondition first and returns an
/// [`EngineError`] without mutation when it does not hold.
#[derive(Clone, Debug, Default)]
pub struct Session {
    state: GameState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read-only view of the full durable state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn year(&self) -> i32 {
        self.state.year
    }

    pub fn indices(&self) -> &SectorIndices {
        &self.state.indices
    }

    /// Report snapshot; `Some` exactly while the session is in `report`.
    pub fn report(&self) -> Option<&ReportData> {
        self.state.report.as_ref()
    }

    /// True once the ten-year horizon is complete and only the final
    /// reckoning (or a restart) remains.
    pub fn is_final_summary(&self) -> bool {
        self.state.phase == Phase::Summary && self.state.year == END_YEAR
    }

    /// Choose the development line and begin playing. Returns the seeded
    /// default allocation; the caller owns it from here and passes a
    /// (possibly adjusted) allocation back into [`Session::commit_budget`].
    pub fn select_goal(&mut self, goal: Goal) -> Result<Allocation, EngineError> {
        self.expect_phase(Phase::Setup)?;
        self.state.goal = Some(goal);
        self.state.phase = Phase::Playing;
        let seed = goal.default_allocation();
        info!(?goal, "session started");
        Ok(seed)
    }

    /// Execute the year's budget: run the growth model, store the new
    /// indices, and open the report (with the year's scripted event, if
    /// any). An unbalanced budget is rejected with no state change.
    pub fn commit_budget(&mut self, allocation: Allocation) -> Result<ReportData, EngineError> {
        self.expect_phase(Phase::Playing)?;
        validate_allocation(&allocation)?;
        if !allocation.is_balanced() {
            return Err(EngineError::UnbalancedBudget { total: allocation.total() });
        }

        let rates = compute_rates(&allocation, self.state.year, &self.state.modifiers, &self.state.flags);
        self.state.indices = apply_rates(&self.state.indices, &rates);
        let event = event_for_year(self.state.year).map(|e| e.id);
        let report = ReportData { year: self.state.year, rates, event };
        self.state.report = Some(report);
        self.state.phase = Phase::Report;
        debug!(
            year = report.year,
            heavy = rates.heavy,
            light = rates.light,
            agri = rates.agri,
            event = ?event,
            "budget executed"
        );
        Ok(report)
    }

    /// Decide the pending scripted event. Accepting applies its delta to
    /// the modifiers and flags; declining applies nothing. Either way the
    /// calendar then advances.
    pub fn resolve_event(&mut self, accept: bool) -> Result<(), EngineError> {
        self.expect_phase(Phase::Report)?;
        let Some(event) = self.state.report.and_then(|r| r.event) else {
            return Err(EngineError::NoPendingEvent);
        };
        if accept {
            apply_delta(&event.effect(), &mut self.state.modifiers, &mut self.state.flags);
            info!(?event, "event accepted");
        } else {
            debug!(?event, "event declined");
        }
        self.step_year();
        Ok(())
    }

    /// Close an event-free report and advance the calendar. With an event
    /// pending, [`Session::resolve_event`] must be used instead.
    pub fn advance_year(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::Report)?;
        if self.state.report.and_then(|r| r.event).is_some() {
            return Err(EngineError::EventPending);
        }
        self.step_year();
        Ok(())
    }

    /// Leave the 1958 checkpoint summary and start the second plan.
    pub fn continue_second_plan(&mut self) -> Result<(), EngineError> {
        self.expect_phase(Phase::Summary)?;
        if self.state.year != PHASE_TWO_YEAR {
            return Err(EngineError::SessionOver);
        }
        self.state.phase = Phase::Playing;
        info!("second five-year plan begins");
        Ok(())
    }

    /// Final classification; available only in the terminal summary.
    pub fn outcome(&self) -> Result<Outcome, EngineError> {
        if !self.is_final_summary() {
            return Err(EngineError::NotFinished);
        }
        Ok(classify(&self.state))
    }

    /// Discard everything and return to the pristine setup state. Valid
    /// in any phase.
    pub fn restart(&mut self) {
        info!("session restarted");
        self.state = GameState::default();
    }

    /// Rocket latches and the year transition. The ratios are measured on
    /// the indices produced by the turn just reported, i.e. before the
    /// pending year increment; both latches are one-way.
    fn step_year(&mut self) {
        let next_year = self.state.year + 1;
        let heavy_ratio = self.state.indices.growth_ratio(Sector::Heavy);
        let light_ratio = self.state.indices.growth_ratio(Sector::Light);

        if !self.state.rocket_program_started
            && next_year >= PHASE_TWO_YEAR
            && heavy_ratio > ROCKET_HEAVY_RATIO
            && light_ratio > ROCKET_LIGHT_RATIO
        {
            self.state.rocket_program_started = true;
            info!(year = next_year, "rocket program started");
        }
        if self.state.rocket_program_started
            && heavy_ratio > LAUNCH_HEAVY_RATIO
            && next_year == END_YEAR
        {
            self.state.rocket_launched = true;
            info!("satellite launched");
        }

        self.state.report = None;
        if next_year > END_YEAR {
            // Terminal: the year is not incremented further.
            self.state.phase = Phase::Summary;
        } else if next_year == PHASE_TWO_YEAR {
            self.state.year = next_year;
            self.state.phase = Phase::Summary;
        } else {
            self.state.year = next_year;
            self.state.phase = Phase::Playing;
        }
        debug!(year = self.state.year, phase = ?self.state.phase, "year advanced");
    }

    fn expect_phase(&self, expected: Phase) -> Result<(), EngineError> {
        if self.state.phase == expected {
            Ok(())
        } else {
            Err(EngineError::PhaseViolation { expected, actual: self.state.phase })
        }
    }
}

/// Narrative endings, listed in classification priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ending {
    /// The satellite flew.
    StrategicTriumph,
    /// Agriculture ended more than 10% below its starting point.
    AgriculturalNeglect,
    /// Heavy industry more than quadrupled.
    IndustrialGiant,
    /// Farms and factories grew in step.
    BalancedProsperity,
    /// The default: slow, hard-won progress.
    DifficultStruggle,
}

impl Ending {
    pub fn title(self) -> &'static str {
        match self {
            Ending::StrategicTriumph => "Strategic Triumph",
            Ending::AgriculturalNeglect => "Agricultural Neglect",
            Ending::IndustrialGiant => "Industrial Giant",
            Ending::BalancedProsperity => "Balanced Prosperity",
            Ending::DifficultStruggle => "Difficult Struggle",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Ending::StrategicTriumph => {
                "On the strength of a formidable heavy-industrial base, the satellite reached \
                 orbit. National security is assured and the country stands tall among the \
                 nations of the world."
            }
            Ending::AgriculturalNeglect => {
                "Industry advanced, but the neglected farms left the people in hardship. The \
                 economy is badly out of balance, and recovery will take a long time."
            }
            Ending::IndustrialGiant => {
                "A remarkably complete industrial system now exists, with steel output among \
                 the world's highest. Living standards rose little, yet the foundation for a \
                 future take-off is laid."
            }
            Ending::BalancedProsperity => {
                "Industry and agriculture grew in step; markets are well supplied and the \
                 people live comfortably. A steady and distinctive road of development."
            }
            Ending::DifficultStruggle => {
                "Ten stormy years brought slower progress than hoped, but the country kept \
                 its independence and banked hard-won experience for the road ahead."
            }
        }
    }
}

/// Achievement badges, evaluated independently of the ending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Achievement {
    /// Heavy-industry index above 500.
    SteelTorrent,
    /// Agricultural index above 1200.
    GranaryOfTheNation,
    /// Light-industry index above 500.
    HundredFlowers,
    /// Launched the satellite.
    TheEastIsRed,
    /// Kept heavy industry above 300 after the Soviet withdrawal.
    SelfReliance,
}

impl Achievement {
    pub fn name(self) -> &'static str {
        match self {
            Achievement::SteelTorrent => "Steel Torrent",
            Achievement::GranaryOfTheNation => "Granary of the Nation",
            Achievement::HundredFlowers => "A Hundred Flowers",
            Achievement::TheEastIsRed => "The East Is Red",
            Achievement::SelfReliance => "Self-Reliance",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Achievement::SteelTorrent => "Heavy-industry index broke 500",
            Achievement::GranaryOfTheNation => "Agricultural index broke 1200",
            Achievement::HundredFlowers => "Light-industry index broke 500",
            Achievement::TheEastIsRed => "Successfully launched the satellite",
            Achievement::SelfReliance => "Sustained industrial growth after the Soviet withdrawal",
        }
    }
}

/// Final classification of a completed session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub ending: Ending,
    pub achievements: Vec<Achievement>,
}

// Ending thresholds are growth ratios against the fixed initial indices;
// achievement thresholds are absolute final index values.
const NEGLECT_AGRI_RATIO: f64 = -0.1;
const GIANT_HEAVY_RATIO: f64 = 3.0;
const PROSPERITY_AGRI_RATIO: f64 = 0.5;
const PROSPERITY_HEAVY_RATIO: f64 = 1.0;
const STEEL_TORRENT_INDEX: f64 = 500.0;
const GRANARY_INDEX: f64 = 1200.0;
const HUNDRED_FLOWERS_INDEX: f64 = 500.0;
const SELF_RELIANCE_HEAVY_INDEX: f64 = 300.0;

/// Map final accumulated state to an ending and achievement badges.
/// First matching ending rule wins; achievements are not exclusive.
pub fn classify(state: &GameState) -> Outcome {
    let heavy_ratio = state.indices.growth_ratio(Sector::Heavy);
    let agri_ratio = state.indices.growth_ratio(Sector::Agri);

    let ending = if state.rocket_launched {
        Ending::StrategicTriumph
    } else if agri_ratio < NEGLECT_AGRI_RATIO {
        Ending::AgriculturalNeglect
    } else if heavy_ratio > GIANT_HEAVY_RATIO {
        Ending::IndustrialGiant
    } else if agri_ratio > PROSPERITY_AGRI_RATIO && heavy_ratio > PROSPERITY_HEAVY_RATIO {
        Ending::BalancedProsperity
    } else {
        Ending::DifficultStruggle
    };

    let mut achievements = Vec::new();
    if state.indices.heavy > STEEL_TORRENT_INDEX {
        achievements.push(Achievement::SteelTorrent);
    }
    if state.indices.agri > GRANARY_INDEX {
        achievements.push(Achievement::GranaryOfTheNation);
    }
    if state.indices.light > HUNDRED_FLOWERS_INDEX {
        achievements.push(Achievement::HundredFlowers);
    }
    if state.rocket_launched {
        achievements.push(Achievement::TheEastIsRed);
    }
    if state.flags.soviet_split && state.indices.heavy > SELF_RELIANCE_HEAVY_INDEX {
        achievements.push(Achievement::SelfReliance);
    }

    Outcome { ending, achievements }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Drive one full year from `playing`: commit, then resolve or advance.
    fn play_year(session: &mut Session, allocation: Allocation, accept: bool) {
        let report = session.commit_budget(allocation).unwrap();
        if report.event.is_some() {
            session.resolve_event(accept).unwrap();
        } else {
            session.advance_year().unwrap();
        }
    }

    #[test]
    fn setup_to_playing_seeds_goal_defaults() {
        let mut s = Session::new();
        assert_eq!(s.phase(), Phase::Setup);
        let seed = s.select_goal(Goal::Industrial).unwrap();
        assert_eq!(seed, Allocation { heavy: 55, light: 25, agri: 20 });
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.state().goal, Some(Goal::Industrial));

        let mut s = Session::new();
        let seed = s.select_goal(Goal::Agricultural).unwrap();
        assert_eq!(seed, Allocation { heavy: 30, light: 35, agri: 35 });
    }

    #[test]
    fn wrong_phase_calls_are_rejected_without_mutation() {
        let mut s = Session::new();
        assert_eq!(
            s.commit_budget(Allocation { heavy: 55, light: 25, agri: 20 }),
            Err(EngineError::PhaseViolation { expected: Phase::Playing, actual: Phase::Setup })
        );
        assert_eq!(s.resolve_event(true), Err(EngineError::PhaseViolation {
            expected: Phase::Report,
            actual: Phase::Setup,
        }));
        assert_eq!(s.continue_second_plan(), Err(EngineError::PhaseViolation {
            expected: Phase::Summary,
            actual: Phase::Setup,
        }));
        assert_eq!(s.outcome(), Err(EngineError::NotFinished));
        assert_eq!(*s.state(), GameState::default());

        s.select_goal(Goal::Industrial).unwrap();
        assert_eq!(
            s.select_goal(Goal::Agricultural),
            Err(EngineError::PhaseViolation { expected: Phase::Setup, actual: Phase::Playing })
        );
        assert_eq!(s.state().goal, Some(Goal::Industrial));
    }

    #[test]
    fn unbalanced_budget_is_a_no_op() {
        let mut s = Session::new();
        s.select_goal(Goal::Industrial).unwrap();
        let before = s.state().clone();
        assert_eq!(
            s.commit_budget(Allocation { heavy: 50, light: 25, agri: 20 }),
            Err(EngineError::UnbalancedBudget { total: 95 })
        );
        assert_eq!(*s.state(), before);
        assert_eq!(s.phase(), Phase::Playing);
    }

    #[test]
    fn out_of_range_share_is_a_no_op() {
        let mut s = Session::new();
        s.select_goal(Goal::Industrial).unwrap();
        let before = s.state().clone();
        assert!(matches!(
            s.commit_budget(Allocation { heavy: 91, light: 5, agri: 4 }),
            Err(EngineError::InvalidAllocation(_))
        ));
        assert_eq!(*s.state(), before);
    }

    #[test]
    fn commit_opens_report_with_rates_and_event() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Industrial).unwrap();
        let report = s.commit_budget(alloc).unwrap();
        assert_eq!(report.year, 1953);
        assert_eq!(report.event, None);
        // (0.12 + 0.08) * 0.55 * 2.2 * 1.1, the over-45% push applied.
        assert!((report.rates.heavy - 0.2662).abs() < 1e-9);
        assert!((s.indices().heavy - 126.62).abs() < 1e-6);
        assert_eq!(s.phase(), Phase::Report);
        assert_eq!(s.report().copied(), Some(report));
    }

    #[test]
    fn event_free_report_requires_advance_not_resolve() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Industrial).unwrap();
        s.commit_budget(alloc).unwrap();
        assert_eq!(s.resolve_event(true), Err(EngineError::NoPendingEvent));
        s.advance_year().unwrap();
        assert_eq!(s.year(), 1954);
        assert_eq!(s.phase(), Phase::Playing);
        assert!(s.report().is_none());
    }

    #[test]
    fn pending_event_blocks_advance_until_resolved() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Industrial).unwrap();
        play_year(&mut s, alloc, false); // 1953
        play_year(&mut s, alloc, false); // 1954
        let report = s.commit_budget(alloc).unwrap(); // 1955
        assert_eq!(report.event, Some(EventId::Collectivization));
        assert_eq!(s.advance_year(), Err(EngineError::EventPending));
        assert_eq!(s.phase(), Phase::Report);

        let before = s.state().modifiers;
        s.resolve_event(true).unwrap();
        assert!((s.state().modifiers.agri_efficiency - (before.agri_efficiency + 0.15)).abs() < 1e-12);
        assert!((s.state().modifiers.heavy_bonus - (before.heavy_bonus + 0.05)).abs() < 1e-12);
        assert_eq!(s.year(), 1956);
    }

    #[test]
    fn declined_event_mutates_nothing() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Industrial).unwrap();
        play_year(&mut s, alloc, false);
        play_year(&mut s, alloc, false);
        s.commit_budget(alloc).unwrap(); // 1955 event pending
        let modifiers = s.state().modifiers;
        let flags = s.state().flags;
        s.resolve_event(false).unwrap();
        assert_eq!(s.state().modifiers, modifiers);
        assert_eq!(s.state().flags, flags);
    }

    #[test]
    fn checkpoint_summary_at_1958_then_second_plan() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Agricultural).unwrap();
        for _ in 1953..1958 {
            play_year(&mut s, alloc, false);
        }
        assert_eq!(s.phase(), Phase::Summary);
        assert_eq!(s.year(), 1958);
        assert!(!s.is_final_summary());
        assert_eq!(s.outcome(), Err(EngineError::NotFinished));

        s.continue_second_plan().unwrap();
        assert_eq!(s.phase(), Phase::Playing);
        assert_eq!(s.year(), 1958);
    }

    #[test]
    fn rocket_program_latches_at_the_1958_transition() {
        // Ratios already above threshold as 1957's report closes.
        let mut s = Session::new();
        s.state = GameState {
            year: 1957,
            indices: SectorIndices { heavy: 260.0, light: 195.0, agri: 750.0 },
            goal: Some(Goal::Industrial),
            phase: Phase::Report,
            report: Some(ReportData {
                year: 1957,
                rates: GrowthRates { heavy: 0.0, light: 0.0, agri: 0.0 },
                event: None,
            }),
            ..GameState::default()
        };
        // heavy ratio 1.6 > 1.5, light ratio 0.3 > 0.25.
        s.advance_year().unwrap();
        assert!(s.state().rocket_program_started);
        assert_eq!(s.phase(), Phase::Summary);
        assert_eq!(s.year(), 1958);
    }

    #[test]
    fn rocket_program_needs_both_ratios() {
        for (heavy, light, expect) in [
            (260.0, 180.0, false), // light ratio 0.2 too low
            (240.0, 195.0, false), // heavy ratio 1.4 too low
            (260.0, 195.0, true),
        ] {
            let mut s = Session::new();
            s.state = GameState {
                year: 1957,
                indices: SectorIndices { heavy, light, agri: 750.0 },
                goal: Some(Goal::Industrial),
                phase: Phase::Report,
                report: Some(ReportData {
                    year: 1957,
                    rates: GrowthRates { heavy: 0.0, light: 0.0, agri: 0.0 },
                    event: None,
                }),
                ..GameState::default()
            };
            s.advance_year().unwrap();
            assert_eq!(s.state().rocket_program_started, expect, "heavy={heavy} light={light}");
        }
    }

    #[test]
    fn launch_latches_only_entering_the_final_year() {
        // Program started, heavy ratio 3.2: entering 1961 must not launch,
        // entering 1962 must.
        for (year, expect) in [(1960, false), (1961, true)] {
            let mut s = Session::new();
            s.state = GameState {
                year,
                indices: SectorIndices { heavy: 420.0, light: 200.0, agri: 750.0 },
                goal: Some(Goal::Industrial),
                rocket_program_started: true,
                phase: Phase::Report,
                report: Some(ReportData {
                    year,
                    rates: GrowthRates { heavy: 0.0, light: 0.0, agri: 0.0 },
                    event: None,
                }),
                ..GameState::default()
            };
            s.advance_year().unwrap();
            assert_eq!(s.state().rocket_launched, expect, "closing year {year}");
        }
    }

    #[test]
    fn latches_stay_set_for_the_rest_of_the_session() {
        let mut s = Session::new();
        s.state = GameState {
            year: 1960,
            indices: SectorIndices { heavy: 420.0, light: 200.0, agri: 750.0 },
            goal: Some(Goal::Industrial),
            rocket_program_started: true,
            phase: Phase::Playing,
            ..GameState::default()
        };
        // Starve heavy investment for the rest of the run; the latch holds.
        let alloc = Allocation { heavy: 5, light: 5, agri: 90 };
        for _ in 1960..=1962 {
            play_year(&mut s, alloc, false);
            assert!(s.state().rocket_program_started);
        }
        assert!(s.is_final_summary());
    }

    #[test]
    fn strategic_triumph_wins_regardless_of_agriculture() {
        // Scenario D: launched, heavy ratio 3.2, agriculture collapsed.
        let state = GameState {
            year: END_YEAR,
            indices: SectorIndices { heavy: 420.0, light: 200.0, agri: 100.0 },
            rocket_launched: true,
            rocket_program_started: true,
            phase: Phase::Summary,
            ..GameState::default()
        };
        assert_eq!(classify(&state).ending, Ending::StrategicTriumph);
    }

    #[test]
    fn neglect_outranks_industrial_giant() {
        // Scenario E: agri ratio -0.15 with heavy ratio 4.0.
        let state = GameState {
            year: END_YEAR,
            indices: SectorIndices { heavy: 500.0, light: 200.0, agri: 637.5 },
            phase: Phase::Summary,
            ..GameState::default()
        };
        assert_eq!(classify(&state).ending, Ending::AgriculturalNeglect);
    }

    #[test]
    fn remaining_ending_rules_in_priority_order() {
        let base = GameState { year: END_YEAR, phase: Phase::Summary, ..GameState::default() };

        let giant = GameState {
            indices: SectorIndices { heavy: 450.0, light: 200.0, agri: 800.0 },
            ..base.clone()
        };
        assert_eq!(classify(&giant).ending, Ending::IndustrialGiant);

        let balanced = GameState {
            indices: SectorIndices { heavy: 250.0, light: 200.0, agri: 1150.0 },
            ..base.clone()
        };
        assert_eq!(classify(&balanced).ending, Ending::BalancedProsperity);

        // Heavy ratio 1.0 exactly fails the strict > comparison.
        let struggle = GameState {
            indices: SectorIndices { heavy: 200.0, light: 200.0, agri: 1150.0 },
            ..base.clone()
        };
        assert_eq!(classify(&struggle).ending, Ending::DifficultStruggle);

        assert_eq!(classify(&base).ending, Ending::DifficultStruggle);
    }

    #[test]
    fn achievements_accumulate_independently() {
        let state = GameState {
            year: END_YEAR,
            indices: SectorIndices { heavy: 600.0, light: 550.0, agri: 1300.0 },
            rocket_launched: true,
            flags: Flags { great_leap: true, soviet_split: true },
            phase: Phase::Summary,
            ..GameState::default()
        };
        let outcome = classify(&state);
        assert_eq!(
            outcome.achievements,
            vec![
                Achievement::SteelTorrent,
                Achievement::GranaryOfTheNation,
                Achievement::HundredFlowers,
                Achievement::TheEastIsRed,
                Achievement::SelfReliance,
            ]
        );

        let modest = GameState {
            year: END_YEAR,
            indices: SectorIndices { heavy: 200.0, light: 200.0, agri: 800.0 },
            phase: Phase::Summary,
            ..GameState::default()
        };
        assert!(classify(&modest).achievements.is_empty());
    }

    #[test]
    fn industrial_accept_all_playthrough_reaches_triumph() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Industrial).unwrap();

        for _ in 1953..1958 {
            play_year(&mut s, alloc, true);
        }
        assert_eq!(s.phase(), Phase::Summary);
        assert_eq!(s.year(), 1958);
        // Light industry at 25% has only grown ~19%: no program yet.
        assert!(!s.state().rocket_program_started);
        s.continue_second_plan().unwrap();

        for year in 1958..=1962 {
            assert_eq!(s.year(), year);
            play_year(&mut s, alloc, true);
        }
        assert!(s.is_final_summary());
        assert_eq!(s.year(), END_YEAR);
        assert!(s.state().rocket_program_started);
        assert!(s.state().rocket_launched);
        assert!(s.state().flags.great_leap);
        assert!(s.state().flags.soviet_split);

        let outcome = s.outcome().unwrap();
        assert_eq!(outcome.ending, Ending::StrategicTriumph);
        assert_eq!(
            outcome.achievements,
            vec![Achievement::SteelTorrent, Achievement::TheEastIsRed, Achievement::SelfReliance]
        );
    }

    #[test]
    fn agricultural_decline_all_playthrough_struggles_through() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Agricultural).unwrap();
        for _ in 1953..1958 {
            play_year(&mut s, alloc, false);
        }
        s.continue_second_plan().unwrap();
        for _ in 1958..=1962 {
            play_year(&mut s, alloc, false);
        }
        let outcome = s.outcome().unwrap();
        // Modest across the board: no ending rule fires, no badges.
        assert_eq!(outcome.ending, Ending::DifficultStruggle);
        assert!(outcome.achievements.is_empty());
        assert!(!s.state().rocket_launched);
        assert!(!s.state().flags.soviet_split);
        // The terminal summary only ever exits through restart.
        assert_eq!(s.continue_second_plan(), Err(EngineError::SessionOver));
    }

    #[test]
    fn restart_discards_everything() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Industrial).unwrap();
        play_year(&mut s, alloc, true);
        play_year(&mut s, alloc, true);
        assert_ne!(*s.state(), GameState::default());
        s.restart();
        assert_eq!(*s.state(), GameState::default());
        // A fresh session is fully playable again.
        s.select_goal(Goal::Agricultural).unwrap();
        assert_eq!(s.year(), START_YEAR);
    }

    #[test]
    fn state_snapshot_serde_roundtrip() {
        let mut s = Session::new();
        let alloc = s.select_goal(Goal::Industrial).unwrap();
        play_year(&mut s, alloc, true);
        s.commit_budget(alloc).unwrap();
        let json = serde_json::to_string(s.state()).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(back, *s.state());
    }

    fn balanced_allocation() -> impl Strategy<Value = Allocation> {
        (5u8..=90).prop_flat_map(|heavy| {
            (Just(heavy), 5u8..=(95 - heavy)).prop_map(|(heavy, light)| Allocation {
                heavy,
                light,
                agri: 100 - heavy - light,
            })
        })
    }

    proptest! {
        #[test]
        fn any_full_session_holds_the_invariants(
            turns in proptest::collection::vec((balanced_allocation(), proptest::bool::ANY), 10),
            goal in prop_oneof![Just(Goal::Industrial), Just(Goal::Agricultural)],
        ) {
            let mut s = Session::new();
            s.select_goal(goal).unwrap();
            let mut started_seen = false;
            let mut launched_seen = false;

            for (alloc, accept) in turns {
                if s.phase() == Phase::Summary {
                    s.continue_second_plan().unwrap();
                }
                play_year(&mut s, alloc, accept);

                // Floor invariant after every turn.
                prop_assert!(s.indices().heavy >= 10.0);
                prop_assert!(s.indices().light >= 10.0);
                prop_assert!(s.indices().agri >= 10.0);
                // Latches are monotonic.
                prop_assert!(!(started_seen && !s.state().rocket_program_started));
                prop_assert!(!(launched_seen && !s.state().rocket_launched));
                started_seen = s.state().rocket_program_started;
                launched_seen = s.state().rocket_launched;
            }

            prop_assert!(s.is_final_summary());
            prop_assert!(s.outcome().is_ok());
        }
    }
}
