#![deny(warnings)]

//! Headless CLI: plays a full ten-year session under a fixed policy and
//! prints yearly reports plus the final reckoning.

use anyhow::{bail, Result};
use sim_core::{Goal, Phase, Sector, SectorIndices, PHASE_TWO_YEAR};
use sim_engine::Session;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Policy {
    goal: Goal,
    heavy: Option<u8>,
    light: Option<u8>,
    agri: Option<u8>,
    accept_events: bool,
    json: bool,
}

fn parse_args() -> Result<Policy> {
    let mut policy = Policy {
        goal: Goal::Industrial,
        heavy: None,
        light: None,
        agri: None,
        accept_events: true,
        json: false,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--goal" => {
                policy.goal = match it.next().as_deref() {
                    Some("industrial") => Goal::Industrial,
                    Some("agricultural") => Goal::Agricultural,
                    other => bail!("--goal expects industrial|agricultural, got {other:?}"),
                }
            }
            "--heavy" => policy.heavy = parse_share(&mut it, "--heavy")?,
            "--light" => policy.light = parse_share(&mut it, "--light")?,
            "--agri" => policy.agri = parse_share(&mut it, "--agri")?,
            "--accept-all" => policy.accept_events = true,
            "--decline-all" => policy.accept_events = false,
            "--json" => policy.json = true,
            other => bail!("unknown argument: {other}"),
        }
    }
    Ok(policy)
}

fn parse_share(it: &mut impl Iterator<Item = String>, flag: &str) -> Result<Option<u8>> {
    match it.next().and_then(|s| s.parse().ok()) {
        Some(v) => Ok(Some(v)),
        None => bail!("{flag} expects an integer percent"),
    }
}

fn stat_row(label: &str, sector: Sector, indices: &SectorIndices) {
    let start = SectorIndices::INITIAL.get(sector);
    let end = indices.get(sector);
    let growth = (end - start) / start * 100.0;
    println!("  {label:<14} {start:>5.0} -> {end:>6.0}  ({growth:+.0}%)");
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let policy = parse_args()?;
    info!(?policy, "starting session");

    let mut session = Session::new();
    let mut allocation = session.select_goal(policy.goal)?;
    if let Some(h) = policy.heavy {
        allocation.set(Sector::Heavy, h);
    }
    if let Some(l) = policy.light {
        allocation.set(Sector::Light, l);
    }
    if let Some(a) = policy.agri {
        allocation.set(Sector::Agri, a);
    }

    loop {
        match session.phase() {
            Phase::Playing => {
                let report = session.commit_budget(allocation)?;
                println!(
                    "{} | heavy {:+.1}% | light {:+.1}% | agri {:+.1}%",
                    report.year,
                    report.rates.heavy * 100.0,
                    report.rates.light * 100.0,
                    report.rates.agri * 100.0
                );
                if sim_econ::soviet_aid_lost(report.year, &session.state().flags) {
                    println!("  (Soviet aid withdrawn)");
                }
                match report.event {
                    Some(id) => {
                        let event = id.spec();
                        let choice = if policy.accept_events {
                            event.accept_label
                        } else {
                            event.decline_label
                        };
                        println!("  [{}] {}", event.title, choice);
                        session.resolve_event(policy.accept_events)?;
                        if policy.accept_events {
                            println!("  {}", event.result_text);
                        }
                    }
                    None => session.advance_year()?,
                }
            }
            Phase::Summary if session.year() == PHASE_TWO_YEAR => {
                println!("==== First Five-Year Plan (1953-1957) ====");
                stat_row("heavy industry", Sector::Heavy, session.indices());
                stat_row("light industry", Sector::Light, session.indices());
                stat_row("agriculture", Sector::Agri, session.indices());
                if session.state().rocket_program_started {
                    println!("  The strategic rocket program has begun.");
                } else {
                    println!("  Heavy industry cannot yet support a strategic rocket program.");
                }
                session.continue_second_plan()?;
            }
            Phase::Summary => break,
            // Reports are closed inline after commit; setup ends before the loop.
            Phase::Setup | Phase::Report => bail!("unexpected phase {:?}", session.phase()),
        }
    }

    let outcome = session.outcome()?;
    if policy.json {
        let doc = serde_json::json!({
            "state": session.state(),
            "ending": outcome.ending,
            "achievements": outcome.achievements,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("==== Ten-Year Reckoning (1953-1962) ====");
    println!("{}: {}", outcome.ending.title(), outcome.ending.description());
    stat_row("heavy industry", Sector::Heavy, session.indices());
    stat_row("light industry", Sector::Light, session.indices());
    stat_row("agriculture", Sector::Agri, session.indices());
    if outcome.achievements.is_empty() {
        println!("  no special achievements");
    } else {
        for badge in &outcome.achievements {
            println!("  * {}: {}", badge.name(), badge.description());
        }
    }

    Ok(())
}
