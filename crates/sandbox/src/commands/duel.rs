//! Scripted duel between two profiles.
//!
//! Every round the caster tries to cast `--spell` and, when the cast goes
//! through, applies `--hit` to the target. The target answers with
//! `--opener` once, then tries `--reaction` every round. Missing names are
//! logged and skipped so the script runs against any content directory.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use gameplay_core::EntityId;
use gameplay_runtime::{RecordingMovementHost, RuntimeError, Simulation};
use serde_json::json;

use super::{OutputFormat, load_content};

/// Run a scripted duel between two profiles
#[derive(Parser)]
pub struct Duel {
    /// Content directory (defaults to the bundled sample content)
    #[arg(short, long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Profile of the casting side
    #[arg(long, default_value = "Mage")]
    caster: String,

    /// Profile of the target side
    #[arg(long, default_value = "Warrior")]
    target: String,

    /// Ability the caster uses every round
    #[arg(long, default_value = "Fireball")]
    spell: String,

    /// Effect applied to the target when the spell goes off
    #[arg(long, default_value = "FireballHit")]
    hit: String,

    /// Effect the target applies to the caster in the first round
    #[arg(long, default_value = "Poison")]
    opener: String,

    /// Ability the target uses every round
    #[arg(long, default_value = "Dash")]
    reaction: String,

    /// Number of one-second rounds
    #[arg(short, long, default_value_t = 6)]
    rounds: u32,

    /// Output format
    #[arg(short, long, value_enum, default_value = "summary")]
    format: OutputFormat,
}

impl Duel {
    pub fn execute(self) -> Result<()> {
        let content = Arc::new(load_content(self.data_dir.clone())?);
        let movement = Arc::new(Mutex::new(RecordingMovementHost::new()));
        let mut sim = Simulation::builder(content)
            .movement_host(Arc::clone(&movement))
            .build();

        let caster = sim
            .spawn(&self.caster)
            .with_context(|| format!("Failed to spawn caster '{}'", self.caster))?;
        let target = sim
            .spawn(&self.target)
            .with_context(|| format!("Failed to spawn target '{}'", self.target))?;

        skip_on_error(sim.grant_ability(caster, &self.spell), "grant spell");
        skip_on_error(sim.grant_ability(target, &self.reaction), "grant reaction");

        let mut casts = 0;
        for round in 0..self.rounds {
            if round == 0 {
                skip_on_error(sim.apply_effect(target, caster, &self.opener), "opener");
            }

            match sim.activate(caster, &self.spell) {
                Ok(()) => {
                    casts += 1;
                    skip_on_error(sim.apply_effect(caster, target, &self.hit), "hit");
                }
                Err(err) => tracing::info!(round, %err, "spell not cast"),
            }
            if let Err(err) = sim.activate(target, &self.reaction) {
                tracing::info!(round, %err, "reaction not used");
            }

            sim.advance(1.0);
        }

        let events = sim.take_events();
        let moves = movement
            .lock()
            .map_err(|_| anyhow::anyhow!("movement host poisoned"))?
            .take();

        match self.format {
            OutputFormat::Json => {
                let value = json!({
                    "elapsed": sim.elapsed(),
                    "casts": casts,
                    "events": events.len(),
                    "movement_requests": moves.len(),
                    "caster": sim.snapshot(caster)?,
                    "target": sim.snapshot(target)?,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            OutputFormat::Summary => {
                println!(
                    "{} rounds, {:.2}s simulated, {} casts, {} events, {} movement requests",
                    self.rounds,
                    sim.elapsed(),
                    casts,
                    events.len(),
                    moves.len()
                );
                print_owner(&sim, &self.caster, caster)?;
                print_owner(&sim, &self.target, target)?;
            }
        }

        Ok(())
    }
}

fn skip_on_error<T>(result: Result<T, RuntimeError>, step: &str) {
    if let Err(err) = result {
        tracing::warn!(step, %err, "skipping script step");
    }
}

fn print_owner(sim: &Simulation, label: &str, entity: EntityId) -> Result<()> {
    let snapshot = sim.snapshot(entity)?;
    println!("{label} {entity}");
    for attr in &snapshot.attributes {
        println!(
            "  {:<12} base {:>7.1}  current {:>7.1}  final {:>7.1}",
            attr.id, attr.base, attr.current, attr.final_value
        );
    }
    if !snapshot.tags.is_empty() {
        println!("  tags: {}", snapshot.tags.join(", "));
    }
    for effect in &snapshot.effects {
        match effect.remaining {
            Some(remaining) => println!(
                "  effect {} x{} ({remaining:.2}s left)",
                effect.name, effect.stacks
            ),
            None => println!("  effect {} x{}", effect.name, effect.stacks),
        }
    }
    for ability in &snapshot.abilities {
        println!(
            "  ability {} [{}] used {}x",
            ability.name, ability.state, ability.activations
        );
    }
    Ok(())
}
