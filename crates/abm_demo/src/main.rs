//! # abm_demo
//!
//! Runs the Boltzmann wealth model on a grid and reports how unequal the
//! population has become. Set `RUST_LOG=abm_model=debug` to trace individual
//! passes.

mod wealth;

use abm_component::Agent;
use abm_model::{AgentCollector, Model, ModelConfig, RunConfig, SystemConfig, WorldConfig};
use anyhow::Result;
use clap::Parser;
use rand::Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wealth::{Exchange, Wander, Wealth};

#[derive(Parser)]
#[command(name = "abm_demo", about = "Boltzmann wealth model on a grid")]
struct Args {
    /// RNG seed; drawn at random when omitted
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of agents
    #[arg(short, long, default_value_t = 100)]
    agents: usize,

    /// Number of timesteps to run
    #[arg(short = 'n', long, default_value_t = 50)]
    steps: u64,

    /// Grid width
    #[arg(long, default_value_t = 10)]
    width: usize,

    /// Grid height
    #[arg(long, default_value_t = 10)]
    height: usize,

    /// Wrap the grid edges
    #[arg(long)]
    toroidal: bool,

    /// Print every collected record as a JSON line
    #[arg(long)]
    records: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("abm_demo=info".parse()?))
        .init();

    let args = Args::parse();
    let config = ModelConfig {
        seed: args.seed,
        world: WorldConfig::Grid {
            width: args.width,
            height: args.height,
            toroidal: args.toroidal,
        },
    };
    let mut model = Model::from_config(&config);
    info!(seed = model.seed(), agents = args.agents, "populating model");

    let (width, height) = (args.width.max(1) as i64, args.height.max(1) as i64);
    for i in 0..args.agents {
        let cell = (
            model.rng().random_range(0..width),
            model.rng().random_range(0..height),
        );
        let agent = Agent::new(format!("agent-{i}")).with_component(Wealth(1))?;
        model.environment_mut().add_agent_at(agent, cell)?;
    }

    model.add_system(SystemConfig::new("wander").with_priority(1), Wander)?;
    model.add_system(SystemConfig::new("exchange"), Exchange)?;
    model.add_system(
        AgentCollector::config(),
        AgentCollector::new(|_, _| None)
            .with_timestep()
            .with_composite(wealth::inequality),
    )?;

    let reached = model.run(&RunConfig { steps: args.steps })?;

    let collector = model
        .systems()
        .get::<AgentCollector>(AgentCollector::DEFAULT_ID)?;
    if let Some(last) = collector.records().last()
        && let (Some(total), Some(gini)) = (last.get("total"), last.get("gini"))
    {
        info!(timestep = reached, %total, %gini, "final distribution");
    }
    if args.records {
        for record in collector.records() {
            println!("{}", serde_json::to_string(record)?);
        }
    }
    Ok(())
}
