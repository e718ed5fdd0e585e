//! End-to-end wealth transfer model.
//!
//! Ten agents start with one unit of money each. Every timestep each agent
//! with money gives one unit to another agent drawn from the model's RNG.
//! Money is neither created nor destroyed, and equal seeds replay the same
//! history.

use abm_component::{Agent, AgentFilter, Component, Holder};
use abm_model::{AgentCollector, Model, ModelError, RunConfig, System, SystemConfig};
use serde_json::json;

const AGENTS: usize = 10;
const STEPS: u64 = 10;

#[derive(Debug)]
struct Money(u32);
impl Component for Money {}

struct Transfer;

impl System for Transfer {
    fn execute(&mut self, model: &mut Model) -> Result<(), ModelError> {
        let holders = model
            .environment()
            .get_agents(&AgentFilter::new().with::<Money>());
        for id in holders {
            if model.environment().get_component::<Money>(&id)?.0 == 0 {
                continue;
            }
            let others = AgentFilter::new().with::<Money>().except(id.clone());
            let other = model.get_random_agent(&others)?;
            model.environment_mut().get_component_mut::<Money>(&id)?.0 -= 1;
            model.environment_mut().get_component_mut::<Money>(&other)?.0 += 1;
        }
        Ok(())
    }
}

fn build(seed: u64) -> Model {
    let mut model = Model::new(seed);
    for i in 0..AGENTS {
        let agent = Agent::new(format!("agent-{i}"))
            .with_component(Money(1))
            .unwrap();
        model.environment_mut().add_agent(agent).unwrap();
    }
    model.add_system(SystemConfig::new("transfer"), Transfer).unwrap();
    model
}

fn total(model: &Model) -> u32 {
    model
        .get_components::<Money>()
        .iter()
        .filter_map(Holder::agent)
        .map(|id| model.environment().get_component::<Money>(id).unwrap().0)
        .sum()
}

fn distribution(model: &Model) -> Vec<u32> {
    model
        .environment()
        .agents()
        .map(|agent| agent.get_component::<Money>().unwrap().0)
        .collect()
}

#[test]
fn test_money_is_conserved_every_step() {
    let mut model = build(2024);
    assert_eq!(total(&model), AGENTS as u32);
    for expected_timestep in 1..=STEPS {
        model.step().unwrap();
        assert_eq!(model.timestep(), expected_timestep);
        assert_eq!(total(&model), AGENTS as u32);
    }
    assert_eq!(model.get_components::<Money>().len(), AGENTS);
}

#[test]
fn test_equal_seeds_replay_identically() {
    let mut a = build(7);
    let mut b = build(7);
    for _ in 0..STEPS {
        a.step().unwrap();
        b.step().unwrap();
        assert_eq!(distribution(&a), distribution(&b));
    }
}

#[test]
fn test_collector_observes_every_step() {
    let mut model = build(11);
    let collector = AgentCollector::new(|agent, _env| {
        agent.get_component::<Money>().map(|money| json!(money.0))
    })
    .with_timestep();
    model.add_system(AgentCollector::config(), collector).unwrap();

    let reached = model.run(&RunConfig { steps: STEPS }).unwrap();
    assert_eq!(reached, STEPS);

    let records = model
        .systems()
        .get::<AgentCollector>(AgentCollector::DEFAULT_ID)
        .unwrap()
        .records();
    assert_eq!(records.len(), STEPS as usize);
    for (t, record) in records.iter().enumerate() {
        assert_eq!(record["timestep"], json!(t));
        let sum: u64 = record
            .iter()
            .filter(|(key, _)| key.as_str() != "timestep")
            .filter_map(|(_, value)| value.as_u64())
            .sum();
        assert_eq!(sum, AGENTS as u64);
    }
}

#[test]
fn test_removing_an_agent_keeps_indices_consistent() {
    let mut model = build(3);
    model.run(&RunConfig { steps: 3 }).unwrap();

    let gone = model.environment_mut().remove_agent("agent-0").unwrap();
    let left = gone.get_component::<Money>().unwrap().0;
    assert_eq!(model.get_components::<Money>().len(), AGENTS - 1);
    assert_eq!(total(&model), AGENTS as u32 - left);

    model.step().unwrap();
    assert_eq!(total(&model), AGENTS as u32 - left);
    assert!(matches!(
        model.environment().get_agent("agent-0"),
        Err(ModelError::AgentNotFound(_))
    ));
}
