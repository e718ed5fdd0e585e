//! Boltzmann wealth model.
//!
//! Agents wander a grid one cell at a time and hand one unit of wealth to a
//! random cellmate whenever they have any.

use abm_component::{AgentFilter, Component};
use abm_model::{Environment, Model, ModelError, Record, System};
use abm_space::Neighbourhood;
use rand::Rng;
use rand::seq::IndexedRandom;
use serde_json::json;

#[derive(Debug)]
pub struct Wealth(pub u64);

impl Component for Wealth {}

/// Moves every agent to a random adjacent cell.
pub struct Wander;

impl System for Wander {
    fn execute(&mut self, model: &mut Model) -> Result<(), ModelError> {
        for id in model.shuffle(&AgentFilter::new().with::<Wealth>()) {
            let dx = model.rng().random_range(-1..=1i64);
            let dy = model.rng().random_range(-1..=1i64);
            model.environment_mut().move_by(&id, (dx, dy))?;
        }
        Ok(())
    }
}

/// Gives one unit of wealth to a random cellmate.
pub struct Exchange;

impl System for Exchange {
    fn execute(&mut self, model: &mut Model) -> Result<(), ModelError> {
        for id in model.shuffle(&AgentFilter::new().with::<Wealth>()) {
            if model.environment().get_component::<Wealth>(&id)?.0 == 0 {
                continue;
            }
            let cellmates = model
                .environment()
                .get_neighbours(&id, 0, Neighbourhood::Moore)?;
            let Some(partner) = cellmates.choose(model.rng()).cloned() else {
                continue;
            };
            model.environment_mut().get_component_mut::<Wealth>(&id)?.0 -= 1;
            model.environment_mut().get_component_mut::<Wealth>(&partner)?.0 += 1;
        }
        Ok(())
    }
}

/// Total wealth and its Gini coefficient.
pub fn inequality(env: &Environment) -> Option<Record> {
    let mut wealth: Vec<u64> = env
        .agents()
        .filter_map(|agent| agent.get_component::<Wealth>())
        .map(|w| w.0)
        .collect();
    let total: u64 = wealth.iter().sum();
    if total == 0 {
        return None;
    }
    wealth.sort_unstable();

    let n = wealth.len() as f64;
    let weighted: f64 = wealth
        .iter()
        .enumerate()
        .map(|(i, &w)| (i + 1) as f64 * w as f64)
        .sum();
    let gini = 2.0 * weighted / (n * total as f64) - (n + 1.0) / n;

    let mut record = Record::new();
    record.insert("total".to_owned(), json!(total));
    record.insert("gini".to_owned(), json!(gini));
    Some(record)
}
