use serde::{Deserialize, Serialize};
use tracing::info;

use crate::simulation::agents::Agent;
use crate::simulation::modes::{IncomeLevel, TransportMode};
use crate::simulation::random::get_rnd;

/// An agent as it appears in the config, before income and preferences are drawn.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgentSpec {
    pub name: String,
    pub income_level: IncomeLevel,
    pub initial_mode: TransportMode,
}

impl AgentSpec {
    pub fn new(name: impl Into<String>, income_level: IncomeLevel, initial_mode: TransportMode) -> Self {
        AgentSpec {
            name: name.into(),
            income_level,
            initial_mode,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PopulationSpec {
    pub agents: Vec<AgentSpec>,
}

impl Default for PopulationSpec {
    /// The small town the model is usually run with: two low, five middle and three high income
    /// households with a mixed fleet.
    fn default() -> Self {
        use IncomeLevel::*;
        use TransportMode::*;

        PopulationSpec {
            agents: vec![
                AgentSpec::new("Abigail", Low, PublicTransit),
                AgentSpec::new("Bob", Low, Walking),
                AgentSpec::new("Carl", Middle, IceCar),
                AgentSpec::new("Diana", Middle, PublicTransit),
                AgentSpec::new("Eve", Middle, IceCar),
                AgentSpec::new("Frank", Middle, EvCar),
                AgentSpec::new("Grace", Middle, IceCar),
                AgentSpec::new("Henry", High, EvCar),
                AgentSpec::new("Ivy", High, IceCar),
                AgentSpec::new("Jack", High, EvCar),
            ],
        }
    }
}

impl PopulationSpec {
    /// Creates the agents in roster order. Each agent gets its own random stream derived from
    /// `seed` and its roster position, so a given seed always yields the same population.
    pub fn create_agents(&self, seed: u64) -> Vec<Agent> {
        let agents: Vec<Agent> = self
            .agents
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                Agent::new(
                    spec.name.clone(),
                    spec.income_level,
                    spec.initial_mode,
                    get_rnd(seed, index),
                )
            })
            .collect();

        info!(
            "Created population of {} agents with seed {seed}",
            agents.len()
        );
        agents
    }
}
