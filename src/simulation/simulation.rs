use tracing::{info, instrument};

use crate::simulation::agents::agent_logic::DecisionContext;
use crate::simulation::agents::inertia::InertiaPolicy;
use crate::simulation::agents::Agent;
use crate::simulation::config::Config;
use crate::simulation::costs::{CostParameters, EmissionFactors};
use crate::simulation::events::{EventsManager, ModeDecisionEvent, MonthCompletedEvent};
use crate::simulation::history::{AgentMonthRecord, MonthRecord, SimulationHistory};
use crate::simulation::pricing::PricingConfig;

/// Owns the agents and the history of a run. Agents decide one after another in roster order,
/// and only see global prices. There is no feedback from the month aggregates to the agents.
#[derive(Debug)]
pub struct Simulation {
    agents: Vec<Agent>,
    month: u32,
    costs: CostParameters,
    emissions: EmissionFactors,
    inertia: InertiaPolicy,
    history: SimulationHistory,
    events: EventsManager,
}

impl Simulation {
    pub fn new(
        agents: Vec<Agent>,
        costs: CostParameters,
        emissions: EmissionFactors,
        inertia: InertiaPolicy,
    ) -> Self {
        Simulation {
            agents,
            month: 0,
            costs,
            emissions,
            inertia,
            history: SimulationHistory::new(),
            events: EventsManager::new(),
        }
    }

    /// Creates the population from the config's roster, seeded with `simulation.seed`.
    pub fn from_config(config: &Config) -> Self {
        let agents = config
            .population()
            .create_agents(config.simulation().seed);
        Self::new(
            agents,
            config.costs(),
            config.emissions(),
            config.inertia(),
        )
    }

    /// Simulates the next month. Every agent makes its decision under `pricing`, the resulting
    /// month record is appended to the history and returned.
    #[instrument(level = "info", skip(self, pricing), fields(month = self.month + 1))]
    pub fn advance_month(&mut self, pricing: &PricingConfig, daily_distance: f64) -> &MonthRecord {
        self.month += 1;
        let month = self.month;
        let ctx = DecisionContext {
            costs: &self.costs,
            emissions: &self.emissions,
            inertia: &self.inertia,
            pricing,
            daily_distance,
        };
        let fuel_price = ctx.fuel_price();

        let mut records = Vec::with_capacity(self.agents.len());
        for agent in self.agents.iter_mut() {
            let previous_mode = agent.current_mode();
            let decision = agent.decide(&ctx);
            agent.apply_decision(month, &decision);

            let record = AgentMonthRecord {
                name: agent.name().to_string(),
                income_level: agent.income_level(),
                monthly_income: agent.monthly_income(),
                budget: agent.budget(),
                mode: decision.mode,
                reason: decision.reason,
                monthly_cost: ctx.monthly_cost(decision.mode),
                travel_time_hours: ctx.travel_time_hours(decision.mode),
                monthly_emissions: ctx.monthly_emissions(decision.mode),
            };
            self.events.publish_event(&ModeDecisionEvent {
                month,
                previous_mode,
                record: record.clone(),
            });
            records.push(record);
        }

        let record = MonthRecord::from_agent_records(month, fuel_price, records);
        info!(
            "Month {month} done. Fuel price ${fuel_price:.2}/gallon, total emissions {:.2} kg",
            record.total_emissions
        );
        self.events.publish_event(&MonthCompletedEvent {
            record: record.clone(),
        });
        self.history.push(record)
    }

    /// Number of months simulated so far.
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn history(&self) -> &SimulationHistory {
        &self.history
    }

    pub fn events_mut(&mut self) -> &mut EventsManager {
        &mut self.events
    }
}
