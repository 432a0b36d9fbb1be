use std::fs;

use derive_builder::Builder;
use tracing::info;

use crate::simulation::config::{write_config, Config};
use crate::simulation::error::ConfigError;
use crate::simulation::events::{ModeDecisionEvent, MonthCompletedEvent};
use crate::simulation::report;
use crate::simulation::simulation::Simulation;

/// Runs a whole simulation as described by a config and reports the progress through `tracing`.
#[derive(Debug, Builder)]
#[builder(pattern = "owned", build_fn(skip))]
pub struct Controller {
    config: Config,
    /// Whether each agent's decision is reported, or only the month statistics.
    report_agents: bool,
}

impl ControllerBuilder {
    // Custom build function, so that an invalid config is rejected before anything is run.
    pub fn build(self) -> Result<Controller, ConfigError> {
        let config = self
            .config
            .ok_or_else(|| ConfigError::MissingSetting("config".to_string()))?;
        config.validate()?;

        Ok(Controller {
            config,
            report_agents: self.report_agents.unwrap_or(true),
        })
    }
}

impl Controller {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs all configured months and returns the simulation, which holds the history of the run.
    pub fn run(self) -> Result<Simulation, ConfigError> {
        let output_path = self.config.resolved_output_dir();
        fs::create_dir_all(&output_path).map_err(|source| ConfigError::Output {
            path: output_path.clone(),
            source,
        })?;

        let pricing = self.config.pricing();
        let settings = self.config.simulation();

        let mut simulation = Simulation::from_config(&self.config);
        self.register_report(&mut simulation);

        // written after the simulation was created, so that all defaults are part of the file
        let config_file = write_config(&self.config, &output_path)?;
        info!("Wrote config to {:?}", config_file);

        info!(
            "Starting simulation with {} agents for {} months. Oil price: ${}/barrel, carbon price: ${}/gallon, gas price: ${:.2}/gallon",
            simulation.agents().len(),
            settings.months,
            pricing.oil_price_per_barrel,
            pricing.carbon_price_per_gallon,
            pricing.effective_fuel_price()
        );

        for month in 1..=settings.months {
            info!("{}", report::month_header(month, &pricing));
            simulation.advance_month(&pricing, settings.daily_distance);

            if settings.trend_window > 0 && month as usize % settings.trend_window == 0 {
                info!(
                    "{}",
                    report::trend_summary(simulation.history(), settings.trend_window)
                );
            }
        }

        if let Some(summary) = report::final_summary(simulation.history()) {
            info!("{summary}");
        }
        Ok(simulation)
    }

    fn register_report(&self, simulation: &mut Simulation) {
        if self.report_agents {
            simulation
                .events_mut()
                .on::<ModeDecisionEvent, _>(|e| info!("{}", report::agent_line(&e.record)));
        }
        simulation
            .events_mut()
            .on::<MonthCompletedEvent, _>(|e| info!("{}", report::month_statistics(&e.record)));
    }
}
