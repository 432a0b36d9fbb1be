use std::process::ExitCode;

use carbon_pricing_sim::simulation::config::{CommandLineArgs, Config};
use carbon_pricing_sim::simulation::controller::ControllerBuilder;
use carbon_pricing_sim::simulation::error::ConfigError;
use carbon_pricing_sim::simulation::logging::{init_logging, init_std_out_logging_thread_local};
use clap::Parser;
use tracing::{error, info};

fn main() -> ExitCode {
    let args = CommandLineArgs::parse();

    let config = {
        let _guard = init_std_out_logging_thread_local();
        info!("Started with args: {:?}", args);
        match Config::from_args(&args) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", error_chain(&e));
                return ExitCode::FAILURE;
            }
        }
    };

    let _guards = init_logging(&config);

    let result = ControllerBuilder::default()
        .config(config)
        .report_agents(true)
        .build()
        .and_then(|controller| controller.run());

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", error_chain(&e));
            ExitCode::FAILURE
        }
    }
}

fn error_chain(e: &ConfigError) -> String {
    let mut message = e.to_string();
    let mut source = std::error::Error::source(e);
    while let Some(s) = source {
        message.push_str(": ");
        message.push_str(&s.to_string());
        source = s.source();
    }
    message
}
