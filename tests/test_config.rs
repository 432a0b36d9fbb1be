use std::io::Write;
use std::path::PathBuf;

use carbon_pricing_sim::simulation::config::{write_config, CommandLineArgs, Config, Logging};
use carbon_pricing_sim::simulation::controller::ControllerBuilder;
use carbon_pricing_sim::simulation::costs::CostParameters;
use carbon_pricing_sim::simulation::error::ConfigError;
use carbon_pricing_sim::simulation::modes::{IncomeLevel, TransportMode};
use carbon_pricing_sim::simulation::pricing::PricingConfig;
use clap::Parser;
use macros::integration_test;

#[integration_test(carbon_pricing_sim)]
fn read_small_town() {
    let config = Config::from_file(&PathBuf::from("./tests/resources/small_town.yml")).unwrap();

    assert_eq!(PricingConfig::new(80., 0.2), config.pricing());

    let simulation = config.simulation();
    assert_eq!(6, simulation.months);
    assert_eq!(7, simulation.seed);
    // not set in the file
    assert_eq!(17., simulation.daily_distance);
    assert_eq!(3, simulation.trend_window);

    let costs = config.costs();
    assert_eq!(2.5, costs.public_transit_cost_per_trip);
    assert_eq!(
        CostParameters::default().ice_maintenance_per_month,
        costs.ice_maintenance_per_month
    );

    let inertia = config.inertia();
    assert_eq!(0.5, inertia.reconsider_probability(2));
    assert_eq!(0.05, inertia.reconsider_probability(3));

    let population = config.population();
    assert_eq!(3, population.agents.len());
    assert_eq!("Noah", population.agents[1].name);
    assert_eq!(IncomeLevel::Middle, population.agents[1].income_level);
    assert_eq!(TransportMode::IceCar, population.agents[1].initial_mode);

    assert_eq!(Logging::Info, config.output().logging);
    assert!(config.validate().is_ok());
}

#[integration_test(carbon_pricing_sim)]
fn command_line_overrides() {
    let args = CommandLineArgs::try_parse_from([
        "carbon_sim",
        "--config",
        "./tests/resources/high_carbon_price.yml",
        "--set",
        "pricing.carbon_price_per_gallon=0.5",
        "--set",
        "simulation.months=24",
    ])
    .unwrap();

    let config = Config::from_args(&args).unwrap();
    assert_eq!(PricingConfig::new(120., 0.5), config.pricing());
    assert_eq!(24, config.simulation().months);
}

#[integration_test(carbon_pricing_sim)]
fn defaults_without_config_file() {
    let args = CommandLineArgs::try_parse_from(["carbon_sim", "--set", "simulation.seed=3"]).unwrap();
    let config = Config::from_args(&args).unwrap();

    assert!(config.context().is_none());
    assert_eq!(3, config.simulation().seed);
    assert_eq!(PricingConfig::default(), config.pricing());
    assert_eq!(10, config.population().agents.len());
}

#[integration_test(carbon_pricing_sim)]
fn malformed_set_argument() {
    let result = CommandLineArgs::try_parse_from(["carbon_sim", "--set", "simulation.months"]);
    assert!(result.is_err());
}

#[integration_test(carbon_pricing_sim)]
fn missing_file() {
    let result = Config::from_file(&PathBuf::from("./tests/resources/does_not_exist.yml"));
    assert!(matches!(result, Err(ConfigError::Io { .. })));
}

#[integration_test(carbon_pricing_sim)]
fn unparsable_file() {
    let result = Config::from_file(&PathBuf::from("./tests/resources/malformed.yml"));
    match result {
        Err(ConfigError::Parse { path, .. }) => {
            assert_eq!(PathBuf::from("./tests/resources/malformed.yml"), path)
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[integration_test(carbon_pricing_sim)]
fn negative_price_is_rejected() {
    let config = Config::from_file(&PathBuf::from("./tests/resources/negative_price.yml")).unwrap();

    let result = ControllerBuilder::default().config(config).build();
    assert!(matches!(
        result,
        Err(ConfigError::NegativeValue {
            key: "pricing.oil_price_per_barrel",
            ..
        })
    ));
}

#[integration_test(carbon_pricing_sim)]
fn mistyped_module_is_rejected() {
    let result = Config::from_file(&PathBuf::from("./tests/resources/mistyped_module.yml"));
    match result {
        Err(ConfigError::ModuleType { key, expected }) => {
            assert_eq!("pricing", key);
            assert_eq!("PricingConfig", expected);
        }
        other => panic!("expected a module type error, got {other:?}"),
    }
}

#[integration_test(carbon_pricing_sim)]
fn invalid_cost_parameters_are_rejected() {
    let mut config = Config::default();
    config.set_costs(CostParameters {
        car_speed: 0.,
        electricity_cost_per_kwh: -5.,
        ..CostParameters::default()
    });

    let result = ControllerBuilder::default().config(config).build();
    assert!(matches!(
        result,
        Err(ConfigError::NegativeValue {
            key: "costs.electricity_cost_per_kwh",
            ..
        })
    ));
}

#[integration_test(carbon_pricing_sim)]
fn written_config_can_be_read_again() {
    let dir = tempfile::tempdir().unwrap();

    let mut config = Config::default();
    config.set_pricing(PricingConfig::new(95., 1.25));
    // touch the defaults, so that they are part of the output
    config.population();
    config.inertia();

    let path = write_config(&config, dir.path()).unwrap();
    let read = Config::from_file(&path).unwrap();

    assert_eq!(PricingConfig::new(95., 1.25), read.pricing());
    assert_eq!(config.population(), read.population());
    assert_eq!(config.inertia(), read.inertia());
}

#[integration_test(carbon_pricing_sim)]
fn hand_written_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "modules:\n  simulation:\n    type: Simulation\n    daily_distance: 40.0\n    months: 2"
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(40., config.simulation().daily_distance);
    assert_eq!(2, config.simulation().months);
    assert_eq!(42, config.simulation().seed);
}
