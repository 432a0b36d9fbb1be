use std::any::Any;
use std::cell::RefCell;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ahash::HashMap;
use clap::Parser;
use dyn_clone::DynClone;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::simulation::agents::inertia::InertiaPolicy;
use crate::simulation::costs::{CostParameters, EmissionFactors};
use crate::simulation::error::ConfigError;
use crate::simulation::population::PopulationSpec;
use crate::simulation::pricing::PricingConfig;

/// Registers an override handler for a specific config key, e.g. `--set pricing.oil_price_per_barrel=120`
macro_rules! register_override {
    ($key:literal, $func:expr) => {
        inventory::submit! {
            $crate::simulation::config::OverrideHandler {
                key: $key,
                apply: $func,
            }
        }
    };
}

pub struct OverrideHandler {
    key: &'static str,
    apply: fn(config: &mut Config, value: &str) -> Result<(), ConfigError>,
}

// handlers are submitted next to the config modules they change
inventory::collect!(OverrideHandler);

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineArgs {
    /// Path to a yaml config. Without one, the default town and pricing are simulated.
    #[arg(long, short)]
    pub config: Option<String>,
    #[arg(long = "set", value_parser = parse_key_val)]
    pub overrides: Vec<(String, String)>,
}

impl CommandLineArgs {
    pub fn new_with_path(path: impl ToString) -> Self {
        CommandLineArgs {
            config: Some(path.to_string()),
            overrides: Vec::new(),
        }
    }
}

fn parse_key_val(s: &str) -> Result<(String, String), ConfigError> {
    match s.find('=') {
        Some(pos) => Ok((s[..pos].to_string(), s[pos + 1..].to_string())),
        None => Err(ConfigError::MalformedOverride(s.to_string())),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    modules: RefCell<HashMap<String, Box<dyn ConfigModule>>>,
    #[serde(skip)]
    context: Option<PathBuf>,
}

impl Config {
    pub fn from_file(config_path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(config_path).map_err(|source| ConfigError::Io {
            path: config_path.to_path_buf(),
            source,
        })?;
        let deserializer = serde_yaml::Deserializer::from_reader(BufReader::new(file));
        let mut config: Config =
            serde_path_to_error::deserialize(deserializer).map_err(|source| {
                ConfigError::Parse {
                    path: config_path.to_path_buf(),
                    source,
                }
            })?;
        config.check_module_types()?;
        config.set_context(Some(config_path.to_path_buf()));
        Ok(config)
    }

    pub fn from_args(args: &CommandLineArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Config::from_file(&PathBuf::from(path))?,
            None => Config::default(),
        };
        config.apply_overrides(&args.overrides)?;
        Ok(config)
    }

    pub fn set_context(&mut self, context: Option<PathBuf>) {
        self.context = context;
    }

    /// Path of the file this config was read from, if any.
    pub fn context(&self) -> &Option<PathBuf> {
        &self.context
    }

    /// Apply generic key-value overrides to the config, e.g. pricing.carbon_price_per_gallon=0.5
    pub fn apply_overrides(&mut self, overrides: &[(String, String)]) -> Result<(), ConfigError> {
        if !overrides.is_empty() {
            info!("Applying overrides: {:?}", overrides);
        }

        for (key, value) in overrides {
            let key_str = key.as_str();

            if let Some(handler) = inventory::iter::<OverrideHandler>().find(|h| h.key == key_str)
            {
                (handler.apply)(self, value)?;
            } else {
                warn!("No override handler found for key: {}", key);
            }
        }
        Ok(())
    }

    /// Rejects configurations the simulation cannot run with. Prices, costs, distances and
    /// emission factors must not be negative and speeds must be positive. There must be at least
    /// one month and one agent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.check_module_types()?;

        let pricing = self.pricing();
        non_negative("pricing.oil_price_per_barrel", pricing.oil_price_per_barrel)?;
        non_negative(
            "pricing.carbon_price_per_gallon",
            pricing.carbon_price_per_gallon,
        )?;

        let simulation = self.simulation();
        non_negative("simulation.daily_distance", simulation.daily_distance)?;
        if simulation.months == 0 {
            return Err(ConfigError::NoMonths);
        }

        if self.population().agents.is_empty() {
            return Err(ConfigError::EmptyPopulation);
        }
        if !self.inertia().is_valid() {
            return Err(ConfigError::InvalidInertiaPolicy);
        }

        let costs = self.costs();
        non_negative("costs.walking_cost_per_km", costs.walking_cost_per_km)?;
        non_negative(
            "costs.public_transit_cost_per_trip",
            costs.public_transit_cost_per_trip,
        )?;
        non_negative(
            "costs.ice_fuel_consumption_l_per_km",
            costs.ice_fuel_consumption_l_per_km,
        )?;
        non_negative(
            "costs.ev_consumption_wh_per_km",
            costs.ev_consumption_wh_per_km,
        )?;
        non_negative(
            "costs.electricity_cost_per_kwh",
            costs.electricity_cost_per_kwh,
        )?;
        non_negative(
            "costs.ice_maintenance_per_month",
            costs.ice_maintenance_per_month,
        )?;
        non_negative(
            "costs.ev_maintenance_per_month",
            costs.ev_maintenance_per_month,
        )?;
        positive("costs.walking_speed", costs.walking_speed)?;
        positive("costs.public_transit_speed", costs.public_transit_speed)?;
        positive("costs.car_speed", costs.car_speed)?;

        let emissions = self.emissions();
        non_negative(
            "emissions.walking_g_co2_per_km",
            emissions.walking_g_co2_per_km,
        )?;
        non_negative(
            "emissions.public_transit_g_co2_per_km",
            emissions.public_transit_g_co2_per_km,
        )?;
        non_negative("emissions.ice_g_co2_per_km", emissions.ice_g_co2_per_km)?;
        non_negative("emissions.ev_g_co2_per_km", emissions.ev_g_co2_per_km)?;
        Ok(())
    }

    /// Every known module key must hold the module type that belongs to it. A `type` tag that
    /// does not match its key is rejected instead of falling back to defaults.
    pub fn check_module_types(&self) -> Result<(), ConfigError> {
        self.module::<PricingConfig>("pricing")?;
        self.module::<Simulation>("simulation")?;
        self.module::<CostParameters>("costs")?;
        self.module::<EmissionFactors>("emissions")?;
        self.module::<InertiaPolicy>("inertia")?;
        self.module::<PopulationSpec>("population")?;
        self.module::<Output>("output")?;
        Ok(())
    }

    pub fn pricing(&self) -> PricingConfig {
        self.module_or_default("pricing")
    }

    pub fn set_pricing(&mut self, pricing: PricingConfig) {
        self.set_module("pricing", pricing);
    }

    pub fn simulation(&self) -> Simulation {
        self.module_or_default("simulation")
    }

    pub fn set_simulation(&mut self, simulation: Simulation) {
        self.set_module("simulation", simulation);
    }

    pub fn costs(&self) -> CostParameters {
        self.module_or_default("costs")
    }

    pub fn set_costs(&mut self, costs: CostParameters) {
        self.set_module("costs", costs);
    }

    pub fn emissions(&self) -> EmissionFactors {
        self.module_or_default("emissions")
    }

    pub fn set_emissions(&mut self, emissions: EmissionFactors) {
        self.set_module("emissions", emissions);
    }

    pub fn inertia(&self) -> InertiaPolicy {
        self.module_or_default("inertia")
    }

    pub fn set_inertia(&mut self, inertia: InertiaPolicy) {
        self.set_module("inertia", inertia);
    }

    pub fn population(&self) -> PopulationSpec {
        self.module_or_default("population")
    }

    pub fn set_population(&mut self, population: PopulationSpec) {
        self.set_module("population", population);
    }

    pub fn output(&self) -> Output {
        self.module_or_default("output")
    }

    pub fn set_output(&mut self, output: Output) {
        self.set_module("output", output);
    }

    /// Relative output directories are resolved against the directory of the config file, unless
    /// they start with `./`.
    pub fn resolved_output_dir(&self) -> PathBuf {
        let output_dir = self.output().output_dir;
        if output_dir.is_absolute() || output_dir.starts_with("./") {
            return output_dir;
        }

        match self.context.as_ref().and_then(|c| c.parent()) {
            Some(parent) => parent.join(output_dir),
            None => output_dir,
        }
    }

    fn set_module<T: ConfigModule + 'static>(&mut self, key: &str, module: T) {
        self.modules
            .get_mut()
            .insert(key.to_string(), Box::new(module));
    }

    /// Returns the module stored under `key`. If there is none yet, the default is stored and
    /// returned, so that a written config shows all settings the run used.
    /// A module of the wrong type is left in place, so that [`Config::validate`] still reports it.
    fn module_or_default<T: ConfigModule + Clone + Default + 'static>(&self, key: &str) -> T {
        match self.module::<T>(key) {
            Ok(Some(module)) => module,
            Ok(None) => {
                let default = T::default();
                self.modules
                    .borrow_mut()
                    .insert(key.to_string(), Box::new(default.clone()));
                default
            }
            Err(_) => T::default(),
        }
    }

    fn module<T: Clone + 'static>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        let modules = self.modules.borrow();
        let Some(boxed) = modules.get(key) else {
            return Ok(None);
        };
        match boxed.as_ref().as_any().downcast_ref::<T>() {
            Some(module) => Ok(Some(module.clone())),
            None => Err(ConfigError::ModuleType {
                key: key.to_string(),
                expected: short_type_name::<T>(),
            }),
        }
    }
}

/// Writes the config, including all defaults it was queried for, to `output_config.yml`.
pub fn write_config(config: &Config, output_dir: &Path) -> Result<PathBuf, ConfigError> {
    let output_config = output_dir.join("output_config.yml");
    let file = File::create(&output_config).map_err(|source| ConfigError::Output {
        path: output_config.clone(),
        source,
    })?;
    serde_yaml::to_writer(BufWriter::new(file), config)?;
    Ok(output_config)
}

/// The type name without its module path, which is also the `type` tag of a config module.
fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

fn positive(key: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0. {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveValue { key, value })
    }
}

fn non_negative(key: &'static str, value: f64) -> Result<(), ConfigError> {
    // also rejects NaN
    if value >= 0. {
        Ok(())
    } else {
        Err(ConfigError::NegativeValue { key, value })
    }
}

register_override!("pricing.oil_price_per_barrel", |config, value| {
    let mut pricing = config.pricing();
    pricing.oil_price_per_barrel = parse_value("pricing.oil_price_per_barrel", value)?;
    config.set_pricing(pricing);
    Ok(())
});

register_override!("pricing.carbon_price_per_gallon", |config, value| {
    let mut pricing = config.pricing();
    pricing.carbon_price_per_gallon = parse_value("pricing.carbon_price_per_gallon", value)?;
    config.set_pricing(pricing);
    Ok(())
});

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Simulation {
    #[serde(default = "default_months")]
    pub months: u32,
    /// km per day, the same for the whole population
    #[serde(default = "default_daily_distance")]
    pub daily_distance: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Number of months after which a trend summary is reported.
    #[serde(default = "default_trend_window")]
    pub trend_window: usize,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            months: default_months(),
            daily_distance: default_daily_distance(),
            seed: default_seed(),
            trend_window: default_trend_window(),
        }
    }
}

fn default_months() -> u32 {
    12
}

fn default_daily_distance() -> f64 {
    17.
}

fn default_seed() -> u64 {
    42
}

fn default_trend_window() -> usize {
    3
}

register_override!("simulation.months", |config, value| {
    let mut simulation = config.simulation();
    simulation.months = parse_value("simulation.months", value)?;
    config.set_simulation(simulation);
    Ok(())
});

register_override!("simulation.daily_distance", |config, value| {
    let mut simulation = config.simulation();
    simulation.daily_distance = parse_value("simulation.daily_distance", value)?;
    config.set_simulation(simulation);
    Ok(())
});

register_override!("simulation.seed", |config, value| {
    let mut simulation = config.simulation();
    simulation.seed = parse_value("simulation.seed", value)?;
    config.set_simulation(simulation);
    Ok(())
});

register_override!("simulation.trend_window", |config, value| {
    let mut simulation = config.simulation();
    simulation.trend_window = parse_value("simulation.trend_window", value)?;
    config.set_simulation(simulation);
    Ok(())
});

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Output {
    pub output_dir: PathBuf,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Output {
    fn default() -> Self {
        Output {
            output_dir: PathBuf::from("./output"),
            logging: Logging::None,
        }
    }
}

register_override!("output.output_dir", |config, value| {
    let mut output = config.output();
    output.output_dir = PathBuf::from(value);
    config.set_output(output);
    Ok(())
});

register_override!("output.logging", |config, value| {
    let mut output = config.output();
    output.logging = match value.to_lowercase().as_str() {
        "none" => Logging::None,
        "info" => Logging::Info,
        _ => {
            return Err(ConfigError::InvalidOverride {
                key: "output.logging".to_string(),
                value: value.to_string(),
            })
        }
    };
    config.set_output(output);
    Ok(())
});

/// Whether log messages also go to a json file in the output directory. Console output is
/// always on.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub enum Logging {
    #[default]
    None,
    Info,
}

#[typetag::serde(tag = "type")]
pub trait ConfigModule: Debug + DynClone {
    fn as_any(&self) -> &dyn Any;
}

#[typetag::serde]
impl ConfigModule for PricingConfig {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Simulation {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for CostParameters {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for EmissionFactors {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for InertiaPolicy {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for PopulationSpec {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[typetag::serde]
impl ConfigModule for Output {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

dyn_clone::clone_trait_object!(ConfigModule);
