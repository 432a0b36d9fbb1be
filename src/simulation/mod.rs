pub mod agents;
pub mod config;
pub mod controller;
pub mod costs;
pub mod error;
pub mod events;
pub mod history;
pub mod logging;
pub mod modes;
pub mod population;
pub mod pricing;
pub mod random;
pub mod report;
#[allow(clippy::module_inception)]
pub mod simulation;
