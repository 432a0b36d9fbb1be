use serde::{Deserialize, Serialize};

/// 1 barrel = 42 US gallons
pub const GALLONS_PER_BARREL: f64 = 42.;

/// The carbon pricing policy of one simulation run. Replaced as a whole between runs, never
/// mutated while a run is in progress.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PricingConfig {
    /// $/barrel
    pub oil_price_per_barrel: f64,
    /// $/gallon, added on top of the oil based fuel price
    pub carbon_price_per_gallon: f64,
}

impl PricingConfig {
    pub fn new(oil_price_per_barrel: f64, carbon_price_per_gallon: f64) -> Self {
        PricingConfig {
            oil_price_per_barrel,
            carbon_price_per_gallon,
        }
    }

    /// Fuel price in $/gallon, including the carbon surcharge.
    pub fn effective_fuel_price(&self) -> f64 {
        self.oil_price_per_barrel / GALLONS_PER_BARREL + self.carbon_price_per_gallon
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig::new(80., 0.2)
    }
}
