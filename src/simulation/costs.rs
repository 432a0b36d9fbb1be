use serde::{Deserialize, Serialize};

use crate::simulation::modes::TransportMode;

pub const DAYS_PER_MONTH: f64 = 30.;
/// Commuters go back and forth once per day.
pub const TRIPS_PER_DAY: f64 = 2.;
pub const LITERS_PER_GALLON: f64 = 3.785;

pub fn monthly_distance(daily_distance: f64) -> f64 {
    daily_distance * DAYS_PER_MONTH
}

/// Monetary and time parameters of the four transport modes. Shared read-only by all agents.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct CostParameters {
    /// $/km
    pub walking_cost_per_km: f64,
    /// $/trip
    pub public_transit_cost_per_trip: f64,
    pub ice_fuel_consumption_l_per_km: f64,
    pub ev_consumption_wh_per_km: f64,
    /// $/kWh
    pub electricity_cost_per_kwh: f64,
    /// maintenance and insurance in $/month
    pub ice_maintenance_per_month: f64,
    pub ev_maintenance_per_month: f64,
    /// km/h
    pub walking_speed: f64,
    /// km/h, including stops
    pub public_transit_speed: f64,
    /// km/h, urban driving
    pub car_speed: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        CostParameters {
            walking_cost_per_km: 0.,
            public_transit_cost_per_trip: 2.,
            ice_fuel_consumption_l_per_km: 0.08,
            ev_consumption_wh_per_km: 166.,
            electricity_cost_per_kwh: 0.15,
            ice_maintenance_per_month: 200.,
            ev_maintenance_per_month: 100.,
            walking_speed: 5.,
            public_transit_speed: 25.,
            car_speed: 50.,
        }
    }
}

impl CostParameters {
    /// Fuel cost per km of a combustion car. The fuel price is given in $/gallon while the
    /// consumption is in l/km.
    pub fn ice_cost_per_km(&self, fuel_price: f64) -> f64 {
        self.ice_fuel_consumption_l_per_km * fuel_price / LITERS_PER_GALLON
    }

    pub fn ev_cost_per_km(&self) -> f64 {
        self.ev_consumption_wh_per_km / 1000. * self.electricity_cost_per_kwh
    }

    /// Monthly cost in $ of commuting `daily_distance` km per day with `mode`.
    pub fn monthly_cost(&self, mode: TransportMode, fuel_price: f64, daily_distance: f64) -> f64 {
        let distance = monthly_distance(daily_distance);
        match mode {
            TransportMode::Walking => self.walking_cost_per_km * distance,
            TransportMode::PublicTransit => {
                self.public_transit_cost_per_trip * TRIPS_PER_DAY * DAYS_PER_MONTH
            }
            TransportMode::IceCar => {
                self.ice_cost_per_km(fuel_price) * distance + self.ice_maintenance_per_month
            }
            TransportMode::EvCar => {
                self.ev_cost_per_km() * distance + self.ev_maintenance_per_month
            }
        }
    }

    pub fn speed(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Walking => self.walking_speed,
            TransportMode::PublicTransit => self.public_transit_speed,
            TransportMode::IceCar | TransportMode::EvCar => self.car_speed,
        }
    }

    /// Travel time in hours per day.
    pub fn travel_time_hours(&self, mode: TransportMode, daily_distance: f64) -> f64 {
        daily_distance / self.speed(mode)
    }
}

/// g CO2 per km for each mode.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct EmissionFactors {
    pub walking_g_co2_per_km: f64,
    pub public_transit_g_co2_per_km: f64,
    pub ice_g_co2_per_km: f64,
    /// Based on the California grid mix.
    pub ev_g_co2_per_km: f64,
}

impl Default for EmissionFactors {
    fn default() -> Self {
        EmissionFactors {
            walking_g_co2_per_km: 0.,
            public_transit_g_co2_per_km: 50.,
            ice_g_co2_per_km: 200.,
            ev_g_co2_per_km: 50.,
        }
    }
}

impl EmissionFactors {
    pub fn g_co2_per_km(&self, mode: TransportMode) -> f64 {
        match mode {
            TransportMode::Walking => self.walking_g_co2_per_km,
            TransportMode::PublicTransit => self.public_transit_g_co2_per_km,
            TransportMode::IceCar => self.ice_g_co2_per_km,
            TransportMode::EvCar => self.ev_g_co2_per_km,
        }
    }

    pub fn monthly_emissions_grams(&self, mode: TransportMode, daily_distance: f64) -> f64 {
        self.g_co2_per_km(mode) * monthly_distance(daily_distance)
    }
}
