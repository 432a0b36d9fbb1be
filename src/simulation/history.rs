use serde::{Deserialize, Serialize};

use crate::simulation::agents::DecisionReason;
use crate::simulation::modes::{IncomeLevel, TransportMode};

/// A value per transport mode, indexed by [`TransportMode::index`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Default)]
pub struct PerMode<T> {
    values: [T; 4],
}

impl<T: Copy> PerMode<T> {
    pub fn get(&self, mode: TransportMode) -> T {
        self.values[mode.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransportMode, T)> + '_ {
        TransportMode::ALL
            .into_iter()
            .map(move |mode| (mode, self.values[mode.index()]))
    }

    pub fn map<U, F: Fn(T) -> U>(&self, f: F) -> PerMode<U> {
        PerMode {
            values: self.values.map(f),
        }
    }
}

impl<T> PerMode<T> {
    pub fn get_mut(&mut self, mode: TransportMode) -> &mut T {
        &mut self.values[mode.index()]
    }
}

/// What one agent did in one month, evaluated for the mode it ended up with.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AgentMonthRecord {
    pub name: String,
    pub income_level: IncomeLevel,
    pub monthly_income: f64,
    pub budget: f64,
    pub mode: TransportMode,
    pub reason: DecisionReason,
    /// $/month
    pub monthly_cost: f64,
    /// h/day
    pub travel_time_hours: f64,
    /// g CO2/month
    pub monthly_emissions: f64,
}

/// Aggregates of one simulated month.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct MonthRecord {
    pub month: u32,
    /// $/gallon
    pub fuel_price: f64,
    pub mode_counts: PerMode<usize>,
    /// Percent of the population per mode. Sums up to 100 for a non empty population.
    pub mode_shares: PerMode<f64>,
    /// kg CO2
    pub total_emissions: f64,
    /// kg CO2
    pub emissions_by_mode: PerMode<f64>,
    /// Percent of the population driving an EV.
    pub ev_adoption_rate: f64,
    pub agents: Vec<AgentMonthRecord>,
}

impl MonthRecord {
    pub fn from_agent_records(month: u32, fuel_price: f64, agents: Vec<AgentMonthRecord>) -> Self {
        let mut mode_counts = PerMode::<usize>::default();
        let mut emissions_grams = PerMode::<f64>::default();
        for record in &agents {
            *mode_counts.get_mut(record.mode) += 1;
            *emissions_grams.get_mut(record.mode) += record.monthly_emissions;
        }

        let population = agents.len();
        let share = |count: usize| {
            if population == 0 {
                0.
            } else {
                count as f64 / population as f64 * 100.
            }
        };
        let mode_shares = mode_counts.map(share);
        let emissions_by_mode = emissions_grams.map(|g| g / 1000.);

        MonthRecord {
            month,
            fuel_price,
            mode_counts,
            mode_shares,
            total_emissions: emissions_by_mode.iter().map(|(_, kg)| kg).sum(),
            emissions_by_mode,
            ev_adoption_rate: mode_shares.get(TransportMode::EvCar),
            agents,
        }
    }
}

/// Append only time series of month records. Owned by the simulation, handed out by reference.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct SimulationHistory {
    records: Vec<MonthRecord>,
}

impl SimulationHistory {
    pub fn new() -> Self {
        SimulationHistory {
            records: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, record: MonthRecord) -> &MonthRecord {
        let index = self.records.len();
        self.records.push(record);
        &self.records[index]
    }

    pub fn records(&self) -> &[MonthRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&MonthRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The last `window` records, or all of them if there are fewer.
    pub fn tail(&self, window: usize) -> &[MonthRecord] {
        let start = self.records.len().saturating_sub(window);
        &self.records[start..]
    }

    pub fn total_emissions(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.total_emissions).collect()
    }

    pub fn ev_adoption_rates(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.ev_adoption_rate).collect()
    }

    pub fn fuel_prices(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.fuel_price).collect()
    }

    pub fn mode_shares(&self, mode: TransportMode) -> Vec<f64> {
        self.records.iter().map(|r| r.mode_shares.get(mode)).collect()
    }
}
