pub mod agent_logic;
pub mod inertia;

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

use crate::simulation::modes::{IncomeLevel, TransportMode, VehicleOwned};
use crate::simulation::random::AgentRng;

/// How much an agent cares about the different attributes of a mode. Drawn once on creation.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PreferenceWeights {
    pub convenience: f64,
    pub cost_sensitivity: f64,
    pub eco_friendliness: f64,
    pub time_sensitivity: f64,
}

impl PreferenceWeights {
    pub const CONVENIENCE_RANGE: (f64, f64) = (0.2, 0.8);
    pub const COST_SENSITIVITY_RANGE: (f64, f64) = (0.3, 0.9);
    pub const ECO_FRIENDLINESS_RANGE: (f64, f64) = (0.1, 0.7);
    pub const TIME_SENSITIVITY_RANGE: (f64, f64) = (0.4, 0.9);

    pub fn random<R: Rng>(rng: &mut R) -> Self {
        let mut draw = |(low, high): (f64, f64)| rng.random_range(low..high);
        PreferenceWeights {
            convenience: draw(Self::CONVENIENCE_RANGE),
            cost_sensitivity: draw(Self::COST_SENSITIVITY_RANGE),
            eco_friendliness: draw(Self::ECO_FRIENDLINESS_RANGE),
            time_sensitivity: draw(Self::TIME_SENSITIVITY_RANGE),
        }
    }
}

/// Why an agent ended up with a mode in a given month.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionReason {
    /// The agent did not reconsider its mode this month.
    Inertia(TransportMode),
    /// No mode fits into the budget.
    ForcedWalk,
    Continue(TransportMode),
    SellIcePurchaseEv,
    SellEvPurchaseIce,
    SellCarForTransit(VehicleOwned),
    PurchaseCar(VehicleOwned),
    Switch(TransportMode),
}

impl Display for DecisionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecisionReason::Inertia(mode) => write!(f, "maintain {mode} due to inertia"),
            DecisionReason::ForcedWalk => write!(f, "Forced to walk due to affordability"),
            DecisionReason::Continue(mode) => write!(f, "continue with {mode}"),
            DecisionReason::SellIcePurchaseEv => write!(f, "sell ICE car and purchase EV"),
            DecisionReason::SellEvPurchaseIce => write!(f, "sell EV and purchase ICE car"),
            DecisionReason::SellCarForTransit(vehicle) => {
                write!(f, "sell {vehicle} car and switch to public transit")
            }
            DecisionReason::PurchaseCar(vehicle) => write!(f, "purchase {vehicle} car"),
            DecisionReason::Switch(mode) => write!(f, "switch to {mode}"),
        }
    }
}

/// Outcome of one monthly decision.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Decision {
    pub mode: TransportMode,
    pub reason: DecisionReason,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct DecisionRecord {
    pub month: u32,
    pub mode: TransportMode,
    pub reason: DecisionReason,
}

#[derive(Debug, Clone)]
pub struct Agent {
    name: String,
    income_level: IncomeLevel,
    current_mode: TransportMode,
    vehicle_owned: VehicleOwned,
    monthly_income: f64,
    preferences: PreferenceWeights,
    months_with_current_mode: u32,
    decision_history: Vec<DecisionRecord>,
    rng: AgentRng,
}

impl Agent {
    /// Creates an agent with preferences and income drawn from `rng`. The agent keeps the
    /// generator for its monthly inertia draws.
    pub fn new(
        name: impl Into<String>,
        income_level: IncomeLevel,
        initial_mode: TransportMode,
        mut rng: AgentRng,
    ) -> Self {
        let preferences = PreferenceWeights::random(&mut rng);
        let (low, high) = income_level.income_range();
        let monthly_income = rng.random_range(low..high);
        Self::with_profile(
            name,
            income_level,
            initial_mode,
            monthly_income,
            preferences,
            rng,
        )
    }

    /// Creates an agent with a fixed income and fixed preferences.
    pub fn with_profile(
        name: impl Into<String>,
        income_level: IncomeLevel,
        initial_mode: TransportMode,
        monthly_income: f64,
        preferences: PreferenceWeights,
        rng: AgentRng,
    ) -> Self {
        Agent {
            name: name.into(),
            income_level,
            current_mode: initial_mode,
            vehicle_owned: initial_mode.vehicle(),
            monthly_income,
            preferences,
            months_with_current_mode: 0,
            decision_history: Vec::new(),
            rng,
        }
    }

    /// Starts the agent with some history in its initial mode.
    pub fn with_months_with_current_mode(mut self, months: u32) -> Self {
        self.months_with_current_mode = months;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn income_level(&self) -> IncomeLevel {
        self.income_level
    }

    pub fn current_mode(&self) -> TransportMode {
        self.current_mode
    }

    pub fn vehicle_owned(&self) -> VehicleOwned {
        self.vehicle_owned
    }

    pub fn monthly_income(&self) -> f64 {
        self.monthly_income
    }

    pub fn preferences(&self) -> &PreferenceWeights {
        &self.preferences
    }

    pub fn months_with_current_mode(&self) -> u32 {
        self.months_with_current_mode
    }

    pub fn decision_history(&self) -> &[DecisionRecord] {
        &self.decision_history
    }

    /// Monthly transport budget in $.
    pub fn budget(&self) -> f64 {
        self.monthly_income * self.income_level.budget_share()
    }

    /// Applies a decision made by [`Agent::decide`] for `month`. The vehicle owned always follows
    /// the new mode.
    pub fn apply_decision(&mut self, month: u32, decision: &Decision) {
        self.current_mode = decision.mode;
        self.vehicle_owned = decision.mode.vehicle();
        self.decision_history.push(DecisionRecord {
            month,
            mode: decision.mode,
            reason: decision.reason,
        });
    }
}
