use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// The transport modes an agent can choose from. The declaration order is the order in which
/// modes are scored, and thus decides ties in the utility comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TransportMode {
    Walking,
    PublicTransit,
    IceCar,
    EvCar,
}

impl TransportMode {
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Walking,
        TransportMode::PublicTransit,
        TransportMode::IceCar,
        TransportMode::EvCar,
    ];

    /// Position in [`TransportMode::ALL`]. Used to index per mode arrays.
    pub fn index(self) -> usize {
        match self {
            TransportMode::Walking => 0,
            TransportMode::PublicTransit => 1,
            TransportMode::IceCar => 2,
            TransportMode::EvCar => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Walking => "walking",
            TransportMode::PublicTransit => "public transit",
            TransportMode::IceCar => "ice car",
            TransportMode::EvCar => "ev car",
        }
    }

    /// Fixed perceived convenience of a mode. Independent of cost and travel time.
    pub fn convenience_score(self) -> f64 {
        match self {
            TransportMode::Walking => 0.3,
            TransportMode::PublicTransit => 0.6,
            TransportMode::IceCar => 0.9,
            TransportMode::EvCar => 0.95,
        }
    }

    pub fn vehicle(self) -> VehicleOwned {
        match self {
            TransportMode::IceCar => VehicleOwned::Ice,
            TransportMode::EvCar => VehicleOwned::Ev,
            TransportMode::Walking | TransportMode::PublicTransit => VehicleOwned::None,
        }
    }

    pub fn is_car(self) -> bool {
        self.vehicle() != VehicleOwned::None
    }
}

impl Display for TransportMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IncomeLevel {
    Low,
    Middle,
    High,
}

impl IncomeLevel {
    /// Range the monthly income is drawn from, in $/month.
    pub fn income_range(self) -> (f64, f64) {
        match self {
            IncomeLevel::Low => (1000., 2000.),
            IncomeLevel::Middle => (2000., 5000.),
            IncomeLevel::High => (5000., 10000.),
        }
    }

    /// Share of the monthly income an agent is willing to spend on transport.
    pub fn budget_share(self) -> f64 {
        match self {
            IncomeLevel::Low => 0.15,
            IncomeLevel::Middle => 0.25,
            IncomeLevel::High => 0.35,
        }
    }

    /// Low income agents never buy a car, no matter what it would cost them.
    pub fn restricted_modes(self) -> Option<&'static [TransportMode]> {
        match self {
            IncomeLevel::Low => Some(&[TransportMode::Walking, TransportMode::PublicTransit]),
            IncomeLevel::Middle | IncomeLevel::High => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IncomeLevel::Low => "low",
            IncomeLevel::Middle => "middle",
            IncomeLevel::High => "high",
        }
    }
}

impl Display for IncomeLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum VehicleOwned {
    #[default]
    None,
    Ice,
    Ev,
}

impl VehicleOwned {
    pub fn label(self) -> &'static str {
        match self {
            VehicleOwned::None => "None",
            VehicleOwned::Ice => "ICE",
            VehicleOwned::Ev => "EV",
        }
    }
}

impl Display for VehicleOwned {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}
