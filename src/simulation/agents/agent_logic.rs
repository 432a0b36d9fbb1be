use rand::Rng;
use tracing::debug;

use crate::simulation::agents::inertia::InertiaPolicy;
use crate::simulation::agents::{Agent, Decision, DecisionReason, PreferenceWeights};
use crate::simulation::costs::{CostParameters, EmissionFactors};
use crate::simulation::modes::{TransportMode, VehicleOwned};
use crate::simulation::pricing::PricingConfig;

/// Daily travel time at which the time utility of a mode drops to zero.
pub const MAX_DAILY_TRAVEL_HOURS: f64 = 2.;

/// Everything an agent looks at when making its monthly decision. Agents only see global
/// prices, never the choices of other agents.
#[derive(Debug, Clone, Copy)]
pub struct DecisionContext<'a> {
    pub costs: &'a CostParameters,
    pub emissions: &'a EmissionFactors,
    pub inertia: &'a InertiaPolicy,
    pub pricing: &'a PricingConfig,
    pub daily_distance: f64,
}

impl DecisionContext<'_> {
    pub fn fuel_price(&self) -> f64 {
        self.pricing.effective_fuel_price()
    }

    pub fn monthly_cost(&self, mode: TransportMode) -> f64 {
        self.costs
            .monthly_cost(mode, self.fuel_price(), self.daily_distance)
    }

    pub fn monthly_emissions(&self, mode: TransportMode) -> f64 {
        self.emissions
            .monthly_emissions_grams(mode, self.daily_distance)
    }

    pub fn travel_time_hours(&self, mode: TransportMode) -> f64 {
        self.costs.travel_time_hours(mode, self.daily_distance)
    }
}

/// Normalized utilities of a single mode, each within [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UtilityComponents {
    pub cost: f64,
    pub emission: f64,
    pub convenience: f64,
    pub time: f64,
}

impl UtilityComponents {
    pub fn new(mode: TransportMode, budget: f64, ctx: &DecisionContext) -> Self {
        // combustion cars are the reference for emissions, whatever mode is scored
        let emission_ceiling = ctx.monthly_emissions(TransportMode::IceCar);
        let emission = if emission_ceiling > 0. {
            (1. - ctx.monthly_emissions(mode) / emission_ceiling).max(0.)
        } else {
            0.
        };

        UtilityComponents {
            cost: (1. - ctx.monthly_cost(mode) / budget).max(0.),
            emission,
            convenience: mode.convenience_score(),
            time: (1. - ctx.travel_time_hours(mode) / MAX_DAILY_TRAVEL_HOURS).max(0.),
        }
    }
}

impl PreferenceWeights {
    pub fn utility(&self, components: &UtilityComponents) -> f64 {
        self.cost_sensitivity * components.cost
            + self.eco_friendliness * components.emission
            + self.convenience * components.convenience
            + self.time_sensitivity * components.time
    }
}

/// Returns the mode with the highest utility. On equal utility the mode seen first wins, which,
/// given that modes are scored in declaration order, is the one declared first.
pub fn select_best<I>(scores: I) -> Option<TransportMode>
where
    I: IntoIterator<Item = (TransportMode, f64)>,
{
    let mut best: Option<(TransportMode, f64)> = None;
    for (mode, utility) in scores {
        match best {
            Some((_, best_utility)) if utility <= best_utility => {}
            _ => best = Some((mode, utility)),
        }
    }
    best.map(|(mode, _)| mode)
}

impl Agent {
    pub fn can_afford(&self, mode: TransportMode, ctx: &DecisionContext) -> bool {
        if let Some(modes) = self.income_level().restricted_modes() {
            return modes.contains(&mode);
        }
        ctx.monthly_cost(mode) <= self.budget()
    }

    pub fn affordable_modes(&self, ctx: &DecisionContext) -> Vec<TransportMode> {
        TransportMode::ALL
            .into_iter()
            .filter(|&mode| self.can_afford(mode, ctx))
            .collect()
    }

    pub fn utility(&self, mode: TransportMode, ctx: &DecisionContext) -> f64 {
        let components = UtilityComponents::new(mode, self.budget(), ctx);
        self.preferences().utility(&components)
    }

    /// Makes the monthly decision with an inertia draw from the agent's own random stream.
    pub fn decide(&mut self, ctx: &DecisionContext) -> Decision {
        let draw: f64 = self.rng.random();
        self.decide_with_draw(ctx, draw)
    }

    /// Makes the monthly decision with an explicit inertia draw in [0, 1). Updates the months
    /// counter; applying the chosen mode is up to the caller, see [`Agent::apply_decision`].
    pub fn decide_with_draw(&mut self, ctx: &DecisionContext, draw: f64) -> Decision {
        if !ctx.inertia.reconsiders(self.months_with_current_mode, draw) {
            self.months_with_current_mode += 1;
            debug!("{} keeps {} due to inertia", self.name, self.current_mode);
            return Decision {
                mode: self.current_mode,
                reason: DecisionReason::Inertia(self.current_mode),
            };
        }

        let available = self.affordable_modes(ctx);
        if available.is_empty() {
            // the months counter is not touched on this path
            debug!("{} cannot afford any mode", self.name);
            return Decision {
                mode: TransportMode::Walking,
                reason: DecisionReason::ForcedWalk,
            };
        }

        let scores = available.iter().map(|&mode| (mode, self.utility(mode, ctx)));
        let best = select_best(scores).unwrap_or(TransportMode::Walking);

        if best != self.current_mode {
            self.months_with_current_mode = 0;
        } else {
            self.months_with_current_mode += 1;
        }

        let reason = self.decision_reason(best);
        debug!("{} decides to {reason}", self.name);
        Decision { mode: best, reason }
    }

    fn decision_reason(&self, new_mode: TransportMode) -> DecisionReason {
        if new_mode == self.current_mode {
            return DecisionReason::Continue(new_mode);
        }

        match (self.vehicle_owned, new_mode) {
            (VehicleOwned::Ice, TransportMode::EvCar) => DecisionReason::SellIcePurchaseEv,
            (VehicleOwned::Ev, TransportMode::IceCar) => DecisionReason::SellEvPurchaseIce,
            (owned @ (VehicleOwned::Ice | VehicleOwned::Ev), TransportMode::PublicTransit) => {
                DecisionReason::SellCarForTransit(owned)
            }
            (VehicleOwned::None, TransportMode::IceCar | TransportMode::EvCar) => {
                DecisionReason::PurchaseCar(new_mode.vehicle())
            }
            _ => DecisionReason::Switch(new_mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_approx_eq::assert_approx_eq;

    use crate::simulation::agents::agent_logic::{select_best, DecisionContext, UtilityComponents};
    use crate::simulation::agents::inertia::InertiaPolicy;
    use crate::simulation::agents::{Agent, DecisionReason, PreferenceWeights};
    use crate::simulation::costs::{CostParameters, EmissionFactors};
    use crate::simulation::modes::{IncomeLevel, TransportMode, VehicleOwned};
    use crate::simulation::pricing::PricingConfig;
    use crate::simulation::random::get_rnd;

    /// Draw value that triggers a reconsideration in every inertia regime.
    const RECONSIDER: f64 = 0.0;
    /// Draw value that never triggers a reconsideration.
    const STAY: f64 = 0.99;

    struct Fixture {
        costs: CostParameters,
        emissions: EmissionFactors,
        inertia: InertiaPolicy,
        pricing: PricingConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                costs: CostParameters::default(),
                emissions: EmissionFactors::default(),
                inertia: InertiaPolicy::default(),
                pricing: PricingConfig::new(80., 0.2),
            }
        }

        fn ctx(&self, daily_distance: f64) -> DecisionContext<'_> {
            DecisionContext {
                costs: &self.costs,
                emissions: &self.emissions,
                inertia: &self.inertia,
                pricing: &self.pricing,
                daily_distance,
            }
        }
    }

    fn weights(convenience: f64, cost: f64, eco: f64, time: f64) -> PreferenceWeights {
        PreferenceWeights {
            convenience,
            cost_sensitivity: cost,
            eco_friendliness: eco,
            time_sensitivity: time,
        }
    }

    fn agent(level: IncomeLevel, mode: TransportMode, income: f64, prefs: PreferenceWeights) -> Agent {
        Agent::with_profile("test", level, mode, income, prefs, get_rnd(42, 0usize))
    }

    #[test]
    fn inertia_keeps_mode_and_increments_counter() {
        let fixture = Fixture::new();
        let mut agent = agent(
            IncomeLevel::High,
            TransportMode::IceCar,
            9000.,
            weights(0.1, 0.9, 0.7, 0.9),
        )
        .with_months_with_current_mode(7);

        let decision = agent.decide_with_draw(&fixture.ctx(17.), STAY);
        assert_eq!(TransportMode::IceCar, decision.mode);
        assert_eq!(DecisionReason::Inertia(TransportMode::IceCar), decision.reason);
        assert_eq!(8, agent.months_with_current_mode());
    }

    #[test]
    fn inertia_with_never_reconsidering_policy() {
        let mut fixture = Fixture::new();
        fixture.inertia = InertiaPolicy {
            buckets: vec![],
            otherwise: 0.,
        };
        let mut agent = agent(
            IncomeLevel::Middle,
            TransportMode::PublicTransit,
            4000.,
            weights(0.8, 0.3, 0.1, 0.9),
        )
        .with_months_with_current_mode(12);

        for expected in 13..20 {
            let decision = agent.decide(&fixture.ctx(17.));
            assert_eq!(TransportMode::PublicTransit, decision.mode);
            assert_eq!(expected, agent.months_with_current_mode());
        }
    }

    #[test]
    fn low_income_only_walks_or_takes_transit() {
        let fixture = Fixture::new();
        // huge convenience weight would make a car the best choice if it were allowed
        let mut agent = agent(
            IncomeLevel::Low,
            TransportMode::PublicTransit,
            1999.,
            weights(10., 0., 0., 10.),
        );
        let affordable = agent.affordable_modes(&fixture.ctx(17.));
        assert_eq!(
            vec![TransportMode::Walking, TransportMode::PublicTransit],
            affordable
        );

        let decision = agent.decide_with_draw(&fixture.ctx(17.), RECONSIDER);
        assert!(matches!(
            decision.mode,
            TransportMode::Walking | TransportMode::PublicTransit
        ));
    }

    #[test]
    fn low_income_never_forced_to_walk() {
        let mut fixture = Fixture::new();
        fixture.costs.walking_cost_per_km = 100.;
        fixture.costs.public_transit_cost_per_trip = 1000.;
        let mut agent = agent(
            IncomeLevel::Low,
            TransportMode::PublicTransit,
            1000.,
            weights(0.5, 0.5, 0.5, 0.5),
        );
        let decision = agent.decide_with_draw(&fixture.ctx(500.), RECONSIDER);
        assert_ne!(DecisionReason::ForcedWalk, decision.reason);
    }

    #[test]
    fn forced_walk_leaves_counter_untouched() {
        let mut fixture = Fixture::new();
        // make walking cost money, so that an extreme distance exceeds every budget
        fixture.costs.walking_cost_per_km = 1.;
        fixture.costs.public_transit_cost_per_trip = 1000.;
        let mut agent = agent(
            IncomeLevel::High,
            TransportMode::IceCar,
            5000.,
            weights(0.5, 0.5, 0.5, 0.5),
        )
        .with_months_with_current_mode(1);

        let ctx = fixture.ctx(10_000.);
        assert!(agent.affordable_modes(&ctx).is_empty());

        let decision = agent.decide_with_draw(&ctx, RECONSIDER);
        assert_eq!(TransportMode::Walking, decision.mode);
        assert_eq!(DecisionReason::ForcedWalk, decision.reason);
        assert_eq!(
            "Forced to walk due to affordability",
            decision.reason.to_string()
        );
        // neither reset although the mode changes nor incremented
        assert_eq!(1, agent.months_with_current_mode());
    }

    #[test]
    fn middle_income_affordability() {
        let fixture = Fixture::new();
        // budget 200 $: walking (0) and transit (120) fit, EV (~112.7) fits, ICE (~222.7) does not
        let agent = agent(
            IncomeLevel::Middle,
            TransportMode::IceCar,
            800.,
            weights(0.5, 0.5, 0.5, 0.5),
        );
        assert_eq!(
            vec![
                TransportMode::Walking,
                TransportMode::PublicTransit,
                TransportMode::EvCar
            ],
            agent.affordable_modes(&fixture.ctx(17.))
        );
    }

    #[test]
    fn utility_components_at_default_distance() {
        let fixture = Fixture::new();
        let ctx = fixture.ctx(17.);

        let walking = UtilityComponents::new(TransportMode::Walking, 1000., &ctx);
        assert_eq!(1., walking.cost);
        assert_eq!(1., walking.emission);
        assert_eq!(0.3, walking.convenience);
        assert_eq!(0., walking.time); // 3.4 h is beyond the two hour ceiling

        let transit = UtilityComponents::new(TransportMode::PublicTransit, 1000., &ctx);
        assert_approx_eq!(0.88, transit.cost);
        assert_approx_eq!(0.75, transit.emission);
        assert_approx_eq!(0.66, transit.time);

        let ice = UtilityComponents::new(TransportMode::IceCar, 1000., &ctx);
        assert_approx_eq!(0., ice.emission);
        assert_approx_eq!(0.83, ice.time);
        assert_approx_eq!(1. - 222.688 / 1000., ice.cost, 0.0001);
    }

    #[test]
    fn cost_utility_is_bounded_at_zero() {
        let fixture = Fixture::new();
        let ice = UtilityComponents::new(TransportMode::IceCar, 100., &fixture.ctx(17.));
        assert_eq!(0., ice.cost);
    }

    #[test]
    fn emission_utility_without_distance() {
        let fixture = Fixture::new();
        let ev = UtilityComponents::new(TransportMode::EvCar, 1000., &fixture.ctx(0.));
        assert_eq!(0., ev.emission);
        assert_eq!(1., ev.time);
    }

    #[test]
    fn weighted_utility() {
        let components = UtilityComponents {
            cost: 0.5,
            emission: 0.25,
            convenience: 0.9,
            time: 1.,
        };
        let prefs = weights(0.2, 0.4, 0.8, 0.1);
        assert_approx_eq!(
            0.4 * 0.5 + 0.8 * 0.25 + 0.2 * 0.9 + 0.1 * 1.,
            prefs.utility(&components)
        );
    }

    #[test]
    fn first_mode_wins_ties() {
        let best = select_best([
            (TransportMode::Walking, 0.5),
            (TransportMode::IceCar, 1.),
            (TransportMode::EvCar, 1.),
        ]);
        assert_eq!(Some(TransportMode::IceCar), best);
        assert_eq!(None, select_best(std::iter::empty()));
    }

    #[test]
    fn convenience_tips_ev_over_ice() {
        let ice = UtilityComponents {
            cost: 0.6,
            emission: 0.3,
            convenience: TransportMode::IceCar.convenience_score(),
            time: 0.8,
        };
        let ev = UtilityComponents {
            convenience: TransportMode::EvCar.convenience_score(),
            ..ice
        };

        // without any weight on convenience both are equal and the combustion car is seen first
        let indifferent = weights(0., 0.5, 0.5, 0.5);
        let best = select_best([
            (TransportMode::IceCar, indifferent.utility(&ice)),
            (TransportMode::EvCar, indifferent.utility(&ev)),
        ]);
        assert_eq!(Some(TransportMode::IceCar), best);

        let comfort_seeking = weights(0.5, 0.5, 0.5, 0.5);
        let best = select_best([
            (TransportMode::IceCar, comfort_seeking.utility(&ice)),
            (TransportMode::EvCar, comfort_seeking.utility(&ev)),
        ]);
        assert_eq!(Some(TransportMode::EvCar), best);
    }

    #[test]
    fn ice_owner_switches_to_ev() {
        let fixture = Fixture::new();
        let mut agent = agent(
            IncomeLevel::High,
            TransportMode::IceCar,
            8000.,
            weights(0.8, 0.3, 0.7, 0.4),
        )
        .with_months_with_current_mode(4);

        let decision = agent.decide_with_draw(&fixture.ctx(17.), RECONSIDER);
        assert_eq!(TransportMode::EvCar, decision.mode);
        assert_eq!(DecisionReason::SellIcePurchaseEv, decision.reason);
        assert_eq!("sell ICE car and purchase EV", decision.reason.to_string());
        assert_eq!(0, agent.months_with_current_mode());

        agent.apply_decision(1, &decision);
        assert_eq!(VehicleOwned::Ev, agent.vehicle_owned());
        assert_eq!(TransportMode::EvCar, agent.current_mode());
    }

    #[test]
    fn unchanged_choice_continues_and_increments() {
        let fixture = Fixture::new();
        let mut agent = agent(
            IncomeLevel::High,
            TransportMode::EvCar,
            8000.,
            weights(0.8, 0.3, 0.7, 0.4),
        )
        .with_months_with_current_mode(2);

        let decision = agent.decide_with_draw(&fixture.ctx(17.), RECONSIDER);
        assert_eq!(TransportMode::EvCar, decision.mode);
        assert_eq!(DecisionReason::Continue(TransportMode::EvCar), decision.reason);
        assert_eq!(3, agent.months_with_current_mode());
    }

    #[test]
    fn transit_rider_purchases_car() {
        let fixture = Fixture::new();
        let mut agent = agent(
            IncomeLevel::High,
            TransportMode::PublicTransit,
            8000.,
            weights(0.8, 0.3, 0.7, 0.4),
        );
        let decision = agent.decide_with_draw(&fixture.ctx(17.), RECONSIDER);
        assert_eq!(TransportMode::EvCar, decision.mode);
        assert_eq!(DecisionReason::PurchaseCar(VehicleOwned::Ev), decision.reason);
        assert_eq!("purchase EV car", decision.reason.to_string());
    }

    #[test]
    fn car_owner_sells_for_transit() {
        let fixture = Fixture::new();
        // at 50 km per day a budget of 130 $ covers transit (120 $) but neither car
        let mut agent = agent(
            IncomeLevel::Middle,
            TransportMode::IceCar,
            520.,
            weights(1., 0., 0., 0.),
        );
        let decision = agent.decide_with_draw(&fixture.ctx(50.), RECONSIDER);
        assert_eq!(TransportMode::PublicTransit, decision.mode);
        assert_eq!(
            "sell ICE car and switch to public transit",
            decision.reason.to_string()
        );
    }

    #[test]
    fn walker_switches_to_transit() {
        let fixture = Fixture::new();
        let mut agent = agent(
            IncomeLevel::Low,
            TransportMode::Walking,
            1500.,
            weights(0.5, 0.5, 0.5, 0.5),
        );
        let decision = agent.decide_with_draw(&fixture.ctx(17.), RECONSIDER);
        assert_eq!(TransportMode::PublicTransit, decision.mode);
        assert_eq!(
            DecisionReason::Switch(TransportMode::PublicTransit),
            decision.reason
        );
    }

    #[test]
    fn decision_is_deterministic_for_fixed_inputs() {
        let fixture = Fixture::new();
        let prefs = weights(0.45, 0.61, 0.33, 0.72);
        let mut a = agent(IncomeLevel::Middle, TransportMode::IceCar, 3500., prefs);
        let mut b = agent(IncomeLevel::Middle, TransportMode::IceCar, 3500., prefs);
        for _ in 0..24 {
            let da = a.decide(&fixture.ctx(17.));
            let db = b.decide(&fixture.ctx(17.));
            assert_eq!(da, db);
            a.apply_decision(1, &da);
            b.apply_decision(1, &db);
        }
    }
}
