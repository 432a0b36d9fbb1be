//! Text report of a run. Everything in here only formats records, the controller decides where
//! the text goes.

use itertools::Itertools;

use crate::simulation::history::{AgentMonthRecord, MonthRecord, SimulationHistory};
use crate::simulation::pricing::PricingConfig;

pub fn month_header(month: u32, pricing: &PricingConfig) -> String {
    format!(
        "=== MONTH {month} === Gas price: ${:.2}/gallon (Oil: ${}/barrel, Carbon: ${}/gallon)",
        pricing.effective_fuel_price(),
        pricing.oil_price_per_barrel,
        pricing.carbon_price_per_gallon
    )
}

pub fn agent_line(record: &AgentMonthRecord) -> String {
    format!(
        "{} ({}, ${:.0}/month, budget: ${:.0}) decides to {}. Cost: ${:.0}/month, Travel time: {:.1}h/day, Emissions: {:.1}kg CO2/month",
        record.name,
        record.income_level,
        record.monthly_income,
        record.budget,
        record.reason,
        record.monthly_cost,
        record.travel_time_hours,
        record.monthly_emissions / 1000.
    )
}

/// Mode shares, EV adoption, total emissions and the share of each emitting mode in the total.
pub fn month_statistics(record: &MonthRecord) -> String {
    let shares = record
        .mode_shares
        .iter()
        .map(|(mode, share)| format!("{mode}: {share:.1}%"))
        .join(", ");

    let mut lines = vec![
        format!("Mode shares: {shares}"),
        format!("EV adoption rate: {:.1}%", record.ev_adoption_rate),
        format!("Total monthly emissions: {:.1} kg CO2", record.total_emissions),
    ];

    if record.total_emissions > 0. {
        let breakdown = record
            .emissions_by_mode
            .iter()
            .filter(|(_, kg)| *kg > 0.)
            .map(|(mode, kg)| {
                format!(
                    "{mode}: {kg:.1} kg CO2 ({:.1}%)",
                    kg / record.total_emissions * 100.
                )
            })
            .join(", ");
        lines.push(format!("Emissions breakdown: {breakdown}"));
    }

    lines.join("\n")
}

/// Total emissions and EV adoption of the last `window` months.
pub fn trend_summary(history: &SimulationHistory, window: usize) -> String {
    let tail = history.tail(window);
    let month = tail.last().map(|r| r.month).unwrap_or(0);
    format!(
        "TREND SUMMARY (Month {month}) Total emissions trend: [{}] EV adoption trend: [{}]",
        tail.iter()
            .format_with(", ", |r, f| f(&format_args!("{:.1}", r.total_emissions))),
        tail.iter()
            .format_with(", ", |r, f| f(&format_args!("{:.1}", r.ev_adoption_rate)))
    )
}

/// `None` if no month was simulated.
pub fn final_summary(history: &SimulationHistory) -> Option<String> {
    let last = history.latest()?;

    let distribution = last
        .mode_counts
        .iter()
        .map(|(mode, count)| format!("  {mode}: {count} agents"))
        .join("\n");

    Some(format!(
        "FINAL SIMULATION SUMMARY\n\
         Simulation ran for {} months\n\
         Final gas price: ${:.2}/gallon\n\
         Final total emissions: {:.1} kg CO2/month\n\
         Final EV adoption rate: {:.1}%\n\
         Final mode distribution:\n{distribution}",
        history.len(),
        last.fuel_price,
        last.total_emissions,
        last.ev_adoption_rate
    ))
}
