//! Fiscal subsystem
//!
//! Runs on the monthly gate (`tick % 4 == 0`): collects the four tax
//! channels, spends, rolls the balance into debt, reprices debt with a
//! risk premium, and annualizes GDP from the tick's value added.
//!
//! Money discipline: revenue and spending are f64 cent flows for the tick;
//! the debt stock is i64 cents and absorbs the rounded balance.

use crate::core::time::TICK_DT;
use crate::models::diagnostics::Diagnostic;
use crate::models::state::SimulationState;

/// Fiscal phase for one country.
pub fn run_fiscal(state: &mut SimulationState, country_id: usize) {
    let tick = state.time.current_tick();
    let base_share = state.params.base_spending_share;
    let debt_threshold = state.params.debt_threshold;
    let premium_slope = state.params.risk_premium_slope;

    // Corporate tax base: per-sector profit floored at zero, no netting of
    // losses across sectors.
    let mut corporate_base = 0.0;
    for &region_id in &state.countries[country_id].region_ids {
        let region = &state.regions[region_id];
        for sector in &region.sectors {
            corporate_base += (sector.value_added - sector.wage_bill()).max(0.0);
        }
    }

    // VAT base: consumed (non-saved) cohort income across the country.
    let mut vat_base = 0.0;
    for &region_id in &state.countries[country_id].region_ids {
        for cohort in state.cohorts.iter().filter(|c| c.region_id == region_id) {
            vat_base += cohort.consumption_spending();
        }
    }

    // This tick's value added, annualized, becomes the new GDP.
    let mut value_added_total = 0.0;
    for &region_id in &state.countries[country_id].region_ids {
        let region = &state.regions[region_id];
        for sector in &region.sectors {
            value_added_total += sector.value_added;
        }
    }

    let country = &mut state.countries[country_id];
    let was_sustainable = country.debt_sustainable();

    // Revenue: income + corporate + VAT + accrued tariffs.
    let income_revenue = country.income_tax_rate * country.wages_paid;
    let corporate_revenue = country.corporate_tax_rate * corporate_base;
    let vat_revenue = country.vat_rate * vat_base;
    let tariff_revenue = country.tariff_revenue;
    country.tariff_revenue = 0.0;
    let revenue = income_revenue + corporate_revenue + vat_revenue + tariff_revenue;

    // Spending: GDP-scaled base plus interest on the debt stock.
    let interest_payment =
        country.effective_interest_rate * country.debt as f64 * TICK_DT;
    let base_spending = base_share * country.gdp as f64 * TICK_DT;
    let spending = base_spending + interest_payment;

    country.tax_revenue = revenue;
    country.government_spending = spending;
    country.discretionary_spending = (spending - interest_payment).max(0.0);

    // Deficit raises debt, surplus retires it; debt never goes negative.
    let balance = revenue - spending;
    country.debt = (country.debt - balance.round() as i64).max(0);

    // Risk premium on the updated stock.
    let premium = (premium_slope * (country.debt_to_gdp() - debt_threshold)).max(0.0);
    country.effective_interest_rate = country.base_interest_rate + premium;

    // GDP annualization; previous GDP is preserved for growth readers.
    country.previous_gdp = country.gdp;
    country.gdp = (value_added_total * 52.0).round() as i64;

    let sustainable = country.debt_sustainable();
    if sustainable != was_sustainable {
        let debt_to_gdp = country.debt_to_gdp();
        state.diagnostics.record(Diagnostic::DebtSustainabilityChanged {
            tick,
            country_id,
            sustainable,
            debt_to_gdp,
        });
    }
}

/// Effective interest rate for a debt ratio: base plus the excess-debt
/// premium. Exposed for the fiscal tests.
pub fn risk_adjusted_rate(
    base_rate: f64,
    debt_to_gdp: f64,
    threshold: f64,
    slope: f64,
) -> f64 {
    base_rate + (slope * (debt_to_gdp - threshold)).max(0.0)
}
