//! Per-calendar-year real-estate cash aggregation. Combines rent income,
//! operating expenses, depreciation and loan figures into book and real cash
//! numbers, summed across every building owned in that year.

use rust_decimal::Decimal;

use crate::params::ParameterStore;
use crate::pipeline::PipelineTables;
use crate::tables::{RealEstateCashRow, RealEstateCashTable};
use crate::SimResult;

pub const TABLE_NAME: &str = "real_estate_cash_data";

const CALCULATOR: &str = "real_estate_cash";

pub fn calculate(
    params: &ParameterStore,
    tables: &PipelineTables,
) -> SimResult<RealEstateCashTable> {
    let depreciation = tables.require_depreciation(CALCULATOR)?;
    let loan = tables.require_loan_per_year(CALCULATOR)?;

    let mut table = RealEstateCashTable::new(TABLE_NAME);
    for year in params.simulation_start_year()..=params.simulation_end_year() {
        let mut row = RealEstateCashRow {
            year,
            total_income: Decimal::ZERO,
            operating_expenses: Decimal::ZERO,
            depreciation: Decimal::ZERO,
            building_interest: Decimal::ZERO,
            loan_payment: Decimal::ZERO,
            petty_expenses: Decimal::ZERO,
            book_expenses: Decimal::ZERO,
            book_income: Decimal::ZERO,
            real_cash: Decimal::ZERO,
        };

        for building in params.buildings() {
            if !building.is_ownership_period(year) {
                continue;
            }
            let year_index = building.year_index(year);

            let total_income = building.rent_income_per_month * Decimal::from(12);
            let operating_expenses = building.operating_expenses(year);
            let depreciation_cost = depreciation
                .get(&building.name, year_index)?
                .depreciation_cost;
            let loan_row = loan.get(&building.name, year_index)?;

            let petty = ((operating_expenses + depreciation_cost) * building.petty_ratio).trunc();
            // Upper bound wins over the lower bound when both would apply.
            let petty = if petty > building.petty_upper {
                building.petty_upper
            } else if petty < building.petty_lower {
                building.petty_lower
            } else {
                petty
            };

            let book_expenses =
                operating_expenses + depreciation_cost + loan_row.building_interest + petty;
            let book_income = total_income - book_expenses;

            let mut real_cash = total_income - (operating_expenses + loan_row.payment);
            if params.cut_initial_cost() && building.is_purchase_year(year) {
                // The initial acquisition cost was not funded out of pocket.
                real_cash += building.initial_expenses;
            }

            row.total_income += total_income;
            row.operating_expenses += operating_expenses;
            row.depreciation += depreciation_cost;
            row.building_interest += loan_row.building_interest;
            row.loan_payment += loan_row.payment;
            row.petty_expenses += petty;
            row.book_expenses += book_expenses;
            row.book_income += book_income;
            row.real_cash += real_cash;
        }

        table.insert(year, row)?;
    }

    Ok(table)
}
