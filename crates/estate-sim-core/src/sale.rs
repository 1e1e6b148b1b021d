//! Hypothetical sale economics per building and year-index: assessed value
//! net of the remaining loan, depreciation recapture and capital-gains tax.
//! A loss comes out as negative proceeds; nothing is clamped.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::params::ParameterStore;
use crate::pipeline::PipelineTables;
use crate::tables::{SaleRow, SaleTable};
use crate::SimResult;

pub const TABLE_NAME: &str = "real_estate_sale_data";

const CALCULATOR: &str = "sale_simulation";

/// Short-term (holding ≤ 5 years) vs long-term capital-gains tax rates.
const SHORT_TERM_RATE: Decimal = dec!(0.3963);
const LONG_TERM_RATE: Decimal = dec!(0.20315);

pub fn calculate(params: &ParameterStore, tables: &PipelineTables) -> SimResult<SaleTable> {
    let loan = tables.require_loan_per_year(CALCULATOR)?;
    let depreciation = tables.require_depreciation(CALCULATOR)?;
    let price = tables.require_price(CALCULATOR)?;

    let mut table = SaleTable::new(TABLE_NAME);
    for building in params.buildings() {
        let mut cumulative_depreciation = Decimal::ZERO;
        for year_index in 1..=params.simulation_interval() {
            let assessed_value = price.get(&building.name, year_index)?.assessed_value;
            let loan_balance = loan.get(&building.name, year_index)?.balance;
            cumulative_depreciation += depreciation
                .get(&building.name, year_index)?
                .depreciation_cost;

            let gain = assessed_value
                - (building.price - building.sale_expenses - cumulative_depreciation);
            let rate = if year_index <= 5 {
                SHORT_TERM_RATE
            } else {
                LONG_TERM_RATE
            };
            let capital_gains_tax = (gain * rate).trunc();

            let sale_proceeds =
                assessed_value - (loan_balance + capital_gains_tax + building.sale_expenses);

            table.insert(
                &building.name,
                year_index,
                SaleRow {
                    year_index,
                    building: building.name.clone(),
                    assessed_value,
                    loan_balance,
                    cumulative_depreciation,
                    sale_expenses: building.sale_expenses,
                    capital_gains_tax,
                    sale_proceeds,
                },
            )?;
        }
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{BuildingParameters, GlobalSwitches, IncomeRow};
    use crate::{depreciation, loan, price};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn run() -> (ParameterStore, PipelineTables) {
        let income = (2024..=2030)
            .map(|year| IncomeRow {
                year,
                salary: dec!(6000000),
                expenses: dec!(0),
            })
            .collect();
        let building = BuildingParameters {
            name: "A".into(),
            purchase_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            expected_sale_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            price: dec!(10000000),
            building_ratio: dec!(0.4),
            frame_interval: dec!(10.0),
            equipment_interval: dec!(10.0),
            frame_annual_cost: dec!(300000),
            equipment_annual_cost: dec!(100000),
            loan_principal: dec!(1000000),
            monthly_rate: dec!(0.01),
            payment_count: 2,
            rent_income_per_month: dec!(90000),
            management_fee_per_month: dec!(8000),
            repair_reserve_per_month: dec!(6000),
            property_tax_per_year: dec!(80000),
            initial_expenses: dec!(800000),
            acquisition_tax: dec!(300000),
            petty_ratio: dec!(0.1),
            petty_upper: dec!(200000),
            petty_lower: dec!(0),
            sale_expenses: dec!(500000),
            decline_rate: dec!(0.01),
            first_year_decline_rate: dec!(0.1),
        };
        let params =
            ParameterStore::new(income, vec![building], GlobalSwitches::default()).unwrap();

        let mut tables = PipelineTables::default();
        tables.depreciation = Some(depreciation::calculate(&params).unwrap());
        let (per_month, per_year) = loan::calculate(&params).unwrap();
        tables.loan_per_month = Some(per_month);
        tables.loan_per_year = Some(per_year);
        tables.price = Some(price::calculate(&params).unwrap());
        (params, tables)
    }

    #[test]
    fn test_first_year_sale() {
        let (params, tables) = run();
        let table = calculate(&params, &tables).unwrap();
        let row = table.get("A", 1).unwrap();

        // Price year 1: trunc(10,000,000 * 0.9)
        assert_eq!(row.assessed_value, dec!(9000000));
        // Loan retired within the first year.
        assert_eq!(row.loan_balance, dec!(0));
        assert_eq!(row.cumulative_depreciation, dec!(400000));
        // gain = 9,000,000 - (10,000,000 - 500,000 - 400,000) = -100,000;
        // short-term rate, truncated toward zero.
        assert_eq!(row.capital_gains_tax, dec!(-39630));
        // proceeds = 9,000,000 - (0 - 39,630 + 500,000)
        assert_eq!(row.sale_proceeds, dec!(8539630));
    }

    #[test]
    fn test_long_term_rate_after_five_years() {
        let (params, tables) = run();
        let table = calculate(&params, &tables).unwrap();

        let y5 = table.get("A", 5).unwrap();
        let y6 = table.get("A", 6).unwrap();
        // Same-sign gains across the boundary use different rates.
        let gain5 = y5.assessed_value - (dec!(10000000) - dec!(500000) - y5.cumulative_depreciation);
        let gain6 = y6.assessed_value - (dec!(10000000) - dec!(500000) - y6.cumulative_depreciation);
        assert_eq!(y5.capital_gains_tax, (gain5 * dec!(0.3963)).trunc());
        assert_eq!(y6.capital_gains_tax, (gain6 * dec!(0.20315)).trunc());
    }

    #[test]
    fn test_cumulative_depreciation_is_a_running_sum() {
        let (params, tables) = run();
        let table = calculate(&params, &tables).unwrap();
        for year_index in 1..=7 {
            assert_eq!(
                table.get("A", year_index).unwrap().cumulative_depreciation,
                dec!(400000) * Decimal::from(year_index.min(10))
            );
        }
    }
}
