//! Final netting: per calendar year, real cash flow, the tax delta caused by
//! owning real estate, and realized sale proceeds roll into a running
//! cumulative balance.

use rust_decimal::Decimal;

use crate::params::ParameterStore;
use crate::pipeline::PipelineTables;
use crate::tables::{CashFlowRow, CashFlowTable};
use crate::SimResult;

pub const TABLE_NAME: &str = "cash_flow_data";

const CALCULATOR: &str = "cash_flow";

pub fn calculate(params: &ParameterStore, tables: &PipelineTables) -> SimResult<CashFlowTable> {
    let baseline_tax = tables.require_baseline_tax(CALCULATOR)?;
    let adjusted_tax = tables.require_adjusted_tax(CALCULATOR)?;
    let real_estate_cash = tables.require_real_estate_cash(CALCULATOR)?;
    let sale = tables.require_sale(CALCULATOR)?;

    let mut table = CashFlowTable::new(TABLE_NAME);
    let mut cumulative_delta = Decimal::ZERO;
    for year in params.simulation_start_year()..=params.simulation_end_year() {
        let real_cash = real_estate_cash.get(year)?.real_cash;

        // Both tax tables are aligned by calendar year; lookups assert the
        // usual exactly-one-match invariant.
        let tax_delta = adjusted_tax.get(year)?.total_tax - baseline_tax.get(year)?.total_tax;

        // Sale proceeds count only in the exact year a building is expected
        // to sell.
        let mut sale_profit = Decimal::ZERO;
        for building in params.buildings() {
            if building.expected_sale_year() == year {
                let year_index = building.year_index(year);
                sale_profit += sale.get(&building.name, year_index)?.sale_proceeds;
            }
        }

        let net_delta = real_cash - tax_delta + sale_profit;
        cumulative_delta += net_delta;

        table.insert(
            year,
            CashFlowRow {
                year,
                real_cash,
                tax_delta,
                sale_profit,
                net_delta,
                cumulative_delta,
            },
        )?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SimulationError;
    use crate::tables::{RealEstateCashRow, RealEstateCashTable, SaleTable, TaxRow, TaxTable};
    use crate::params::{GlobalSwitches, IncomeRow};
    use crate::{real_estate_cash, sale, tax};
    use rust_decimal_macros::dec;

    fn tax_table(name: &'static str, totals: &[(i32, Decimal)]) -> TaxTable {
        let mut table = TaxTable::new(name);
        for &(year, total_tax) in totals {
            table
                .insert(
                    year,
                    TaxRow {
                        year,
                        salary: dec!(6000000),
                        expenses: dec!(0),
                        employment_deduction: dec!(1640000),
                        adjusted_income: dec!(4360000),
                        basic_exemption: tax::BASIC_EXEMPTION,
                        taxable_income: dec!(3880000),
                        income_tax: total_tax,
                        resident_tax: dec!(0),
                        total_tax,
                    },
                )
                .unwrap();
        }
        table
    }

    fn cash_table(cash: &[(i32, Decimal)]) -> RealEstateCashTable {
        let mut table = RealEstateCashTable::new(real_estate_cash::TABLE_NAME);
        for &(year, real_cash) in cash {
            table
                .insert(
                    year,
                    RealEstateCashRow {
                        year,
                        total_income: dec!(0),
                        operating_expenses: dec!(0),
                        depreciation: dec!(0),
                        building_interest: dec!(0),
                        loan_payment: dec!(0),
                        petty_expenses: dec!(0),
                        book_expenses: dec!(0),
                        book_income: dec!(0),
                        real_cash,
                    },
                )
                .unwrap();
        }
        table
    }

    fn tables_for(years: &[i32], deltas: &[(Decimal, Decimal)]) -> PipelineTables {
        let baseline: Vec<_> = years
            .iter()
            .zip(deltas)
            .map(|(&y, &(base, _))| (y, base))
            .collect();
        let adjusted: Vec<_> = years
            .iter()
            .zip(deltas)
            .map(|(&y, &(base, delta))| (y, base + delta))
            .collect();
        let cash: Vec<_> = years.iter().map(|&y| (y, dec!(100000))).collect();

        let mut tables = PipelineTables::default();
        tables.baseline_tax = Some(tax_table(tax::TABLE_NAME, &baseline));
        tables.adjusted_tax = Some(tax_table(tax::ADJUSTED_TABLE_NAME, &adjusted));
        tables.real_estate_cash = Some(cash_table(&cash));
        tables.sale = Some(SaleTable::new(sale::TABLE_NAME));
        tables
    }

    fn params_for(years: std::ops::RangeInclusive<i32>) -> ParameterStore {
        let income = years
            .map(|year| IncomeRow {
                year,
                salary: dec!(6000000),
                expenses: dec!(0),
            })
            .collect();
        ParameterStore::new(income, vec![], GlobalSwitches::default()).unwrap()
    }

    #[test]
    fn test_cumulative_delta_is_exact_running_sum() {
        let years = [2024, 2025, 2026];
        let deltas = [
            (dec!(500000), dec!(-30000)),
            (dec!(510000), dec!(20000)),
            (dec!(520000), dec!(0)),
        ];
        let tables = tables_for(&years, &deltas);
        let params = params_for(2024..=2026);
        let table = calculate(&params, &tables).unwrap();

        let rows = table.rows();
        let mut running = dec!(0);
        for row in rows {
            assert_eq!(row.net_delta, row.real_cash - row.tax_delta + row.sale_profit);
            running += row.net_delta;
            assert_eq!(row.cumulative_delta, running);
        }
        // First year's cumulative equals its own net delta.
        assert_eq!(rows[0].cumulative_delta, rows[0].net_delta);
        // Spot check: net = 100,000 - (-30,000) + 0.
        assert_eq!(rows[0].net_delta, dec!(130000));
    }

    #[test]
    fn test_missing_tax_year_is_a_consistency_error() {
        let years = [2024, 2025];
        let deltas = [(dec!(500000), dec!(0)), (dec!(500000), dec!(0))];
        let mut tables = tables_for(&years, &deltas);
        // Adjusted table misses 2026 while the horizon extends there.
        tables.real_estate_cash = Some(cash_table(&[
            (2024, dec!(0)),
            (2025, dec!(0)),
            (2026, dec!(0)),
        ]));
        let params = params_for(2024..=2026);
        let err = calculate(&params, &tables).unwrap_err();
        assert!(matches!(err, SimulationError::YearMismatch { .. }));
    }
}
