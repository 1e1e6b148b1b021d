//! Result tables produced by the calculators.
//!
//! Every table is an ordered row vector with a composite-key index built at
//! insertion time: inserting a duplicate key fails when the table is built,
//! and a missed lookup reports the offending key with a row count of zero.
//! The "exactly one match" invariant is therefore structural, not a
//! scan-and-count check.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::SimulationError;
use crate::types::{CalendarYear, Money, YearIndex};
use crate::SimResult;

/// Rows keyed by `(building, period)`, where period is a 1-based year-index
/// (or a 1-based month number for the monthly loan table).
#[derive(Debug, Clone)]
pub struct BuildingPeriodTable<R> {
    name: &'static str,
    rows: Vec<R>,
    index: BTreeMap<String, BTreeMap<YearIndex, usize>>,
}

impl<R: Serialize> BuildingPeriodTable<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn insert(&mut self, building: &str, period: YearIndex, row: R) -> SimResult<()> {
        let slot = self.index.entry(building.to_string()).or_default();
        if slot.insert(period, self.rows.len()).is_some() {
            return Err(SimulationError::DuplicateRow {
                table: self.name,
                key: format!("{building}/{period}"),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get(&self, building: &str, period: YearIndex) -> SimResult<&R> {
        self.index
            .get(building)
            .and_then(|slot| slot.get(&period))
            .map(|&i| &self.rows[i])
            .ok_or_else(|| SimulationError::RowMismatch {
                table: self.name,
                building: building.to_string(),
                period,
                found: 0,
            })
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn to_value(&self) -> SimResult<Value> {
        Ok(serde_json::to_value(&self.rows)?)
    }
}

/// Rows keyed by absolute calendar year.
#[derive(Debug, Clone)]
pub struct CalendarYearTable<R> {
    name: &'static str,
    rows: Vec<R>,
    index: BTreeMap<CalendarYear, usize>,
}

impl<R: Serialize> CalendarYearTable<R> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            rows: Vec::new(),
            index: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn insert(&mut self, year: CalendarYear, row: R) -> SimResult<()> {
        if self.index.insert(year, self.rows.len()).is_some() {
            return Err(SimulationError::DuplicateRow {
                table: self.name,
                key: year.to_string(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn get(&self, year: CalendarYear) -> SimResult<&R> {
        self.index
            .get(&year)
            .map(|&i| &self.rows[i])
            .ok_or_else(|| SimulationError::YearMismatch {
                table: self.name,
                year,
                found: 0,
            })
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn to_value(&self) -> SimResult<Value> {
        Ok(serde_json::to_value(&self.rows)?)
    }
}

// ---------------------------------------------------------------------------
// Row types, one per produced table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DepreciationRow {
    pub year_index: YearIndex,
    pub building: String,
    pub depreciation_cost: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanMonthlyRow {
    pub month: YearIndex,
    pub building: String,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
    pub building_interest: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanYearlyRow {
    pub year_index: YearIndex,
    pub building: String,
    pub payment: Money,
    pub interest: Money,
    pub principal: Money,
    pub balance: Money,
    pub building_interest: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct RealEstateCashRow {
    pub year: CalendarYear,
    pub total_income: Money,
    pub operating_expenses: Money,
    pub depreciation: Money,
    pub building_interest: Money,
    pub loan_payment: Money,
    pub petty_expenses: Money,
    pub book_expenses: Money,
    pub book_income: Money,
    pub real_cash: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxRow {
    pub year: CalendarYear,
    pub salary: Money,
    pub expenses: Money,
    pub employment_deduction: Money,
    pub adjusted_income: Money,
    pub basic_exemption: Money,
    pub taxable_income: Money,
    pub income_tax: Money,
    pub resident_tax: Money,
    pub total_tax: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct PriceRow {
    pub year_index: YearIndex,
    pub building: String,
    pub assessed_value: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct SaleRow {
    pub year_index: YearIndex,
    pub building: String,
    pub assessed_value: Money,
    pub loan_balance: Money,
    pub cumulative_depreciation: Money,
    pub sale_expenses: Money,
    pub capital_gains_tax: Money,
    pub sale_proceeds: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct CashFlowRow {
    pub year: CalendarYear,
    pub real_cash: Money,
    pub tax_delta: Money,
    pub sale_profit: Money,
    pub net_delta: Money,
    pub cumulative_delta: Money,
}

pub type DepreciationTable = BuildingPeriodTable<DepreciationRow>;
pub type LoanMonthlyTable = BuildingPeriodTable<LoanMonthlyRow>;
pub type LoanYearlyTable = BuildingPeriodTable<LoanYearlyRow>;
pub type PriceTable = BuildingPeriodTable<PriceRow>;
pub type SaleTable = BuildingPeriodTable<SaleRow>;
pub type RealEstateCashTable = CalendarYearTable<RealEstateCashRow>;
pub type TaxTable = CalendarYearTable<TaxRow>;
pub type CashFlowTable = CalendarYearTable<CashFlowRow>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duplicate_insert_fails_at_build_time() {
        let mut table = DepreciationTable::new("building_depreciation_data");
        let row = |yi| DepreciationRow {
            year_index: yi,
            building: "A".into(),
            depreciation_cost: dec!(100),
        };
        table.insert("A", 1, row(1)).unwrap();
        let err = table.insert("A", 1, row(1)).unwrap_err();
        assert!(matches!(err, SimulationError::DuplicateRow { .. }));
    }

    #[test]
    fn test_missed_lookup_names_building_and_period() {
        let table = DepreciationTable::new("building_depreciation_data");
        let err = table.get("A", 3).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("'A'"));
        assert!(message.contains("period 3"));
        assert!(message.contains("0 rows"));
    }
}
