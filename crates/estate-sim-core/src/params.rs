use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SimulationError;
use crate::types::{CalendarYear, Money, Rate, YearIndex};
use crate::SimResult;

/// Static attributes of one building, fully derived: the reader has already
/// turned percent inputs into fractional rates and the raw purchase data into
/// depreciation intervals/costs and loan terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildingParameters {
    pub name: String,
    pub purchase_date: NaiveDate,
    pub expected_sale_date: NaiveDate,
    pub price: Money,

    /// Portion of the price attributable to the building structure.
    pub building_ratio: Rate,

    /// Depreciation intervals are fractional years (statutory formula on the
    /// building's age); costs are whole currency units per year.
    pub frame_interval: Decimal,
    pub equipment_interval: Decimal,
    pub frame_annual_cost: Money,
    pub equipment_annual_cost: Money,

    pub loan_principal: Money,
    pub monthly_rate: Rate,
    pub payment_count: u32,

    pub rent_income_per_month: Money,
    pub management_fee_per_month: Money,
    pub repair_reserve_per_month: Money,
    pub property_tax_per_year: Money,
    pub initial_expenses: Money,
    pub acquisition_tax: Money,

    pub petty_ratio: Rate,
    pub petty_upper: Money,
    pub petty_lower: Money,

    pub sale_expenses: Money,
    pub decline_rate: Rate,
    pub first_year_decline_rate: Rate,
}

impl BuildingParameters {
    pub fn purchase_year(&self) -> CalendarYear {
        self.purchase_date.year()
    }

    pub fn expected_sale_year(&self) -> CalendarYear {
        self.expected_sale_date.year()
    }

    /// Convert a calendar year into this building's own 1-based year-index.
    pub fn year_index(&self, year: CalendarYear) -> YearIndex {
        year - self.purchase_year() + 1
    }

    /// A building contributes to calendar-year aggregates only within
    /// `[purchase_year, sale_year]` inclusive.
    pub fn is_ownership_period(&self, year: CalendarYear) -> bool {
        self.purchase_year() <= year && year <= self.expected_sale_year()
    }

    pub fn is_purchase_year(&self, year: CalendarYear) -> bool {
        self.purchase_year() == year
    }

    /// Fixed yearly operating expenses, plus the one-off acquisition costs in
    /// the purchase year.
    pub fn operating_expenses(&self, year: CalendarYear) -> Money {
        let mut total = (self.management_fee_per_month + self.repair_reserve_per_month)
            * Decimal::from(12)
            + self.property_tax_per_year;
        if self.is_purchase_year(year) {
            total += self.initial_expenses + self.acquisition_tax;
        }
        total
    }
}

/// One row of the income-simulation sheet, in whole currency units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeRow {
    pub year: CalendarYear,
    pub salary: Money,
    pub expenses: Money,
}

/// Global switches, modelled as explicit fields rather than ambient flags so
/// the calculators stay pure functions of their declared inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalSwitches {
    /// Exclude the initial acquisition cost from "real" cash flow in the
    /// purchase year (the buyer did not fund it out of pocket).
    pub cut_initial_cost: bool,
    /// Stop the pipeline after the baseline tax table.
    #[serde(default)]
    pub only_tax_calculation: bool,
}

/// Immutable, queryable view over the validated input data. Built once by the
/// reader; every calculator consumes only this interface.
#[derive(Debug, Clone)]
pub struct ParameterStore {
    income: Vec<IncomeRow>,
    buildings: Vec<BuildingParameters>,
    by_name: BTreeMap<String, usize>,
    switches: GlobalSwitches,
    start_year: CalendarYear,
    end_year: CalendarYear,
}

impl ParameterStore {
    pub fn new(
        mut income: Vec<IncomeRow>,
        buildings: Vec<BuildingParameters>,
        switches: GlobalSwitches,
    ) -> SimResult<Self> {
        if income.is_empty() {
            return Err(SimulationError::InvalidInput {
                field: "income_simulation".into(),
                reason: "at least one income row is required".into(),
            });
        }
        income.sort_by_key(|row| row.year);
        let start_year = income[0].year;
        let end_year = income[income.len() - 1].year;
        for (offset, row) in income.iter().enumerate() {
            let expected = start_year + offset as i32;
            if row.year != expected {
                return Err(SimulationError::InvalidInput {
                    field: "income_simulation".into(),
                    reason: format!(
                        "rows must cover every year from {start_year} to {end_year}; \
                         found {} where {expected} was expected",
                        row.year
                    ),
                });
            }
        }

        let mut by_name = BTreeMap::new();
        for (i, building) in buildings.iter().enumerate() {
            if building.expected_sale_date < building.purchase_date {
                return Err(SimulationError::InvalidInput {
                    field: format!("building '{}'", building.name),
                    reason: "expected sale date precedes the purchase date".into(),
                });
            }
            if by_name.insert(building.name.clone(), i).is_some() {
                return Err(SimulationError::InvalidInput {
                    field: "building_information".into(),
                    reason: format!("building name '{}' appears more than once", building.name),
                });
            }
        }

        Ok(Self {
            income,
            buildings,
            by_name,
            switches,
            start_year,
            end_year,
        })
    }

    pub fn simulation_start_year(&self) -> CalendarYear {
        self.start_year
    }

    pub fn simulation_end_year(&self) -> CalendarYear {
        self.end_year
    }

    pub fn simulation_interval(&self) -> i32 {
        self.end_year - self.start_year + 1
    }

    /// Buildings in document order.
    pub fn buildings(&self) -> &[BuildingParameters] {
        &self.buildings
    }

    pub fn building(&self, name: &str) -> SimResult<&BuildingParameters> {
        self.by_name
            .get(name)
            .map(|&i| &self.buildings[i])
            .ok_or_else(|| SimulationError::InvalidInput {
                field: "building".into(),
                reason: format!("building '{name}' does not exist in the parameter store"),
            })
    }

    /// Income rows sorted by calendar year, covering the whole horizon.
    pub fn income_rows(&self) -> &[IncomeRow] {
        &self.income
    }

    pub fn cut_initial_cost(&self) -> bool {
        self.switches.cut_initial_cost
    }

    pub fn only_tax_calculation(&self) -> bool {
        self.switches.only_tax_calculation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn income(years: std::ops::RangeInclusive<i32>) -> Vec<IncomeRow> {
        years
            .map(|year| IncomeRow {
                year,
                salary: dec!(6000000),
                expenses: dec!(100000),
            })
            .collect()
    }

    #[test]
    fn test_horizon_derivation() {
        let store =
            ParameterStore::new(income(2024..=2028), vec![], GlobalSwitches::default()).unwrap();
        assert_eq!(store.simulation_start_year(), 2024);
        assert_eq!(store.simulation_end_year(), 2028);
        assert_eq!(store.simulation_interval(), 5);
    }

    #[test]
    fn test_rejects_gap_in_income_years() {
        let mut rows = income(2024..=2026);
        rows.remove(1);
        let err = ParameterStore::new(rows, vec![], GlobalSwitches::default()).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_empty_income() {
        assert!(ParameterStore::new(vec![], vec![], GlobalSwitches::default()).is_err());
    }
}
