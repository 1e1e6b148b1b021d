//! Personal income taxation: employment-income deduction, national income
//! tax brackets, and a flat resident-tax approximation. The calculator is a
//! pure function of the income rows and may run twice per simulation: once
//! baseline, once with the real-estate book income folded in.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::SimulationError;
use crate::params::ParameterStore;
use crate::tables::{RealEstateCashTable, TaxRow, TaxTable};
use crate::types::Money;
use crate::SimResult;

pub const TABLE_NAME: &str = "tax_data";
pub const ADJUSTED_TABLE_NAME: &str = "tax_data_with_real_estate_cash";

/// Statutory basic exemption, fixed.
pub const BASIC_EXEMPTION: Decimal = dec!(480000);

/// Employment-income deduction, a fixed progressive-bracket lookup on the
/// salary. Flat amounts or `salary × rate + offset`, truncated.
pub fn employment_income_deduction(salary: Money) -> Money {
    if salary <= dec!(1625000) {
        dec!(550000)
    } else if salary <= dec!(1800000) {
        (salary * dec!(0.4) - dec!(100000)).trunc()
    } else if salary <= dec!(3600000) {
        (salary * dec!(0.3) + dec!(80000)).trunc()
    } else if salary <= dec!(6600000) {
        (salary * dec!(0.2) + dec!(440000)).trunc()
    } else if salary <= dec!(8500000) {
        (salary * dec!(0.1) + dec!(1100000)).trunc()
    } else {
        dec!(1950000)
    }
}

/// National income tax on taxable income. Taxable income below the first
/// bracket threshold is rejected, never silently zeroed.
pub fn national_income_tax(taxable_income: Money) -> SimResult<Money> {
    let t = taxable_income;
    let tax = if t >= dec!(1000) && t <= dec!(1949000) {
        t * dec!(0.05)
    } else if t <= dec!(3299000) && t > dec!(1949000) {
        t * dec!(0.10) - dec!(97500)
    } else if t <= dec!(6949000) && t > dec!(3299000) {
        t * dec!(0.20) - dec!(427500)
    } else if t <= dec!(8999000) && t > dec!(6949000) {
        t * dec!(0.23) - dec!(636000)
    } else if t <= dec!(17999000) && t > dec!(8999000) {
        t * dec!(0.33) - dec!(1536000)
    } else if t <= dec!(39999000) && t > dec!(17999000) {
        t * dec!(0.40) - dec!(2796000)
    } else if t > dec!(39999000) {
        t * dec!(0.45) - dec!(4796000)
    } else {
        return Err(SimulationError::InvalidInput {
            field: "taxable_income".into(),
            reason: format!("{t} is below the lowest income-tax bracket"),
        });
    };
    Ok(tax.trunc())
}

/// Flat resident-tax approximation: 6% municipal + 4% prefectural, truncated.
/// The jurisdiction is accepted but does not differentiate the formula yet.
pub fn resident_tax(taxable_income: Money, _jurisdiction: Option<&str>) -> Money {
    (taxable_income * dec!(0.06) + taxable_income * dec!(0.04)).trunc()
}

/// Build the per-year tax table. When `real_estate_cash` is given, the book
/// income for the matching calendar year (exactly one row) is added to the
/// adjusted income before the exemptions apply.
pub fn calculate(
    params: &ParameterStore,
    real_estate_cash: Option<&RealEstateCashTable>,
) -> SimResult<TaxTable> {
    let name = if real_estate_cash.is_some() {
        ADJUSTED_TABLE_NAME
    } else {
        TABLE_NAME
    };
    let mut table = TaxTable::new(name);

    for row in params.income_rows() {
        let deduction = employment_income_deduction(row.salary);
        let mut adjusted_income = row.salary - deduction;
        if let Some(cash) = real_estate_cash {
            adjusted_income += cash.get(row.year)?.book_income;
        }

        let taxable_income =
            (adjusted_income - (BASIC_EXEMPTION + row.expenses)).max(Decimal::ZERO);
        let income_tax = national_income_tax(taxable_income)?;
        let resident = resident_tax(taxable_income, None);

        table.insert(
            row.year,
            TaxRow {
                year: row.year,
                salary: row.salary,
                expenses: row.expenses,
                employment_deduction: deduction,
                adjusted_income,
                basic_exemption: BASIC_EXEMPTION,
                taxable_income,
                income_tax,
                resident_tax: resident,
                total_tax: income_tax + resident,
            },
        )?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{GlobalSwitches, IncomeRow};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_employment_deduction_brackets() {
        assert_eq!(employment_income_deduction(dec!(1625000)), dec!(550000));
        assert_eq!(employment_income_deduction(dec!(1700000)), dec!(580000));
        assert_eq!(employment_income_deduction(dec!(3000000)), dec!(980000));
        assert_eq!(employment_income_deduction(dec!(6000000)), dec!(1640000));
        assert_eq!(employment_income_deduction(dec!(8000000)), dec!(1900000));
        assert_eq!(employment_income_deduction(dec!(20000000)), dec!(1950000));
    }

    #[test]
    fn test_income_tax_known_answers() {
        assert_eq!(national_income_tax(dec!(1540000)).unwrap(), dec!(77000));
        assert_eq!(national_income_tax(dec!(5000000)).unwrap(), dec!(572500));
        assert_eq!(national_income_tax(dec!(50000000)).unwrap(), dec!(17704000));
    }

    #[test]
    fn test_income_tax_rejects_sub_threshold_values() {
        assert!(national_income_tax(dec!(0)).is_err());
        assert!(national_income_tax(dec!(999)).is_err());
        assert!(national_income_tax(dec!(1000)).is_ok());
    }

    #[test]
    fn test_brackets_continuous_at_published_boundaries() {
        // The taxable-income domain is quantized in thousands; continuity is
        // checked at each bracket bound against the next bracket's start.
        let bounds = [
            (dec!(1949000), dec!(1950000)),
            (dec!(3299000), dec!(3300000)),
            (dec!(6949000), dec!(6950000)),
            (dec!(8999000), dec!(9000000)),
            (dec!(17999000), dec!(18000000)),
            (dec!(39999000), dec!(40000000)),
        ];
        for (upper, next) in bounds {
            let at_upper = national_income_tax(upper).unwrap();
            let at_next = national_income_tax(next).unwrap();
            assert!(
                at_next >= at_upper,
                "downward jump between {upper} and {next}: {at_upper} -> {at_next}"
            );
        }
    }

    #[test]
    fn test_resident_tax() {
        assert_eq!(resident_tax(dec!(1540000), None), dec!(154000));
        assert_eq!(resident_tax(dec!(1234567), None), dec!(123456));
    }

    #[test]
    fn test_flat_salary_tax_table() {
        // 3,000,000 salary, no adjustment, no expenses.
        let income = vec![IncomeRow {
            year: 2024,
            salary: dec!(3000000),
            expenses: dec!(0),
        }];
        let params = ParameterStore::new(income, vec![], GlobalSwitches::default()).unwrap();
        let table = calculate(&params, None).unwrap();
        let row = table.get(2024).unwrap();

        assert_eq!(row.employment_deduction, dec!(980000));
        assert_eq!(row.taxable_income, dec!(1540000));
        assert_eq!(row.income_tax, dec!(77000));
        assert_eq!(row.resident_tax, dec!(154000));
        assert_eq!(row.total_tax, dec!(231000));
    }
}
