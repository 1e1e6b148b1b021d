//! Loan amortization. Builds the monthly fixed-payment annuity schedule for
//! every building over the whole simulation horizon, then rolls it up into
//! yearly aggregates.
//!
//! The monthly payment is truncated to whole currency units once and stays
//! fixed for the life of the loan. Months beyond `payment_count` are emitted
//! with payment, interest and principal forced to zero and the balance forced
//! to zero: a matured loan produces trailing zero rows, not an error.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::params::ParameterStore;
use crate::tables::{LoanMonthlyRow, LoanMonthlyTable, LoanYearlyRow, LoanYearlyTable};
use crate::types::positive_or_zero;
use crate::SimResult;

pub const MONTHLY_TABLE_NAME: &str = "loan_data_per_month";
pub const YEARLY_TABLE_NAME: &str = "loan_data";

pub fn calculate(params: &ParameterStore) -> SimResult<(LoanMonthlyTable, LoanYearlyTable)> {
    let mut monthly = LoanMonthlyTable::new(MONTHLY_TABLE_NAME);
    let mut yearly = LoanYearlyTable::new(YEARLY_TABLE_NAME);
    let horizon_months = params.simulation_interval() * 12;

    for building in params.buildings() {
        let principal = building.loan_principal;
        let rate = building.monthly_rate;
        let payment_count = building.payment_count as i32;

        // Standard annuity formula: P·r·(1+r)^n / ((1+r)^n − 1).
        let factor = (Decimal::ONE + rate).powi(i64::from(building.payment_count));
        let monthly_payment = (principal * rate * factor / (factor - Decimal::ONE)).trunc();

        let mut rows = Vec::with_capacity(horizon_months as usize);
        let mut balance = principal;
        for month in 1..=horizon_months {
            let within_term = month <= payment_count;
            let payment = if within_term {
                monthly_payment
            } else {
                Decimal::ZERO
            };
            let interest = if within_term {
                (balance * rate).trunc()
            } else {
                Decimal::ZERO
            };
            // Clamped: a rate anomaly can push interest above the payment.
            let principal_paid = positive_or_zero(payment - interest);
            balance = if within_term {
                positive_or_zero(balance - principal_paid)
            } else {
                Decimal::ZERO
            };
            let building_interest = (interest * building.building_ratio).trunc();

            rows.push(LoanMonthlyRow {
                month,
                building: building.name.clone(),
                payment,
                interest,
                principal: principal_paid,
                balance,
                building_interest,
            });
        }

        for year_index in 1..=params.simulation_interval() {
            let months = &rows[(year_index as usize - 1) * 12..year_index as usize * 12];
            yearly.insert(
                &building.name,
                year_index,
                LoanYearlyRow {
                    year_index,
                    building: building.name.clone(),
                    payment: months.iter().map(|r| r.payment).sum(),
                    interest: months.iter().map(|r| r.interest).sum(),
                    principal: months.iter().map(|r| r.principal).sum(),
                    // Minimum over the year captures the end-of-year balance
                    // of a declining schedule.
                    balance: months
                        .iter()
                        .map(|r| r.balance)
                        .min()
                        .unwrap_or(Decimal::ZERO),
                    building_interest: months.iter().map(|r| r.building_interest).sum(),
                },
            )?;
        }

        for row in rows {
            let month = row.month;
            monthly.insert(&building.name, month, row)?;
        }
    }

    Ok((monthly, yearly))
}
