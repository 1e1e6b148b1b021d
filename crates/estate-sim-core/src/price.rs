//! Projected market-value decay per building: a first-year drop, then a
//! steady-state decline compounding on the previous year's value. The value
//! is truncated every year, so the next year compounds on the truncated
//! figure.

use crate::params::ParameterStore;
use crate::tables::{PriceRow, PriceTable};
use crate::types::{Money, Rate};
use crate::SimResult;

use rust_decimal::Decimal;

pub const TABLE_NAME: &str = "real_estate_price_data";

pub fn calculate(params: &ParameterStore) -> SimResult<PriceTable> {
    let mut table = PriceTable::new(TABLE_NAME);

    for building in params.buildings() {
        let mut value: Money = building.price;
        for year_index in 1..=params.simulation_interval() {
            let rate: Rate = if year_index == 1 {
                building.first_year_decline_rate
            } else {
                building.decline_rate
            };
            value = (value * (Decimal::ONE - rate)).trunc();

            table.insert(
                &building.name,
                year_index,
                PriceRow {
                    year_index,
                    building: building.name.clone(),
                    assessed_value: value,
                },
            )?;
        }
    }

    Ok(table)
}
