//! Straight-line depreciation per building and year-index. Each component
//! (frame, equipment) contributes its fixed annual cost while the year-index
//! is within that component's interval, then drops to zero.

use rust_decimal::Decimal;

use crate::params::ParameterStore;
use crate::tables::{DepreciationRow, DepreciationTable};
use crate::SimResult;

pub const TABLE_NAME: &str = "building_depreciation_data";

pub fn calculate(params: &ParameterStore) -> SimResult<DepreciationTable> {
    let mut table = DepreciationTable::new(TABLE_NAME);

    for building in params.buildings() {
        for year_index in 1..=params.simulation_interval() {
            let year = Decimal::from(year_index);
            let frame_cost = if year <= building.frame_interval {
                building.frame_annual_cost
            } else {
                Decimal::ZERO
            };
            let equipment_cost = if year <= building.equipment_interval {
                building.equipment_annual_cost
            } else {
                Decimal::ZERO
            };

            table.insert(
                &building.name,
                year_index,
                DepreciationRow {
                    year_index,
                    building: building.name.clone(),
                    depreciation_cost: frame_cost + equipment_cost,
                },
            )?;
        }
    }

    Ok(table)
}
