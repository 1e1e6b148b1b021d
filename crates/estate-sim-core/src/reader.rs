//! Parameter document model and derivation pass.
//!
//! The document mirrors the six sheets of the original parameter workbook;
//! all six must be present before anything runs. The reader converts percent
//! inputs to fractional rates and pre-derives building age, depreciation
//! intervals/costs and loan terms, so the calculators only ever see the
//! [`ParameterStore`] query surface.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use serde_json::Value;

use crate::error::SimulationError;
use crate::params::{BuildingParameters, GlobalSwitches, IncomeRow, ParameterStore};
use crate::types::{Money, Rate};
use crate::SimResult;

/// Equipment depreciates over a fixed statutory life regardless of structure.
const EQUIPMENT_DURABLE_LIFE: u32 = 15;

#[derive(Debug, Clone, Deserialize)]
pub struct RawIncomeRow {
    pub year: i32,
    pub salary: Money,
    pub expenses: Money,
}

/// One building as it appears in the parameter file. Percent fields keep a
/// `_pct` suffix; everything else is whole currency units.
#[derive(Debug, Clone, Deserialize)]
pub struct RawBuilding {
    pub name: String,
    pub built_date: NaiveDate,
    pub purchase_date: NaiveDate,
    pub expected_sale_date: NaiveDate,
    pub structure: String,
    pub price: Money,
    pub initial_investment: Money,
    pub initial_expenses: Money,
    pub acquisition_tax: Money,
    pub annual_interest_rate_pct: Decimal,
    pub loan_years: u32,
    pub building_ratio_pct: Decimal,
    pub frame_ratio_pct: Decimal,
    pub equipment_ratio_pct: Decimal,
    pub rent_income_per_month: Money,
    pub management_fee_per_month: Money,
    pub repair_reserve_per_month: Money,
    pub property_tax_per_year: Money,
    pub petty_ratio_pct: Decimal,
    pub petty_upper: Money,
    pub petty_lower: Money,
    pub sale_expenses: Money,
    pub decline_rate_pct: Decimal,
    pub first_year_decline_rate_pct: Decimal,
}

/// The whole parameter file. Each slot maps to one required sheet; `None`
/// means the sheet was missing, which is fatal before the pipeline runs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ParameterDocument {
    pub income_simulation: Option<Vec<RawIncomeRow>>,
    pub building_information: Option<Vec<RawBuilding>>,
    pub basic_exemption: Option<Value>,
    pub exemption_from_income: Option<Value>,
    pub building_durable_life: Option<BTreeMap<String, u32>>,
    pub other_parameters: Option<GlobalSwitches>,
}

/// Validate the document and build the immutable parameter store.
pub fn build_store(doc: ParameterDocument) -> SimResult<ParameterStore> {
    let income = doc
        .income_simulation
        .ok_or(SimulationError::MissingSection("income_simulation"))?;
    let raw_buildings = doc
        .building_information
        .ok_or(SimulationError::MissingSection("building_information"))?;
    // Presence is part of the interface contract; the statutory exemption
    // itself is a fixed constant in the tax calculator.
    doc.basic_exemption
        .ok_or(SimulationError::MissingSection("basic_exemption"))?;
    doc.exemption_from_income
        .ok_or(SimulationError::MissingSection("exemption_from_income"))?;
    let durable_life = doc
        .building_durable_life
        .ok_or(SimulationError::MissingSection("building_durable_life"))?;
    let switches = doc
        .other_parameters
        .ok_or(SimulationError::MissingSection("other_parameters"))?;

    let income = income
        .into_iter()
        .map(|row| IncomeRow {
            year: row.year,
            salary: row.salary,
            expenses: row.expenses,
        })
        .collect();

    let buildings = raw_buildings
        .into_iter()
        .map(|raw| derive_building(raw, &durable_life))
        .collect::<SimResult<Vec<_>>>()?;

    ParameterStore::new(income, buildings, switches)
}

fn derive_building(
    raw: RawBuilding,
    durable_life: &BTreeMap<String, u32>,
) -> SimResult<BuildingParameters> {
    let frame_limit = *durable_life.get(&raw.structure).ok_or_else(|| {
        SimulationError::InvalidInput {
            field: format!("building '{}'", raw.name),
            reason: format!(
                "structure '{}' has no entry in building_durable_life",
                raw.structure
            ),
        }
    })?;

    let age = building_age(&raw)?;
    let frame_interval = depreciation_interval(frame_limit, age);
    let equipment_interval = depreciation_interval(EQUIPMENT_DURABLE_LIFE, age);

    let building_ratio = percent(raw.building_ratio_pct);
    let frame_total = (raw.price * building_ratio * percent(raw.frame_ratio_pct)).trunc();
    let equipment_total = (raw.price * building_ratio * percent(raw.equipment_ratio_pct)).trunc();
    let frame_annual_cost = annual_depreciation(&raw.name, frame_total, frame_interval)?;
    let equipment_annual_cost = annual_depreciation(&raw.name, equipment_total, equipment_interval)?;

    let monthly_rate = percent(raw.annual_interest_rate_pct) / dec!(12);
    let payment_count = raw.loan_years * 12;
    if monthly_rate <= Decimal::ZERO || payment_count == 0 {
        return Err(SimulationError::InvalidInput {
            field: format!("building '{}'", raw.name),
            reason: "loan requires a positive interest rate and at least one payment".into(),
        });
    }

    Ok(BuildingParameters {
        name: raw.name,
        purchase_date: raw.purchase_date,
        expected_sale_date: raw.expected_sale_date,
        price: raw.price,
        building_ratio,
        frame_interval,
        equipment_interval,
        frame_annual_cost,
        equipment_annual_cost,
        loan_principal: raw.price - raw.initial_investment,
        monthly_rate,
        payment_count,
        rent_income_per_month: raw.rent_income_per_month,
        management_fee_per_month: raw.management_fee_per_month,
        repair_reserve_per_month: raw.repair_reserve_per_month,
        property_tax_per_year: raw.property_tax_per_year,
        initial_expenses: raw.initial_expenses,
        acquisition_tax: raw.acquisition_tax,
        petty_ratio: percent(raw.petty_ratio_pct),
        petty_upper: raw.petty_upper,
        petty_lower: raw.petty_lower,
        sale_expenses: raw.sale_expenses,
        decline_rate: percent(raw.decline_rate_pct),
        first_year_decline_rate: percent(raw.first_year_decline_rate_pct),
    })
}

fn percent(value: Decimal) -> Rate {
    value / dec!(100)
}

/// Age in whole years at purchase, counting any started year (ceiling of
/// elapsed days / 365).
fn building_age(raw: &RawBuilding) -> SimResult<u32> {
    let days = (raw.purchase_date - raw.built_date).num_days();
    if days < 0 {
        return Err(SimulationError::InvalidInput {
            field: format!("building '{}'", raw.name),
            reason: "built date is after the purchase date".into(),
        });
    }
    Ok(((days + 364) / 365) as u32)
}

/// Statutory depreciation interval for a used building:
/// `(limit − age) + 0.2·age` while the building is within its durable life,
/// `0.2·age` once past it. Fractional by design.
fn depreciation_interval(limit: u32, age: u32) -> Decimal {
    if age <= limit {
        Decimal::from(limit - age) + dec!(0.2) * Decimal::from(age)
    } else {
        dec!(0.2) * Decimal::from(age)
    }
}

fn annual_depreciation(name: &str, total: Money, interval: Decimal) -> SimResult<Money> {
    if interval <= Decimal::ZERO {
        return Err(SimulationError::InvalidInput {
            field: format!("building '{name}'"),
            reason: "depreciation interval must be positive".into(),
        });
    }
    Ok((total / interval).trunc())
}
