//! The calculation pipeline: a single-threaded chain of stateless
//! calculators, each reading previously produced tables and appending its
//! own. `PipelineTables` is the accumulated context, one slot per table,
//! populated strictly in production order; a calculator that needs an empty
//! slot fails fast naming both the table and itself.

use std::time::Instant;

use serde::Serialize;
use serde_json::Value;

use crate::error::SimulationError;
use crate::params::ParameterStore;
use crate::tables::{
    CashFlowTable, DepreciationTable, LoanMonthlyTable, LoanYearlyTable, PriceTable,
    RealEstateCashTable, SaleTable, TaxTable,
};
use crate::{cash_flow, depreciation, loan, price, real_estate_cash, sale, tax};
use crate::SimResult;

#[derive(Debug, Default)]
pub struct PipelineTables {
    pub baseline_tax: Option<TaxTable>,
    pub depreciation: Option<DepreciationTable>,
    pub loan_per_month: Option<LoanMonthlyTable>,
    pub loan_per_year: Option<LoanYearlyTable>,
    pub real_estate_cash: Option<RealEstateCashTable>,
    pub adjusted_tax: Option<TaxTable>,
    pub price: Option<PriceTable>,
    pub sale: Option<SaleTable>,
    pub cash_flow: Option<CashFlowTable>,
}

macro_rules! require {
    ($fn_name:ident, $slot:ident, $table:expr, $ty:ty) => {
        pub fn $fn_name(&self, calculator: &'static str) -> SimResult<&$ty> {
            self.$slot.as_ref().ok_or(SimulationError::MissingTable {
                table: $table,
                calculator,
            })
        }
    };
}

impl PipelineTables {
    require!(require_baseline_tax, baseline_tax, tax::TABLE_NAME, TaxTable);
    require!(
        require_depreciation,
        depreciation,
        depreciation::TABLE_NAME,
        DepreciationTable
    );
    require!(
        require_loan_per_year,
        loan_per_year,
        loan::YEARLY_TABLE_NAME,
        LoanYearlyTable
    );
    require!(
        require_real_estate_cash,
        real_estate_cash,
        real_estate_cash::TABLE_NAME,
        RealEstateCashTable
    );
    require!(
        require_adjusted_tax,
        adjusted_tax,
        tax::ADJUSTED_TABLE_NAME,
        TaxTable
    );
    require!(require_price, price, price::TABLE_NAME, PriceTable);
    require!(require_sale, sale, sale::TABLE_NAME, SaleTable);

    /// Populated tables as named row arrays, in production order, for the
    /// persistence boundary.
    pub fn named_values(&self) -> SimResult<Vec<(&'static str, Value)>> {
        let mut out = Vec::new();
        if let Some(t) = &self.baseline_tax {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.depreciation {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.loan_per_month {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.loan_per_year {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.real_estate_cash {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.adjusted_tax {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.price {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.sale {
            out.push((t.name(), t.to_value()?));
        }
        if let Some(t) = &self.cash_flow {
            out.push((t.name(), t.to_value()?));
        }
        Ok(out)
    }
}

/// Metadata for every simulation run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub version: String,
    pub computation_time_us: u64,
}

#[derive(Debug)]
pub struct SimulationOutput {
    pub tables: PipelineTables,
    pub warnings: Vec<String>,
    pub metadata: RunMetadata,
}

/// Run the whole pipeline to completion, or fail fast on the first
/// data-consistency violation. Deterministic: identical parameters produce
/// identical tables.
pub fn run(params: &ParameterStore) -> SimResult<SimulationOutput> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let mut tables = PipelineTables::default();

    tables.baseline_tax = Some(tax::calculate(params, None)?);

    if params.only_tax_calculation() {
        return Ok(finish(tables, warnings, start));
    }

    tables.depreciation = Some(depreciation::calculate(params)?);

    let (per_month, per_year) = loan::calculate(params)?;
    tables.loan_per_month = Some(per_month);
    tables.loan_per_year = Some(per_year);

    tables.real_estate_cash = Some(real_estate_cash::calculate(params, &tables)?);
    tables.adjusted_tax = Some(tax::calculate(params, tables.real_estate_cash.as_ref())?);
    tables.price = Some(price::calculate(params)?);
    tables.sale = Some(sale::calculate(params, &tables)?);

    for building in params.buildings() {
        let sale_year = building.expected_sale_year();
        if sale_year < params.simulation_start_year() || sale_year > params.simulation_end_year() {
            warnings.push(format!(
                "building '{}' expects to sell in {sale_year}, outside the simulation \
                 horizon; its sale proceeds never enter the cash flow",
                building.name
            ));
        }
    }

    tables.cash_flow = Some(cash_flow::calculate(params, &tables)?);

    Ok(finish(tables, warnings, start))
}

fn finish(tables: PipelineTables, warnings: Vec<String>, start: Instant) -> SimulationOutput {
    SimulationOutput {
        tables,
        warnings,
        metadata: RunMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: start.elapsed().as_micros() as u64,
        },
    }
}
