use estate_sim_core::tables::CashFlowTable;
use tabled::{Table, builder::Builder};

/// Print the yearly cash-flow summary as a table.
pub fn print_cash_flow(table: &CashFlowTable) {
    let mut builder = Builder::default();
    builder.push_record([
        "year",
        "real_cash",
        "tax_delta",
        "sale_profit",
        "net_delta",
        "cumulative_delta",
    ]);

    for row in table.rows() {
        builder.push_record([
            row.year.to_string(),
            row.real_cash.to_string(),
            row.tax_delta.to_string(),
            row.sale_profit.to_string(),
            row.net_delta.to_string(),
            row.cumulative_delta.to_string(),
        ]);
    }

    let rendered = Table::from(builder);
    println!("{}", rendered);
}
