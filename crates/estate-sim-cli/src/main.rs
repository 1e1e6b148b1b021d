mod input;
mod output;

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use chrono::Local;
use clap::Parser;
use colored::Colorize;

use estate_sim_core::pipeline;
use estate_sim_core::reader;

/// Project the multi-year cash flow of leveraged real-estate purchases
#[derive(Parser)]
#[command(
    name = "resim",
    version,
    about = "Project the multi-year cash flow of leveraged real-estate purchases",
    long_about = "Runs the full simulation pipeline (loan amortization, depreciation, \
                  real-estate cash, personal taxation, price decay and sale economics) \
                  over the parameter file and writes one CSV per result table into a \
                  dated output folder."
)]
struct Cli {
    /// Path to the parameter file (YAML or JSON)
    param_file: String,

    /// Directory under which the dated result folder is created
    #[arg(long, default_value = "simulation_result")]
    output_dir: String,
}

fn main() {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(folder) => {
            println!("results written to {}", folder.display());
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let doc = input::file::read_document(&cli.param_file)?;
    let params = reader::build_store(doc)?;
    let output = pipeline::run(&params)?;

    for warning in &output.warnings {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }

    let folder = Path::new(&cli.output_dir).join(Local::now().format("%y%m%d%H%M%S").to_string());
    fs::create_dir_all(&folder)?;
    for (name, value) in output.tables.named_values()? {
        output::csv_out::write_csv(&folder.join(format!("{name}.csv")), &value)?;
    }

    if let Some(cash_flow) = &output.tables.cash_flow {
        output::table::print_cash_flow(cash_flow);
    }

    Ok(folder)
}
