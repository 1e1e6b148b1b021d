pub mod csv_out;
pub mod table;
