pub mod coefficient;
pub mod rate_table;
