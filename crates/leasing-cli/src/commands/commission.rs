use clap::Args;
use serde_json::Value;

use leasing_core::commission::levels::{self, CommissionInput};

use crate::input;

/// Arguments for ambassador commission
#[derive(Args)]
pub struct CommissionArgs {
    /// Path to JSON input file with financed amount and commission level
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_commission(args: CommissionArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let commission_input: CommissionInput =
        input::read_input(args.input.as_deref(), "commission calculation")?;
    let result = levels::calculate_commission(&commission_input)?;
    Ok(serde_json::to_value(result)?)
}
