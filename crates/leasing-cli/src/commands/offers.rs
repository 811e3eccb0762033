use chrono::Utc;
use clap::Args;
use serde_json::{json, Value};

use leasing_core::offers::status::{self, TransitionInput};

use crate::input;

/// Arguments for an offer status change
#[derive(Args)]
pub struct OfferStatusArgs {
    /// Path to JSON input file with the offer, target status and actor
    #[arg(long)]
    pub input: Option<String>,
}

/// Apply the transition and return the updated offer with the new audit entry.
pub fn run_offer_status(args: OfferStatusArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let TransitionInput {
        mut offer,
        to,
        actor,
        reason,
    } = input::read_input(args.input.as_deref(), "offer status change")?;

    let change = status::transition_offer(&mut offer, to, &actor, reason, Utc::now())?;
    Ok(json!({
        "result": {
            "change": change,
            "offer": offer,
        }
    }))
}
