use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use leasing_core::leaser::coefficient;
use leasing_core::leaser::rate_table::{self, Leaser};
use leasing_core::pricing::calculator::{self, OfferCalculationInput};
use leasing_core::pricing::equipment::{self, Equipment};
use leasing_core::pricing::reverse;
use leasing_core::CalculatorConfig;

use crate::input;

/// Arguments for a coefficient lookup
#[derive(Args)]
pub struct CoefficientArgs {
    /// Financed amount to look up
    #[arg(long)]
    pub amount: Decimal,

    /// Path to a leaser rate table (JSON or YAML); defaults to the configured leaser
    #[arg(long)]
    pub leaser: Option<String>,
}

/// Arguments for a single line's financed amount
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct FinancedAmountArgs {
    /// Unit purchase price
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    #[arg(long, default_value = "1")]
    pub quantity: u32,

    /// Margin in percent (e.g. 15 for 15%)
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Path to an equipment line as JSON (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for full offer pricing
#[derive(Args)]
pub struct CalculateArgs {
    /// Path to JSON input file with equipment and optional leaser
    #[arg(long)]
    pub input: Option<String>,

    /// Ignore per-line monthly payment overrides
    #[arg(long)]
    pub recompute: bool,
}

/// Arguments for reverse pricing from a monthly payment
#[derive(Args)]
pub struct ReverseArgs {
    /// Target monthly payment
    #[arg(long)]
    pub monthly_payment: Decimal,

    /// Purchase price, to also report the implied margin
    #[arg(long)]
    pub purchase_price: Option<Decimal>,

    /// Path to a leaser rate table (JSON or YAML)
    #[arg(long)]
    pub leaser: Option<String>,
}

/// Arguments for a rate table audit
#[derive(Args)]
pub struct AuditLeaserArgs {
    /// Path to a leaser rate table (JSON or YAML); defaults to the configured leaser
    #[arg(long)]
    pub leaser: Option<String>,
}

fn load_leaser(path: Option<&str>) -> Result<Option<Leaser>, Box<dyn std::error::Error>> {
    path.map(input::file::read_structured::<Leaser>).transpose()
}

pub fn run_coefficient(
    args: CoefficientArgs,
    config: &CalculatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let leaser = load_leaser(args.leaser.as_deref())?;
    let lookup = coefficient::find_coefficient_for_amount(args.amount, leaser.as_ref(), config)?;
    let warnings = lookup.warnings(args.amount);
    Ok(json!({
        "result": lookup,
        "warnings": warnings,
    }))
}

pub fn run_financed_amount(args: FinancedAmountArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let line: Equipment = if let Some(ref path) = args.input {
        input::file::read_structured(path)?
    } else {
        Equipment::new(
            args.purchase_price
                .ok_or("--purchase-price is required (or provide --input)")?,
            args.quantity,
            args.margin.ok_or("--margin is required (or provide --input)")?,
        )
    };

    Ok(json!({
        "result": {
            "purchase_total": line.purchase_total()?,
            "margin_amount": line.margin_amount()?,
            "financed_amount": equipment::calculate_financed_amount_for_equipment(&line)?,
        }
    }))
}

pub fn run_calculate(
    args: CalculateArgs,
    config: &CalculatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut offer: OfferCalculationInput = input::read_input(args.input.as_deref(), "offer pricing")?;
    offer.recompute_monthly_payments |= args.recompute;
    let result = calculator::analyze_offer(&offer, config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_reverse(
    args: ReverseArgs,
    config: &CalculatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let leaser = load_leaser(args.leaser.as_deref())?;
    let financed =
        reverse::financed_amount_from_monthly_payment(args.monthly_payment, leaser.as_ref(), config)?;
    let margin = args
        .purchase_price
        .map(|p| reverse::margin_from_financed_amount(p, financed.financed_amount))
        .transpose()?;
    Ok(json!({
        "result": {
            "financed_amount": financed.financed_amount,
            "coefficient": financed.coefficient,
            "source": financed.source,
            "leaser_name": financed.leaser_name,
            "margin_amount": margin.as_ref().map(|m| m.margin_amount),
            "margin_percentage": margin.as_ref().map(|m| m.margin_percentage),
        }
    }))
}

pub fn run_audit_leaser(
    args: AuditLeaserArgs,
    config: &CalculatorConfig,
) -> Result<Value, Box<dyn std::error::Error>> {
    let leaser = load_leaser(args.leaser.as_deref())?;
    Ok(audit_report(audit_target(leaser.as_ref(), config)))
}

/// The table to audit: the loaded file as-is (an empty table is a finding,
/// not a cue to substitute), or the configured default when none was given.
fn audit_target<'a>(loaded: Option<&'a Leaser>, config: &'a CalculatorConfig) -> &'a Leaser {
    loaded.unwrap_or(&config.default_leaser)
}

fn audit_report(table: &Leaser) -> Value {
    let issues = rate_table::audit_rate_table(table);
    let descriptions: Vec<String> = issues.iter().map(ToString::to_string).collect();
    json!({
        "result": {
            "leaser": table.name,
            "ranges": table.ranges.len(),
            "clean": issues.is_empty(),
            "issues": descriptions,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_audit_reports_empty_leaser_file() {
        let path = std::env::temp_dir().join(format!("lease-calc-empty-{}.json", std::process::id()));
        fs::write(&path, r#"{"name": "Empty Lease", "ranges": []}"#).unwrap();

        let out = run_audit_leaser(
            AuditLeaserArgs {
                leaser: Some(path.to_string_lossy().into_owned()),
            },
            &CalculatorConfig::default(),
        );
        fs::remove_file(&path).unwrap();

        let out = out.unwrap();
        assert_eq!(out["result"]["leaser"], "Empty Lease");
        assert_eq!(out["result"]["ranges"], 0);
        assert_eq!(out["result"]["clean"], false);
        assert_eq!(out["result"]["issues"][0], "rate table has no ranges");
    }

    #[test]
    fn test_audit_defaults_to_configured_leaser() {
        let config = CalculatorConfig::default();
        let out = run_audit_leaser(AuditLeaserArgs { leaser: None }, &config).unwrap();
        assert_eq!(out["result"]["leaser"], config.default_leaser.name.as_str());
        assert_eq!(out["result"]["clean"], true);
    }
}
