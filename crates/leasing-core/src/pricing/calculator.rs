//! Offer pricing: per-item margins versus a single global coefficient.
//!
//! A salesperson sets a margin on each equipment line. Financing each line
//! at its own bracket gives the "normal" monthly payment. The leaser,
//! however, prices the whole offer with the one coefficient selected by the
//! aggregate financed amount, which gives the "adjusted" figures. The margin
//! difference between the two tells the salesperson how much the global
//! coefficient costs (positive) or earns (negative) on this offer.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::config::CalculatorConfig;
use crate::error::LeasingError;
use crate::leaser::coefficient::{
    find_coefficient_for_amount, resolve_leaser, CoefficientLookup, CoefficientSource,
};
use crate::leaser::rate_table::{audit_rate_table, Leaser};
use crate::pricing::equipment::{
    calculate_financed_amount_for_equipment, monthly_payment_from_coefficient, Equipment,
};
use crate::types::{
    checked_add, checked_div, checked_mul, checked_sub, checked_sum, percentage_or_zero,
    with_metadata, ComputationOutput, Money, Percent,
};
use crate::LeasingResult;

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

/// Aggregate pricing of an offer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationResult {
    pub total_purchase_price: Money,
    /// Sum of each line's own margin
    pub normal_margin_amount: Money,
    pub normal_margin_percentage: Percent,
    /// Sum of per-line monthly payments, each at its own bracket
    pub normal_monthly_payment: Money,
    /// Margin implied by the global coefficient
    pub adjusted_margin_amount: Money,
    pub adjusted_margin_percentage: Percent,
    /// Whole offer financed at the global coefficient
    pub adjusted_monthly_payment: Money,
    /// `normal_margin_amount - adjusted_margin_amount`
    pub margin_difference: Money,
    pub global_coefficient: Percent,
    /// Purchase price plus per-line margins
    pub total_financed_amount: Money,
    /// Financed amount that the adjusted payment amortizes at the global coefficient
    pub required_financed_amount_for_global_coef: Money,
}

/// Offer as submitted by the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferCalculationInput {
    pub equipment: Vec<Equipment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaser: Option<Leaser>,
    /// Ignore per-line monthly overrides and price every line from the table
    #[serde(default)]
    pub recompute_monthly_payments: bool,
}

/// Equipment and leaser for [`calculate_equipment_results`]. Unlike
/// [`OfferCalculationInput`] it has no recompute flag, since the plain
/// calculation always honours overrides; unknown fields are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EquipmentResultsInput {
    pub equipment: Vec<Equipment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaser: Option<Leaser>,
}

/// Pricing of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItemBreakdown {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub purchase_total: Money,
    pub margin_amount: Money,
    pub financed_amount: Money,
    /// Coefficient used for this line; `None` when an override was applied
    pub coefficient: Option<Percent>,
    pub monthly_payment: Money,
    pub used_monthly_override: bool,
}

/// Full offer analysis: totals, per-line detail and the global lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferAnalysis {
    #[serde(flatten)]
    pub totals: CalculationResult,
    pub global_coefficient_source: CoefficientSource,
    pub leaser_name: String,
    pub line_items: Vec<LineItemBreakdown>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Price an offer's equipment against a leaser's rate table.
///
/// Per-line monthly overrides are honoured. A missing or empty leaser is
/// replaced by the configured default. Fails with
/// [`LeasingError::ZeroCoefficient`] when the global coefficient is zero,
/// since the inverse step would divide by it.
pub fn calculate_equipment_results(
    equipment: &[Equipment],
    leaser: Option<&Leaser>,
    config: &CalculatorConfig,
) -> LeasingResult<CalculationResult> {
    price_offer(equipment, leaser, config, false).map(|priced| priced.totals)
}

/// Price an offer and wrap the result with per-line detail, warnings and
/// computation metadata.
pub fn analyze_offer(
    input: &OfferCalculationInput,
    config: &CalculatorConfig,
) -> LeasingResult<ComputationOutput<OfferAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    // -- Input checks ---------------------------------------------------------
    if input.equipment.is_empty() {
        warnings.push("Offer has no equipment; all figures are zero.".into());
    }
    for (i, e) in input.equipment.iter().enumerate() {
        let label = e.title.as_deref().unwrap_or("untitled");
        if e.quantity == 0 {
            warnings.push(format!("Line {} ({label}) has zero quantity.", i + 1));
        }
        if e.purchase_price.is_sign_negative() {
            warnings.push(format!("Line {} ({label}) has a negative purchase price.", i + 1));
        }
        if e.margin.is_sign_negative() {
            warnings.push(format!("Line {} ({label}) has a negative margin.", i + 1));
        }
    }

    // The supplied table is audited even when empty; the default is audited
    // only when it stands in.
    let (table, used_default) = resolve_leaser(input.leaser.as_ref(), config);
    for audited in input.leaser.iter().chain(used_default.then_some(table)) {
        for issue in audit_rate_table(audited) {
            warnings.push(format!("Rate table '{}': {issue}.", audited.name));
        }
    }

    // -- Pricing --------------------------------------------------------------
    let priced = price_offer(
        &input.equipment,
        input.leaser.as_ref(),
        config,
        input.recompute_monthly_payments,
    )?;

    for (i, lookup) in priced.line_lookups.iter().enumerate() {
        if let Some(lookup) = lookup {
            if lookup.is_fallback() {
                warnings.push(format!(
                    "Line {} financed amount {} is outside every range; used first-range coefficient {}.",
                    i + 1,
                    priced.lines[i].financed_amount,
                    lookup.coefficient
                ));
            }
        }
    }
    warnings.extend(
        priced
            .global_lookup
            .warnings(priced.totals.total_financed_amount),
    );
    if priced.totals.adjusted_margin_amount.is_sign_negative() {
        warnings.push(
            "Global coefficient implies a financed amount below the purchase price.".into(),
        );
    }

    let analysis = OfferAnalysis {
        totals: priced.totals,
        global_coefficient_source: priced.global_lookup.source,
        leaser_name: priced.global_lookup.leaser_name.clone(),
        line_items: priced.lines,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "range_policy": config.range_policy,
        "default_leaser": config.default_leaser.name,
        "recompute_monthly_payments": input.recompute_monthly_payments,
        "monthly_payment": "financed_amount * coefficient / 100",
    });

    Ok(with_metadata(
        "Leasing coefficient pricing: per-line margins vs global coefficient",
        &assumptions,
        warnings,
        elapsed,
        analysis,
    ))
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

struct PricedOffer {
    totals: CalculationResult,
    lines: Vec<LineItemBreakdown>,
    /// Per-line lookups; `None` for lines priced from an override
    line_lookups: Vec<Option<CoefficientLookup>>,
    global_lookup: CoefficientLookup,
}

fn price_offer(
    equipment: &[Equipment],
    leaser: Option<&Leaser>,
    config: &CalculatorConfig,
    recompute_monthly_payments: bool,
) -> LeasingResult<PricedOffer> {
    let total_purchase_price =
        checked_sum(equipment.iter().map(Equipment::purchase_total), "total purchase price")?;
    let normal_margin_amount =
        checked_sum(equipment.iter().map(Equipment::margin_amount), "normal margin amount")?;
    let normal_margin_percentage = percentage_or_zero(
        normal_margin_amount,
        total_purchase_price,
        "normal margin percentage",
    )?;
    let total_financed_amount = checked_add(
        total_purchase_price,
        normal_margin_amount,
        "total financed amount",
    )?;

    // Each line sits in its own bracket here; no global coefficient yet.
    let mut lines = Vec::with_capacity(equipment.len());
    let mut line_lookups = Vec::with_capacity(equipment.len());
    let mut normal_monthly_payment = Decimal::ZERO;
    for e in equipment {
        let financed_amount = calculate_financed_amount_for_equipment(e)?;
        let (monthly_payment, lookup) = match e.monthly_payment {
            Some(unit_monthly) if !recompute_monthly_payments => (
                checked_mul(
                    unit_monthly,
                    Decimal::from(e.quantity),
                    "monthly override * quantity",
                )?,
                None,
            ),
            _ => {
                let lookup = find_coefficient_for_amount(financed_amount, leaser, config)?;
                let monthly = monthly_payment_from_coefficient(financed_amount, lookup.coefficient)?;
                (monthly, Some(lookup))
            }
        };
        normal_monthly_payment = checked_add(
            normal_monthly_payment,
            monthly_payment,
            "normal monthly payment",
        )?;
        lines.push(LineItemBreakdown {
            title: e.title.clone(),
            purchase_total: e.purchase_total()?,
            margin_amount: e.margin_amount()?,
            financed_amount,
            coefficient: lookup.as_ref().map(|l| l.coefficient),
            monthly_payment,
            used_monthly_override: lookup.is_none(),
        });
        line_lookups.push(lookup);
    }

    let global_lookup = find_coefficient_for_amount(total_financed_amount, leaser, config)?;
    let global_coefficient = global_lookup.coefficient;
    if global_coefficient.is_zero() {
        return Err(LeasingError::ZeroCoefficient {
            context: format!(
                "global coefficient of '{}' for financed amount {}",
                global_lookup.leaser_name, total_financed_amount
            ),
        });
    }
    let adjusted_monthly_payment =
        monthly_payment_from_coefficient(total_financed_amount, global_coefficient)?;

    let required_financed_amount_for_global_coef = checked_div(
        checked_mul(
            adjusted_monthly_payment,
            Decimal::ONE_HUNDRED,
            "adjusted monthly payment * 100",
        )?,
        global_coefficient,
        "required financed amount",
    )?;

    let adjusted_margin_amount = checked_sub(
        required_financed_amount_for_global_coef,
        total_purchase_price,
        "adjusted margin amount",
    )?;
    let adjusted_margin_percentage = percentage_or_zero(
        adjusted_margin_amount,
        total_purchase_price,
        "adjusted margin percentage",
    )?;
    let margin_difference = checked_sub(
        normal_margin_amount,
        adjusted_margin_amount,
        "margin difference",
    )?;

    debug!(
        lines = equipment.len(),
        %total_financed_amount,
        %global_coefficient,
        %margin_difference,
        "offer priced"
    );

    Ok(PricedOffer {
        totals: CalculationResult {
            total_purchase_price,
            normal_margin_amount,
            normal_margin_percentage,
            normal_monthly_payment,
            adjusted_margin_amount,
            adjusted_margin_percentage,
            adjusted_monthly_payment,
            margin_difference,
            global_coefficient,
            total_financed_amount,
            required_financed_amount_for_global_coef,
        },
        lines,
        line_lookups,
        global_lookup,
    })
}
