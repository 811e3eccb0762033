use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use leasing_core::leaser::rate_table::Leaser;
use leasing_core::CalculatorConfig;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Calculator configuration from JSON; an empty or missing string means defaults.
fn parse_config(config_json: Option<String>) -> NapiResult<CalculatorConfig> {
    match config_json.as_deref().map(str::trim) {
        None | Some("") => Ok(CalculatorConfig::default()),
        Some(json) => CalculatorConfig::from_json_str(json).map_err(to_napi_error),
    }
}

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct CoefficientRequest {
    amount: rust_decimal::Decimal,
    #[serde(default)]
    leaser: Option<Leaser>,
}

#[napi]
pub fn find_coefficient(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let input: CoefficientRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = leasing_core::leaser::coefficient::find_coefficient_for_amount(
        input.amount,
        input.leaser.as_ref(),
        &config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn financed_amount_for_equipment(input_json: String) -> NapiResult<String> {
    let input: leasing_core::pricing::equipment::Equipment =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let financed = leasing_core::pricing::equipment::calculate_financed_amount_for_equipment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&financed).map_err(to_napi_error)
}

#[napi]
pub fn calculate_equipment_results(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let input: leasing_core::pricing::calculator::EquipmentResultsInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = leasing_core::pricing::calculator::calculate_equipment_results(
        &input.equipment,
        input.leaser.as_ref(),
        &config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn analyze_offer(input_json: String, config_json: Option<String>) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let input: leasing_core::pricing::calculator::OfferCalculationInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        leasing_core::pricing::calculator::analyze_offer(&input, &config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct ReverseRequest {
    monthly_payment: rust_decimal::Decimal,
    #[serde(default)]
    leaser: Option<Leaser>,
}

#[napi]
pub fn financed_amount_from_monthly(
    input_json: String,
    config_json: Option<String>,
) -> NapiResult<String> {
    let config = parse_config(config_json)?;
    let input: ReverseRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = leasing_core::pricing::reverse::financed_amount_from_monthly_payment(
        input.monthly_payment,
        input.leaser.as_ref(),
        &config,
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn audit_rate_table(leaser_json: String) -> NapiResult<String> {
    let leaser: Leaser = serde_json::from_str(&leaser_json).map_err(to_napi_error)?;
    let issues = leasing_core::leaser::rate_table::audit_rate_table(&leaser);
    serde_json::to_string(&issues).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Commission
// ---------------------------------------------------------------------------

#[napi]
pub fn ambassador_commission(input_json: String) -> NapiResult<String> {
    let input: leasing_core::commission::levels::CommissionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        leasing_core::commission::levels::calculate_commission(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Offers
// ---------------------------------------------------------------------------

#[napi]
pub fn transition_offer_status(input_json: String) -> NapiResult<String> {
    let input: leasing_core::offers::status::TransitionInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let mut offer = input.offer;
    let change = leasing_core::offers::status::transition_offer(
        &mut offer,
        input.to,
        &input.actor,
        input.reason,
        chrono::Utc::now(),
    )
    .map_err(to_napi_error)?;
    serde_json::to_string(&serde_json::json!({ "change": change, "offer": offer }))
        .map_err(to_napi_error)
}
