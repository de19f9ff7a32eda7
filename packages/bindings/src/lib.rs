use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fincalc_core::auto_lease::comparison::{self, LeaseVsBuyInput};
use fincalc_core::mortgage::affordability::{self, AffordabilityInput};
use fincalc_core::mortgage::amortization::{self, AmortizationInput};
use fincalc_core::rates::{rates_or_fallback, StaticRates};
use fincalc_core::sanitize::from_json;
use fincalc_core::savings::compounding::{self, CompoundingInput};
use fincalc_core::wealth::retirement::{self, RetirementInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    from_json(input_json).map_err(to_napi_error)
}

fn render<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn amortize(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = parse(&input_json)?;
    render(&amortization::amortize(&input))
}

/// Like `amortize`, but a schedule stopped by the iteration cap is an error.
#[napi]
pub fn amortize_strict(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = parse(&input_json)?;
    let output = amortization::amortize(&input);
    output.result.require_converged().map_err(to_napi_error)?;
    render(&output)
}

#[napi]
pub fn amortization_yearly_summary(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = parse(&input_json)?;
    let output = amortization::amortize(&input).result;
    render(&amortization::yearly_summary(
        &output.schedule,
        output.periods_per_year,
    ))
}

#[napi]
pub fn compare_payoff(input_json: String) -> NapiResult<String> {
    let input: AmortizationInput = parse(&input_json)?;
    render(&amortization::compare_payoff(&input))
}

#[napi]
pub fn home_affordability(input_json: String) -> NapiResult<String> {
    let input: AffordabilityInput = parse(&input_json)?;
    render(&affordability::analyze_affordability(&input))
}

#[napi]
pub fn mortgage_rates(state: String) -> NapiResult<String> {
    render(&rates_or_fallback(&StaticRates, &state))
}

// ---------------------------------------------------------------------------
// Auto lease
// ---------------------------------------------------------------------------

#[napi]
pub fn lease_vs_buy(input_json: String) -> NapiResult<String> {
    let input: LeaseVsBuyInput = parse(&input_json)?;
    render(&comparison::compare_lease_vs_buy(&input))
}

// ---------------------------------------------------------------------------
// Savings and retirement
// ---------------------------------------------------------------------------

#[napi]
pub fn compound_interest(input_json: String) -> NapiResult<String> {
    let input: CompoundingInput = parse(&input_json)?;
    render(&compounding::project_compounding(&input))
}

#[napi]
pub fn retirement_projection(input_json: String) -> NapiResult<String> {
    let input: RetirementInput = parse(&input_json)?;
    render(&retirement::project_retirement(&input))
}
