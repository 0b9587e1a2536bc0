use super::config::{AugmentConfig, CodeResolutionPolicy, CodeSource, CodeStrictness};
use crate::core::ubigeo::{is_six_digit_code, is_valid_ubigeo};
use crate::core::*;

/// Administrative code resolved for one address, with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCode {
    pub code: String,
    pub source: CodeSource,
}

/// Everything the node builder needs from the invoice, as plain values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFields {
    pub origin: ResolvedCode,
    pub destination: ResolvedCode,
    pub origin_text: String,
    pub destination_text: String,
}

/// True when the invoice's operation type is the regulated one.
pub fn should_augment(invoice: &Invoice, config: &AugmentConfig) -> bool {
    invoice.operation_type == config.regulated_operation_type
}

/// Resolve both linked addresses of a regulated invoice, failing on the
/// first missing piece (origin before destination).
pub fn resolve_required_fields(
    invoice: &Invoice,
    config: &AugmentConfig,
) -> Result<ResolvedFields, PreconditionError> {
    let origin_address = linked(invoice, AddressSide::Origin, config)?;
    let destination_address = linked(invoice, AddressSide::Destination, config)?;

    let origin = resolve_code(origin_address, AddressSide::Origin, &config.code_policy)?;
    let destination = resolve_code(
        destination_address,
        AddressSide::Destination,
        &config.code_policy,
    )?;

    Ok(ResolvedFields {
        origin,
        destination,
        origin_text: origin_address.address_line().trim().to_string(),
        destination_text: destination_address.address_line().trim().to_string(),
    })
}

fn linked<'a>(
    invoice: &'a Invoice,
    side: AddressSide,
    config: &AugmentConfig,
) -> Result<&'a Address, PreconditionError> {
    let address = match side {
        AddressSide::Origin => invoice.origin_address.as_ref(),
        AddressSide::Destination => invoice.destination_address.as_ref(),
    };
    address.ok_or_else(|| PreconditionError::MissingLink {
        side,
        operation_type: config.regulated_operation_type.clone(),
    })
}

/// Walk the configured sources in order; the first accepted value wins and
/// later sources are not consulted.
pub fn resolve_code(
    address: &Address,
    side: AddressSide,
    policy: &CodeResolutionPolicy,
) -> Result<ResolvedCode, PreconditionError> {
    let mut rejected: Option<&str> = None;

    for &source in &policy.sources {
        let Some(value) = source_value(address, source) else {
            continue;
        };
        if accepts(source, value, policy.strictness) {
            return Ok(ResolvedCode {
                code: value.to_string(),
                source,
            });
        }
        if rejected.is_none() {
            rejected = Some(value);
        }
    }

    Err(match rejected {
        Some(value) => PreconditionError::InvalidCode {
            side,
            value: value.to_string(),
        },
        None => PreconditionError::MissingCode { side },
    })
}

fn source_value(address: &Address, source: CodeSource) -> Option<&str> {
    let value = match source {
        CodeSource::DistrictCode => address.district_code.as_deref(),
        CodeSource::Ubigeo => address.ubigeo.as_deref(),
        CodeSource::PostalCode => address.postal_code.as_deref(),
    }?;
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

fn accepts(source: CodeSource, value: &str, strictness: CodeStrictness) -> bool {
    match (source, strictness) {
        (_, CodeStrictness::Strict) => is_valid_ubigeo(value),
        // A postal code only stands in for a ubigeo when it has the same shape
        (CodeSource::PostalCode, CodeStrictness::Lenient) => is_six_digit_code(value),
        (_, CodeStrictness::Lenient) => true,
    }
}

/// Report every detracción precondition problem at once.
///
/// Returns an empty list for invoices whose operation type is not
/// regulated. Useful for form validation before rendering.
pub fn validate_detraccion(invoice: &Invoice, config: &AugmentConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if !should_augment(invoice, config) {
        return errors;
    }

    for side in [AddressSide::Origin, AddressSide::Destination] {
        match linked(invoice, side, config) {
            Ok(address) => {
                if let Err(e) = resolve_code(address, side, &config.code_policy) {
                    errors.push(e.into());
                }
                if address.address_line().trim().is_empty() {
                    errors.push(ValidationError::new(
                        format!("{}.street", side.field()),
                        format!("{side} address has no street, address text or name"),
                    ));
                }
            }
            Err(e) => errors.push(e.into()),
        }
    }

    if invoice.totals.is_none() {
        errors.push(ValidationError::new(
            "totals",
            "totals must be calculated before rendering a detracción invoice",
        ));
    }

    errors
}
