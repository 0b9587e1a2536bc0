use serde::{Deserialize, Serialize};

use crate::core::{FacturaError, OPERATION_DETRACCION_TRANSPORT};

/// Which document regions receive the delivery blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorPolicy {
    /// Only the invoice header.
    Header,
    /// Every invoice line.
    #[default]
    Lines,
    /// The header and every invoice line.
    HeaderAndLines,
}

impl AnchorPolicy {
    pub fn includes_header(self) -> bool {
        matches!(self, AnchorPolicy::Header | AnchorPolicy::HeaderAndLines)
    }

    pub fn includes_lines(self) -> bool {
        matches!(self, AnchorPolicy::Lines | AnchorPolicy::HeaderAndLines)
    }
}

/// A place on an address where an administrative code may be recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeSource {
    /// Code of the linked district record.
    DistrictCode,
    /// Free ubigeo field.
    Ubigeo,
    /// Postal code, used only when it is exactly six digits.
    PostalCode,
}

/// How strictly a district/ubigeo value is checked before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CodeStrictness {
    /// Only well-formed INEI ubigeos.
    #[default]
    Strict,
    /// Any non-blank value.
    Lenient,
}

/// Ordered code sources plus validation strictness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeResolutionPolicy {
    pub sources: Vec<CodeSource>,
    pub strictness: CodeStrictness,
}

impl Default for CodeResolutionPolicy {
    fn default() -> Self {
        Self {
            sources: vec![
                CodeSource::DistrictCode,
                CodeSource::Ubigeo,
                CodeSource::PostalCode,
            ],
            strictness: CodeStrictness::Strict,
        }
    }
}

/// Whether and where the reference-value (`DeliveryTerms`) block goes.
///
/// The block is emitted at most once per document, in the first anchor
/// scope in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceValuePlacement {
    #[default]
    Omit,
    BetweenOriginAndDestination,
    AfterDestination,
}

/// What to do when building or splicing fails for a reason other than a
/// missing-data precondition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Propagate the error and abort document generation.
    #[default]
    Strict,
    /// Log, record an audit event, and keep the unmodified base document.
    BestEffort,
}

/// Configuration of the detracción delivery augmentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Catalogue 51 operation type that triggers augmentation.
    pub regulated_operation_type: String,
    /// Country code written in every address block.
    pub country_code: String,
    pub anchor_policy: AnchorPolicy,
    pub code_policy: CodeResolutionPolicy,
    pub reference_value: ReferenceValuePlacement,
    /// `cbc:ID` of the `DeliveryTerms` block (catalogue 55, "01" = reference value).
    pub reference_sequence_id: String,
    /// `cbc:Instructions` label of the despatch (origin) block.
    pub despatch_instructions: String,
    pub failure_mode: FailureMode,
    /// CAC local names that must follow the delivery blocks in the header.
    pub header_boundary: Vec<String>,
    /// CAC local names that must follow the delivery blocks in a line.
    pub line_boundary: Vec<String>,
}

/// UBL 2.1 Invoice, CreditNote and DebitNote children allowed after
/// `cac:Delivery`.
const HEADER_BOUNDARY: &[&str] = &[
    "DeliveryTerms",
    "PaymentMeans",
    "PaymentTerms",
    "PrepaidPayment",
    "AllowanceCharge",
    "TaxExchangeRate",
    "PricingExchangeRate",
    "PaymentExchangeRate",
    "PaymentAlternativeExchangeRate",
    "TaxTotal",
    "WithholdingTaxTotal",
    "LegalMonetaryTotal",
    "RequestedMonetaryTotal",
    "InvoiceLine",
    "CreditNoteLine",
    "DebitNoteLine",
];

/// UBL 2.1 InvoiceLine children allowed after `cac:Delivery`.
const LINE_BOUNDARY: &[&str] = &[
    "PaymentTerms",
    "AllowanceCharge",
    "TaxTotal",
    "WithholdingTaxTotal",
    "Item",
    "Price",
    "DeliveryTerms",
    "SubInvoiceLine",
    "ItemPriceExtension",
];

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            regulated_operation_type: OPERATION_DETRACCION_TRANSPORT.to_string(),
            country_code: "PE".to_string(),
            anchor_policy: AnchorPolicy::default(),
            code_policy: CodeResolutionPolicy::default(),
            reference_value: ReferenceValuePlacement::default(),
            reference_sequence_id: "01".to_string(),
            despatch_instructions: "Punto de Origen".to_string(),
            failure_mode: FailureMode::default(),
            header_boundary: HEADER_BOUNDARY.iter().map(|s| s.to_string()).collect(),
            line_boundary: LINE_BOUNDARY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl AugmentConfig {
    /// Load from JSON; omitted fields take their defaults. The result is
    /// validated.
    pub fn from_json(json: &str) -> Result<Self, FacturaError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| FacturaError::Config(format!("invalid configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_regulated_operation_type(mut self, code: impl Into<String>) -> Self {
        self.regulated_operation_type = code.into();
        self
    }

    pub fn with_anchor_policy(mut self, policy: AnchorPolicy) -> Self {
        self.anchor_policy = policy;
        self
    }

    pub fn with_code_sources(mut self, sources: Vec<CodeSource>) -> Self {
        self.code_policy.sources = sources;
        self
    }

    pub fn with_strictness(mut self, strictness: CodeStrictness) -> Self {
        self.code_policy.strictness = strictness;
        self
    }

    pub fn with_reference_value(mut self, placement: ReferenceValuePlacement) -> Self {
        self.reference_value = placement;
        self
    }

    pub fn with_failure_mode(mut self, mode: FailureMode) -> Self {
        self.failure_mode = mode;
        self
    }

    /// Reject configurations that could only produce invalid documents.
    pub fn validate(&self) -> Result<(), FacturaError> {
        if self.regulated_operation_type.trim().is_empty() {
            return Err(FacturaError::Config(
                "regulated_operation_type must not be empty".into(),
            ));
        }
        if self.country_code.len() != 2
            || !self.country_code.bytes().all(|b| b.is_ascii_uppercase())
        {
            return Err(FacturaError::Config(format!(
                "country_code {:?} must be two uppercase letters",
                self.country_code
            )));
        }
        if self.code_policy.sources.is_empty() {
            return Err(FacturaError::Config(
                "code_policy.sources must list at least one source".into(),
            ));
        }
        for (field, value) in [
            ("reference_sequence_id", &self.reference_sequence_id),
            ("despatch_instructions", &self.despatch_instructions),
        ] {
            if value.trim().is_empty() {
                return Err(FacturaError::Config(format!("{field} must not be empty")));
            }
            if value.trim() != value.as_str() {
                return Err(FacturaError::Config(format!(
                    "{field} {value:?} must not start or end with whitespace"
                )));
            }
        }
        if self.header_boundary.is_empty() || self.line_boundary.is_empty() {
            return Err(FacturaError::Config(
                "boundary lists must not be empty".into(),
            ));
        }
        Ok(())
    }
}
