//! Detracción delivery augmentation for SUNAT UBL 2.1 invoices.
//!
//! Freight invoices subject to the detracción withholding scheme (catalogue
//! 51 operation type `1004`) must carry the origin and destination of the
//! transport as `cac:Delivery` blocks. This module adds them to an existing
//! UBL document in three stages:
//!
//! 1. [`classify`](should_augment) decides whether the invoice is regulated
//!    and resolves both linked addresses to administrative codes.
//! 2. [`blocks`](build_origin) turns the resolved values into immutable
//!    blocks.
//! 3. [`splice()`] purges earlier blocks and inserts the new ones before the
//!    `TaxTotal` of each anchor scope.
//!
//! Running the pipeline twice on the same tree gives the same result as
//! running it once.
//!
//! # Example
//!
//! ```ignore
//! use factura_pe::detraccion::{self, AugmentConfig};
//!
//! let rendered = detraccion::to_ubl_xml(&invoice, &AugmentConfig::default())?;
//! assert!(rendered.augmented);
//! ```

mod audit;
mod blocks;
mod classify;
mod config;
mod splice;

pub use audit::{AuditEvent, AuditTrail, Scope, Stage};
pub use blocks::{
    AugmentationBlock, BlockKind, BlockSet, DEFAULT_DESPATCH_INSTRUCTIONS, DestinationBlock,
    OriginBlock, Prefixes, ReferenceValueBlock, build_destination, build_origin,
    build_reference_value, kind_of,
};
pub use classify::{
    ResolvedCode, ResolvedFields, resolve_code, resolve_required_fields, should_augment,
    validate_detraccion,
};
pub use config::{
    AnchorPolicy, AugmentConfig, CodeResolutionPolicy, CodeSource, CodeStrictness, FailureMode,
    ReferenceValuePlacement,
};
pub use splice::{extract_blocks, splice};

use crate::core::{FacturaError, Invoice, ValidationError};
use crate::ubl::{self, DocumentTree};

/// Outcome of one augmentation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AugmentReport {
    /// Whether the splice stage ran. Scopes it could not find are listed as
    /// `ScopeSkipped` in `audit`.
    pub augmented: bool,
    pub audit: AuditTrail,
}

/// Add the detracción delivery blocks to `tree` when `invoice` is regulated.
///
/// Non-regulated invoices leave the tree untouched and skip configuration
/// validation. Missing origin or destination data is always an error, and
/// nothing is mutated before it is raised. Build and XML failures follow `config.failure_mode`.
pub fn augment_document(
    invoice: &Invoice,
    tree: &mut DocumentTree,
    config: &AugmentConfig,
) -> Result<AugmentReport, FacturaError> {
    let mut audit = AuditTrail::new();
    if !should_augment(invoice, config) {
        audit.record(AuditEvent::NotRegulated);
        return Ok(AugmentReport {
            augmented: false,
            audit,
        });
    }

    config.validate()?;
    let _span = tracing::debug_span!("detraccion", number = %invoice.number).entered();

    let fields = resolve_required_fields(invoice, config)?;
    audit.record(AuditEvent::FieldsResolved {
        origin_code: fields.origin.code.clone(),
        origin_source: fields.origin.source,
        destination_code: fields.destination.code.clone(),
        destination_source: fields.destination.source,
    });

    let result = build_blocks(invoice, &fields, config, &mut audit)
        .and_then(|blocks| splice(tree, &blocks, config, &mut audit));

    match result {
        Ok(()) => Ok(AugmentReport {
            augmented: true,
            audit,
        }),
        Err(err) if config.failure_mode == FailureMode::BestEffort => {
            tracing::warn!(
                number = %invoice.number,
                error = %err,
                "detraccion augmentation failed, keeping base document"
            );
            audit.record(AuditEvent::FallbackToBase {
                error: err.to_string(),
            });
            Ok(AugmentReport {
                augmented: false,
                audit,
            })
        }
        Err(err) => Err(err),
    }
}

fn build_blocks(
    invoice: &Invoice,
    fields: &ResolvedFields,
    config: &AugmentConfig,
    audit: &mut AuditTrail,
) -> Result<BlockSet, FacturaError> {
    let origin = build_origin(
        &fields.origin.code,
        &fields.origin_text,
        &config.country_code,
        &config.despatch_instructions,
    );
    audit.record(AuditEvent::BlockBuilt {
        kind: BlockKind::Origin,
    });

    let destination = build_destination(
        &fields.destination.code,
        &fields.destination_text,
        &config.country_code,
    );
    audit.record(AuditEvent::BlockBuilt {
        kind: BlockKind::Destination,
    });

    let reference_value = match config.reference_value {
        ReferenceValuePlacement::Omit => None,
        _ => {
            let block = build_reference_value(
                invoice.total_amount(),
                &invoice.currency_code,
                &config.reference_sequence_id,
            )?;
            audit.record(AuditEvent::BlockBuilt {
                kind: BlockKind::ReferenceValue,
            });
            Some(block)
        }
    };

    Ok(BlockSet {
        origin,
        destination,
        reference_value,
    })
}

/// A fully rendered invoice.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// UTF-8 XML without declaration.
    pub xml: String,
    /// Non-fatal findings from base generation.
    pub warnings: Vec<ValidationError>,
    pub augmented: bool,
    pub audit: AuditTrail,
}

/// Generate the base UBL invoice, augment it, and serialize it.
pub fn to_ubl_xml(
    invoice: &Invoice,
    config: &AugmentConfig,
) -> Result<RenderedDocument, FacturaError> {
    let mut base = ubl::generate(invoice)?;
    let report = augment_document(invoice, &mut base.tree, config)?;
    Ok(RenderedDocument {
        xml: base.tree.to_xml()?,
        warnings: base.warnings,
        augmented: report.augmented,
        audit: report.audit,
    })
}
