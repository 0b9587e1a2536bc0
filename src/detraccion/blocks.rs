//! Delivery blocks for detracción freight invoices.
//!
//! Builders are pure: they take resolved primitives and return immutable
//! values that know nothing about the invoice or the tree they end up in.
//! Each block renders as one `cac:Delivery` element:
//!
//! ```text
//! origin       cac:Delivery/cac:Despatch/{cbc:Instructions, cac:DespatchAddress}
//! destination  cac:Delivery/cac:DeliveryLocation/cac:Address
//! reference    cac:Delivery/cac:DeliveryTerms/{cbc:ID, cbc:Amount}
//! ```

use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use crate::core::currencies::is_currency_code_shape;
use crate::core::{FacturaError, round_amount};
use crate::ubl::{DocumentTree, Element, format_amount, qualify, ubl_ns};

/// Label written in `cbc:Instructions` of the despatch block.
pub const DEFAULT_DESPATCH_INSTRUCTIONS: &str = "Punto de Origen";

/// INEI agency attributes carried by every ubigeo `cbc:ID`.
const UBIGEO_SCHEME_AGENCY: &str = "PE:INEI";
const UBIGEO_SCHEME_NAME: &str = "Ubigeos";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Origin,
    Destination,
    ReferenceValue,
}

/// Where the freight is picked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginBlock {
    pub instructions: String,
    pub code: String,
    pub address_line: String,
    pub country_code: String,
}

/// Where the freight is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationBlock {
    pub code: String,
    pub address_line: String,
    pub country_code: String,
}

/// Reference value of the transport service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceValueBlock {
    pub sequence_id: String,
    pub amount: Decimal,
    pub currency_code: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AugmentationBlock {
    Origin(OriginBlock),
    Destination(DestinationBlock),
    ReferenceValue(ReferenceValueBlock),
}

impl From<OriginBlock> for AugmentationBlock {
    fn from(block: OriginBlock) -> Self {
        AugmentationBlock::Origin(block)
    }
}

impl From<DestinationBlock> for AugmentationBlock {
    fn from(block: DestinationBlock) -> Self {
        AugmentationBlock::Destination(block)
    }
}

impl From<ReferenceValueBlock> for AugmentationBlock {
    fn from(block: ReferenceValueBlock) -> Self {
        AugmentationBlock::ReferenceValue(block)
    }
}

pub fn build_origin(
    code: &str,
    address_line: &str,
    country_code: &str,
    instructions: &str,
) -> OriginBlock {
    OriginBlock {
        instructions: instructions.to_string(),
        code: code.to_string(),
        address_line: address_line.to_string(),
        country_code: country_code.to_string(),
    }
}

pub fn build_destination(code: &str, address_line: &str, country_code: &str) -> DestinationBlock {
    DestinationBlock {
        code: code.to_string(),
        address_line: address_line.to_string(),
        country_code: country_code.to_string(),
    }
}

/// Build the reference-value block. The amount is kept at two decimals.
pub fn build_reference_value(
    amount: Decimal,
    currency_code: &str,
    sequence_id: &str,
) -> Result<ReferenceValueBlock, FacturaError> {
    if amount < Decimal::ZERO {
        return Err(FacturaError::Build(format!(
            "reference value must not be negative, got {amount}"
        )));
    }
    if !is_currency_code_shape(currency_code) {
        return Err(FacturaError::Build(format!(
            "reference value currency {currency_code:?} is not an ISO 4217 code"
        )));
    }
    if sequence_id.trim().is_empty() {
        return Err(FacturaError::Build(
            "reference value sequence id must not be empty".into(),
        ));
    }
    Ok(ReferenceValueBlock {
        sequence_id: sequence_id.to_string(),
        amount: round_amount(amount),
        currency_code: currency_code.to_string(),
    })
}

/// The blocks one augmentation call inserts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockSet {
    pub origin: OriginBlock,
    pub destination: DestinationBlock,
    pub reference_value: Option<ReferenceValueBlock>,
}

/// Prefixes bound to the UBL aggregate and basic component namespaces in a
/// particular document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefixes {
    pub cac: String,
    pub cbc: String,
}

impl Default for Prefixes {
    fn default() -> Self {
        Self {
            cac: "cac".to_string(),
            cbc: "cbc".to_string(),
        }
    }
}

impl Prefixes {
    /// Look up the prefixes declared on the document root.
    pub fn resolve(tree: &DocumentTree) -> Result<Self, FacturaError> {
        let lookup = |ns: &str, label: &str| {
            tree.prefix_for(ns).map(str::to_string).ok_or_else(|| {
                FacturaError::Xml(format!(
                    "{label} namespace {ns} is not declared on <{}>",
                    tree.root().name()
                ))
            })
        };
        Ok(Self {
            cac: lookup(ubl_ns::CAC, "UBL aggregate components")?,
            cbc: lookup(ubl_ns::CBC, "UBL basic components")?,
        })
    }

    pub fn cac(&self, local: &str) -> String {
        qualify(&self.cac, local)
    }

    pub fn cbc(&self, local: &str) -> String {
        qualify(&self.cbc, local)
    }
}

impl AugmentationBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            AugmentationBlock::Origin(_) => BlockKind::Origin,
            AugmentationBlock::Destination(_) => BlockKind::Destination,
            AugmentationBlock::ReferenceValue(_) => BlockKind::ReferenceValue,
        }
    }

    /// Render as a `cac:Delivery` element.
    pub fn to_element(&self, p: &Prefixes) -> Element {
        let inner = match self {
            AugmentationBlock::Origin(b) => Element::new(p.cac("Despatch"))
                .with_child(Element::new(p.cbc("Instructions")).with_text(b.instructions.as_str()))
                .with_child(address(
                    p,
                    "DespatchAddress",
                    &b.code,
                    &b.address_line,
                    &b.country_code,
                )),
            AugmentationBlock::Destination(b) => Element::new(p.cac("DeliveryLocation"))
                .with_child(address(
                    p,
                    "Address",
                    &b.code,
                    &b.address_line,
                    &b.country_code,
                )),
            AugmentationBlock::ReferenceValue(b) => Element::new(p.cac("DeliveryTerms"))
                .with_child(Element::new(p.cbc("ID")).with_text(b.sequence_id.as_str()))
                .with_child(
                    Element::new(p.cbc("Amount"))
                        .with_attr("currencyID", b.currency_code.as_str())
                        .with_text(format_amount(b.amount)),
                ),
        };
        Element::new(p.cac("Delivery")).with_child(inner)
    }

    /// Read a rendered block back. Returns `None` for `cac:Delivery`
    /// elements that are not augmentation blocks.
    pub fn from_element(element: &Element, p: &Prefixes) -> Option<Self> {
        match kind_of(element, p)? {
            BlockKind::Origin => {
                let despatch = element.child(&p.cac("Despatch"))?;
                let (code, address_line, country_code) =
                    read_address(despatch.child(&p.cac("DespatchAddress"))?, p);
                Some(AugmentationBlock::Origin(OriginBlock {
                    instructions: despatch
                        .text_at(&[p.cbc("Instructions").as_str()])
                        .unwrap_or_default()
                        .to_string(),
                    code,
                    address_line,
                    country_code,
                }))
            }
            BlockKind::Destination => {
                let location = element.child(&p.cac("DeliveryLocation"))?;
                let (code, address_line, country_code) =
                    read_address(location.child(&p.cac("Address"))?, p);
                Some(AugmentationBlock::Destination(DestinationBlock {
                    code,
                    address_line,
                    country_code,
                }))
            }
            BlockKind::ReferenceValue => {
                let terms = element.child(&p.cac("DeliveryTerms"))?;
                let amount = terms.child(&p.cbc("Amount"))?;
                Some(AugmentationBlock::ReferenceValue(ReferenceValueBlock {
                    sequence_id: terms.text_at(&[p.cbc("ID").as_str()])?.to_string(),
                    amount: Decimal::from_str(amount.text()?).ok()?,
                    currency_code: amount.attr("currencyID")?.to_string(),
                }))
            }
        }
    }
}

/// Classify a child element as an augmentation block by its marker child.
pub fn kind_of(element: &Element, p: &Prefixes) -> Option<BlockKind> {
    if element.name() != p.cac("Delivery") {
        return None;
    }
    let has = |local: &str| element.child(&p.cac(local)).is_some();
    if has("Despatch") {
        Some(BlockKind::Origin)
    } else if has("DeliveryLocation") {
        Some(BlockKind::Destination)
    } else if has("DeliveryTerms") {
        Some(BlockKind::ReferenceValue)
    } else {
        None
    }
}

fn address(p: &Prefixes, wrapper: &str, code: &str, line: &str, country: &str) -> Element {
    Element::new(p.cac(wrapper))
        .with_child(
            Element::new(p.cbc("ID"))
                .with_attr("schemeAgencyName", UBIGEO_SCHEME_AGENCY)
                .with_attr("schemeName", UBIGEO_SCHEME_NAME)
                .with_text(code),
        )
        .with_child(
            Element::new(p.cac("AddressLine"))
                .with_child(Element::new(p.cbc("Line")).with_text(line)),
        )
        .with_child(
            Element::new(p.cac("Country"))
                .with_child(Element::new(p.cbc("IdentificationCode")).with_text(country)),
        )
}

fn read_address(address: &Element, p: &Prefixes) -> (String, String, String) {
    let text = |path: &[&str]| address.text_at(path).unwrap_or_default().to_string();
    let (id, line_wrapper, line) = (p.cbc("ID"), p.cac("AddressLine"), p.cbc("Line"));
    let (country, country_code) = (p.cac("Country"), p.cbc("IdentificationCode"));
    (
        text(&[id.as_str()]),
        text(&[line_wrapper.as_str(), line.as_str()]),
        text(&[country.as_str(), country_code.as_str()]),
    )
}
