use super::audit::{AuditEvent, AuditTrail, Scope};
use super::blocks::{AugmentationBlock, BlockKind, BlockSet, Prefixes, kind_of};
use super::config::{AugmentConfig, ReferenceValuePlacement};
use crate::core::FacturaError;
use crate::ubl::{DocumentTree, Element};

/// Local names of the repeatable line elements of UBL invoice-like documents.
const LINE_ELEMENTS: &[&str] = &["InvoiceLine", "CreditNoteLine", "DebitNoteLine"];

/// Purge previous delivery blocks and insert `blocks` at every anchor scope
/// selected by `config.anchor_policy`.
///
/// Namespace prefixes are resolved before anything is touched, so an error
/// leaves the tree unmodified. Purging covers the header and every line
/// regardless of policy.
pub fn splice(
    tree: &mut DocumentTree,
    blocks: &BlockSet,
    config: &AugmentConfig,
    trail: &mut AuditTrail,
) -> Result<(), FacturaError> {
    let p = Prefixes::resolve(tree)?;
    let line_names: Vec<String> = LINE_ELEMENTS.iter().map(|l| p.cac(l)).collect();
    let header_boundary = qualified(&p, &config.header_boundary);
    let line_boundary = qualified(&p, &config.line_boundary);

    let origin = AugmentationBlock::from(blocks.origin.clone()).to_element(&p);
    let destination = AugmentationBlock::from(blocks.destination.clone()).to_element(&p);
    let mut reference = match config.reference_value {
        ReferenceValuePlacement::Omit => None,
        placement => blocks
            .reference_value
            .clone()
            .map(|b| (placement, AugmentationBlock::from(b).to_element(&p))),
    };

    let root = tree.root_mut();

    let removed = purge(root, &p);
    if removed > 0 {
        trail.record(AuditEvent::ScopePurged {
            scope: Scope::Header,
            removed,
        });
    }
    for (index, line) in lines_mut(root, &line_names).enumerate() {
        let removed = purge(line, &p);
        if removed > 0 {
            trail.record(AuditEvent::ScopePurged {
                scope: Scope::Line { index },
                removed,
            });
        }
    }

    if config.anchor_policy.includes_header() {
        let sequence = ordered(&origin, &destination, reference.take());
        insert(root, Scope::Header, &header_boundary, sequence, trail);
    }

    if config.anchor_policy.includes_lines() {
        let mut seen = 0;
        for (index, line) in lines_mut(root, &line_names).enumerate() {
            let sequence = ordered(&origin, &destination, reference.take());
            insert(line, Scope::Line { index }, &line_boundary, sequence, trail);
            seen += 1;
        }
        if seen == 0 {
            trail.record(AuditEvent::ScopeSkipped {
                reason: "document has no line elements".into(),
            });
        }
    }

    Ok(())
}

/// Read every augmentation block in the header and the lines, in document
/// order.
pub fn extract_blocks(
    tree: &DocumentTree,
) -> Result<Vec<(Scope, AugmentationBlock)>, FacturaError> {
    let p = Prefixes::resolve(tree)?;
    let line_names: Vec<String> = LINE_ELEMENTS.iter().map(|l| p.cac(l)).collect();
    let root = tree.root();

    let read = |scope: Scope, el: &Element| -> Vec<(Scope, AugmentationBlock)> {
        el.children()
            .iter()
            .filter_map(|c| AugmentationBlock::from_element(c, &p))
            .map(|b| (scope, b))
            .collect()
    };

    let mut found = read(Scope::Header, root);
    for (index, line) in root
        .children()
        .iter()
        .filter(|c| line_names.iter().any(|n| n == c.name()))
        .enumerate()
    {
        found.extend(read(Scope::Line { index }, line));
    }
    Ok(found)
}

fn qualified(p: &Prefixes, locals: &[String]) -> Vec<String> {
    locals.iter().map(|l| p.cac(l)).collect()
}

fn lines_mut<'a>(
    root: &'a mut Element,
    line_names: &'a [String],
) -> impl Iterator<Item = &'a mut Element> + 'a {
    root.children_mut()
        .iter_mut()
        .filter(move |c| line_names.iter().any(|n| n == c.name()))
}

fn purge(scope: &mut Element, p: &Prefixes) -> usize {
    scope.remove_children(|c| kind_of(c, p).is_some())
}

fn ordered(
    origin: &Element,
    destination: &Element,
    reference: Option<(ReferenceValuePlacement, Element)>,
) -> Vec<(BlockKind, Element)> {
    let mut sequence = vec![
        (BlockKind::Origin, origin.clone()),
        (BlockKind::Destination, destination.clone()),
    ];
    match reference {
        Some((ReferenceValuePlacement::BetweenOriginAndDestination, el)) => {
            sequence.insert(1, (BlockKind::ReferenceValue, el));
        }
        Some((_, el)) => sequence.push((BlockKind::ReferenceValue, el)),
        None => {}
    }
    sequence
}

/// Insert before the first boundary sibling, or append when there is none.
fn insert(
    scope_el: &mut Element,
    scope: Scope,
    boundary: &[String],
    sequence: Vec<(BlockKind, Element)>,
    trail: &mut AuditTrail,
) {
    let index = scope_el
        .children()
        .iter()
        .position(|c| boundary.iter().any(|b| b == c.name()))
        .unwrap_or(scope_el.children().len());

    let mut kinds = Vec::with_capacity(sequence.len());
    for (offset, (kind, el)) in sequence.into_iter().enumerate() {
        scope_el.insert_child(index + offset, el);
        kinds.push(kind);
    }
    trail.record(AuditEvent::BlocksInserted {
        scope,
        index,
        kinds,
    });
}
