//! Structured audit events recorded by each pipeline stage.
//!
//! Events are plain data: the pipeline never branches on them. Hosts can
//! query them, serialize them, or ignore them.

use serde::Serialize;

use super::blocks::BlockKind;
use super::config::CodeSource;
use crate::core::FacturaError;

/// Pipeline stage that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Classify,
    Build,
    Splice,
    Pipeline,
}

/// Document region an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Scope {
    Header,
    /// Zero-based position among the document's line elements.
    Line { index: usize },
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Scope::Header => f.write_str("header"),
            Scope::Line { index } => write!(f, "line[{index}]"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AuditEvent {
    /// Operation type is not regulated; the document was left untouched.
    NotRegulated,
    /// Both administrative codes were resolved.
    FieldsResolved {
        origin_code: String,
        origin_source: CodeSource,
        destination_code: String,
        destination_source: CodeSource,
    },
    BlockBuilt { kind: BlockKind },
    /// Previous augmentation blocks removed from a scope.
    ScopePurged { scope: Scope, removed: usize },
    BlocksInserted {
        scope: Scope,
        index: usize,
        kinds: Vec<BlockKind>,
    },
    /// A scope requested by the anchor policy does not exist.
    ScopeSkipped { reason: String },
    /// Best-effort mode kept the base document after an error.
    FallbackToBase { error: String },
}

impl AuditEvent {
    pub fn stage(&self) -> Stage {
        match self {
            AuditEvent::NotRegulated | AuditEvent::FieldsResolved { .. } => Stage::Classify,
            AuditEvent::BlockBuilt { .. } => Stage::Build,
            AuditEvent::ScopePurged { .. }
            | AuditEvent::BlocksInserted { .. }
            | AuditEvent::ScopeSkipped { .. } => Stage::Splice,
            AuditEvent::FallbackToBase { .. } => Stage::Pipeline,
        }
    }
}

/// Ordered list of audit events from one augmentation call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AuditTrail {
    events: Vec<AuditEvent>,
}

impl AuditTrail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: AuditEvent) {
        tracing::debug!(stage = ?event.stage(), event = ?event, "detraccion audit");
        self.events.push(event);
    }

    pub fn iter(&self) -> impl Iterator<Item = &AuditEvent> {
        self.events.iter()
    }

    pub fn of_stage(&self, stage: Stage) -> impl Iterator<Item = &AuditEvent> {
        self.events.iter().filter(move |e| e.stage() == stage)
    }

    /// Number of events matching `pred`.
    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&AuditEvent) -> bool,
    {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// One JSON object per line.
    pub fn to_json_lines(&self) -> Result<String, FacturaError> {
        let mut out = String::new();
        for event in &self.events {
            let line = serde_json::to_string(event)
                .map_err(|e| FacturaError::Build(format!("audit serialization failed: {e}")))?;
            out.push_str(&line);
            out.push('\n');
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_tags() {
        let mut trail = AuditTrail::new();
        trail.record(AuditEvent::NotRegulated);
        trail.record(AuditEvent::ScopePurged {
            scope: Scope::Line { index: 2 },
            removed: 3,
        });
        let json = trail.to_json_lines().unwrap();
        let lines: Vec<&str> = json.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            r#"{"event":"not_regulated"}"#
        );
        let purged: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(purged["event"], "scope_purged");
        assert_eq!(purged["scope"]["kind"], "line");
        assert_eq!(purged["scope"]["index"], 2);
        assert_eq!(purged["removed"], 3);
    }

    #[test]
    fn query_by_stage() {
        let mut trail = AuditTrail::new();
        trail.record(AuditEvent::BlockBuilt {
            kind: BlockKind::Origin,
        });
        trail.record(AuditEvent::ScopeSkipped {
            reason: "no lines".into(),
        });
        assert_eq!(trail.of_stage(Stage::Build).count(), 1);
        assert_eq!(trail.of_stage(Stage::Splice).count(), 1);
        assert_eq!(trail.of_stage(Stage::Classify).count(), 0);
        assert_eq!(
            trail.count(|e| matches!(e, AuditEvent::ScopeSkipped { .. })),
            1
        );
        assert_eq!(trail.len(), 2);
    }

    #[test]
    fn scope_display() {
        assert_eq!(Scope::Header.to_string(), "header");
        assert_eq!(Scope::Line { index: 4 }.to_string(), "line[4]");
    }
}
