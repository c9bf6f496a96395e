//! Read-only value table over a model.
//!
//! One entry per entity with its resolved value and resolution status.
//! Per-id failures are reported individually; the rest of the table is
//! still produced.

use serde::ser::Serializer;
use serde::Serialize;

use crate::engine::TruthModel;
use crate::error::ModelError;

/// How one entity resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum Status {
    Ok,
    /// Intentionally incomplete data propagated here. Not an error.
    Undefined,
    /// A lookup failed; carries the stable error kind token.
    Error(String),
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Undefined => write!(f, "undefined"),
            Self::Error(kind) => write!(f, "error:{kind}"),
        }
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Constant,
    Calculation,
    Instance,
    Claim,
    Question,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant => write!(f, "constant"),
            Self::Calculation => write!(f, "calculation"),
            Self::Instance => write!(f, "instance"),
            Self::Claim => write!(f, "claim"),
            Self::Question => write!(f, "question"),
        }
    }
}

/// A resolved value: numeric for quantities, boolean for claims/questions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotEntry {
    pub id: String,
    pub kind: EntityKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    /// Claim entries only: the computed range in SI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<f64>,
    pub status: Status,
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotMeta {
    pub model_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SnapshotSummary {
    pub entries: usize,
    pub claims_passed: usize,
    pub claims_failed: usize,
    pub questions_true: usize,
    pub questions_false: usize,
    pub undefined: usize,
    pub errors: usize,
}

/// Deterministic snapshot of current field values, the interface handed to
/// presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub meta: SnapshotMeta,
    pub summary: SnapshotSummary,
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    pub fn capture(model: &TruthModel) -> Self {
        let mut entries = Vec::new();

        for constant in model.constants() {
            entries.push(number_entry(
                &constant.id,
                EntityKind::Constant,
                model.constant_si(&constant.id).map(Some),
            ));
        }

        for calc in model.calculations() {
            entries.push(number_entry(
                &calc.id,
                EntityKind::Calculation,
                model.calculation_si(&calc.id),
            ));
        }

        for instance in model.instances() {
            entries.push(number_entry(
                &instance.id,
                EntityKind::Instance,
                model.instance_si(&instance.id),
            ));
        }

        for claim in model.claims() {
            let entry = match model.claim(&claim.id) {
                Ok(outcome) => SnapshotEntry {
                    id: claim.id.clone(),
                    kind: EntityKind::Claim,
                    value: Some(Value::Bool(outcome.pass)),
                    range: outcome.range,
                    status: if outcome.range.is_some() {
                        Status::Ok
                    } else {
                        Status::Undefined
                    },
                },
                Err(err) => error_entry(&claim.id, EntityKind::Claim, &err),
            };
            entries.push(entry);
        }

        for question in model.questions() {
            let entry = match model.question(&question.id) {
                Ok(answer) => SnapshotEntry {
                    id: question.id.clone(),
                    kind: EntityKind::Question,
                    value: Some(Value::Bool(answer)),
                    range: None,
                    status: Status::Ok,
                },
                Err(err) => error_entry(&question.id, EntityKind::Question, &err),
            };
            entries.push(entry);
        }

        let summary = summarize(&entries);

        Snapshot {
            meta: SnapshotMeta {
                model_name: model.name().to_string(),
                engine_version: env!("CARGO_PKG_VERSION").to_string(),
                run_at: chrono::Utc::now().to_rfc3339(),
            },
            summary,
            entries,
        }
    }

    pub fn entry(&self, id: &str) -> Option<&SnapshotEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// Format as a concise one-line summary for logging.
    pub fn summary_line(&self) -> String {
        format!(
            "{} entries, claims={}/{}, questions={}T/{}F, undefined={}, errors={}",
            self.summary.entries,
            self.summary.claims_passed,
            self.summary.claims_passed + self.summary.claims_failed,
            self.summary.questions_true,
            self.summary.questions_false,
            self.summary.undefined,
            self.summary.errors,
        )
    }

    /// Format as a one-line log entry.
    ///
    /// Format: `[eval/full] 24 entries  claims=4/4  questions=6  undefined=1  errors=0`
    pub fn log_line(&self) -> String {
        format!(
            "[eval/full] {} entries  claims={}/{}  questions={}  undefined={}  errors={}",
            self.summary.entries,
            self.summary.claims_passed,
            self.summary.claims_passed + self.summary.claims_failed,
            self.summary.questions_true + self.summary.questions_false,
            self.summary.undefined,
            self.summary.errors,
        )
    }
}

fn number_entry(
    id: &str,
    kind: EntityKind,
    resolved: Result<Option<f64>, ModelError>,
) -> SnapshotEntry {
    match resolved {
        Ok(Some(value)) => SnapshotEntry {
            id: id.to_string(),
            kind,
            value: Some(Value::Number(value)),
            range: None,
            status: Status::Ok,
        },
        Ok(None) => SnapshotEntry {
            id: id.to_string(),
            kind,
            value: None,
            range: None,
            status: Status::Undefined,
        },
        Err(err) => error_entry(id, kind, &err),
    }
}

fn error_entry(id: &str, kind: EntityKind, err: &ModelError) -> SnapshotEntry {
    SnapshotEntry {
        id: id.to_string(),
        kind,
        value: None,
        range: None,
        status: Status::Error(err.kind().to_string()),
    }
}

fn summarize(entries: &[SnapshotEntry]) -> SnapshotSummary {
    let mut summary = SnapshotSummary {
        entries: entries.len(),
        ..Default::default()
    };
    for entry in entries {
        match (&entry.kind, &entry.value, &entry.status) {
            (EntityKind::Claim, Some(Value::Bool(true)), _) => summary.claims_passed += 1,
            (EntityKind::Claim, Some(Value::Bool(false)), _) => summary.claims_failed += 1,
            (EntityKind::Question, Some(Value::Bool(true)), _) => summary.questions_true += 1,
            (EntityKind::Question, Some(Value::Bool(false)), _) => summary.questions_false += 1,
            _ => {}
        }
        match &entry.status {
            Status::Undefined => summary.undefined += 1,
            Status::Error(_) => summary.errors += 1,
            Status::Ok => {}
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TruthModel;

    const MODEL: &str = r#"
name = "Snapshot Tests"

[[units]]
id = "U_J"
name = "joule"
kind = "energy"
si_unit = "J"
to_si_mult = 1.0

[[constants]]
id = "C_a"
name = "a"
value = 3.0
unit = "U_J"

[[calculations]]
id = "F_hole"
name = "placeholder"
expression = "unspecified"

[[instances]]
id = "I_a"
scenario = "Demo"
unit = "U_J"
source = { constant = "C_a" }

[[instances]]
id = "I_hole"
scenario = "Demo"
unit = "U_J"
source = { calculation = "F_hole" }

[[claims]]
id = "CL_ok"
text = "a matches its instance"
kind = "constructed"
sources = [ { constant = "C_a" }, { instance = "I_a" } ]
tolerance = 0.0

[[claims]]
id = "CL_hole"
text = "undefined source"
kind = "reality_invariant"
sources = [ { instance = "I_hole" } ]
tolerance = 1.0

[[questions]]
id = "Q_ok"
text = "ok?"
answer = { claim = "CL_ok" }
"#;

    fn model() -> TruthModel {
        TruthModel::from_toml(MODEL).unwrap()
    }

    #[test]
    fn statuses_cover_ok_and_undefined() {
        let snap = model().snapshot();
        assert_eq!(snap.entry("C_a").unwrap().status, Status::Ok);
        assert_eq!(snap.entry("F_hole").unwrap().status, Status::Undefined);
        assert_eq!(snap.entry("I_hole").unwrap().status, Status::Undefined);
        assert_eq!(snap.entry("CL_ok").unwrap().status, Status::Ok);
        assert_eq!(snap.entry("CL_ok").unwrap().value, Some(Value::Bool(true)));
        assert_eq!(snap.entry("CL_ok").unwrap().range, Some(0.0));
    }

    #[test]
    fn undefined_claim_reports_false_with_no_range() {
        let snap = model().snapshot();
        let entry = snap.entry("CL_hole").unwrap();
        assert_eq!(entry.value, Some(Value::Bool(false)));
        assert_eq!(entry.range, None);
        assert_eq!(entry.status, Status::Undefined);
    }

    #[test]
    fn summary_counts() {
        let snap = model().snapshot();
        assert_eq!(snap.summary.entries, 7);
        assert_eq!(snap.summary.claims_passed, 1);
        assert_eq!(snap.summary.claims_failed, 1);
        assert_eq!(snap.summary.questions_true, 1);
        assert_eq!(snap.summary.questions_false, 0);
        // F_hole, I_hole, CL_hole
        assert_eq!(snap.summary.undefined, 3);
        assert_eq!(snap.summary.errors, 0);
    }

    #[test]
    fn log_line_format() {
        let snap = model().snapshot();
        assert_eq!(
            snap.log_line(),
            "[eval/full] 7 entries  claims=1/2  questions=1  undefined=3  errors=0"
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let m = model();
        let a = m.snapshot();
        let b = m.snapshot();
        assert_eq!(a.entries, b.entries);
        assert_eq!(a.summary, b.summary);
    }

    #[test]
    fn status_display_tokens() {
        assert_eq!(Status::Ok.to_string(), "ok");
        assert_eq!(Status::Undefined.to_string(), "undefined");
        assert_eq!(Status::Error("unknown_unit".into()).to_string(), "error:unknown_unit");
    }

    #[test]
    fn serializes_to_single_json_value() {
        let snap = model().snapshot();
        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["meta"]["model_name"], "Snapshot Tests");
        assert_eq!(json["summary"]["entries"], 7);
        let statuses: Vec<&str> = json["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["status"].as_str().unwrap())
            .collect();
        assert!(statuses.contains(&"undefined"));
        // undefined entries omit the value key entirely
        let hole = json["entries"]
            .as_array()
            .unwrap()
            .iter()
            .find(|e| e["id"] == "F_hole")
            .unwrap();
        assert!(hole.get("value").is_none());
    }
}
