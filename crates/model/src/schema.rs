use std::collections::HashSet;

use serde::Deserialize;

use crate::error::ModelError;

// ---------------------------------------------------------------------------
// Top-level schema
// ---------------------------------------------------------------------------

/// A full truth-model schema as loaded from TOML.
///
/// Everything is created once at load time; after that, only constant values
/// and literal instance values are meant to change.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSchema {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub units: Vec<UnitDef>,
    #[serde(default)]
    pub constants: Vec<ConstantDef>,
    #[serde(default)]
    pub calculations: Vec<CalculationDef>,
    #[serde(default)]
    pub instances: Vec<InstanceDef>,
    #[serde(default)]
    pub claims: Vec<ClaimDef>,
    #[serde(default)]
    pub questions: Vec<QuestionDef>,
}

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct UnitDef {
    pub id: String,
    pub name: String,
    pub kind: QuantityKind,
    /// Name of the SI base unit this converts into (e.g. "J", "K").
    pub si_unit: String,
    /// Multiply a raw value by this to convert toward SI.
    pub to_si_mult: f64,
    /// Then add this. Nonzero only for offset scales (temperature).
    #[serde(default)]
    pub to_si_offset: f64,
    #[serde(default)]
    pub authority_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuantityKind {
    Energy,
    Temperature,
    Mass,
    Speed,
    Charge,
}

impl std::fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Energy => write!(f, "energy"),
            Self::Temperature => write!(f, "temperature"),
            Self::Mass => write!(f, "mass"),
            Self::Speed => write!(f, "speed"),
            Self::Charge => write!(f, "charge"),
        }
    }
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ConstantDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub symbol: Option<String>,
    /// Value in the given unit. The only externally mutable field.
    pub value: f64,
    pub unit: String,
    /// Provenance label, e.g. "Measured (CODATA)" or "Defined (SI)".
    #[serde(default)]
    pub source_layer: Option<String>,
    #[serde(default)]
    pub authority_url: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct CalculationDef {
    pub id: String,
    pub name: String,
    pub expression: Expression,
    #[serde(default)]
    pub note: Option<String>,
}

/// Explicit expression forms. No general parser; the schema names each shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Pass-through of one resolved constant.
    Constant(String),
    /// Product of powered operands.
    Product(Vec<Factor>),
    /// Placeholder with no resolvable expression. Resolves to undefined and
    /// propagates, it is not an error.
    Unspecified,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Factor {
    #[serde(flatten)]
    pub operand: Operand,
    #[serde(default = "default_exponent")]
    pub exponent: i32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operand {
    Constant(String),
    Calculation(String),
}

fn default_exponent() -> i32 {
    1
}

// ---------------------------------------------------------------------------
// Instances
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct InstanceDef {
    pub id: String,
    pub scenario: String,
    /// Display name for the quantity, e.g. "E (calc)".
    #[serde(default)]
    pub quantity: Option<String>,
    pub unit: String,
    pub source: InstanceSource,
    #[serde(default)]
    pub note: Option<String>,
}

/// Where an instance's raw value comes from.
///
/// Non-literal sources take the referenced SI value, re-express it in the
/// instance's own unit, then reconvert to SI. The round-trip through a
/// non-SI unit is intentional.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceSource {
    Literal(f64),
    Constant(String),
    Calculation(String),
}

// ---------------------------------------------------------------------------
// Claims
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ClaimDef {
    pub id: String,
    pub text: String,
    pub kind: ClaimKind,
    /// 1-3 values to compare, each an instance/constant/calculation reference.
    pub sources: Vec<ValueRef>,
    /// Maximum permitted range (inclusive) for the claim to pass, in SI.
    pub tolerance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimKind {
    /// True because defined (unit conventions, definitional identities).
    Constructed,
    /// Constrained by independently measured or derived quantities.
    RealityInvariant,
    /// Scale convention plus physical anchor.
    Mixed,
}

impl ClaimKind {
    /// Reporting label only; the pass/fail math is identical for all kinds.
    pub fn truth_source(&self) -> &'static str {
        match self {
            Self::Constructed => "Convention/Definition",
            Self::RealityInvariant | Self::Mixed => {
                "Reality (constraint) + Convention (coordinates)"
            }
        }
    }
}

impl std::fmt::Display for ClaimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constructed => write!(f, "constructed"),
            Self::RealityInvariant => write!(f, "reality_invariant"),
            Self::Mixed => write!(f, "mixed"),
        }
    }
}

/// A reference to any entity that resolves to an SI value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueRef {
    Instance(String),
    Constant(String),
    Calculation(String),
}

impl std::fmt::Display for ValueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Instance(id) => write!(f, "instance:{id}"),
            Self::Constant(id) => write!(f, "constant:{id}"),
            Self::Calculation(id) => write!(f, "calculation:{id}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct QuestionDef {
    pub id: String,
    pub text: String,
    pub answer: AnswerRule,
    #[serde(default)]
    pub explanation: Option<String>,
}

/// Fixed boolean formula over claim passes. No numeric computation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerRule {
    /// Identity: answer = claim's pass.
    Claim(String),
    /// Negation: answer = !claim's pass.
    Not(String),
    /// OR over the listed claims' passes.
    AnyOf(Vec<String>),
}

impl AnswerRule {
    pub fn claim_ids(&self) -> Vec<&str> {
        match self {
            Self::Claim(id) | Self::Not(id) => vec![id.as_str()],
            Self::AnyOf(ids) => ids.iter().map(String::as_str).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl ModelSchema {
    pub fn from_toml(input: &str) -> Result<Self, ModelError> {
        let schema: ModelSchema =
            toml::from_str(input).map_err(|e| ModelError::SchemaParse(e.to_string()))?;
        schema.validate()?;
        Ok(schema)
    }

    /// Shape and reference checks. Acyclicity is checked separately when the
    /// dependency graph is built (`TruthModel::new`).
    pub fn validate(&self) -> Result<(), ModelError> {
        let unit_ids = unique_ids("unit", self.units.iter().map(|u| u.id.as_str()))?;
        let constant_ids = unique_ids("constant", self.constants.iter().map(|c| c.id.as_str()))?;
        let calc_ids = unique_ids("calculation", self.calculations.iter().map(|c| c.id.as_str()))?;
        let instance_ids = unique_ids("instance", self.instances.iter().map(|i| i.id.as_str()))?;
        let claim_ids = unique_ids("claim", self.claims.iter().map(|c| c.id.as_str()))?;
        unique_ids("question", self.questions.iter().map(|q| q.id.as_str()))?;

        for unit in &self.units {
            if unit.to_si_mult == 0.0 || !unit.to_si_mult.is_finite() {
                return Err(ModelError::SchemaValidation(format!(
                    "unit '{}': to_si_mult must be finite and nonzero",
                    unit.id
                )));
            }
            if !unit.to_si_offset.is_finite() {
                return Err(ModelError::SchemaValidation(format!(
                    "unit '{}': to_si_offset must be finite",
                    unit.id
                )));
            }
        }

        for constant in &self.constants {
            if !unit_ids.contains(constant.unit.as_str()) {
                return Err(ModelError::UnknownUnit(format!(
                    "{} (referenced by constant '{}')",
                    constant.unit, constant.id
                )));
            }
        }

        for calc in &self.calculations {
            match &calc.expression {
                Expression::Constant(id) => {
                    if !constant_ids.contains(id.as_str()) {
                        return Err(ModelError::UnknownConstant(format!(
                            "{} (referenced by calculation '{}')",
                            id, calc.id
                        )));
                    }
                }
                Expression::Product(factors) => {
                    if factors.is_empty() {
                        return Err(ModelError::SchemaValidation(format!(
                            "calculation '{}': product needs at least one factor",
                            calc.id
                        )));
                    }
                    for factor in factors {
                        match &factor.operand {
                            Operand::Constant(id) if !constant_ids.contains(id.as_str()) => {
                                return Err(ModelError::UnknownConstant(format!(
                                    "{} (referenced by calculation '{}')",
                                    id, calc.id
                                )));
                            }
                            Operand::Calculation(id) if !calc_ids.contains(id.as_str()) => {
                                return Err(ModelError::UnknownCalculation(format!(
                                    "{} (referenced by calculation '{}')",
                                    id, calc.id
                                )));
                            }
                            _ => {}
                        }
                    }
                }
                Expression::Unspecified => {}
            }
        }

        for instance in &self.instances {
            if !unit_ids.contains(instance.unit.as_str()) {
                return Err(ModelError::UnknownUnit(format!(
                    "{} (referenced by instance '{}')",
                    instance.unit, instance.id
                )));
            }
            match &instance.source {
                InstanceSource::Literal(_) => {}
                InstanceSource::Constant(id) => {
                    if !constant_ids.contains(id.as_str()) {
                        return Err(ModelError::UnknownConstant(format!(
                            "{} (referenced by instance '{}')",
                            id, instance.id
                        )));
                    }
                }
                InstanceSource::Calculation(id) => {
                    if !calc_ids.contains(id.as_str()) {
                        return Err(ModelError::UnknownCalculation(format!(
                            "{} (referenced by instance '{}')",
                            id, instance.id
                        )));
                    }
                }
            }
        }

        for claim in &self.claims {
            if claim.sources.is_empty() || claim.sources.len() > 3 {
                return Err(ModelError::SchemaValidation(format!(
                    "claim '{}': needs 1-3 sources, got {}",
                    claim.id,
                    claim.sources.len()
                )));
            }
            if !(claim.tolerance.is_finite() && claim.tolerance >= 0.0) {
                return Err(ModelError::SchemaValidation(format!(
                    "claim '{}': tolerance must be finite and >= 0",
                    claim.id
                )));
            }
            for source in &claim.sources {
                let (present, err): (bool, ModelError) = match source {
                    ValueRef::Instance(id) => (
                        instance_ids.contains(id.as_str()),
                        ModelError::UnknownInstance(format!(
                            "{} (referenced by claim '{}')",
                            id, claim.id
                        )),
                    ),
                    ValueRef::Constant(id) => (
                        constant_ids.contains(id.as_str()),
                        ModelError::UnknownConstant(format!(
                            "{} (referenced by claim '{}')",
                            id, claim.id
                        )),
                    ),
                    ValueRef::Calculation(id) => (
                        calc_ids.contains(id.as_str()),
                        ModelError::UnknownCalculation(format!(
                            "{} (referenced by claim '{}')",
                            id, claim.id
                        )),
                    ),
                };
                if !present {
                    return Err(err);
                }
            }
        }

        for question in &self.questions {
            for claim_id in question.answer.claim_ids() {
                if !claim_ids.contains(claim_id) {
                    return Err(ModelError::UnknownClaim(format!(
                        "{} (referenced by question '{}')",
                        claim_id, question.id
                    )));
                }
            }
        }

        Ok(())
    }
}

fn unique_ids<'a>(
    table: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, ModelError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(ModelError::SchemaValidation(format!(
                "duplicate {table} id '{id}'"
            )));
        }
    }
    Ok(seen)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
