//! Pull-based evaluation over a loaded truth model.
//!
//! Every read re-derives from current inputs; there is no cached derived
//! state to go stale. The dependency graph is validated acyclic at load, so
//! recursive resolution terminates.

use std::collections::BTreeMap;

use ordered_float::OrderedFloat;

use crate::error::ModelError;
use crate::graph::{DepGraph, NodeId};
use crate::schema::{
    AnswerRule, CalculationDef, ClaimDef, ConstantDef, Expression, InstanceDef, InstanceSource,
    ModelSchema, Operand, QuestionDef, ValueRef,
};
use crate::snapshot::Snapshot;
use crate::units::UnitRegistry;

/// Result of evaluating one claim.
#[derive(Debug, Clone, PartialEq)]
pub struct ClaimOutcome {
    /// `range <= tolerance`, or false when a source is undefined.
    pub pass: bool,
    /// `max(present) - min(present)`. None when a source is undefined;
    /// never silently treated as zero.
    pub range: Option<f64>,
    /// The resolved SI values, in source order.
    pub values: Vec<f64>,
}

/// A loaded, validated truth model.
///
/// Only constant values and literal instance values are writable
/// (`set_constant_value` / `set_instance_value`); everything else is
/// re-derived on read.
#[derive(Debug, Clone)]
pub struct TruthModel {
    name: String,
    description: Option<String>,
    units: UnitRegistry,
    constants: BTreeMap<String, ConstantDef>,
    calculations: BTreeMap<String, CalculationDef>,
    instances: BTreeMap<String, InstanceDef>,
    claims: BTreeMap<String, ClaimDef>,
    questions: BTreeMap<String, QuestionDef>,
    graph: DepGraph,
}

impl TruthModel {
    /// Build a model from a schema. Validates references and acyclicity;
    /// fails fast with `CyclicDependency` rather than looping later.
    pub fn new(schema: ModelSchema) -> Result<Self, ModelError> {
        schema.validate()?;
        let graph = build_graph(&schema);
        graph.topo_order()?;

        Ok(Self {
            name: schema.name,
            description: schema.description,
            units: UnitRegistry::new(schema.units),
            constants: schema.constants.into_iter().map(|c| (c.id.clone(), c)).collect(),
            calculations: schema
                .calculations
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect(),
            instances: schema.instances.into_iter().map(|i| (i.id.clone(), i)).collect(),
            claims: schema.claims.into_iter().map(|c| (c.id.clone(), c)).collect(),
            questions: schema.questions.into_iter().map(|q| (q.id.clone(), q)).collect(),
            graph,
        })
    }

    pub fn from_toml(input: &str) -> Result<Self, ModelError> {
        Self::new(ModelSchema::from_toml(input)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn units(&self) -> &UnitRegistry {
        &self.units
    }

    pub fn graph(&self) -> &DepGraph {
        &self.graph
    }

    // -----------------------------------------------------------------------
    // Writer path
    // -----------------------------------------------------------------------

    /// Edit a constant's raw value. Every downstream read reflects the new
    /// value with no manual propagation step.
    pub fn set_constant_value(&mut self, id: &str, value: f64) -> Result<(), ModelError> {
        let constant = self
            .constants
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownConstant(id.to_string()))?;
        constant.value = value;
        Ok(())
    }

    /// Edit a literal instance's raw value. Derived instances are not
    /// inputs and refuse the edit.
    pub fn set_instance_value(&mut self, id: &str, value: f64) -> Result<(), ModelError> {
        let instance = self
            .instances
            .get_mut(id)
            .ok_or_else(|| ModelError::UnknownInstance(id.to_string()))?;
        match instance.source {
            InstanceSource::Literal(_) => {
                instance.source = InstanceSource::Literal(value);
                Ok(())
            }
            _ => Err(ModelError::NotAnInput(id.to_string())),
        }
    }

    // -----------------------------------------------------------------------
    // Resolvers
    // -----------------------------------------------------------------------

    /// Resolve a constant to canonical SI. Lazy-on-read: reflects the
    /// latest raw value.
    pub fn constant_si(&self, id: &str) -> Result<f64, ModelError> {
        let constant = self
            .constants
            .get(id)
            .ok_or_else(|| ModelError::UnknownConstant(id.to_string()))?;
        self.units.convert(&constant.unit, constant.value)
    }

    /// Resolve a calculation to SI. `Ok(None)` for unspecified placeholders
    /// and for anything that depends on one.
    pub fn calculation_si(&self, id: &str) -> Result<Option<f64>, ModelError> {
        let calc = self
            .calculations
            .get(id)
            .ok_or_else(|| ModelError::UnknownCalculation(id.to_string()))?;
        self.eval_expression(&calc.expression)
    }

    fn eval_expression(&self, expression: &Expression) -> Result<Option<f64>, ModelError> {
        match expression {
            Expression::Unspecified => Ok(None),
            Expression::Constant(id) => self.constant_si(id).map(Some),
            Expression::Product(factors) => {
                let mut acc = 1.0;
                for factor in factors {
                    let value = match &factor.operand {
                        Operand::Constant(id) => Some(self.constant_si(id)?),
                        Operand::Calculation(id) => self.calculation_si(id)?,
                    };
                    match value {
                        Some(v) => acc *= v.powi(factor.exponent),
                        None => return Ok(None),
                    }
                }
                Ok(Some(acc))
            }
        }
    }

    /// Resolve an instance to canonical SI.
    ///
    /// Non-literal sources are re-expressed in the instance's own unit and
    /// reconverted; the round-trip through a non-SI unit is the point.
    /// `Ok(None)` when the source calculation is undefined.
    pub fn instance_si(&self, id: &str) -> Result<Option<f64>, ModelError> {
        let instance = self
            .instances
            .get(id)
            .ok_or_else(|| ModelError::UnknownInstance(id.to_string()))?;
        let raw = match &instance.source {
            InstanceSource::Literal(value) => *value,
            InstanceSource::Constant(constant_id) => {
                let si = self.constant_si(constant_id)?;
                self.units.invert(&instance.unit, si)?
            }
            InstanceSource::Calculation(calc_id) => match self.calculation_si(calc_id)? {
                Some(si) => self.units.invert(&instance.unit, si)?,
                None => return Ok(None),
            },
        };
        self.units.convert(&instance.unit, raw).map(Some)
    }

    /// Strict form of [`instance_si`](Self::instance_si) for callers that
    /// demand a definite number.
    pub fn require_instance_si(&self, id: &str) -> Result<f64, ModelError> {
        match self.instance_si(id)? {
            Some(value) => Ok(value),
            None => {
                let dependency = match &self.instances[id].source {
                    InstanceSource::Calculation(calc_id) => calc_id.clone(),
                    _ => id.to_string(),
                };
                Err(ModelError::UnresolvedReference {
                    id: id.to_string(),
                    dependency,
                })
            }
        }
    }

    fn resolve_ref(&self, value_ref: &ValueRef) -> Result<Option<f64>, ModelError> {
        match value_ref {
            ValueRef::Instance(id) => self.instance_si(id),
            ValueRef::Constant(id) => self.constant_si(id).map(Some),
            ValueRef::Calculation(id) => self.calculation_si(id),
        }
    }

    /// Evaluate a claim: resolve each source, take the range over present
    /// values, compare against the tolerance (inclusive).
    ///
    /// One present value gives range 0 and trivially passes. Any source
    /// resolving undefined gives `pass = false` with no range.
    pub fn claim(&self, id: &str) -> Result<ClaimOutcome, ModelError> {
        let claim = self
            .claims
            .get(id)
            .ok_or_else(|| ModelError::UnknownClaim(id.to_string()))?;

        let mut values = Vec::with_capacity(claim.sources.len());
        for source in &claim.sources {
            match self.resolve_ref(source)? {
                Some(value) => values.push(value),
                None => {
                    return Ok(ClaimOutcome {
                        pass: false,
                        range: None,
                        values,
                    })
                }
            }
        }

        let max = values.iter().copied().map(OrderedFloat).max();
        let min = values.iter().copied().map(OrderedFloat).min();
        let range = match (max, min) {
            (Some(max), Some(min)) => max.0 - min.0,
            _ => 0.0,
        };

        Ok(ClaimOutcome {
            pass: range <= claim.tolerance,
            range: Some(range),
            values,
        })
    }

    fn claim_pass(&self, id: &str) -> Result<bool, ModelError> {
        Ok(self.claim(id)?.pass)
    }

    /// Evaluate a question: a fixed boolean formula over claim passes.
    pub fn question(&self, id: &str) -> Result<bool, ModelError> {
        let question = self
            .questions
            .get(id)
            .ok_or_else(|| ModelError::UnknownQuestion(id.to_string()))?;
        match &question.answer {
            AnswerRule::Claim(claim_id) => self.claim_pass(claim_id),
            AnswerRule::Not(claim_id) => Ok(!self.claim_pass(claim_id)?),
            AnswerRule::AnyOf(claim_ids) => {
                let mut any = false;
                for claim_id in claim_ids {
                    any = any || self.claim_pass(claim_id)?;
                }
                Ok(any)
            }
        }
    }

    /// Capture the read-only value table for every entity.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(self)
    }

    // -----------------------------------------------------------------------
    // Definition access (for reporting layers)
    // -----------------------------------------------------------------------

    pub fn constants(&self) -> impl Iterator<Item = &ConstantDef> {
        self.constants.values()
    }

    pub fn calculations(&self) -> impl Iterator<Item = &CalculationDef> {
        self.calculations.values()
    }

    pub fn instances(&self) -> impl Iterator<Item = &InstanceDef> {
        self.instances.values()
    }

    pub fn claims(&self) -> impl Iterator<Item = &ClaimDef> {
        self.claims.values()
    }

    pub fn questions(&self) -> impl Iterator<Item = &QuestionDef> {
        self.questions.values()
    }

    pub fn claim_def(&self, id: &str) -> Option<&ClaimDef> {
        self.claims.get(id)
    }

    pub fn question_def(&self, id: &str) -> Option<&QuestionDef> {
        self.questions.get(id)
    }
}

/// One node per entity; edges point from precedent to dependent.
fn build_graph(schema: &ModelSchema) -> DepGraph {
    let mut graph = DepGraph::new();

    for constant in &schema.constants {
        graph.insert(NodeId::Constant(constant.id.clone()), []);
    }

    for calc in &schema.calculations {
        let preds: Vec<NodeId> = match &calc.expression {
            Expression::Constant(id) => vec![NodeId::Constant(id.clone())],
            Expression::Product(factors) => factors
                .iter()
                .map(|f| match &f.operand {
                    Operand::Constant(id) => NodeId::Constant(id.clone()),
                    Operand::Calculation(id) => NodeId::Calculation(id.clone()),
                })
                .collect(),
            Expression::Unspecified => vec![],
        };
        graph.insert(NodeId::Calculation(calc.id.clone()), preds);
    }

    for instance in &schema.instances {
        let preds: Vec<NodeId> = match &instance.source {
            InstanceSource::Literal(_) => vec![],
            InstanceSource::Constant(id) => vec![NodeId::Constant(id.clone())],
            InstanceSource::Calculation(id) => vec![NodeId::Calculation(id.clone())],
        };
        graph.insert(NodeId::Instance(instance.id.clone()), preds);
    }

    for claim in &schema.claims {
        let preds: Vec<NodeId> = claim
            .sources
            .iter()
            .map(|s| match s {
                ValueRef::Instance(id) => NodeId::Instance(id.clone()),
                ValueRef::Constant(id) => NodeId::Constant(id.clone()),
                ValueRef::Calculation(id) => NodeId::Calculation(id.clone()),
            })
            .collect();
        graph.insert(NodeId::Claim(claim.id.clone()), preds);
    }

    for question in &schema.questions {
        let preds: Vec<NodeId> = question
            .answer
            .claim_ids()
            .into_iter()
            .map(|id| NodeId::Claim(id.to_string()))
            .collect();
        graph.insert(NodeId::Question(question.id.clone()), preds);
    }

    graph
}
