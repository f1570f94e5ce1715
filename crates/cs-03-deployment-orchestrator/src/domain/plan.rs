//! # Deployment Plan
//!
//! A validated [`DeploySpec`] in execution order. Building a plan performs
//! every check that does not need the chain, so a bad spec fails before any
//! transaction is submitted.

use std::collections::HashMap;
use std::fmt;

use crate::algorithms::{topological_order, OrderError};
use crate::domain::errors::DeployError;
use crate::domain::spec::{DeploySpec, ParamValue};

/// What a step does on-chain.
#[derive(Clone, Debug, PartialEq)]
pub enum StepKind {
    /// Instantiate a contract.
    Deploy {
        /// Contract type.
        contract: String,
        /// Constructor parameters.
        args: Vec<ParamValue>,
    },
    /// Call a contract of this plan.
    Call {
        /// Called artifact.
        target: String,
        /// Method name.
        method: String,
        /// Call parameters.
        args: Vec<ParamValue>,
    },
}

/// One step of a plan.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanStep {
    /// Position in the spec (contracts first, then calls).
    pub index: usize,
    /// Logical artifact name.
    pub name: String,
    /// Deploy or call.
    pub kind: StepKind,
    /// Steps that must complete before this one, in first-mention order.
    pub dependencies: Vec<String>,
}

impl PlanStep {
    /// Whether this step instantiates a contract.
    pub fn is_contract(&self) -> bool {
        matches!(self.kind, StepKind::Deploy { .. })
    }

    /// Step parameters.
    pub fn args(&self) -> &[ParamValue] {
        match &self.kind {
            StepKind::Deploy { args, .. } | StepKind::Call { args, .. } => args,
        }
    }
}

/// Ordered, validated steps of one deployment.
#[derive(Clone, Debug, PartialEq)]
pub struct DeploymentPlan {
    deployment: String,
    steps: Vec<PlanStep>,
    required_assets: Vec<String>,
}

impl DeploymentPlan {
    /// Validate `spec` and order its steps.
    pub fn build(spec: &DeploySpec) -> Result<Self, DeployError> {
        // 1. Declared steps in declaration order
        let mut declared: Vec<(PlanStep, Vec<String>)> = Vec::with_capacity(spec.step_count());
        for contract in &spec.contracts {
            declared.push((
                PlanStep {
                    index: declared.len(),
                    name: contract.name.clone(),
                    kind: StepKind::Deploy {
                        contract: contract.contract.clone(),
                        args: contract.args.clone(),
                    },
                    dependencies: Vec::new(),
                },
                contract.depends_on.clone(),
            ));
        }
        for call in &spec.calls {
            declared.push((
                PlanStep {
                    index: declared.len(),
                    name: call.name.clone(),
                    kind: StepKind::Call {
                        target: call.target.clone(),
                        method: call.method.clone(),
                        args: call.args.clone(),
                    },
                    dependencies: Vec::new(),
                },
                call.depends_on.clone(),
            ));
        }

        // 2. Unique names
        let mut by_name: HashMap<String, usize> = HashMap::new();
        for (step, _) in &declared {
            if by_name.insert(step.name.clone(), step.index).is_some() {
                return Err(DeployError::DuplicateName {
                    name: step.name.clone(),
                });
            }
        }

        let mut required_assets: Vec<String> = Vec::new();
        let mut require = |symbol: &str| {
            if !required_assets.iter().any(|s| s == symbol) {
                required_assets.push(symbol.to_string());
            }
        };
        spec.assets.iter().for_each(|s| require(s));
        for (step, _) in &declared {
            step.args()
                .iter()
                .flat_map(ParamValue::assets)
                .for_each(&mut require);
        }
        if let Some(clash) = required_assets.iter().find(|s| by_name.contains_key(*s)) {
            return Err(DeployError::DuplicateName {
                name: clash.clone(),
            });
        }

        // 3. References and config keys
        let is_contract: Vec<bool> = declared.iter().map(|(s, _)| s.is_contract()).collect();
        let mut edges: Vec<Vec<usize>> = Vec::with_capacity(declared.len());
        for (step, depends_on) in &mut declared {
            let lookup = |reference: &str| {
                by_name
                    .get(reference)
                    .copied()
                    .ok_or_else(|| DeployError::UnresolvedReference {
                        step: step.name.clone(),
                        reference: reference.to_string(),
                    })
            };

            let mut contract_refs: Vec<&str> =
                step.args().iter().flat_map(ParamValue::refs).collect();
            if let StepKind::Call { target, .. } = &step.kind {
                contract_refs.insert(0, target);
            }

            let mut deps: Vec<usize> = Vec::new();
            for reference in contract_refs {
                let dep = lookup(reference)?;
                if !is_contract[dep] {
                    return Err(DeployError::InvalidReference {
                        step: step.name.clone(),
                        reference: reference.to_string(),
                    });
                }
                deps.push(dep);
            }
            for reference in depends_on.iter() {
                deps.push(lookup(reference)?);
            }

            for key in step.args().iter().flat_map(ParamValue::config_keys) {
                if !spec.config.contains_key(key) {
                    return Err(DeployError::MissingConfig {
                        step: step.name.clone(),
                        key: key.to_string(),
                    });
                }
            }

            let mut names: Vec<String> = Vec::new();
            for &dep in &deps {
                let name = &spec_step_name(spec, dep);
                if !names.contains(name) {
                    names.push(name.clone());
                }
            }
            step.dependencies = names;
            edges.push(deps);
        }

        // 4. Order
        let order = topological_order(&edges).map_err(|OrderError::Cycle(cycle)| {
            DeployError::CyclicDependency {
                cycle: cycle.into_iter().map(|i| spec_step_name(spec, i)).collect(),
            }
        })?;

        let mut slots: Vec<Option<PlanStep>> =
            declared.into_iter().map(|(step, _)| Some(step)).collect();
        let steps = order
            .into_iter()
            .filter_map(|i| slots.get_mut(i).and_then(Option::take))
            .collect();

        Ok(Self {
            deployment: spec.deployment.clone(),
            steps,
            required_assets,
        })
    }

    /// Deployment name.
    pub fn deployment(&self) -> &str {
        &self.deployment
    }

    /// Steps in execution order.
    pub fn steps(&self) -> &[PlanStep] {
        &self.steps
    }

    /// Declared and referenced asset symbols, in first-mention order.
    pub fn required_assets(&self) -> &[String] {
        &self.required_assets
    }

    /// Step named `name`.
    pub fn step(&self, name: &str) -> Option<&PlanStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Step names in execution order.
    pub fn order(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Name of the step at declaration index `index`.
fn spec_step_name(spec: &DeploySpec, index: usize) -> String {
    match spec.contracts.get(index) {
        Some(contract) => contract.name.clone(),
        None => spec
            .calls
            .get(index - spec.contracts.len())
            .map(|call| call.name.clone())
            .unwrap_or_default(),
    }
}

impl fmt::Display for DeploymentPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deployment plan `{}`: {} steps, {} assets",
            self.deployment,
            self.steps.len(),
            self.required_assets.len()
        )?;
        if !self.required_assets.is_empty() {
            writeln!(f, "  assets: {}", self.required_assets.join(", "))?;
        }
        let width = self.steps.iter().map(|s| s.name.len()).max().unwrap_or(0);
        for (position, step) in self.steps.iter().enumerate() {
            let action = match &step.kind {
                StepKind::Deploy { contract, .. } => format!("deploy {}", contract),
                StepKind::Call { target, method, .. } => format!("call {}.{}", target, method),
            };
            write!(f, "  {:>2}. {:<width$}  {}", position + 1, step.name, action)?;
            if !step.dependencies.is_empty() {
                write!(f, "  [after {}]", step.dependencies.join(", "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
