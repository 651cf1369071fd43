// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The composition resolver: computes the shared-boundary feet and the
//! relation binding when a simulation is assembled from independently
//! authored models.
//!
//! Components in different models are *shared* when an identification
//! pairs them, or when a same-named component is structurally
//! referenced on either side (a flow endpoint, or a declared
//! dependency). Feet are built per shared stock, null-anchored feet per
//! uncovered shared sum variable, and a single empty foot for a model
//! sharing nothing, so every composed model exposes at least one
//! boundary point.
//!
//! Canonical foot ordering: feet live in one global list in
//! first-construction order (models in declaration order, stock-
//! anchored feet in stock insertion order, then null-anchored feet in
//! sum-variable insertion order); feet arising in several models merge
//! into their first-seen position. Every downstream consumer (the
//! relation statement, each open statement, the composition statement)
//! derives its ordering from this list alone.

use crate::common::{canonicalize_name, Ident, Result, SyntaxConfig};
use crate::model::Model;
use crate::{datamodel, model_err};

/// A composition-interface object: one shared boundary point.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Foot {
    /// anchor stock, if any
    pub stock: Option<Ident>,
    /// sum variables the anchor feeds in the owning models
    pub sum_variables: Vec<Ident>,
    /// owning models, declaration order
    pub models: Vec<Ident>,
}

impl Foot {
    /// The generated identifier this foot binds to in the program.
    pub fn ident(&self, cfg: &SyntaxConfig) -> Ident {
        match (&self.stock, self.sum_variables.first()) {
            (Some(stock), _) => format!("{}{}", cfg.foot_prefix, stock),
            (None, Some(sv)) => format!("{}{}", cfg.foot_prefix, sv),
            (None, None) => format!("{}{}", cfg.foot_prefix, self.models[0]),
        }
    }
}

/// The resolved composition boundary: all feet in canonical order, and
/// each model's owned subset of them.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Composition {
    pub feet: Vec<Foot>,
    /// per model (declaration order): the model name and the indices
    /// into `feet` it owns, ascending
    pub model_feet: Vec<(Ident, Vec<usize>)>,
}

impl Composition {
    pub fn feet_of(&self, model: &str) -> &[usize] {
        self.model_feet
            .iter()
            .find(|(name, _)| name == model)
            .map(|(_, feet)| feet.as_slice())
            .unwrap_or(&[])
    }
}

/// Compute the composition boundary for `models` (outer model first,
/// then static models in declaration order).
pub fn resolve_composition(
    models: &[&Model],
    identifications: &[datamodel::Identification],
) -> Result<Composition> {
    validate_identifications(models, identifications)?;

    let mut feet: Vec<Foot> = vec![];
    let mut model_feet: Vec<(Ident, Vec<usize>)> = vec![];

    for (mi, model) in models.iter().enumerate() {
        let mut owned: Vec<usize> = vec![];
        let mut covered_svs: Vec<Ident> = vec![];

        for stock in model.stocks() {
            if !is_shared(&stock.ident, mi, models, identifications) {
                continue;
            }
            covered_svs.extend(stock.contributing_sum_variables.iter().cloned());

            let existing = feet
                .iter()
                .position(|f| f.stock.as_deref() == Some(stock.ident.as_str()));
            let idx = match existing {
                Some(idx) => {
                    let foot = &mut feet[idx];
                    for sv in &stock.contributing_sum_variables {
                        if !foot.sum_variables.contains(sv) {
                            foot.sum_variables.push(sv.clone());
                        }
                    }
                    foot.models.push(model.name.clone());
                    idx
                }
                None => {
                    feet.push(Foot {
                        stock: Some(stock.ident.clone()),
                        sum_variables: stock.contributing_sum_variables.clone(),
                        models: vec![model.name.clone()],
                    });
                    feet.len() - 1
                }
            };
            owned.push(idx);
        }

        for sv in model.sum_variables() {
            if covered_svs.contains(&sv.ident) {
                continue;
            }
            if !is_shared(&sv.ident, mi, models, identifications) {
                continue;
            }

            let existing = feet
                .iter()
                .position(|f| f.stock.is_none() && f.sum_variables == [sv.ident.clone()]);
            let idx = match existing {
                Some(idx) => {
                    feet[idx].models.push(model.name.clone());
                    idx
                }
                None => {
                    feet.push(Foot {
                        stock: None,
                        sum_variables: vec![sv.ident.clone()],
                        models: vec![model.name.clone()],
                    });
                    feet.len() - 1
                }
            };
            owned.push(idx);
        }

        // every composed model exposes at least one boundary point
        if owned.is_empty() {
            feet.push(Foot {
                stock: None,
                sum_variables: vec![],
                models: vec![model.name.clone()],
            });
            owned.push(feet.len() - 1);
        }

        owned.sort_unstable();
        model_feet.push((model.name.clone(), owned));
    }

    Ok(Composition { feet, model_feet })
}

fn validate_identifications(
    models: &[&Model],
    identifications: &[datamodel::Identification],
) -> Result<()> {
    for ident in identifications {
        let component = canonicalize_name(&ident.component);
        for side in [&ident.first, &ident.second] {
            let side = canonicalize_name(side);
            let model = match models.iter().find(|m| m.name == side) {
                Some(model) => model,
                None => {
                    return model_err!(
                        BadIdentification,
                        format!("model '{side}' does not exist")
                    );
                }
            };
            if !model.contains(&component) {
                return model_err!(
                    BadIdentification,
                    format!("'{component}' is not a component of model '{side}'")
                );
            }
        }
    }
    Ok(())
}

/// True if the component named `name` in `models[owner]` is the same
/// logical entity as a component of another model, and the pair is
/// bound by an identification or referenced structurally on either
/// side.
fn is_shared(
    name: &str,
    owner: usize,
    models: &[&Model],
    identifications: &[datamodel::Identification],
) -> bool {
    let owner_model = models[owner];
    for (oi, other) in models.iter().enumerate() {
        if oi == owner {
            continue;
        }
        if !other.contains(name) {
            continue;
        }

        let identified = identifications.iter().any(|i| {
            canonicalize_name(&i.component) == name
                && ((canonicalize_name(&i.first) == owner_model.name
                    && canonicalize_name(&i.second) == other.name)
                    || (canonicalize_name(&i.first) == other.name
                        && canonicalize_name(&i.second) == owner_model.name))
        });
        if identified {
            return true;
        }

        let named_by_flow = owner_model
            .flows()
            .chain(other.flows())
            .any(|f| f.from == name || f.to == name);
        if named_by_flow {
            return true;
        }

        let declared_as_dependency = owner_model
            .components
            .iter()
            .chain(other.components.iter())
            .any(|c| c.dependency_idents().iter().any(|d| d.as_str() == name));
        if declared_as_dependency {
            return true;
        }
    }
    false
}
