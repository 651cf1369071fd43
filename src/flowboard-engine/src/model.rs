// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The graph resolver: flat raw elements plus untyped Connection edges
//! in, fully annotated component catalog out.
//!
//! Resolution is a pure function and rebuilds everything per compile.
//! Static models are resolved by the same function, recursively; the
//! scope (one model's component set) is the only parameter that
//! changes.

use std::collections::{HashMap, HashSet};

use crate::common::{canonicalize_name, Ident, Result};
use crate::component::{
    flow_variable_ident, Component, Flow, Parameter, Stock, SumVariable, Variable,
};
use crate::{datamodel, model_err};

/// One resolved model: the annotated components in insertion order,
/// plus any resolved sub-models in declaration order.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Model {
    pub name: Ident,
    pub components: Vec<Component>,
    pub submodels: Vec<Model>,
}

impl Model {
    pub fn get(&self, ident: &str) -> Option<&Component> {
        self.components.iter().find(|c| c.ident() == ident)
    }

    pub fn stocks(&self) -> impl Iterator<Item = &Stock> {
        self.components.iter().filter_map(|c| c.as_stock())
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.components.iter().filter_map(|c| c.as_flow())
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.components.iter().filter_map(|c| c.as_parameter())
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.components.iter().filter_map(|c| match c {
            Component::Variable(var) => Some(var),
            _ => None,
        })
    }

    pub fn sum_variables(&self) -> impl Iterator<Item = &SumVariable> {
        self.components.iter().filter_map(|c| c.as_sum_variable())
    }

    /// This model followed by its sub-models, depth-first in
    /// declaration order. Index 0 is always the outer model.
    pub fn all_models(&self) -> Vec<&Model> {
        let mut result = vec![self];
        for sub in &self.submodels {
            result.extend(sub.all_models());
        }
        result
    }

    /// True if `ident` names a component of this model, including the
    /// associated variables synthesized for flows.
    pub fn contains(&self, ident: &str) -> bool {
        self.components
            .iter()
            .any(|c| c.ident() == ident || matches!(c, Component::Flow(f) if f.variable.ident == ident))
    }
}

/// Resolve one scope's raw elements into a [`Model`].
pub fn resolve_model(
    name: &str,
    components: &[datamodel::Component],
    static_models: &[datamodel::StaticModel],
) -> Result<Model> {
    let scope = Scope::new(components)?;

    let mut resolved: Vec<Component> = Vec::with_capacity(components.len());
    for raw in components {
        match raw {
            datamodel::Component::Stock(stock) => {
                resolved.push(Component::Stock(Stock {
                    ident: canonicalize_name(&stock.name),
                    initial_equation: stock.initial_equation.clone(),
                    inflows: vec![],
                    outflows: vec![],
                    depended_parameters: vec![],
                    contributing_variables: vec![],
                    contributing_sum_variables: vec![],
                }));
            }
            datamodel::Component::Flow(flow) => {
                let ident = canonicalize_name(&flow.name);
                let from = scope.stock_name(&flow.from)?;
                let to = scope.stock_name(&flow.to)?;
                resolved.push(Component::Flow(Flow {
                    variable: Variable {
                        ident: flow_variable_ident(&ident),
                        equation: flow.equation.clone(),
                        depends_on_stocks: vec![],
                        depends_on_sum_variables: vec![],
                    },
                    ident,
                    from,
                    to,
                    equation: flow.equation.clone(),
                    depends_on_stocks: vec![],
                    depends_on_sum_variables: vec![],
                }));
            }
            datamodel::Component::Parameter(param) => {
                resolved.push(Component::Parameter(Parameter {
                    ident: canonicalize_name(&param.name),
                    equation: param.equation.clone(),
                }));
            }
            datamodel::Component::Variable(var) => {
                resolved.push(Component::Variable(Variable {
                    ident: canonicalize_name(&var.name),
                    equation: var.equation.clone(),
                    depends_on_stocks: vec![],
                    depends_on_sum_variables: vec![],
                }));
            }
            datamodel::Component::SumVariable(sv) => {
                resolved.push(Component::SumVariable(SumVariable {
                    ident: canonicalize_name(&sv.name),
                    contributing_stocks: vec![],
                }));
            }
            datamodel::Component::Connection(_) => {}
        }
    }

    reject_duplicate_names(name, &resolved)?;

    // in/outflow annotation, in flow declaration order
    let flow_endpoints: Vec<(Ident, Ident, Ident)> = resolved
        .iter()
        .filter_map(|c| c.as_flow())
        .map(|f| (f.ident.clone(), f.from.clone(), f.to.clone()))
        .collect();
    for (flow, from, to) in flow_endpoints {
        if let Some(Component::Stock(stock)) = lookup_mut(&mut resolved, &from) {
            stock.outflows.push(flow.clone());
        }
        if let Some(Component::Stock(stock)) = lookup_mut(&mut resolved, &to) {
            stock.inflows.push(flow);
        }
    }

    // connection annotation, in connection declaration order
    for raw in components {
        let conn = match raw {
            datamodel::Component::Connection(conn) => conn,
            _ => continue,
        };
        let from = scope.endpoint(&conn.from)?;
        let to = scope.endpoint(&conn.to)?;
        annotate_connection(&mut resolved, from, to);
    }

    // the associated variable mirrors its flow's dependency sets
    for c in resolved.iter_mut() {
        if let Component::Flow(flow) = c {
            flow.variable.depends_on_stocks = flow.depends_on_stocks.clone();
            flow.variable.depends_on_sum_variables = flow.depends_on_sum_variables.clone();
        }
    }

    let submodels = static_models
        .iter()
        .map(|m| resolve_model(&m.name, &m.components, &m.static_models))
        .collect::<Result<Vec<Model>>>()?;

    Ok(Model {
        name: canonicalize_name(name),
        components: resolved,
        submodels,
    })
}

/// An endpoint of a raw Connection, resolved to a kind and symbol name.
#[derive(Clone, PartialEq, Eq, Debug)]
enum Endpoint {
    Stock(Ident),
    Flow(Ident),
    Parameter(Ident),
    Variable(Ident),
    SumVariable(Ident),
}

struct Scope<'a> {
    by_id: HashMap<&'a str, &'a datamodel::Component>,
}

impl<'a> Scope<'a> {
    fn new(components: &'a [datamodel::Component]) -> Result<Scope<'a>> {
        let mut by_id: HashMap<&str, &datamodel::Component> = HashMap::new();
        for c in components {
            if by_id.insert(c.get_id(), c).is_some() {
                return model_err!(DuplicateName, format!("duplicate id '{}'", c.get_id()));
            }
        }
        Ok(Scope { by_id })
    }

    fn get(&self, id: &str) -> Result<&'a datamodel::Component> {
        match self.by_id.get(id) {
            Some(c) => Ok(*c),
            None => model_err!(DoesNotExist, id.to_owned()),
        }
    }

    /// A flow endpoint: must exist and must be a stock.
    fn stock_name(&self, id: &str) -> Result<Ident> {
        match self.get(id)? {
            datamodel::Component::Stock(stock) => Ok(canonicalize_name(&stock.name)),
            other => model_err!(
                BadFlowEndpoint,
                format!("'{}' is not a stock", other.get_id())
            ),
        }
    }

    fn endpoint(&self, id: &str) -> Result<Endpoint> {
        let endpoint = match self.get(id)? {
            datamodel::Component::Stock(stock) => Endpoint::Stock(canonicalize_name(&stock.name)),
            datamodel::Component::Flow(flow) => Endpoint::Flow(canonicalize_name(&flow.name)),
            datamodel::Component::Parameter(param) => {
                Endpoint::Parameter(canonicalize_name(&param.name))
            }
            datamodel::Component::Variable(var) => {
                Endpoint::Variable(canonicalize_name(&var.name))
            }
            datamodel::Component::SumVariable(sv) => {
                Endpoint::SumVariable(canonicalize_name(&sv.name))
            }
            datamodel::Component::Connection(conn) => {
                return model_err!(
                    DoesNotExist,
                    format!("connection '{}' used as an endpoint", conn.id)
                );
            }
        };
        Ok(endpoint)
    }
}

fn lookup_mut<'a>(components: &'a mut [Component], ident: &str) -> Option<&'a mut Component> {
    components.iter_mut().find(|c| c.ident() == ident)
}

/// Record the dependency a single Connection declares. Kind pairs with
/// no resolver meaning (a parameter wired straight into a flow, say)
/// validate their endpoints and produce no record.
fn annotate_connection(components: &mut [Component], from: Endpoint, to: Endpoint) {
    match (from, to) {
        (Endpoint::Parameter(param), Endpoint::Stock(stock)) => {
            if let Some(Component::Stock(stock)) = lookup_mut(components, &stock) {
                stock.depended_parameters.push(param);
            }
        }
        (Endpoint::Stock(stock), Endpoint::Variable(var)) => {
            if let Some(Component::Stock(stock)) = lookup_mut(components, &stock) {
                stock.contributing_variables.push(var.clone());
            }
            if let Some(Component::Variable(var)) = lookup_mut(components, &var) {
                var.depends_on_stocks.push(stock);
            }
        }
        (Endpoint::Stock(stock), Endpoint::SumVariable(sv)) => {
            if let Some(Component::Stock(stock)) = lookup_mut(components, &stock) {
                stock.contributing_sum_variables.push(sv.clone());
            }
            if let Some(Component::SumVariable(sv)) = lookup_mut(components, &sv) {
                sv.contributing_stocks.push(stock);
            }
        }
        (Endpoint::Stock(stock), Endpoint::Flow(flow)) => {
            if let Some(Component::Stock(stock)) = lookup_mut(components, &stock) {
                stock
                    .contributing_variables
                    .push(flow_variable_ident(&flow));
            }
            if let Some(Component::Flow(flow)) = lookup_mut(components, &flow) {
                flow.depends_on_stocks.push(stock);
            }
        }
        (Endpoint::SumVariable(sv), Endpoint::Flow(flow)) => {
            if let Some(Component::Flow(flow)) = lookup_mut(components, &flow) {
                flow.depends_on_sum_variables.push(sv);
            }
        }
        (Endpoint::SumVariable(sv), Endpoint::Variable(var)) => {
            if let Some(Component::Variable(var)) = lookup_mut(components, &var) {
                var.depends_on_sum_variables.push(sv);
            }
        }
        _ => {}
    }
}

fn reject_duplicate_names(model: &str, components: &[Component]) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();
    for c in components {
        if !seen.insert(c.ident()) {
            return model_err!(
                DuplicateName,
                format!("'{}' in model '{}'", c.ident(), model)
            );
        }
        if let Component::Flow(flow) = c {
            if !seen.insert(&flow.variable.ident) {
                return model_err!(
                    DuplicateName,
                    format!("'{}' in model '{}'", flow.variable.ident, model)
                );
            }
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::testutils::*;
    use super::*;
    use crate::common::ErrorCode;

    #[test]
    fn test_flow_endpoints_annotate_stocks() {
        let raw = vec![
            stock("0", "S", "100.0"),
            stock("1", "I", "1.0"),
            flow("2", "infection", "0", "1", "0.3"),
        ];
        let model = resolve_model("main", &raw, &[]).unwrap();

        let s = model.get("S").unwrap().as_stock().unwrap();
        assert_eq!(s.outflows, vec!["infection"]);
        assert!(s.inflows.is_empty());

        let i = model.get("I").unwrap().as_stock().unwrap();
        assert_eq!(i.inflows, vec!["infection"]);
        assert!(i.outflows.is_empty());

        let f = model.get("infection").unwrap().as_flow().unwrap();
        assert_eq!(f.from, "S");
        assert_eq!(f.to, "I");
        assert_eq!(f.variable.ident, "var_infection");
        assert_eq!(f.variable.equation, "0.3");
    }

    #[test]
    fn test_each_connection_kind_pair() {
        let raw = vec![
            stock("0", "S", "100.0"),
            stock("1", "I", "1.0"),
            flow("2", "infection", "0", "1", "0.3"),
            param("3", "beta", "0.8"),
            var("4", "prevalence", "I"),
            sum_var("5", "N"),
            conn("c0", "3", "0"), // parameter -> stock
            conn("c1", "1", "4"), // stock -> variable
            conn("c2", "0", "5"), // stock -> sum variable
            conn("c3", "1", "5"), // stock -> sum variable
            conn("c4", "0", "2"), // stock -> flow
            conn("c5", "5", "2"), // sum variable -> flow
            conn("c6", "5", "4"), // sum variable -> variable
        ];
        let model = resolve_model("main", &raw, &[]).unwrap();

        let s = model.get("S").unwrap().as_stock().unwrap();
        assert_eq!(s.depended_parameters, vec!["beta"]);
        assert_eq!(s.contributing_sum_variables, vec!["N"]);
        assert_eq!(s.contributing_variables, vec!["var_infection"]);

        let i = model.get("I").unwrap().as_stock().unwrap();
        assert_eq!(i.contributing_variables, vec!["prevalence"]);
        assert_eq!(i.contributing_sum_variables, vec!["N"]);

        let v = match model.get("prevalence").unwrap() {
            Component::Variable(v) => v,
            other => panic!("expected variable, got {other:?}"),
        };
        assert_eq!(v.depends_on_stocks, vec!["I"]);
        assert_eq!(v.depends_on_sum_variables, vec!["N"]);

        let n = model.get("N").unwrap().as_sum_variable().unwrap();
        assert_eq!(n.contributing_stocks, vec!["S", "I"]);

        let f = model.get("infection").unwrap().as_flow().unwrap();
        assert_eq!(f.depends_on_stocks, vec!["S"]);
        assert_eq!(f.depends_on_sum_variables, vec!["N"]);
        // the associated variable carries the same dependency sets
        assert_eq!(f.variable.depends_on_stocks, vec!["S"]);
        assert_eq!(f.variable.depends_on_sum_variables, vec!["N"]);
    }

    #[test]
    fn test_unlisted_kind_pair_produces_no_record() {
        let raw = vec![
            stock("0", "S", "100.0"),
            stock("1", "I", "1.0"),
            flow("2", "infection", "0", "1", "beta"),
            param("3", "beta", "0.8"),
            conn("c0", "3", "2"), // parameter -> flow: validated, unrecorded
        ];
        let model = resolve_model("main", &raw, &[]).unwrap();
        let f = model.get("infection").unwrap().as_flow().unwrap();
        assert!(f.depends_on_stocks.is_empty());
        assert!(f.depends_on_sum_variables.is_empty());
    }

    #[test]
    fn test_missing_connection_endpoint_is_fatal() {
        let raw = vec![stock("0", "S", "100.0"), conn("c0", "0", "99")];
        let err = resolve_model("main", &raw, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DoesNotExist);
        assert_eq!(err.get_details().unwrap(), "99");
    }

    #[test]
    fn test_missing_flow_endpoint_is_fatal() {
        let raw = vec![stock("0", "S", "100.0"), flow("1", "out", "0", "42", "1.0")];
        let err = resolve_model("main", &raw, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DoesNotExist);
        assert_eq!(err.get_details().unwrap(), "42");
    }

    #[test]
    fn test_flow_endpoint_must_be_stock() {
        let raw = vec![
            stock("0", "S", "100.0"),
            param("1", "beta", "0.8"),
            flow("2", "out", "0", "1", "1.0"),
        ];
        let err = resolve_model("main", &raw, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::BadFlowEndpoint);
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let raw = vec![stock("0", "S", "100.0"), param("1", "S", "0.8")];
        let err = resolve_model("main", &raw, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateName);
    }

    #[test]
    fn test_flow_variable_name_collision_is_rejected() {
        let raw = vec![
            stock("0", "S", "100.0"),
            stock("1", "I", "1.0"),
            flow("2", "birth", "0", "1", "1.0"),
            var("3", "var_birth", "2.0"),
        ];
        let err = resolve_model("main", &raw, &[]).unwrap_err();
        assert_eq!(err.code, ErrorCode::DuplicateName);
    }

    #[test]
    fn test_static_models_resolve_recursively() {
        let raw_outer = vec![stock("0", "S", "100.0")];
        let sub = datamodel::StaticModel {
            name: "sir".to_owned(),
            components: vec![stock("0", "S", "100.0"), stock("1", "R", "0.0")],
            static_models: vec![datamodel::StaticModel {
                name: "inner".to_owned(),
                components: vec![stock("0", "V", "0.0")],
                static_models: vec![],
            }],
        };
        let model = resolve_model("main", &raw_outer, std::slice::from_ref(&sub)).unwrap();

        assert_eq!(model.submodels.len(), 1);
        assert_eq!(model.submodels[0].name, "sir");
        assert_eq!(model.submodels[0].submodels[0].name, "inner");

        let all = model.all_models();
        let names: Vec<&str> = all.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["main", "sir", "inner"]);
    }

    #[test]
    fn test_names_are_canonicalized() {
        let raw = vec![stock("0", "  total population ", "10.0")];
        let model = resolve_model("main", &raw, &[]).unwrap();
        assert!(model.get("total_population").is_some());
    }

    #[test]
    fn test_absent_lists_resolve_to_empty() {
        let raw = vec![stock("0", "S", "100.0")];
        let model = resolve_model("main", &raw, &[]).unwrap();
        let s = model.get("S").unwrap().as_stock().unwrap();
        assert!(s.inflows.is_empty());
        assert!(s.outflows.is_empty());
        assert!(s.depended_parameters.is_empty());
        assert!(s.contributing_variables.is_empty());
        assert!(s.contributing_sum_variables.is_empty());
    }
}
