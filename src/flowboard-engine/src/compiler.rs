// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The code generator: resolved project in, one ordered solver program
//! out.
//!
//! The emitted text is Julia against the StockFlow/Catlab stack:
//! construction, feet, a relation, opens, a composition, apex
//! extraction, labelled parameter and initial-condition vectors, an
//! ODEProblem, solve, plot. Statement order is the contract; the text
//! is otherwise whitespace-insensitive to its consumer. Every generated
//! identifier comes from [`SyntaxConfig`], and all iteration follows
//! insertion/declaration order, so identical input yields byte-identical
//! output.

use std::fmt::Write;

use crate::common::{Ident, Result, SyntaxConfig};
use crate::compose::Composition;
use crate::model::Model;
use crate::project::Project;
use crate::qualify::qualify_equation;
use crate::{gen_err, var_err};

const IMPORTS: &[&str] = &[
    "using StockFlow",
    "using Catlab",
    "using Catlab.CategoricalAlgebra",
    "using LabelledArrays",
    "using OrdinaryDiffEq",
    "using Plots",
];

const START_TIME: &str = "startTime";
const STOP_TIME: &str = "stopTime";

/// Generate the complete simulation program for `project`.
pub fn generate(project: &Project, cfg: &SyntaxConfig) -> Result<String> {
    let models = project.models();
    let (start, stop) = validate(&models)?;

    let mut out = String::new();

    for import in IMPORTS {
        out.push_str(import);
        out.push('\n');
    }
    out.push('\n');

    for model in &models {
        emit_construction(&mut out, model, cfg)?;
    }

    emit_composition(&mut out, &models, &project.composition, cfg);

    let _ = writeln!(out, "{} = apex({})", cfg.apex, cfg.composed);

    emit_parameters(&mut out, &models, cfg)?;
    emit_initial_conditions(&mut out, &models, cfg)?;

    let _ = writeln!(
        out,
        "{} = ODEProblem(vectorfield({}), {}, ({}, {}), {})",
        cfg.problem, cfg.apex, cfg.initial, start, stop, cfg.params
    );
    let _ = writeln!(
        out,
        "{} = solve({}, {}, {})",
        cfg.solution, cfg.problem, cfg.integrator, cfg.solve_opts
    );
    let _ = writeln!(out, "plot({})", cfg.solution);

    Ok(out)
}

/// Pre-generation validation; returns the (startTime, stopTime) value
/// expressions. Fatal before any emission work.
fn validate<'a>(models: &[&'a Model]) -> Result<(&'a str, &'a str)> {
    if models.iter().all(|m| m.components.is_empty()) {
        return gen_err!(EmptyDiagram);
    }

    let find_param = |name: &str| {
        models
            .iter()
            .flat_map(|m| m.parameters())
            .find(|p| p.ident == name)
            .map(|p| p.equation.as_str())
    };
    let start = match find_param(START_TIME) {
        Some(start) => start,
        None => return gen_err!(BadSimSpecs, format!("missing '{START_TIME}' parameter")),
    };
    let stop = match find_param(STOP_TIME) {
        Some(stop) => stop,
        None => return gen_err!(BadSimSpecs, format!("missing '{STOP_TIME}' parameter")),
    };

    if !models.iter().any(|m| m.stocks().next().is_some()) {
        return gen_err!(NoStocks);
    }

    Ok((start, stop))
}

fn model_ident(model: &Model, cfg: &SyntaxConfig) -> Ident {
    format!("{}{}", cfg.model_prefix, model.name)
}

fn open_ident(model: &Model, cfg: &SyntaxConfig) -> Ident {
    format!("{}{}", cfg.open_prefix, model.name)
}

/// `()` when empty, `:a` for one name, `(:a, :b)` otherwise.
fn symbol_slot(names: &[Ident], empty: &str) -> String {
    match names {
        [] => empty.to_owned(),
        [name] => format!(":{name}"),
        names => {
            let inner: Vec<String> = names.iter().map(|n| format!(":{n}")).collect();
            format!("({})", inner.join(", "))
        }
    }
}

/// One bucket line of a construction statement: `(a, b),` with the
/// Julia one-tuple trailing comma, or `(),` when the bucket is empty.
fn bucket_line(entries: &[String]) -> String {
    match entries {
        [] => "    (),\n".to_owned(),
        [entry] => format!("    ({entry},),\n"),
        entries => format!("    ({}),\n", entries.join(", ")),
    }
}

fn emit_construction(out: &mut String, model: &Model, cfg: &SyntaxConfig) -> Result<()> {
    let stocks: Vec<String> = model
        .stocks()
        .map(|s| {
            format!(
                ":{} => ({}, {}, {}, {})",
                s.ident,
                symbol_slot(&s.inflows, cfg.none_flow),
                symbol_slot(&s.outflows, cfg.none_flow),
                symbol_slot(&s.contributing_variables, cfg.none_var),
                symbol_slot(&s.contributing_sum_variables, cfg.none_sum),
            )
        })
        .collect();

    let flows: Vec<String> = model
        .flows()
        .map(|f| format!(":{} => :{}", f.ident, f.variable.ident))
        .collect();

    // user-authored variables first, then the flows' associated
    // variables, each set in insertion order
    let mut variables: Vec<String> = vec![];
    for var in model.variables() {
        let eqn = qualify_equation(&var.equation, model, cfg)?;
        variables.push(format!(
            ":{} => ({}, {}, {}, {}) -> {}",
            var.ident, cfg.state, cfg.sum_state, cfg.params, cfg.time, eqn
        ));
    }
    for flow in model.flows() {
        let eqn = qualify_equation(&flow.variable.equation, model, cfg)?;
        variables.push(format!(
            ":{} => ({}, {}, {}, {}) -> {}",
            flow.variable.ident, cfg.state, cfg.sum_state, cfg.params, cfg.time, eqn
        ));
    }

    let sum_variables: Vec<String> = model
        .sum_variables()
        .map(|sv| format!(":{} => {}", sv.ident, symbol_slot(&sv.contributing_stocks, "()")))
        .collect();

    let _ = writeln!(out, "{} = StockAndFlowF(", model_ident(model, cfg));
    out.push_str(&bucket_line(&stocks));
    out.push_str(&bucket_line(&flows));
    out.push_str(&bucket_line(&variables));
    out.push_str(&bucket_line(&sum_variables));
    out.push_str(")\n");

    Ok(())
}

fn emit_composition(
    out: &mut String,
    models: &[&Model],
    composition: &Composition,
    cfg: &SyntaxConfig,
) {
    // feet, in canonical order
    for foot in &composition.feet {
        let anchor = match &foot.stock {
            Some(stock) => format!(":{stock}"),
            None => "()".to_owned(),
        };
        let svs = symbol_slot(&foot.sum_variables, "()");
        let edges: Vec<String> = match &foot.stock {
            Some(stock) => foot
                .sum_variables
                .iter()
                .map(|sv| format!(":{stock} => :{sv}"))
                .collect(),
            None => vec![],
        };
        let edges = match edges.as_slice() {
            [] => "()".to_owned(),
            [edge] => edge.clone(),
            edges => format!("({})", edges.join(", ")),
        };
        let _ = writeln!(out, "{} = foot({}, {}, {})", foot.ident(cfg), anchor, svs, edges);
    }

    // the relation binds all models through their feet; with a single
    // model there is nothing to glue and the statement is omitted
    if models.len() > 1 {
        let all_feet: Vec<Ident> = composition.feet.iter().map(|f| f.ident(cfg)).collect();
        let _ = writeln!(out, "{} = @relation ({}) begin", cfg.relation, all_feet.join(", "));
        for model in models {
            let feet: Vec<Ident> = composition
                .feet_of(&model.name)
                .iter()
                .map(|&i| composition.feet[i].ident(cfg))
                .collect();
            let _ = writeln!(out, "    {}({})", model_ident(model, cfg), feet.join(", "));
        }
        out.push_str("end\n");
    }

    // one open per model, bound to its feet in canonical order
    for model in models {
        let feet: Vec<Ident> = composition
            .feet_of(&model.name)
            .iter()
            .map(|&i| composition.feet[i].ident(cfg))
            .collect();
        let _ = writeln!(
            out,
            "{} = Open({}, {})",
            open_ident(model, cfg),
            model_ident(model, cfg),
            feet.join(", ")
        );
    }

    if models.len() > 1 {
        let opens: Vec<Ident> = models.iter().map(|m| open_ident(m, cfg)).collect();
        let _ = writeln!(
            out,
            "{} = oapply({}, [{}])",
            cfg.composed,
            cfg.relation,
            opens.join(", ")
        );
    } else {
        let _ = writeln!(out, "{} = {}", cfg.composed, open_ident(models[0], cfg));
    }
}

fn emit_parameters(out: &mut String, models: &[&Model], cfg: &SyntaxConfig) -> Result<()> {
    let mut entries: Vec<String> = vec![];
    let mut seen: Vec<&str> = vec![];
    for model in models {
        for param in model.parameters() {
            if seen.contains(&param.ident.as_str()) {
                continue;
            }
            if param.equation.trim().is_empty() {
                return var_err!(EmptyEquation, format!("parameter '{}'", param.ident));
            }
            seen.push(&param.ident);
            entries.push(format!("{}={}", param.ident, param.equation));
        }
    }
    let _ = writeln!(out, "{} = LVector({})", cfg.params, entries.join(", "));
    Ok(())
}

fn emit_initial_conditions(out: &mut String, models: &[&Model], cfg: &SyntaxConfig) -> Result<()> {
    let mut entries: Vec<String> = vec![];
    let mut seen: Vec<&str> = vec![];
    for model in models {
        for stock in model.stocks() {
            if seen.contains(&stock.ident.as_str()) {
                continue;
            }
            seen.push(&stock.ident);
            let initial = qualify_equation(&stock.initial_equation, model, cfg)?;
            entries.push(format!("{}={}", stock.ident, initial));
        }
    }
    let _ = writeln!(out, "{} = LVector({})", cfg.initial, entries.join(", "));
    Ok(())
}
