// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The symbol qualifier: rewrites one free-text expression's name
//! tokens into disambiguated references against a resolved catalog.
//!
//! The output is rebuilt from the source's token spans, so operators,
//! parentheses, numeric literals and the author's spacing pass through
//! verbatim; only identifier spans are replaced. Because rewriting is
//! span-based there is no substring matching, and an identifier that
//! contains a shorter identifier is never mangled.
//!
//! Qualification is deterministic but not idempotent on its own output
//! (a qualified reference like `u.S` lexes as one unresolvable symbol),
//! so each raw expression is qualified exactly once, by the generator.

use std::fmt::Write;

use crate::common::{Result, SyntaxConfig};
use crate::component::Component;
use crate::model::Model;
use crate::token::{Lexer, Token};
use crate::var_err;

enum Rewrite<'a> {
    /// a memoized read of the state vector (stock, variable, or a flow
    /// through its associated variable)
    State(&'a str),
    Param(&'a str),
    /// re-evaluated from contributing stocks every integration step
    Sum(&'a str),
}

fn lookup<'a>(catalog: &'a Model, symbol: &str) -> Option<Rewrite<'a>> {
    for c in &catalog.components {
        match c {
            Component::Stock(stock) if stock.ident == symbol => {
                return Some(Rewrite::State(&stock.ident));
            }
            Component::Variable(var) if var.ident == symbol => {
                return Some(Rewrite::State(&var.ident));
            }
            Component::Flow(flow) if flow.ident == symbol || flow.variable.ident == symbol => {
                return Some(Rewrite::State(&flow.variable.ident));
            }
            Component::Parameter(param) if param.ident == symbol => {
                return Some(Rewrite::Param(&param.ident));
            }
            Component::SumVariable(sv) if sv.ident == symbol => {
                return Some(Rewrite::Sum(&sv.ident));
            }
            _ => {}
        }
    }
    None
}

/// Qualify one expression against `catalog`. Fatal if the expression
/// cannot be lexed or any identifier fails to resolve.
pub fn qualify_equation(eqn: &str, catalog: &Model, cfg: &SyntaxConfig) -> Result<String> {
    if eqn.trim().is_empty() {
        return var_err!(EmptyEquation, format!("in model '{}'", catalog.name));
    }

    let mut out = String::with_capacity(eqn.len() * 2);
    let mut copied_to = 0;

    for spanned in Lexer::new(eqn) {
        let (start, tok, end) = match spanned {
            Ok(spanned) => spanned,
            Err(err) => {
                let end = err.end.min(eqn.len());
                return var_err!(
                    UnrecognizedToken,
                    format!("'{}' in \"{}\"", &eqn[err.start..end], eqn)
                );
            }
        };

        let symbol = match tok {
            Token::Ident(symbol) => symbol,
            _ => continue,
        };

        out.push_str(&eqn[copied_to..start]);
        match lookup(catalog, symbol) {
            Some(Rewrite::State(name)) => {
                let _ = write!(out, "{}.{}", cfg.state, name);
            }
            Some(Rewrite::Param(name)) => {
                let _ = write!(out, "{}.{}", cfg.params, name);
            }
            Some(Rewrite::Sum(name)) => {
                let _ = write!(
                    out,
                    "{}.{}({},{})",
                    cfg.sum_state, name, cfg.state, cfg.time
                );
            }
            None => {
                return var_err!(UnknownSymbol, format!("'{symbol}' in \"{eqn}\""));
            }
        }
        copied_to = end;
    }

    out.push_str(&eqn[copied_to..]);
    Ok(out)
}
