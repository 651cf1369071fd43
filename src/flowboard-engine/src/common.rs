// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::{error, result};

/// A component's display name, doubling as its equation symbol.
/// Unique within one compiled scope.
pub type Ident = String;

/// Name of the outer model in a compiled scope; static models keep
/// their authored names.
pub const MAIN_MODEL: &str = "main";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError, // will never be produced
    DoesNotExist,
    DuplicateName,
    BadFlowEndpoint,
    BadIdentification,
    UnknownSymbol,
    UnrecognizedToken,
    EmptyEquation,
    EmptyDiagram,
    BadSimSpecs,
    NoStocks,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DoesNotExist => "does_not_exist",
            DuplicateName => "duplicate_name",
            BadFlowEndpoint => "bad_flow_endpoint",
            BadIdentification => "bad_identification",
            UnknownSymbol => "unknown_symbol",
            UnrecognizedToken => "unrecognized_token",
            EmptyEquation => "empty_equation",
            EmptyDiagram => "empty_diagram",
            BadSimSpecs => "bad_sim_specs",
            NoStocks => "no_stocks",
            Generic => "generic",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// a reference between diagram elements failed to resolve
    Model,
    /// a single equation is malformed or names an unknown symbol
    Variable,
    /// the resolved diagram cannot be turned into a program
    Generation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self.kind {
            ErrorKind::Model => "ModelError",
            ErrorKind::Variable => "VariableError",
            ErrorKind::Generation => "GenerationError",
        };
        match self.details {
            Some(ref details) => write!(f, "{}{{{}: {}}}", kind, self.code, details),
            None => write!(f, "{}{{{}}}", kind, self.code),
        }
    }
}

impl error::Error for Error {}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! model_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Model,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! var_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Variable,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! gen_err {
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Generation,
            ErrorCode::$code,
            Some($str),
        ))
    }};
    ($code:tt) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(ErrorKind::Generation, ErrorCode::$code, None))
    }};
}

/// Fold a display name into symbol form: trimmed, with whitespace runs
/// collapsed to a single underscore. Names are equation symbols, so they
/// must survive lexing as one identifier token.
pub fn canonicalize_name(name: &str) -> Ident {
    let name = name.trim();
    let mut result = String::with_capacity(name.len());
    let mut in_whitespace = false;

    for c in name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                result.push('_');
                in_whitespace = true;
            }
        } else {
            in_whitespace = false;
            result.push(c);
        }
    }

    result
}

/// Naming conventions of the emitted program: the state/parameter/time
/// tokens the qualifier writes, and every identifier the generator
/// invents. One immutable value threaded through both, so the target
/// syntax convention is swappable and independently testable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxConfig {
    /// state-vector token, e.g. `u` in `u.S`
    pub state: &'static str,
    /// sum-variable namespace token, e.g. `uN` in `uN.N(u,t)`
    pub sum_state: &'static str,
    /// parameter-vector token, e.g. `p` in `p.beta`; also the name of
    /// the emitted parameter-vector literal
    pub params: &'static str,
    /// time token, e.g. `t`
    pub time: &'static str,
    /// name of the emitted initial-condition vector literal
    pub initial: &'static str,
    pub model_prefix: &'static str,
    pub foot_prefix: &'static str,
    pub open_prefix: &'static str,
    pub relation: &'static str,
    pub composed: &'static str,
    pub apex: &'static str,
    pub problem: &'static str,
    pub solution: &'static str,
    pub integrator: &'static str,
    pub solve_opts: &'static str,
    /// placeholders for empty slots in a construction statement
    pub none_flow: &'static str,
    pub none_var: &'static str,
    pub none_sum: &'static str,
}

impl Default for SyntaxConfig {
    fn default() -> Self {
        SyntaxConfig {
            state: "u",
            sum_state: "uN",
            params: "p",
            time: "t",
            initial: "u0",
            model_prefix: "model_",
            foot_prefix: "foot_",
            open_prefix: "open_",
            relation: "relation",
            composed: "composed",
            apex: "apex_model",
            problem: "prob",
            solution: "sol",
            integrator: "Tsit5()",
            solve_opts: "abstol=1e-8, reltol=1e-8, saveat=0.1",
            none_flow: "F_NONE",
            none_var: "V_NONE",
            none_sum: "SV_NONE",
        }
    }
}


#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Model,
        ErrorCode::DoesNotExist,
        Some("17".to_owned()),
    );
    assert_eq!(format!("{err}"), "ModelError{does_not_exist: 17}");

    let err = Error::new(ErrorKind::Generation, ErrorCode::NoStocks, None);
    assert_eq!(format!("{err}"), "GenerationError{no_stocks}");
}
