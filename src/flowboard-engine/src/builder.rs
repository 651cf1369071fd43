// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! The boundary surface a transport layer calls.
//!
//! Fetching snapshots from the realtime store and forwarding the
//! generated program to a solver process are collaborator concerns;
//! this module only defines the seam between them and the compiler.

use crate::common::{Result, SyntaxConfig};
use crate::compiler;
use crate::datamodel;
use crate::project::Project;

/// Read access to diagram snapshots, implemented by the data layer over
/// the external realtime store.
pub trait ComponentStore {
    fn get_components(&self, session_id: &str) -> Result<datamodel::Diagram>;
}

/// Compile one snapshot into a simulation program under the default
/// target-syntax conventions.
pub fn build_program(diagram: datamodel::Diagram) -> Result<String> {
    build_program_with(diagram, &SyntaxConfig::default())
}

pub fn build_program_with(diagram: datamodel::Diagram, cfg: &SyntaxConfig) -> Result<String> {
    let project = Project::new(diagram)?;
    compiler::generate(&project, cfg)
}

/// The request-handler entry point: fetch a session's current diagram
/// and compile it. The caller decides whether to return the text or
/// hand it to a process-execution layer.
pub fn compile_session(store: &dyn ComponentStore, session_id: &str) -> Result<String> {
    let diagram = store.get_components(session_id)?;
    build_program(diagram)
}
