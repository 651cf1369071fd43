// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashSet;

use crate::common::{Result, MAIN_MODEL};
use crate::compose::{resolve_composition, Composition};
use crate::model::{resolve_model, Model};
use crate::{datamodel, model_err};

/// One fully resolved compile unit: the outer model (with its resolved
/// static models) plus the composition boundary. Rebuilt from scratch
/// per compile; shares nothing with any other compile.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Project {
    pub datamodel: datamodel::Diagram,
    pub model: Model,
    pub composition: Composition,
}

impl Project {
    pub fn new(diagram: datamodel::Diagram) -> Result<Project> {
        let model = resolve_model(MAIN_MODEL, &diagram.components, &diagram.static_models)?;

        {
            let mut seen: HashSet<&str> = HashSet::new();
            for m in model.all_models() {
                if !seen.insert(m.name.as_str()) {
                    return model_err!(DuplicateName, format!("model '{}'", m.name));
                }
            }
        }

        let composition = resolve_composition(&model.all_models(), &diagram.identifications)?;

        Ok(Project {
            datamodel: diagram,
            model,
            composition,
        })
    }

    pub fn name(&self) -> &str {
        &self.datamodel.name
    }

    /// All models in declaration order, outer model first.
    pub fn models(&self) -> Vec<&Model> {
        self.model.all_models()
    }
}
