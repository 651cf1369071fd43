// Copyright 2026 The Flowboard Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! JSON wire format for diagram snapshots.
//!
//! The realtime store hands us an unordered collection of raw elements
//! `{id, type, data}`, optionally grouped under `staticModels` when the
//! session composes independently authored models. These mirror types
//! exist so the wire shape can evolve separately from
//! [`crate::datamodel`].
//!
//! # Example
//! ```no_run
//! use flowboard_engine::json;
//!
//! let json_str = r#"{"name": "session", "components": []}"#;
//! let diagram: json::Diagram = serde_json::from_str(json_str)?;
//! let datamodel: flowboard_engine::datamodel::Diagram = diagram.into();
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};

use crate::common::{Error, ErrorCode, ErrorKind};
use crate::datamodel;

fn is_empty_vec<T>(val: &[T]) -> bool {
    val.is_empty()
}

/// Decode one snapshot from a reader the caller already opened.
pub fn parse(reader: &mut dyn BufRead) -> crate::common::Result<datamodel::Diagram> {
    match serde_json::from_reader::<_, Diagram>(reader) {
        Ok(diagram) => Ok(diagram.into()),
        Err(err) => Err(Error::new(
            ErrorKind::Model,
            ErrorCode::Generic,
            Some(format!("{err}")),
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stock {
    pub name: String,
    #[serde(default)]
    pub initial_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub name: String,
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub equation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SumVariable {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ComponentData {
    Stock(Stock),
    Flow(Flow),
    Parameter(Parameter),
    Variable(Variable),
    SumVariable(SumVariable),
    Connection(Connection),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    pub id: String,
    #[serde(flatten)]
    pub data: ComponentData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticModel {
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(skip_serializing_if = "is_empty_vec", default)]
    pub static_models: Vec<StaticModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identification {
    pub component: String,
    pub first: String,
    pub second: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Diagram {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub components: Vec<Component>,
    #[serde(skip_serializing_if = "is_empty_vec", default)]
    pub static_models: Vec<StaticModel>,
    #[serde(skip_serializing_if = "is_empty_vec", default)]
    pub identifications: Vec<Identification>,
}

impl From<Component> for datamodel::Component {
    fn from(c: Component) -> Self {
        let id = c.id;
        match c.data {
            ComponentData::Stock(stock) => datamodel::Component::Stock(datamodel::Stock {
                id,
                name: stock.name,
                initial_equation: stock.initial_value,
            }),
            ComponentData::Flow(flow) => datamodel::Component::Flow(datamodel::Flow {
                id,
                name: flow.name,
                from: flow.from,
                to: flow.to,
                equation: flow.equation,
            }),
            ComponentData::Parameter(param) => {
                datamodel::Component::Parameter(datamodel::Parameter {
                    id,
                    name: param.name,
                    equation: param.value,
                })
            }
            ComponentData::Variable(var) => datamodel::Component::Variable(datamodel::Variable {
                id,
                name: var.name,
                equation: var.value,
            }),
            ComponentData::SumVariable(sv) => {
                datamodel::Component::SumVariable(datamodel::SumVariable { id, name: sv.name })
            }
            ComponentData::Connection(conn) => {
                datamodel::Component::Connection(datamodel::Connection {
                    id,
                    from: conn.from,
                    to: conn.to,
                })
            }
        }
    }
}

impl From<datamodel::Component> for Component {
    fn from(c: datamodel::Component) -> Self {
        match c {
            datamodel::Component::Stock(stock) => Component {
                id: stock.id,
                data: ComponentData::Stock(Stock {
                    name: stock.name,
                    initial_value: stock.initial_equation,
                }),
            },
            datamodel::Component::Flow(flow) => Component {
                id: flow.id,
                data: ComponentData::Flow(Flow {
                    name: flow.name,
                    from: flow.from,
                    to: flow.to,
                    equation: flow.equation,
                }),
            },
            datamodel::Component::Parameter(param) => Component {
                id: param.id,
                data: ComponentData::Parameter(Parameter {
                    name: param.name,
                    value: param.equation,
                }),
            },
            datamodel::Component::Variable(var) => Component {
                id: var.id,
                data: ComponentData::Variable(Variable {
                    name: var.name,
                    value: var.equation,
                }),
            },
            datamodel::Component::SumVariable(sv) => Component {
                id: sv.id,
                data: ComponentData::SumVariable(SumVariable { name: sv.name }),
            },
            datamodel::Component::Connection(conn) => Component {
                id: conn.id,
                data: ComponentData::Connection(Connection {
                    from: conn.from,
                    to: conn.to,
                }),
            },
        }
    }
}

impl From<StaticModel> for datamodel::StaticModel {
    fn from(m: StaticModel) -> Self {
        datamodel::StaticModel {
            name: m.name,
            components: m.components.into_iter().map(|c| c.into()).collect(),
            static_models: m.static_models.into_iter().map(|m| m.into()).collect(),
        }
    }
}

impl From<datamodel::StaticModel> for StaticModel {
    fn from(m: datamodel::StaticModel) -> Self {
        StaticModel {
            name: m.name,
            components: m.components.into_iter().map(|c| c.into()).collect(),
            static_models: m.static_models.into_iter().map(|m| m.into()).collect(),
        }
    }
}

impl From<Diagram> for datamodel::Diagram {
    fn from(d: Diagram) -> Self {
        datamodel::Diagram {
            name: d.name,
            components: d.components.into_iter().map(|c| c.into()).collect(),
            static_models: d.static_models.into_iter().map(|m| m.into()).collect(),
            identifications: d
                .identifications
                .into_iter()
                .map(|i| datamodel::Identification {
                    component: i.component,
                    first: i.first,
                    second: i.second,
                })
                .collect(),
        }
    }
}

impl From<datamodel::Diagram> for Diagram {
    fn from(d: datamodel::Diagram) -> Self {
        Diagram {
            name: d.name,
            components: d.components.into_iter().map(|c| c.into()).collect(),
            static_models: d.static_models.into_iter().map(|m| m.into()).collect(),
            identifications: d
                .identifications
                .into_iter()
                .map(|i| Identification {
                    component: i.component,
                    first: i.first,
                    second: i.second,
                })
                .collect(),
        }
    }
}
