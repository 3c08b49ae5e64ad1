//! Pre-parsed netlist syntax consumed by the symbol-table builder.
//!
//! The structures mirror what a structural Verilog reader hands over after
//! parsing: module headers, declarations, instantiations and continuous
//! assignments. Nothing here is interpreted; the builder gives it meaning.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
    Inout,
    Internal,
}

impl Direction {
    pub fn is_input(self) -> bool {
        self == Direction::Input
    }

    pub fn is_internal(self) -> bool {
        self == Direction::Internal
    }
}

/// Declared bus extent `[from:to]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusExtent {
    pub from: i64,
    pub to: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    pub name: String,
    #[serde(default = "internal")]
    pub direction: Direction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bus: Option<BusExtent>,
}

fn internal() -> Direction {
    Direction::Internal
}

impl Declaration {
    pub fn wire(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: Direction::Internal,
            bus: None,
        }
    }

    pub fn port(name: impl Into<String>, direction: Direction) -> Self {
        Self {
            name: name.into(),
            direction,
            bus: None,
        }
    }

    pub fn with_bus(mut self, from: i64, to: i64) -> Self {
        self.bus = Some(BusExtent { from, to });
        self
    }

    pub fn is_bus(&self) -> bool {
        self.bus.is_some()
    }
}

/// A named pin connection of a module (or library cell) instantiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PinConnection {
    /// `.port(net)` where `net` is a single name, possibly a whole bus.
    Scalar { port: String, net: String },
    /// `.port({a, b[1], c})` already expanded by the reader into per-bit names.
    Bits { port: String, nets: Vec<String> },
}

impl PinConnection {
    pub fn port(&self) -> &str {
        match self {
            PinConnection::Scalar { port, .. } | PinConnection::Bits { port, .. } => port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Statement {
    ModuleInst {
        instance: String,
        module: String,
        #[serde(default)]
        pins: Vec<PinConnection>,
    },
    /// Primitive cell instantiation; `nets` is indexed by library pin index.
    CellInst {
        instance: String,
        cell: String,
        #[serde(default)]
        nets: Vec<Option<String>>,
    },
    Declaration(Declaration),
    Assign {
        lhs: String,
        rhs: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleDecl {
    pub name: String,
    #[serde(default)]
    pub ports: Vec<String>,
    #[serde(default)]
    pub statements: Vec<Statement>,
}

impl ModuleDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
            statements: Vec::new(),
        }
    }

    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations().find(|d| d.name == name)
    }

    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.statements.iter().filter_map(|s| match s {
            Statement::Declaration(d) => Some(d),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Netlist {
    #[serde(default)]
    pub modules: Vec<ModuleDecl>,
}

impl Netlist {
    pub fn module(&self, name: &str) -> Option<&ModuleDecl> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
