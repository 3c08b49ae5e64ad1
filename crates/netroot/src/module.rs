use std::fmt;

use crate::netlist::Direction;
use crate::range::Range;
use crate::symbol::{Symbol, SymbolTable};

pub mod builder;
pub mod resolver;

pub use resolver::SourceCache;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(pub usize);

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// External interface entry of a module type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub direction: Direction,
    pub bus: Option<Range>,
}

impl Port {
    pub fn width(&self) -> usize {
        self.bus.map_or(1, |r| r.width())
    }
}

/// Symbol table of one module type.
///
/// Built once by [`builder::ModuleBuilder`] and never mutated afterwards; every
/// instantiation of the type shares it.
#[derive(Debug, Clone)]
pub struct Module {
    name: String,
    symbols: SymbolTable,
    ports: Vec<Port>,
}

impl Module {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn symbol(&self, key: &str) -> Option<&Symbol> {
        self.symbols.get(key)
    }

    /// Ports in port-list order, followed by directional declarations that the
    /// port list omitted.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    pub fn port(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Module type instantiated as `instance`, if it is a structural instance.
    pub fn instance_module(&self, instance: &str) -> Option<ModuleId> {
        self.symbols.get(instance).and_then(Symbol::instance_module)
    }
}
