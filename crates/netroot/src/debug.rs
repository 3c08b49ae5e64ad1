//! Text dumps of symbol tables for tooling and debugging.

use itertools::Itertools;

use crate::module::Module;
use crate::registry::ModuleRegistry;
use crate::symbol::{Symbol, SymbolKind};

/// Format one module's symbol table, sorted by key.
pub fn format_symbol_table(module: &Module) -> String {
    let mut output = format!("module {}\n", module.name());
    for (name, symbol) in module
        .symbols()
        .iter()
        .sorted_by(|(a, _), (b, _)| a.cmp(b))
    {
        output.push_str(&format!("  {name}: {}\n", describe(symbol)));
    }
    output
}

/// Format every module built so far, in build order.
pub fn format_registry(registry: &ModuleRegistry<'_>) -> String {
    registry
        .modules()
        .iter()
        .map(format_symbol_table)
        .join("\n")
}

fn describe(symbol: &Symbol) -> String {
    let mut parts = Vec::new();
    match &symbol.kind {
        SymbolKind::Instance { type_name, module } => {
            parts.push(format!("inst {type_name}"));
            if module.is_none() {
                parts.push("(cell)".to_string());
            }
        }
        SymbolKind::Net { is_port } => {
            parts.push(if *is_port { "port" } else { "net" }.to_string());
        }
    }
    if let Some(range) = symbol.bus {
        parts.push(format!("bus{range}"));
    }
    if let Some(driver) = &symbol.driver {
        parts.push(format!("<- {driver}"));
    }
    parts.join(" ")
}

impl ModuleRegistry<'_> {
    /// Symbol table dump of a built module type, if it has been built.
    pub fn format_module(&self, type_name: &str) -> Option<String> {
        self.module_by_name(type_name).map(format_symbol_table)
    }

    pub fn dump(&self) -> String {
        format_registry(self)
    }
}
