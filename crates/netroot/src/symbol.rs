use crate::HashMap;
use crate::module::ModuleId;
use crate::range::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolKind {
    /// Instance placeholder. `module` is `None` for primitive cells.
    Instance {
        type_name: String,
        module: Option<ModuleId>,
    },
    Net {
        is_port: bool,
    },
}

/// One flattened entity of a module's symbol table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub kind: SymbolKind,
    /// Present only on bus-name entries; per-bit entries are scalar symbols.
    pub bus: Option<Range>,
    /// Signal in the same module that drives this one. `None` means the driver
    /// lives below an instance pin; a self reference is a terminal.
    pub driver: Option<String>,
}

impl Symbol {
    fn net(is_port: bool, bus: Option<Range>) -> Self {
        Self {
            kind: SymbolKind::Net { is_port },
            bus,
            driver: None,
        }
    }

    pub fn is_port(&self) -> bool {
        matches!(self.kind, SymbolKind::Net { is_port: true })
    }

    pub fn is_bus(&self) -> bool {
        self.bus.is_some()
    }

    pub fn is_instance(&self) -> bool {
        matches!(self.kind, SymbolKind::Instance { .. })
    }

    /// Submodule of an instance symbol; `None` for nets and primitive cells.
    pub fn instance_module(&self) -> Option<ModuleId> {
        match self.kind {
            SymbolKind::Instance { module, .. } => module,
            SymbolKind::Net { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: HashMap<String, Symbol>,
}

impl SymbolTable {
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.symbols.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.symbols.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Symbol)> {
        self.symbols.iter()
    }

    pub(crate) fn add_instance(&mut self, name: &str, type_name: &str, module: Option<ModuleId>) {
        self.symbols.insert(
            name.to_string(),
            Symbol {
                kind: SymbolKind::Instance {
                    type_name: type_name.to_string(),
                    module,
                },
                bus: None,
                driver: None,
            },
        );
    }

    /// Ensures a scalar net exists. An existing entry keeps its driver edge and
    /// bus metadata; the port flag is only ever raised.
    pub(crate) fn add_net(&mut self, name: &str, is_port: bool) {
        let symbol = self
            .symbols
            .entry(name.to_string())
            .or_insert_with(|| Symbol::net(is_port, None));
        if let SymbolKind::Net { is_port: existing } = &mut symbol.kind {
            *existing |= is_port;
        }
    }

    /// Inserts a bus-name entry. A name already present is left untouched.
    pub(crate) fn add_bus(&mut self, name: &str, is_port: bool, range: Range) {
        self.symbols
            .entry(name.to_string())
            .or_insert_with(|| Symbol::net(is_port, Some(range)));
    }

    /// Records `driven <- driver`, creating both nets when missing.
    pub(crate) fn record_driver_edge(&mut self, driver: &str, driven: &str) {
        self.add_net(driver, false);
        self.add_net(driven, false);
        if let Some(symbol) = self.symbols.get_mut(driven) {
            symbol.driver = Some(driver.to_string());
        }
    }
}
