use log::{debug, trace, warn};

use crate::HashMap;
use crate::error::ResolveError;
use crate::library::Cell;
use crate::module::{Module, Port};
use crate::netlist::{Declaration, Direction, ModuleDecl, PinConnection, Statement};
use crate::range::{Range, bit_name};
use crate::registry::{ModuleRegistry, WidthPolicy};
use crate::symbol::SymbolTable;

/// Single pass over a module body that fills its symbol table and records
/// one hierarchy level of driver edges.
pub struct ModuleBuilder<'r, 'a> {
    registry: &'r mut ModuleRegistry<'a>,
    decl: &'a ModuleDecl,
    declarations: HashMap<&'a str, &'a Declaration>,
    symbols: SymbolTable,
}

impl<'r, 'a> ModuleBuilder<'r, 'a> {
    pub fn build(
        registry: &'r mut ModuleRegistry<'a>,
        decl: &'a ModuleDecl,
    ) -> Result<Module, ResolveError> {
        debug!("building symbol table for module `{}`", decl.name);
        let builder = Self::new(registry, decl);
        builder.build_inner()
    }

    fn new(registry: &'r mut ModuleRegistry<'a>, decl: &'a ModuleDecl) -> Self {
        Self {
            registry,
            decl,
            declarations: decl.declarations().map(|d| (d.name.as_str(), d)).collect(),
            symbols: SymbolTable::default(),
        }
    }

    fn build_inner(mut self) -> Result<Module, ResolveError> {
        let decl = self.decl;
        for port in &decl.ports {
            let key = self.registry.normalize(port);
            match self.bus_range(port) {
                Some(range) => self.symbols.add_bus(&key, true, range),
                None => self.symbols.add_net(&key, true),
            }
        }
        for stmt in &decl.statements {
            self.process_statement(stmt)?;
        }
        let ports = self.collect_ports();
        debug!(
            "module `{}`: {} symbols, {} ports",
            decl.name,
            self.symbols.len(),
            ports.len()
        );
        Ok(Module {
            name: decl.name.clone(),
            symbols: self.symbols,
            ports,
        })
    }

    fn process_statement(&mut self, stmt: &'a Statement) -> Result<(), ResolveError> {
        match stmt {
            Statement::ModuleInst {
                instance,
                module,
                pins,
            } => self.process_module_inst(instance, module, pins),
            Statement::CellInst {
                instance,
                cell,
                nets,
            } => self.process_cell_inst(instance, cell, nets),
            Statement::Declaration(decl) => {
                self.process_declaration(decl);
                Ok(())
            }
            Statement::Assign { lhs, rhs } => self.process_assign(lhs, rhs),
        }
    }

    fn process_module_inst(
        &mut self,
        instance: &str,
        type_name: &str,
        pins: &[PinConnection],
    ) -> Result<(), ResolveError> {
        let inst = self.registry.normalize(instance);
        let netlist = self.registry.netlist();
        if netlist.module(type_name).is_none() {
            // Named-pin instantiation of a library cell.
            let library = self.registry.library();
            let Some(cell) = library.cell(type_name) else {
                return Err(ResolveError::UnknownModule {
                    name: type_name.to_string(),
                    instance: inst,
                    parent: self.decl.name.clone(),
                });
            };
            return self.process_cell_pins(&inst, cell, pins);
        }

        let sub_id = self.registry.get_or_build(type_name)?;
        self.symbols.add_instance(&inst, type_name, Some(sub_id));
        let sub_ports = self.registry.module(sub_id).ports().to_vec();
        for port in &sub_ports {
            let pin = format!("{inst}/{}", port.name);
            match port.bus {
                Some(range) => self.symbols.add_bus(&pin, false, range),
                None => self.symbols.add_net(&pin, false),
            }
        }

        for connection in pins {
            let port_key = self.registry.normalize(connection.port());
            let Some(port) = sub_ports.iter().find(|p| p.name == port_key) else {
                return Err(ResolveError::UnknownPort {
                    module: type_name.to_string(),
                    port: port_key,
                    instance: inst,
                });
            };
            let pin = format!("{inst}/{}", port.name);
            match connection {
                PinConnection::Scalar { net, .. } => self.connect_pin(&pin, port, net)?,
                PinConnection::Bits { nets, .. } => self.connect_bits(&pin, port, nets)?,
            }
        }
        Ok(())
    }

    /// `.port(net)` on a structural instance.
    fn connect_pin(&mut self, pin: &str, port: &Port, net: &str) -> Result<(), ResolveError> {
        let net_key = self.registry.normalize(net);
        let Some(port_range) = port.bus else {
            match self.bus_range(net) {
                Some(net_range) => {
                    self.check_width(pin, 1, &net_key, net_range.width())?;
                    self.connect(pin, &bit_name(&net_key, net_range.left), port.direction);
                }
                None => self.connect(pin, &net_key, port.direction),
            }
            return Ok(());
        };
        match self.bus_range(net) {
            Some(net_range) => {
                self.check_width(pin, port_range.width(), &net_key, net_range.width())?;
                for (p, n) in port_range.bit_names(pin).zip(net_range.bit_names(&net_key)) {
                    self.connect(&p, &n, port.direction);
                }
            }
            None => {
                self.check_width(pin, port_range.width(), &net_key, 1)?;
                self.connect(&bit_name(pin, port_range.left), &net_key, port.direction);
            }
        }
        Ok(())
    }

    /// `.port({a, b, c})` with the reader's per-bit name list.
    fn connect_bits(&mut self, pin: &str, port: &Port, nets: &[String]) -> Result<(), ResolveError> {
        let nets: Vec<String> = nets.iter().map(|n| self.registry.normalize(n)).collect();
        self.check_width(pin, port.width(), &nets.join(","), nets.len())?;
        match port.bus {
            Some(range) => {
                for (p, n) in range.bit_names(pin).zip(&nets) {
                    self.connect(&p, n, port.direction);
                }
            }
            None => {
                if let Some(net) = nets.first() {
                    self.connect(pin, net, port.direction);
                }
            }
        }
        Ok(())
    }

    fn process_cell_pins(
        &mut self,
        inst: &str,
        cell: &Cell,
        pins: &[PinConnection],
    ) -> Result<(), ResolveError> {
        self.symbols.add_instance(inst, &cell.name, None);
        for connection in pins {
            let port_key = self.registry.normalize(connection.port());
            let Some(lib_pin) = cell
                .pins
                .iter()
                .find(|p| self.registry.normalize(&p.name) == port_key)
            else {
                return Err(ResolveError::UnknownCellPin {
                    cell: cell.name.clone(),
                    pin: port_key,
                    instance: inst.to_string(),
                });
            };
            let pin = format!("{inst}/{port_key}");
            let net = match connection {
                PinConnection::Scalar { net, .. } => Some(net),
                PinConnection::Bits { nets, .. } => {
                    self.check_width(&pin, 1, &nets.join(","), nets.len())?;
                    nets.first()
                }
            };
            if let Some(net) = net.filter(|n| !n.is_empty()) {
                let net_key = self.registry.normalize(net);
                self.connect(&pin, &net_key, lib_pin.direction);
            }
        }
        Ok(())
    }

    fn process_cell_inst(
        &mut self,
        instance: &str,
        cell_name: &str,
        nets: &[Option<String>],
    ) -> Result<(), ResolveError> {
        let inst = self.registry.normalize(instance);
        let library = self.registry.library();
        let Some(cell) = library.cell(cell_name) else {
            return Err(ResolveError::UnknownModule {
                name: cell_name.to_string(),
                instance: inst,
                parent: self.decl.name.clone(),
            });
        };
        self.symbols.add_instance(&inst, &cell.name, None);
        for lib_pin in &cell.pins {
            let Some(Some(net)) = nets.get(lib_pin.index) else {
                continue;
            };
            if net.is_empty() {
                continue;
            }
            let pin = format!("{inst}/{}", self.registry.normalize(&lib_pin.name));
            let net_key = self.registry.normalize(net);
            self.connect(&pin, &net_key, lib_pin.direction);
        }
        Ok(())
    }

    fn process_declaration(&mut self, decl: &Declaration) {
        let key = self.registry.normalize(&decl.name);
        let is_port = !decl.direction.is_internal();
        match decl.bus {
            Some(extent) => self.symbols.add_bus(&key, is_port, extent.into()),
            None => self.symbols.add_net(&key, is_port),
        }
    }

    fn process_assign(&mut self, lhs: &str, rhs: &str) -> Result<(), ResolveError> {
        let lhs_key = self.registry.normalize(lhs);
        let rhs_key = self.registry.normalize(rhs);
        match (self.bus_range(lhs), self.bus_range(rhs)) {
            (Some(l), Some(r)) => {
                self.check_width(&lhs_key, l.width(), &rhs_key, r.width())?;
                for (lb, rb) in l.bit_names(&lhs_key).zip(r.bit_names(&rhs_key)) {
                    self.record_driver_edge(&rb, &lb);
                }
            }
            (Some(l), None) => {
                self.check_width(&lhs_key, l.width(), &rhs_key, 1)?;
                self.record_driver_edge(&rhs_key, &bit_name(&lhs_key, l.left));
            }
            (None, Some(r)) => {
                self.check_width(&lhs_key, 1, &rhs_key, r.width())?;
                self.record_driver_edge(&bit_name(&rhs_key, r.left), &lhs_key);
            }
            (None, None) => self.record_driver_edge(&rhs_key, &lhs_key),
        }
        Ok(())
    }

    /// Input pins are driven by the net; every other direction drives the net.
    fn connect(&mut self, pin: &str, net: &str, direction: Direction) {
        if direction.is_input() {
            self.record_driver_edge(net, pin);
        } else {
            self.record_driver_edge(pin, net);
        }
    }

    fn record_driver_edge(&mut self, driver: &str, driven: &str) {
        trace!("{}: {driven} <- {driver}", self.decl.name);
        self.symbols.record_driver_edge(driver, driven);
    }

    fn check_width(
        &self,
        lhs: &str,
        lhs_width: usize,
        rhs: &str,
        rhs_width: usize,
    ) -> Result<(), ResolveError> {
        if lhs_width == rhs_width {
            return Ok(());
        }
        match self.registry.width_policy() {
            WidthPolicy::Strict => Err(ResolveError::WidthMismatch {
                module: self.decl.name.clone(),
                lhs: lhs.to_string(),
                lhs_width,
                rhs: rhs.to_string(),
                rhs_width,
            }),
            WidthPolicy::Truncate => {
                warn!(
                    "{}: width mismatch `{lhs}` ({lhs_width}) vs `{rhs}` ({rhs_width}), connecting {} bit(s)",
                    self.decl.name,
                    lhs_width.min(rhs_width)
                );
                Ok(())
            }
        }
    }

    /// Declared extent of `name` when it is a bus of this module.
    fn bus_range(&self, name: &str) -> Option<Range> {
        self.declarations
            .get(name)
            .and_then(|d| d.bus)
            .map(Range::from)
    }

    fn collect_ports(&self) -> Vec<Port> {
        let mut ports: Vec<Port> = self
            .decl
            .ports
            .iter()
            .map(|name| {
                let decl = self.declarations.get(name.as_str());
                Port {
                    name: self.registry.normalize(name),
                    direction: decl.map_or(Direction::Input, |d| d.direction),
                    bus: decl.and_then(|d| d.bus).map(Range::from),
                }
            })
            .collect();
        for decl in self.decl.declarations() {
            if decl.direction.is_internal() {
                continue;
            }
            let name = self.registry.normalize(&decl.name);
            if ports.iter().any(|p| p.name == name) {
                continue;
            }
            ports.push(Port {
                name,
                direction: decl.direction,
                bus: decl.bus.map(Range::from),
            });
        }
        ports
    }
}
