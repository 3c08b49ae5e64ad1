use log::trace;

use crate::error::ResolveError;
use crate::module::{Module, ModuleId};
use crate::{HashMap, HashSet};

/// Memoized fully-resolved sources, keyed by module type and local key.
///
/// Kept apart from the symbol tables: those hold what the netlist says, this
/// holds what queries derived from it. Entries are written once and never
/// invalidated.
#[derive(Debug, Clone, Default)]
pub struct SourceCache {
    entries: HashMap<(ModuleId, String), String>,
}

impl SourceCache {
    pub fn get(&self, module: ModuleId, key: &str) -> Option<&str> {
        self.entries
            .get(&(module, key.to_string()))
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, module: ModuleId, key: &str, source: String) {
        self.entries.insert((module, key.to_string()), source);
    }
}

/// Hierarchical source lookup over already built modules.
pub struct Resolver<'r> {
    modules: &'r [Module],
    cache: &'r mut SourceCache,
    /// Keys on the current resolution chain.
    visiting: HashSet<(ModuleId, String)>,
}

impl<'r> Resolver<'r> {
    pub fn new(modules: &'r [Module], cache: &'r mut SourceCache) -> Self {
        Self {
            modules,
            cache,
            visiting: HashSet::default(),
        }
    }

    /// Resolves `key`, which may descend through instances (`u1/u2/q`).
    pub fn find_hier_source(
        &mut self,
        module: ModuleId,
        key: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let Some((inst, rest)) = key.split_once('/') else {
            return self.find_source(module, key);
        };
        let modules = self.modules;
        let symbol = modules[module.0].symbol(inst);
        match symbol.map(|s| (s.is_instance(), s.instance_module())) {
            Some((_, Some(sub))) => {
                let inner = self.find_hier_source(sub, rest)?;
                inner
                    .iter()
                    .map(|source| self.find_one_source(module, &format!("{inst}/{source}")))
                    .collect()
            }
            // Primitive cell pins live in this module's own table.
            Some((true, None)) => self.find_source(module, key),
            // Flattened names such as `u1/n5` are plain local nets.
            _ if modules[module.0].symbol(key).is_some() => self.find_source(module, key),
            _ => Ok(vec![key.to_string()]),
        }
    }

    /// Resolves a local key, expanding a bus name into its bits in declared order.
    pub fn find_source(
        &mut self,
        module: ModuleId,
        key: &str,
    ) -> Result<Vec<String>, ResolveError> {
        let modules = self.modules;
        let Some(symbol) = modules[module.0].symbol(key) else {
            return Ok(vec![key.to_string()]);
        };
        match symbol.bus {
            Some(range) => range
                .bit_names(key)
                .map(|bit| self.find_one_source(module, &bit))
                .collect(),
            None => Ok(vec![self.find_one_source(module, key)?]),
        }
    }

    /// Resolves a single bit local to `module`, compressing the path in the cache.
    pub fn find_one_source(&mut self, module: ModuleId, key: &str) -> Result<String, ResolveError> {
        let modules = self.modules;
        let current = &modules[module.0];
        if current.symbol(key).is_none() {
            return Ok(key.to_string());
        }
        if let Some(hit) = self.cache.get(module, key) {
            trace!("{}: cache hit {key} -> {hit}", current.name());
            return Ok(hit.to_string());
        }

        let visit = (module, key.to_string());
        if !self.visiting.insert(visit.clone()) {
            return Err(ResolveError::CombinationalCycle {
                module: current.name().to_string(),
                net: key.to_string(),
            });
        }
        let resolved = self.step(current, module, key);
        self.visiting.remove(&visit);

        let resolved = resolved?;
        self.cache.insert(module, key, resolved.clone());
        Ok(resolved)
    }

    fn step(&mut self, current: &Module, module: ModuleId, key: &str) -> Result<String, ResolveError> {
        let driver = current.symbol(key).and_then(|s| s.driver.as_deref());
        match driver {
            Some(driver) if driver == key => Ok(key.to_string()),
            Some(driver) => self.find_one_source(module, driver),
            None => {
                // Undriven at this level: the driver is inside the instance, if any.
                let Some((inst, sub_key)) = key.split_once('/') else {
                    return Ok(key.to_string());
                };
                let Some(sub) = current.instance_module(inst) else {
                    return Ok(key.to_string());
                };
                let inner = self.find_one_source(sub, sub_key)?;
                let composed = format!("{inst}/{inner}");
                if composed == key {
                    return Ok(composed);
                }
                self.find_one_source(module, &composed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::Port;
    use crate::netlist::Direction;
    use crate::symbol::SymbolTable;

    fn module(name: &str, build: impl FnOnce(&mut SymbolTable)) -> Module {
        let mut symbols = SymbolTable::default();
        build(&mut symbols);
        Module {
            name: name.to_string(),
            symbols,
            ports: vec![Port {
                name: "i".to_string(),
                direction: Direction::Input,
                bus: None,
            }],
        }
    }

    #[test]
    fn test_chain_is_compressed() {
        let modules = [module("top", |t| {
            t.add_net("a", true);
            t.record_driver_edge("a", "b");
            t.record_driver_edge("b", "c");
            t.record_driver_edge("c", "d");
        })];
        let mut cache = SourceCache::default();
        let mut resolver = Resolver::new(&modules, &mut cache);
        assert_eq!(resolver.find_one_source(ModuleId(0), "d").unwrap(), "a");
        assert_eq!(cache.get(ModuleId(0), "d"), Some("a"));
        assert_eq!(cache.get(ModuleId(0), "c"), Some("a"));
        assert_eq!(cache.get(ModuleId(0), "b"), Some("a"));
    }

    #[test]
    fn test_self_driver_is_terminal() {
        let modules = [module("top", |t| t.record_driver_edge("x", "x"))];
        let mut cache = SourceCache::default();
        let mut resolver = Resolver::new(&modules, &mut cache);
        assert_eq!(resolver.find_one_source(ModuleId(0), "x").unwrap(), "x");
    }

    #[test]
    fn test_cycle_is_reported() {
        let modules = [module("top", |t| {
            t.record_driver_edge("p", "q");
            t.record_driver_edge("q", "r");
            t.record_driver_edge("r", "p");
        })];
        let mut cache = SourceCache::default();
        let mut resolver = Resolver::new(&modules, &mut cache);
        let err = resolver.find_one_source(ModuleId(0), "p").unwrap_err();
        assert_eq!(
            err,
            ResolveError::CombinationalCycle {
                module: "top".to_string(),
                net: "p".to_string(),
            }
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_unconnected_instance_input_stays_at_pin() {
        let modules = [
            module("leaf", |t| t.add_net("i", true)),
            module("top", |t| {
                t.add_instance("u", "leaf", Some(ModuleId(0)));
                t.add_net("u/i", false);
            }),
        ];
        let mut cache = SourceCache::default();
        let mut resolver = Resolver::new(&modules, &mut cache);
        assert_eq!(resolver.find_one_source(ModuleId(1), "u/i").unwrap(), "u/i");
        assert_eq!(
            resolver.find_hier_source(ModuleId(1), "u/i").unwrap(),
            vec!["u/i".to_string()]
        );
    }
}
