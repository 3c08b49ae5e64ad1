use log::debug;

use crate::HashMap;
use crate::error::ResolveError;
use crate::library::CellLibrary;
use crate::module::builder::ModuleBuilder;
use crate::module::resolver::{Resolver, SourceCache};
use crate::module::{Module, ModuleId};
use crate::naming::{NameNormalizer, VerilogNames};
use crate::netlist::Netlist;

/// How bus pairings of unequal width are treated during construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WidthPolicy {
    /// Connect as many bits as the narrower side provides (a bus paired with
    /// a scalar uses its leftmost declared bit) and log a warning.
    #[default]
    Truncate,
    /// Reject the netlist with [`ResolveError::WidthMismatch`].
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    pub width_policy: WidthPolicy,
}

/// Owner of every module type built during one analysis run.
///
/// Module types are built on first request and memoized by type name, so a
/// type instantiated many times is processed once. Queries populate a shared
/// [`SourceCache`] that lives next to, not inside, the symbol tables.
pub struct ModuleRegistry<'a> {
    netlist: &'a Netlist,
    library: &'a dyn CellLibrary,
    normalizer: Box<dyn NameNormalizer + 'a>,
    options: RegistryOptions,
    root: String,
    modules: Vec<Module>,
    by_name: HashMap<String, ModuleId>,
    building: Vec<String>,
    cache: SourceCache,
}

impl std::fmt::Debug for ModuleRegistry<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field("root", &self.root)
            .field("modules", &self.modules.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}

impl<'a> ModuleRegistry<'a> {
    pub fn new(netlist: &'a Netlist, library: &'a dyn CellLibrary, root: &str) -> Self {
        RegistryBuilder::new(netlist, library, root).build()
    }

    pub fn builder(
        netlist: &'a Netlist,
        library: &'a dyn CellLibrary,
        root: &str,
    ) -> RegistryBuilder<'a> {
        RegistryBuilder::new(netlist, library, root)
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn options(&self) -> &RegistryOptions {
        &self.options
    }

    pub(crate) fn netlist(&self) -> &'a Netlist {
        self.netlist
    }

    pub(crate) fn library(&self) -> &'a dyn CellLibrary {
        self.library
    }

    pub(crate) fn width_policy(&self) -> WidthPolicy {
        self.options.width_policy
    }

    pub fn normalize(&self, raw: &str) -> String {
        self.normalizer.normalize(raw)
    }

    /// Returns the module built for `type_name`, building it (and, depth
    /// first, every module type it instantiates) on first request.
    pub fn get_or_build(&mut self, type_name: &str) -> Result<ModuleId, ResolveError> {
        if let Some(id) = self.by_name.get(type_name) {
            return Ok(*id);
        }
        if self.building.iter().any(|n| n == type_name) {
            let mut chain = self.building.clone();
            chain.push(type_name.to_string());
            return Err(ResolveError::RecursiveInstantiation {
                name: type_name.to_string(),
                chain: chain.join(" -> "),
            });
        }
        let netlist = self.netlist;
        let Some(decl) = netlist.module(type_name) else {
            return Err(ResolveError::ModuleNotFound {
                name: type_name.to_string(),
            });
        };

        self.building.push(type_name.to_string());
        let built = ModuleBuilder::build(self, decl);
        self.building.pop();
        let module = built?;

        let id = ModuleId(self.modules.len());
        debug!("registered module `{type_name}` as {id}");
        self.modules.push(module);
        self.by_name.insert(type_name.to_string(), id);
        Ok(id)
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    pub fn module_by_name(&self, type_name: &str) -> Option<&Module> {
        self.by_name.get(type_name).map(|id| &self.modules[id.0])
    }

    pub fn module_id(&self, type_name: &str) -> Option<ModuleId> {
        self.by_name.get(type_name).copied()
    }

    /// Modules in build order (submodules before their parents).
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    /// Builds the root module and, transitively, the whole hierarchy below it.
    pub fn build_root(&mut self) -> Result<ModuleId, ResolveError> {
        let root = self.root.clone();
        self.get_or_build(&root)
    }

    /// Resolves a hierarchical path below the root module to its ultimate
    /// source(s): one per bit when the path names a bus.
    ///
    /// Paths leaving the known hierarchy come back unchanged; only malformed
    /// netlists and combinational cycles are errors.
    pub fn resolve(&mut self, path: &str) -> Result<Vec<String>, ResolveError> {
        let root = self.build_root()?;
        let key = self.normalize(path);
        let mut resolver = Resolver::new(&self.modules, &mut self.cache);
        let mut sources = resolver.find_hier_source(root, &key)?;
        if sources.is_empty() {
            sources.push(path.to_string());
        }
        Ok(sources)
    }

    /// `path ----> source` lines, one per resolved bit.
    pub fn format_resolution(&mut self, path: &str) -> Result<String, ResolveError> {
        let sources = self.resolve(path)?;
        Ok(sources
            .iter()
            .map(|source| format!("{path} ----> {source}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn cache(&self) -> &SourceCache {
        &self.cache
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }
}

/// Fluent configuration for a [`ModuleRegistry`].
pub struct RegistryBuilder<'a> {
    netlist: &'a Netlist,
    library: &'a dyn CellLibrary,
    root: String,
    normalizer: Box<dyn NameNormalizer + 'a>,
    options: RegistryOptions,
}

impl<'a> RegistryBuilder<'a> {
    pub fn new(netlist: &'a Netlist, library: &'a dyn CellLibrary, root: &str) -> Self {
        Self {
            netlist,
            library,
            root: root.to_string(),
            normalizer: Box::new(VerilogNames),
            options: RegistryOptions::default(),
        }
    }

    /// Replace the default [`VerilogNames`] normalization.
    pub fn normalizer(mut self, normalizer: impl NameNormalizer + 'a) -> Self {
        self.normalizer = Box::new(normalizer);
        self
    }

    pub fn width_policy(mut self, policy: WidthPolicy) -> Self {
        self.options.width_policy = policy;
        self
    }

    pub fn options(mut self, options: RegistryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> ModuleRegistry<'a> {
        ModuleRegistry {
            netlist: self.netlist,
            library: self.library,
            normalizer: self.normalizer,
            options: self.options,
            root: self.root,
            modules: Vec::new(),
            by_name: HashMap::default(),
            building: Vec::new(),
            cache: SourceCache::default(),
        }
    }
}
