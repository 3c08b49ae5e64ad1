//! Driver resolution for hierarchical gate-level netlists.
//!
//! A [`ModuleRegistry`] builds one symbol table per module type on demand and
//! answers "what ultimately drives `u1/u2/q[3]`?" by descending into instances
//! and following assignment and pin-connection chains back up.

pub mod debug;
pub mod error;
pub mod library;
pub mod module;
pub mod naming;
pub mod netlist;
pub mod range;
pub mod registry;
pub mod symbol;

pub(crate) use fxhash::FxHashMap as HashMap;
pub(crate) use fxhash::FxHashSet as HashSet;

pub use debug::{format_registry, format_symbol_table};
pub use error::ResolveError;
pub use library::{Cell, CellLibrary, Library, Pin};
pub use module::{Module, ModuleId, Port, SourceCache};
pub use naming::{NameNormalizer, Verbatim, VerilogNames};
pub use netlist::{BusExtent, Declaration, Direction, ModuleDecl, Netlist, PinConnection, Statement};
pub use range::Range;
pub use registry::{ModuleRegistry, RegistryBuilder, RegistryOptions, WidthPolicy};
pub use symbol::{Symbol, SymbolKind, SymbolTable};
