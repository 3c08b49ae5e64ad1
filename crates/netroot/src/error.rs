use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unknown module or cell type `{name}` instantiated as `{instance}` in module `{parent}`")]
    UnknownModule {
        name: String,
        instance: String,
        parent: String,
    },

    #[error("Module `{name}` not found in netlist")]
    ModuleNotFound { name: String },

    #[error("Module `{module}` has no port `{port}` (connected on instance `{instance}`)")]
    UnknownPort {
        module: String,
        port: String,
        instance: String,
    },

    #[error("Cell `{cell}` has no pin `{pin}` (connected on instance `{instance}`)")]
    UnknownCellPin {
        cell: String,
        pin: String,
        instance: String,
    },

    #[error("Module `{name}` instantiates itself through `{chain}`")]
    RecursiveInstantiation { name: String, chain: String },

    #[error("Width mismatch in module `{module}`: `{lhs}` ({lhs_width} bits) vs `{rhs}` ({rhs_width} bits)")]
    WidthMismatch {
        module: String,
        lhs: String,
        lhs_width: usize,
        rhs: String,
        rhs_width: usize,
    },

    #[error("Combinational cycle detected in module `{module}` at `{net}`")]
    CombinationalCycle { module: String, net: String },
}
