//! Primitive cell interfaces, as supplied by a liberty-style cell model.

use serde::{Deserialize, Serialize};

use crate::netlist::Direction;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pin {
    pub name: String,
    pub direction: Direction,
    /// Position of this pin in a [`Statement::CellInst`](crate::netlist::Statement) net list.
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub name: String,
    #[serde(default)]
    pub pins: Vec<Pin>,
}

impl Cell {
    pub fn pin(&self, name: &str) -> Option<&Pin> {
        self.pins.iter().find(|p| p.name == name)
    }
}

/// Lookup of primitive cells by type name.
pub trait CellLibrary {
    fn cell(&self, name: &str) -> Option<&Cell>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    #[serde(default)]
    pub cells: Vec<Cell>,
}

impl Library {
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Adds a cell whose pins are numbered in the order given.
    pub fn with_cell(mut self, name: &str, pins: &[(&str, Direction)]) -> Self {
        self.cells.push(Cell {
            name: name.to_string(),
            pins: pins
                .iter()
                .enumerate()
                .map(|(index, (pin, direction))| Pin {
                    name: pin.to_string(),
                    direction: *direction,
                    index,
                })
                .collect(),
        });
        self
    }
}

impl CellLibrary for Library {
    fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.iter().find(|c| c.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_from_toml() {
        let text = r#"
            [[cells]]
            name = "NAND2"
            pins = [
                { name = "A", direction = "input", index = 0 },
                { name = "B", direction = "input", index = 1 },
                { name = "Y", direction = "output", index = 2 },
            ]
        "#;
        let lib = Library::from_toml_str(text).unwrap();
        let cell = lib.cell("NAND2").unwrap();
        assert_eq!(cell.pin("Y").map(|p| p.index), Some(2));
        assert_eq!(cell.pin("B").map(|p| p.direction), Some(Direction::Input));
        assert!(lib.cell("NOR2").is_none());
    }

    #[test]
    fn test_with_cell_numbers_pins() {
        let lib = Library::default().with_cell("INV", &[("A", Direction::Input), ("Y", Direction::Output)]);
        let cell = lib.cell("INV").unwrap();
        assert_eq!(cell.pin("A").map(|p| p.index), Some(0));
        assert_eq!(cell.pin("Y").map(|p| p.index), Some(1));
    }
}
