use std::collections::HashMap;

use crate::PkodeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    State,
    Parameter,
}

/// A bound name and its position in the flat `[states..., parameters...]`
/// argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    name: String,
    kind: SymbolKind,
    index: usize,
}

impl Symbol {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SymbolKind {
        self.kind
    }

    /// Position in the flat argument list
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Ordered name table shared by the compiler, assembler and integrator.
///
/// The order is fixed once at construction: states first, then parameters,
/// each in declaration order. Every downstream vector uses these positions.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    lookup: HashMap<String, usize>,
    nstates: usize,
}

impl SymbolTable {
    pub fn new(
        states: &[impl AsRef<str>],
        parameters: &[impl AsRef<str>],
    ) -> Result<Self, PkodeError> {
        let mut table = Self {
            symbols: Vec::with_capacity(states.len() + parameters.len()),
            lookup: HashMap::with_capacity(states.len() + parameters.len()),
            nstates: states.len(),
        };
        for name in states {
            table.push(name.as_ref(), SymbolKind::State)?;
        }
        for name in parameters {
            table.push(name.as_ref(), SymbolKind::Parameter)?;
        }
        Ok(table)
    }

    fn push(&mut self, name: &str, kind: SymbolKind) -> Result<(), PkodeError> {
        let index = self.symbols.len();
        if self.lookup.insert(name.to_string(), index).is_some() {
            return Err(PkodeError::name_collision(name));
        }
        self.symbols.push(Symbol {
            name: name.to_string(),
            kind,
            index,
        });
        Ok(())
    }

    pub fn resolve(&self, name: &str) -> Option<&Symbol> {
        self.lookup.get(name).map(|&i| &self.symbols[i])
    }

    pub fn nstates(&self) -> usize {
        self.nstates
    }

    pub fn nparams(&self) -> usize {
        self.symbols.len() - self.nstates
    }

    /// Total number of bound names, i.e. the evaluator arity
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.symbols[..self.nstates].iter().map(Symbol::name)
    }

    pub fn parameter_names(&self) -> impl Iterator<Item = &str> {
        self.symbols[self.nstates..].iter().map(Symbol::name)
    }
}
