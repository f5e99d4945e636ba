// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Variable catalog: the ordered names a PLC reports via LIST.

use std::collections::HashMap;

use plccoms_wire::{parse_list_line, ListLine};

/// Lookup key for a variable name
pub(crate) fn key(name: &str) -> String {
    name.to_lowercase()
}

/// Ordered variable names with a case-insensitive index.
///
/// The PLC's casing is canonical and is what goes on the wire.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn from_names<I>(names: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let names: Vec<String> = names.into_iter().collect();
        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            // First spelling wins if the PLC lists a name twice
            index.entry(key(name)).or_insert(i);
        }
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Canonical spelling of `name`, if the PLC knows it
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.index.get(&key(name)).map(|&i| self.names[i].as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&key(name))
    }

    /// Canonical spelling of `name`, or `name` unchanged when unknown.
    pub fn resolve(&self, name: &str) -> String {
        self.lookup(name).unwrap_or(name).to_string()
    }
}

/// Accumulates LIST reply lines into a [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    names: Vec<String>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one reply line. Returns `false` once the listing is over.
    pub fn push_line(&mut self, line: &str) -> bool {
        match parse_list_line(line) {
            ListLine::Entry(name) => {
                self.names.push(name);
                true
            }
            ListLine::Skip => true,
            ListLine::End => false,
        }
    }

    pub fn finish(self) -> Catalog {
        Catalog::from_names(self.names)
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
