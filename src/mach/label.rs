use super::{Address, Script};
use crate::lang::{ast::Statement, parse_line};
use std::collections::HashMap;

/// ## Label index
///
/// Maps each `LABEL name` to the index of the line after it. Built once per
/// run; a repeated name binds to its last occurrence.

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Labels {
    map: HashMap<String, Address>,
}

impl Labels {
    pub fn prepass(script: &Script) -> Labels {
        let mut map = HashMap::new();
        for (index, line) in script.lines().enumerate() {
            if let Statement::Label(name) = parse_line(line) {
                if map.insert(name.clone(), index + 1).is_some() {
                    tracing::debug!("label {} redefined at line {}", name, index + 1);
                }
            }
        }
        tracing::debug!("{} labels in {}", map.len(), script.name());
        Labels { map }
    }

    pub fn resolve(&self, name: &str) -> Option<Address> {
        self.map.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Address)> {
        self.map.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
