use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A named place in the simulated world.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub description: String,
}

impl Location {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    pub fn describe(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Registry of locations keyed by unique name, kept in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Locations {
    entries: Vec<Location>,
    index: HashMap<String, usize>,
}

impl Locations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a location. An existing entry with the same name is replaced in place.
    pub fn add_location(&mut self, name: impl Into<String>, description: impl Into<String>) {
        let location = Location::new(name, description);
        match self.index.get(&location.name) {
            Some(&slot) => self.entries[slot] = location,
            None => {
                self.index.insert(location.name.clone(), self.entries.len());
                self.entries.push(location);
            }
        }
    }

    pub fn get_location(&self, name: &str) -> Option<&Location> {
        self.index.get(name).map(|&slot| &self.entries[slot])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> {
        self.entries.iter()
    }
}

impl fmt::Display for Locations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, location) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{}", location)?;
        }
        Ok(())
    }
}
