//! Column mapping DSL.
//!
//! A mapping spec is either `"Source:Dest"` (select `Source`, rename it to
//! `Dest`) or a bare `"Name"` (select `Name` under the same name). Specs are
//! parsed eagerly into a [`ColumnMap`]: an ordered list of pairs whose
//! destinations are unique. Source names are only checked against a table
//! when the map is applied.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::error::{MappingError, MappingResult};
use crate::models::Table;

/// A single `(source, destination)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub source: String,
    pub dest: String,
}

impl ColumnMapping {
    /// Select a column under its own name.
    pub fn from_source(name: &str) -> Self {
        Self {
            source: name.to_string(),
            dest: name.to_string(),
        }
    }

    /// Select a column under a new name.
    pub fn renamed(source: &str, dest: &str) -> Self {
        Self {
            source: source.to_string(),
            dest: dest.to_string(),
        }
    }

    /// Parse one spec string.
    pub fn parse(spec: &str) -> MappingResult<Self> {
        let trimmed = spec.trim();
        if trimmed.is_empty() {
            return Err(MappingError::EmptyMapping);
        }

        match trimmed.split_once(':') {
            None => Ok(Self::from_source(trimmed)),
            Some((source, dest)) => {
                if dest.contains(':') {
                    return Err(MappingError::InvalidMappingSyntax(trimmed.to_string()));
                }
                let (source, dest) = (source.trim(), dest.trim());
                if source.is_empty() {
                    return Err(MappingError::EmptySource(trimmed.to_string()));
                }
                if dest.is_empty() {
                    return Err(MappingError::EmptyDestination(trimmed.to_string()));
                }
                Ok(Self::renamed(source, dest))
            }
        }
    }

    pub fn is_rename(&self) -> bool {
        self.source != self.dest
    }
}

impl FromStr for ColumnMapping {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ColumnMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rename() {
            write!(f, "{}:{}", self.source, self.dest)
        } else {
            f.write_str(&self.source)
        }
    }
}

/// Ordered, validated list of column mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ColumnMapping>", into = "Vec<ColumnMapping>")]
pub struct ColumnMap {
    mappings: Vec<ColumnMapping>,
}

impl ColumnMap {
    /// Parse a list of spec strings.
    ///
    /// # Example
    /// ```rust
    /// use matterload::transform::ColumnMap;
    ///
    /// let map = ColumnMap::parse(["ID:ClientMatterCode", "Status"]).unwrap();
    /// assert_eq!(map.destinations(), vec!["ClientMatterCode", "Status"]);
    /// ```
    pub fn parse<I, S>(specs: I) -> MappingResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mappings = specs
            .into_iter()
            .map(|spec| ColumnMapping::parse(spec.as_ref()))
            .collect::<MappingResult<Vec<_>>>()?;
        Self::from_mappings(mappings)
    }

    /// Validate already-built pairs.
    pub fn from_mappings(mappings: Vec<ColumnMapping>) -> MappingResult<Self> {
        if mappings.is_empty() {
            return Err(MappingError::NoMappings);
        }
        let mut seen = HashSet::new();
        for mapping in &mappings {
            if !seen.insert(mapping.dest.as_str()) {
                return Err(MappingError::DuplicateDestination(mapping.dest.clone()));
            }
        }
        Ok(Self { mappings })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnMapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn sources(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.source.as_str()).collect()
    }

    pub fn destinations(&self) -> Vec<&str> {
        self.mappings.iter().map(|m| m.dest.as_str()).collect()
    }

    /// Check that every source column exists, reporting the first missing one.
    pub fn validate_headers(&self, headers: &[String]) -> MappingResult<()> {
        match self
            .mappings
            .iter()
            .find(|m| !headers.iter().any(|h| h == &m.source))
        {
            Some(missing) => Err(MappingError::UnknownSourceColumn(missing.source.clone())),
            None => Ok(()),
        }
    }

    /// Project a table through the map.
    ///
    /// Returns a new table whose columns are the destinations in map order.
    /// Row count and row order are preserved.
    pub fn apply(&self, table: &Table) -> MappingResult<Table> {
        let indices = self
            .mappings
            .iter()
            .map(|m| {
                table
                    .column_index(&m.source)
                    .ok_or_else(|| MappingError::UnknownSourceColumn(m.source.clone()))
            })
            .collect::<MappingResult<Vec<_>>>()?;

        let columns = self.mappings.iter().map(|m| m.dest.clone()).collect();
        let rows = table
            .rows()
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Ok(Table::from_parts(columns, rows))
    }
}

impl TryFrom<Vec<ColumnMapping>> for ColumnMap {
    type Error = MappingError;

    fn try_from(mappings: Vec<ColumnMapping>) -> Result<Self, Self::Error> {
        Self::from_mappings(mappings)
    }
}

impl From<ColumnMap> for Vec<ColumnMapping> {
    fn from(map: ColumnMap) -> Self {
        map.mappings
    }
}

impl<'a> IntoIterator for &'a ColumnMap {
    type Item = &'a ColumnMapping;
    type IntoIter = std::slice::Iter<'a, ColumnMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}
