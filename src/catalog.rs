/*!
The schema catalog (§4.10, §6): resolves a database directory's `schema.txt` into an immutable
mapping from relation name to column types and CSV path.

 */

use crate::error::{catalog_error, io_error, Error};
use crate::value::DataType;
use crate::Name;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// `{ name, columnTypes, csvPath }` — one relation's resolved schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationalSchema {
    name: Name,
    column_types: Vec<DataType>,
    csv_path: PathBuf,
}

/// An immutable `name -> RelationalSchema` mapping, constructed once per invocation and shared
/// by reference with the planner and every `Scan`.
#[derive(Clone, Debug)]
pub struct Catalog {
    relations: HashMap<Name, RelationalSchema>,
}

// ------------------------------------------------------------------------------------------------
// Implementations — RelationalSchema
// ------------------------------------------------------------------------------------------------

impl RelationalSchema {
    pub fn name(&self) -> &Name {
        &self.name
    }

    pub fn column_types(&self) -> &[DataType] {
        &self.column_types
    }

    pub fn arity(&self) -> usize {
        self.column_types.len()
    }

    pub fn csv_path(&self) -> &Path {
        &self.csv_path
    }
}

// ------------------------------------------------------------------------------------------------
// Implementations — Catalog
// ------------------------------------------------------------------------------------------------

impl Catalog {
    /// Load a catalog from `<database_dir>/schema.txt`, resolving each relation's CSV path to
    /// `<database_dir>/files/<name>.csv` (§6).
    #[tracing::instrument(skip_all, fields(database_dir = %database_dir.as_ref().display()))]
    pub fn load<P: AsRef<Path>>(database_dir: P) -> Result<Self, Error> {
        let database_dir = database_dir.as_ref();
        let schema_path = database_dir.join("schema.txt");
        let text = std::fs::read_to_string(&schema_path)
            .map_err(|e| io_error(schema_path.display().to_string(), e))?;

        let files_dir = database_dir.join("files");
        let mut relations = HashMap::new();
        for (line_no, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let name_token = tokens.next().ok_or_else(|| {
                catalog_error(format!("schema.txt line {}: missing relation name", line_no + 1))
            })?;
            let name = Name::from_str(name_token).map_err(|_| {
                catalog_error(format!(
                    "schema.txt line {}: '{}' is not a valid relation name",
                    line_no + 1,
                    name_token
                ))
            })?;

            let column_types = tokens
                .map(|token| {
                    DataType::from_token(token).ok_or_else(|| {
                        catalog_error(format!(
                            "schema.txt line {}: unknown column type '{}'",
                            line_no + 1,
                            token
                        ))
                    })
                })
                .collect::<Result<Vec<DataType>, Error>>()?;

            if column_types.is_empty() {
                return Err(catalog_error(format!(
                    "schema.txt line {}: relation '{}' has no columns",
                    line_no + 1,
                    name
                )));
            }

            let csv_path = files_dir.join(format!("{name}.csv"));
            relations.insert(
                name.clone(),
                RelationalSchema {
                    name,
                    column_types,
                    csv_path,
                },
            );
        }

        Ok(Self { relations })
    }

    pub fn schema(&self, name: &Name) -> Result<&RelationalSchema, Error> {
        self.relations
            .get(name)
            .ok_or_else(|| catalog_error(format!("unknown relation '{name}'")))
    }

    pub fn relations(&self) -> impl Iterator<Item = &RelationalSchema> {
        self.relations.values()
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn loads_schema_and_resolves_csv_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.txt"), "R int int\nS string int\n").unwrap();
        let catalog = Catalog::load(dir.path()).unwrap();

        let r = catalog.schema(&Name::new_unchecked("R")).unwrap();
        assert_eq!(r.arity(), 2);
        assert_eq!(r.column_types(), [DataType::Int, DataType::Int]);
        assert_eq!(r.csv_path(), dir.path().join("files").join("R.csv"));

        let s = catalog.schema(&Name::new_unchecked("S")).unwrap();
        assert_eq!(s.column_types(), [DataType::Str, DataType::Int]);
    }

    #[test]
    fn unknown_relation_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.txt"), "R int\n").unwrap();
        let catalog = Catalog::load(dir.path()).unwrap();
        assert!(catalog.schema(&Name::new_unchecked("T")).is_err());
    }

    #[test]
    fn missing_schema_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Catalog::load(dir.path()).is_err());
    }

    #[test]
    fn unknown_type_token_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("schema.txt"), "R float\n").unwrap();
        assert!(Catalog::load(dir.path()).is_err());
    }
}
