/*!
`Scan` (§4.5): reads one relation's CSV file, one line per tuple.

 */

use crate::atom::RelationalAtom;
use crate::catalog::RelationalSchema;
use crate::error::{io_error, tuple_shape_error, Error};
use crate::operator::{Operator, Schema, Tuple};
use crate::value::{Constant, DataType};
use std::fs::File;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// Reads `relation_schema`'s CSV file, labeled with `atom` (whose terms are distinct variables
/// after planner normalization).
#[derive(Debug)]
pub struct Scan {
    relation_schema: RelationalSchema,
    schema: Schema,
    reader: Option<csv::Reader<File>>,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl Scan {
    pub fn new(relation_schema: RelationalSchema, atom: RelationalAtom) -> Self {
        let schema = Schema::new(vec![atom]);
        Self {
            relation_schema,
            schema,
            reader: None,
        }
    }

    fn open_reader(&self) -> Result<csv::Reader<File>, Error> {
        let path = self.relation_schema.csv_path();
        let file = File::open(path).map_err(|e| io_error(path.display().to_string(), e))?;
        Ok(csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .quoting(false)
            .from_reader(file))
    }

    fn parse_field(&self, field: &str, data_type: DataType) -> Result<Constant, Error> {
        match data_type {
            DataType::Int => field.parse::<i64>().map(Constant::Int).map_err(|_| {
                tuple_shape_error(
                    self.relation_schema.name().clone(),
                    format!("'{field}' is not a valid integer"),
                )
            }),
            DataType::Str => Ok(Constant::Str(strip_quotes(field).to_string())),
        }
    }
}

/// Strip a single pair of surrounding `'` characters, per the CSV string-field contract (§6).
fn strip_quotes(field: &str) -> &str {
    if field.len() >= 2 && field.starts_with('\'') && field.ends_with('\'') {
        &field[1..field.len() - 1]
    } else {
        field
    }
}

impl Operator for Scan {
    fn schema(&self) -> &Schema {
        &self.schema
    }

    fn open(&mut self) -> Result<(), Error> {
        self.reader = Some(self.open_reader()?);
        Ok(())
    }

    fn next(&mut self) -> Result<Option<Tuple>, Error> {
        let reader = self.reader.as_mut().unwrap();
        let mut record = csv::StringRecord::new();
        let has_record = reader.read_record(&mut record).map_err(|e| {
            tuple_shape_error(self.relation_schema.name().clone(), e.to_string())
        })?;
        if !has_record {
            return Ok(None);
        }

        let arity = self.relation_schema.arity();
        if record.len() != arity {
            return Err(tuple_shape_error(
                self.relation_schema.name().clone(),
                format!("expected {arity} fields, found {}", record.len()),
            ));
        }

        let tuple: Result<Tuple, Error> = record
            .iter()
            .zip(self.relation_schema.column_types())
            .map(|(field, data_type)| self.parse_field(field, *data_type))
            .collect();
        tuple.map(Some)
    }

    fn reset(&mut self) -> Result<(), Error> {
        self.reader = Some(self.open_reader()?);
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------
