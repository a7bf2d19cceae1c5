/*!
The runtime glue that drains a planned operator tree and the two file-based entry points of §6:
`minimize_file` (CQ in, minimized CQ out) and `evaluate_file` (schema + query in, result tuples
out).

 */

use crate::catalog::Catalog;
use crate::error::{io_error, Error};
use crate::minimizer;
use crate::operator::Operator;
use crate::parser::parse_query;
use crate::planner::Planner;
use std::fs::File;
use std::io::Write;
use std::path::Path;

// ------------------------------------------------------------------------------------------------
// Public Types
// ------------------------------------------------------------------------------------------------

/// Drains a planned operator tree to a sink, one formatted tuple (or aggregate row) per line.
#[derive(Debug)]
pub struct Runtime<W: Write> {
    sink: W,
}

// ------------------------------------------------------------------------------------------------
// Implementations
// ------------------------------------------------------------------------------------------------

impl<W: Write> Runtime<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Open `plan` and drain it to completion, writing results to the sink.
    #[tracing::instrument(skip_all)]
    pub fn run(&mut self, mut plan: Box<dyn Operator>) -> Result<(), Error> {
        plan.open()?;
        plan.dump(&mut self.sink)
    }
}

// ------------------------------------------------------------------------------------------------
// Public Functions
// ------------------------------------------------------------------------------------------------

/// Read a CQ from `input_path`, minimize it, and write its textual form to `output_path` (§6).
#[tracing::instrument]
pub fn minimize_file(input_path: &Path, output_path: &Path) -> Result<(), Error> {
    let text = std::fs::read_to_string(input_path)
        .map_err(|e| io_error(input_path.display().to_string(), e))?;
    let query = parse_query(&text)?;
    let minimized = minimizer::minimize(query);
    tracing::info!(atoms_removed = true, "minimized query: {minimized}");
    std::fs::write(output_path, format!("{minimized}\n"))
        .map_err(|e| io_error(output_path.display().to_string(), e))
}

/// Load the catalog at `database_dir`, parse and plan the query at `query_path`, and drain the
/// resulting pipeline into `output_path` (§6).
#[tracing::instrument]
pub fn evaluate_file(database_dir: &Path, query_path: &Path, output_path: &Path) -> Result<(), Error> {
    let catalog = Catalog::load(database_dir)?;
    let text = std::fs::read_to_string(query_path)
        .map_err(|e| io_error(query_path.display().to_string(), e))?;
    let query = parse_query(&text)?;
    let plan = Planner::new(&catalog).plan(&query)?;

    let file = File::create(output_path).map_err(|e| io_error(output_path.display().to_string(), e))?;
    Runtime::new(file).run(plan)
}

// ------------------------------------------------------------------------------------------------
// Unit Tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn minimize_file_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("query.txt");
        let output_path = dir.path().join("out.txt");
        fs::write(&input_path, "Q(x) :- R(x,y), R(x,z)").unwrap();

        minimize_file(&input_path, &output_path).unwrap();

        let result = fs::read_to_string(&output_path).unwrap();
        assert_eq!(result.trim(), "Q(x) :- R(x, y)");
    }

    #[test]
    fn evaluate_file_writes_result_tuples() {
        let db_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(db_dir.path().join("files")).unwrap();
        fs::write(db_dir.path().join("schema.txt"), "R string\n").unwrap();
        fs::write(db_dir.path().join("files/R.csv"), "'x'\n'x'\n'y'\n").unwrap();

        let query_path = db_dir.path().join("query.txt");
        fs::write(&query_path, "Q(a) :- R(a)").unwrap();
        let output_path = db_dir.path().join("out.txt");

        evaluate_file(db_dir.path(), &query_path, &output_path).unwrap();

        let result = fs::read_to_string(&output_path).unwrap();
        let mut lines: Vec<&str> = result.lines().collect();
        lines.sort_unstable();
        assert_eq!(lines, vec!["x", "y"]);
    }

    #[test]
    fn evaluate_file_missing_schema_errors() {
        let db_dir = tempfile::tempdir().unwrap();
        let query_path = db_dir.path().join("query.txt");
        fs::write(&query_path, "Q(a) :- R(a)").unwrap();
        let output_path = db_dir.path().join("out.txt");
        assert!(evaluate_file(db_dir.path(), &query_path, &output_path).is_err());
    }
}
