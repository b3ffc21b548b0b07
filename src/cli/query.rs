//! Run path expressions against JSON documents

use std::{fs, path::PathBuf};

use super::CliError;
use crate::{
    Datum, Evaluator, Path, Value, compile_with, convert::json_to_value, lexer::Profile,
    output::to_json_pretty,
};

/// Options for a query run
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// The path expression to evaluate
    pub expression: String,
    /// Restrict the expression to the core grammar
    pub core: bool,
    /// Label matches by this member instead of by position
    pub auto_id: Option<String>,
    /// Prefix every match with its full path and a tab
    pub show_paths: bool,
    /// Print mappings and sequences as indented JSON
    pub pretty: bool,
}

impl QueryOptions {
    fn profile(&self) -> Profile {
        if self.core {
            Profile::Core
        } else {
            Profile::Extended
        }
    }

    fn evaluator(&self) -> Evaluator {
        match &self.auto_id {
            Some(field) => Evaluator::with_auto_id(field.clone()),
            None => Evaluator::new(),
        }
    }
}

/// Evaluate the expression against one JSON document, one output line per match
pub fn execute_query(options: &QueryOptions, input: &str) -> Result<Vec<String>, CliError> {
    let path = compile_with(&options.expression, options.profile())?;
    run(&path, &options.evaluator(), options, input)
}

/// Evaluate the expression against each file in turn, concatenating the output
pub fn execute_files(options: &QueryOptions, files: &[PathBuf]) -> Result<Vec<String>, CliError> {
    if files.is_empty() {
        return Err(CliError::NoInput);
    }

    let path = compile_with(&options.expression, options.profile())?;
    let evaluator = options.evaluator();

    let mut lines = Vec::new();
    for file in files {
        let input = fs::read_to_string(file).map_err(|source| CliError::File {
            path: file.clone(),
            source,
        })?;
        log::debug!("querying {}", file.display());
        lines.extend(run(&path, &evaluator, options, &input)?);
    }
    Ok(lines)
}

fn run(
    path: &Path,
    evaluator: &Evaluator,
    options: &QueryOptions,
    input: &str,
) -> Result<Vec<String>, CliError> {
    let document: serde_json::Value = serde_json::from_str(input)?;
    let data = json_to_value(document);

    Ok(evaluator
        .find(path, &data)
        .iter()
        .map(|datum| format_match(datum, options))
        .collect())
}

/// Render one match as an output line
pub fn format_match(datum: &Datum<'_>, options: &QueryOptions) -> String {
    let text = match datum.value() {
        container @ (Value::Array(_) | Value::Object(_)) if options.pretty => {
            to_json_pretty(container)
        }
        value => value.to_string(),
    };

    if options.show_paths {
        format!("{}\t{}", datum.full_path(), text)
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn options(expression: &str) -> QueryOptions {
        QueryOptions {
            expression: expression.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_execute_query_prints_one_line_per_match() {
        let input = r#"{"foo": {"baz": 1, "bizzle": {"baz": 2}}}"#;
        let lines = execute_query(&options("foo..baz"), input).unwrap();
        assert_eq!(lines.join("\n") + "\n", "1\n2\n");
    }

    #[test]
    fn test_execute_files_concatenates_in_order() {
        let mut first = tempfile::NamedTempFile::new().unwrap();
        write!(first, r#"{{"foo": {{"baz": 1, "bizzle": {{"baz": 2}}}}}}"#).unwrap();
        let mut second = tempfile::NamedTempFile::new().unwrap();
        write!(second, r#"{{"foo": {{"baz": 3, "bizzle": {{"baz": 4}}}}}}"#).unwrap();

        let files = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let lines = execute_files(&options("foo..baz"), &files).unwrap();
        assert_eq!(lines, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_show_paths() {
        let opts = QueryOptions {
            show_paths: true,
            ..options("foo[*].name")
        };
        let lines = execute_query(&opts, r#"{"foo": [{"name": "a"}, {"name": "b"}]}"#).unwrap();
        assert_eq!(lines, vec!["foo.[0].name\ta", "foo.[1].name\tb"]);
    }

    #[test]
    fn test_core_profile_rejects_extensions() {
        let opts = QueryOptions {
            core: true,
            ..options("foo.`len`")
        };
        assert!(matches!(
            execute_query(&opts, "{}"),
            Err(CliError::Parse(_))
        ));
        assert_eq!(execute_query(&options("foo.`len`"), r#"{"foo": "abc"}"#).unwrap(), vec!["3"]);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            execute_query(&options("foo"), "{not json"),
            Err(CliError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let files = vec![PathBuf::from("/nonexistent/input.json")];
        assert!(matches!(
            execute_files(&options("foo"), &files),
            Err(CliError::File { .. })
        ));
    }
}
