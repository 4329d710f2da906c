use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, OpenFlags};

use crate::error::{WideFormatError, WideFormatResult};
use crate::models::Question;

pub const QUESTIONS_TABLE: &str = "questions";
pub const OPTIONS_TABLE: &str = "options";
pub const INTERVIEWS_TABLE: &str = "interviews";
pub const ANSWERS_TABLE: &str = "answers";

pub const REQUIRED_TABLES: &[&str] = &[
    QUESTIONS_TABLE,
    OPTIONS_TABLE,
    INTERVIEWS_TABLE,
    ANSWERS_TABLE,
];

/// Layout of the survey tables this tool reads. The tool never executes it
/// against user databases; it documents the contract and seeds fixtures.
pub const SURVEY_SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS questions (
    id INTEGER PRIMARY KEY,
    survey_id TEXT NOT NULL,
    fieldname TEXT NOT NULL,
    qtype TEXT,
    fieldtype TEXT,
    questiontext TEXT,
    position INTEGER
);

CREATE TABLE IF NOT EXISTS options (
    question_id INTEGER NOT NULL REFERENCES questions(id),
    value TEXT NOT NULL,
    label TEXT
);

CREATE TABLE IF NOT EXISTS interviews (
    id INTEGER PRIMARY KEY,
    survey_id TEXT NOT NULL,
    starttime TEXT,
    stoptime TEXT,
    lastmod TEXT
);

CREATE TABLE IF NOT EXISTS answers (
    interview_id INTEGER NOT NULL REFERENCES interviews(id),
    question_id INTEGER NOT NULL REFERENCES questions(id),
    value_text TEXT,
    value_json TEXT
);
"#;

const LOAD_QUESTIONS_SQL: &str = r#"
SELECT id, fieldname, qtype, fieldtype, questiontext, position
FROM questions
WHERE survey_id = ?1
ORDER BY position, id
"#;

/// Opens the survey database without creating it and without write access.
pub fn open_survey_database(path: &Path) -> WideFormatResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    Connection::open_with_flags(path, flags).map_err(|source| WideFormatError::Connection {
        path: path.to_path_buf(),
        source,
    })
}

pub fn verify_input_schema(connection: &Connection) -> WideFormatResult<()> {
    let mut statement = connection.prepare(
        "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') AND name = ?1 LIMIT 1",
    )?;

    let mut missing = Vec::new();
    for table in REQUIRED_TABLES {
        if !statement.exists([table])? {
            missing.push((*table).to_string());
        }
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(WideFormatError::SchemaMismatch { missing })
    }
}

/// Loads every question of `survey_id` in display order.
pub fn load_questions(connection: &Connection, survey_id: &str) -> WideFormatResult<Vec<Question>> {
    let mut statement = connection.prepare(LOAD_QUESTIONS_SQL)?;
    let rows = statement.query_map([survey_id], |row| {
        Ok(Question {
            id: sql_value_key(row.get::<usize, SqlValue>(0)?),
            fieldname: row.get::<usize, Option<String>>(1)?.unwrap_or_default(),
            qtype: row.get::<usize, Option<String>>(2)?.unwrap_or_default(),
            fieldtype: sql_value_text(row.get::<usize, SqlValue>(3)?),
            questiontext: sql_value_text(row.get::<usize, SqlValue>(4)?),
            position: sql_value_position(row.get::<usize, SqlValue>(5)?),
        })
    })?;

    let mut questions = Vec::new();
    for row in rows {
        questions.push(row?);
    }
    Ok(questions)
}

/// Prepares `sql` against the survey database and checks it yields
/// `expected_columns` result columns. Returns the column names SQLite reports.
pub fn verify_statement(
    connection: &Connection,
    sql: &str,
    expected_columns: usize,
) -> WideFormatResult<Vec<String>> {
    let statement = connection
        .prepare(sql)
        .map_err(|error| WideFormatError::StatementInvalid(error.to_string()))?;
    let names = statement
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    if names.len() != expected_columns {
        return Err(WideFormatError::StatementInvalid(format!(
            "expected {expected_columns} result columns, statement yields {}",
            names.len()
        )));
    }
    Ok(names)
}

/// Descriptive columns are informational only, so any storage class is
/// accepted and rendered as text.
fn sql_value_text(value: SqlValue) -> Option<String> {
    match value {
        SqlValue::Null => None,
        other => Some(sql_value_key(other)),
    }
}

/// Ordering already happened in SQL; non-numeric positions are dropped.
fn sql_value_position(value: SqlValue) -> Option<f64> {
    match value {
        SqlValue::Integer(value) => Some(value as f64),
        SqlValue::Real(value) => Some(value),
        SqlValue::Text(value) => value.trim().parse().ok(),
        SqlValue::Null | SqlValue::Blob(_) => None,
    }
}

fn sql_value_key(value: SqlValue) -> String {
    match value {
        SqlValue::Null => String::new(),
        SqlValue::Integer(value) => value.to_string(),
        SqlValue::Real(value) => value.to_string(),
        SqlValue::Text(value) => value,
        SqlValue::Blob(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    }
}
