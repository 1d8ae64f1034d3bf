//! Relational schema shared by the API (startup migration) and the schema CLI.

/// Idempotent DDL for every table. Statements contain no inner `;` so the
/// script can also be split and run statement by statement.
pub const SCHEMA_SQL: &str = include_str!("../migrations/0001_schema.sql");

