//! Running multi-statement SQL scripts one statement at a time.
//!
//! A failing statement is rolled back to its own savepoint and counted; the
//! rest of the script keeps going. The enclosing transaction commits when at
//! least one statement succeeded and rolls back when every one failed.

use sqlx::PgPool;

const PREVIEW_CHARS: usize = 100;

/// Outcome counts of one script run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScriptReport {
    pub succeeded: usize,
    pub failed: usize,
}

/// Split on `;`, trimming each chunk and dropping empty and comment-only ones.
///
/// Comment lines at the top of a chunk are stripped before the statement is
/// kept, so a header comment does not swallow the statement below it.
pub fn split_statements(script: &str) -> Vec<&str> {
    script
        .split(';')
        .map(strip_leading_comments)
        .filter(|chunk| !chunk.is_empty())
        .collect()
}

fn strip_leading_comments(chunk: &str) -> &str {
    let mut rest = chunk.trim();
    while rest.starts_with("--") {
        rest = match rest.find('\n') {
            Some(newline) => rest[newline + 1..].trim_start(),
            None => "",
        };
    }
    rest.trim_end()
}

/// First 100 characters of a statement, with `...` when it was cut.
pub fn preview(statement: &str) -> String {
    let mut chars = statement.chars();
    let head: String = chars.by_ref().take(PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub async fn run_script(pool: &PgPool, name: &str, script: &str) -> anyhow::Result<ScriptReport> {
    let mut report = ScriptReport::default();
    let mut tx = pool.begin().await?;

    for statement in split_statements(script) {
        let mut savepoint = sqlx::Connection::begin(&mut *tx).await?;
        match sqlx::raw_sql(statement).execute(&mut *savepoint).await {
            Ok(_) => {
                savepoint.commit().await?;
                report.succeeded += 1;
            }
            Err(err) => {
                savepoint.rollback().await?;
                report.failed += 1;
                tracing::debug!(error = %err, "script statement failed");
                println!("Aviso: Falha ao executar: {}", preview(statement));
                println!("Erro: {err}");
            }
        }
    }

    if report.succeeded > 0 {
        tx.commit().await?;
    } else {
        tx.rollback().await?;
    }

    println!(
        "{name} processado. {} comandos executados com sucesso. {} falhas.",
        report.succeeded, report.failed
    );
    Ok(report)
}
