//! Schema maintenance operations against the `public` schema.

use sqlx::{Column, Executor, PgPool, Row};

use verdicomply_infra::schema::SCHEMA_SQL;

use crate::script::run_script;

const SEED_SQL: &str = include_str!("../sql/seed.sql");

const TABLES_QUERY: &str = "SELECT table_name::text FROM information_schema.tables \
     WHERE table_schema = 'public' AND table_type = 'BASE TABLE' ORDER BY table_name";

const SEQUENCES_QUERY: &str = "SELECT sequence_name::text FROM information_schema.sequences \
     WHERE sequence_schema = 'public' ORDER BY sequence_name";

/// Full initialization script: tables, indexes and reference data.
pub fn full_init_script() -> String {
    format!("{SCHEMA_SQL}\n;\n{SEED_SQL}")
}

async fn tables(pool: &PgPool) -> anyhow::Result<Vec<String>> {
    Ok(sqlx::query_scalar::<_, String>(TABLES_QUERY).fetch_all(pool).await?)
}

async fn sequences(pool: &PgPool) -> anyhow::Result<Vec<String>> {
    Ok(sqlx::query_scalar::<_, String>(SEQUENCES_QUERY).fetch_all(pool).await?)
}

pub async fn list(pool: &PgPool) -> anyhow::Result<()> {
    println!("\n--- TABELAS NO ESQUEMA ---");
    let tables = tables(pool).await?;
    if tables.is_empty() {
        println!("Nenhuma tabela encontrada no esquema.");
    }
    for table in &tables {
        println!("{table}");
    }

    println!("\n--- SEQUÊNCIAS NO ESQUEMA ---");
    let sequences = sequences(pool).await?;
    if sequences.is_empty() {
        println!("Nenhuma sequência encontrada no esquema.");
    }
    for sequence in &sequences {
        println!("{sequence}");
    }
    Ok(())
}

/// Drop every table and sequence, reporting each one. Individual failures are
/// printed and do not stop the sweep.
pub async fn clean(pool: &PgPool) -> anyhow::Result<()> {
    println!("\n--- LIMPANDO ESQUEMA ---");

    for table in tables(pool).await? {
        let statement = format!("DROP TABLE IF EXISTS {} CASCADE", quote_ident(&table));
        match sqlx::raw_sql(&statement).execute(pool).await {
            Ok(_) => println!("Tabela removida: {table}"),
            Err(err) => println!("Erro ao remover tabela {table}: {err}"),
        }
    }

    for sequence in sequences(pool).await? {
        let statement = format!("DROP SEQUENCE IF EXISTS {} CASCADE", quote_ident(&sequence));
        match sqlx::raw_sql(&statement).execute(pool).await {
            Ok(_) => println!("Sequência removida: {sequence}"),
            Err(err) => println!("Erro ao remover sequência {sequence}: {err}"),
        }
    }

    println!("\nEsquema limpo com sucesso!");
    tracing::info!("schema cleaned");
    Ok(())
}

pub async fn init(pool: &PgPool) -> anyhow::Result<()> {
    println!("\n--- INICIALIZANDO BANCO DE DADOS ---");
    println!("Realizando limpeza do esquema antes da inicialização...");
    clean(pool).await?;

    println!("\nExecutando script de inicialização completa...");
    let report = run_script(pool, "full_init.sql", &full_init_script()).await?;
    if report.succeeded > 0 {
        println!("\nBanco de dados inicializado com sucesso!");
        println!("Estrutura completa criada com todas as tabelas, sequências e dados iniciais.");
    }
    tracing::info!(succeeded = report.succeeded, failed = report.failed, "schema initialized");
    Ok(())
}

/// Run one ad-hoc statement. `select` statements print a tab-separated table.
pub async fn execute(pool: &PgPool, sql: &str) -> anyhow::Result<()> {
    println!("\n--- EXECUTANDO SQL CUSTOMIZADO ---");
    println!("SQL fornecido: {sql}");

    if is_query(sql) {
        let described = pool.describe(sql).await?;
        let headers: Vec<&str> = described.columns().iter().map(|c| c.name()).collect();
        println!("{}", tab_row(headers.iter().copied()));
        println!("{}", tab_row(headers.iter().map(|_| "--------")));

        // Simple-protocol rows arrive as text, so every column decodes as a string.
        let rows = sqlx::raw_sql(sql).fetch_all(pool).await?;
        for row in rows {
            let values: Vec<String> = (0..row.len())
                .map(|i| {
                    row.try_get_unchecked::<Option<String>, _>(i)
                        .ok()
                        .flatten()
                        .unwrap_or_else(|| "null".to_string())
                })
                .collect();
            println!("{}", tab_row(values.iter().map(String::as_str)));
        }
    } else {
        let affected = sqlx::raw_sql(sql).execute(pool).await?.rows_affected();
        println!("Comando executado com sucesso! {affected} linha(s) afetada(s).");
    }
    Ok(())
}

pub fn is_query(sql: &str) -> bool {
    sql.trim().to_lowercase().starts_with("select")
}

fn tab_row<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(|cell| format!("{cell}\t")).collect()
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
