//! verdicomply-schema: maintenance utility for the VerdiComply database schema.
//!
//! Lists, drops and re-creates the tables of the `public` schema, and runs
//! ad-hoc SQL. Without a subcommand it starts an interactive menu.

use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

mod commands;
mod script;

#[derive(Parser)]
#[command(name = "verdicomply-schema")]
#[command(author, version, about = "Utilitário de gerenciamento do esquema VerdiComply", long_about = None)]
struct Cli {
    /// Postgres connection string
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Limpa o esquema (remove todas as tabelas e sequências)
    Clean,
    /// Inicializa o banco com todas as tabelas e dados básicos
    Init,
    /// Lista todas as tabelas e sequências
    List,
    /// Executa o comando SQL especificado
    Execute {
        /// SQL statement to run
        sql: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    verdicomply_observability::init();

    let cli = Cli::parse();
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&cli.database_url)
        .await?;

    match cli.command {
        Some(Commands::Clean) => {
            println!("Executando limpeza automática do esquema...");
            commands::clean(&pool).await
        }
        Some(Commands::Init) => {
            println!("Inicializando banco de dados com estrutura completa...");
            commands::init(&pool).await
        }
        Some(Commands::List) => {
            println!("Listando tabelas do esquema...");
            commands::list(&pool).await
        }
        Some(Commands::Execute { sql }) => {
            println!("Executando SQL: {sql}");
            commands::execute(&pool, &sql).await
        }
        None => interactive(&pool).await,
    }
}

async fn interactive(pool: &PgPool) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_menu().await?;
        let Some(choice) = lines.next_line().await? else {
            return Ok(());
        };

        let outcome = match choice.trim().parse::<u8>() {
            Ok(1) => commands::list(pool).await,
            Ok(2) => commands::clean(pool).await,
            Ok(3) => commands::init(pool).await,
            Ok(4) => prompt_sql(pool, &mut lines).await,
            Ok(0) => return Ok(()),
            _ => {
                println!("Opção inválida. Tente novamente.");
                Ok(())
            }
        };

        if let Err(err) = outcome {
            eprintln!("Erro: {err:#}");
        }
    }
}

async fn print_menu() -> anyhow::Result<()> {
    println!("\n===== GERENCIADOR DE ESQUEMA VERDICOMPLY =====");
    println!("1. Listar tabelas no esquema");
    println!("2. Limpar esquema (remover todas as tabelas e sequências)");
    println!("3. Inicializar banco com tabelas e dados iniciais");
    println!("4. Executar SQL customizado");
    println!("0. Sair");

    let mut stdout = tokio::io::stdout();
    stdout.write_all("Escolha uma opção: ".as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

async fn prompt_sql(pool: &PgPool, lines: &mut Lines<BufReader<Stdin>>) -> anyhow::Result<()> {
    println!("\n--- EXECUTAR SQL CUSTOMIZADO ---");
    println!("Digite seu comando SQL (ou 'voltar' para retornar ao menu):");

    let Some(sql) = lines.next_line().await? else {
        return Ok(());
    };
    let sql = sql.trim();
    if sql.is_empty() || sql.eq_ignore_ascii_case("voltar") {
        return Ok(());
    }
    commands::execute(pool, sql).await
}
