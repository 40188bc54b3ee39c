use std::{error::Error, fs, io, path::PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use picosql::{Database, exec_select, parse_query};

/// Run a query against a JSON catalog of tables.
#[derive(Parser)]
#[command(name = "picosql")]
struct Cli {
    /// Path to the JSON file holding the tables
    #[arg(long, default_value = "tables.json")]
    db: PathBuf,

    /// The query to execute
    query: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let db = Database::from_json(&fs::read_to_string(&cli.db)?)?;
    let stmt = parse_query(&cli.query)?;
    let result = exec_select(&db, &stmt)?;

    result.write_csv(&mut io::stdout().lock())?;

    Ok(())
}
