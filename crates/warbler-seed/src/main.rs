mod fixtures;

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use warbler_db::Database;

/// Reset the Warbler database and fill it with CSV fixtures.
#[derive(Debug, Parser)]
#[command(name = "warbler-seed", version)]
struct Args {
    /// Directory holding users.csv, messages.csv, follows.csv and optionally likes.csv
    #[arg(long, default_value = "generator")]
    dir: PathBuf,

    /// Database connection URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warbler_seed=info,warbler_db=info".into()),
        )
        .init();

    let args = Args::parse();

    // Parse everything before touching the database
    let data = fixtures::load_dir(&args.dir)?;

    let db = Database::connect(&args.database_url)?;
    db.reset()?;
    db.load_seed(&data)?;

    info!(
        users = data.users.len(),
        messages = data.messages.len(),
        follows = data.follows.len(),
        likes = data.likes.len(),
        "Seeded {}",
        args.database_url
    );
    Ok(())
}
