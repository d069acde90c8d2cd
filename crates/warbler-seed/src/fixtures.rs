//! CSV fixture reading. One file per table under the fixture directory.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use warbler_db::seed::SeedData;

pub const USERS_FILE: &str = "users.csv";
pub const MESSAGES_FILE: &str = "messages.csv";
pub const FOLLOWS_FILE: &str = "follows.csv";
/// Optional; older fixture sets ship without likes.
pub const LIKES_FILE: &str = "likes.csv";

pub fn read_rows<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rows = Vec::new();
    for (i, record) in rdr.deserialize().enumerate() {
        // +2: header line plus 1-based numbering
        rows.push(record.with_context(|| format!("bad row at line {}", i + 2))?);
    }
    Ok(rows)
}

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let file = File::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let rows = read_rows(file).with_context(|| format!("cannot parse {}", path.display()))?;
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

pub fn load_dir(dir: &Path) -> Result<SeedData> {
    let likes_path = dir.join(LIKES_FILE);
    let likes = if likes_path.exists() {
        read_file(&likes_path)?
    } else {
        info!("No {} in {}, skipping likes", LIKES_FILE, dir.display());
        Vec::new()
    };

    Ok(SeedData {
        users: read_file(&dir.join(USERS_FILE))?,
        messages: read_file(&dir.join(MESSAGES_FILE))?,
        follows: read_file(&dir.join(FOLLOWS_FILE))?,
        likes,
    })
}
