//! Init command for creating the database and sample accounts.

use std::io::Write;
use std::path::Path;

use anyhow::Result;
use at_db::Database;

/// Runs the init command against an already-opened database.
pub fn run<W: Write>(
    writer: &mut W,
    db: &Database,
    database_path: &Path,
    sample_users: bool,
) -> Result<()> {
    writeln!(writer, "Database: {}", database_path.display())?;

    if sample_users {
        let added = db.seed_sample_employees()?;
        if added.is_empty() {
            writeln!(writer, "Sample employees already present.")?;
        }
        for name in added {
            writeln!(writer, "Sample user '{name}' added successfully.")?;
        }
    }

    Ok(())
}
