//! Employee management commands.

use std::io::Write;

use anyhow::{Context, Result};
use at_core::{Email, Role};
use at_db::{Database, NewEmployee};

/// Adds an employee.
pub fn add<W: Write>(
    writer: &mut W,
    db: &Database,
    name: &str,
    email: &str,
    password: Option<&str>,
    role: Role,
) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        anyhow::bail!("--name cannot be empty");
    }
    let email = Email::new(email).context("invalid --email")?;
    let employee = db.insert_employee(&NewEmployee {
        name: name.to_string(),
        email,
        password: password.map(str::to_string),
        role,
    })?;

    writeln!(
        writer,
        "Added {} <{}> as {} (id {})",
        employee.name, employee.email, employee.role, employee.id
    )?;
    Ok(())
}

/// Lists employees.
pub fn list<W: Write>(writer: &mut W, db: &Database, json: bool) -> Result<()> {
    let employees = db.list_employees()?;

    if json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&employees)?)?;
        return Ok(());
    }

    if employees.is_empty() {
        writeln!(writer, "No employees.")?;
        return Ok(());
    }

    let name_width = employees.iter().map(|e| e.name.len()).max().unwrap_or(0);
    let email_width = employees
        .iter()
        .map(|e| e.email.as_str().len())
        .max()
        .unwrap_or(0);
    for employee in employees {
        writeln!(
            writer,
            "{:<4}{:<name_width$}  {:<email_width$}  {}",
            employee.id,
            employee.name,
            employee.email.as_str(),
            employee.role,
        )?;
    }
    Ok(())
}
