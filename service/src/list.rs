//! The `list` command: print stored entries as an aligned table.

use core::iter;
use std::{io, path::Path};

use chrono::NaiveDateTime;
use eyre::{WrapErr as _, bail};

use crate::db::{self, HoneypotEntry, Pool, WaitlistEntry};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Spaces between columns.
const PADDING: usize = 2;

/// Which table to print.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Waitlist,
    Honeypot,
}

impl From<bool> for Listing {
    fn from(honeypot: bool) -> Self {
        if honeypot {
            Self::Honeypot
        } else {
            Self::Waitlist
        }
    }
}

/// Open the database at `database` and write the selected table to `out`.
///
/// A plain file must already exist; the schema is created if it is missing.
/// `:memory:` and `file:` URIs are handed to SQLite as they are.
///
/// # Errors
///
/// Returns an error if the file does not exist, the database cannot be
/// opened or queried, or writing to `out` fails.
pub async fn run<W: io::Write>(database: &Path, out: &mut W, listing: Listing) -> eyre::Result<()> {
    if db::is_plain_file(database) && !database.try_exists().wrap_err("stat database")? {
        bail!("database file {:?} not found", database);
    }

    let pool = db::init(database).await.wrap_err("open database")?;
    let result = write_listing(&pool, out, listing).await;
    pool.close().await;
    result
}

/// Query the selected table and render it to `out`.
///
/// # Errors
///
/// Returns an error if the query or a write fails.
pub async fn write_listing<W: io::Write>(
    pool: &Pool,
    out: &mut W,
    listing: Listing,
) -> eyre::Result<()> {
    let table = match listing {
        Listing::Waitlist => waitlist_table(
            &db::list_waitlist(pool)
                .await
                .wrap_err("query waitlist")?,
        ),
        Listing::Honeypot => honeypot_table(
            &db::list_honeypot(pool)
                .await
                .wrap_err("query honeypot")?,
        ),
    };
    table.write_to(out).wrap_err("flush output")
}

fn timestamp(created_at: &NaiveDateTime) -> String {
    created_at.format(TIMESTAMP_FORMAT).to_string()
}

fn waitlist_table(entries: &[WaitlistEntry]) -> Table {
    let mut table = Table::new(&["ID", "Email", "Created At"], "(no entries)");
    for entry in entries {
        table.push(vec![
            entry.id.to_string(),
            entry.email.clone(),
            timestamp(&entry.created_at),
        ]);
    }
    table
}

fn honeypot_table(entries: &[HoneypotEntry]) -> Table {
    let mut table = Table::new(
        &["ID", "Email", "Trap Value", "Created At"],
        "(no honeypot entries)",
    );
    for entry in entries {
        table.push(vec![
            entry.id.to_string(),
            entry.email.clone(),
            entry.trap_value.clone(),
            timestamp(&entry.created_at),
        ]);
    }
    table
}

/// Rows of cells, rendered with every column but the last padded to its
/// widest cell.
#[derive(Debug)]
struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
    placeholder: &'static str,
}

impl Table {
    fn new(header: &[&str], placeholder: &'static str) -> Self {
        Self {
            header: header.iter().map(|&cell| cell.to_owned()).collect(),
            rows: Vec::new(),
            placeholder,
        }
    }

    fn push(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.header.len(), "row width must match header");
        self.rows.push(row);
    }

    /// Body rows, or a single placeholder row as wide as the header.
    fn body(&self) -> Vec<Vec<String>> {
        if self.rows.is_empty() {
            let mut row = vec![String::new(); self.header.len()];
            if let Some(first) = row.first_mut() {
                self.placeholder.clone_into(first);
            }
            vec![row]
        } else {
            self.rows.clone()
        }
    }

    fn write_to<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        let body = self.body();
        let lines: Vec<&Vec<String>> = iter::once(&self.header).chain(&body).collect();

        let widths: Vec<usize> = (0..self.header.len())
            .map(|column| {
                lines
                    .iter()
                    .filter_map(|line| line.get(column))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        for line in lines {
            let mut rendered = String::new();
            let last = line.len().saturating_sub(1);
            for (column, cell) in line.iter().enumerate() {
                rendered.push_str(cell);
                if column < last {
                    let width = widths.get(column).copied().unwrap_or(0);
                    let fill = width.saturating_sub(cell.chars().count()) + PADDING;
                    rendered.extend(iter::repeat_n(' ', fill));
                }
            }
            writeln!(out, "{}", rendered.trim_end())?;
        }
        out.flush()
    }
}
