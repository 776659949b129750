//! List the changes in a document.

use accord::Change;
use chrono::DateTime;

use super::{CommandResult, open, short_hash};
use crate::cli::{Cli, FileArgs};
use crate::output::{OutputFormat, print_json, print_table};

/// RFC 3339 rendering of a change time, or `-` when none was recorded.
fn format_time(change: &Change) -> String {
    if change.time() == 0 {
        return "-".to_string();
    }
    DateTime::from_timestamp_millis(change.time())
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| change.time().to_string())
}

/// Run the history command
pub fn run(args: &FileArgs, cli: &Cli) -> CommandResult {
    let doc = open(&args.file, cli)?;
    let history = doc.get_history();

    match cli.format {
        OutputFormat::Human => {
            if history.is_empty() {
                println!("No changes.");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = history
                .iter()
                .map(|change| {
                    vec![
                        short_hash(&change.hash()),
                        change.actor().to_hex(),
                        change.seq().to_string(),
                        change.len().to_string(),
                        format_time(change),
                        change.message().unwrap_or_default().to_string(),
                    ]
                })
                .collect();
            print_table(&["HASH", "ACTOR", "SEQ", "OPS", "TIME", "MESSAGE"], &rows);
        }
        OutputFormat::Json => {
            let entries: Vec<serde_json::Value> = history
                .iter()
                .map(|change| {
                    serde_json::json!({
                        "hash": change.hash().to_hex(),
                        "actor": change.actor().to_hex(),
                        "seq": change.seq(),
                        "ops": change.len(),
                        "time": change.time(),
                        "message": change.message(),
                        "deps": change.deps().iter().map(|d| d.to_hex()).collect::<Vec<_>>(),
                    })
                })
                .collect();
            print_json(&serde_json::Value::Array(entries))?;
        }
    }

    Ok(())
}
