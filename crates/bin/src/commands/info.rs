//! Document info command - shows actors, heads and history size.

use super::{CommandResult, open};
use crate::cli::{Cli, FileArgs};
use crate::output::{OutputFormat, print_json};

/// Run the info command
pub fn run(args: &FileArgs, cli: &Cli) -> CommandResult {
    let doc = open(&args.file, cli)?;

    let actors: Vec<String> = doc.actors().iter().map(|a| a.to_hex()).collect();
    let heads: Vec<String> = doc.get_heads().iter().map(|h| h.to_hex()).collect();
    let changes = doc.get_history().len();

    match cli.format {
        OutputFormat::Human => {
            println!("File:        {}", args.file.display());
            println!("Changes:     {changes}");
            println!("Max op:      {}", doc.max_op());
            println!("Pending:     {}", doc.pending_changes());
            println!("Actors:      {}", actors.len());
            for actor in &actors {
                println!("  {actor}");
            }
            println!("Heads:       {}", heads.len());
            for head in &heads {
                println!("  {head}");
            }
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "file": args.file.display().to_string(),
            "changes": changes,
            "max_op": doc.max_op(),
            "pending": doc.pending_changes(),
            "actors": actors,
            "heads": heads,
        }))?,
    }

    Ok(())
}
