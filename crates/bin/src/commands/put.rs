//! Write a JSON value at a root key.

use accord::{CommitOptions, Composite, ROOT};

use super::{CommandResult, open, save};
use crate::cli::{Cli, PutArgs};
use crate::output::{OutputFormat, print_json};

/// Run the put command
pub fn run(args: &PutArgs, cli: &Cli) -> CommandResult {
    let value = Composite::from_json_str(&args.json)?;
    let mut doc = open(&args.file, cli)?;

    let mut tx = doc.transaction();
    tx.put_composite(&ROOT, args.key.as_str(), value)?;
    let mut options = CommitOptions::default();
    if let Some(message) = &args.message {
        options = options.with_message(message.clone());
    }
    let hash = tx.commit_with(options)?;
    save(&mut doc, &args.file)?;

    match cli.format {
        OutputFormat::Human => match hash {
            Some(hash) => println!("Committed {hash}"),
            None => println!("Nothing to commit"),
        },
        OutputFormat::Json => print_json(&serde_json::json!({
            "change": hash.map(|h| h.to_hex()),
        }))?,
    }
    Ok(())
}
