//! Merge one document file into another.

use super::{CommandResult, open, open_replica, save};
use crate::cli::{Cli, MergeArgs};
use crate::output::{OutputFormat, print_json};

/// Run the merge command
pub fn run(args: &MergeArgs, cli: &Cli) -> CommandResult {
    let mut target = open(&args.target, cli)?;
    let source = open_replica(&args.source)?;

    let before = target.get_history().len();
    let heads = target.merge(&source)?;
    let applied = target.get_history().len() - before;

    let output = args.output.as_ref().unwrap_or(&args.target);
    save(&mut target, output)?;

    match cli.format {
        OutputFormat::Human => {
            println!("Applied {applied} change(s) into {}", output.display());
            println!("Heads:   {}", heads.len());
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "output": output.display().to_string(),
            "applied": applied,
            "heads": heads.iter().map(|h| h.to_hex()).collect::<Vec<_>>(),
        }))?,
    }
    Ok(())
}
