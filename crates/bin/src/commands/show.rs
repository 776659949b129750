//! Print the JSON materialization of a document.

use accord::{ROOT, ReadDoc};

use super::{CommandResult, open};
use crate::cli::{Cli, ShowArgs};
use crate::output::OutputFormat;

/// Run the show command
pub fn run(args: &ShowArgs, cli: &Cli) -> CommandResult {
    let doc = open(&args.file, cli)?;
    let obj = args.obj.unwrap_or(ROOT);
    let json = doc.to_json(&obj)?;

    match cli.format {
        OutputFormat::Human => println!("{}", serde_json::to_string_pretty(&json)?),
        OutputFormat::Json => println!("{}", serde_json::to_string(&json)?),
    }
    Ok(())
}
