//! Create an empty document file.

use accord::{Document, DocumentConfig};

use super::{CommandResult, save};
use crate::cli::{Cli, InitArgs};
use crate::output::{OutputFormat, print_json};

/// Run the init command
pub fn run(args: &InitArgs, cli: &Cli) -> CommandResult {
    if args.file.exists() && !args.force {
        return Err(format!(
            "{} already exists; pass --force to replace it",
            args.file.display()
        )
        .into());
    }

    let mut config = DocumentConfig::default();
    if let Some(actor) = cli.actor {
        config = config.with_actor(actor);
    }
    let mut doc = Document::with_config(config);
    save(&mut doc, &args.file)?;

    match cli.format {
        OutputFormat::Human => println!("Created {}", args.file.display()),
        OutputFormat::Json => print_json(&serde_json::json!({
            "file": args.file.display().to_string(),
            "actor": doc.actor().to_hex(),
        }))?,
    }
    Ok(())
}
