//! Subcommand implementations. Each command loads document files, works on
//! them in memory and saves them back as snapshots.

use std::path::Path;

use accord::Document;

use crate::cli::Cli;

pub mod history;
pub mod info;
pub mod init;
pub mod merge;
pub mod put;
pub mod show;
pub mod sync;

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Load a document file, switching to the configured actor if any.
pub fn open(path: &Path, cli: &Cli) -> Result<Document, accord::Error> {
    let mut doc = open_replica(path)?;
    if let Some(actor) = cli.actor {
        doc.set_actor(actor);
    }
    Ok(doc)
}

/// Load a document file under a fresh random actor.
///
/// Used where several files are opened at once, since two replicas must
/// never write as the same actor.
pub fn open_replica(path: &Path) -> Result<Document, accord::Error> {
    let doc = Document::load_from_file(path)?;
    tracing::debug!(path = %path.display(), heads = doc.get_heads().len(), "Opened document");
    Ok(doc)
}

/// Save a document, logging where it went.
pub fn save(doc: &mut Document, path: &Path) -> Result<(), accord::Error> {
    doc.save_to_file(path)?;
    tracing::info!(path = %path.display(), "Saved document");
    Ok(())
}

/// Short form of a change hash for tables.
pub fn short_hash(hash: &accord::ChangeHash) -> String {
    hash.to_hex().chars().take(12).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_open_applies_actor_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.accord");
        Document::new().save_to_file(&path).unwrap();

        let actor = "01".repeat(16);
        let parsed = cli(&["accord", "--actor", &actor, "info", "x"]);
        let doc = open(&path, &parsed).unwrap();
        assert_eq!(doc.actor().to_hex(), actor);
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        let parsed = cli(&["accord", "info", "x"]);
        let err = open(&dir.path().join("nope"), &parsed).unwrap_err();
        assert!(err.is_io_error());
    }

    #[test]
    fn test_bad_actor_is_rejected_by_the_parser() {
        assert!(Cli::try_parse_from(["accord", "--actor", "xyz", "info", "x"]).is_err());
    }
}
