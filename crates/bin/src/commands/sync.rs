//! Sync two document files through the in-memory protocol driver.

use accord::{Document, SyncConfig, SyncState, sync_documents};

use super::{CommandResult, open_replica, save};
use crate::cli::{Cli, SyncArgs};
use crate::output::{OutputFormat, print_json};

/// Open both sides of a sync. Each keeps its own actor even when `--actor`
/// is set.
fn open_pair(args: &SyncArgs, cli: &Cli) -> Result<(Document, Document), accord::Error> {
    if cli.actor.is_some() {
        tracing::debug!("Ignoring --actor for sync");
    }
    Ok((open_replica(&args.a)?, open_replica(&args.b)?))
}

/// Run the sync command
pub fn run(args: &SyncArgs, cli: &Cli) -> CommandResult {
    let (mut a, mut b) = open_pair(args, cli)?;

    let config = SyncConfig::default().with_max_rounds(args.max_rounds);
    let report = sync_documents(
        &mut a,
        &mut SyncState::new(),
        &mut b,
        &mut SyncState::new(),
        &config,
    )?;
    save(&mut a, &args.a)?;
    save(&mut b, &args.b)?;

    match cli.format {
        OutputFormat::Human => {
            let status = if report.converged {
                "converged"
            } else {
                "did not converge"
            };
            println!("Sync {status} after {} round(s)", report.rounds);
        }
        OutputFormat::Json => print_json(&serde_json::json!({
            "rounds": report.rounds,
            "converged": report.converged,
            "heads": a.get_heads().iter().map(|h| h.to_hex()).collect::<Vec<_>>(),
        }))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Commands;
    use accord::ROOT;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_sync_keeps_replica_actors_distinct() {
        let dir = TempDir::new().unwrap();
        let (path_a, path_b) = (dir.path().join("a.accord"), dir.path().join("b.accord"));
        let mut doc = Document::new();
        doc.transact(|tx| tx.put(&ROOT, "k", 1)).unwrap();
        doc.save_to_file(&path_a).unwrap();
        Document::new().save_to_file(&path_b).unwrap();

        let actor = "02".repeat(16);
        let cli = Cli::try_parse_from([
            "accord",
            "--actor",
            &actor,
            "sync",
            path_a.to_str().unwrap(),
            path_b.to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Sync(args) = &cli.command else {
            panic!("expected sync command");
        };

        let (a, b) = open_pair(args, &cli).unwrap();
        assert_ne!(a.actor(), b.actor());
        assert_ne!(a.actor().to_hex(), actor);
        assert_ne!(b.actor().to_hex(), actor);

        run(args, &cli).unwrap();
        let a = open_replica(&path_a).unwrap();
        let b = open_replica(&path_b).unwrap();
        assert_eq!(a.get_heads(), b.get_heads());
    }
}
