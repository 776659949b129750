/*! Integration tests for Accord.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - document: Merging, forking and history queries across replicas
 * - text: Text editing, cursors and marks under concurrent edits
 * - sync: The sync protocol between two documents
 * - persistence: Snapshots, incremental saves and files on disk
 * - properties: Property tests for convergence and order independence
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("accord=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod document;
mod helpers;
mod persistence;
mod properties;
mod sync;
mod text;
