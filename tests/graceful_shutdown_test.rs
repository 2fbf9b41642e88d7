//! Integration tests for graceful shutdown functionality
//!
//! These tests verify that:
//! - Shutdown signals reach every watcher
//! - A sync stops between phases once a shutdown is requested
//! - An interrupted sync writes nothing to the export folder

use async_trait::async_trait;
use garden_sync::adapters::compiler::{ArtifactCompiler, VaultCompiler};
use garden_sync::config::GardenConfig;
use garden_sync::core::sync::{SyncCoordinator, SyncOptions, SyncSummary};
use garden_sync::domain::{CompiledArtifact, PublishCandidate, Result, VaultPath};
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::watch;

/// Compiles through the vault compiler and requests shutdown after the
/// first note
struct InterruptingCompiler {
    inner: VaultCompiler,
    shutdown_tx: watch::Sender<bool>,
}

#[async_trait]
impl ArtifactCompiler for InterruptingCompiler {
    async fn compile(&self, candidate: &PublishCandidate) -> Result<CompiledArtifact> {
        let artifact = self.inner.compile(candidate).await?;
        let _ = self.shutdown_tx.send(true);
        Ok(artifact)
    }

    async fn image_links(&self, candidate: &PublishCandidate) -> Result<Vec<VaultPath>> {
        self.inner.image_links(candidate).await
    }
}

fn vault_with_notes(count: usize) -> TempDir {
    let vault = TempDir::new().unwrap();
    for i in 0..count {
        std::fs::write(
            vault.path().join(format!("note-{i}.md")),
            format!("---\ndg-publish: true\n---\n# Note {i}\n"),
        )
        .unwrap();
    }
    vault
}

fn export_config(vault: &TempDir, export: &TempDir) -> Arc<GardenConfig> {
    let mut config = GardenConfig::new(vault.path().to_string_lossy());
    config.export.path = Some(export.path().to_string_lossy().into_owned());
    Arc::new(config)
}

#[tokio::test]
async fn test_shutdown_signal_propagation() {
    let (shutdown_tx, shutdown_rx1) = watch::channel(false);
    let shutdown_rx2 = shutdown_rx1.clone();

    assert!(!*shutdown_rx1.borrow());
    assert!(!*shutdown_rx2.borrow());

    shutdown_tx.send(true).unwrap();

    assert!(*shutdown_rx1.borrow());
    assert!(*shutdown_rx2.borrow());
}

#[tokio::test]
async fn test_shutdown_signal_timing() {
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let work_task = tokio::spawn(async move {
        let mut iterations = 0;
        while iterations < 100 {
            if *shutdown_rx.borrow_and_update() {
                break;
            }
            iterations += 1;
            tokio::time::sleep(tokio::time::Duration::from_millis(10)).await;
        }
        iterations
    });

    tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
    shutdown_tx.send(true).unwrap();

    let iterations = work_task.await.unwrap();
    assert!(iterations < 100);
    assert!(iterations > 0);
}

#[tokio::test]
async fn test_shutdown_before_sync_writes_nothing() {
    let vault = vault_with_notes(3);
    let export = TempDir::new().unwrap();
    let config = export_config(&vault, &export);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    shutdown_tx.send(true).unwrap();

    let compiler = Arc::new(VaultCompiler::new(vault.path()).unwrap());
    let coordinator = SyncCoordinator::local(config, compiler, shutdown_rx).unwrap();
    let summary = coordinator.run(SyncOptions::default()).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.published, 0);
    assert!(!export.path().join("src").exists());
}

#[tokio::test]
async fn test_shutdown_during_compile_stops_the_run() {
    let vault = vault_with_notes(3);
    let export = TempDir::new().unwrap();
    let config = export_config(&vault, &export);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let compiler = Arc::new(InterruptingCompiler {
        inner: VaultCompiler::new(vault.path()).unwrap(),
        shutdown_tx,
    });

    let coordinator = SyncCoordinator::local(config, compiler, shutdown_rx).unwrap();
    let summary = coordinator.run(SyncOptions::default()).await.unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.candidates, 3);
    assert!(summary.compiled < 3);
    assert_eq!(summary.published, 0);
    assert!(!export.path().join("src").exists());
}

#[tokio::test]
async fn test_uninterrupted_sync_completes() {
    let vault = vault_with_notes(3);
    let export = TempDir::new().unwrap();
    let config = export_config(&vault, &export);

    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    let compiler = Arc::new(VaultCompiler::new(vault.path()).unwrap());
    let coordinator = SyncCoordinator::local(config, compiler, shutdown_rx).unwrap();
    let summary = coordinator.run(SyncOptions::default()).await.unwrap();

    assert!(!summary.interrupted);
    assert_eq!(summary.published, 3);
    assert!(export.path().join("src/site/notes/note-0.md").is_file());
}

#[test]
fn test_summary_interrupted_flag() {
    let mut summary = SyncSummary::new("local", false);
    assert!(!summary.interrupted);

    summary.interrupted = true;
    assert!(summary.interrupted);
    assert!(summary.is_successful());
}
