//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::cli::server::{serve, ServerConfig};
use crate::engine::SyncRequest;
use crate::error::Result;
use crate::output::write_json_array;
use std::time::Instant;
use tokio::io::{stdout, BufWriter};
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Serve { port } => self.serve(*port).await,
            Commands::Fetch {
                list,
                since,
                since_path,
            } => {
                let request = SyncRequest::new(list.clone())
                    .with_since(since.clone())
                    .with_since_path(since_path.clone());
                self.fetch(request).await
            }
        }
    }

    /// Serve lists over HTTP until the process is stopped
    async fn serve(&self, port: u16) -> Result<()> {
        let engine = self.cli.settings.build_engine().await?;
        serve(engine, ServerConfig { port }).await
    }

    /// Write one list to stdout as a JSON array
    async fn fetch(&self, request: SyncRequest) -> Result<()> {
        let engine = self.cli.settings.build_engine().await?;
        let start = Instant::now();

        let entities = engine.start(request).await?;
        let mut out = BufWriter::new(stdout());
        let written = write_json_array(entities, &mut out).await?;

        info!(
            "Wrote {} entities in {:.2}s",
            written,
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }
}

impl std::fmt::Debug for Runner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("command", &self.cli.command)
            .finish_non_exhaustive()
    }
}
