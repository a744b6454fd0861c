//! Collaborator adapters backed by external programs.
//!
//! The scraping itself lives outside this workspace. These adapters only
//! know how to invoke a scraper and how to read what it produced.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tracing::{debug, info, warn};
use trending_core::error::CoreError;
use trending_core::ports::{Result, SearchScraper, TrendingIngestor};

/// An external program plus the leading arguments it is always given.
#[derive(Debug, Clone)]
pub struct ScraperCommand {
    program: OsString,
    args: Vec<OsString>,
}

impl ScraperCommand {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    fn run<I, S>(&self, extra: I) -> Result<Output>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command.args(extra.into_iter().map(Into::into));
        debug!("Running scraper {:?}", command);

        let output = command.output().map_err(|e| {
            CoreError::Collaborator(format!(
                "failed to start {}: {e}",
                self.program.to_string_lossy()
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CoreError::Collaborator(format!(
                "{} exited with {}: {}",
                self.program.to_string_lossy(),
                output.status,
                stderr.trim()
            )));
        }

        Ok(output)
    }
}

/// Rewrites the backing file by running the trending scraper.
///
/// The scraper writes to a private sibling file which is then renamed over
/// the target, so readers see either the old table or the new one.
pub struct CommandTrendingIngestor {
    command: ScraperCommand,
    output: PathBuf,
}

impl CommandTrendingIngestor {
    /// Invokes `command --region <R> --limit <N> --output <PATH>`.
    pub fn new(command: ScraperCommand, output: impl Into<PathBuf>) -> Self {
        Self {
            command,
            output: output.into(),
        }
    }

    fn staging_path(&self) -> PathBuf {
        let name = self
            .output
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "trending.csv".to_string());
        self.output
            .with_file_name(format!(".{name}.{}.partial", uuid::Uuid::new_v4()))
    }
}

impl TrendingIngestor for CommandTrendingIngestor {
    fn ingest(&self, region: &str, limit: usize) -> Result<()> {
        if let Some(parent) = self.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        let result = self
            .command
            .run([
                OsString::from("--region"),
                OsString::from(region),
                OsString::from("--limit"),
                OsString::from(limit.to_string()),
                OsString::from("--output"),
                staging.clone().into_os_string(),
            ])
            .and_then(|_| publish(&staging, &self.output));

        if result.is_err() {
            let _ = fs::remove_file(&staging);
        }
        result
    }
}

fn publish(staging: &Path, target: &Path) -> Result<()> {
    if !staging.exists() {
        return Err(CoreError::Collaborator(
            "trending scraper produced no output file".to_string(),
        ));
    }
    fs::rename(staging, target)?;
    info!("Replaced {}", target.display());
    Ok(())
}

/// Live search through an external program printing a JSON array.
pub struct CommandSearchScraper {
    command: ScraperCommand,
}

impl CommandSearchScraper {
    /// Invokes `command --query <Q>`.
    pub fn new(command: ScraperCommand) -> Self {
        Self { command }
    }
}

impl SearchScraper for CommandSearchScraper {
    fn scrape(&self, query: &str) -> Result<Vec<serde_json::Value>> {
        let output = self.command.run(["--query", query])?;
        serde_json::from_slice(&output.stdout).map_err(|e| {
            warn!("Search scraper printed malformed output: {e}");
            CoreError::Collaborator(format!("malformed scraper output: {e}"))
        })
    }
}

/// Stands in for a collaborator that was not configured.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

impl TrendingIngestor for Unconfigured {
    fn ingest(&self, _region: &str, _limit: usize) -> Result<()> {
        Err(CoreError::Collaborator(format!("{} not configured", self.0)))
    }
}

impl SearchScraper for Unconfigured {
    fn scrape(&self, _query: &str) -> Result<Vec<serde_json::Value>> {
        Err(CoreError::Collaborator(format!("{} not configured", self.0)))
    }
}
