//! Transcript replay and checking.
//!
//! A transcript holds one inbound frame per line, exactly as received from
//! the server. Blank lines are ignored; line numbers in errors are 1-based.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use clap::Args;
use noria_client::{ClientConfig, Diagnostic, MessageKind, Reconciler, decode_frame};
use noria_dom::HeadlessDocument;
use serde::Serialize;
use tracing::info;

use crate::error::{ReplayError, Result};

#[derive(Debug, Clone, Args)]
pub struct ReplayArgs {
    /// Transcript file, one JSON frame per line.
    pub transcript: PathBuf,

    /// Print a single JSON summary instead of HTML and diagnostics.
    #[arg(long)]
    pub json: bool,

    /// Client configuration (TOML, or JSON for `.json` files).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Transcript file, one JSON frame per line.
    pub transcript: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplaySummary {
    pub html: String,
    /// The most recent diagnostics, at most `diagnostics_capacity` of them.
    pub diagnostics: Vec<Diagnostic>,
    /// Every diagnostic raised, including those dropped from `diagnostics`.
    pub diagnostics_total: u64,
    pub frames: usize,
    pub applied: usize,
    pub skipped: usize,
    pub effects: usize,
    pub live_nodes: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CheckSummary {
    pub frames: usize,
    pub messages: BTreeMap<MessageKind, usize>,
}

fn frames(source: &str) -> impl Iterator<Item = (usize, &str)> {
    source
        .lines()
        .enumerate()
        .map(|(index, line)| (index + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply every frame of `source` to a fresh headless document.
pub fn replay_source(source: &str, config: ClientConfig) -> Result<ReplaySummary> {
    let doc = HeadlessDocument::with_anchor(&config.mount_anchor);
    let mut reconciler = Reconciler::with_config(doc, config);
    let mut summary = ReplaySummary {
        html: String::new(),
        diagnostics: Vec::new(),
        diagnostics_total: 0,
        frames: 0,
        applied: 0,
        skipped: 0,
        effects: 0,
        live_nodes: 0,
    };
    for (line, frame) in frames(source) {
        let report = reconciler
            .process_frame(frame)
            .map_err(|error| ReplayError::from_frame(line, error))?;
        summary.frames += 1;
        summary.applied += report.applied;
        summary.skipped += report.skipped;
        summary.effects += report.effects;
    }
    summary.html = reconciler.doc().mounted_html();
    summary.diagnostics = reconciler.diagnostics().iter().cloned().collect();
    summary.diagnostics_total = reconciler.diagnostics().total();
    summary.live_nodes = reconciler.nodes().len();
    info!(
        target: "noria_replay",
        frames = summary.frames,
        applied = summary.applied,
        skipped = summary.skipped,
        "replay finished"
    );
    Ok(summary)
}

/// Decode every frame of `source` without applying anything.
pub fn check_source(source: &str) -> Result<CheckSummary> {
    let mut summary = CheckSummary::default();
    for (line, frame) in frames(source) {
        let messages =
            decode_frame(frame).map_err(|source| ReplayError::Decode { line, source })?;
        summary.frames += 1;
        for message in messages {
            *summary.messages.entry(message.kind()).or_default() += 1;
        }
    }
    Ok(summary)
}

pub fn run_replay(args: ReplayArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    let source = read(&args.transcript)?;
    let summary = replay_source(&source, config)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", summary.html);
        let dropped = summary.diagnostics_total.saturating_sub(summary.diagnostics.len() as u64);
        if dropped > 0 {
            println!("warning: {dropped} earlier diagnostics dropped");
        }
        for diagnostic in &summary.diagnostics {
            println!("warning: {diagnostic}");
        }
    }
    Ok(())
}

pub fn run_check(args: CheckArgs) -> Result<()> {
    let source = read(&args.transcript)?;
    let summary = check_source(&source)?;
    println!("frames: {}", summary.frames);
    for kind in MessageKind::ALL {
        let count = summary.messages.get(&kind).copied().unwrap_or(0);
        println!("{kind}: {count}");
    }
    Ok(())
}
