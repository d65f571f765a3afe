use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use clap::{ArgAction, Parser};
use tokio::sync::mpsc;

use elemshot::capture::{
    clipboard, dependencies::CaptureDependencies, feedback, file::DownloadsSaver, BackgroundMode,
    CaptureOptions, OutputTargets,
};
use elemshot::config;
use elemshot::dom::{Document, NodeId};
use elemshot::picker::SelectorSession;

#[derive(Parser, Debug)]
#[command(name = "elemshot")]
#[command(version, about = "Element screenshot capture with clipboard and file export")]
struct Cli {
    /// Page snapshot JSON describing the document to capture from
    #[arg(long, value_name = "FILE")]
    page: Option<PathBuf>,

    /// Element to capture: #id, or a tag name (first match)
    #[arg(long, value_name = "SELECTOR")]
    select: Option<String>,

    /// Background fill (black, white, or transparent)
    #[arg(long, value_name = "MODE")]
    background: Option<String>,

    /// Skip the clipboard copy
    #[arg(long, action = ArgAction::SetTrue)]
    no_clipboard: bool,

    /// Skip the file save
    #[arg(long, action = ArgAction::SetTrue)]
    no_save: bool,

    /// Directory for saved screenshots (defaults to the downloads folder)
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Report clipboard availability and exit
    #[arg(long, action = ArgAction::SetTrue)]
    check_clipboard: bool,
}

fn find_target(doc: &Document, selector: &str) -> Option<NodeId> {
    match selector.strip_prefix('#') {
        Some(id) => doc.find_by_id(id),
        None => doc.first_by_tag(selector),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut deps = CaptureDependencies::default();
    if let Some(dir) = cli.output_dir.clone() {
        deps.saver = Arc::new(DownloadsSaver::new(dir));
    }

    if cli.check_clipboard {
        let caps = deps.clipboard.capabilities();
        let report = clipboard::availability(&caps);
        let support = feedback::support_feedback(&caps);
        println!("{}", support.message);
        if let Some(reason) = report.reason {
            log::info!("clipboard unavailable: {reason}");
        }
        return Ok(());
    }

    let page = cli
        .page
        .ok_or_else(|| anyhow!("--page is required (or use --check-clipboard)"))?;
    let selector = cli
        .select
        .ok_or_else(|| anyhow!("--select is required to name the capture target"))?;

    let preferences = config::load().unwrap_or_else(|err| {
        log::warn!("could not load preferences, using defaults: {err}");
        elemshot::Preferences::default()
    });

    let background = match &cli.background {
        Some(raw) => BackgroundMode::parse(raw)
            .ok_or_else(|| anyhow!("Unknown background mode: {raw} (expected black, white, or transparent)"))?,
        None => preferences.background_preference,
    };
    let targets = OutputTargets {
        save_to_file: !cli.no_save && preferences.save_to_pc,
        copy_to_clipboard: !cli.no_clipboard && preferences.copy_to_clipboard,
    };
    if !targets.any() {
        return Err(anyhow!(
            "Please enable at least one output method (file save or clipboard copy)"
        ));
    }

    let snapshot = std::fs::read_to_string(&page)
        .with_context(|| format!("Failed to read page snapshot: {}", page.display()))?;
    let mut doc = Document::from_snapshot_json(&snapshot)
        .with_context(|| format!("Failed to parse page snapshot: {}", page.display()))?;
    let target = find_target(&doc, &selector)
        .ok_or_else(|| anyhow!("No element matches selector: {selector}"))?;

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let mut session = SelectorSession::new(Arc::new(deps), CaptureOptions::default())
        .with_linger(elemshot::picker::FeedbackLinger::none())
        .with_events(events_tx);

    session.activate(&mut doc, background, targets);
    session.pointer_over(&mut doc, target);
    let result = session.click(&mut doc, target).await;

    if let Some(notification) = events_rx.recv().await {
        log::debug!("session notification: {notification:?}");
    }

    match result {
        Some(result) => {
            let (message, _tone) = feedback::compose_result_message(targets, &result);
            println!("{message}");
            Ok(())
        }
        None => Err(anyhow!("Screenshot capture failed. Please try again.")),
    }
}
