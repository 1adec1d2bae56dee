use anyhow::Result;
use futures::future::join_all;
use std::path::{Path, PathBuf};

use revharvest::adapter::adapter_for;
use revharvest::config::{BrowserConfig, Config};
use revharvest::engine::{ExtractionEngine, PaginationMode, RunRequest};
use revharvest::error::{Error, ErrorTrait};
use revharvest::models::{DateWindow, ResultSet, Source};
use revharvest::storage::ReviewWriter;
use revharvest::surface::scripted::{ScriptMode, ScriptedSurface};

/// Arguments of the scrape command
pub struct ScrapeParams {
    pub company: String,
    pub start: String,
    pub end: String,
    pub sources: Vec<String>,
    pub outdir: Option<PathBuf>,
    pub replay: Option<PathBuf>,
}

/// Run one extraction per source in parallel and write each result set
///
/// A failing source is reported without affecting the others; the command
/// fails if any source failed.
pub async fn scrape(mut config: Config, params: ScrapeParams) -> Result<()> {
    let window = DateWindow::parse(&params.start, &params.end)?;
    let sources = parse_sources(&params.sources)?;

    if let Some(outdir) = &params.outdir {
        config.output.dir = outdir.clone();
    }
    let writer = ReviewWriter::new(&config.output)?;
    let engine = ExtractionEngine::new(config.scraper.clone());

    println!("Scraping reviews for {}", params.company);
    println!("========================");
    println!("  Window: {window}");
    println!(
        "  Sources: {}",
        sources
            .iter()
            .map(|s| s.display_name())
            .collect::<Vec<_>>()
            .join(", ")
    );

    let runs = sources.iter().map(|&source| {
        let request = RunRequest::new(params.company.clone(), window, source);
        let engine = &engine;
        let writer = &writer;
        let browser = &config.browser;
        let replay = params.replay.as_deref();
        async move {
            let results = match replay {
                Some(dir) => run_replay(engine, &request, dir).await?,
                None => run_live(engine, &request, browser).await?,
            };
            let path = writer.save(&results)?;
            report(&results, &path);
            Ok::<_, Error>(path)
        }
    });

    let outcomes = join_all(runs).await;

    let mut failed = 0usize;
    for (source, outcome) in sources.iter().zip(outcomes) {
        match outcome {
            Ok(path) => println!("  {}: saved {}", source.display_name(), path.display()),
            Err(e) => {
                failed += 1;
                tracing::error!(
                    source = %source,
                    category = e.category().label(),
                    recoverable = e.is_recoverable(),
                    error = %e,
                    "Source failed"
                );
                eprintln!("  {}: failed: {}", source.display_name(), e.describe());
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} sources failed", sources.len());
    }
    Ok(())
}

/// Resolve source names, dropping repeats
fn parse_sources(names: &[String]) -> Result<Vec<Source>> {
    let mut sources = Vec::new();
    for name in names {
        let source = Source::parse(name).ok_or_else(|| {
            anyhow::anyhow!("Unknown source '{name}'. Valid sources: g2, capterra, trustradius")
        })?;
        if !sources.contains(&source) {
            sources.push(source);
        }
    }
    Ok(sources)
}

fn report(results: &ResultSet, path: &Path) {
    let stats = results.stats();
    tracing::info!(
        source = %results.source,
        records = results.len(),
        unparseable = results.unparseable_count(),
        steps = stats.steps,
        stop_reason = ?stats.stop_reason,
        path = %path.display(),
        "Saved result set"
    );
}

/// Replay saved pages from `dir/{source}` when present, else from `dir`
async fn run_replay(
    engine: &ExtractionEngine,
    request: &RunRequest,
    dir: &Path,
) -> Result<ResultSet, Error> {
    let source_dir = dir.join(request.source.as_str());
    let dir = if source_dir.is_dir() { source_dir } else { dir.to_path_buf() };

    let mode = match adapter_for(request.source).pagination() {
        PaginationMode::NextPage { .. } => ScriptMode::Replace,
        PaginationMode::InfiniteScroll | PaginationMode::LoadMore { .. } => ScriptMode::Append,
    };
    let surface = ScriptedSurface::from_dir(&dir, mode)?;
    Ok(engine.run(surface, request).await?)
}

#[cfg(feature = "headless")]
async fn run_live(
    engine: &ExtractionEngine,
    request: &RunRequest,
    browser: &BrowserConfig,
) -> Result<ResultSet, Error> {
    let surface = revharvest::surface::chrome::ChromeSurface::launch(browser).await?;
    Ok(engine.run(surface, request).await?)
}

#[cfg(not(feature = "headless"))]
async fn run_live(
    _engine: &ExtractionEngine,
    _request: &RunRequest,
    _browser: &BrowserConfig,
) -> Result<ResultSet, Error> {
    Err(Error::config(
        "browser backend not compiled in; rebuild with `--features headless` or pass --replay",
    ))
}
