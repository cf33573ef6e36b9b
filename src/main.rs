// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Build the extractor config and link filter from them
// 3. Fetch/read the pages and extract the links
// 4. Write them to CSV, or print them as JSON or a table
// 5. Exit with proper code (0 = links found, 1 = no links, 2 = error)
//
// The 'download' subcommand reads such a CSV back and saves each page
// (0 = nothing failed, 1 = some pages failed or were invalid, 2 = error).
// =============================================================================

mod cli;
mod logging;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::error;

use cli::{overlay_classes, Cli, Commands, OutputArgs, SiteArgs};
use scoped_links::download::{download_pages, pick_csv_path, read_targets};
use scoped_links::extract::{ElementMatcher, ExtractedLink, ExtractorConfig, LinkFilter};
use scoped_links::fetch::{scrape_sources, FetchSettings, PageFetcher, Source};
use scoped_links::job::Job;
use scoped_links::output::{self, CsvLayout};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let exit_code = match run(cli.command).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            let message = format!("{:#}", e);
            error!(error = %message, "run failed");
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = links extracted
//   Ok(1) = nothing extracted (region missing, or every link filtered out)
//   Err = bad arguments, unreadable file, unwritable output
async fn run(command: Commands) -> Result<i32> {
    match command {
        Commands::Nav {
            source,
            header_tag,
            header_id,
            header_classes,
            nav_tag,
            nav_id,
            nav_classes,
            exclude_text_classes,
            site,
            output,
        } => {
            let gate = matcher(&header_tag, header_id.as_deref(), &header_classes);
            let container = matcher(&nav_tag, nav_id.as_deref(), &nav_classes);
            let config = ExtractorConfig::navigation(gate, container)
                .with_excluded_text_classes(exclude_text_classes);
            handle_scrape(&source, &config, &site, &output).await
        }
        Commands::Overlay {
            source,
            container_tag,
            container_classes,
            container_id,
            site,
            output,
        } => {
            let classes = overlay_classes(container_id.as_deref(), container_classes);
            let container = matcher(&container_tag, container_id.as_deref(), &classes);
            let config = ExtractorConfig::overlay(container);
            handle_scrape(&source, &config, &site, &output).await
        }
        Commands::Run { profile, json } => handle_job(&profile, json).await,
        Commands::Download {
            csv,
            out_dir,
            pacing,
        } => handle_download(&csv, &out_dir, pacing.fetch_settings()).await,
    }
}

fn matcher(tag: &str, id: Option<&str>, classes: &[String]) -> ElementMatcher {
    let mut matcher = ElementMatcher::tag(tag);
    if let Some(id) = id {
        matcher = matcher.with_id(id);
    }
    for class in classes {
        matcher = matcher.with_class(class);
    }
    matcher
}

// Handles the 'nav' and 'overlay' subcommands
async fn handle_scrape(
    source: &str,
    config: &ExtractorConfig,
    site: &SiteArgs,
    output: &OutputArgs,
) -> Result<i32> {
    let source = Source::parse(source, site.pages);

    // Local files have no URL of their own to resolve against
    let base_url = match (&site.base_url, source.url()) {
        (Some(base), _) => base.clone(),
        (None, Some(url)) => url.to_string(),
        (None, None) => bail!("--base-url is required when reading a local file"),
    };

    let filter = match &site.root_domain {
        Some(domain) => LinkFilter::new(&base_url, domain, site.skip_classes.clone()),
        None => LinkFilter::for_site(&base_url, site.skip_classes.clone()),
    }
    .context("invalid link filter settings")?;

    let links = scrape(&[source], config, &filter, site.pacing.fetch_settings()).await?;
    emit(&links, output.output.as_deref(), output.json, config.capture.into())
}

// Handles the 'run' subcommand
async fn handle_job(profile: &std::path::Path, json: bool) -> Result<i32> {
    let job = Job::load(profile)
        .with_context(|| format!("failed to load job profile {}", profile.display()))?;
    let filter = job
        .link_filter()
        .context("invalid link filter settings in job profile")?;

    let links = scrape(&job.sources, &job.extractor, &filter, job.fetch_settings()).await?;
    emit(&links, job.output.as_deref(), json, job.extractor.capture.into())
}

// Handles the 'download' subcommand
async fn handle_download(
    candidates: &[std::path::PathBuf],
    out_dir: &std::path::Path,
    settings: FetchSettings,
) -> Result<i32> {
    let Some(csv_path) = pick_csv_path(candidates) else {
        let names: Vec<String> = candidates.iter().map(|p| p.display().to_string()).collect();
        bail!("missing CSV file: {}", names.join(" or "));
    };

    let targets = read_targets(csv_path)
        .with_context(|| format!("failed to read {}", csv_path.display()))?;
    if targets.is_empty() {
        bail!("CSV file is empty: {}", csv_path.display());
    }

    let mut fetcher = PageFetcher::new(settings).context("failed to create HTTP client")?;
    let report = download_pages(&mut fetcher, &targets, out_dir).await?;

    println!(
        "💾 {} saved, {} already there, {} invalid, {} failed (in {})",
        report.saved,
        report.skipped_existing,
        report.invalid,
        report.failed,
        out_dir.display()
    );

    if report.failed == 0 && report.invalid == 0 {
        Ok(0)
    } else {
        Ok(1)
    }
}

async fn scrape(
    sources: &[Source],
    config: &ExtractorConfig,
    filter: &LinkFilter,
    settings: FetchSettings,
) -> Result<Vec<ExtractedLink>> {
    let mut fetcher = PageFetcher::new(settings).context("failed to create HTTP client")?;
    let links = scrape_sources(&mut fetcher, sources, config, filter).await?;
    Ok(links)
}

// Writes the links where the user asked, and picks the exit code
fn emit(
    links: &[ExtractedLink],
    csv_path: Option<&std::path::Path>,
    json: bool,
    layout: CsvLayout,
) -> Result<i32> {
    if let Some(path) = csv_path {
        output::write_csv_file(path, links, layout)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("💾 Saved {} link(s) to {}", links.len(), path.display());
    } else if json {
        println!("{}", output::to_json(links)?);
    } else {
        output::print_table(links);
    }

    if links.is_empty() {
        Ok(1)
    } else {
        Ok(0)
    }
}
