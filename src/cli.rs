// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Four subcommands:
// - nav:      links of a menu (<nav>) inside the site header
// - overlay:  links inside image-overlay blocks (<div class="...">)
// - run:      everything described in a JSON job profile
// - download: save the pages listed in a links CSV
//
// Options shared by several subcommands (where to resolve links, pacing,
// output) live in their own structs and are flattened in.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use scoped_links::fetch::FetchSettings;

/// Overlay container class used when neither a class nor an id is given
pub const DEFAULT_OVERLAY_CLASS: &str = "featured-image-overlay";

#[derive(Parser, Debug)]
#[command(
    name = "scoped-links",
    version,
    about = "Extract the links of one region (menu, overlay block) of HTML pages",
    long_about = "scoped-links reads HTML pages (local files or URLs, optionally paginated) and \
                  collects only the links inside a chosen region, e.g. the main menu in the site \
                  header, resolving them to absolute URLs on the site's own domain."
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract menu links from a <nav> inside the page header
    ///
    /// Example: scoped-links nav https://example.com/ --nav-id access
    Nav {
        /// Page URL or path to a saved HTML file
        source: String,

        /// Tag of the element the menu must be inside
        #[arg(long, default_value = "header")]
        header_tag: String,

        /// id of the header element (e.g. masthead)
        #[arg(long)]
        header_id: Option<String>,

        /// Class of the header element (repeatable, any one matches)
        #[arg(long = "header-class")]
        header_classes: Vec<String>,

        /// Tag of the menu container
        #[arg(long, default_value = "nav")]
        nav_tag: String,

        /// id of the menu container (e.g. access)
        #[arg(long)]
        nav_id: Option<String>,

        /// Class of the menu container (repeatable, any one matches)
        #[arg(long = "nav-class")]
        nav_classes: Vec<String>,

        /// Leave text inside elements with this class out of link text (repeatable)
        #[arg(long = "exclude-text-class")]
        exclude_text_classes: Vec<String>,

        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Extract post links from image-overlay blocks
    ///
    /// Example: scoped-links overlay https://example.com/category/poems/ --pages 7
    Overlay {
        /// Page URL or path to a saved HTML file
        source: String,

        /// Tag of the overlay container
        #[arg(long, default_value = "div")]
        container_tag: String,

        /// Class of the overlay container (repeatable, any one matches).
        /// Defaults to featured-image-overlay when no --container-id is given
        #[arg(long = "container-class")]
        container_classes: Vec<String>,

        /// id of the overlay container
        #[arg(long)]
        container_id: Option<String>,

        #[command(flatten)]
        site: SiteArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Run a JSON job profile (region, base URL, list of paginated sources)
    ///
    /// Example: scoped-links run jobs/articles.json
    Run {
        /// Path to the job profile
        profile: PathBuf,

        /// Print JSON instead of a table when the profile has no output file
        #[arg(long)]
        json: bool,
    },

    /// Save the pages listed in a links CSV as HTML files
    ///
    /// Example: scoped-links download articles_csv.csv article_csv.csv --out-dir pages
    Download {
        /// CSV file(s) written by nav/overlay; the first one that exists is used
        #[arg(required = true)]
        csv: Vec<PathBuf>,

        /// Directory the pages are saved in (created if missing)
        #[arg(long, default_value = "downloaded_html")]
        out_dir: PathBuf,

        #[command(flatten)]
        pacing: PacingArgs,
    },
}

// Classes for the overlay container: the user's, or the default class
// when the container isn't otherwise identified
pub fn overlay_classes(container_id: Option<&str>, classes: Vec<String>) -> Vec<String> {
    if classes.is_empty() && container_id.is_none() {
        vec![DEFAULT_OVERLAY_CLASS.to_string()]
    } else {
        classes
    }
}

/// How links are resolved and which ones are kept, plus page fetching
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// URL relative links are resolved against (defaults to the source URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Only keep links on this domain or its subdomains (defaults to the base URL's host)
    #[arg(long)]
    pub root_domain: Option<String>,

    /// Skip anchors carrying this class, e.g. logo (repeatable)
    #[arg(long = "skip-class")]
    pub skip_classes: Vec<String>,

    /// Number of listing pages to fetch (page N is <source>/page/N/)
    #[arg(long, default_value_t = 1)]
    pub pages: usize,

    #[command(flatten)]
    pub pacing: PacingArgs,
}

/// Timeout and waiting between two page fetches
#[derive(Args, Debug, Clone)]
pub struct PacingArgs {
    /// Fixed wait between two page fetches, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub delay_ms: u64,

    /// Maximum random wait added to the delay, in milliseconds
    #[arg(long, default_value_t = 1500)]
    pub jitter_ms: u64,

    /// Per-page timeout, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,
}

impl PacingArgs {
    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: Duration::from_secs(self.timeout_secs),
            base_delay: Duration::from_millis(self.delay_ms),
            jitter: Duration::from_millis(self.jitter_ms),
        }
    }
}

/// Where the links go
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Write links to this CSV file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_nav() {
        let cli = Cli::parse_from([
            "scoped-links",
            "-v",
            "nav",
            "page.html",
            "--header-id",
            "masthead",
            "--nav-class",
            "navbar",
            "--nav-class",
            "pix-main-menu",
            "--skip-class",
            "navbar-brand",
            "--base-url",
            "https://example.com/",
        ]);
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Commands::Nav {
                source,
                header_tag,
                nav_classes,
                site,
                ..
            } => {
                assert_eq!(source, "page.html");
                assert_eq!(header_tag, "header");
                assert_eq!(nav_classes, vec!["navbar", "pix-main-menu"]);
                assert_eq!(site.skip_classes, vec!["navbar-brand"]);
                assert_eq!(site.pages, 1);
            }
            other => panic!("expected nav, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_defaults() {
        let cli = Cli::parse_from(["scoped-links", "overlay", "https://example.com/", "--pages", "4"]);
        match cli.command {
            Commands::Overlay {
                container_tag,
                container_classes,
                site,
                ..
            } => {
                assert_eq!(container_tag, "div");
                assert!(container_classes.is_empty());
                assert_eq!(overlay_classes(None, container_classes), vec![DEFAULT_OVERLAY_CLASS]);
                assert_eq!(site.pages, 4);
                assert_eq!(site.pacing.fetch_settings(), FetchSettings::default());
            }
            other => panic!("expected overlay, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_id_alone_drops_default_class() {
        let cli = Cli::parse_from([
            "scoped-links",
            "overlay",
            "page.html",
            "--container-id",
            "hero",
        ]);
        match cli.command {
            Commands::Overlay {
                container_id,
                container_classes,
                ..
            } => {
                assert_eq!(container_id.as_deref(), Some("hero"));
                assert!(overlay_classes(container_id.as_deref(), container_classes).is_empty());
            }
            other => panic!("expected overlay, got {:?}", other),
        }
    }

    #[test]
    fn test_overlay_explicit_classes_are_kept() {
        let classes = vec!["post-thumb".to_string(), "card".to_string()];
        assert_eq!(overlay_classes(None, classes.clone()), classes);
        assert_eq!(overlay_classes(Some("hero"), classes.clone()), classes);
    }

    #[test]
    fn test_parse_download() {
        let cli = Cli::parse_from([
            "scoped-links",
            "download",
            "articles_csv.csv",
            "article_csv.csv",
            "--out-dir",
            "pages",
            "--delay-ms",
            "0",
        ]);
        match cli.command {
            Commands::Download {
                csv,
                out_dir,
                pacing,
            } => {
                assert_eq!(
                    csv,
                    vec![PathBuf::from("articles_csv.csv"), PathBuf::from("article_csv.csv")]
                );
                assert_eq!(out_dir, PathBuf::from("pages"));
                assert_eq!(pacing.fetch_settings().base_delay, Duration::ZERO);
                assert_eq!(pacing.fetch_settings().jitter, Duration::from_millis(1500));
            }
            other => panic!("expected download, got {:?}", other),
        }
    }
}
