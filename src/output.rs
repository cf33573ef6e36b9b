// src/output.rs
// =============================================================================
// This module writes extracted links somewhere a human or a script can
// use them:
// - CSV files (what the downstream download scripts read)
// - JSON on stdout (--json)
// - a table in the terminal (default)
// =============================================================================

use std::fs::File;
use std::io;
use std::path::Path;

use crate::error::{Error, Result};
use crate::extract::{AnchorCapture, ExtractedLink};

/// Columns of the CSV file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvLayout {
    /// `link_text,full_url`
    TextAndUrl,
    /// `post_url`, for href-only extraction where there is no text
    UrlOnly,
}

impl From<AnchorCapture> for CsvLayout {
    fn from(capture: AnchorCapture) -> Self {
        match capture {
            AnchorCapture::WithText => CsvLayout::TextAndUrl,
            AnchorCapture::HrefOnly => CsvLayout::UrlOnly,
        }
    }
}

// Writes links as CSV with a header row
//
// Parameters:
//   writer: any destination (file, stdout, Vec<u8> in tests)
//   links: the links to write, in order
//   layout: which columns to write
pub fn write_csv<W: io::Write>(writer: W, links: &[ExtractedLink], layout: CsvLayout) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);

    match layout {
        CsvLayout::TextAndUrl => {
            csv.write_record(["link_text", "full_url"])?;
            for link in links {
                csv.write_record([link.text.as_str(), link.url.as_str()])?;
            }
        }
        CsvLayout::UrlOnly => {
            csv.write_record(["post_url"])?;
            for link in links {
                csv.write_record([link.url.as_str()])?;
            }
        }
    }

    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

pub fn write_csv_file(path: &Path, links: &[ExtractedLink], layout: CsvLayout) -> Result<()> {
    let file = File::create(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    write_csv(file, links, layout)
}

pub fn to_json(links: &[ExtractedLink]) -> Result<String> {
    Ok(serde_json::to_string_pretty(links)?)
}

// Prints links as a human-readable table in the terminal
pub fn print_table(links: &[ExtractedLink]) {
    println!("{:<40} {:<70}", "TEXT", "URL");
    println!("{}", "=".repeat(110));

    for link in links {
        println!("{:<40} {:<70}", truncate(&link.text, 37), link.url);
    }

    println!();
    println!("📊 Summary:");
    println!("   🔗 Links: {}", links.len());
}

// Shortens text for display, counting characters rather than bytes so
// multi-byte text (e.g. "Poezie și proză") is never cut mid-character
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn links() -> Vec<ExtractedLink> {
        vec![
            ExtractedLink {
                text: "About, us".to_string(),
                url: "https://example.com/about".to_string(),
            },
            ExtractedLink {
                text: "Blog".to_string(),
                url: "https://example.com/blog/".to_string(),
            },
        ]
    }

    #[test]
    fn test_csv_text_and_url() {
        let mut out = Vec::new();
        write_csv(&mut out, &links(), CsvLayout::TextAndUrl).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "link_text,full_url\n\"About, us\",https://example.com/about\nBlog,https://example.com/blog/\n"
        );
    }

    #[test]
    fn test_csv_url_only() {
        let mut out = Vec::new();
        write_csv(&mut out, &links(), CsvLayout::UrlOnly).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "post_url\nhttps://example.com/about\nhttps://example.com/blog/\n"
        );
    }

    #[test]
    fn test_csv_file_with_no_links_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("links.csv");
        write_csv_file(&path, &[], CsvLayout::TextAndUrl).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "link_text,full_url\n");
    }

    #[test]
    fn test_json_output() {
        let json = to_json(&links()[1..]).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed[0]["text"], "Blog");
        assert_eq!(parsed[0]["url"], "https://example.com/blog/");
    }

    #[test]
    fn test_layout_follows_capture() {
        assert_eq!(CsvLayout::from(AnchorCapture::WithText), CsvLayout::TextAndUrl);
        assert_eq!(CsvLayout::from(AnchorCapture::HrefOnly), CsvLayout::UrlOnly);
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("Poezie și proză", 8), "Poezie ș...");
        assert_eq!(truncate("Blog", 8), "Blog");
    }
}
