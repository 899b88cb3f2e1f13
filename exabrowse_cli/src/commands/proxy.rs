use crate::commands::{spinner, Context, Result};
use exabrowse_core::PageProxy;
use owo_colors::OwoColorize;
use std::io::Write;
use std::path::Path;

/// Fetch a page for embedding. The page goes to `out` or stdout; the
/// headers it should be served with go to stderr.
pub async fn run(url: &str, out: Option<&Path>) -> Result<()> {
    let ctx = Context::load()?;
    let proxy = PageProxy::new(&ctx.config.http)?;

    let progress = spinner(format!("Fetching {}...", url));
    let result = proxy.fetch(Some(url)).await;
    progress.finish_and_clear();
    let page = result?;

    for (name, value) in &page.headers {
        eprintln!("{}: {}", name.dimmed(), value);
    }

    match out {
        Some(path) => {
            std::fs::write(path, &page.html)?;
            eprintln!(
                "{} {} ({} bytes)",
                "Saved".green().bold(),
                path.display(),
                page.html.len()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(page.html.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(())
}
