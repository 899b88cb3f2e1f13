use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so piped output stays clean
    let default_filter = match cli.verbose {
        0 => "exabrowse_cli=info,exabrowse_core=warn",
        1 => "exabrowse_cli=debug,exabrowse_core=debug",
        _ => "exabrowse_cli=trace,exabrowse_core=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match &cli.command {
        None => show_overview(),
        Some(Commands::Search {
            query,
            channels,
            mode,
            options,
            table,
        }) => search::run(&cli, query, channels, *mode, options.as_deref(), table).await,
        Some(Commands::Entity { query }) => entity::run_entity(&cli, query).await,
        Some(Commands::Socials { name }) => entity::run_socials(&cli, name).await,
        Some(Commands::Recents {
            name,
            profiles,
            days,
        }) => entity::run_recents(&cli, name, profiles, *days).await,
        Some(Commands::Summarize { name, input, days }) => {
            summarize::run(&cli, name, input.as_deref(), *days).await
        }
        Some(Commands::Mentions) => mentions::run(&cli).await,
        Some(Commands::Chat {
            message,
            context,
            context_file,
        }) => chat::run(&cli, message, context.as_deref(), context_file.as_deref()).await,
        Some(Commands::Species { action }) => species::run(&cli, action.clone()).await,
        Some(Commands::Proxy { url, out }) => proxy::run(url, out.as_deref()).await,
        Some(Commands::Donate { amount }) => donate::run(&cli, *amount).await,
        Some(Commands::Channels { action }) => channels::run(&cli, action.clone()).await,
        Some(Commands::Config { action }) => config::run(&cli, action.clone()).await,
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

fn show_overview() -> commands::Result<()> {
    println!();
    println!(
        "{}  {}",
        "exabrowse".bold().cyan(),
        "- search the web by result type".dimmed()
    );
    println!();
    println!("{}", "Commands:".bold());
    let rows = [
        ("search", "Search one or more channels at once"),
        ("entity", "Resolve a name to description, website and profiles"),
        ("socials", "What every platform says about an entity"),
        ("recents", "Recent posts an entity published itself"),
        ("summarize", "LLM summary of recent mentions"),
        ("mentions", "Latest community mentions from X and Reddit"),
        ("chat", "Ask the assistant a question"),
        ("species", "Species candidates, Red List status and sightings"),
        ("proxy", "Fetch a page rewritten for embedding"),
        ("donate", "Create a donation payment intent"),
        ("channels", "List channel tables"),
        ("config", "Manage API keys"),
    ];
    for (name, about) in rows {
        println!("  {:<12} {}", name.green(), about);
    }
    println!();
    println!(
        "Run {} for details.",
        "exabrowse <command> --help".cyan()
    );
    println!();
    Ok(())
}
