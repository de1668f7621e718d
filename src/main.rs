use std::path::Path;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sabnzbd_api::clock::format_secs;
use sabnzbd_api::config::Config;
use sabnzbd_api::{Decoded, SabClient};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type SabResult<T> = anyhow::Result<T>;

#[derive(Debug, Parser)]
#[command(version, about = "Inspect a SABnzbd instance")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Server version
    Version,
    /// Current download queue
    Queue {
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Completed and failed jobs
    History {
        #[arg(long)]
        start: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Transfer totals per server
    Stats,
    Warnings,
    Categories,
    Scripts,
    /// Files of a queued job
    Files { nzo_id: String },
    /// Queue an NZB by URL
    AddUrl {
        url: String,
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> SabResult<()> {
    // Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,reqwest=warn,hyper=warn",
        env!("CARGO_CRATE_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish()
        .with(ErrorLayer::default())
        .init();

    let cli = Cli::parse();

    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load()?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    let client = SabClient::with_timeout(&config.base_url, config.timeout)
        .with_context(|| "Failed to create SABnzbd client")?
        .with_api_key(&config.api_key);
    tracing::debug!(base_url = %config.base_url, "configured SABnzbd client");

    run(&client, cli.command).await
}

async fn run(client: &SabClient, command: Command) -> SabResult<()> {
    match command {
        Command::Version => {
            let v = client.get_version().await?;
            println!("SABnzbd {}", v.version);
        }
        Command::Queue { start, limit } => {
            let q = report_partial(client.get_queue(start, limit).await?);
            println!(
                "{} | {} of {} left ({} done) | {}/s | {} remaining{}",
                q.status,
                q.bytes_left,
                q.bytes,
                q.bytes_missing,
                q.bytes_per_second,
                q.time_left,
                if q.paused { " | paused" } else { "" }
            );
            println!(
                "disk: {} free of {} (download), {} free of {} (complete)",
                q.download_disk_free_space,
                q.download_disk_total_space,
                q.complete_disk_free_space,
                q.complete_disk_total_space
            );
            for slot in &q.slots {
                println!(
                    "{:>3} {} [{}] {} / {} {}% {} ({})",
                    slot.index,
                    slot.filename,
                    slot.category,
                    slot.bytes_left,
                    slot.bytes,
                    slot.percentage,
                    slot.time_left,
                    slot.status
                );
            }
        }
        Command::History { start, limit } => {
            let h = report_partial(client.get_history(start, limit).await?);
            println!(
                "downloaded: {} today, {} this week, {} this month, {} total",
                h.day_size, h.week_size, h.month_size, h.total_size
            );
            for slot in &h.slots {
                let completed = slot
                    .completed
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_default();
                println!(
                    "{} {} [{}] {} {} (download {}, post-processing {})",
                    completed,
                    slot.name,
                    slot.status,
                    slot.category,
                    slot.size,
                    format_secs(slot.download_duration.num_seconds()),
                    format_secs(slot.post_processing_duration.num_seconds())
                );
            }
        }
        Command::Stats => {
            let s = client.get_server_stats().await?;
            println!(
                "total {} | month {} | week {} | day {}",
                s.total, s.month, s.week, s.day
            );
            for (name, server) in &s.servers {
                println!(
                    "{name}: total {} | month {} | week {} | day {}",
                    server.total, server.month, server.week, server.day
                );
                for (date, bytes) in &server.daily {
                    let tried = server.articles_tried.get(date).copied().unwrap_or_default();
                    let success = server
                        .articles_success
                        .get(date)
                        .copied()
                        .unwrap_or_default();
                    println!("  {date} {bytes} ({success}/{tried} articles)");
                }
            }
        }
        Command::Warnings => print_lines(client.get_warnings().await?.warnings),
        Command::Categories => print_lines(client.get_categories().await?.categories),
        Command::Scripts => print_lines(client.get_scripts().await?.scripts),
        Command::Files { nzo_id } => {
            for file in client.get_files(&nzo_id).await?.files {
                println!(
                    "{} [{}] {} / {} ({})",
                    file.filename, file.status, file.bytes_left, file.bytes, file.age
                );
            }
        }
        Command::AddUrl { url, category } => {
            let added = client.add_url(&url, category.as_deref()).await?;
            print_lines(added.nzo_ids);
        }
    }
    Ok(())
}

fn report_partial<T>(decoded: Decoded<T>) -> T {
    if let Some(warning) = &decoded.warning {
        tracing::warn!(error = %warning, "response decoded partially");
    }
    decoded.value
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}
