//! `anistream` CLI - Search the source site and resolve episode streams

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use anistream::playback::{EpisodeCursor, PlaybackView};
use anistream::site::SiteLayout;
use anistream::{
    AcceleratedClient, Config, EpisodeRequest, Outcome, ProxyRelay, ResolutionCoordinator, SourceCache,
    SourceIdentifier, SourceMatcher, StreamDescriptor, StreamExtractor, StreamValidator,
};

#[derive(Parser)]
#[command(name = "anistream")]
#[command(about = "Resolve anime episodes to playable video streams")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.config/anistream/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the source site and show the first match per title
    Search {
        /// Titles to search for
        #[arg(required = true)]
        titles: Vec<String>,
    },

    /// Show an anime's details page
    Details {
        /// Source identifier (e.g. one-piece-tv)
        id: String,
    },

    /// List validated streams for an episode of a known source identifier
    Streams {
        /// Source identifier (e.g. one-piece-tv)
        id: String,

        /// Episode number, starting at 1
        episode: u32,
    },

    /// Resolve an episode from its catalog title, with retries
    Resolve {
        /// Catalog title
        title: String,

        /// Episode number, starting at 1
        episode: u32,

        /// Episode count of the series (looked up when omitted)
        #[arg(short, long)]
        episodes: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let client = Arc::new(AcceleratedClient::new()?);

    match cli.command {
        Commands::Search { titles } => cmd_search(&client, &config, &titles, cli.json).await,
        Commands::Details { id } => cmd_details(&client, &config, &id, cli.json).await,
        Commands::Streams { id, episode } => cmd_streams(&client, &config, &id, episode, cli.json).await,
        Commands::Resolve { title, episode, episodes } => {
            cmd_resolve(client, &config, &title, episode, episodes, cli.json).await
        }
    }
}

fn matcher(client: &Arc<AcceleratedClient>, config: &Config) -> SourceMatcher<AcceleratedClient> {
    let relay = Arc::new(ProxyRelay::new(client.clone(), &config.relay));
    SourceMatcher::new(relay, SiteLayout::new(config.base_url.clone()))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_streams(streams: &[StreamDescriptor], active: usize) {
    for (i, stream) in streams.iter().enumerate() {
        let marker = if i == active { "▶" } else { " " };
        println!("{marker} {:<24} {}", stream.label(), stream.url);
    }
}

async fn cmd_search(client: &Arc<AcceleratedClient>, config: &Config, titles: &[String], json: bool) -> Result<()> {
    let matcher = matcher(client, config);
    let results = futures::future::join_all(titles.iter().map(|title| matcher.search(title))).await;

    let mut hits = Vec::new();
    for (title, result) in titles.iter().zip(results) {
        match result {
            Ok(hit) => hits.push(hit),
            Err(e) => eprintln!("❌ {title}: {e}"),
        }
    }

    if json {
        print_json(&hits)?;
    } else {
        for hit in &hits {
            println!("🔎 {} [{}] {} episodes → {}", hit.title, hit.kind, hit.episodes, hit.id);
        }
    }

    if hits.len() < titles.len() {
        bail!("{} of {} searches failed", titles.len() - hits.len(), titles.len());
    }
    Ok(())
}

async fn cmd_details(client: &Arc<AcceleratedClient>, config: &Config, id: &str, json: bool) -> Result<()> {
    let details = matcher(client, config).details(&SourceIdentifier::new(id)).await?;

    if json {
        return print_json(&details);
    }

    println!("📺 {} ({}, {})", details.title, details.kind, details.status);
    if !details.genres.is_empty() {
        println!("   {}", details.genres.join(", "));
    }
    if !details.synopsis.is_empty() {
        println!("\n{}\n", details.synopsis);
    }
    for episode in &details.episodes {
        println!("  {:>4}  {}", episode.number, episode.title);
    }
    Ok(())
}

async fn cmd_streams(
    client: &Arc<AcceleratedClient>,
    config: &Config,
    id: &str,
    episode: u32,
    json: bool,
) -> Result<()> {
    if episode == 0 {
        bail!("episode numbers start at 1");
    }

    let relay = ProxyRelay::new(client.clone(), &config.relay);
    let layout = SiteLayout::new(config.base_url.clone());
    let page = relay.fetch(&layout.episode_url(&SourceIdentifier::new(id), episode)).await?;

    let candidates = StreamExtractor::new(config.default_quality.clone()).extract(&page)?;
    let extracted = candidates.len();
    let streams = StreamValidator::new(&config.validator).validate(candidates);

    if json {
        return print_json(&streams);
    }

    println!("🎬 {id} episode {episode}: {} of {extracted} streams usable", streams.len());
    print_streams(&streams, 0);
    Ok(())
}

async fn cmd_resolve(
    client: Arc<AcceleratedClient>,
    config: &Config,
    title: &str,
    episode: u32,
    episodes: Option<u32>,
    json: bool,
) -> Result<()> {
    let coordinator = ResolutionCoordinator::new(client, config, SourceCache::new());

    let request = EpisodeRequest::new(title, title, episode);
    match coordinator.resolve(request).await {
        Outcome::Resolved(_) => {}
        Outcome::Failed(e) => bail!("{} ({e})", e.kind.user_message()),
        Outcome::Superseded => bail!("resolution was superseded"),
    }

    let state = coordinator.state();
    let Some(cursor) = EpisodeCursor::from_state(&state, episodes) else {
        bail!("episode {episode} did not resolve");
    };
    let poster = state.source.as_ref().map(|hit| hit.cover.clone());
    let Some(view) = PlaybackView::from_state(&state, cursor, poster) else {
        bail!("episode {episode} did not resolve");
    };
    let count = cursor.count();

    if json {
        return print_json(&view);
    }

    println!("🎬 {title} episode {episode} of {count}");
    print_streams(&view.streams, view.active);
    if let Some(previous) = view.previous_episode {
        println!("⏮  previous: {previous}");
    }
    if let Some(next) = view.next_episode {
        println!("⏭  next: {next}");
    }
    Ok(())
}
