use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;

use thetagang_wheel::clock::{Clock, SystemClock};
use thetagang_wheel::config::{AppConfig, Secrets};
use thetagang_wheel::models::Post;
use thetagang_wheel::monitoring::logger;
use thetagang_wheel::screening::chains::JsonChainSource;
use thetagang_wheel::screening::pipeline::ScreeningPipeline;
use thetagang_wheel::screening::report::candidates_to_csv;
use thetagang_wheel::sentiment::SentimentClassifier;
use thetagang_wheel::tickers::extract_mentions;
use thetagang_wheel::tickers::fetcher::HttpSymbolFetcher;
use thetagang_wheel::tickers::symbols::SymbolCache;

/// Screen weekly cash-secured puts on tickers r/thetagang is winning with.
#[derive(Debug, Parser)]
#[command(name = "thetagang-wheel", version, about)]
struct Cli {
    /// Path to the TOML config (defaults to config/default.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging for this crate.
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify posts, count tickers and rank put candidates.
    Screen {
        /// JSON array of posts.
        #[arg(long)]
        posts: PathBuf,
        /// JSON object of ticker -> put quotes.
        #[arg(long)]
        chains: PathBuf,
        /// Override the minimum open interest.
        #[arg(long)]
        min_oi: Option<u64>,
        /// Write results to a `.json` or `.csv` file.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Label distribution and per-post labels.
    Sentiment {
        #[arg(long)]
        posts: PathBuf,
    },
    /// Validated ticker mention counts.
    Tickers {
        #[arg(long)]
        posts: PathBuf,
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Refresh the symbol allow-list if stale and print its size.
    RefreshSymbols,
    /// Load the config and report missing credentials.
    ValidateConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let (mut config, secrets) = AppConfig::load(cli.config.as_deref())?;

    logger::init_logging(&config.monitoring, cli.verbose)?;

    tracing::info!(command = ?cli.command, "thetagang-wheel starting");

    match cli.command {
        Command::Screen {
            posts,
            chains,
            min_oi,
            output,
        } => {
            if let Some(min_oi) = min_oi {
                config.screening.min_open_interest = min_oi;
            }
            run_screen(config, &posts, &chains, output.as_deref()).await
        }
        Command::Sentiment { posts } => run_sentiment(&config, &posts).await,
        Command::Tickers { posts, top } => run_tickers(&config, &posts, top).await,
        Command::RefreshSymbols => run_refresh_symbols(&config).await,
        Command::ValidateConfig => validate_config(&config, &secrets),
    }
}

async fn load_posts(path: &Path) -> Result<Vec<Post>> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read posts file {}", path.display()))?;
    let posts: Vec<Post> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse posts file {}", path.display()))?;
    tracing::info!(count = posts.len(), path = %path.display(), "Posts loaded");
    Ok(posts)
}

fn symbol_cache(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<SymbolCache> {
    let fetcher = HttpSymbolFetcher::new(config.symbols.request_timeout())?;
    Ok(SymbolCache::new(&config.symbols, Arc::new(fetcher), clock))
}

async fn run_screen(
    config: AppConfig,
    posts_path: &Path,
    chains_path: &Path,
    output: Option<&Path>,
) -> Result<()> {
    let posts = load_posts(posts_path).await?;
    let chains = JsonChainSource::load(chains_path).await?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let symbols = Arc::new(symbol_cache(&config, clock.clone())?);
    let pipeline = ScreeningPipeline::new(
        SentimentClassifier::vader(&config.sentiment),
        symbols,
        Arc::new(chains),
        config.screening.clone(),
        clock,
    );

    let result = pipeline.run(&posts).await?;
    println!("\n{result}");

    if let Some(path) = output {
        let rendered = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::to_string_pretty(&result)?,
            Some("csv") => candidates_to_csv(&result.candidates),
            _ => bail!("Unsupported output format for {}: use .json or .csv", path.display()),
        };
        tokio::fs::write(path, rendered)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Results written");
    }

    Ok(())
}

async fn run_sentiment(config: &AppConfig, posts_path: &Path) -> Result<()> {
    let posts = load_posts(posts_path).await?;
    let classifier = SentimentClassifier::vader(&config.sentiment);
    let labeled = classifier.label_all(&posts)?;

    for item in &labeled {
        println!("{:<8} {:<10} {}", item.sentiment, item.post.id, item.post.title);
    }

    let distribution: thetagang_wheel::sentiment::LabelDistribution =
        labeled.iter().map(|l| l.sentiment).collect();
    println!(
        "\nPositive: {} | Negative: {} | Unclear: {} | Total: {}",
        distribution.positive,
        distribution.negative,
        distribution.unclear,
        distribution.total()
    );
    Ok(())
}

async fn run_tickers(config: &AppConfig, posts_path: &Path, top: usize) -> Result<()> {
    let posts = load_posts(posts_path).await?;
    let cache = symbol_cache(config, Arc::new(SystemClock))?;
    let mentions = extract_mentions(&posts, &cache).await?;

    for (ticker, count) in mentions.top_n(top) {
        println!("{ticker:<6} {count}");
    }
    println!("\n{} distinct tickers across {} posts", mentions.len(), posts.len());
    Ok(())
}

async fn run_refresh_symbols(config: &AppConfig) -> Result<()> {
    let cache = symbol_cache(config, Arc::new(SystemClock))?;
    let allow_list = cache.allow_list().await?;

    for source in &config.symbols.sources {
        println!("{:<14} {}", source.name, cache.cache_path(source).display());
    }
    println!("{} symbols in allow-list", allow_list.len());
    Ok(())
}

fn validate_config(config: &AppConfig, secrets: &Secrets) -> Result<()> {
    println!("Config OK");
    println!(
        "  screening: capital ${}, max strike ${}, delta {}-{}, min OI {}",
        config.screening.capital,
        config.screening.max_strike,
        config.screening.delta_min,
        config.screening.delta_max,
        config.screening.min_open_interest
    );
    println!(
        "  sentiment: positive >= {}, negative <= {}",
        config.sentiment.positive_threshold, config.sentiment.negative_threshold
    );
    println!(
        "  reddit: r/{} (limit {}, last {} days)",
        config.reddit.subreddit, config.reddit.limit, config.reddit.window_days
    );

    let missing = secrets.missing();
    if missing.is_empty() {
        let secret_len = secrets
            .reddit_secret
            .as_ref()
            .map_or(0, |s| s.expose_secret().len());
        println!("  credentials: present (secret {secret_len} chars)");
    } else {
        tracing::warn!(?missing, "Reddit credentials missing");
        println!("  credentials missing: {}", missing.join(", "));
    }
    Ok(())
}
