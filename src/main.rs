use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use toxiscope::api::{ApiServerBuilder, TokenIssuer};
use toxiscope::{
    Analyzer, CommentFeed, Config, LengthClass, RapidApiClient, ScoredComment, ToxicitySummary,
    db,
};

/// Toxiscope - comment toxicity analysis for social media posts
#[derive(Parser)]
#[command(name = "toxiscope", version, about)]
struct Cli {
    /// Port to listen on (overrides config and environment)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server (default)
    Serve,
    /// Analyze a post from the command line
    Analyze {
        /// Instagram, YouTube or Facebook post URL
        url: String,
        /// Number of pages to fetch, following the pagination cursor
        #[arg(short, long, default_value = "1")]
        pages: usize,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location
    ConfigPath,
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    let filter = match cli.verbose {
        0 => "info,toxiscope=info",
        1 => "info,toxiscope=debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(cli.port).await,
        Command::Analyze { url, pages, json } => analyze(&url, pages, json).await,
        Command::ConfigPath => {
            match toxiscope::config::file::config_file_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("no config directory available on this platform"),
            }
            Ok(())
        }
    }
}

fn build_analyzer(config: &Config) -> anyhow::Result<Analyzer> {
    let source = Arc::new(RapidApiClient::new(config.upstream.clone()));
    let scorer = Arc::new(config.scorer.build()?);
    tracing::debug!(program = scorer.program(), "configured toxicity scorer");
    Ok(Analyzer::new(source, scorer))
}

async fn serve(port: Option<u16>) -> anyhow::Result<()> {
    let config = Config::load()?;
    tracing::debug!(?config, "loaded configuration");

    let secret = config
        .auth
        .jwt_secret
        .as_ref()
        .context("JWT_SECRET is not set; refusing to start without a token signing secret")?;
    let tokens = TokenIssuer::with_ttl_days(secret, config.auth.token_ttl_days);

    let pool = db::init(&config.db_path)?;
    tracing::info!(path = %config.db_path.display(), "database ready");

    let analyzer = build_analyzer(&config)?;
    let port = port.unwrap_or(config.api_server.port);

    tracing::info!(port, "starting toxiscope");

    ApiServerBuilder::new(pool, analyzer, tokens, port)
        .static_dir(config.api_server.static_dir.clone())
        .build()
        .run()
        .await?;

    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    url: &'a str,
    comments: &'a [ScoredComment],
    avg_toxicity: f64,
    next_token: Option<&'a str>,
    summary: &'a ToxicitySummary,
}

async fn analyze(url: &str, pages: usize, json: bool) -> anyhow::Result<()> {
    let config = Config::load()?;
    let analyzer = build_analyzer(&config)?;

    let first = analyzer.analyze(url, None).await?;
    let mut feed = CommentFeed::new(url, first);

    for page in 2..=pages {
        let outcome = analyzer.load_more(&mut feed).await?;
        tracing::debug!(page, added = outcome.added, "loaded more comments");
        if outcome.exhausted {
            break;
        }
    }

    let summary = ToxicitySummary::from_comments(&feed.comments);

    if json {
        let report = Report {
            url,
            comments: &feed.comments,
            avg_toxicity: feed.average_toxicity(),
            next_token: feed.next_token.as_deref(),
            summary: &summary,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for c in &feed.comments {
        println!("{:>5.2}  @{}: {}", c.toxicity, c.username, c.text);
    }

    println!("\n---");
    println!("Comments:        {}", summary.total);
    println!("Toxic (> {:.1}):   {}", toxiscope::stats::TOXIC_THRESHOLD, summary.toxic);
    println!("Clean:           {}", summary.clean);
    println!("Average:         {:.3}", feed.average_toxicity());
    for (i, count) in summary.histogram.iter().enumerate() {
        println!(
            "{:>8}  {:>4}  {}",
            ToxicitySummary::bucket_label(i),
            count,
            "#".repeat(*count)
        );
    }

    let lengths = [LengthClass::Short, LengthClass::Medium, LengthClass::Long].map(|class| {
        feed.comments
            .iter()
            .filter(|c| LengthClass::of(&c.text) == Some(class))
            .count()
    });
    println!(
        "Length:          {} short, {} medium, {} long",
        lengths[0], lengths[1], lengths[2]
    );

    if feed.next_token.is_some() {
        println!("(more comments available; raise --pages to fetch them)");
    }

    Ok(())
}
