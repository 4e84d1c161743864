use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use rollarchive_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "rollarchive")]
#[command(author, version, about = "Paginated archives with in-place page navigation")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (defaults to the user config directory)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve an archive of posts over HTTP
    Serve {
        /// JSON file with the posts to serve
        #[arg(short = 'p', long)]
        posts: Option<PathBuf>,
        /// Address to listen on
        #[arg(short = 'b', long)]
        bind: Option<SocketAddr>,
        /// Posts per archive page
        #[arg(long)]
        per_page: Option<usize>,
    },
    /// Browse an archive in the terminal
    Browse {
        /// Archive URL to browse
        #[arg(short = 'u', long)]
        url: Option<String>,
        /// Start with a search filter
        #[arg(short = 's', long)]
        search: Option<String>,
        /// Initial address fragment, e.g. "page=3"
        #[arg(short = 'f', long)]
        fragment: Option<String>,
    },
    /// Print one archive page as text
    Page {
        /// Page number
        #[arg(default_value_t = 1)]
        page: u32,
        /// Archive URL to fetch from
        #[arg(short = 'u', long)]
        url: Option<String>,
        /// Search filter
        #[arg(short = 's', long)]
        search: Option<String>,
        /// Print the fragment markup instead of text
        #[arg(long)]
        raw: bool,
    },
    /// Write a config file with every setting at its default
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn env_filter(config: &AppConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.general.log_level))
}

/// Log to stderr, or to a file while the terminal UI owns the screen
fn init_logging(config: &AppConfig, to_file: bool) -> Result<()> {
    let registry = tracing_subscriber::registry().with(env_filter(config));
    if to_file {
        let path = config.log_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(&path)?;
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(false))
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    let browsing = matches!(cli.command, Some(Commands::Browse { .. }) | None);
    init_logging(&config, browsing)?;

    match cli.command {
        Some(Commands::Serve {
            posts,
            bind,
            per_page,
        }) => {
            if let Some(posts) = posts {
                config.server.posts_path = Some(posts);
            }
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(per_page) = per_page {
                config.server.per_page = per_page;
            }
            commands::serve::run(&config).await
        }
        Some(Commands::Browse {
            url,
            search,
            fragment,
        }) => {
            if let Some(url) = url {
                config.navigation.archive_url = url;
            }
            commands::browse::run(Arc::new(config), search, fragment).await
        }
        None => commands::browse::run(Arc::new(config), None, None).await,
        Some(Commands::Page {
            page,
            url,
            search,
            raw,
        }) => {
            if let Some(url) = url {
                config.navigation.archive_url = url;
            }
            commands::page::run(&config, page, search.as_deref(), raw).await
        }
        Some(Commands::Init { force }) => {
            let path = cli
                .config
                .clone()
                .unwrap_or_else(AppConfig::config_path);
            commands::init::run(&config, &path, force)
        }
    }
}
