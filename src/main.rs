//! CLI entry point for spacetraveling

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "spacetraveling")]
#[command(version)]
#[command(about = "A statically generated blog backed by a Prismic repository", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pre-render the listing and every post into the public folder
    #[command(alias = "g")]
    Generate {
        /// Regenerate routes even if they are still fresh
        #[arg(short, long)]
        force: bool,
    },

    /// Serve pages, regenerating them once their window has elapsed
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List published posts
    List {
        /// Follow every next-page cursor
        #[arg(short, long)]
        all: bool,
    },

    /// Clean the public folder and cache
    Clean,

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "spacetraveling=debug,info"
    } else {
        "spacetraveling=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Generate { force } => {
            let site = spacetraveling::Site::new(&base_dir)?;
            let service = site.content_service()?;
            tracing::info!("Generating static files...");

            let report = site.generate(service.as_ref(), force).await?;
            println!(
                "Generated {} pages ({} still fresh).",
                report.generated.len(),
                report.skipped.len()
            );
        }

        Commands::Server { port, ip } => {
            let site = spacetraveling::Site::new(&base_dir)?;
            let service = site.content_service()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            spacetraveling::server::start(&site, service, &ip, port).await?;
        }

        Commands::List { all } => {
            let site = spacetraveling::Site::new(&base_dir)?;
            let service = site.content_service()?;
            spacetraveling::commands::list::run(&site, service.as_ref(), all).await?;
        }

        Commands::Clean => {
            let site = spacetraveling::Site::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            site.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::Version => {
            println!("spacetraveling version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
