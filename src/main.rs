//! # Certatelier CLI
//!
//! Command-line interface for certificate generation.
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! certatelier serve --listen 0.0.0.0:8080 --font fonts/NotoSansSC-Regular.ttf
//!
//! # Render one seeded recipient's certificate to a file
//! certatelier render 1 --font fonts/NotoSansSC-Regular.ttf --out cert.png
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use certatelier::{
    CertError,
    assets::BackgroundStore,
    render::{Compositor, font::LoadedFont, render_recipient},
    seed,
    server::{self, ServerConfig},
};

/// Certatelier - certificate image generation utility
#[derive(Parser, Debug)]
#[command(name = "certatelier")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: String,

        /// TTF font for certificate text (must cover CJK)
        #[arg(long)]
        font: PathBuf,

        /// Optional bold face for emphasized runs
        #[arg(long)]
        bold_font: Option<PathBuf>,
    },
    /// Render one recipient's certificate to a PNG file
    Render {
        /// Recipient id from the seeded dataset
        recipient_id: String,

        /// TTF font for certificate text (must cover CJK)
        #[arg(long)]
        font: PathBuf,

        /// Optional bold face for emphasized runs
        #[arg(long)]
        bold_font: Option<PathBuf>,

        /// Output path (defaults to the generated certificate filename)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CertError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "certatelier=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            listen,
            font,
            bold_font,
        } => {
            server::serve(ServerConfig {
                listen_addr: listen,
                font_path: font,
                bold_font_path: bold_font,
            })
            .await
        }
        Commands::Render {
            recipient_id,
            font,
            bold_font,
            out,
        } => {
            let font = LoadedFont::from_files(&font, bold_font.as_deref())?;
            let compositor = Compositor::new(font);
            let registry = seed::registry()?;
            let store = seed::store();
            let backgrounds = BackgroundStore::new()?;

            let recipient = store.get(&recipient_id).ok_or_else(|| {
                CertError::Template(format!("unknown recipient {}", recipient_id))
            })?;

            let cert = render_recipient(&compositor, &registry, &backgrounds, recipient).await?;
            let path = out.unwrap_or_else(|| PathBuf::from(&cert.file_name));
            std::fs::write(&path, &cert.png)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}
