//! CLI binary for pdf2pptx.
//!
//! `serve` runs the HTTP job service; `convert` runs a single conversion
//! in-process and exits. Both are thin shims over the library crate.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2pptx::{convert_file, ConversionService, LayoutConfig, ServiceConfig};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Run the job service on the default port
  pdf2pptx serve

  # Bind elsewhere and accept any CORS origin
  pdf2pptx serve --port 9000 --cors-origins ''

  # One-shot conversion without the service
  pdf2pptx convert report.pdf -o report.pptx

API:
  POST /api/upload                 multipart field "file" → {uploadId}
  GET  /api/status/{uploadId}      {status, progress, uploadId, downloadUrl?, error?}
  GET  /api/result/{uploadId}      {downloadUrl, filename, fileSize}
  GET  /api/download/{uploadId}    the .pptx file
  GET  /api/health                 {status: "ok"}

ENVIRONMENT VARIABLES:
  RUST_LOG                         Override log filter (e.g. pdf2pptx=debug)
  PDF2PPTX_HOST / PDF2PPTX_PORT    Bind address
  PDF2PPTX_UPLOAD_DIR              Where uploads are stored
  PDF2PPTX_OUTPUT_DIR              Where presentations are written
"#;

/// Convert PDF documents to PowerPoint presentations.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2pptx",
    version,
    about = "Convert PDF documents to PowerPoint presentations",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2PPTX_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2PPTX_QUIET")]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP conversion service.
    Serve(ServeArgs),
    /// Convert one PDF file and exit.
    Convert(ConvertArgs),
}

/// Unset flags keep the [`ServiceConfig`] defaults.
#[derive(Args, Debug)]
struct ServeArgs {
    /// Bind address [default: 0.0.0.0].
    #[arg(long, env = "PDF2PPTX_HOST")]
    host: Option<String>,

    /// Bind port [default: 8000].
    #[arg(short, long, env = "PDF2PPTX_PORT")]
    port: Option<u16>,

    /// Directory for uploaded PDFs [default: ./uploads].
    #[arg(long, env = "PDF2PPTX_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Directory for converted presentations [default: ./converted].
    #[arg(long, env = "PDF2PPTX_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Comma-separated allowed CORS origins; empty allows any origin
    /// [default: http://localhost:3000].
    #[arg(long, env = "PDF2PPTX_CORS_ORIGINS", value_delimiter = ',')]
    cors_origins: Option<Vec<String>>,

    /// Per-request timeout in seconds [default: 30].
    #[arg(long, env = "PDF2PPTX_REQUEST_TIMEOUT_SECS")]
    request_timeout: Option<u64>,

    /// Largest accepted upload in bytes [default: 52428800].
    #[arg(long, env = "PDF2PPTX_MAX_UPLOAD_BYTES")]
    max_upload_bytes: Option<usize>,

    /// Pause in milliseconds between a job starting and its conversion
    /// [default: 0].
    #[arg(long, env = "PDF2PPTX_SETTLE_DELAY_MS")]
    settle_delay_ms: Option<u64>,
}

impl ServeArgs {
    /// Apply the flags that were given on top of the library defaults.
    fn into_config(self) -> Result<ServiceConfig> {
        let mut builder = ServiceConfig::builder();
        if let Some(host) = self.host {
            builder = builder.host(host);
        }
        if let Some(port) = self.port {
            builder = builder.port(port);
        }
        if let Some(dir) = self.upload_dir {
            builder = builder.upload_dir(dir);
        }
        if let Some(dir) = self.output_dir {
            builder = builder.output_dir(dir);
        }
        if let Some(origins) = self.cors_origins {
            builder = builder.cors_origins(origins.into_iter().filter(|o| !o.trim().is_empty()));
        }
        if let Some(secs) = self.request_timeout {
            builder = builder.request_timeout_secs(secs);
        }
        if let Some(bytes) = self.max_upload_bytes {
            builder = builder.max_upload_bytes(bytes);
        }
        if let Some(ms) = self.settle_delay_ms {
            builder = builder.settle_delay_ms(ms);
        }
        builder.build().context("Invalid configuration")
    }
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Local PDF file path.
    input: PathBuf,

    /// Output .pptx path. Defaults to the input path with a .pptx extension.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Disable the spinner.
    #[arg(long, env = "PDF2PPTX_NO_PROGRESS")]
    no_progress: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Command::Serve(args) => serve(args).await,
        Command::Convert(args) => convert(args, cli.quiet).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = args.into_config()?;

    let service = ConversionService::from_config(config);
    service
        .init_dirs()
        .context("Failed to create storage directories")?;

    pdf2pptx::server::serve(service)
        .await
        .context("Server error")
}

async fn convert(args: ConvertArgs, quiet: bool) -> Result<()> {
    let output = args
        .output
        .unwrap_or_else(|| args.input.with_extension("pptx"));

    let spinner = if quiet || args.no_progress {
        None
    } else {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Converting");
        bar.set_message(args.input.display().to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Some(bar)
    };

    let result = convert_file(&args.input, &output, &LayoutConfig::default()).await;
    if let Some(bar) = &spinner {
        bar.finish_and_clear();
    }
    let report = result.context("Conversion failed")?;

    if !quiet {
        eprintln!(
            "{}  {} pages → {} slides  {}  {}ms  →  {}",
            green("✔"),
            report.pages,
            report.slides,
            dim(&format!("{} blocks", report.blocks)),
            report.duration_ms,
            bold(&output.display().to_string()),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serve_args(argv: &[&str]) -> ServeArgs {
        let cli = Cli::try_parse_from(argv.iter().copied()).unwrap();
        match cli.command {
            Command::Serve(args) => args,
            other => panic!("expected serve, got {other:?}"),
        }
    }

    #[test]
    fn bare_serve_uses_library_defaults() {
        let config = serve_args(&["pdf2pptx", "serve"]).into_config().unwrap();
        let defaults = ServiceConfig::default();
        assert_eq!(config.bind_addr(), defaults.bind_addr());
        assert_eq!(config.upload_dir, defaults.upload_dir);
        assert_eq!(config.output_dir, defaults.output_dir);
        assert_eq!(config.cors_origins, defaults.cors_origins);
        assert_eq!(config.max_upload_bytes, defaults.max_upload_bytes);
        assert_eq!(config.settle_delay_ms, defaults.settle_delay_ms);
    }

    #[test]
    fn explicit_flags_override_defaults() {
        let config = serve_args(&[
            "pdf2pptx",
            "serve",
            "--port",
            "9100",
            "--cors-origins",
            "http://a.test,,http://b.test",
            "--settle-delay-ms",
            "2000",
        ])
        .into_config()
        .unwrap();
        assert_eq!(config.port, 9100);
        assert_eq!(config.cors_origins, vec!["http://a.test", "http://b.test"]);
        assert_eq!(config.settle_delay(), Duration::from_secs(2));
        assert_eq!(config.host, ServiceConfig::default().host);
    }

    #[test]
    fn empty_cors_list_allows_any_origin() {
        let config = serve_args(&["pdf2pptx", "serve", "--cors-origins", ""])
            .into_config()
            .unwrap();
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn unparsable_port_is_rejected_by_clap() {
        assert!(Cli::try_parse_from(["pdf2pptx", "serve", "--port", "eighty"]).is_err());
    }
}
