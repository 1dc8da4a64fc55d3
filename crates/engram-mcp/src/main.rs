//! `engram` — a thin CLI handler wiring the `engram-core` cognitive memory
//! engine to a line-delimited JSON protocol on stdio. Mirrors the adapted
//! codebase's `main.rs` in approach (hand-rolled arg parsing, stderr-only
//! logging, data-dir resolution) but with no MCP/JSON-RPC transport, no
//! dashboard, and no background consolidation daemon — §4.6 of the engine's
//! design is explicit that tier transitions are evaluated lazily on read,
//! so there is nothing for a sweep to do here.

mod protocol;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use tracing::{error, info, warn, Level};
use tracing_subscriber::EnvFilter;

use engram_core::embeddings::{EmbeddingProvider, HashEmbeddingProvider};
use engram_core::storage::Storage;

use protocol::{handle_request, Request};

/// Parsed startup configuration. Every tunable `engram-core` needs is read
/// exactly once here and passed down as an explicit constructor argument —
/// the core never reads `std::env` directly.
struct Config {
    data_dir: Option<PathBuf>,
    embedding_cache_dir: Option<PathBuf>,
}

fn parse_args() -> Config {
    let args: Vec<String> = std::env::args().collect();
    let mut data_dir: Option<PathBuf> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("engram {}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Cognitive memory engine: FSRS-4.5 scheduling, prediction-error admission,");
                println!("and lazy tier/lifecycle tracking, over a line-delimited JSON stdio protocol.");
                println!();
                println!("USAGE:");
                println!("    engram [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help              Print help information");
                println!("    -V, --version           Print version information");
                println!("    --data-dir <PATH>       Custom data directory");
                println!();
                println!("ENVIRONMENT:");
                println!("    RUST_LOG                Log level filter (e.g., debug, info, warn, error)");
                println!("    FASTEMBED_CACHE_PATH    Cache directory for the local embedding model");
                println!();
                println!("PROTOCOL:");
                println!("    One JSON request per line on stdin, one JSON response per line on stdout.");
                println!(r#"    {{"op":"save","content":"...","title":"..."}}"#);
                println!(r#"    {{"op":"search","query":"...","limit":10}}"#);
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("engram {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--data-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --data-dir requires a path argument");
                    std::process::exit(20);
                }
                data_dir = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with("--data-dir=") => {
                let path = arg.strip_prefix("--data-dir=").unwrap_or("");
                if path.is_empty() {
                    eprintln!("error: --data-dir requires a path argument");
                    std::process::exit(20);
                }
                data_dir = Some(PathBuf::from(path));
            }
            arg => {
                eprintln!("error: unknown argument '{arg}'");
                eprintln!("Try 'engram --help' for more information.");
                std::process::exit(20);
            }
        }
        i += 1;
    }

    let embedding_cache_dir = std::env::var("FASTEMBED_CACHE_PATH")
        .ok()
        .map(PathBuf::from)
        .or_else(|| {
            directories::ProjectDirs::from("dev", "engram", "engram")
                .map(|dirs| dirs.cache_dir().to_path_buf())
        });

    Config {
        data_dir,
        embedding_cache_dir,
    }
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}

#[cfg(feature = "embeddings")]
fn build_embedder(cache_dir: Option<PathBuf>) -> Box<dyn EmbeddingProvider> {
    let provider = engram_core::embeddings::FastEmbedProvider::new(cache_dir);
    match provider.warm_up() {
        Ok(()) => {
            info!("local embedding model initialised");
            Box::new(provider)
        }
        Err(e) => {
            error!(error = %e, "failed to initialise local embedding model, falling back to the deterministic hash embedder");
            Box::new(HashEmbeddingProvider::default())
        }
    }
}

#[cfg(not(feature = "embeddings"))]
fn build_embedder(_cache_dir: Option<PathBuf>) -> Box<dyn EmbeddingProvider> {
    Box::new(HashEmbeddingProvider::default())
}

fn main() {
    let config = parse_args();
    init_logging();

    info!(version = env!("CARGO_PKG_VERSION"), "engram starting");

    let storage = match Storage::open(config.data_dir) {
        Ok(s) => s,
        Err(e) => {
            error!(error = %e, "failed to open storage");
            std::process::exit(e.exit_code());
        }
    };

    let embedder = build_embedder(config.embedding_cache_dir);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut exit_code = 0;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(error = %e, "error reading stdin, shutting down");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(&line) {
            Ok(r) => r,
            Err(e) => {
                let response = protocol::Response::error(format!("malformed request: {e}"), 20);
                write_response(&mut stdout, &response);
                continue;
            }
        };

        let response = handle_request(&storage, embedder.as_ref(), request);
        exit_code = response.exit_code_for_last_error().unwrap_or(exit_code);
        write_response(&mut stdout, &response);
    }

    std::process::exit(exit_code);
}

fn write_response(stdout: &mut io::Stdout, response: &protocol::Response) {
    let line = serde_json::to_string(response).expect("Response always serialises");
    if let Err(e) = writeln!(stdout, "{line}") {
        error!(error = %e, "failed to write response to stdout");
    }
    let _ = stdout.flush();
}
