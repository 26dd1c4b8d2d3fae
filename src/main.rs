use anyhow::Context;
use clap::Parser;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

/// Continuation token used between records with `--multiline`.
const MULTILINE_ENDLINE: &str = "\\\n\t";

#[derive(Parser)]
#[command(name = "dnsdump")]
#[command(version)]
#[command(about = "Prints captured DNS messages as one line trace records")]
struct Cli {
    /// Fold each record onto its own continuation line
    #[arg(short, long)]
    multiline: bool,

    /// Print only the name of the first question
    #[arg(short, long)]
    domain: bool,

    /// Files each holding one raw DNS message; stdin when none are given
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

impl Cli {
    fn endline(&self) -> &'static str {
        if self.multiline {
            MULTILINE_ENDLINE
        } else {
            ""
        }
    }

    /// The line printed for one message.
    fn render(&self, payload: &[u8]) -> String {
        if self.domain {
            return match dns_message::query_domain(payload) {
                Ok(Some(name)) => name,
                Ok(None) => {
                    debug!("message has no questions");
                    String::new()
                }
                Err(e) => {
                    warn!("could not read query domain: {}", e);
                    String::new()
                }
            };
        }

        let mut line = String::new();
        // Writing into a String cannot fail.
        let _ = dns_message::dump_dns(payload, self.endline(), &mut line);
        line
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.files.is_empty() {
        let mut payload = Vec::new();
        io::stdin()
            .read_to_end(&mut payload)
            .context("reading message from stdin")?;
        writeln!(out, "{}", cli.render(&payload))?;
        return Ok(());
    }

    for path in cli.files.iter() {
        let payload =
            std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        debug!("read {} bytes from {}", payload.len(), path.display());
        writeln!(out, "{}", cli.render(&payload))?;
    }
    Ok(())
}
