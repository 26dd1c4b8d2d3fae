use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

mod tap;

#[derive(Parser)]
#[command(name = "dnsdump-tap")]
#[command(version)]
#[command(about = "Listens for DNS datagrams and prints each as a trace record")]
struct Cli {
    /// Address to receive datagrams on
    #[arg(short, long, default_value = "127.0.0.1:8053")]
    listen: SocketAddr,

    /// Fold each record onto its own continuation line
    #[arg(short, long)]
    multiline: bool,

    /// Print only the name of the first question
    #[arg(short, long)]
    domain: bool,
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = if cli.domain {
        tap::Format::Domain
    } else if cli.multiline {
        tap::Format::Multiline
    } else {
        tap::Format::Line
    };

    tap::Tap::new(cli.listen, format).run().await
}
