use anyhow::Context;
use futures::prelude::*;

use std::io;
use std::net::SocketAddr;

use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::net::UdpSocket;
use tokio_util::codec::BytesCodec;
use tokio_util::udp::UdpFramed;
use tracing::{debug, error, info, warn};

type Result<T> = anyhow::Result<T>;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Format {
    /// One record per line.
    Line,
    /// Records folded with a `\` continuation.
    Multiline,
    /// Only the first question's name.
    Domain,
}

pub(crate) struct Tap {
    local_addr: SocketAddr,
    format: Format,
}

impl Tap {
    pub fn new(local_addr: SocketAddr, format: Format) -> Self {
        Self { local_addr, format }
    }

    /// Receives datagrams until the socket closes, writing one trace record
    /// per datagram to stdout in the order they arrived.
    pub async fn run(&self) -> Result<()> {
        let socket = UdpSocket::bind(&self.local_addr)
            .await
            .with_context(|| format!("binding {}", self.local_addr))?;
        info!("Listening on {}", self.local_addr);

        let stream = UdpFramed::new(socket, BytesCodec::new());
        relay(stream, &mut tokio::io::stdout(), self.format).await
    }
}

/// Renders each datagram of `stream` to `out`, one line apiece, until the
/// stream ends. Receive errors are logged and skipped.
async fn relay<S, B, W>(mut stream: S, out: &mut W, format: Format) -> Result<()>
where
    S: Stream<Item = io::Result<(B, SocketAddr)>> + Unpin,
    B: AsRef<[u8]>,
    W: AsyncWrite + Unpin,
{
    loop {
        let (bytes, addr) = match stream.next().await {
            Some(Ok((b, a))) => (b, a),
            Some(Err(e)) => {
                error!("Error getting next value in stream: {}", e);
                continue;
            }
            None => {
                warn!("No value available from stream, closing");
                return Ok(());
            }
        };

        let bytes = bytes.as_ref();
        debug!("{} bytes from {}", bytes.len(), addr);
        let line = render(bytes, format);
        write_line(out, &line).await?;
    }
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, line: &str) -> Result<()> {
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

fn render(payload: &[u8], format: Format) -> String {
    let endline = match format {
        Format::Line => "",
        Format::Multiline => "\\\n\t",
        Format::Domain => {
            return match dns_message::query_domain(payload) {
                Ok(name) => name.unwrap_or_default(),
                Err(e) => {
                    warn!("could not read query domain: {}", e);
                    String::new()
                }
            }
        }
    };

    let mut line = String::new();
    // Writing into a String cannot fail.
    let _ = dns_message::dump_dns(payload, endline, &mut line);
    line
}
