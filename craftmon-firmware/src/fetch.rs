//! Transport half of the two status fetchers
//!
//! One TCP connection per poll. The body lands in a fixed buffer and the
//! core decoders take it from there; the socket is closed on every path
//! before the outcome is inspected.

use core::net::Ipv4Addr;

use craftmon_core::fetch::FetchError;
use craftmon_core::mcstatus::{self, GameSnapshot};
use craftmon_core::panel::{self, PanelSnapshot};
use embassy_net::Stack;
use embassy_net::dns::DnsQueryType;
use embassy_net::tcp::TcpSocket;
use log::{debug, warn};

use crate::http::{self, HttpError, Url};

/// Response body budget; both endpoints answer well under this.
const BODY_BUF_SIZE: usize = 4096;

/// The only transport-level timeout in the system.
const SOCKET_TIMEOUT_SECS: u64 = 30;

/// Fetch and decode one remote-services response from the panel.
pub async fn fetch_panel(stack: Stack<'_>, url: &str) -> Result<PanelSnapshot, FetchError> {
    let mut body = [0u8; BODY_BUF_SIZE];
    let len = fetch_body(stack, url, &mut body).await.map_err(|e| {
        warn!("panel fetch failed: {:?}", e);
        FetchError::Transport
    })?;
    panel::decode(&body[..len])
}

/// Fetch and decode one game-server status response.
///
/// Transport and decode failures are normal outcomes here; both fold
/// into the Error-status snapshot instead of propagating.
pub async fn fetch_game(stack: Stack<'_>, url: &str) -> GameSnapshot {
    let mut body = [0u8; BODY_BUF_SIZE];
    match fetch_body(stack, url, &mut body).await {
        Ok(len) => mcstatus::decode(&body[..len]).unwrap_or_else(|e| {
            warn!("game status decode failed: {:?}", e);
            GameSnapshot::unreachable()
        }),
        Err(e) => {
            warn!("game status fetch failed: {:?}", e);
            GameSnapshot::unreachable()
        }
    }
}

/// GET `url` and copy the response body into `body`, returning the byte
/// count.
async fn fetch_body(stack: Stack<'_>, url: &str, body: &mut [u8]) -> Result<usize, HttpError> {
    let url = Url::parse(url)?;
    let address = resolve_host(stack, url.host).await?;

    let mut rx_buf = [0u8; 4096];
    let mut tx_buf = [0u8; 1024];
    let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);
    socket.set_timeout(Some(embassy_time::Duration::from_secs(SOCKET_TIMEOUT_SECS)));

    socket
        .connect((address, url.port))
        .await
        .map_err(|_| HttpError::Connect)?;

    let mut len = 0;
    let mut http_rx = [0u8; 2048];
    let result = http::get(&mut socket, &url, &mut http_rx, |chunk| {
        let free = body.len() - len;
        let take = chunk.len().min(free);
        body[len..len + take].copy_from_slice(&chunk[..take]);
        len += take;
    })
    .await;

    // Released exactly once, whatever the outcome was.
    socket.close();

    let status = result?;
    debug!("GET {} -> {} ({} body bytes)", url.path, status, len);
    Ok(len)
}

/// Resolve a host that is either a literal IPv4 address or a DNS name.
async fn resolve_host(stack: Stack<'_>, host: &str) -> Result<Ipv4Addr, HttpError> {
    if let Ok(address) = host.parse::<Ipv4Addr>() {
        return Ok(address);
    }

    let addresses = stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|_| HttpError::Connect)?;

    if let Some(embassy_net::IpAddress::Ipv4(v4)) = addresses.first() {
        return Ok(Ipv4Addr::from(v4.octets()));
    }
    Err(HttpError::Connect)
}
