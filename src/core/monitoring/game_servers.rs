//! Game server reachability via TCP connect probes.

use crate::config::settings::GameServerConfig;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::task::JoinSet;
use tracing::debug;

/// Result of probing one game server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameServerStatus {
    /// Configured name
    pub name: String,
    /// Game title
    pub game: String,
    /// `host:port`
    pub address: String,
    /// Whether the TCP connect succeeded within the timeout
    pub online: bool,
    /// Connect latency, when online
    pub latency_ms: Option<u64>,
}

/// Opens (and immediately drops) a TCP connection to the server.
pub async fn probe(server: &GameServerConfig, timeout: Duration) -> GameServerStatus {
    let address = server.address();
    let started = Instant::now();
    let outcome = tokio::time::timeout(timeout, TcpStream::connect(&address)).await;

    let online = matches!(outcome, Ok(Ok(_)));
    if !online {
        debug!("Game server {} at {address} is unreachable", server.name);
    }

    GameServerStatus {
        name: server.name.clone(),
        game: server.game.clone(),
        address,
        online,
        latency_ms: online
            .then(|| u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)),
    }
}

/// Probes every server concurrently. Output order follows `servers`.
pub async fn probe_all(servers: &[GameServerConfig], timeout: Duration) -> Vec<GameServerStatus> {
    let mut probes = JoinSet::new();
    for (index, server) in servers.iter().cloned().enumerate() {
        probes.spawn(async move { (index, probe(&server, timeout).await) });
    }

    let mut results: Vec<(usize, GameServerStatus)> = Vec::with_capacity(servers.len());
    while let Some(joined) = probes.join_next().await {
        match joined {
            Ok(result) => results.push(result),
            Err(e) => tracing::warn!("Game server probe task failed: {e}"),
        }
    }
    results.sort_by_key(|(index, _)| *index);
    results.into_iter().map(|(_, status)| status).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    fn server(name: &str, port: u16) -> GameServerConfig {
        GameServerConfig {
            name: name.to_string(),
            game: "Minecraft".to_string(),
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    #[tokio::test]
    async fn test_probe_listening_server_is_online() -> std::io::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener.local_addr()?.port();

        let status = probe(&server("survival", port), Duration::from_secs(2)).await;
        assert!(status.online);
        assert!(status.latency_ms.is_some());
        assert_eq!(status.address, format!("127.0.0.1:{port}"));
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_closed_port_is_offline() -> std::io::Result<()> {
        // Bind then drop to get a port nothing listens on
        let port = TcpListener::bind("127.0.0.1:0").await?.local_addr()?.port();

        let status = probe(&server("creative", port), Duration::from_secs(2)).await;
        assert!(!status.online);
        assert!(status.latency_ms.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_probe_all_keeps_config_order() -> std::io::Result<()> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let open = listener.local_addr()?.port();
        let closed = TcpListener::bind("127.0.0.1:0").await?.local_addr()?.port();

        let statuses = probe_all(
            &[server("b", closed), server("a", open)],
            Duration::from_secs(2),
        )
        .await;
        assert_eq!(statuses.len(), 2);
        assert_eq!(statuses[0].name, "b");
        assert!(!statuses[0].online);
        assert!(statuses[1].online);
        Ok(())
    }
}
