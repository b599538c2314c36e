//! Single-server status query over the A2S_INFO protocol
//!
//! One query is one ephemeral UDP socket, one request/response exchange
//! (plus at most one challenge retry) bounded by the caller's timeout.
//! Every failure mode is absorbed into a [`QueryOutcome::Failure`]; this
//! module never returns an error to its caller.

use log::debug;
use shared::{
    decode_info_response, encode_info_request, platform_label, FailureReason, InfoPayload,
    InfoResponse, QueryOutcome, ServerAddress, ServerStatus, MAX_DATAGRAM,
};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::{lookup_host, UdpSocket};
use tokio::time::timeout;

/// Executes one status query against one server.
///
/// Resolution happens first; a host that does not resolve fails without
/// any network round trip. The wait for a reply is bounded by
/// `query_timeout`, so a stuck server costs at most that long.
pub async fn query(address: &ServerAddress, query_timeout: Duration) -> QueryOutcome {
    let target = match resolve(address).await {
        Some(target) => target,
        None => {
            debug!("{}: resolution failed", address);
            return failure(address, FailureReason::Resolve);
        }
    };

    match exchange(target, query_timeout).await {
        Ok((payload, ping_ms)) => QueryOutcome::Success(ServerStatus {
            name: payload.name,
            players: payload.players,
            max_players: payload.max_players,
            map: payload.map,
            platform: platform_label(&payload.version),
            ping_ms,
        }),
        Err(reason) => {
            debug!("{}: query failed ({})", address, reason);
            failure(address, reason)
        }
    }
}

fn failure(address: &ServerAddress, reason: FailureReason) -> QueryOutcome {
    QueryOutcome::Failure {
        address: address.clone(),
        reason,
    }
}

async fn resolve(address: &ServerAddress) -> Option<SocketAddr> {
    lookup_host((address.host.as_str(), address.port))
        .await
        .ok()?
        .next()
}

/// Runs the request/response exchange and measures its round trip.
///
/// A challenge reply triggers exactly one retry with the challenge
/// appended; a second challenge is treated as a parse failure.
async fn exchange(
    target: SocketAddr,
    query_timeout: Duration,
) -> Result<(InfoPayload, u64), FailureReason> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .map_err(|_| FailureReason::Transport)?;
    socket
        .connect(target)
        .await
        .map_err(|_| FailureReason::Transport)?;

    let mut buffer = [0u8; MAX_DATAGRAM];
    let mut request = encode_info_request(None);

    for attempt in 0..2 {
        let started = Instant::now();
        socket
            .send(&request)
            .await
            .map_err(|_| FailureReason::Transport)?;

        let len = match timeout(query_timeout, socket.recv(&mut buffer)).await {
            Err(_) => return Err(FailureReason::Timeout),
            Ok(Err(_)) => return Err(FailureReason::Transport),
            Ok(Ok(len)) => len,
        };

        match decode_info_response(&buffer[..len]).map_err(|_| FailureReason::Parse)? {
            InfoResponse::Info(payload) => {
                let ping_ms = started.elapsed().as_millis() as u64;
                return Ok((payload, ping_ms));
            }
            InfoResponse::Challenge(challenge) if attempt == 0 => {
                request = encode_info_request(Some(challenge));
            }
            InfoResponse::Challenge(_) => return Err(FailureReason::Parse),
        }
    }

    Err(FailureReason::Parse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{encode_challenge_response, encode_info_response};
    use std::net::UdpSocket as StdUdpSocket;
    use std::thread;

    fn sample_payload() -> InfoPayload {
        InfoPayload {
            protocol: 17,
            name: "Test Server".to_string(),
            map: "de_dust".to_string(),
            folder: "cstrike".to_string(),
            game: "Counter-Strike: Source".to_string(),
            app_id: 240,
            players: 5,
            max_players: 16,
            bots: 0,
            server_type: b'd',
            environment: b'l',
            visibility: 0,
            vac: 1,
            version: "9540945".to_string(),
        }
    }

    /// Spawns a one-shot responder thread that answers each received
    /// request with the next canned reply.
    fn spawn_responder(replies: Vec<Vec<u8>>) -> SocketAddr {
        let socket = StdUdpSocket::bind("127.0.0.1:0").expect("bind responder");
        let addr = socket.local_addr().unwrap();
        thread::spawn(move || {
            let mut buf = [0u8; 2048];
            for reply in replies {
                if let Ok((_, peer)) = socket.recv_from(&mut buf) {
                    let _ = socket.send_to(&reply, peer);
                }
            }
        });
        addr
    }

    #[tokio::test]
    async fn query_success_maps_platform_label() {
        let addr = spawn_responder(vec![encode_info_response(&sample_payload())]);
        let address = ServerAddress::new("127.0.0.1", addr.port());
        match query(&address, Duration::from_secs(1)).await {
            QueryOutcome::Success(status) => {
                assert_eq!(status.name, "Test Server");
                assert_eq!(status.players, 5);
                assert_eq!(status.max_players, 16);
                assert_eq!(status.map, "de_dust");
                assert_eq!(status.platform, "CSS v93");
            }
            other => panic!("expected success, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn query_follows_challenge_then_info() {
        let addr = spawn_responder(vec![
            encode_challenge_response([9, 9, 9, 9]),
            encode_info_response(&sample_payload()),
        ]);
        let address = ServerAddress::new("127.0.0.1", addr.port());
        let outcome = query(&address, Duration::from_secs(1)).await;
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn query_double_challenge_is_parse_failure() {
        let addr = spawn_responder(vec![
            encode_challenge_response([1, 1, 1, 1]),
            encode_challenge_response([2, 2, 2, 2]),
        ]);
        let address = ServerAddress::new("127.0.0.1", addr.port());
        let outcome = query(&address, Duration::from_secs(1)).await;
        assert_eq!(outcome.failure_reason(), Some(FailureReason::Parse));
    }

    #[tokio::test]
    async fn query_times_out_on_silent_server() {
        // Bound but never answered.
        let socket = StdUdpSocket::bind("127.0.0.1:0").unwrap();
        let address = ServerAddress::new("127.0.0.1", socket.local_addr().unwrap().port());
        let outcome = query(&address, Duration::from_millis(100)).await;
        assert_eq!(outcome.failure_reason(), Some(FailureReason::Timeout));
    }

    #[tokio::test]
    async fn query_garbage_reply_is_parse_failure() {
        let addr = spawn_responder(vec![vec![0x00, 0x01, 0x02]]);
        let address = ServerAddress::new("127.0.0.1", addr.port());
        let outcome = query(&address, Duration::from_secs(1)).await;
        assert_eq!(outcome.failure_reason(), Some(FailureReason::Parse));
    }

    #[tokio::test]
    async fn query_unresolvable_host_fails_without_network() {
        let address = ServerAddress::new("definitely-not-a-real-host.invalid", 27015);
        let outcome = query(&address, Duration::from_secs(1)).await;
        assert_eq!(outcome.failure_reason(), Some(FailureReason::Resolve));
    }
}
