use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Four-byte "single packet" header both sides of the A2S exchange use.
pub const PACKET_HEADER: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
/// Payload of the A2S_INFO request, fixed by the protocol.
pub const INFO_REQUEST_PAYLOAD: &[u8] = b"Source Engine Query\0";
pub const INFO_REQUEST_TYPE: u8 = b'T';
pub const INFO_RESPONSE_TYPE: u8 = b'I';
pub const CHALLENGE_RESPONSE_TYPE: u8 = b'A';
/// Largest datagram we expect from a server.
pub const MAX_DATAGRAM: usize = 1400;

/// A configured server endpoint, parsed from `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerAddress {
    pub host: String,
    pub port: u16,
}

impl ServerAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    MissingPort,
    EmptyHost,
    InvalidPort(String),
}

impl fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressParseError::MissingPort => write!(f, "expected host:port"),
            AddressParseError::EmptyHost => write!(f, "host part is empty"),
            AddressParseError::InvalidPort(p) => write!(f, "invalid port '{}'", p),
        }
    }
}

impl std::error::Error for AddressParseError {}

impl FromStr for ServerAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or(AddressParseError::MissingPort)?;
        if host.is_empty() {
            return Err(AddressParseError::EmptyHost);
        }
        let port = port
            .parse::<u16>()
            .map_err(|_| AddressParseError::InvalidPort(port.to_string()))?;
        Ok(ServerAddress::new(host, port))
    }
}

/// Why a single server query produced no status.
///
/// The distinction matters for diagnostics only; callers treat all
/// variants the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureReason {
    Resolve,
    Timeout,
    Transport,
    Parse,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            FailureReason::Resolve => "resolve",
            FailureReason::Timeout => "timeout",
            FailureReason::Transport => "transport",
            FailureReason::Parse => "parse",
        };
        write!(f, "{}", tag)
    }
}

/// Status of one server as reported by a successful A2S_INFO exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub name: String,
    pub players: u8,
    pub max_players: u8,
    pub map: String,
    pub platform: String,
    pub ping_ms: u64,
}

/// Result of querying one server: a full status or a tagged failure,
/// never a mix of the two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryOutcome {
    Success(ServerStatus),
    Failure {
        address: ServerAddress,
        reason: FailureReason,
    },
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, QueryOutcome::Success(_))
    }

    pub fn failure_reason(&self) -> Option<FailureReason> {
        match self {
            QueryOutcome::Success(_) => None,
            QueryOutcome::Failure { reason, .. } => Some(*reason),
        }
    }
}

/// One polling cycle's output: an outcome per configured server, in the
/// same order as the input list. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBatch {
    entries: Vec<(ServerAddress, QueryOutcome)>,
}

impl ResultBatch {
    pub fn new(entries: Vec<(ServerAddress, QueryOutcome)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[(ServerAddress, QueryOutcome)] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &(ServerAddress, QueryOutcome)> {
        self.entries.iter()
    }
}

/// Maps an engine version string to a human-readable platform label.
/// Unknown versions pass through unchanged.
pub fn platform_label(version: &str) -> String {
    match version {
        "9540945" => "CSS v93".to_string(),
        "6630498" => "CSS V92".to_string(),
        "1.38.8.1" => "CS:GO".to_string(),
        "1.0.0.34" => "CSS v34".to_string(),
        "1.35.3.102" => "Classic Counter".to_string(),
        other => other.to_string(),
    }
}

/// Fields of an A2S_INFO reply we decode. The trailing Extra Data Flag
/// section is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoPayload {
    pub protocol: u8,
    pub name: String,
    pub map: String,
    pub folder: String,
    pub game: String,
    pub app_id: u16,
    pub players: u8,
    pub max_players: u8,
    pub bots: u8,
    pub server_type: u8,
    pub environment: u8,
    pub visibility: u8,
    pub vac: u8,
    pub version: String,
}

/// A decoded reply to an A2S_INFO request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InfoResponse {
    /// Server wants the request re-sent with this challenge appended.
    Challenge([u8; 4]),
    Info(InfoPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    Truncated,
    BadHeader,
    BadType(u8),
    UnterminatedString,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::Truncated => write!(f, "datagram truncated"),
            WireError::BadHeader => write!(f, "missing single-packet header"),
            WireError::BadType(t) => write!(f, "unexpected response type 0x{:02x}", t),
            WireError::UnterminatedString => write!(f, "unterminated string field"),
        }
    }
}

impl std::error::Error for WireError {}

/// Builds the A2S_INFO request datagram, with the server's challenge
/// appended when re-sending.
pub fn encode_info_request(challenge: Option<[u8; 4]>) -> Vec<u8> {
    let mut packet = Vec::with_capacity(PACKET_HEADER.len() + 1 + INFO_REQUEST_PAYLOAD.len() + 4);
    packet.extend_from_slice(&PACKET_HEADER);
    packet.push(INFO_REQUEST_TYPE);
    packet.extend_from_slice(INFO_REQUEST_PAYLOAD);
    if let Some(challenge) = challenge {
        packet.extend_from_slice(&challenge);
    }
    packet
}

/// Builds an A2S_INFO reply datagram. Used by test harnesses standing in
/// for a real server.
pub fn encode_info_response(payload: &InfoPayload) -> Vec<u8> {
    let mut packet = Vec::new();
    packet.extend_from_slice(&PACKET_HEADER);
    packet.push(INFO_RESPONSE_TYPE);
    packet.push(payload.protocol);
    for s in [&payload.name, &payload.map, &payload.folder, &payload.game] {
        packet.extend_from_slice(s.as_bytes());
        packet.push(0);
    }
    packet.extend_from_slice(&payload.app_id.to_le_bytes());
    packet.push(payload.players);
    packet.push(payload.max_players);
    packet.push(payload.bots);
    packet.push(payload.server_type);
    packet.push(payload.environment);
    packet.push(payload.visibility);
    packet.push(payload.vac);
    packet.extend_from_slice(payload.version.as_bytes());
    packet.push(0);
    packet
}

/// Builds a challenge reply datagram. Test harness counterpart of
/// [`InfoResponse::Challenge`].
pub fn encode_challenge_response(challenge: [u8; 4]) -> Vec<u8> {
    let mut packet = Vec::with_capacity(PACKET_HEADER.len() + 1 + 4);
    packet.extend_from_slice(&PACKET_HEADER);
    packet.push(CHALLENGE_RESPONSE_TYPE);
    packet.extend_from_slice(&challenge);
    packet
}

/// Decodes a reply datagram into either an info payload or a challenge.
pub fn decode_info_response(data: &[u8]) -> Result<InfoResponse, WireError> {
    let mut reader = Reader::new(data);
    let header = reader.take(4)?;
    if header != PACKET_HEADER {
        return Err(WireError::BadHeader);
    }
    match reader.read_u8()? {
        CHALLENGE_RESPONSE_TYPE => {
            let bytes = reader.take(4)?;
            Ok(InfoResponse::Challenge([
                bytes[0], bytes[1], bytes[2], bytes[3],
            ]))
        }
        INFO_RESPONSE_TYPE => {
            let payload = InfoPayload {
                protocol: reader.read_u8()?,
                name: reader.read_cstring()?,
                map: reader.read_cstring()?,
                folder: reader.read_cstring()?,
                game: reader.read_cstring()?,
                app_id: reader.read_u16_le()?,
                players: reader.read_u8()?,
                max_players: reader.read_u8()?,
                bots: reader.read_u8()?,
                server_type: reader.read_u8()?,
                environment: reader.read_u8()?,
                visibility: reader.read_u8()?,
                vac: reader.read_u8()?,
                version: reader.read_cstring()?,
            };
            Ok(InfoResponse::Info(payload))
        }
        other => Err(WireError::BadType(other)),
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], WireError> {
        if self.pos + n > self.data.len() {
            return Err(WireError::Truncated);
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, WireError> {
        Ok(self.take(1)?[0])
    }

    fn read_u16_le(&mut self) -> Result<u16, WireError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_cstring(&mut self) -> Result<String, WireError> {
        let rest = &self.data[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(WireError::UnterminatedString)?;
        let s = String::from_utf8_lossy(&rest[..nul]).into_owned();
        self.pos += nul + 1;
        Ok(s)
    }
}
