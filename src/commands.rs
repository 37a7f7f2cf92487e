//! Command execution.

use crate::config::Config;
use crate::Commands;
use chianet_protocol::{
    Capability, Handshake, Message, Payload, ProtocolMessageType, RequestPeers, RespondPeers,
    TimestampedPeerInfo,
};
use chianet_streamable::describe;
use colored::Colorize;
use serde_json::{json, Value};

type CommandResult = Result<String, Box<dyn std::error::Error>>;

/// Executes a command and returns the formatted output.
pub fn execute(cmd: Commands, config: &Config, json: bool) -> CommandResult {
    match cmd {
        Commands::Decode { input } => {
            let bytes = parse_bytes_arg(&input)?;
            decode(&bytes, config, json)
        }

        Commands::Encode { payload, id } => {
            let payload: Payload = serde_json::from_value(parse_json_arg(&payload)?)?;
            let mut message = payload.into_message()?;
            if let Some(id) = id {
                message = message.with_id(id);
            }
            encode(&message, json)
        }

        Commands::Handshake { id } => {
            let mut message = Message::from_payload(&config.node.handshake())?;
            if let Some(id) = id {
                message = message.with_id(id);
            }
            encode(&message, json)
        }

        Commands::Describe { record } => {
            let layout = layout_of(&record).ok_or_else(|| {
                format!(
                    "unknown record '{}' (expected one of: {})",
                    record,
                    RECORDS.join(", ")
                )
            })?;
            if json {
                Ok(format_json(&json!({ "record": record, "layout": layout })))
            } else {
                Ok(layout)
            }
        }

        Commands::Kinds => {
            if json {
                let kinds: Vec<Value> = ProtocolMessageType::KNOWN
                    .iter()
                    .map(|t| json!({ "type": t.0, "name": t.to_string() }))
                    .collect();
                return Ok(format_json(&Value::Array(kinds)));
            }

            let mut output = String::new();
            for kind in ProtocolMessageType::KNOWN {
                output.push_str(&format!("  {:>3}  {}\n", kind.0, kind.to_string().cyan()));
            }
            Ok(output.trim_end().to_string())
        }

        Commands::InitConfig { path, force } => {
            if path.exists() && !force {
                return Err(format!(
                    "{} already exists (use --force to overwrite)",
                    path.display()
                )
                .into());
            }
            config.save(&path)?;
            tracing::info!(path = %path.display(), "wrote config");
            if json {
                Ok(format_json(&json!({ "path": path.display().to_string() })))
            } else {
                Ok(format!("{} {}", "Wrote config to".green(), path.display()))
            }
        }
    }
}

/// Decodes an envelope and renders it with its payload.
fn decode(bytes: &[u8], config: &Config, json: bool) -> CommandResult {
    let limit = config.limits.max_message_size;
    if bytes.len() > limit {
        return Err(format!(
            "message of {} exceeds the {} limit",
            format_bytes(bytes.len() as u64),
            format_bytes(limit as u64)
        )
        .into());
    }

    let message = Message::decode(bytes)?;
    let payload = Payload::from_message(&message)?;

    if json {
        return Ok(format_json(&json!({
            "message": message,
            "payload": payload,
        })));
    }

    let id = message
        .id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "none".to_string());
    let mut output = format!(
        "{}\n  Type: {} ({})\n  ID: {}\n  Payload: {}",
        "Message".bold(),
        message.msg_type.to_string().cyan(),
        message.msg_type.0,
        id,
        format_bytes(message.data.len() as u64)
    );

    match &payload {
        Payload::Unknown { data, .. } => {
            output.push_str(&format!(
                "\n{}: no schema for this type\n  {}",
                "Warning".yellow(),
                hex::encode(data)
            ));
        }
        Payload::RespondPeers(peers) => {
            output.push_str(&format!("\n{}", format!("Peers ({})", peers.len()).bold()));
            for peer in &peers.peer_list {
                output.push_str(&format!("\n  {}", format_peer(peer)));
            }
        }
        known => {
            let value = serde_json::to_value(known)?;
            output.push_str(&format!("\n{}", format_json(&value["data"])));
        }
    }

    Ok(output)
}

/// Renders an encoded envelope as hex, or as JSON with the hex attached.
fn encode(message: &Message, json: bool) -> CommandResult {
    let encoded = message.encode()?;
    let hex = hex::encode(&encoded);
    if json {
        Ok(format_json(&json!({
            "message": message,
            "hex": hex,
        })))
    } else {
        Ok(hex)
    }
}

const RECORDS: [&str; 6] = [
    "message",
    "handshake",
    "capability",
    "request_peers",
    "respond_peers",
    "timestamped_peer_info",
];

fn layout_of(record: &str) -> Option<String> {
    let layout = match record.to_lowercase().replace('-', "_").as_str() {
        "message" => describe::<Message>(),
        "handshake" => describe::<Handshake>(),
        "capability" => describe::<Capability>(),
        "request_peers" => describe::<RequestPeers>(),
        "respond_peers" => describe::<RespondPeers>(),
        "timestamped_peer_info" => describe::<TimestampedPeerInfo>(),
        _ => return None,
    };
    Some(layout)
}

fn format_peer(peer: &TimestampedPeerInfo) -> String {
    let seen = peer
        .last_seen()
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| format!("@{}", peer.timestamp));
    format!("{} {}", peer.address().cyan(), seen.dimmed())
}

/// Formats bytes as human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.2} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.2} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

/// Parses a byte argument: inline hex (optionally `0x`-prefixed) or @file
/// holding raw bytes.
fn parse_bytes_arg(arg: &str) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if let Some(path) = arg.strip_prefix('@') {
        Ok(std::fs::read(path)?)
    } else {
        let hex: String = arg.split_whitespace().collect();
        Ok(hex::decode(hex.strip_prefix("0x").unwrap_or(&hex))?)
    }
}

/// Parses a JSON argument (either inline JSON or @file.json).
fn parse_json_arg(arg: &str) -> Result<Value, Box<dyn std::error::Error>> {
    if let Some(path) = arg.strip_prefix('@') {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    } else {
        Ok(serde_json::from_str(arg)?)
    }
}

/// Formats JSON for display.
fn format_json(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
