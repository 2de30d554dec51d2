/// JSON persistence of the final packet collection
///
/// One object per packet, field names matching the consumer-facing document
/// format. Export failure never invalidates the retrieval itself; callers
/// log it and move on.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::info;
use serde_json::json;
use thiserror::Error;

use crate::protocol::Packet;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to write packet document to {path}: {source}")]
    Write { path: String, source: io::Error },

    #[error("failed to serialize packet document: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub fn write_packets_json(path: &Path, packets: &[Packet]) -> Result<(), ExportError> {
    let document: Vec<serde_json::Value> = packets.iter().map(packet_to_json).collect();

    let file = File::create(path).map_err(|source| ExportError::Write {
        path: path.display().to_string(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writer.flush().map_err(|source| ExportError::Write {
        path: path.display().to_string(),
        source,
    })?;

    info!("wrote {} packets to {}", packets.len(), path.display());
    Ok(())
}

fn packet_to_json(packet: &Packet) -> serde_json::Value {
    json!({
        "symbol": packet.symbol_lossy(),
        "buySellIndicator": (packet.side as char).to_string(),
        "quantity": packet.quantity,
        "price": packet.price,
        "packetSequence": packet.sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn packet(sequence: u32) -> Packet {
        Packet {
            symbol: *b"AAPL",
            side: b'S',
            quantity: 10,
            price: 250,
            sequence,
        }
    }

    #[test]
    fn test_round_trip_fields() {
        let file = NamedTempFile::new().unwrap();
        write_packets_json(file.path(), &[packet(1), packet(2)]).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        let records = parsed.as_array().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["symbol"], "AAPL");
        assert_eq!(records[0]["buySellIndicator"], "S");
        assert_eq!(records[0]["quantity"], 10);
        assert_eq!(records[0]["price"], 250);
        assert_eq!(records[0]["packetSequence"], 1);
        assert_eq!(records[1]["packetSequence"], 2);
    }

    #[test]
    fn test_empty_collection_writes_empty_array() {
        let file = NamedTempFile::new().unwrap();
        write_packets_json(file.path(), &[]).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed.as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_unwritable_path_is_reported() {
        let result = write_packets_json(Path::new("/nonexistent-dir/out.json"), &[packet(1)]);
        assert!(matches!(result, Err(ExportError::Write { .. })));
    }
}
