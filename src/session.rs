/// Feed retrieval session
///
/// Drives the two protocol phases over blocking TCP: a bulk stream of every
/// packet the server has, then one targeted resend request per missing
/// sequence. One connection per phase attempt; the socket never outlives the
/// attempt that opened it.
///
/// Retry policy differs by phase. The stream phase is bounded by
/// `max_stream_retries` and exhausting it fails the whole session. The
/// gap-fill phase is bounded per sequence by `max_resend_retries`; a
/// sequence that exhausts its attempts is reported as unrecovered and the
/// session still completes.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::thread;

use log::{debug, error, info, warn};
use thiserror::Error;

use crate::codec::{CodecError, WireCodec};
use crate::config::FeedConfig;
use crate::protocol::{Packet, PACKET_SIZE};
use crate::stats::FeedStats;
use crate::tracker::{SequenceTracker, SEQUENCE_FLOOR};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("connect to {addr} failed: {source}")]
    Connection { addr: String, source: io::Error },

    #[error("request send failed: {0}")]
    Send(io::Error),

    #[error("no data within the receive window")]
    Timeout,

    #[error("receive failed: {0}")]
    Receive(io::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error("stream phase abandoned after {attempts} attempts")]
    StreamExhausted {
        attempts: u32,
        #[source]
        source: Box<SessionError>,
    },
}

pub type SessionResult<T> = Result<T, SessionError>;

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

pub struct FeedSession {
    config: FeedConfig,
    tracker: SequenceTracker,
    packets: Vec<Packet>,
    unrecovered: Vec<u32>,
    stats: FeedStats,
}

impl FeedSession {
    pub fn new(config: FeedConfig) -> Self {
        FeedSession {
            config,
            tracker: SequenceTracker::new(),
            packets: Vec::new(),
            unrecovered: Vec::new(),
            stats: FeedStats::new(),
        }
    }

    /// Run the full retrieval: bulk stream, gap fill, final ordering.
    ///
    /// Only a stream phase that exhausts its retry bound fails the session;
    /// unrecovered sequences from the gap-fill phase are available through
    /// [`unrecovered_sequences`](Self::unrecovered_sequences) afterwards.
    pub fn run(&mut self) -> SessionResult<()> {
        self.stats.start();

        self.request_all_packets()?;
        self.handle_missing_sequences();

        self.packets.sort_by_key(|pkt| pkt.sequence);
        info!(
            "session complete: {} packets, {} unrecovered sequences",
            self.packets.len(),
            self.unrecovered.len()
        );
        Ok(())
    }

    /// Packets received so far, sorted by sequence once `run` has finished.
    pub fn packets(&self) -> &[Packet] {
        &self.packets
    }

    /// Missing sequences the gap-fill phase gave up on.
    pub fn unrecovered_sequences(&self) -> &[u32] {
        &self.unrecovered
    }

    pub fn stats(&self) -> &FeedStats {
        &self.stats
    }

    /// Consume the session and yield the packet collection in ascending
    /// sequence order.
    pub fn into_packets(mut self) -> Vec<Packet> {
        self.packets.sort_by_key(|pkt| pkt.sequence);
        self.packets
    }

    // ---- stream-all phase ----

    /// Request the full packet stream, retrying failed attempts up to the
    /// configured bound. Exhausting the bound is fatal for the session.
    pub fn request_all_packets(&mut self) -> SessionResult<()> {
        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.stream_attempt() {
                Ok(()) => {
                    info!(
                        "stream complete after {} attempt(s): {} packets",
                        attempts,
                        self.packets.len()
                    );
                    return Ok(());
                }
                Err(err) => {
                    if attempts >= self.config.max_stream_retries {
                        error!("stream phase giving up after {attempts} attempts: {err}");
                        return Err(SessionError::StreamExhausted {
                            attempts,
                            source: Box::new(err),
                        });
                    }
                    warn!(
                        "stream attempt {attempts} failed: {err}; retrying in {:?}",
                        self.config.retry_delay
                    );
                    self.stats.record_stream_retry();
                    thread::sleep(self.config.retry_delay);
                }
            }
        }
    }

    fn stream_attempt(&mut self) -> SessionResult<()> {
        let mut stream = self.connect()?;
        let result = self.run_stream(&mut stream);
        self.disconnect(&stream);
        result
    }

    fn run_stream(&mut self, stream: &mut TcpStream) -> SessionResult<()> {
        stream
            .write_all(&WireCodec::encode_stream_all())
            .map_err(SessionError::Send)?;

        let mut chunk = vec![0u8; self.config.buffer_size];
        // Carryover buffer: a frame split across two reads is reassembled
        // here instead of dropped.
        let mut pending: Vec<u8> = Vec::with_capacity(self.config.buffer_size + PACKET_SIZE);

        loop {
            match stream.read(&mut chunk) {
                // Peer closing the connection ends the stream.
                Ok(0) => break,
                Ok(n) => {
                    self.stats.add_bytes(n as u64);
                    pending.extend_from_slice(&chunk[..n]);
                    let consumed = self.ingest_frames(&pending)?;
                    pending.drain(..consumed);
                }
                Err(ref err) if is_timeout(err) => return Err(SessionError::Timeout),
                Err(err) => return Err(SessionError::Receive(err)),
            }
        }

        if !pending.is_empty() {
            warn!(
                "stream ended mid-frame; discarding {} trailing bytes",
                pending.len()
            );
        }
        Ok(())
    }

    /// Decode and record every complete frame in `bytes`; returns how many
    /// bytes were consumed. The remainder is a partial frame the caller
    /// keeps for the next read.
    fn ingest_frames(&mut self, bytes: &[u8]) -> SessionResult<usize> {
        let mut offset = 0;
        while bytes.len() - offset >= PACKET_SIZE {
            let packet = WireCodec::decode_packet(&bytes[offset..offset + PACKET_SIZE])?;
            self.record(packet);
            offset += PACKET_SIZE;
        }
        Ok(offset)
    }

    fn record(&mut self, packet: Packet) {
        if !self.tracker.record(packet.sequence) {
            debug!("duplicate sequence {}, dropping frame", packet.sequence);
            return;
        }
        debug!(
            "packet seq={} symbol={} side={} qty={} price={}",
            packet.sequence,
            packet.symbol_lossy(),
            packet.side as char,
            packet.quantity,
            packet.price
        );
        self.packets.push(packet);
        self.stats.record_packet();
    }

    // ---- gap-fill phase ----

    /// Re-request every missing sequence individually. Never fails the
    /// session: sequences that exhaust their attempts (or cannot be encoded
    /// at all) are collected as unrecovered.
    pub fn handle_missing_sequences(&mut self) {
        if self.tracker.is_empty() {
            info!("no packets received; nothing to recover");
            return;
        }

        let missing = self.tracker.missing(SEQUENCE_FLOOR);
        if missing.is_empty() {
            info!("no sequence gaps detected");
            return;
        }

        info!("{} missing sequence(s) to recover", missing.len());
        self.stats.record_gaps_detected(missing.len() as u32);

        for sequence in missing {
            match self.fetch_sequence(sequence) {
                Ok(()) => self.stats.record_gap_recovered(),
                Err(err) => {
                    warn!("sequence {sequence} unrecoverable: {err}");
                    self.stats.record_gap_unrecovered();
                    self.unrecovered.push(sequence);
                }
            }
        }
    }

    fn fetch_sequence(&mut self, sequence: u32) -> SessionResult<()> {
        // Sequences above the one-byte wire limit cannot be requested.
        let request = WireCodec::encode_resend(sequence)?;

        let mut attempts = 0u32;
        loop {
            attempts += 1;
            match self.resend_attempt(&request) {
                Ok(()) => {
                    info!("recovered sequence {sequence}");
                    return Ok(());
                }
                Err(err) => {
                    if attempts >= self.config.max_resend_retries {
                        return Err(err);
                    }
                    warn!("resend of sequence {sequence} failed (attempt {attempts}): {err}");
                    thread::sleep(self.config.retry_delay);
                }
            }
        }
    }

    fn resend_attempt(&mut self, request: &[u8]) -> SessionResult<()> {
        let mut stream = self.connect()?;
        let result = self.run_resend(&mut stream, request);
        self.disconnect(&stream);
        result
    }

    fn run_resend(&mut self, stream: &mut TcpStream, request: &[u8]) -> SessionResult<()> {
        stream.write_all(request).map_err(SessionError::Send)?;

        // Exactly one frame is expected per resend response, in one read.
        let mut buf = vec![0u8; self.config.buffer_size];
        let received = match stream.read(&mut buf) {
            Ok(n) => n,
            Err(ref err) if is_timeout(err) => return Err(SessionError::Timeout),
            Err(err) => return Err(SessionError::Receive(err)),
        };

        self.stats.add_bytes(received as u64);
        let packet = WireCodec::decode_packet(&buf[..received])?;
        self.record(packet);
        Ok(())
    }

    // ---- connection lifecycle ----

    fn connect(&self) -> SessionResult<TcpStream> {
        let addr = self.config.server_addr();
        let stream = TcpStream::connect(&addr).map_err(|source| SessionError::Connection {
            addr: addr.clone(),
            source,
        })?;
        stream
            .set_read_timeout(Some(self.config.read_timeout))
            .map_err(|source| SessionError::Connection { addr, source })?;
        debug!("connected to {}", self.config.server_addr());
        Ok(stream)
    }

    fn disconnect(&self, stream: &TcpStream) {
        // Shutting down an already-closed socket is a no-op.
        let _ = stream.shutdown(Shutdown::Both);
        debug!("disconnected from {}", self.config.server_addr());
    }
}
