/// Session statistics
///
/// Counters for one retrieval: packets, bytes, retries, gap outcomes.

use std::time::{Duration, Instant};

use log::info;

#[derive(Debug, Clone, Default)]
pub struct FeedStats {
    start_time: Option<Instant>,
    packets_received: u64,
    bytes_received: u64,
    stream_retries: u32,
    gaps_detected: u32,
    gaps_recovered: u32,
    gaps_unrecovered: u32,
}

impl FeedStats {
    pub fn new() -> Self {
        FeedStats::default()
    }

    /// Mark the start of the session for elapsed/throughput accounting.
    pub fn start(&mut self) {
        if self.start_time.is_none() {
            self.start_time = Some(Instant::now());
        }
    }

    pub fn record_packet(&mut self) {
        self.packets_received += 1;
    }

    pub fn add_bytes(&mut self, bytes: u64) {
        self.bytes_received += bytes;
    }

    pub fn record_stream_retry(&mut self) {
        self.stream_retries += 1;
    }

    pub fn record_gaps_detected(&mut self, count: u32) {
        self.gaps_detected += count;
    }

    pub fn record_gap_recovered(&mut self) {
        self.gaps_recovered += 1;
    }

    pub fn record_gap_unrecovered(&mut self) {
        self.gaps_unrecovered += 1;
    }

    pub fn packets_received(&self) -> u64 {
        self.packets_received
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    pub fn stream_retries(&self) -> u32 {
        self.stream_retries
    }

    pub fn gaps_detected(&self) -> u32 {
        self.gaps_detected
    }

    pub fn gaps_recovered(&self) -> u32 {
        self.gaps_recovered
    }

    pub fn gaps_unrecovered(&self) -> u32 {
        self.gaps_unrecovered
    }

    pub fn elapsed(&self) -> Option<Duration> {
        self.start_time.map(|start| start.elapsed())
    }

    pub fn packets_per_sec(&self) -> f64 {
        match self.start_time {
            None => 0.0,
            Some(start) => {
                let elapsed = start.elapsed().as_secs_f64();
                if elapsed > 0.0 {
                    self.packets_received as f64 / elapsed
                } else {
                    0.0
                }
            }
        }
    }

    pub fn log_summary(&self) {
        info!(
            "summary: {} packets ({} bytes) in {:?}, {:.1} packets/sec",
            self.packets_received,
            self.bytes_received,
            self.elapsed().unwrap_or_default(),
            self.packets_per_sec()
        );
        info!(
            "summary: {} stream retries, gaps: {} detected / {} recovered / {} unrecovered",
            self.stream_retries, self.gaps_detected, self.gaps_recovered, self.gaps_unrecovered
        );
    }
}
