//! Network traffic sample.
//!
//! A fixed set of traffic rows, read once from a CSV file or, when the file
//! is missing or empty, taken from a built-in sample. The rows are served
//! page by page and summarised into simple counters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{NetguardError, Result};

/// Default page size
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// One traffic row; all fields are kept as CSV text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficRecord {
    /// Capture time
    pub timestamp: String,
    /// Source address
    pub source_ip: String,
    /// Destination address
    pub destination_ip: String,
    /// Application protocol (HTTP, HTTPS, FTP, SSH, ...)
    pub protocol: String,
    /// Destination port
    pub port: String,
    /// Packet size in bytes
    pub packet_size: String,
    /// `low`, `medium` or `high`
    pub threat_level: String,
    /// `allowed`, `blocked` or `investigating`
    pub status: String,
    /// Free-form description
    pub description: String,
}

impl TrafficRecord {
    fn set(&mut self, column: &str, value: String) {
        match column {
            "timestamp" => self.timestamp = value,
            "source_ip" => self.source_ip = value,
            "destination_ip" => self.destination_ip = value,
            "protocol" => self.protocol = value,
            "port" => self.port = value,
            "packet_size" => self.packet_size = value,
            "threat_level" => self.threat_level = value,
            "status" => self.status = value,
            "description" => self.description = value,
            _ => {},
        }
    }
}

/// Where the loaded rows came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficSource {
    /// Parsed from a CSV file
    Csv,
    /// Built-in sample rows
    Builtin,
}

/// One page of traffic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficPage {
    /// Rows on this page
    pub traffic: Vec<TrafficRecord>,
    /// Number of pages at this page size
    pub total_pages: usize,
    /// Page number served (1-based)
    pub current_page: usize,
    /// Total rows in the sample
    pub total_records: usize,
}

/// Per-protocol row counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolCounts {
    /// HTTP rows
    #[serde(rename = "HTTP")]
    pub http: usize,
    /// HTTPS rows
    #[serde(rename = "HTTPS")]
    pub https: usize,
    /// FTP rows
    #[serde(rename = "FTP")]
    pub ftp: usize,
    /// SSH rows
    #[serde(rename = "SSH")]
    pub ssh: usize,
}

/// Summary counters over the sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficStats {
    /// Total rows
    pub total_packets: usize,
    /// Rows with a threat level other than `low`
    pub suspicious: usize,
    /// Rows with status `blocked`
    pub blocked: usize,
    /// Rows per protocol
    pub protocols: ProtocolCounts,
}

/// Loaded traffic sample
#[derive(Debug, Clone)]
pub struct TrafficSample {
    records: Vec<TrafficRecord>,
    source: TrafficSource,
}

impl Default for TrafficSample {
    fn default() -> Self {
        Self::builtin()
    }
}

impl TrafficSample {
    /// Sample holding the built-in rows
    pub fn builtin() -> Self {
        Self {
            records: builtin_records(),
            source: TrafficSource::Builtin,
        }
    }

    /// Sample from already parsed rows
    pub fn from_records(records: Vec<TrafficRecord>) -> Self {
        Self {
            records,
            source: TrafficSource::Csv,
        }
    }

    /// Read a CSV file
    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            NetguardError::Traffic(format!("Failed to read {}: {e}", path.display()))
        })?;
        Ok(Self::from_records(parse_csv(&content)?))
    }

    /// Read a CSV file, falling back to the built-in rows
    pub fn load_or_builtin(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::from_csv_file(path) {
            Ok(sample) => {
                tracing::info!(
                    path = %path.display(),
                    records = sample.len(),
                    "Traffic CSV loaded"
                );
                sample
            },
            Err(e) => {
                tracing::warn!("{e}; using built-in traffic sample");
                Self::builtin()
            },
        }
    }

    /// Where the rows came from
    pub fn source(&self) -> TrafficSource {
        self.source
    }

    /// All rows
    pub fn records(&self) -> &[TrafficRecord] {
        &self.records
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the sample is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serve one page; zero values fall back to page 1 and the default size
    pub fn page(&self, page: usize, limit: usize) -> TrafficPage {
        let page = if page == 0 { 1 } else { page };
        let limit = if limit == 0 { DEFAULT_PAGE_SIZE } else { limit };

        let start = (page - 1).saturating_mul(limit);
        let traffic = self
            .records
            .iter()
            .skip(start)
            .take(limit)
            .cloned()
            .collect();

        TrafficPage {
            traffic,
            total_pages: self.records.len().div_ceil(limit),
            current_page: page,
            total_records: self.records.len(),
        }
    }

    /// Summary counters
    pub fn stats(&self) -> TrafficStats {
        let count = |protocol: &str| self.records.iter().filter(|r| r.protocol == protocol).count();

        TrafficStats {
            total_packets: self.records.len(),
            suspicious: self.records.iter().filter(|r| r.threat_level != "low").count(),
            blocked: self.records.iter().filter(|r| r.status == "blocked").count(),
            protocols: ProtocolCounts {
                http: count("HTTP"),
                https: count("HTTPS"),
                ftp: count("FTP"),
                ssh: count("SSH"),
            },
        }
    }
}

/// Parse comma-separated traffic rows
///
/// The first non-blank line names the columns. Cells are trimmed, missing
/// cells become empty strings, unknown columns are ignored. Quoting is not
/// supported.
pub fn parse_csv(content: &str) -> Result<Vec<TrafficRecord>> {
    let mut lines = content.lines().filter(|line| !line.trim().is_empty());

    let header = lines
        .next()
        .ok_or_else(|| NetguardError::Traffic("CSV has no header row".to_string()))?;
    let columns: Vec<&str> = header.split(',').map(str::trim).collect();

    Ok(lines
        .map(|line| {
            let mut values = line.split(',').map(str::trim);
            let mut record = TrafficRecord::default();
            for column in &columns {
                record.set(column, values.next().unwrap_or_default().to_string());
            }
            record
        })
        .collect())
}

#[allow(clippy::too_many_arguments)]
fn row(
    timestamp: &str,
    source_ip: &str,
    destination_ip: &str,
    protocol: &str,
    port: &str,
    packet_size: &str,
    threat_level: &str,
    status: &str,
    description: &str,
) -> TrafficRecord {
    TrafficRecord {
        timestamp: timestamp.to_string(),
        source_ip: source_ip.to_string(),
        destination_ip: destination_ip.to_string(),
        protocol: protocol.to_string(),
        port: port.to_string(),
        packet_size: packet_size.to_string(),
        threat_level: threat_level.to_string(),
        status: status.to_string(),
        description: description.to_string(),
    }
}

#[rustfmt::skip]
fn builtin_records() -> Vec<TrafficRecord> {
    vec![
        row("2024-01-15T08:30:00Z", "192.168.1.10", "8.8.8.8", "HTTPS", "443", "1500", "low", "allowed", "Normal web traffic"),
        row("2024-01-15T08:30:01Z", "192.168.1.15", "10.0.0.50", "SSH", "22", "800", "medium", "blocked", "Suspicious login attempt"),
        row("2024-01-15T08:30:02Z", "192.168.1.20", "192.168.1.1", "HTTP", "80", "1200", "low", "allowed", "Internal web request"),
        row("2024-01-15T08:30:03Z", "192.168.1.100", "10.0.0.25", "FTP", "21", "600", "high", "blocked", "Brute force attempt"),
        row("2024-01-15T08:30:04Z", "192.168.1.30", "1.1.1.1", "HTTPS", "443", "1400", "low", "allowed", "DNS over HTTPS"),
        row("2024-01-15T08:30:05Z", "192.168.1.200", "10.0.0.100", "SSH", "22", "900", "high", "blocked", "Port scanning"),
        row("2024-01-15T08:30:06Z", "192.168.1.25", "8.8.4.4", "HTTP", "80", "1100", "low", "allowed", "Normal web traffic"),
        row("2024-01-15T08:30:07Z", "192.168.1.150", "10.0.0.75", "FTP", "21", "750", "medium", "investigating", "Multiple failed logins"),
        row("2024-01-15T08:30:08Z", "192.168.1.45", "10.0.0.200", "HTTP", "8080", "2000", "low", "allowed", "API request"),
        row("2024-01-15T08:30:09Z", "203.0.113.15", "10.0.0.50", "SSH", "22", "850", "high", "blocked", "Known malicious IP"),
    ]
}
