//! Data models shared by the job, health and presentation layers
//!
//! Covers the selected video feeds, the canonical per-direction result and the
//! statistics summary served by the backend.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants::job;

/// Descriptor of one selected video feed
///
/// The job core only counts these; `source` is read by the HTTP transport when
/// the upload is sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    /// File name sent with the multipart part
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type sent with the multipart part
    pub mime_type: String,
    /// Where the bytes live on disk, if anywhere
    pub source: Option<PathBuf>,
}

impl VideoFile {
    /// Create a descriptor without a backing file
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            source: None,
        }
    }

    /// Build a descriptor from a file on disk
    ///
    /// The MIME type is derived from the extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            mime_type: mime_for_name(&name).to_string(),
            name,
            size: metadata.len(),
            source: Some(path.to_path_buf()),
        })
    }

    /// Whether the extension and MIME type look like a video
    pub fn looks_like_video(&self) -> bool {
        let extension_ok = extension(&self.name)
            .map(|ext| job::VIDEO_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        extension_ok && self.mime_type.starts_with(job::VIDEO_MIME_PREFIX)
    }
}

fn extension(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
}

/// MIME type for a file name, falling back to an opaque byte stream
pub fn mime_for_name(name: &str) -> &'static str {
    match extension(name).as_deref() {
        Some("mp4") => "video/mp4",
        Some("avi") => "video/x-msvideo",
        Some("mov") => "video/quicktime",
        Some("mkv") => "video/x-matroska",
        Some("webm") => "video/webm",
        Some("flv") => "video/x-flv",
        Some("wmv") => "video/x-ms-wmv",
        _ => "application/octet-stream",
    }
}

/// One approach of the junction
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// All approaches in display order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Field name used by the backend payload
    pub fn key(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::South => "south",
            Direction::East => "east",
            Direction::West => "west",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::North => "North",
            Direction::South => "South",
            Direction::East => "East",
            Direction::West => "West",
        };
        f.pad(label)
    }
}

/// Recommended next action supplied by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub direction: String,
    pub timer_seconds: u32,
    pub reason: String,
}

/// Canonical result of a completed job
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedResult {
    /// Green time in seconds for each approach
    pub per_direction: BTreeMap<Direction, u32>,
    /// Present only when the backend supplied one
    pub recommendation: Option<Recommendation>,
}

impl NormalizedResult {
    /// Green time for one approach
    pub fn seconds(&self, direction: Direction) -> u32 {
        self.per_direction.get(&direction).copied().unwrap_or(0)
    }

    /// Full cycle length across all approaches
    pub fn cycle_seconds(&self) -> u32 {
        self.per_direction.values().sum()
    }
}

/// Summary served by `GET /stats`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsSummary {
    pub results: RunSummary,
    pub analytics: AnalyticsSummary,
    pub recent: Vec<RecentRun>,
}

/// Aggregate over past optimizer runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSummary {
    pub total_runs: u64,
    pub avg_delay: f64,
    pub avg_elapsed: f64,
}

/// Aggregate over processed traffic
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsSummary {
    pub total_cars_processed: u64,
    pub success_rate: f64,
    pub total_optimizations: u64,
}

/// One recent run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecentRun {
    pub delay: f64,
    pub total_cars: u64,
    /// Vehicle count per approach, in north/south/west/east order
    pub cars: Vec<u64>,
}
