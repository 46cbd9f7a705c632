//! Object kinds and status values of the sensor tree.

use serde::Serialize;
use std::fmt;

/// Raw status code PRTG reports for objects paused by a user.
pub const PAUSED_STATUS_RAW: &str = "7";

/// Raw status placeholder after a resume, until the server is asked again.
pub const UNKNOWN_STATUS_RAW: &str = "?";

/// The kind of an object in the sensor tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum NodeKind {
    /// The synthetic object the client was rooted at.
    Root,
    Probe,
    Group,
    Device,
    Sensor,
    Channel,
}

impl NodeKind {
    /// Element name of this kind in a sensor tree document.
    pub fn tag(&self) -> Option<&'static str> {
        match self {
            NodeKind::Probe => Some("probenode"),
            NodeKind::Group => Some("group"),
            NodeKind::Device => Some("device"),
            NodeKind::Sensor => Some("sensor"),
            NodeKind::Root | NodeKind::Channel => None,
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::Root => "Root",
            NodeKind::Probe => "Probe",
            NodeKind::Group => "Group",
            NodeKind::Device => "Device",
            NodeKind::Sensor => "Sensor",
            NodeKind::Channel => "Channel",
        };
        f.write_str(name)
    }
}

/// Status text of an object as PRTG reports it.
///
/// The common states get their own variant; anything else (e.g.
/// `Paused (paused by parent)`, `Down (Acknowledged)`) is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Status {
    Up,
    Down,
    Warning,
    Paused,
    Unusual,
    /// Not reported yet, or not known since the last resume.
    #[default]
    Unknown,
    Other(String),
}

impl Status {
    /// Maps a status text to a variant.
    pub fn from_text(text: &str) -> Self {
        match text.trim() {
            "Up" => Status::Up,
            "Down" => Status::Down,
            "Warning" => Status::Warning,
            "Paused" => Status::Paused,
            "Unusual" => Status::Unusual,
            "" | "?" | "Unknown" => Status::Unknown,
            other => Status::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Up => "Up",
            Status::Down => "Down",
            Status::Warning => "Warning",
            Status::Paused => "Paused",
            Status::Unusual => "Unusual",
            Status::Unknown => "Unknown",
            Status::Other(text) => text,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
