//! Compute device selection for inference.

use std::fmt;
use std::str::FromStr;

use crate::error::LayoutError;

/// Device a detector session is bound to.
///
/// Each folder worker binds its own session to the configured device; the
/// device choice itself is shared read-only configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Device {
    /// CPU execution provider.
    #[default]
    Cpu,
    /// CUDA execution provider on the given device index, with CPU
    /// fallback.
    Cuda(u32),
}

impl FromStr for Device {
    type Err = LayoutError;

    /// Parses `"cpu"`, `"cuda"` or `"cuda:<index>"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        if s == "cpu" {
            return Ok(Self::Cpu);
        }
        if s == "cuda" {
            return Ok(Self::Cuda(0));
        }
        if let Some(index) = s.strip_prefix("cuda:") {
            let index = index
                .parse::<u32>()
                .map_err(|_| LayoutError::Device(format!("bad CUDA index in '{s}'")))?;
            return Ok(Self::Cuda(index));
        }
        Err(LayoutError::Device(format!(
            "'{s}' (expected 'cpu', 'cuda' or 'cuda:<index>')"
        )))
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Cuda(index) => write!(f, "cuda:{index}"),
        }
    }
}
