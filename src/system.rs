//! CPU summary shown by `rusty-split cpu-info`.

use std::fmt;

/// Pre-queried CPU counters. Any field may be unknown.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuSummary {
    pub model: Option<String>,
    pub logical_cores: Option<usize>,
    pub physical_cores: Option<usize>,
}

impl CpuSummary {
    /// Best-effort detection for the current machine.
    ///
    /// Core counts come from `num_cpus` on every platform. The model name is
    /// read from `/proc/cpuinfo` and stays unknown off Linux.
    pub fn detect() -> Self {
        let model = match std::fs::read_to_string("/proc/cpuinfo") {
            Ok(text) => model_name(&text),
            Err(e) => {
                log::debug!("/proc/cpuinfo unavailable: {e}");
                None
            }
        };
        CpuSummary {
            model,
            logical_cores: Some(num_cpus::get()),
            physical_cores: Some(num_cpus::get_physical()),
        }
    }
}

impl fmt::Display for CpuSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn count(n: Option<usize>) -> String {
            n.map_or_else(|| "unknown".to_string(), |n| n.to_string())
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:25} {}",
            "CPU Model:",
            self.model.as_deref().unwrap_or("Unknown CPU")
        )?;
        writeln!(f, "{:25} {}", "Logical cores (threads):", count(self.logical_cores))?;
        writeln!(f, "{:25} {}", "Physical cores:", count(self.physical_cores))
    }
}

/// First `model name` entry of a `/proc/cpuinfo` dump.
fn model_name(cpuinfo: &str) -> Option<String> {
    cpuinfo.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        (key.trim() == "model name").then(|| value.trim().to_string())
    })
}
