//! Runtime Diagnostics
//!
//! Collects a host/process/runtime snapshot rendered under labelled sections
//! of the help and version output. Every call reads live counters; nothing is
//! cached between calls.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io;

use serde::Serialize;
use sysinfo::System;

use crate::build_info;

pub const PLATFORM: &str = "PLATFORM";
pub const RUNTIME: &str = "RUNTIME";
pub const MEM: &str = "MEM";

/// The fixed set of snapshot keys
pub const SNAPSHOT_KEYS: [&str; 3] = [PLATFORM, RUNTIME, MEM];

/// Source of the machine host name
pub type HostnameSource = fn() -> io::Result<OsString>;

/// Point-in-time mapping from category name to a formatted value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DiagnosticsSnapshot(BTreeMap<String, String>);

impl DiagnosticsSnapshot {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Entries ordered by key
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `KEY:\n  value` blocks separated by blank lines
    pub fn render_sections(&self) -> String {
        self.iter()
            .map(|(key, value)| format!("{}:\n  {}\n", key, value))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Gathers [`DiagnosticsSnapshot`]s from the running process
#[derive(Debug, Clone)]
pub struct DiagnosticsCollector {
    hostname: HostnameSource,
    runtime_version: String,
}

impl DiagnosticsCollector {
    pub fn new() -> Self {
        Self {
            hostname: hostname::get,
            runtime_version: build_info::rustc_version().to_string(),
        }
    }

    /// Replace the host name lookup
    pub fn with_hostname_source(mut self, source: HostnameSource) -> Self {
        self.hostname = source;
        self
    }

    /// Take a fresh snapshot.
    ///
    /// A host name that cannot be resolved (or is not valid UTF-8) becomes an
    /// empty string; the rest of the snapshot is still produced.
    pub fn collect(&self) -> DiagnosticsSnapshot {
        let host = match (self.hostname)() {
            Ok(name) => name.into_string().unwrap_or_default(),
            Err(e) => {
                log::debug!("hostname lookup failed: {}", e);
                String::new()
            }
        };

        let platform = format!(
            "Host: {} | OS: {} | Arch: {}",
            host,
            std::env::consts::OS,
            std::env::consts::ARCH
        );
        let runtime = format!(
            "Version: {} | CPUs: {}",
            self.runtime_version,
            cpu_count()
        );

        let memory = MemoryUsage::read();
        let mem = format!(
            "Resident: {} | Virtual: {} | System-Used: {} | System-Total: {}",
            format_bytes(memory.resident),
            format_bytes(memory.virtual_size),
            format_bytes(memory.system_used),
            format_bytes(memory.system_total)
        );

        let mut entries = BTreeMap::new();
        entries.insert(PLATFORM.to_string(), platform);
        entries.insert(RUNTIME.to_string(), runtime);
        entries.insert(MEM.to_string(), mem);
        DiagnosticsSnapshot(entries)
    }
}

impl Default for DiagnosticsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Memory counters in bytes; zero when a counter is unavailable
#[derive(Debug, Clone, Copy, Default)]
struct MemoryUsage {
    resident: u64,
    virtual_size: u64,
    system_used: u64,
    system_total: u64,
}

impl MemoryUsage {
    fn read() -> Self {
        let mut sys = System::new();
        sys.refresh_memory();

        let mut usage = Self {
            system_used: sys.used_memory(),
            system_total: sys.total_memory(),
            ..Self::default()
        };

        if let Ok(pid) = sysinfo::get_current_pid() {
            if sys.refresh_process(pid) {
                if let Some(process) = sys.process(pid) {
                    usage.resident = process.memory();
                    usage.virtual_size = process.virtual_memory();
                }
            }
        }
        usage
    }
}

fn cpu_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

/// Human-readable SI byte size, e.g. `82 MB` or `1.5 kB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 10 {
        return format!("{} B", bytes);
    }
    let exponent = ((bytes as f64).log10() / 3.0).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let value = bytes as f64 / 1000f64.powi(exponent as i32);
    // round to one decimal first so 9.96 kB prints as "10 kB"
    let rounded = (value * 10.0).round() / 10.0;
    if rounded < 10.0 {
        format!("{:.1} {}", rounded, UNITS[exponent])
    } else {
        format!("{:.0} {}", rounded, UNITS[exponent])
    }
}
