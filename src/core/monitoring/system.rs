//! Host metrics collected from `/proc`, `df` and `ps`.
//!
//! Every parser takes the raw text output so it can be tested without touching the host.

use super::run_command;
use crate::{
    core::format::percent_of,
    errors::{Error, Result},
};
use std::time::Duration;
use tracing::warn;

const CPU_SAMPLE_INTERVAL: Duration = Duration::from_millis(250);

/// Memory usage from `/proc/meminfo`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStats {
    /// Total physical memory
    pub total_bytes: u64,
    /// Memory available for new work (`MemAvailable`)
    pub available_bytes: u64,
}

impl MemoryStats {
    /// Bytes in use.
    #[must_use]
    pub const fn used_bytes(&self) -> u64 {
        self.total_bytes.saturating_sub(self.available_bytes)
    }

    /// Share of memory in use.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn used_percent(&self) -> f64 {
        percent_of(self.used_bytes() as f64, self.total_bytes as f64)
    }
}

/// Load averages from `/proc/loadavg`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadAverage {
    /// 1 minute average
    pub one: f64,
    /// 5 minute average
    pub five: f64,
    /// 15 minute average
    pub fifteen: f64,
}

/// Aggregate CPU jiffies from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuTimes {
    /// Idle plus iowait
    pub idle: u64,
    /// Sum of all columns
    pub total: u64,
}

/// Disk usage of one mount from `df -P`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskStats {
    /// Device or filesystem name
    pub filesystem: String,
    /// Mount point
    pub mount: String,
    /// Size in bytes
    pub total_bytes: u64,
    /// Used bytes
    pub used_bytes: u64,
    /// Bytes available to unprivileged users
    pub available_bytes: u64,
}

impl DiskStats {
    /// Usage the way `df` reports it: used / (used + available).
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn used_percent(&self) -> f64 {
        percent_of(
            self.used_bytes as f64,
            (self.used_bytes + self.available_bytes) as f64,
        )
    }
}

/// One row of `ps` output.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessUsage {
    /// Executable name
    pub command: String,
    /// CPU share
    pub cpu_percent: f64,
    /// Memory share
    pub mem_percent: f64,
}

/// Point-in-time view of the host.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot {
    /// CPU usage over the sampling interval
    pub cpu_percent: f64,
    /// Memory usage
    pub memory: MemoryStats,
    /// Disk usage of the configured mount
    pub disk: DiskStats,
    /// Load averages
    pub load: LoadAverage,
    /// Seconds since boot
    pub uptime_secs: u64,
    /// Busiest processes, highest CPU first
    pub top_processes: Vec<ProcessUsage>,
}

fn collector_error(message: impl Into<String>) -> Error {
    Error::Collector {
        message: message.into(),
    }
}

fn parse_kib_line(value: &str) -> Option<u64> {
    let mut parts = value.split_whitespace();
    let amount: u64 = parts.next()?.parse().ok()?;
    match parts.next() {
        Some("kB") | None => Some(amount * 1024),
        Some(_) => Some(amount),
    }
}

/// Parses `/proc/meminfo`.
pub fn parse_meminfo(contents: &str) -> Result<MemoryStats> {
    let mut total = None;
    let mut available = None;
    let mut free = None;

    for line in contents.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        match key.trim() {
            "MemTotal" => total = parse_kib_line(value),
            "MemAvailable" => available = parse_kib_line(value),
            "MemFree" => free = parse_kib_line(value),
            _ => {}
        }
    }

    let total_bytes = total.ok_or_else(|| collector_error("MemTotal missing from meminfo"))?;
    // Kernels before 3.14 have no MemAvailable
    let available_bytes = available
        .or(free)
        .ok_or_else(|| collector_error("MemAvailable missing from meminfo"))?;

    Ok(MemoryStats {
        total_bytes,
        available_bytes,
    })
}

/// Parses `/proc/loadavg`.
pub fn parse_loadavg(contents: &str) -> Result<LoadAverage> {
    let values: Vec<f64> = contents
        .split_whitespace()
        .take(3)
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| collector_error(format!("Invalid loadavg: {e}")))?;

    match values.as_slice() {
        [one, five, fifteen] => Ok(LoadAverage {
            one: *one,
            five: *five,
            fifteen: *fifteen,
        }),
        _ => Err(collector_error("loadavg has fewer than three fields")),
    }
}

/// Parses `/proc/uptime` into whole seconds.
pub fn parse_uptime(contents: &str) -> Result<u64> {
    let secs: f64 = contents
        .split_whitespace()
        .next()
        .ok_or_else(|| collector_error("uptime is empty"))?
        .parse()
        .map_err(|e| collector_error(format!("Invalid uptime: {e}")))?;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Ok(secs.max(0.0) as u64)
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
pub fn parse_cpu_times(contents: &str) -> Result<CpuTimes> {
    let line = contents
        .lines()
        .find(|l| l.starts_with("cpu "))
        .ok_or_else(|| collector_error("No aggregate cpu line in /proc/stat"))?;

    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| collector_error(format!("Invalid /proc/stat: {e}")))?;

    if values.len() < 4 {
        return Err(collector_error("cpu line has fewer than four columns"));
    }

    // user nice system idle iowait irq softirq steal guest guest_nice;
    // guest time is already counted in user/nice
    let counted = &values[..values.len().min(8)];
    let idle = values[3] + values.get(4).copied().unwrap_or(0);
    Ok(CpuTimes {
        idle,
        total: counted.iter().sum(),
    })
}

/// CPU usage between two `/proc/stat` samples.
#[must_use]
pub fn cpu_usage_between(before: CpuTimes, after: CpuTimes) -> f64 {
    let total = after.total.saturating_sub(before.total);
    let idle = after.idle.saturating_sub(before.idle);
    if total == 0 {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let busy = (total.saturating_sub(idle)) as f64 / total as f64;
    busy * 100.0
}

/// Parses `df -P -k <path>` output (POSIX format, 1024-byte blocks).
pub fn parse_df(output: &str) -> Result<DiskStats> {
    let line = output
        .lines()
        .skip(1)
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| collector_error("df printed no filesystem row"))?;

    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < 6 {
        return Err(collector_error(format!("Unexpected df row: {line}")));
    }

    let blocks = |index: usize| -> Result<u64> {
        fields[index]
            .parse::<u64>()
            .map(|kib| kib * 1024)
            .map_err(|e| collector_error(format!("Invalid df column '{}': {e}", fields[index])))
    };

    Ok(DiskStats {
        filesystem: fields[0].to_string(),
        total_bytes: blocks(1)?,
        used_bytes: blocks(2)?,
        available_bytes: blocks(3)?,
        // Mount points may contain spaces
        mount: fields[5..].join(" "),
    })
}

/// Parses `ps -eo comm,%cpu,%mem` output. Unparseable rows are skipped.
#[must_use]
pub fn parse_ps(output: &str) -> Vec<ProcessUsage> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| {
            let mut fields: Vec<&str> = line.split_whitespace().collect();
            let mem_percent = fields.pop()?.parse().ok()?;
            let cpu_percent = fields.pop()?.parse().ok()?;
            if fields.is_empty() {
                return None;
            }
            Some(ProcessUsage {
                command: fields.join(" "),
                cpu_percent,
                mem_percent,
            })
        })
        .collect()
}

async fn read_proc(path: &str) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| collector_error(format!("Failed to read {path}: {e}")))
}

/// Busiest processes by CPU.
pub async fn top_processes(limit: usize) -> Result<Vec<ProcessUsage>> {
    let output = run_command("ps", &["-eo", "comm,%cpu,%mem", "--sort=-%cpu"]).await?;
    let mut processes = parse_ps(&output);
    processes.truncate(limit);
    Ok(processes)
}

/// Collects a full host snapshot.
///
/// CPU usage is measured over a short sampling interval. A failing `ps` only empties
/// the process list; every other failure aborts the snapshot.
pub async fn collect_snapshot(disk_path: &str) -> Result<SystemSnapshot> {
    let before = parse_cpu_times(&read_proc("/proc/stat").await?)?;
    tokio::time::sleep(CPU_SAMPLE_INTERVAL).await;
    let after = parse_cpu_times(&read_proc("/proc/stat").await?)?;

    let memory = parse_meminfo(&read_proc("/proc/meminfo").await?)?;
    let load = parse_loadavg(&read_proc("/proc/loadavg").await?)?;
    let uptime_secs = parse_uptime(&read_proc("/proc/uptime").await?)?;
    let disk = parse_df(&run_command("df", &["-P", "-k", disk_path]).await?)?;

    let top_processes = top_processes(5).await.unwrap_or_else(|e| {
        warn!("Could not list processes: {e}");
        Vec::new()
    });

    Ok(SystemSnapshot {
        cpu_percent: cpu_usage_between(before, after),
        memory,
        disk,
        load,
        uptime_secs,
        top_processes,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;

    const MEMINFO: &str = "MemTotal:       16000000 kB\n\
                           MemFree:         2000000 kB\n\
                           MemAvailable:    4000000 kB\n\
                           Buffers:          100000 kB\n";

    #[test]
    fn test_parse_meminfo() {
        let stats = parse_meminfo(MEMINFO).unwrap();
        assert_eq!(stats.total_bytes, 16_000_000 * 1024);
        assert_eq!(stats.available_bytes, 4_000_000 * 1024);
        assert_eq!(stats.used_percent(), 75.0);
    }

    #[test]
    fn test_parse_meminfo_falls_back_to_memfree() {
        let stats = parse_meminfo("MemTotal: 1000 kB\nMemFree: 250 kB\n").unwrap();
        assert_eq!(stats.available_bytes, 250 * 1024);
    }

    #[test]
    fn test_parse_meminfo_missing_total() {
        assert!(matches!(
            parse_meminfo("MemFree: 1 kB\n"),
            Err(Error::Collector { .. })
        ));
    }

    #[test]
    fn test_parse_loadavg() {
        let load = parse_loadavg("0.52 0.58 1.59 1/1234 5678\n").unwrap();
        assert_eq!(load.one, 0.52);
        assert_eq!(load.fifteen, 1.59);
        assert!(parse_loadavg("0.1 0.2").is_err());
    }

    #[test]
    fn test_parse_uptime() {
        assert_eq!(parse_uptime("350735.47 234388.90\n").unwrap(), 350_735);
        assert!(parse_uptime("").is_err());
    }

    #[test]
    fn test_cpu_usage_between_samples() {
        let before = parse_cpu_times("cpu  100 0 100 700 100 0 0 0 0 0\ncpu0 1 2 3 4\n").unwrap();
        let after = parse_cpu_times("cpu  150 0 150 750 150 0 0 0 0 0\n").unwrap();
        assert_eq!(before.idle, 800);
        assert_eq!(before.total, 1000);
        // 200 jiffies elapsed, 100 of them idle/iowait
        assert_eq!(cpu_usage_between(before, after), 50.0);
        assert_eq!(cpu_usage_between(after, after), 0.0);
    }

    #[test]
    fn test_parse_df() {
        let output = "Filesystem     1024-blocks     Used Available Capacity Mounted on\n\
                      /dev/sda1          1000000   250000    750000      25% /mnt/my disk\n";
        let disk = parse_df(output).unwrap();
        assert_eq!(disk.filesystem, "/dev/sda1");
        assert_eq!(disk.mount, "/mnt/my disk");
        assert_eq!(disk.total_bytes, 1_000_000 * 1024);
        assert_eq!(disk.used_percent(), 25.0);
    }

    #[test]
    fn test_parse_df_rejects_garbage() {
        assert!(parse_df("Filesystem\n").is_err());
        assert!(parse_df("h\n/dev/x a b c 1% /\n").is_err());
    }

    #[test]
    fn test_parse_ps() {
        let output = "COMMAND         %CPU %MEM\n\
                      java            85.2 30.1\n\
                      Web Content      4.0  2.5\n\
                      broken line\n";
        let processes = parse_ps(output);
        assert_eq!(processes.len(), 2);
        assert_eq!(processes[0].command, "java");
        assert_eq!(processes[0].cpu_percent, 85.2);
        assert_eq!(processes[1].command, "Web Content");
    }
}
