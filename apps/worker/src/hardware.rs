// [apps/worker/src/hardware.rs]
//! Live resource probing for `/info`'s `*_available` fields. Reads
//! `/proc/loadavg` and `/proc/meminfo` the way the teacher's
//! `cpu_manager.rs` samples host load, falling back to a heuristic when
//! the `/proc` filesystem is unavailable (non-Linux hosts, containers
//! without procfs mounted).
use std::fs;

pub struct LoadSample {
    pub cpus_available: f64,
    pub memory_available_bytes: u64,
}

pub fn sample_current_load(cpus_total: f64, memory_total_bytes: u64) -> LoadSample {
    let cpus_available = read_loadavg()
        .map(|load1| (cpus_total - load1).max(0.0))
        .unwrap_or(cpus_total * 0.75);

    let memory_available_bytes = read_meminfo_available()
        .unwrap_or((memory_total_bytes as f64 * 0.6) as u64);

    LoadSample {
        cpus_available,
        memory_available_bytes,
    }
}

fn read_loadavg() -> Option<f64> {
    let contents = fs::read_to_string("/proc/loadavg").ok()?;
    contents.split_whitespace().next()?.parse::<f64>().ok()
}

fn read_meminfo_available() -> Option<u64> {
    let contents = fs::read_to_string("/proc/meminfo").ok()?;
    for line in contents.lines() {
        if let Some(rest) = line.strip_prefix("MemAvailable:") {
            let kb: u64 = rest.trim().trim_end_matches(" kB").trim().parse().ok()?;
            return Some(kb * 1024);
        }
    }
    None
}

pub fn total_memory_bytes() -> u64 {
    fs::read_to_string("/proc/meminfo")
        .ok()
        .and_then(|contents| {
            contents.lines().find_map(|line| {
                line.strip_prefix("MemTotal:").and_then(|rest| {
                    rest.trim()
                        .trim_end_matches(" kB")
                        .trim()
                        .parse::<u64>()
                        .ok()
                        .map(|kb| kb * 1024)
                })
            })
        })
        .unwrap_or(8 * 1024 * 1024 * 1024)
}
