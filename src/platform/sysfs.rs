//! Linux sysfs readers for topology, caches, board identity and RAPL energy.
//!
//! Every reader takes its root directory so tests can point it at a fake tree. A
//! missing or unreadable file is an absent fact, never an error.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::telemetry::{
    AffinitySource, BoardIdentity, CacheKind, CacheLevel, CoreTopology, TopologySnapshot,
};

/// Locations of the sysfs trees used by the live provider
#[derive(Debug, Clone)]
pub struct SysfsPaths {
    pub cpu_root: PathBuf,
    pub node_root: PathBuf,
    pub dmi_root: PathBuf,
    pub rapl_root: PathBuf,
}

impl Default for SysfsPaths {
    fn default() -> Self {
        Self {
            cpu_root: PathBuf::from("/sys/devices/system/cpu"),
            node_root: PathBuf::from("/sys/devices/system/node"),
            dmi_root: PathBuf::from("/sys/class/dmi/id"),
            rapl_root: PathBuf::from("/sys/class/powercap/intel-rapl:0"),
        }
    }
}

fn read_trimmed(path: &Path) -> Option<String> {
    let value = fs::read_to_string(path).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn read_number<T: std::str::FromStr>(path: &Path) -> Option<T> {
    read_trimmed(path)?.parse().ok()
}

/// Parse a kernel CPU list such as `0-3,8,10-11`.
pub fn parse_cpu_list(list: &str) -> Vec<usize> {
    let mut cpus = Vec::new();
    for part in list.trim().split(',').filter(|p| !p.is_empty()) {
        match part.split_once('-') {
            Some((start, end)) => {
                if let (Ok(start), Ok(end)) = (start.parse::<usize>(), end.parse::<usize>()) {
                    cpus.extend(start..=end);
                }
            }
            None => {
                if let Ok(cpu) = part.parse() {
                    cpus.push(cpu);
                }
            }
        }
    }
    cpus
}

/// Parse a cache size such as `32K`, `1024K` or `8M` into bytes.
pub fn parse_cache_size(size: &str) -> Option<u64> {
    let size = size.trim();
    let (digits, multiplier) = match size.chars().last()? {
        'K' | 'k' => (&size[..size.len() - 1], 1024),
        'M' | 'm' => (&size[..size.len() - 1], 1024 * 1024),
        'G' | 'g' => (&size[..size.len() - 1], 1024 * 1024 * 1024),
        _ => (size, 1),
    };
    digits.parse::<u64>().ok().map(|n| n * multiplier)
}

pub fn parse_cache_kind(kind: &str) -> CacheKind {
    match kind.trim() {
        "Data" => CacheKind::Data,
        "Instruction" => CacheKind::Instruction,
        _ => CacheKind::Unified,
    }
}

/// Indices of the `cpuN` directories under `cpu_root`, sorted.
fn cpu_indices(cpu_root: &Path) -> Vec<usize> {
    let Ok(entries) = fs::read_dir(cpu_root) else {
        return Vec::new();
    };
    let mut indices: Vec<usize> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name();
            name.to_str()?.strip_prefix("cpu")?.parse().ok()
        })
        .collect();
    indices.sort_unstable();
    indices
}

/// Logical CPU to NUMA node, from `nodeN/cpulist`.
pub fn read_numa_nodes(node_root: &Path) -> BTreeMap<usize, usize> {
    let mut mapping = BTreeMap::new();
    let Ok(entries) = fs::read_dir(node_root) else {
        return mapping;
    };
    for entry in entries.filter_map(|e| e.ok()) {
        let name = entry.file_name();
        let Some(node) = name
            .to_str()
            .and_then(|n| n.strip_prefix("node"))
            .and_then(|n| n.parse::<usize>().ok())
        else {
            continue;
        };
        if let Some(list) = read_trimmed(&entry.path().join("cpulist")) {
            for cpu in parse_cpu_list(&list) {
                mapping.insert(cpu, node);
            }
        }
    }
    mapping
}

/// Cache hierarchy as seen by `cpu0`.
pub fn read_caches(cpu_root: &Path) -> Vec<CacheLevel> {
    let cache_root = cpu_root.join("cpu0").join("cache");
    let Ok(entries) = fs::read_dir(&cache_root) else {
        return Vec::new();
    };
    let mut caches: Vec<CacheLevel> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with("index"))
        .filter_map(|e| {
            let dir = e.path();
            Some(CacheLevel {
                level: read_number(&dir.join("level"))?,
                kind: read_trimmed(&dir.join("type"))
                    .map(|k| parse_cache_kind(&k))
                    .unwrap_or_default(),
                size_bytes: read_trimmed(&dir.join("size")).and_then(|s| parse_cache_size(&s))?,
                associativity: read_number(&dir.join("ways_of_associativity")),
                line_size_bytes: read_number(&dir.join("coherency_line_size")),
            })
        })
        .collect();
    caches.sort_by_key(|c| (c.level, c.kind as u8));
    caches
}

/// Thread to core affinity from `cpuN/topology`.
///
/// Physical core ids are renumbered densely in order of first appearance, so the
/// first thread of every core keeps the lowest ids. Returns `None` when no CPU
/// reports its topology.
pub fn read_topology(paths: &SysfsPaths) -> Option<TopologySnapshot> {
    let numa = read_numa_nodes(&paths.node_root);
    let mut physical_ids: BTreeMap<(usize, usize), usize> = BTreeMap::new();
    let mut order: Vec<(usize, usize)> = Vec::new();
    let mut cores = Vec::new();

    for logical_id in cpu_indices(&paths.cpu_root) {
        let topology = paths.cpu_root.join(format!("cpu{}", logical_id)).join("topology");
        let (Some(core), Some(package)) = (
            read_number::<usize>(&topology.join("core_id")),
            read_number::<usize>(&topology.join("physical_package_id")),
        ) else {
            continue;
        };

        let key = (package, core);
        let is_smt_sibling = physical_ids.contains_key(&key);
        let next_id = order.len();
        let physical_core_id = *physical_ids.entry(key).or_insert_with(|| {
            order.push(key);
            next_id
        });

        cores.push(CoreTopology {
            logical_id,
            physical_core_id,
            package_id: package,
            numa_node_id: numa.get(&logical_id).copied().unwrap_or(0),
            is_smt_sibling,
        });
    }

    if cores.is_empty() {
        return None;
    }

    let mut packages: Vec<usize> = cores.iter().map(|c| c.package_id).collect();
    packages.sort_unstable();
    packages.dedup();
    let numa_nodes = numa.values().collect::<std::collections::BTreeSet<_>>().len();

    Some(TopologySnapshot {
        physical_cores: order.len(),
        logical_cores: cores.len(),
        packages: packages.len(),
        numa_nodes: numa_nodes.max(1),
        has_smt: cores.len() > order.len(),
        affinity_source: AffinitySource::Reported,
        cores,
        caches: read_caches(&paths.cpu_root),
    })
}

/// Motherboard and BIOS strings from DMI.
pub fn read_board(dmi_root: &Path) -> BoardIdentity {
    let field = |name: &str| read_trimmed(&dmi_root.join(name));
    BoardIdentity {
        manufacturer: field("board_vendor"),
        product: field("board_name"),
        version: field("board_version"),
        bios_vendor: field("bios_vendor"),
        bios_version: field("bios_version"),
        bios_date: field("bios_date"),
    }
}

/// Package power derived from the RAPL cumulative energy counter.
#[derive(Debug)]
pub struct RaplCounter {
    energy_path: PathBuf,
    max_range_uj: Option<u64>,
    last: Option<(u64, Instant)>,
}

impl RaplCounter {
    /// `None` when the counter does not exist or is not readable (usually root only).
    pub fn open(rapl_root: &Path) -> Option<Self> {
        let energy_path = rapl_root.join("energy_uj");
        read_number::<u64>(&energy_path)?;
        Some(Self {
            max_range_uj: read_number(&rapl_root.join("max_energy_range_uj")),
            energy_path,
            last: None,
        })
    }

    /// Average watts since the previous sample. The first sample has no baseline.
    pub fn sample(&mut self) -> Option<f64> {
        let energy = read_number::<u64>(&self.energy_path)?;
        let now = Instant::now();
        let previous = self.last.replace((energy, now));
        let (last_energy, last_time) = previous?;
        watts_between(last_energy, energy, self.max_range_uj, now.duration_since(last_time).as_secs_f64())
    }
}

/// Power from two energy readings in microjoules, handling counter wraparound.
pub fn watts_between(before_uj: u64, after_uj: u64, max_range_uj: Option<u64>, seconds: f64) -> Option<f64> {
    if seconds <= 0.0 {
        return None;
    }
    let delta = if after_uj >= before_uj {
        after_uj - before_uj
    } else {
        max_range_uj?.checked_sub(before_uj)? + after_uj
    };
    Some(delta as f64 / 1_000_000.0 / seconds)
}
