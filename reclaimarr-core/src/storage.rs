use std::collections::HashSet;
use std::path::Path;

use reclaimarr_model::StorageInfo;
use tracing::{debug, warn};

/// Disk usage for a single path, in gigabytes. `None` when the path does
/// not exist or cannot be probed.
pub fn drive_usage(path: &str) -> Option<StorageInfo> {
    let total = fs2::total_space(path);
    let free = fs2::free_space(path);
    let available = fs2::available_space(path);

    match (total, free, available) {
        (Ok(total), Ok(free), Ok(available)) => Some(StorageInfo::from_bytes(
            total,
            total.saturating_sub(free),
            available,
        )),
        _ => {
            warn!("Could not get disk usage for '{path}'");
            None
        }
    }
}

/// Combined usage across the configured mount points. Paths living on the
/// same filesystem are counted once, keyed by device id, so bind mounts
/// and nested paths do not inflate the totals. Falls back to `/` when no
/// mount points are configured.
pub fn combined_usage(mount_points: &[String]) -> StorageInfo {
    let fallback = vec!["/".to_string()];
    let paths = if mount_points.is_empty() {
        warn!("No mount points configured; storage stats default to '/'");
        &fallback
    } else {
        mount_points
    };

    let mut seen_devices: HashSet<u64> = HashSet::new();
    let mut seen_paths: HashSet<String> = HashSet::new();
    let mut combined = StorageInfo::default();

    for path in paths {
        let unique = match device_id(Path::new(path)) {
            Some(device) => seen_devices.insert(device),
            None => seen_paths.insert(path.clone()),
        };
        if !unique {
            debug!("Skipping '{path}': filesystem already counted");
            continue;
        }

        let Some(usage) = drive_usage(path) else {
            warn!("Skipping path '{path}' due to probe error");
            continue;
        };
        combined.total += usage.total;
        combined.used += usage.used;
        combined.available += usage.available;
    }

    combined
}

#[cfg(unix)]
fn device_id(path: &Path) -> Option<u64> {
    use std::os::unix::fs::MetadataExt;
    std::fs::metadata(path).ok().map(|meta| meta.dev())
}

#[cfg(not(unix))]
fn device_id(_path: &Path) -> Option<u64> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probing_a_real_path_reports_nonzero_totals() {
        let usage = drive_usage("/").expect("root filesystem should be probeable");
        assert!(usage.total > 0.0);
        assert!(usage.available <= usage.total);
    }

    #[test]
    fn missing_path_reports_none() {
        assert!(drive_usage("/definitely/not/a/mount").is_none());
    }

    #[test]
    fn duplicate_mounts_on_one_device_are_counted_once() {
        // Same filesystem twice: totals must match a single probe.
        let single = combined_usage(&["/".to_string()]);
        let doubled = combined_usage(&["/".to_string(), "/".to_string()]);
        assert!((doubled.total - single.total).abs() < f64::EPSILON);
    }
}
