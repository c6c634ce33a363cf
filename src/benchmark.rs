//! Advisory performance snapshots: how long probing and classification take
//! on this machine, plus the GPU inventory, written under `benchmarks/`.

use crate::classify;
use crate::error::{Error, Result};
use crate::integrator::CommandRunner;
use crate::paths::Paths;
use crate::probe;
use crate::sysfs::SysfsRoot;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::path::PathBuf;
use std::time::{Duration, Instant};

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize)]
pub struct BenchmarkReport {
    pub version: u32,
    pub timestamp: String,
    pub probe_ms: u128,
    pub classify_ms: u128,
    pub gpus: Vec<BenchmarkGpu>,
}

#[derive(Debug, Serialize)]
pub struct BenchmarkGpu {
    pub description: String,
    pub vendor: String,
    pub architecture: String,
}

/// Time one probe + reclassification pass and persist the report. Returns
/// the report and where it was written.
pub fn run(
    paths: &Paths,
    sysfs: &SysfsRoot,
    runner: &dyn CommandRunner,
) -> Result<(BenchmarkReport, PathBuf)> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));

    spinner.set_message("probing hardware...");
    let probe_start = Instant::now();
    let snapshot = probe::probe(sysfs, runner)?;
    let probe_ms = probe_start.elapsed().as_millis();

    spinner.set_message("classifying...");
    let classify_start = Instant::now();
    for gpu in &snapshot.gpus {
        let _ = classify::classify(&gpu.raw_description, snapshot.is_mobile_system);
    }
    let classify_ms = classify_start.elapsed().as_millis();
    spinner.finish_and_clear();

    let report = BenchmarkReport {
        version: FORMAT_VERSION,
        timestamp: chrono::Utc::now().to_rfc3339(),
        probe_ms,
        classify_ms,
        gpus: snapshot
            .gpus
            .iter()
            .map(|g| BenchmarkGpu {
                description: g.raw_description.clone(),
                vendor: g.vendor.to_string(),
                architecture: g.architecture.to_string(),
            })
            .collect(),
    };

    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let path = paths.benchmarks_dir().join(format!("benchmark_{}.json", stamp));
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| Error::State(format!("failed to serialize benchmark: {}", e)))?;
    std::fs::write(&path, json).map_err(|e| Error::io(&path, e))?;

    Ok((report, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrator::CommandOutput;
    use crate::integrator::testing::ScriptedRunner;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_benchmark_writes_report() {
        let tmp = TempDir::new().unwrap();
        let paths = Paths::rooted(tmp.path());
        paths.ensure().unwrap();

        let mut runner = ScriptedRunner::with_tools(&["lspci"]);
        runner.script(
            "lspci",
            CommandOutput {
                exit_code: Some(0),
                stdout: "00:02.0 VGA compatible controller: Intel Corporation UHD Graphics 630\n"
                    .to_string(),
                ..Default::default()
            },
        );

        let (report, path) = run(&paths, &SysfsRoot::new(tmp.path()), &runner).unwrap();
        assert_eq!(report.version, FORMAT_VERSION);
        assert_eq!(report.gpus.len(), 1);
        assert_eq!(report.gpus[0].vendor, "Intel");

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["version"], 1);
        assert!(written["gpus"].as_array().unwrap().len() == 1);
    }
}
