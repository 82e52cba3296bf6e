//! The dataset manifest and the build-time scan that produces it.

use serde::{Deserialize, Serialize};

use crate::error::{LoadError, Result};

/// Contents of `datasets.json`. Only `datasets` is consumed at runtime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
	/// Dataset ids, sorted.
	pub datasets: Vec<String>,
	/// First dataset, if any.
	#[serde(default)]
	pub default: Option<String>,
	/// ISO-8601 generation time.
	#[serde(default)]
	pub generated: String,
	/// Number of datasets.
	#[serde(default)]
	pub total: usize,
}

impl Manifest {
	/// Build a manifest from discovered dataset ids.
	pub fn new(mut datasets: Vec<String>, generated: String) -> Self {
		datasets.sort();
		datasets.dedup();
		Self {
			default: datasets.first().cloned(),
			total: datasets.len(),
			datasets,
			generated,
		}
	}

	/// Parse `datasets.json`.
	pub fn parse(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(LoadError::parse("dataset manifest"))
	}
}

#[cfg(not(target_arch = "wasm32"))]
pub use scan::{copy_tree, scan_datasets};

#[cfg(not(target_arch = "wasm32"))]
mod scan {
	use std::fs;
	use std::path::Path;

	use log::{info, warn};
	use walkdir::WalkDir;

	use crate::config::{ENTITIES_FILE, RELATIONS_FILE};
	use crate::error::Result;

	/// Names of the sub-folders of `data_dir` holding both dataset documents.
	pub fn scan_datasets(data_dir: &Path) -> Result<Vec<String>> {
		let mut datasets = Vec::new();
		for entry in fs::read_dir(data_dir)? {
			let entry = entry?;
			if !entry.file_type()?.is_dir() {
				continue;
			}
			let name = entry.file_name().to_string_lossy().into_owned();
			let dir = entry.path();
			if dir.join(ENTITIES_FILE).is_file() && dir.join(RELATIONS_FILE).is_file() {
				info!("valid dataset: {name}");
				datasets.push(name);
			} else {
				warn!("skipping {name}: missing {ENTITIES_FILE} or {RELATIONS_FILE}");
			}
		}
		datasets.sort();
		Ok(datasets)
	}

	/// Recursively copy `from` into `to`, replacing whatever was there.
	pub fn copy_tree(from: &Path, to: &Path) -> Result<u64> {
		if to.exists() {
			fs::remove_dir_all(to)?;
		}
		let mut copied = 0;
		for entry in WalkDir::new(from) {
			let entry = entry.map_err(std::io::Error::from)?;
			let Ok(relative) = entry.path().strip_prefix(from) else {
				continue;
			};
			let target = to.join(relative);
			if entry.file_type().is_dir() {
				fs::create_dir_all(&target)?;
			} else {
				fs::copy(entry.path(), &target)?;
				copied += 1;
			}
		}
		Ok(copied)
	}
}
