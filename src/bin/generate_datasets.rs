//! Build-time dataset discovery: writes the manifest the viewer reads on startup.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
	cli::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
mod cli {
	use std::fs;
	use std::path::PathBuf;
	use std::process::ExitCode;

	use clap::Parser;
	use kg_visualizer::graph::manifest::{Manifest, copy_tree, scan_datasets};
	use log::{error, info, warn};

	#[derive(Parser)]
	#[command(name = "generate-datasets")]
	#[command(version, about = "Scan a data directory and write the dataset manifest", long_about = None)]
	struct Args {
		/// Directory holding one sub-folder per dataset
		#[arg(long, default_value = "data")]
		data_dir: PathBuf,

		/// Where to write the manifest
		#[arg(long, default_value = "datasets.json")]
		output: PathBuf,

		/// Also copy the data directory here (e.g. the bundle's output folder)
		#[arg(long)]
		copy_to: Option<PathBuf>,
	}

	pub fn run() -> ExitCode {
		env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
		let args = Args::parse();

		let datasets = if args.data_dir.is_dir() {
			match scan_datasets(&args.data_dir) {
				Ok(datasets) => datasets,
				Err(err) => {
					error!("could not scan {}: {err}", args.data_dir.display());
					Vec::new()
				}
			}
		} else {
			error!("data directory {} not found", args.data_dir.display());
			Vec::new()
		};
		if datasets.is_empty() {
			warn!("no datasets found, writing an empty manifest");
		}

		let manifest = Manifest::new(datasets, chrono::Utc::now().to_rfc3339());
		let json = match serde_json::to_string_pretty(&manifest) {
			Ok(json) => json,
			Err(err) => {
				error!("could not encode manifest: {err}");
				return ExitCode::FAILURE;
			}
		};
		if let Err(err) = fs::write(&args.output, json) {
			error!("could not write {}: {err}", args.output.display());
			return ExitCode::FAILURE;
		}
		info!(
			"wrote {} ({} datasets, default {:?})",
			args.output.display(),
			manifest.total,
			manifest.default
		);

		if let Some(dest) = &args.copy_to {
			if !args.data_dir.is_dir() {
				warn!("nothing to copy to {}", dest.display());
			} else {
				match copy_tree(&args.data_dir, dest) {
					Ok(files) => info!("copied {files} files to {}", dest.display()),
					Err(err) => {
						error!("could not copy data to {}: {err}", dest.display());
						return ExitCode::FAILURE;
					}
				}
			}
		}
		ExitCode::SUCCESS
	}
}
