/*
 * RefSys Forecast, a threshold-crossing forecaster for calibration drift
 * Copyright (C) 2025 Athaariq A. Ramadhani <foss@athaariq.my.id>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use clap::{Args, Parser, Subcommand};
use std::{fmt::Write, path::PathBuf};

use crate::config::{DataSettings, Settings};
use crate::data::command::{inspect, load_data};
use crate::data::helper::mjd_to_datetime;
use crate::data::typedef::DataInfo;
use crate::error::ForecastError;
use crate::event::LogSink;
use crate::forecast::command::{plan_iterations, run_iterations};
use crate::forecast::typedef::{BatchReport, CancelToken, RunOutcome};
use crate::model::command::resolve_model;
use crate::model::typedef::ModelSource;
use crate::report::command::{save_summary, save_trajectories};
use crate::typedef::ErrorInfo;

#[derive(Parser, Debug)]
#[command(name = "refsys-forecast", version, about)]
pub struct Cli {
	/// TOML settings file, every key optional
	#[arg(long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Preview the observation table and its statistics
	Inspect(InspectArgs),
	/// Forecast the day the metric crosses the threshold after each reset
	Forecast(ForecastArgs),
}

#[derive(Args, Debug)]
pub struct SourceArgs {
	/// CSV or spreadsheet holding the observations
	#[arg(long, value_name = "FILE")]
	pub data: PathBuf,

	/// Spreadsheet tab, the first one when omitted
	#[arg(long)]
	pub sheet: Option<String>,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
	#[command(flatten)]
	pub source: SourceArgs,

	#[arg(long)]
	pub json: bool,
}

#[derive(Args, Debug)]
pub struct ForecastArgs {
	#[command(flatten)]
	pub source: SourceArgs,

	/// Number of resets to forecast, one per --initial when omitted
	#[arg(long)]
	pub iterations: Option<usize>,

	#[arg(long, allow_negative_numbers = true)]
	pub threshold: Option<f64>,

	/// Metric value right after a reset, repeat once per iteration
	#[arg(long = "initial", allow_negative_numbers = true, value_name = "VALUE")]
	pub initial_values: Vec<f64>,

	/// Model record to use instead of the configured default
	#[arg(long, value_name = "FILE")]
	pub model: Option<PathBuf>,

	/// Where the summary (and trajectories) are written
	#[arg(long, default_value = ".", value_name = "DIR")]
	pub output: PathBuf,

	/// Also export the day-by-day values of every completed run
	#[arg(long)]
	pub trajectories: bool,

	#[arg(long)]
	pub json: bool,
}

impl Cli {
	pub fn wants_json(&self) -> bool {
		match &self.command {
			Command::Inspect(args) => args.json,
			Command::Forecast(args) => args.json,
		}
	}
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
	let settings = match &cli.config {
		Some(path) => Settings::load(path)?,
		None => Settings::default(),
	};

	match cli.command {
		Command::Inspect(args) => run_inspect(args, &settings),
		Command::Forecast(args) => run_forecast(args, settings).await,
	}
}

fn run_inspect(args: InspectArgs, settings: &Settings) -> anyhow::Result<()> {
	let dataset = load_data(
		&args.source.data,
		&settings.data,
		args.source.sheet.as_deref(),
	)?;
	let info = inspect(&dataset, &settings.data);

	if args.json {
		println!("{}", serde_json::to_string_pretty(&info)?);
	} else {
		print!("{}", render_data_info(&info, &settings.data));
	}

	Ok(())
}

async fn run_forecast(args: ForecastArgs, settings: Settings) -> anyhow::Result<()> {
	let dataset = load_data(
		&args.source.data,
		&settings.data,
		args.source.sheet.as_deref(),
	)?;
	let params = plan_iterations(
		args.iterations,
		args.threshold,
		&args.initial_values,
		&settings.forecast,
	)?;

	let uploaded = match &args.model {
		Some(path) => Some(std::fs::read(path).map_err(|err| {
			ForecastError::ModelUnavailable(format!("Cannot read \"{}\": {}", path.display(), err))
		})?),
		None => None,
	};
	let source = ModelSource::choose(uploaded, settings.model.default_path.clone());
	let model = resolve_model(source, &settings.model)?;

	let cancel = CancelToken::new();
	let interrupt = tokio::spawn({
		let cancel = cancel.clone();
		async move {
			if tokio::signal::ctrl_c().await.is_ok() {
				tracing::warn!("interrupted, cancelling the remaining forecasts");
				cancel.cancel();
			}
		}
	});

	// The blocking worker owns the model, so every invocation goes through it in order
	let forecast_settings = settings.forecast.clone();
	let report = tokio::task::spawn_blocking(move || {
		run_iterations(
			&dataset,
			&model,
			&params,
			&forecast_settings,
			&cancel,
			&LogSink,
		)
	})
	.await??;
	interrupt.abort();

	if args.json {
		println!("{}", serde_json::to_string_pretty(&report)?);
	} else {
		print!("{}", render_report(&report));
	}

	if report.summary.rows.is_empty() {
		tracing::warn!("no run completed, nothing to export");
	} else {
		save_summary(&report.summary, &args.output, &settings.report)?;
	}

	if args.trajectories {
		save_trajectories(&report.outcomes, &args.output)?;
	}

	Ok(())
}

/// Prints a failure the same way the report would have been printed
pub fn report_error(err: &anyhow::Error, json: bool) {
	let info = match err.downcast_ref::<ForecastError>() {
		Some(found) => ErrorInfo::from(found),
		None => ErrorInfo {
			title: "Error".into(),
			message: format!("{:#}", err),
		},
	};

	if json {
		match serde_json::to_string_pretty(&info) {
			Ok(text) => println!("{}", text),
			Err(_) => eprintln!("{}", info),
		}
	} else {
		eprintln!("{}", info);
	}
}

fn calendar_date(mjd: f64) -> String {
	mjd_to_datetime(mjd)
		.map(|found| found.format("%Y-%m-%d").to_string())
		.unwrap_or_else(|| String::from("?"))
}

pub fn render_data_info(info: &DataInfo, columns: &DataSettings) -> String {
	let mut text = String::new();

	let _ = writeln!(
		text,
		"{}: {} observations, {} rows skipped",
		info.name, info.count, info.skipped_rows
	);
	let _ = writeln!(
		text,
		"{:<8} {} .. {} ({} .. {})",
		columns.time_column,
		info.time_min,
		info.time_max,
		calendar_date(info.time_min),
		calendar_date(info.time_max)
	);
	let _ = writeln!(
		text,
		"{:<8} min {}, max {}, mean {:.3}",
		columns.metric_column, info.metric_min, info.metric_max, info.metric_mean
	);

	if !info.preview.is_empty() {
		let _ = writeln!(text);
		let _ = writeln!(text, "{:>12} {:>12}", columns.time_column, columns.metric_column);
		for each in &info.preview {
			let _ = writeln!(text, "{:>12} {:>12}", each.time_index, each.metric);
		}
	}

	text
}

pub fn render_report(report: &BatchReport) -> String {
	let mut text = String::new();

	let _ = writeln!(
		text,
		"Scaled on [{}, {}], threshold {}, at most {} days per run",
		report.normal_param.min(),
		report.normal_param.max(),
		report.threshold,
		report.max_steps
	);
	let _ = writeln!(text);

	for outcome in &report.outcomes {
		match outcome {
			RunOutcome::Completed(run) => match run.target_time_index() {
				Some(target) => {
					let _ = writeln!(
						text,
						"#{:<3} from {:>9}: reached on MJD {} ({}) after {} days",
						run.iteration,
						run.initial_value,
						target,
						calendar_date(target),
						run.steps_taken
					);
				}
				None => {
					let peak = run
						.peak()
						.map(|found| format!(", peak {:.3} on MJD {}", found.value, found.time_index))
						.unwrap_or_default();
					let _ = writeln!(
						text,
						"#{:<3} from {:>9}: not reached within {} days{}",
						run.iteration, run.initial_value, run.steps_taken, peak
					);
				}
			},
			RunOutcome::Failed {
				iteration,
				initial_value,
				error,
			} => {
				let _ = writeln!(
					text,
					"#{:<3} from {:>9}: {}",
					iteration, initial_value, error
				);
			}
		}
	}

	let _ = writeln!(text);
	let _ = writeln!(
		text,
		"{} of {} runs reached the threshold",
		report.summary.achieved_count(),
		report.outcomes.len()
	);

	text
}
