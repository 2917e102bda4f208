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

use serde::Serialize;

use crate::typedef::ErrorInfo;

/// Progress notifications sent from the forecast loop to whoever renders it
#[derive(Serialize, Clone, Debug, PartialEq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ForecastEvent {
	#[serde(rename_all = "camelCase")]
	RunStarted {
		iteration: usize,
		initial_value: f64,
	},
	#[serde(rename_all = "camelCase")]
	Progress {
		iteration: usize,
		step: usize,
		max_steps: usize,
		value: f64,
	},
	#[serde(rename_all = "camelCase")]
	RunFinished {
		iteration: usize,
		achieved: bool,
		steps_taken: usize,
	},
	#[serde(rename_all = "camelCase")]
	RunFailed { iteration: usize, error: ErrorInfo },
}

impl ForecastEvent {
	/// Fraction of the step budget consumed, for progress bars
	pub fn progress(&self) -> Option<f64> {
		match self {
			ForecastEvent::Progress {
				step, max_steps, ..
			} => Some(*step as f64 / *max_steps as f64),
			ForecastEvent::RunFinished { .. } => Some(1f64),
			_ => None,
		}
	}
}

pub trait EventSink {
	fn emit(&self, event: ForecastEvent);
}

/// Drops every event
pub struct Silent;

impl EventSink for Silent {
	fn emit(&self, _event: ForecastEvent) {}
}

impl<F: Fn(ForecastEvent)> EventSink for F {
	fn emit(&self, event: ForecastEvent) {
		self(event)
	}
}

/// Forwards events to the tracing subscriber, step progress only at trace level
pub struct LogSink;

impl EventSink for LogSink {
	fn emit(&self, event: ForecastEvent) {
		let progress = event.progress().unwrap_or_default();

		match event {
			ForecastEvent::RunStarted {
				iteration,
				initial_value,
			} => tracing::info!(iteration, initial_value, "forecast run started"),
			ForecastEvent::Progress {
				iteration,
				step,
				max_steps,
				value,
			} => tracing::trace!(
				iteration,
				step,
				max_steps,
				value,
				percent = format_args!("{:.1}", progress * 100f64),
				"forecast step"
			),
			ForecastEvent::RunFinished {
				iteration,
				achieved,
				steps_taken,
			} => tracing::info!(iteration, achieved, steps_taken, "forecast run finished"),
			ForecastEvent::RunFailed { iteration, error } => {
				tracing::warn!(iteration, title = %error.title, "{}", error.message)
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::cell::RefCell;
	use std::sync::{Arc, Mutex};

	#[test]
	fn closures_are_sinks() {
		let received = RefCell::new(Vec::new());
		let sink = |event: ForecastEvent| received.borrow_mut().push(event);

		sink.emit(ForecastEvent::RunStarted {
			iteration: 1,
			initial_value: -400f64,
		});

		assert_eq!(received.borrow().len(), 1);
	}

	#[test]
	fn progress_is_a_fraction_of_the_budget() {
		let event = ForecastEvent::Progress {
			iteration: 1,
			step: 50,
			max_steps: 200,
			value: 0f64,
		};
		assert_eq!(event.progress(), Some(0.25));

		let started = ForecastEvent::RunStarted {
			iteration: 1,
			initial_value: 0f64,
		};
		assert_eq!(started.progress(), None);
	}

	#[derive(Clone, Default)]
	struct Captured(Arc<Mutex<Vec<u8>>>);

	impl std::io::Write for Captured {
		fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
			self.0.lock().unwrap().extend_from_slice(buf);
			Ok(buf.len())
		}

		fn flush(&mut self) -> std::io::Result<()> {
			Ok(())
		}
	}

	#[test]
	fn log_sink_reports_step_percentage() {
		let captured = Captured::default();
		let writer = captured.clone();
		let subscriber = tracing_subscriber::fmt()
			.with_max_level(tracing::Level::TRACE)
			.with_ansi(false)
			.with_writer(move || writer.clone())
			.finish();

		tracing::subscriber::with_default(subscriber, || {
			LogSink.emit(ForecastEvent::Progress {
				iteration: 1,
				step: 50,
				max_steps: 200,
				value: 12f64,
			});
		});

		let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
		assert!(output.contains("forecast step"));
		assert!(output.contains("percent=25.0"));
	}

	#[test]
	fn events_serialize_with_a_tag() {
		let json = serde_json::to_value(ForecastEvent::RunFinished {
			iteration: 2,
			achieved: true,
			steps_taken: 37,
		})
		.unwrap();

		assert_eq!(json["event"], "runFinished");
		assert_eq!(json["stepsTaken"], 37);
	}
}
