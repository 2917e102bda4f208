#![recursion_limit = "256"]

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

//! Forecasts when a calibration drift metric crosses a threshold after each reset,
//! by feeding a pre-trained LSTM its own predictions one day at a time.

pub mod cli;
pub mod config;
pub mod data;
pub mod error;
pub mod event;
pub mod forecast;
pub mod model;
pub mod preprocess;
pub mod report;
pub mod typedef;
