/* Copyright © 2024-2025 Adam Train <adam@trainrelay.net>
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU General Public License as published by
 * the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */
use crate::util::date::CalendarDay;
use reqwest::StatusCode;

/// Failures of the rate service client and the lifecycle verbs.
///
/// Validation of requests is not represented here; it fails with plain
/// `anyhow` errors before any of these can occur.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
	#[error("unable to interpret '{0}' as YYYY-MM-DD format")]
	DateFormat(String),

	#[error("unable to build request URL from '{url}': {reason}")]
	Url { url: String, reason: String },

	#[error("GET {url} failed")]
	Transport {
		url: String,
		#[source]
		source: reqwest::Error,
	},

	#[error("GET {url} returned {status}: {body}")]
	Status {
		url: String,
		status: StatusCode,
		body: String,
	},

	#[error("unable to decode response from {url}")]
	Decode {
		url: String,
		#[source]
		source: serde_json::Error,
	},

	#[error("requested version {requested} is not available; closest is {closest}")]
	NotAvailable {
		requested: CalendarDay,
		closest: CalendarDay,
	},

	#[error("unable to write {path}")]
	Write {
		path: String,
		#[source]
		source: std::io::Error,
	},

	#[error("the request was cancelled")]
	Cancelled,
}
