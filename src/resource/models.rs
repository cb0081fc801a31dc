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
use crate::frankfurter::models::CurrencyCode;
use crate::util::date::CalendarDay;
use anyhow::{anyhow, bail, Error};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static configuration of the resource, from the pipeline's `source:` block.
#[derive(Debug, Default, Deserialize)]
pub struct Source {
	/// Base URL of the rate service, e.g. https://api.frankfurter.app
	#[serde(default)]
	pub url: String,

	/// Currencies to request. If empty, all currencies the service knows.
	#[serde(default)]
	pub currencies: Vec<CurrencyCode>,

	/// Dumps every HTTP exchange to the log
	#[serde(default, alias = "Verbose")]
	pub verbose: bool,
}

impl Source {
	pub fn validate(&self) -> Result<(), Error> {
		if self.url.is_empty() {
			bail!("source.url is required");
		}

		let url = Url::parse(&self.url).map_err(|e| {
			anyhow!("source.url '{}' is not a valid URL: {}", self.url, e)
		})?;

		if url.scheme() != "http" && url.scheme() != "https" {
			bail!("source.url '{}' must be an http or https URL", self.url);
		}

		validate_currencies("source.currencies", &self.currencies)
	}
}

/// A version of the resource is a day on which rates were published.
#[derive(
	Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Version {
	#[serde(default, skip_serializing_if = "CalendarDay::is_zero")]
	pub date: CalendarDay,
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.date)
	}
}

#[derive(Debug, Default, Deserialize)]
pub struct Params {
	/// Narrows the currencies placed into the destination directory on get
	#[serde(default)]
	pub currencies: Vec<CurrencyCode>,
}

#[derive(Debug, Deserialize)]
pub struct CheckRequest {
	pub source: Source,

	/// Absent (or null) on the very first check of a pipeline
	#[serde(default)]
	pub version: Option<Version>,
}

impl CheckRequest {
	pub fn validate(&self) -> Result<(), Error> {
		self.source.validate()
	}
}

#[derive(Debug, Deserialize)]
pub struct GetRequest {
	pub source: Source,
	pub version: Version,

	#[serde(default)]
	pub params: Params,
}

impl GetRequest {
	pub fn validate(&self) -> Result<(), Error> {
		self.source.validate()?;

		if self.version.date.is_zero() {
			bail!("version.date is required");
		}

		validate_currencies("params.currencies", &self.params.currencies)
	}
}

#[derive(Debug, Deserialize)]
pub struct PutRequest {
	pub source: Source,

	#[serde(default)]
	pub params: Params,
}

impl PutRequest {
	pub fn validate(&self) -> Result<(), Error> {
		self.source.validate()?;
		validate_currencies("params.currencies", &self.params.currencies)
	}
}

/// What get and put report back: the version they produced, plus metadata
/// shown in the Concourse UI.
#[derive(Debug, Default, Serialize)]
pub struct Response {
	pub version: Version,
	pub metadata: Vec<NameValuePair>,
}

impl Response {
	pub fn validate(&self) -> Result<(), Error> {
		if self.metadata.iter().any(|pair| pair.name.is_empty()) {
			bail!("metadata names must not be empty");
		}
		Ok(())
	}
}

#[derive(Debug, PartialEq, Serialize)]
pub struct NameValuePair {
	pub name: String,
	pub value: String,
}

/// Versions emitted by check must all carry a date.
pub fn validate_versions(versions: &[Version]) -> Result<(), Error> {
	if let Some(i) = versions.iter().position(|v| v.date.is_zero()) {
		bail!("version #{} has no date", i + 1);
	}
	Ok(())
}

fn validate_currencies(
	field: &str,
	currencies: &[CurrencyCode],
) -> Result<(), Error> {
	if currencies.iter().any(|c| c.as_str().is_empty()) {
		bail!("{} must not contain empty currency codes", field);
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::str::FromStr;

	fn source(url: &str) -> Source {
		Source {
			url: url.to_string(),
			..Default::default()
		}
	}

	#[test]
	fn test_source_url_validation() {
		assert!(source("https://api.frankfurter.app").validate().is_ok());
		assert!(source("http://localhost:8080/v1/").validate().is_ok());

		for bad in ["", "api.frankfurter.app", "ftp://example.com", "http://"] {
			assert!(source(bad).validate().is_err(), "accepted '{}'", bad);
		}
	}

	#[test]
	fn test_empty_currency_is_rejected() {
		let mut s = source("https://api.frankfurter.app");
		s.currencies = vec![CurrencyCode::new("USD"), CurrencyCode::new("")];

		let err = s.validate().unwrap_err().to_string();
		assert!(err.contains("source.currencies"), "{}", err);
	}

	#[test]
	fn test_decode_source() {
		let s: Source = serde_json::from_str(
			r#"{ "url": "https://api.frankfurter.app", "currencies": ["SEK", "USD"], "Verbose": true }"#,
		)
		.unwrap();

		assert_eq!(s.currencies, vec![CurrencyCode::new("SEK"), CurrencyCode::new("USD")]);
		assert!(s.verbose);

		let s: Source =
			serde_json::from_str(r#"{ "url": "https://api.frankfurter.app" }"#)
				.unwrap();
		assert!(s.currencies.is_empty());
		assert!(!s.verbose);
	}

	#[test]
	fn test_check_request_without_version() {
		for body in [
			r#"{ "source": { "url": "https://example.com" } }"#,
			r#"{ "source": { "url": "https://example.com" }, "version": null }"#,
		] {
			let request: CheckRequest = serde_json::from_str(body).unwrap();
			assert!(request.version.is_none());
			assert!(request.validate().is_ok());
		}

		let request: CheckRequest = serde_json::from_str(
			r#"{ "source": { "url": "https://example.com" }, "version": {} }"#,
		)
		.unwrap();
		assert!(request.version.unwrap().date.is_zero());
	}

	#[test]
	fn test_check_request_requires_source() {
		assert!(serde_json::from_str::<CheckRequest>("{}").is_err());

		let request: CheckRequest =
			serde_json::from_str(r#"{ "source": {} }"#).unwrap();
		assert!(request.validate().is_err());
	}

	#[test]
	fn test_check_request_with_bad_version() {
		assert!(serde_json::from_str::<CheckRequest>(
			r#"{ "source": { "url": "https://example.com" }, "version": { "date": "16.01.2024" } }"#,
		)
		.is_err());
	}

	#[test]
	fn test_get_request_requires_version() {
		assert!(serde_json::from_str::<GetRequest>(
			r#"{ "source": { "url": "https://example.com" } }"#,
		)
		.is_err());

		let request: GetRequest = serde_json::from_str(
			r#"{ "source": { "url": "https://example.com" }, "version": {} }"#,
		)
		.unwrap();
		let err = request.validate().unwrap_err().to_string();
		assert!(err.contains("version.date"), "{}", err);

		let request: GetRequest = serde_json::from_str(
			r#"{
				"source": { "url": "https://example.com" },
				"version": { "date": "2024-01-15" },
				"params": { "currencies": ["USD"] }
			}"#,
		)
		.unwrap();
		assert!(request.validate().is_ok());
		assert_eq!(request.params.currencies, vec![CurrencyCode::new("USD")]);
	}

	#[test]
	fn test_encode_version() {
		let version = Version {
			date: CalendarDay::from_str("2024-01-16").unwrap(),
		};
		assert_eq!(
			serde_json::to_string(&version).unwrap(),
			r#"{"date":"2024-01-16"}"#
		);
		assert_eq!(version.to_string(), "2024-01-16");
	}

	#[test]
	fn test_encode_empty_response() {
		let response = Response::default();
		assert!(response.validate().is_ok());
		assert_eq!(
			serde_json::to_string(&response).unwrap(),
			r#"{"version":{},"metadata":[]}"#
		);
	}

	#[test]
	fn test_response_validation() {
		let response = Response {
			version: Version::default(),
			metadata: vec![NameValuePair {
				name: String::new(),
				value: "1.0".to_string(),
			}],
		};
		assert!(response.validate().is_err());
	}

	#[test]
	fn test_versions_validation() {
		let dated = Version {
			date: CalendarDay::from_str("2024-01-16").unwrap(),
		};
		assert!(validate_versions(&[]).is_ok());
		assert!(validate_versions(&[dated.clone()]).is_ok());
		assert!(validate_versions(&[dated, Version::default()]).is_err());
	}
}
