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
use crate::error::ResourceError;
use crate::frankfurter::models::{CurrencyCode, ExchangeRates, History};
use crate::http::transport::{HttpRequest, Transport};
use crate::util::cancel::Cancellation;
use crate::util::date::CalendarDay;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

pub const USER_AGENT_STRING: &str = "Concourse Euro Exchange Rates Resource; https://github.com/suhlig/euro-exchange-rates-resource";

/// Client for the Frankfurter API, which republishes the ECB reference
/// rates. Every call issues exactly one GET and never retries.
///
/// [API Documentation](https://www.frankfurter.app/docs/)
pub struct ExchangeRatesService {
	transport: Box<dyn Transport>,
	base_url: String,
}

impl ExchangeRatesService {
	pub fn new(base_url: &str, transport: Box<dyn Transport>) -> Self {
		ExchangeRatesService {
			transport,
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	pub fn base_url(&self) -> &str {
		&self.base_url
	}

	/// Fetches the most recent rates.
	pub fn latest(
		&self,
		cancel: &Cancellation,
		currencies: &[CurrencyCode],
	) -> Result<ExchangeRates, ResourceError> {
		self.at(cancel, &CalendarDay::default(), currencies)
	}

	/// Fetches the rates at the given day, or the latest rates if the day is
	/// zero. If no currencies are passed, all of them are fetched.
	///
	/// For days without rates the service silently answers with the closest
	/// earlier day; callers that care must compare `date` themselves.
	pub fn at(
		&self,
		cancel: &Cancellation,
		day: &CalendarDay,
		currencies: &[CurrencyCode],
	) -> Result<ExchangeRates, ResourceError> {
		let segment = if day.is_zero() {
			"latest".to_string()
		} else {
			day.to_string()
		};

		let url = self.endpoint(&segment, currencies)?;
		self.get(cancel, url)
	}

	/// Fetches the rates of every published day between `day` and now.
	pub fn since(
		&self,
		cancel: &Cancellation,
		day: &CalendarDay,
		currencies: &[CurrencyCode],
	) -> Result<History, ResourceError> {
		if day.is_zero() {
			return Err(ResourceError::Url {
				url: self.base_url.clone(),
				reason: "a history needs a start day".to_string(),
			});
		}

		let url = self.endpoint(&format!("{}..", day), currencies)?;
		self.get(cancel, url)
	}

	fn endpoint(
		&self,
		segment: &str,
		currencies: &[CurrencyCode],
	) -> Result<Url, ResourceError> {
		let unusable = |reason: String| ResourceError::Url {
			url: self.base_url.clone(),
			reason,
		};

		let mut url =
			Url::parse(&self.base_url).map_err(|e| unusable(e.to_string()))?;

		// appended as a path segment so a query on the base URL stays put
		url.path_segments_mut()
			.map_err(|_| unusable("cannot have a path".to_string()))?
			.pop_if_empty()
			.push(segment);

		if !currencies.is_empty() {
			let to = currencies
				.iter()
				.map(CurrencyCode::as_str)
				.collect::<Vec<_>>()
				.join(",");
			url.query_pairs_mut().append_pair("to", &to);
		}

		Ok(url)
	}

	/// Sends a GET and decodes the response. Errors on non-2xx responses.
	fn get<R>(&self, cancel: &Cancellation, url: Url) -> Result<R, ResourceError>
	where
		R: DeserializeOwned,
	{
		cancel.check()?;

		let mut headers = HeaderMap::new();
		headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));

		let request = HttpRequest {
			method: Method::GET,
			url,
			headers,
			timeout: cancel.remaining(),
		};

		debug!("Sending GET to {}", request.url);
		let response = self.transport.execute(&request).map_err(|source| {
			// the only timeout we ever set is the cancellation deadline
			if source.is_timeout() {
				ResourceError::Cancelled
			} else {
				ResourceError::Transport {
					url: request.url.to_string(),
					source,
				}
			}
		})?;

		if !response.status.is_success() {
			return Err(ResourceError::Status {
				url: request.url.to_string(),
				status: response.status,
				body: String::from_utf8_lossy(&response.body).into_owned(),
			});
		}

		serde_json::from_slice(&response.body).map_err(|source| {
			ResourceError::Decode {
				url: request.url.to_string(),
				source,
			}
		})
	}
}
