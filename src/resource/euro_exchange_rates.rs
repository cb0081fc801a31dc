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
use crate::frankfurter::client::ExchangeRatesService;
use crate::frankfurter::models::{CurrencyCode, Rates};
use crate::http::logger::RequestResponseLogger;
use crate::http::transport::ReqwestTransport;
use crate::resource::concourse::Resource;
use crate::resource::models::{
	CheckRequest, GetRequest, NameValuePair, PutRequest, Response, Source,
	Version,
};
use crate::util::cancel::Cancellation;
use anyhow::{Context, Error};
use reqwest::blocking::Client;
use std::fs;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

/// Exposes the ECB euro foreign exchange reference rates as a Concourse
/// resource. A version is a day on which rates were published; getting it
/// writes one file per currency.
pub struct EuroExchangeRates {
	http: Client,
}

impl EuroExchangeRates {
	pub fn new(http: Client) -> Self {
		EuroExchangeRates { http }
	}

	fn service(&self, source: &Source) -> ExchangeRatesService {
		let transport = ReqwestTransport::new(self.http.clone());

		if source.verbose {
			let logger = RequestResponseLogger::new(transport, io::stderr());
			ExchangeRatesService::new(&source.url, Box::new(logger))
		} else {
			ExchangeRatesService::new(&source.url, Box::new(transport))
		}
	}
}

impl Resource for EuroExchangeRates {
	fn check(
		&self,
		cancel: &Cancellation,
		request: CheckRequest,
	) -> Result<Vec<Version>, Error> {
		let service = self.service(&request.source);
		let currencies = &request.source.currencies;

		let since = match request.version {
			Some(version) if !version.date.is_zero() => version,
			_ => {
				info!("Fetching latest exchange rates");

				let latest =
					service.latest(cancel, currencies).with_context(|| {
						format!(
							"unable to fetch the latest rates from {}",
							service.base_url()
						)
					})?;

				debug!(
					"{} rates for {} {} as of {}",
					latest.rates.len(),
					latest.amount,
					latest.base,
					latest.date
				);

				return Ok(vec![Version { date: latest.date }]);
			},
		};

		info!("Fetching exchange rates since {}", since);

		let history = service
			.since(cancel, &since.date, currencies)
			.with_context(|| {
				format!(
					"unable to fetch rates since version {} from {}",
					since,
					service.base_url()
				)
			})?;

		if history.rates.is_empty() {
			warn!("No rates were published since {}", since);
		} else {
			info!(
				"Found rates for {} days between {} and {}",
				history.rates.len(),
				history.start,
				history.end
			);
		}
		debug!("History is for {} {}", history.amount, history.base);

		let mut versions: Vec<Version> = history
			.rates
			.days()
			.map(|day| Version { date: day.clone() })
			.collect();
		versions.sort_by(|a, b| b.cmp(a));

		Ok(versions)
	}

	fn get(
		&self,
		cancel: &Cancellation,
		request: GetRequest,
		destination: &Path,
	) -> Result<Response, Error> {
		let GetRequest {
			source,
			version,
			params,
		} = request;

		let wanted: &[CurrencyCode] = if params.currencies.is_empty() {
			&source.currencies
		} else {
			&params.currencies
		};

		info!("{}", fetching_message(wanted, &version, destination));

		let service = self.service(&source);
		let snapshot = service
			.at(cancel, &version.date, &source.currencies)
			.with_context(|| {
				format!(
					"unable to fetch rates for version {} from {}",
					version,
					service.base_url()
				)
			})?;

		debug!(
			"{} rates for {} {} as of {}",
			snapshot.rates.len(),
			snapshot.amount,
			snapshot.base,
			snapshot.date
		);

		if snapshot.date != version.date {
			if snapshot.date.before(&version.date) {
				debug!("Upstream substituted the earlier day {}", snapshot.date);
			}

			return Err(ResourceError::NotAvailable {
				requested: version.date,
				closest: snapshot.date,
			}
			.into());
		}

		if snapshot.rates.is_empty() {
			warn!("No rates were published on {}", version);
		}

		for code in wanted {
			if snapshot.rates.get(code).is_none() {
				warn!("{}", missing_message(code, &version, &snapshot.rates));
			}
		}

		let mut metadata = Vec::new();

		for (code, rate) in snapshot.rates.iter() {
			if !wanted.is_empty() && !wanted.contains(code) {
				continue;
			}

			// each code names a file directly inside the destination
			if !code.is_file_name_safe() {
				warn!(
					"Skipping currency {:?}; it is not usable as a file name",
					code.as_str()
				);
				continue;
			}

			let value = rate.to_string();
			let path = destination.join(code.as_str());

			fs::write(&path, &value).map_err(|source| ResourceError::Write {
				path: path.display().to_string(),
				source,
			})?;

			metadata.push(NameValuePair {
				name: code.to_string(),
				value,
			});
		}

		Ok(Response { version, metadata })
	}

	fn put(
		&self,
		_cancel: &Cancellation,
		request: PutRequest,
		source_dir: &Path,
	) -> Result<Response, Error> {
		info!("This resource does nothing on put");
		debug!(
			"Ignoring {} for {}",
			source_dir.display(),
			request.source.url
		);

		Ok(Response::default())
	}
}

/// The progress line of get, naming the currencies if there is a selection
fn fetching_message(
	wanted: &[CurrencyCode],
	version: &Version,
	destination: &Path,
) -> String {
	if wanted.is_empty() {
		return format!(
			"Fetching all exchange rates as of {} and placing them in {}",
			version,
			destination.display()
		);
	}

	let codes: Vec<&str> = wanted.iter().map(CurrencyCode::as_str).collect();
	format!(
		"Fetching exchange rates for [{}] as of {} and placing them in {}",
		codes.join(", "),
		version,
		destination.display()
	)
}

fn missing_message(
	code: &CurrencyCode,
	version: &Version,
	rates: &Rates,
) -> String {
	format!(
		"No rate for {} on {}; available currencies are {}",
		code,
		version,
		rates.currencies().join(", ")
	)
}
