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
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;
use reqwest::{Method, StatusCode, Url};
use std::time::Duration;

/// An outbound request. Nothing we send has a body.
#[derive(Debug)]
pub struct HttpRequest {
	pub method: Method,
	pub url: Url,
	pub headers: HeaderMap,

	/// Upper bound for the whole exchange, derived from the caller's
	/// cancellation deadline
	pub timeout: Option<Duration>,
}

/// A response whose body has already been read in full, so it can be
/// inspected more than once.
#[derive(Debug)]
pub struct HttpResponse {
	pub status: StatusCode,
	pub headers: HeaderMap,
	pub body: Vec<u8>,
}

/// The single capability the rate service client needs from HTTP. Wrapping
/// an implementation is how behavior such as logging is added.
pub trait Transport {
	fn execute(
		&self,
		request: &HttpRequest,
	) -> Result<HttpResponse, reqwest::Error>;
}

// lets tests keep hold of the wrapped transport
#[cfg(test)]
impl<T: Transport + ?Sized> Transport for &T {
	fn execute(
		&self,
		request: &HttpRequest,
	) -> Result<HttpResponse, reqwest::Error> {
		(**self).execute(request)
	}
}

pub struct ReqwestTransport {
	client: Client,
}

impl ReqwestTransport {
	pub fn new(client: Client) -> Self {
		ReqwestTransport { client }
	}
}

impl Transport for ReqwestTransport {
	fn execute(
		&self,
		request: &HttpRequest,
	) -> Result<HttpResponse, reqwest::Error> {
		let mut builder = self
			.client
			.request(request.method.clone(), request.url.clone())
			.headers(request.headers.clone());

		if let Some(timeout) = request.timeout {
			builder = builder.timeout(timeout);
		}

		let response = builder.send()?;
		let status = response.status();
		let headers = response.headers().clone();
		let body = response.bytes()?.to_vec();

		Ok(HttpResponse {
			status,
			headers,
			body,
		})
	}
}

/// Builds the blocking client shared by all transports. reqwest applies a
/// 30 second timeout by default; we leave timing out to the caller.
pub fn client() -> Result<Client, reqwest::Error> {
	Client::builder().timeout(None::<Duration>).build()
}
