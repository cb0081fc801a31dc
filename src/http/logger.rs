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
use crate::http::transport::{HttpRequest, HttpResponse, Transport};
use reqwest::header::HeaderMap;
use std::cell::RefCell;
use std::io::{self, Write};
use tracing::warn;

/// Decorates a transport with a transcript of every exchange, written to
/// the given sink. Request lines are prefixed with `>` and response lines
/// with `<`, followed by the raw response body.
///
/// The response handed back is the one from the wrapped transport; its
/// body is already buffered, so the caller can still decode it.
pub struct RequestResponseLogger<T, W> {
	inner: T,
	writer: RefCell<W>,
}

impl<T: Transport, W: Write> RequestResponseLogger<T, W> {
	pub fn new(inner: T, writer: W) -> Self {
		RequestResponseLogger {
			inner,
			writer: RefCell::new(writer),
		}
	}
}

impl<T: Transport, W: Write> Transport for RequestResponseLogger<T, W> {
	fn execute(
		&self,
		request: &HttpRequest,
	) -> Result<HttpResponse, reqwest::Error> {
		let mut writer = self.writer.borrow_mut();

		// the transcript is a side channel; losing it must not fail the call
		if let Err(e) = dump_request(&mut *writer, request) {
			warn!("unable to log request: {}", e);
		}

		let response = self.inner.execute(request)?;

		if let Err(e) = dump_response(&mut *writer, &response) {
			warn!("unable to log response: {}", e);
		}

		Ok(response)
	}
}

fn dump_request(w: &mut impl Write, request: &HttpRequest) -> io::Result<()> {
	writeln!(w, "> {} {}", request.method, request.url)?;
	dump_headers(w, ">", &request.headers)
	// we don't send a body; no need to log it
}

fn dump_response(w: &mut impl Write, response: &HttpResponse) -> io::Result<()> {
	writeln!(w, "< {}", response.status.as_u16())?;
	dump_headers(w, "<", &response.headers)?;
	w.write_all(&response.body)?;
	writeln!(w)?;
	w.flush()
}

fn dump_headers(
	w: &mut impl Write,
	prefix: &str,
	headers: &HeaderMap,
) -> io::Result<()> {
	for name in headers.keys() {
		let values: Vec<String> = headers
			.get_all(name)
			.iter()
			.map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
			.collect();
		writeln!(w, "{} {}: {}", prefix, name, values.join(", "))?;
	}
	Ok(())
}
