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
use crate::resource::models::{
	validate_versions, CheckRequest, GetRequest, PutRequest, Response,
	Version,
};
use crate::util::cancel::Cancellation;
use anyhow::{Context, Error};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{Read, Write};
use std::path::Path;

/// The three verbs of a Concourse resource type.
///
/// Implementations see requests that were already decoded and validated;
/// the runners below validate what they return.
pub trait Resource {
	/// Lists the versions at or after the given one, newest first
	fn check(
		&self,
		cancel: &Cancellation,
		request: CheckRequest,
	) -> Result<Vec<Version>, Error>;

	/// Places the given version into `destination`
	fn get(
		&self,
		cancel: &Cancellation,
		request: GetRequest,
		destination: &Path,
	) -> Result<Response, Error>;

	/// Publishes from `source_dir`
	fn put(
		&self,
		cancel: &Cancellation,
		request: PutRequest,
		source_dir: &Path,
	) -> Result<Response, Error>;
}

pub fn check<R: Resource>(
	resource: &R,
	cancel: &Cancellation,
	stdin: impl Read,
	stdout: impl Write,
) -> Result<(), Error> {
	let request: CheckRequest = decode(stdin)?;
	request.validate().context("request is invalid")?;

	let versions = resource.check(cancel, request).context("check failed")?;
	validate_versions(&versions).context("response is invalid")?;

	encode(stdout, &versions)
}

pub fn get<R: Resource>(
	resource: &R,
	cancel: &Cancellation,
	stdin: impl Read,
	stdout: impl Write,
	destination: &Path,
) -> Result<(), Error> {
	let request: GetRequest = decode(stdin)?;
	request.validate().context("request is invalid")?;

	let response = resource
		.get(cancel, request, destination)
		.context("get failed")?;
	response.validate().context("response is invalid")?;

	encode(stdout, &response)
}

pub fn put<R: Resource>(
	resource: &R,
	cancel: &Cancellation,
	stdin: impl Read,
	stdout: impl Write,
	source_dir: &Path,
) -> Result<(), Error> {
	let request: PutRequest = decode(stdin)?;
	request.validate().context("request is invalid")?;

	let response = resource
		.put(cancel, request, source_dir)
		.context("put failed")?;
	response.validate().context("response is invalid")?;

	encode(stdout, &response)
}

fn decode<T: DeserializeOwned>(input: impl Read) -> Result<T, Error> {
	serde_json::from_reader(input).context("unable to decode request")
}

fn encode<T: Serialize>(mut output: impl Write, value: &T) -> Result<(), Error> {
	serde_json::to_writer(&mut output, value)
		.context("unable to encode response")?;
	writeln!(output).context("unable to write response")?;
	output.flush().context("unable to write response")?;
	Ok(())
}
