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
use crate::resource::euro_exchange_rates::EuroExchangeRates;
use crate::util::cancel::Cancellation;
use anyhow::{bail, Context, Error};
use clap::{Parser, ValueEnum};
use std::io;
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

mod error;
mod frankfurter;
mod http;
mod resource;
mod util;

#[derive(Parser)]
#[command(
	name = "euro-exchange-rates-resource",
	version,
	about = "Concourse resource for the ECB euro foreign exchange reference rates"
)]
struct Cli {
	// ----------------
	// -- POSITIONAL --
	// ----------------
	/// The resource verb; the request is read from stdin
	command: Directive,

	/// Destination directory for get, source directory for put
	#[arg(required = false)]
	directory: Option<String>,

	// -----------
	// -- FLAGS --
	// -----------
	/// Give up on the upstream service after this many seconds
	#[arg(long)]
	timeout: Option<u64>,
}

impl Cli {
	/// Extra validations on top of what clap does
	fn validate(&self) -> Result<(), Error> {
		if self.command != Directive::Check && self.directory.is_none() {
			bail!("A directory is required for get and put");
		}

		Ok(())
	}

	fn cancellation(&self) -> Cancellation {
		match self.timeout {
			Some(secs) => Cancellation::after(Duration::from_secs(secs)),
			None => Cancellation::never(),
		}
	}
}

#[derive(ValueEnum, Clone, Debug, PartialEq)]
enum Directive {
	Check, // list new versions

	#[value(alias = "in")]
	Get, // write a version to the directory

	#[value(alias = "out")]
	Put, // no-op
}

fn main() -> Result<(), Error> {
	// stdout carries the response, so everything else goes to stderr
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info")),
		)
		.with_writer(io::stderr)
		.without_time()
		.with_target(false)
		.init();

	let args = Cli::parse();
	args.validate()?;

	let cancel = args.cancellation();
	let client = http::transport::client()
		.context("unable to set up the HTTP client")?;
	let rates = EuroExchangeRates::new(client);

	let stdin = io::stdin().lock();
	let stdout = io::stdout().lock();
	let directory = Path::new(args.directory.as_deref().unwrap_or_default());

	match args.command {
		Directive::Check => {
			resource::concourse::check(&rates, &cancel, stdin, stdout)?
		},
		Directive::Get => resource::concourse::get(
			&rates, &cancel, stdin, stdout, directory,
		)?,
		Directive::Put => resource::concourse::put(
			&rates, &cancel, stdin, stdout, directory,
		)?,
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_directory_required_for_get_and_put() {
		for verb in ["get", "in", "put", "out"] {
			let cli = Cli::try_parse_from(["resource", verb]).unwrap();
			assert!(cli.validate().is_err(), "{} accepted", verb);

			let cli =
				Cli::try_parse_from(["resource", verb, "/tmp/build"]).unwrap();
			assert!(cli.validate().is_ok());
		}

		let cli = Cli::try_parse_from(["resource", "check"]).unwrap();
		assert!(cli.validate().is_ok());
	}

	#[test]
	fn test_verb_aliases() {
		let cli = Cli::try_parse_from(["resource", "in", "/tmp"]).unwrap();
		assert_eq!(cli.command, Directive::Get);

		let cli = Cli::try_parse_from(["resource", "out", "/tmp"]).unwrap();
		assert_eq!(cli.command, Directive::Put);

		assert!(Cli::try_parse_from(["resource", "fetch"]).is_err());
	}

	#[test]
	fn test_timeout() {
		let cli =
			Cli::try_parse_from(["resource", "check", "--timeout", "0"]).unwrap();
		assert!(cli.cancellation().is_cancelled());

		let cli = Cli::try_parse_from(["resource", "check"]).unwrap();
		assert!(!cli.cancellation().is_cancelled());
	}
}
