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
use std::time::{Duration, Instant};

/// Bounds how long the single upstream call of an invocation may take.
///
/// The caller decides the policy; nothing in this crate times out on its
/// own. An expired token stops a request from being issued, and the time
/// left is handed to the transport so an in-flight request is aborted once
/// the deadline passes.
#[derive(Clone, Copy, Debug)]
pub struct Cancellation {
	deadline: Option<Instant>,
}

impl Cancellation {
	pub fn never() -> Self {
		Self { deadline: None }
	}

	pub fn after(timeout: Duration) -> Self {
		Self {
			deadline: Some(Instant::now() + timeout),
		}
	}

	pub fn is_cancelled(&self) -> bool {
		self.deadline
			.is_some_and(|deadline| Instant::now() >= deadline)
	}

	/// Time left until the deadline; `None` if there is no deadline.
	pub fn remaining(&self) -> Option<Duration> {
		self.deadline
			.map(|deadline| deadline.saturating_duration_since(Instant::now()))
	}

	pub fn check(&self) -> Result<(), ResourceError> {
		if self.is_cancelled() {
			return Err(ResourceError::Cancelled);
		}
		Ok(())
	}
}
