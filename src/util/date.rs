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
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::{Europe::Berlin, Tz};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// The ECB reference rates are "usually updated at around 16:00 CET every
/// working day, except on TARGET closing days".
pub const PUBLICATION_HOUR: u32 = 16;

const DATE_FORMAT: &str = "%Y-%m-%d";

// chrono alone accepts unpadded months and days
static DATE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date pattern")
});

/// A day on which rates may be published, pinned to 16:00 in Frankfurt.
///
/// Since every value carries the same zone and hour, comparing the instants
/// is the same as comparing the calendar dates. The only way to get a
/// non-zero value is to parse a `YYYY-MM-DD` string.
///
/// The default value is the zero day, which stands for "no day given".
/// It sorts before every real day and renders as an empty string.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CalendarDay(Option<DateTime<Tz>>);

impl CalendarDay {
	pub fn is_zero(&self) -> bool {
		self.0.is_none()
	}

	/// The publication instant, or `None` for the zero day
	pub fn instant(&self) -> Option<&DateTime<Tz>> {
		self.0.as_ref()
	}

	pub fn before(&self, other: &CalendarDay) -> bool {
		self.instant() < other.instant()
	}
}

impl FromStr for CalendarDay {
	type Err = ResourceError;

	/// Parses a string in the strict "YYYY-MM-DD" format
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let invalid = || ResourceError::DateFormat(s.to_string());

		if !DATE_PATTERN.is_match(s) {
			return Err(invalid());
		}

		let date =
			NaiveDate::parse_from_str(s, DATE_FORMAT).map_err(|_| invalid())?;

		// 16:00 is never inside a DST transition, so this is always single
		let published = date
			.and_hms_opt(PUBLICATION_HOUR, 0, 0)
			.and_then(|local| Berlin.from_local_datetime(&local).single())
			.ok_or_else(invalid)?;

		Ok(CalendarDay(Some(published)))
	}
}

impl fmt::Display for CalendarDay {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0 {
			Some(published) => write!(f, "{}", published.format(DATE_FORMAT)),
			None => Ok(()),
		}
	}
}

impl Serialize for CalendarDay {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for CalendarDay {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = String::deserialize(deserializer)?;
		CalendarDay::from_str(&raw).map_err(serde::de::Error::custom)
	}
}
