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
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

/// Currency identifier as used by the service, e.g. "USD". Compared
/// case-sensitively.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
	// codes only ever arrive through serde outside of tests
	#[cfg(test)]
	pub fn new(code: impl Into<String>) -> Self {
		CurrencyCode(code.into())
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	/// Whether the code can be used as-is as the name of a file inside a
	/// directory, without naming the directory itself or leaving it.
	pub fn is_file_name_safe(&self) -> bool {
		!matches!(self.0.as_str(), "" | "." | "..")
			&& !self.0.contains(['/', '\\', '\0'])
	}
}

impl fmt::Display for CurrencyCode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// The rates of a single day, kept in the order the service listed them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rates(Vec<(CurrencyCode, f32)>);

impl Rates {
	pub fn get(&self, currency: &CurrencyCode) -> Option<f32> {
		self.0
			.iter()
			.find(|(code, _)| code == currency)
			.map(|(_, rate)| *rate)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, f32)> {
		self.0.iter().map(|(code, rate)| (code, *rate))
	}

	pub fn currencies(&self) -> Vec<&str> {
		self.0.iter().map(|(code, _)| code.as_str()).collect()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

impl<'de> Deserialize<'de> for Rates {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		deserializer.deserialize_map(RatesVisitor)
	}
}

struct RatesVisitor;

impl<'de> Visitor<'de> for RatesVisitor {
	type Value = Rates;

	fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
		write!(f, "a map of currency codes to rates")
	}

	fn visit_map<A>(self, mut map: A) -> Result<Rates, A::Error>
	where
		A: MapAccess<'de>,
	{
		let mut rates: Vec<(CurrencyCode, f32)> =
			Vec::with_capacity(map.size_hint().unwrap_or(0));

		while let Some((code, rate)) = map.next_entry::<CurrencyCode, f32>()? {
			// a repeated currency replaces the earlier rate, as in a map
			match rates.iter_mut().find(|(c, _)| *c == code) {
				Some(existing) => existing.1 = rate,
				None => rates.push((code, rate)),
			}
		}

		Ok(Rates(rates))
	}
}

/// Rates of all days in a history, ordered by day.
#[derive(Debug, Default)]
pub struct RatesAt(BTreeMap<CalendarDay, Rates>);

impl RatesAt {
	pub fn days(&self) -> impl Iterator<Item = &CalendarDay> {
		self.0.keys()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// The service keys each day's rates by its date as a string. The keys are
/// read as strings first and then parsed one by one; a single bad key fails
/// the whole history.
impl<'de> Deserialize<'de> for RatesAt {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = HashMap::<String, Rates>::deserialize(deserializer)?;

		let mut rates = BTreeMap::new();
		for (key, day_rates) in raw {
			let day = CalendarDay::from_str(&key)
				.map_err(serde::de::Error::custom)?;
			rates.insert(day, day_rates);
		}

		Ok(RatesAt(rates))
	}
}

/// Rates of a single day, as returned for `/latest` and `/{date}`.
#[derive(Debug, Deserialize)]
pub struct ExchangeRates {
	pub amount: f32,
	pub base: CurrencyCode,
	pub date: CalendarDay,
	pub rates: Rates,
}

/// Rates over a range of days, as returned for `/{date}..`.
#[derive(Debug, Deserialize)]
pub struct History {
	pub amount: f32,
	pub base: CurrencyCode,

	#[serde(rename = "start_date")]
	pub start: CalendarDay,

	#[serde(rename = "end_date")]
	pub end: CalendarDay,

	pub rates: RatesAt,
}

#[cfg(test)]
mod tests {
	use super::*;

	fn day(s: &str) -> CalendarDay {
		CalendarDay::from_str(s).unwrap()
	}

	#[test]
	fn test_file_name_safe_codes() {
		for code in ["USD", "SEK", "usd", "X.Y"] {
			assert!(CurrencyCode::new(code).is_file_name_safe(), "{}", code);
		}

		for code in ["", ".", "..", "../USD", "/tmp/USD", "US\\D", "US\0D"] {
			assert!(!CurrencyCode::new(code).is_file_name_safe(), "{}", code);
		}
	}

	#[test]
	fn test_exchange_rates_keep_response_order() {
		let rates: ExchangeRates = serde_json::from_str(
			r#"{
				"amount": 1.0,
				"base": "EUR",
				"date": "2024-01-15",
				"rates": { "SEK": 11.3215, "USD": 1.0882, "THB": 38.522 }
			}"#,
		)
		.unwrap();

		assert_eq!(rates.amount, 1.0);
		assert_eq!(rates.base, CurrencyCode::new("EUR"));
		assert_eq!(rates.date, day("2024-01-15"));
		assert_eq!(rates.rates.currencies(), vec!["SEK", "USD", "THB"]);
		assert_eq!(rates.rates.get(&CurrencyCode::new("USD")), Some(1.0882));
		assert_eq!(rates.rates.get(&CurrencyCode::new("usd")), None);
	}

	#[test]
	fn test_repeated_currency_replaces_rate() {
		let rates: Rates =
			serde_json::from_str(r#"{ "USD": 1.0, "SEK": 11.0, "USD": 1.5 }"#)
				.unwrap();

		assert_eq!(rates.len(), 2);
		assert_eq!(rates.currencies(), vec!["USD", "SEK"]);
		assert_eq!(rates.get(&CurrencyCode::new("USD")), Some(1.5));
	}

	#[test]
	fn test_rates_must_be_numbers() {
		assert!(serde_json::from_str::<Rates>(r#"{ "USD": "1.0" }"#).is_err());
		assert!(serde_json::from_str::<Rates>(r#"[1.0]"#).is_err());
	}

	#[test]
	fn test_history() {
		let history: History = serde_json::from_str(
			r#"{
				"amount": 1.0,
				"base": "EUR",
				"start_date": "2024-01-15",
				"end_date": "2024-01-17",
				"rates": {
					"2024-01-17": { "FOO": 7.4574, "BAR": 1.0872 },
					"2024-01-15": { "FOO": 7.4575, "BAR": 1.0887 },
					"2024-01-16": { "FOO": 7.4585, "BAR": 1.089 }
				}
			}"#,
		)
		.unwrap();

		assert_eq!(history.start, day("2024-01-15"));
		assert_eq!(history.end, day("2024-01-17"));
		assert_eq!(history.rates.len(), 3);

		let days: Vec<String> =
			history.rates.days().map(|d| d.to_string()).collect();
		assert_eq!(days, vec!["2024-01-15", "2024-01-16", "2024-01-17"]);

		let middle = &history.rates.0[&day("2024-01-16")];
		assert_eq!(middle.get(&CurrencyCode::new("BAR")), Some(1.089));
	}

	#[test]
	fn test_history_with_bad_key_fails() {
		let err = serde_json::from_str::<RatesAt>(
			r#"{
				"2024-01-15": { "FOO": 7.4575 },
				"2024-1-16": { "FOO": 7.4585 }
			}"#,
		)
		.unwrap_err()
		.to_string();

		assert!(err.contains("'2024-1-16'"), "{}", err);
	}
}
