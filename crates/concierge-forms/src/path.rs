//! Field paths
//!
//! Every value, error and touched flag of a form is keyed by a [`FieldPath`]:
//! a tagged sequence of object keys and list indices. Dynamic collections
//! (FAQ rows, support channels) are addressed as `list.<index>.<field>` by
//! building the path from typed segments rather than concatenating strings.
//!
//! ## Example
//!
//! ```
//! use concierge_forms::FieldPath;
//!
//! let path = FieldPath::item("questionsAndAnswers", 1, "question");
//! assert_eq!(path.to_string(), "questionsAndAnswers.1.question");
//! assert_eq!(FieldPath::parse("questionsAndAnswers.1.question"), path);
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Highest list index a form path may address.
pub const MAX_LIST_INDEX: usize = 9_999;

/// One segment of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
	/// Named member of an object
	Key(String),
	/// Position inside a list
	Index(usize),
}

impl fmt::Display for PathSegment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			PathSegment::Key(key) => f.write_str(key),
			PathSegment::Index(index) => write!(f, "{}", index),
		}
	}
}

/// Typed path identifying one value inside a form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldPath {
	segments: Vec<PathSegment>,
}

impl FieldPath {
	/// Creates a path from its dotted form, same as [`FieldPath::parse`].
	///
	/// A path always equals the parse of its display string, so `"a.0"` can
	/// only ever name the `a` list's first row.
	pub fn new(key: impl Into<String>) -> Self {
		Self::parse(&key.into())
	}

	/// Creates an empty path (the form root).
	pub fn root() -> Self {
		Self::default()
	}

	/// Parses a dotted path. All-digit segments become list indices.
	///
	/// # Examples
	///
	/// ```
	/// use concierge_forms::{FieldPath, PathSegment};
	///
	/// let path = FieldPath::parse("channels.0.url");
	/// assert_eq!(
	///     path.segments(),
	///     &[
	///         PathSegment::Key("channels".to_string()),
	///         PathSegment::Index(0),
	///         PathSegment::Key("url".to_string()),
	///     ]
	/// );
	/// ```
	pub fn parse(path: &str) -> Self {
		let segments = path
			.split('.')
			.filter(|segment| !segment.is_empty())
			.map(|segment| match segment.parse::<usize>() {
				Ok(index) if segment.bytes().all(|b| b.is_ascii_digit()) => {
					PathSegment::Index(index)
				}
				_ => PathSegment::Key(segment.to_string()),
			})
			.collect();
		Self { segments }
	}

	/// Builds the path of one member of an indexed collection row.
	pub fn item(list: impl Into<String>, index: usize, field: impl Into<String>) -> Self {
		Self::new(list).index(index).key(field)
	}

	/// Appends a key; a dotted key appends each of its segments.
	pub fn key(mut self, key: impl Into<String>) -> Self {
		self.segments.extend(Self::parse(&key.into()).segments);
		self
	}

	/// Appends an index segment.
	pub fn index(mut self, index: usize) -> Self {
		self.segments.push(PathSegment::Index(index));
		self
	}

	pub fn segments(&self) -> &[PathSegment] {
		&self.segments
	}

	pub fn is_root(&self) -> bool {
		self.segments.is_empty()
	}

	/// Whether some index segment is above [`MAX_LIST_INDEX`].
	pub fn exceeds_list_limit(&self) -> bool {
		self.segments
			.iter()
			.any(|segment| matches!(segment, PathSegment::Index(index) if *index > MAX_LIST_INDEX))
	}

	/// Returns true if `prefix` is a leading run of this path's segments.
	pub fn starts_with(&self, prefix: &FieldPath) -> bool {
		self.segments.starts_with(&prefix.segments)
	}

	/// Returns the path without its last segment.
	pub fn parent(&self) -> Option<FieldPath> {
		let (_, rest) = self.segments.split_last()?;
		Some(Self {
			segments: rest.to_vec(),
		})
	}

	/// Returns the DOM-safe id used for labels (`id_channels-0-url`).
	pub fn html_id(&self) -> String {
		let joined = self
			.segments
			.iter()
			.map(|segment| segment.to_string())
			.collect::<Vec<_>>()
			.join("-");
		format!("id_{}", joined)
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, segment) in self.segments.iter().enumerate() {
			if i > 0 {
				f.write_str(".")?;
			}
			write!(f, "{}", segment)?;
		}
		Ok(())
	}
}

impl FromStr for FieldPath {
	type Err = Infallible;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Ok(Self::parse(s))
	}
}

impl From<&str> for FieldPath {
	fn from(path: &str) -> Self {
		Self::parse(path)
	}
}

impl From<String> for FieldPath {
	fn from(path: String) -> Self {
		Self::parse(&path)
	}
}

impl From<&FieldPath> for FieldPath {
	fn from(path: &FieldPath) -> Self {
		path.clone()
	}
}

impl Serialize for FieldPath {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for FieldPath {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		Ok(Self::parse(&raw))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	#[case("email", 1)]
	#[case("channels.0.url", 3)]
	#[case("a..b", 2)]
	#[case("", 0)]
	fn test_parse_segment_count(#[case] raw: &str, #[case] expected: usize) {
		assert_eq!(FieldPath::parse(raw).segments().len(), expected);
	}

	#[rstest]
	fn test_digit_segments_become_indices() {
		let path = FieldPath::parse("faq.12.answer");
		assert_eq!(path.segments()[1], PathSegment::Index(12));
	}

	#[rstest]
	fn test_signed_segment_stays_key() {
		let path = FieldPath::parse("offset.+1");
		assert_eq!(path.segments()[1], PathSegment::Key("+1".to_string()));
	}

	#[rstest]
	#[case("a.0")]
	#[case("assistant.name")]
	#[case("faq.3.answer")]
	fn test_constructors_agree_on_dotted_paths(#[case] raw: &str) {
		let built = FieldPath::new(raw);
		assert_eq!(built, FieldPath::from(raw));
		assert_eq!(FieldPath::root().key(raw), built);
		let json = serde_json::to_string(&built).unwrap();
		assert_eq!(serde_json::from_str::<FieldPath>(&json).unwrap(), built);
		assert_eq!(FieldPath::parse(&built.to_string()), built);
	}

	#[rstest]
	#[case("faq.9999.q", false)]
	#[case("faq.10000.q", true)]
	#[case("faq.18446744073709551615.q", true)]
	#[case("name", false)]
	fn test_list_limit(#[case] raw: &str, #[case] exceeds: bool) {
		assert_eq!(FieldPath::parse(raw).exceeds_list_limit(), exceeds);
	}

	#[rstest]
	fn test_item_display_round_trip() {
		let path = FieldPath::item("channels", 2, "url");
		assert_eq!(path.to_string(), "channels.2.url");
		assert_eq!(FieldPath::parse(&path.to_string()), path);
	}

	#[rstest]
	fn test_starts_with_and_parent() {
		let path = FieldPath::item("channels", 0, "url");
		assert!(path.starts_with(&FieldPath::new("channels")));
		assert!(!path.starts_with(&FieldPath::new("faq")));
		assert_eq!(path.parent(), Some(FieldPath::new("channels").index(0)));
		assert_eq!(FieldPath::root().parent(), None);
	}

	#[rstest]
	fn test_html_id() {
		assert_eq!(FieldPath::item("faq", 1, "question").html_id(), "id_faq-1-question");
	}

	#[rstest]
	fn test_serde_as_string() {
		let path = FieldPath::item("faq", 0, "answer");
		let json = serde_json::to_string(&path).unwrap();
		assert_eq!(json, "\"faq.0.answer\"");
		let back: FieldPath = serde_json::from_str(&json).unwrap();
		assert_eq!(back, path);
	}
}
