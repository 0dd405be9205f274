//! Case-insensitive identity keys.
//!
//! Feature ids, extension ids, shape types and binding names all compare
//! without regard to case while keeping the spelling they were declared with.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string identity that compares, hashes and orders case-insensitively.
///
/// The original spelling is preserved for display and serialization; the
/// folded form is what equality sees. The empty key is valid and means
/// "unset" wherever an id is optional in practice.
#[derive(Clone)]
pub struct Key {
	raw: Box<str>,
	folded: Box<str>,
}

/// Identifier of a feature within an [`crate::ExtensionGraph`].
pub type FeatureId = Key;

/// Identifier of an extension (module or theme).
pub type ExtensionId = Key;

impl Key {
	/// Creates a key from any string-like value.
	pub fn new(raw: impl Into<Box<str>>) -> Self {
		let raw = raw.into();
		let folded = fold(&raw);
		Self { raw, folded }
	}

	/// Returns the key as originally spelled.
	pub fn as_str(&self) -> &str {
		&self.raw
	}

	/// Returns the case-folded form used for comparisons.
	pub fn folded(&self) -> &str {
		&self.folded
	}

	/// Returns true for the empty key.
	pub fn is_empty(&self) -> bool {
		self.raw.is_empty()
	}

	/// Compares against a plain string without allocating a key.
	pub fn matches(&self, other: &str) -> bool {
		if other.chars().any(char::is_uppercase) {
			*self.folded == *other.to_lowercase()
		} else {
			*self.folded == *other
		}
	}
}

fn fold(raw: &str) -> Box<str> {
	if raw.chars().any(char::is_uppercase) {
		raw.to_lowercase().into_boxed_str()
	} else {
		Box::from(raw)
	}
}

impl Default for Key {
	fn default() -> Self {
		Self::new("")
	}
}

impl PartialEq for Key {
	fn eq(&self, other: &Self) -> bool {
		self.folded == other.folded
	}
}

impl Eq for Key {}

impl PartialEq<str> for Key {
	fn eq(&self, other: &str) -> bool {
		self.matches(other)
	}
}

impl PartialEq<&str> for Key {
	fn eq(&self, other: &&str) -> bool {
		self.matches(other)
	}
}

impl Hash for Key {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.folded.hash(state);
	}
}

impl PartialOrd for Key {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for Key {
	fn cmp(&self, other: &Self) -> Ordering {
		self.folded.cmp(&other.folded)
	}
}

impl fmt::Debug for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		fmt::Debug::fmt(&*self.raw, f)
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.raw)
	}
}

impl From<&str> for Key {
	fn from(raw: &str) -> Self {
		Self::new(raw)
	}
}

impl From<String> for Key {
	fn from(raw: String) -> Self {
		Self::new(raw)
	}
}

impl From<&Key> for Key {
	fn from(key: &Key) -> Self {
		key.clone()
	}
}

impl AsRef<str> for Key {
	fn as_ref(&self) -> &str {
		&self.raw
	}
}

impl Serialize for Key {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.serialize_str(&self.raw)
	}
}

impl<'de> Deserialize<'de> for Key {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(Self::from)
	}
}
