//! Strongly typed subject identifier returned by token verification.

// std
use std::{borrow::Borrow, ops::Deref};
// self
use crate::_prelude::*;

const SUBJECT_MAX_LEN: usize = 128;

/// Error returned when subject validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum SubjectError {
	/// The subject was empty.
	#[error("Subject identifier cannot be empty.")]
	Empty,
	/// The subject contains whitespace characters.
	#[error("Subject identifier contains whitespace.")]
	ContainsWhitespace,
	/// The subject exceeded the allowed character count.
	#[error("Subject identifier exceeds {max} characters.")]
	TooLong {
		/// Maximum permitted character count.
		max: usize,
	},
}

/// Identifier of the principal a refresh token belongs to, as reported by the token authority.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);
impl Subject {
	/// Creates a new subject after validation.
	pub fn new(value: impl AsRef<str>) -> Result<Self, SubjectError> {
		let view = value.as_ref();

		validate_view(view)?;

		Ok(Self(view.to_owned()))
	}
}
impl Deref for Subject {
	type Target = str;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
impl AsRef<str> for Subject {
	fn as_ref(&self) -> &str {
		&self.0
	}
}
impl Borrow<str> for Subject {
	fn borrow(&self) -> &str {
		&self.0
	}
}
impl From<Subject> for String {
	fn from(value: Subject) -> Self {
		value.0
	}
}
impl TryFrom<String> for Subject {
	type Error = SubjectError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		validate_view(&value)?;

		Ok(Self(value))
	}
}
impl FromStr for Subject {
	type Err = SubjectError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::new(s)
	}
}
impl Debug for Subject {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "Subject({})", self.0)
	}
}
impl Display for Subject {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(&self.0)
	}
}

fn validate_view(view: &str) -> Result<(), SubjectError> {
	if view.is_empty() {
		return Err(SubjectError::Empty);
	}
	if view.chars().any(char::is_whitespace) {
		return Err(SubjectError::ContainsWhitespace);
	}
	if view.len() > SUBJECT_MAX_LEN {
		return Err(SubjectError::TooLong { max: SUBJECT_MAX_LEN });
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn subjects_validate_on_construction() {
		assert_eq!(Subject::new(""), Err(SubjectError::Empty));
		assert_eq!(Subject::new("user 123"), Err(SubjectError::ContainsWhitespace));
		assert_eq!(Subject::new(" user123"), Err(SubjectError::ContainsWhitespace));

		let subject = Subject::new("user123").expect("Subject fixture should be valid.");

		assert_eq!(subject.as_ref(), "user123");
		assert_eq!(format!("{subject:?}"), "Subject(user123)");
	}

	#[test]
	fn length_limit_is_enforced() {
		let exact = "a".repeat(SUBJECT_MAX_LEN);

		Subject::new(&exact).expect("Exact length should succeed.");

		let too_long = "a".repeat(SUBJECT_MAX_LEN + 1);

		assert_eq!(Subject::new(&too_long), Err(SubjectError::TooLong { max: SUBJECT_MAX_LEN }));
	}

	#[test]
	fn serde_round_trip_enforces_validation() {
		let subject: Subject =
			serde_json::from_str("\"user-42\"").expect("Subject should deserialize.");

		assert_eq!(subject.as_ref(), "user-42");
		assert!(serde_json::from_str::<Subject>("\"with space\"").is_err());
	}
}
