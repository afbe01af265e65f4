//! Identifiers
//!
//! Two identifier families live here:
//!
//! - [`TodoId`]: the identifier of a persisted todo. It is a 26 character,
//!   lowercase Crockford base32 rendering of a 128-bit UUIDv7 value, so it is
//!   universally unique and sorts lexically in creation order.
//! - [`RequestId`]: a TypeID (`req_<suffix>`) attached to every HTTP request
//!   for log correlation.
//!
//! # Ordering
//!
//! ```rust
//! use todo_service::ids::TodoId;
//!
//! let first = TodoId::new();
//! let second = TodoId::new();
//! assert!(first < second);
//! assert!(first.as_str() < second.as_str());
//! ```

use http::Request;
use mti::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};
use uuid::Uuid;

/// Crockford base32 alphabet, lowercase. ASCII order matches digit value.
const ALPHABET: &[u8; 32] = b"0123456789abcdefghjkmnpqrstvwxyz";

/// Encoded length of a 128-bit value (26 * 5 = 130 bits).
const ENCODED_LEN: usize = 26;

/// Last value handed out in this process.
static LAST_ISSUED: Mutex<u128> = Mutex::new(0);

/// Produce the next 128-bit identifier value.
///
/// Starts from a UUIDv7 (millisecond timestamp + random bits). If that
/// candidate does not exceed the last issued value, the last value plus one
/// is used instead, so values strictly increase for the life of the process.
fn next_value() -> u128 {
    let candidate = Uuid::now_v7().as_u128();
    let mut last = LAST_ISSUED.lock().unwrap_or_else(PoisonError::into_inner);
    let next = if candidate > *last {
        candidate
    } else {
        last.saturating_add(1)
    };
    *last = next;
    next
}

fn encode(value: u128) -> String {
    let mut out = [0u8; ENCODED_LEN];
    for (i, slot) in out.iter_mut().rev().enumerate() {
        let digit = ((value >> (5 * i)) & 0x1f) as usize;
        *slot = ALPHABET[digit];
    }
    // ALPHABET is pure ASCII
    out.iter().map(|&b| b as char).collect()
}

fn decode_digit(c: u8) -> Option<u128> {
    let c = c.to_ascii_lowercase();
    ALPHABET.iter().position(|&a| a == c).map(|p| p as u128)
}

fn decode(s: &str) -> Result<u128, TodoIdError> {
    if s.len() != ENCODED_LEN {
        return Err(TodoIdError::InvalidLength(s.len()));
    }
    let bytes = s.as_bytes();
    let value = bytes.iter().try_fold(0u128, |acc, &b| {
        decode_digit(b)
            .map(|d| (acc << 5) | d)
            .ok_or(TodoIdError::InvalidCharacter(b as char))
    })?;
    // The leading digit only carries the top 3 bits.
    if decode_digit(bytes[0]).is_some_and(|d| d > 7) {
        return Err(TodoIdError::Overflow);
    }
    Ok(value)
}

/// Identifier of a persisted todo.
///
/// Generated exactly once, when the todo is first created. Values generated
/// later in the process always compare greater, both as values and as
/// strings.
///
/// # Example
///
/// ```rust
/// use todo_service::ids::TodoId;
/// use std::str::FromStr;
///
/// let id = TodoId::new();
/// assert_eq!(id.as_str().len(), 26);
///
/// let parsed = TodoId::from_str(id.as_str()).unwrap();
/// assert_eq!(parsed, id);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TodoId(String);

impl TodoId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(encode(next_value()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Milliseconds since the Unix epoch embedded in the identifier.
    ///
    /// Approximates the creation time of the entity it names.
    #[must_use]
    pub fn timestamp_millis(&self) -> u64 {
        // Validated on construction; the fallback is unreachable.
        decode(&self.0).map(|v| (v >> 80) as u64).unwrap_or_default()
    }
}

impl Default for TodoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for TodoId {
    type Err = TodoIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = decode(s)?;
        Ok(Self(encode(value)))
    }
}

impl TryFrom<String> for TodoId {
    type Error = TodoIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TodoId> for String {
    fn from(id: TodoId) -> Self {
        id.0
    }
}

impl AsRef<str> for TodoId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Issues [`TodoId`] values for newly created todos.
///
/// Every generator shares the process-wide ordering guard, so any number of
/// them may be used concurrently.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Returns an identifier greater than any previously issued.
    pub fn generate(&self) -> TodoId {
        TodoId::new()
    }
}

/// Error type for todo id parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TodoIdError {
    /// Wrong number of characters.
    #[error("invalid todo id length: expected {ENCODED_LEN}, got {0}")]
    InvalidLength(usize),

    /// A character outside the Crockford base32 alphabet.
    #[error("invalid character in todo id: '{0}'")]
    InvalidCharacter(char),

    /// The encoded value does not fit in 128 bits.
    #[error("todo id exceeds 128 bits")]
    Overflow,
}

/// A type-safe request identifier for log correlation.
///
/// Request IDs follow the TypeID format `req_<base32-encoded-uuidv7>`,
/// e.g. `req_01h455vb4pex5vsknk084sn02q`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(MagicTypeId);

impl RequestId {
    /// The prefix used for request IDs
    pub const PREFIX: &'static str = "req";

    /// Creates a new time-sortable request ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Self::PREFIX.create_type_id::<V7>())
    }

    /// Returns the request ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the prefix portion of the ID.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.0.prefix().as_str()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RequestId {
    type Err = RequestIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mti = MagicTypeId::from_str(s).map_err(RequestIdError::Parse)?;

        if mti.prefix().as_str() != Self::PREFIX {
            return Err(RequestIdError::InvalidPrefix {
                expected: Self::PREFIX.to_string(),
                actual: mti.prefix().as_str().to_string(),
            });
        }

        Ok(Self(mti))
    }
}

/// Error type for request ID parsing.
#[derive(Debug, thiserror::Error)]
pub enum RequestIdError {
    /// The ID could not be parsed as a valid TypeID.
    #[error("failed to parse request ID: {0}")]
    Parse(#[from] MagicTypeIdError),

    /// The prefix was not the expected value.
    #[error("invalid prefix: expected '{expected}', got '{actual}'")]
    InvalidPrefix {
        /// The expected prefix.
        expected: String,
        /// The actual prefix found.
        actual: String,
    },
}

/// `MakeRequestId` implementation handing out [`RequestId`]s to tower-http.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeTypedRequestId;

impl MakeRequestId for MakeTypedRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let id = RequestId::new();
        let header_value = http::HeaderValue::from_str(id.as_str()).ok()?;
        Some(TowerRequestId::new(header_value))
    }
}
