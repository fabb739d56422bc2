//! # Topic names.
//!
//! A [`Topic`] is the unit of subscription: a unique string such as
//! `"product.created"`. Topics must be registered with the engine before
//! anyone may subscribe to or publish on them.

use std::borrow::Cow;
use std::fmt;

/// Unique name of a stream of related events.
///
/// Cheap to clone for static names; `Topic::from_static` is `const` so
/// well-known topics can live in constants:
///
/// ```
/// use eventvisor::Topic;
///
/// const ORDER_CREATED: Topic = Topic::from_static("order.created");
/// assert_eq!(ORDER_CREATED.as_str(), "order.created");
/// assert_eq!(ORDER_CREATED, Topic::new(String::from("order.created")));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic(Cow<'static, str>);

impl Topic {
    /// Creates a topic from an owned or static name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Creates a topic from a static name in a `const` context.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the topic name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Topic {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Topic {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
