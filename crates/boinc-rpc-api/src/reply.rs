use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::serde_helpers::one_or_many;
use crate::xml;

/// Root element of every daemon reply.
pub const REPLY_ROOT: &str = "boinc_gui_rpc_reply";

/// Decoded content of one `<boinc_gui_rpc_reply>`.
///
/// Keeps the generic tree; callers either pick fields by name or decode
/// a named element into a typed model.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    root: Map<String, Value>,
}

impl Reply {
    /// Parse a raw reply frame (without the sentinel).
    pub fn parse(body: &str) -> Result<Self, Error> {
        let mut doc = xml::parse_document(body)?;
        match doc.remove(REPLY_ROOT) {
            Some(Value::Object(root)) => Ok(Self { root }),
            // `<boinc_gui_rpc_reply/>` or a reply with only text content
            Some(Value::String(_)) => Ok(Self { root: Map::new() }),
            _ => Err(Error::MalformedReply {
                message: format!("root element is not <{REPLY_ROOT}>"),
                body: body.to_owned(),
            }),
        }
    }

    /// Build a reply from an already-decoded tree.
    pub fn from_map(root: Map<String, Value>) -> Self {
        Self { root }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.root.get(name)
    }

    /// Presence of a marker element such as `<success/>` or `<authorized/>`.
    pub fn has(&self, name: &str) -> bool {
        self.root.contains_key(name)
    }

    /// Text content of a direct child, `None` if absent or not text.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.root.get(name).and_then(Value::as_str)
    }

    /// Integer content of a direct child.
    ///
    /// Accepts float formatting (`"12.000000"`), which the daemon uses for
    /// some counters.
    pub fn int(&self, name: &str) -> Option<i64> {
        self.text(name).and_then(parse_int)
    }

    /// Daemon-supplied `<error>` text, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.text("error").filter(|s| !s.is_empty())
    }

    pub fn is_success(&self) -> bool {
        self.has("success")
    }

    /// Whether the daemon refused the request because the session is not
    /// authorized.
    pub fn is_unauthorized(&self) -> bool {
        self.has("unauthorized")
    }

    /// Require `<success/>`; otherwise surface the daemon's error text.
    pub fn require_success(&self) -> Result<(), Error> {
        if self.is_success() {
            return Ok(());
        }
        Err(Error::Rejected {
            message: self
                .error_message()
                .unwrap_or("request was not acknowledged")
                .to_owned(),
        })
    }

    /// Decode the named child into `T`.
    ///
    /// An empty element decodes as an empty object so models made of
    /// optional fields still decode.
    pub fn decode<T: DeserializeOwned>(&self, element: &str) -> Result<T, Error> {
        let value = self.element(element)?;
        let value = match value {
            Value::String(s) if s.is_empty() => Value::Object(Map::new()),
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|e| Error::Decode {
            element: element.to_owned(),
            message: e.to_string(),
        })
    }

    /// Decode `<container><item/>...</container>` into a list.
    ///
    /// An empty container yields an empty list; a single item yields one
    /// element.
    pub fn list<T: DeserializeOwned>(&self, container: &str, item: &str) -> Result<Vec<T>, Error> {
        let items = match self.element(container)? {
            Value::Object(children) => children.get(item).map(one_or_many).unwrap_or_default(),
            _ => Vec::new(),
        };
        items
            .into_iter()
            .map(|v| {
                serde_json::from_value(v).map_err(|e| Error::Decode {
                    element: format!("{container}/{item}"),
                    message: e.to_string(),
                })
            })
            .collect()
    }

    fn element(&self, element: &str) -> Result<&Value, Error> {
        self.root.get(element).ok_or_else(|| match self.error_message() {
            Some(message) => Error::Rejected {
                message: message.to_owned(),
            },
            None => Error::MissingElement {
                element: element.to_owned(),
            },
        })
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }
}

/// Parse integer text, tolerating the daemon's `%f` formatting of whole numbers.
#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
pub(crate) fn parse_int(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>().ok().or_else(|| {
        text.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .map(|f| f as i64)
    })
}
