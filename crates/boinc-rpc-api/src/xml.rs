// Markup -> generic tree decoding
//
// GUI RPC bodies are attribute-free element/text markup. They are decoded
// into a `serde_json::Value` so endpoint code can pick fields by name and
// typed models can be produced with serde:
//
// - text-only element      -> `String` (entities unescaped, CDATA kept verbatim)
// - empty element          -> `""`
// - element with children  -> `Object`; text mixed with children goes to `#text`
// - repeated sibling names -> `Array` in document order
//
// Numbers stay strings; the consuming model parses them.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde_json::{Map, Value};

use crate::error::Error;

/// Key under which text is stored when an element also has children.
pub const TEXT_KEY: &str = "#text";

struct Frame {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Frame {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> (String, Value) {
        let value = if self.children.is_empty() {
            Value::String(self.text)
        } else {
            let mut children = self.children;
            if !self.text.is_empty() {
                children.insert(TEXT_KEY.into(), Value::String(self.text));
            }
            Value::Object(children)
        };
        (self.name, value)
    }
}

/// Insert a child, promoting to an array when the name repeats.
fn insert_child(children: &mut Map<String, Value>, name: String, value: Value) {
    match children.get_mut(&name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            children.insert(name, value);
        }
    }
}

/// Decode a markup document into `{ root_name: tree }`.
///
/// Exactly one root element is required. Mismatched, unclosed, or stray
/// tags are reported as [`Error::MalformedReply`].
pub fn parse_document(text: &str) -> Result<Map<String, Value>, Error> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let malformed = |message: String| Error::MalformedReply {
        message,
        body: text.to_owned(),
    };

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| malformed(format!("{e} at byte {}", reader.error_position())))?;

        match event {
            Event::Start(start) => {
                if root.is_some() && stack.is_empty() {
                    return Err(malformed("multiple root elements".into()));
                }
                let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
                stack.push(Frame::new(name));
            }
            Event::Empty(empty) => {
                let name = String::from_utf8_lossy(empty.name().as_ref()).into_owned();
                match stack.last_mut() {
                    Some(parent) => {
                        insert_child(&mut parent.children, name, Value::String(String::new()));
                    }
                    None if root.is_none() => root = Some((name, Value::String(String::new()))),
                    None => return Err(malformed("multiple root elements".into())),
                }
            }
            Event::Text(raw) => {
                let Some(frame) = stack.last_mut() else {
                    return Err(malformed("text outside of the root element".into()));
                };
                // Daemon text occasionally carries entities outside the XML
                // predefined set; keep those verbatim instead of failing.
                match raw.unescape() {
                    Ok(unescaped) => frame.text.push_str(&unescaped),
                    Err(_) => frame.text.push_str(&String::from_utf8_lossy(&raw)),
                }
            }
            Event::CData(cdata) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(String::from_utf8_lossy(&cdata).trim());
                }
            }
            Event::End(_) => {
                let Some(frame) = stack.pop() else {
                    return Err(malformed("unexpected closing tag".into()));
                };
                let (name, value) = frame.into_value();
                match stack.last_mut() {
                    Some(parent) => insert_child(&mut parent.children, name, value),
                    None => root = Some((name, value)),
                }
            }
            Event::Eof => break,
            Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unterminated element <{}>", open.name)));
    }

    let (name, value) = root.ok_or_else(|| malformed("no root element".into()))?;
    let mut doc = Map::new();
    doc.insert(name, value);
    Ok(doc)
}
