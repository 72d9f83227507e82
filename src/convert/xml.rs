//! XML to JSON conversion.
//!
//! Elements map to JSON the same way common XML-to-dict converters do:
//!
//! - attributes become `@name` keys
//! - text next to attributes or child elements becomes `#text`
//! - an element with only text becomes a string, an empty one `null`
//! - repeated sibling elements collapse into an array
//!
//! The result is an object with the root element's name as its only key.

use crate::core::errors::{AuditError, AuditResult};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

#[derive(Debug, Default)]
struct Element {
    name: String,
    fields: Map<String, Value>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> AuditResult<Self> {
        let mut element = Element {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Default::default()
        };
        for attr in start.attributes() {
            let attr = attr.map_err(|e| AuditError::conversion("xml", "malformed attribute", e))?;
            let key = format!("@{}", String::from_utf8_lossy(attr.key.as_ref()));
            let value = attr
                .unescape_value()
                .map_err(|e| AuditError::conversion("xml", "malformed attribute value", e))?;
            element.fields.insert(key, Value::String(value.into_owned()));
        }
        Ok(element)
    }

    fn close(self) -> (String, Value) {
        let value = if self.fields.is_empty() {
            if self.text.is_empty() {
                Value::Null
            } else {
                Value::String(self.text)
            }
        } else {
            let mut fields = self.fields;
            if !self.text.is_empty() {
                fields.insert("#text".to_string(), Value::String(self.text));
            }
            Value::Object(fields)
        };
        (self.name, value)
    }

    fn push_child(&mut self, name: String, value: Value) {
        match self.fields.get_mut(&name) {
            Some(Value::Array(siblings)) => siblings.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.fields.insert(name, value);
            }
        }
    }
}

/// Converts an XML document into a JSON object.
pub fn xml_to_json(bytes: &[u8]) -> AuditResult<Value> {
    let mut reader = Reader::from_reader(bytes);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<(String, Value)> = None;
    let mut buf = Vec::new();

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            AuditError::conversion(
                "xml",
                format!("parse error at byte {}", reader.buffer_position()),
                e,
            )
        })?;

        match event {
            Event::Start(start) => stack.push(Element::open(&start)?),
            Event::Empty(start) => {
                let (name, value) = Element::open(&start)?.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| AuditError::conversion("xml", "malformed text", e))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&data));
                }
            }
            Event::End(_) => {
                let Some(element) = stack.pop() else {
                    return Err(malformed("closing tag without matching opening tag"));
                };
                let (name, value) = element.close();
                attach(&mut stack, &mut root, name, value)?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(malformed("document ended inside an element"));
    }
    let (name, value) = root.ok_or_else(|| malformed("document has no root element"))?;

    let mut document = Map::with_capacity(1);
    document.insert(name, value);
    Ok(Value::Object(document))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<(String, Value)>,
    name: String,
    value: Value,
) -> AuditResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_child(name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => return Err(malformed("document has more than one root element")),
    }
    Ok(())
}

fn malformed(message: &str) -> AuditError {
    AuditError::conversion(
        "xml",
        message.to_string(),
        std::io::Error::new(std::io::ErrorKind::InvalidData, message.to_string()),
    )
}
