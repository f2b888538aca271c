//! XML to `serde_json::Value` conversion.
//!
//! Elements become objects keyed by tag name, repeated tags become arrays and
//! text-only (or empty) elements become strings. Attributes are ignored and
//! the root element is unwrapped, so `<R><A>1</A></R>` yields `{"A": "1"}`.

use crate::error::ResponseError;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

struct Element {
    name: String,
    children: Map<String, Value>,
    text: String,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Map::new(),
            text: String::new(),
        }
    }

    fn into_value(self) -> Value {
        if self.children.is_empty() {
            Value::String(self.text)
        } else {
            Value::Object(self.children)
        }
    }
}

/// Convert an XML document to a JSON-like value.
pub fn xml_to_value(xml: &str) -> Result<Value, ResponseError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                stack.push(Element::new(name));
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
                close(&mut stack, &mut root, Element::new(name))?;
            }
            Ok(Event::Text(e)) => {
                let text = e.unescape().map_err(|e| malformed(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                close(&mut stack, &mut root, element)?;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(malformed(e.to_string())),
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(malformed("unclosed element".to_string()));
    }
    root.ok_or_else(|| malformed("no root element".to_string()))
}

fn close(
    stack: &mut [Element],
    root: &mut Option<Value>,
    element: Element,
) -> Result<(), ResponseError> {
    match stack.last_mut() {
        Some(parent) => {
            let name = element.name.clone();
            insert_child(&mut parent.children, name, element.into_value());
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element.into_value());
            Ok(())
        }
        None => Err(malformed("multiple root elements".to_string())),
    }
}

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

fn malformed(message: String) -> ResponseError {
    ResponseError::Deserialize {
        message: format!("malformed XML: {}", message),
    }
}
