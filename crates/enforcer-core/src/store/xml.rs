//! XML codec for the computer inventory record.
//!
//! Reads the value of `//extension_attribute[name="<attribute>"]/value` and
//! builds the minimal document used to overwrite it.

use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::config::AttributeConfigEntry;
use crate::error::StoreError;
use crate::types::SnoozeCount;

const EXTENSION_ATTRIBUTE: &[u8] = b"extension_attribute";
const NAME: &[u8] = b"name";
const VALUE: &[u8] = b"value";

#[derive(Debug, Default)]
struct Candidate {
    depth: usize,
    name: String,
    value: String,
}

/// Find the text of the named extension attribute's `value` element.
///
/// Returns `Ok(None)` when no extension attribute carries that name and
/// `Err(StoreError::Unavailable)` when the document is not well-formed or
/// has no root element.
pub fn find_attribute_value(
    document: &str,
    attribute_name: &str,
) -> Result<Option<String>, StoreError> {
    let mut reader = Reader::from_str(document);
    reader.config_mut().trim_text(true);

    let mut path: Vec<Vec<u8>> = Vec::new();
    let mut candidate: Option<Candidate> = None;
    let mut has_root = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| StoreError::Unavailable(format!("malformed computer record: {}", e)))?;

        match event {
            Event::Start(start) => {
                has_root = true;
                let name = start.name().as_ref().to_vec();
                if name == EXTENSION_ATTRIBUTE && candidate.is_none() {
                    candidate = Some(Candidate {
                        depth: path.len() + 1,
                        ..Candidate::default()
                    });
                }
                path.push(name);
            }
            Event::End(_) => {
                let closed_depth = path.len();
                path.pop();
                if let Some(current) = candidate.take_if(|c| c.depth == closed_depth) {
                    if current.name.trim() == attribute_name {
                        return Ok(Some(current.value.trim().to_string()));
                    }
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| {
                    StoreError::Unavailable(format!("malformed computer record: {}", e))
                })?;
                append_field(&mut candidate, &path, &text);
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                append_field(&mut candidate, &path, &String::from_utf8_lossy(&bytes));
            }
            Event::Empty(_) => has_root = true,
            Event::Eof => {
                if !has_root {
                    return Err(StoreError::Unavailable(
                        "malformed computer record: no root element".to_string(),
                    ));
                }
                if !path.is_empty() {
                    return Err(StoreError::Unavailable(
                        "malformed computer record: document ended inside an element".to_string(),
                    ));
                }
                return Ok(None);
            }
            _ => {}
        }
    }
}

fn append_field(candidate: &mut Option<Candidate>, path: &[Vec<u8>], text: &str) {
    let Some(current) = candidate.as_mut() else {
        return;
    };
    // Only direct children of the extension attribute count.
    if path.len() != current.depth + 1 {
        return;
    }
    match path.last().map(Vec::as_slice) {
        Some(NAME) => current.name.push_str(text),
        Some(VALUE) => current.value.push_str(text),
        _ => {}
    }
}

/// Read the snooze counter out of a computer record.
pub fn decode_counter(document: &str, attribute_name: &str) -> Result<SnoozeCount, StoreError> {
    let raw = find_attribute_value(document, attribute_name)?.ok_or_else(|| {
        StoreError::MalformedCounter {
            raw: String::new(),
        }
    })?;
    parse_counter(&raw)
}

/// Parse counter text. Anything but an integer is malformed.
pub fn parse_counter(raw: &str) -> Result<SnoozeCount, StoreError> {
    raw.trim()
        .parse::<SnoozeCount>()
        .map_err(|_| StoreError::MalformedCounter {
            raw: raw.to_string(),
        })
}

/// Document that overwrites the counter attribute with `count`.
pub fn encode_counter(attribute: &AttributeConfigEntry, count: SnoozeCount) -> String {
    format!(
        "<computer><extension_attributes><extension_attribute>\
         <id>{}</id><name>{}</name><type>Integer</type><value>{}</value>\
         </extension_attribute></extension_attributes></computer>",
        attribute.id,
        escape(attribute.name.as_str()),
        count
    )
}
