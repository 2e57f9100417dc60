//! qbXML document encoding and decoding.
//!
//! Requests are wrapped in the standard envelope:
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <?qbxml version="13.0"?>
//! <QBXML><QBXMLMsgsRq onError="stopOnError"> ... </QBXMLMsgsRq></QBXML>
//! ```
//!
//! All text and attribute values are escaped by the writer.

use std::io::Write;

use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::element::Element;
use super::error::ProtocolError;
use super::message::{Request, Response};

/// qbXML specification version sent in the processing instruction.
pub const QBXML_VERSION: &str = "13.0";

const ROOT: &str = "QBXML";
const REQUEST_SET: &str = "QBXMLMsgsRq";
const RESPONSE_SET: &str = "QBXMLMsgsRs";

/// Encodes a request into a complete qbXML document.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn encode_request(request: &Request) -> Result<String, ProtocolError> {
    let set = BytesStart::new(REQUEST_SET).with_attributes([("onError", "stopOnError")]);
    write_document(set, request.element())
}

/// Encodes a response into a complete qbXML document.
///
/// # Errors
///
/// Returns an error if the writer fails.
pub fn encode_response(response: &Response) -> Result<String, ProtocolError> {
    let status = response.status_code.to_string();
    let mut body = response.body.clone();
    body.attributes.retain(|(k, _)| {
        !matches!(k.as_str(), "statusCode" | "statusSeverity" | "statusMessage")
    });
    body.attributes.push(("statusCode".into(), status));
    body.attributes
        .push(("statusSeverity".into(), response.severity.clone()));
    body.attributes
        .push(("statusMessage".into(), response.message.clone()));
    write_document(BytesStart::new(RESPONSE_SET), &body)
}

/// Decodes the single request message of a request document.
///
/// # Errors
///
/// Returns an error if the document is malformed or carries no request.
pub fn decode_request(xml: &str) -> Result<Request, ProtocolError> {
    let root = parse(xml)?;
    let element = root
        .child(REQUEST_SET)
        .and_then(|set| set.children.first())
        .cloned()
        .ok_or_else(|| ProtocolError::missing("request", REQUEST_SET))?;
    let name = element.name.clone();
    Request::from_element(element).ok_or_else(|| ProtocolError::missing(&name, "Rq suffix"))
}

/// Decodes the `{operation}Rs` message of a response document.
///
/// # Errors
///
/// Returns an error if the document is malformed, the response element is
/// absent, or its status code is not numeric.
pub fn decode_response(operation: &str, xml: &str) -> Result<Response, ProtocolError> {
    let root = parse(xml)?;
    let element_name = format!("{operation}Rs");
    let body = root
        .child(RESPONSE_SET)
        .ok_or_else(|| ProtocolError::missing(operation, RESPONSE_SET))?
        .child(&element_name)
        .cloned()
        .ok_or_else(|| ProtocolError::missing(operation, &element_name))?;

    let raw_status = body.attr("statusCode");
    let status_code = raw_status
        .and_then(|s| s.trim().parse::<i32>().ok())
        .ok_or_else(|| ProtocolError::InvalidStatus {
            operation: operation.to_string(),
            value: raw_status.map(str::to_string),
        })?;

    Ok(Response {
        operation: operation.to_string(),
        status_code,
        severity: body.attr("statusSeverity").unwrap_or_default().to_string(),
        message: body.attr("statusMessage").unwrap_or_default().to_string(),
        body,
    })
}

/// Parses an XML document into its root element.
///
/// Declarations, processing instructions and comments are skipped.
///
/// # Errors
///
/// Returns an error if the document is not well-formed.
pub fn parse(xml: &str) -> Result<Element, ProtocolError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event().map_err(ProtocolError::parse)? {
            Event::Start(e) => stack.push(open_element(&e)?),
            Event::Empty(e) => {
                let element = open_element(&e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                let text = t.unescape().map_err(ProtocolError::parse)?;
                push_text(&mut stack, &text);
            }
            Event::CData(c) => {
                let text = std::str::from_utf8(&c).map_err(ProtocolError::parse)?;
                push_text(&mut stack, text);
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ProtocolError::Parse("unexpected closing tag".into()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ProtocolError::Parse(format!("unclosed element {}", open.name)));
    }
    let root = root.ok_or_else(|| ProtocolError::Parse("empty document".into()))?;
    if root.name != ROOT {
        return Err(ProtocolError::Parse(format!(
            "expected root element {ROOT}, found {}",
            root.name
        )));
    }
    Ok(root)
}

fn open_element(e: &BytesStart<'_>) -> Result<Element, ProtocolError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(ProtocolError::parse)?
        .to_string();
    let mut element = Element::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(ProtocolError::parse)?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(ProtocolError::parse)?
            .to_string();
        let value = attr.unescape_value().map_err(ProtocolError::parse)?.into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn push_text(stack: &mut [Element], text: &str) {
    if let Some(top) = stack.last_mut() {
        top.text.get_or_insert_with(String::new).push_str(text);
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), ProtocolError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ProtocolError::Parse("multiple root elements".into()));
    }
    *root = Some(element);
    Ok(())
}

fn write_document(set: BytesStart<'_>, message: &Element) -> Result<String, ProtocolError> {
    let mut writer = Writer::new(Vec::new());

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(ProtocolError::write)?;
    writer
        .write_event(Event::PI(BytesPI::new(format!(
            "qbxml version=\"{QBXML_VERSION}\""
        ))))
        .map_err(ProtocolError::write)?;
    writer
        .write_event(Event::Start(BytesStart::new(ROOT)))
        .map_err(ProtocolError::write)?;

    let set_name = String::from_utf8_lossy(set.name().as_ref()).into_owned();
    writer
        .write_event(Event::Start(set))
        .map_err(ProtocolError::write)?;
    write_element(&mut writer, message)?;
    writer
        .write_event(Event::End(BytesEnd::new(set_name)))
        .map_err(ProtocolError::write)?;
    writer
        .write_event(Event::End(BytesEnd::new(ROOT)))
        .map_err(ProtocolError::write)?;

    String::from_utf8(writer.into_inner()).map_err(ProtocolError::write)
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &Element) -> Result<(), ProtocolError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.text.is_none() && element.children.is_empty() {
        return writer
            .write_event(Event::Empty(start))
            .map_err(ProtocolError::write);
    }

    writer
        .write_event(Event::Start(start))
        .map_err(ProtocolError::write)?;
    if let Some(text) = &element.text {
        writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(ProtocolError::write)?;
    }
    for child in &element.children {
        write_element(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(ProtocolError::write)
}
