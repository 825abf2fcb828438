//! XML token source
//!
//! Wraps `quick-xml`'s namespace-aware reader and maps its events onto
//! [`XmlToken`]s. Declarations, comments and processing instructions are
//! skipped; DOCTYPE is surfaced as unsupported.

use std::fmt::Display;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::inference::{InferenceError, TokenSource, XmlToken};

fn xml_error(e: impl Display) -> InferenceError {
    InferenceError::XmlParse(e.to_string())
}

/// Token source over one XML document
pub struct XmlEventReader<R> {
    reader: NsReader<R>,
    buf: Vec<u8>,
    finished: bool,
}

impl<'a> XmlEventReader<&'a [u8]> {
    pub fn from_str(xml: &'a str) -> Self {
        Self::from_reader(xml.as_bytes())
    }
}

impl<R: BufRead> XmlEventReader<R> {
    pub fn from_reader(reader: R) -> Self {
        Self {
            reader: NsReader::from_reader(reader),
            buf: Vec::new(),
            finished: false,
        }
    }
}

impl<R: BufRead> TokenSource for XmlEventReader<R> {
    type Token = XmlToken;

    fn next_token(&mut self) -> Result<XmlToken, InferenceError> {
        loop {
            if self.finished {
                return Ok(XmlToken::EndOfStream);
            }

            self.buf.clear();
            let (resolved, event) = self
                .reader
                .read_resolved_event_into(&mut self.buf)?;

            let token = match event {
                Event::Start(ref start) => Some(element_start(resolved, start, false)?),
                Event::Empty(ref start) => Some(element_start(resolved, start, true)?),
                Event::End(_) => Some(XmlToken::ElementEnd),
                Event::Text(text) => {
                    let text = text.unescape().map_err(xml_error)?;
                    if text.trim().is_empty() {
                        Some(XmlToken::Whitespace)
                    } else {
                        Some(XmlToken::Text(text.into_owned()))
                    }
                }
                Event::CData(data) => {
                    let bytes = data.into_inner();
                    Some(XmlToken::CData(String::from_utf8_lossy(&bytes).to_string()))
                }
                Event::DocType(_) => Some(XmlToken::Unsupported("DocType".to_string())),
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) => None,
                Event::Eof => {
                    self.finished = true;
                    Some(XmlToken::EndOfStream)
                }
            };

            if let Some(token) = token {
                return Ok(token);
            }
        }
    }
}

fn element_start(
    resolved: ResolveResult<'_>,
    start: &BytesStart<'_>,
    is_empty: bool,
) -> Result<XmlToken, InferenceError> {
    let namespace = match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).to_string()),
        ResolveResult::Unbound => None,
        ResolveResult::Unknown(prefix) => {
            return Err(InferenceError::XmlParse(format!(
                "unknown namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            )));
        }
    };
    let local_name = String::from_utf8_lossy(start.local_name().as_ref()).to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value().map_err(xml_error)?.into_owned();
        attributes.push((key, value));
    }

    Ok(XmlToken::ElementStart {
        namespace,
        local_name,
        is_empty,
        attributes,
    })
}
