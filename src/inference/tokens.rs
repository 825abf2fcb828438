//! Parse event vocabularies consumed by the walk engines

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};

use super::error::InferenceError;

/// A pull source of parse events for one document.
///
/// Sources return their end-of-stream token once exhausted; errors from the
/// underlying tokenizer propagate unchanged.
pub trait TokenSource {
    type Token;

    fn next_token(&mut self) -> Result<Self::Token, InferenceError>;
}

impl<S: TokenSource + ?Sized> TokenSource for &mut S {
    type Token = S::Token;

    fn next_token(&mut self) -> Result<Self::Token, InferenceError> {
        (**self).next_token()
    }
}

/// Token types that have an end-of-stream marker
pub trait StreamToken {
    fn end_of_stream() -> Self;
}

/// JSON parse events
#[derive(Debug, Clone, PartialEq)]
pub enum JsonToken {
    ObjectStart,
    ArrayStart,
    ObjectEnd,
    ArrayEnd,
    PropertyName(String),
    Null,
    Boolean(bool),
    /// Any signed or unsigned 64-bit integer
    Integer(i128),
    Float(f64),
    Date(DateTime<Utc>),
    String(String),
    /// Anything the walk does not understand (comments, raw values, ...)
    Unsupported(String),
    EndOfStream,
}

impl StreamToken for JsonToken {
    fn end_of_stream() -> Self {
        JsonToken::EndOfStream
    }
}

impl fmt::Display for JsonToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JsonToken::ObjectStart => write!(f, "ObjectStart"),
            JsonToken::ArrayStart => write!(f, "ArrayStart"),
            JsonToken::ObjectEnd => write!(f, "ObjectEnd"),
            JsonToken::ArrayEnd => write!(f, "ArrayEnd"),
            JsonToken::PropertyName(name) => write!(f, "PropertyName({name})"),
            JsonToken::Null => write!(f, "Null"),
            JsonToken::Boolean(_) => write!(f, "Boolean"),
            JsonToken::Integer(_) => write!(f, "Integer"),
            JsonToken::Float(_) => write!(f, "Float"),
            JsonToken::Date(_) => write!(f, "Date"),
            JsonToken::String(_) => write!(f, "String"),
            JsonToken::Unsupported(kind) => write!(f, "{kind}"),
            JsonToken::EndOfStream => write!(f, "EndOfStream"),
        }
    }
}

/// XML parse events
#[derive(Debug, Clone, PartialEq)]
pub enum XmlToken {
    ElementStart {
        namespace: Option<String>,
        local_name: String,
        /// Self-closing; no matching `ElementEnd` follows
        is_empty: bool,
        attributes: Vec<(String, String)>,
    },
    ElementEnd,
    Text(String),
    CData(String),
    Whitespace,
    /// Node kinds the walk does not handle (DOCTYPE, ...)
    Unsupported(String),
    EndOfStream,
}

impl StreamToken for XmlToken {
    fn end_of_stream() -> Self {
        XmlToken::EndOfStream
    }
}

impl fmt::Display for XmlToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlToken::ElementStart { local_name, .. } => write!(f, "ElementStart({local_name})"),
            XmlToken::ElementEnd => write!(f, "ElementEnd"),
            XmlToken::Text(_) => write!(f, "Text"),
            XmlToken::CData(_) => write!(f, "CData"),
            XmlToken::Whitespace => write!(f, "Whitespace"),
            XmlToken::Unsupported(kind) => write!(f, "{kind}"),
            XmlToken::EndOfStream => write!(f, "EndOfStream"),
        }
    }
}

/// A pre-built token list, handy for tests and for replaying captured streams
#[derive(Debug, Clone, Default)]
pub struct TokenBuffer<T> {
    tokens: VecDeque<T>,
}

impl<T> TokenBuffer<T> {
    pub fn new(tokens: impl IntoIterator<Item = T>) -> Self {
        Self {
            tokens: tokens.into_iter().collect(),
        }
    }

    pub fn push(&mut self, token: T) {
        self.tokens.push_back(token);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<T: StreamToken> TokenSource for TokenBuffer<T> {
    type Token = T;

    fn next_token(&mut self) -> Result<T, InferenceError> {
        Ok(self.tokens.pop_front().unwrap_or_else(T::end_of_stream))
    }
}

impl<T> FromIterator<T> for TokenBuffer<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter)
    }
}
