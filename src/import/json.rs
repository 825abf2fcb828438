//! JSON token source
//!
//! Parses a document with `serde_json` and replays it as a depth-first stream
//! of [`JsonToken`]s.

use std::collections::VecDeque;
use std::io::Read;

use serde_json::{Deserializer, Value};

use crate::inference::{InferenceError, JsonToken, TokenSource};

/// Token source over one parsed JSON document
#[derive(Debug, Clone)]
pub struct JsonValueReader {
    tokens: VecDeque<JsonToken>,
}

impl JsonValueReader {
    /// Tokenize an already parsed value
    pub fn from_value(value: &Value) -> Self {
        let mut tokens = VecDeque::new();
        flatten(value, &mut tokens);
        Self { tokens }
    }

    /// Parse a single JSON document from text
    pub fn from_str(json: &str) -> Result<Self, InferenceError> {
        let value: Value = serde_json::from_str(json)?;
        Ok(Self::from_value(&value))
    }

    /// Parse a single JSON document from a reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, InferenceError> {
        let value: Value = serde_json::from_reader(reader)?;
        Ok(Self::from_value(&value))
    }

    /// Tokens not yet consumed, excluding the end-of-stream marker
    pub fn remaining(&self) -> usize {
        self.tokens.len()
    }
}

impl TokenSource for JsonValueReader {
    type Token = JsonToken;

    fn next_token(&mut self) -> Result<JsonToken, InferenceError> {
        Ok(self.tokens.pop_front().unwrap_or(JsonToken::EndOfStream))
    }
}

/// Split concatenated or newline-delimited JSON into its documents
pub fn json_documents(text: &str) -> Result<Vec<Value>, InferenceError> {
    Deserializer::from_str(text)
        .into_iter::<Value>()
        .map(|document| document.map_err(InferenceError::from))
        .collect()
}

fn flatten(value: &Value, tokens: &mut VecDeque<JsonToken>) {
    match value {
        Value::Null => tokens.push_back(JsonToken::Null),
        Value::Bool(b) => tokens.push_back(JsonToken::Boolean(*b)),
        Value::Number(n) => {
            let token = match (n.as_i64(), n.as_u64(), n.as_f64()) {
                (Some(i), _, _) => JsonToken::Integer(i.into()),
                (None, Some(u), _) => JsonToken::Integer(u.into()),
                (None, None, Some(f)) => JsonToken::Float(f),
                // Arbitrary precision numbers only; keep the text
                (None, None, None) => JsonToken::String(n.to_string()),
            };
            tokens.push_back(token);
        }
        Value::String(s) => tokens.push_back(JsonToken::String(s.clone())),
        Value::Array(items) => {
            tokens.push_back(JsonToken::ArrayStart);
            for item in items {
                flatten(item, tokens);
            }
            tokens.push_back(JsonToken::ArrayEnd);
        }
        Value::Object(map) => {
            tokens.push_back(JsonToken::ObjectStart);
            for (key, item) in map {
                tokens.push_back(JsonToken::PropertyName(key.clone()));
                flatten(item, tokens);
            }
            tokens.push_back(JsonToken::ObjectEnd);
        }
    }
}
