use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::errors::Error;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ResponseType {
    /// Parse the body as an envelope and hand back its payload.
    #[default]
    Json,
    /// Hand back the raw body without touching it.
    Blob,
}

/// Per-call options.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// Bypass staleness checks and never attach credentials.
    pub skip_auth: bool,
    pub response_type: ResponseType,
    /// Extra headers passed through to the transport.
    pub headers: HeaderMap,
    pub timeout: Option<Duration>,
    pub(crate) retry_count: u8,
}

impl RequestOptions {
    pub fn without_auth(mut self) -> Self {
        self.skip_auth = true;
        self
    }

    pub fn as_blob(mut self) -> Self {
        self.response_type = ResponseType::Blob;
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry_count(&self) -> u8 {
        self.retry_count
    }
}

#[derive(Clone, Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Form(FormData),
}

impl Body {
    pub fn json<T: Serialize>(value: &T) -> Result<Self, Error> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    pub fn is_form(&self) -> bool {
        matches!(self, Body::Form(_))
    }
}

impl From<Value> for Body {
    fn from(value: Value) -> Self {
        Body::Json(value)
    }
}

impl From<FormData> for Body {
    fn from(form: FormData) -> Self {
        Body::Form(form)
    }
}

#[derive(Clone, Debug)]
enum FormValue {
    Text(String),
    File {
        contents: Bytes,
        file_name: Option<String>,
        mime: Option<String>,
    },
}

/// Multipart payload kept in a rebuildable form so a rejected request can
/// be sent again.
#[derive(Clone, Debug, Default)]
pub struct FormData {
    fields: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields
            .push((name.into(), FormValue::Text(value.into())));
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        contents: impl Into<Bytes>,
    ) -> Self {
        self.fields.push((
            name.into(),
            FormValue::File {
                contents: contents.into(),
                file_name: Some(file_name.into()),
                mime: None,
            },
        ));
        self
    }

    /// Sets the content type of the most recently added file field.
    pub fn mime(mut self, mime: impl Into<String>) -> Self {
        if let Some((_, FormValue::File { mime: slot, .. })) = self.fields.last_mut() {
            *slot = Some(mime.into());
        }
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn to_multipart(&self) -> Result<Form, Error> {
        let mut form = Form::new();
        for (name, value) in &self.fields {
            form = match value {
                FormValue::Text(text) => form.text(name.clone(), text.clone()),
                FormValue::File {
                    contents,
                    file_name,
                    mime,
                } => {
                    let mut part = Part::bytes(contents.to_vec());
                    if let Some(file_name) = file_name {
                        part = part.file_name(file_name.clone());
                    }
                    if let Some(mime) = mime {
                        part = part.mime_str(mime)?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// What a request resolved to, depending on its `ResponseType`.
#[derive(Clone, Debug)]
pub enum Reply {
    Data(Value),
    Blob(Bytes),
}

impl Reply {
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, Error> {
        match self {
            Reply::Data(value) => Ok(serde_json::from_value(value)?),
            Reply::Blob(_) => Err(Error::Decode(
                "expected envelope payload, got binary body".into(),
            )),
        }
    }

    pub fn into_bytes(self) -> Result<Bytes, Error> {
        match self {
            Reply::Blob(bytes) => Ok(bytes),
            Reply::Data(_) => Err(Error::Decode(
                "expected binary body, got envelope payload".into(),
            )),
        }
    }
}
