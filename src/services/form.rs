//! Multipart payloads for attachment requests.

use anyhow::{Result, bail};
use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

/// A file carried in a multipart field.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl Attachment {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone)]
pub enum FormField {
    Text(String),
    File(Attachment),
}

/// Ordered multipart fields.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: Vec<(String, FormField)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), FormField::Text(value.into())));
        self
    }

    pub fn file(mut self, name: impl Into<String>, attachment: Attachment) -> Self {
        self.fields.push((name.into(), FormField::File(attachment)));
        self
    }

    pub fn fields(&self) -> &[(String, FormField)] {
        &self.fields
    }

    /// Flattens a serializable payload into text fields.
    ///
    /// Nested objects use `key[sub]`, arrays of scalars `key[]`, arrays of
    /// objects `key[i][sub]`. Null values are skipped. The payload itself must
    /// serialize to a JSON object.
    pub fn from_serialize<P: Serialize + ?Sized>(payload: &P) -> Result<Self> {
        let Value::Object(map) = serde_json::to_value(payload)? else {
            bail!("multipart payload must serialize to a JSON object");
        };
        let mut form = FormData::new();
        for (key, value) in map {
            flatten(&mut form, key, value);
        }
        Ok(form)
    }

    pub(crate) fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for (name, field) in self.fields {
            form = match field {
                FormField::Text(value) => form.text(name, value),
                FormField::File(attachment) => {
                    let mut part =
                        Part::bytes(attachment.bytes.to_vec()).file_name(attachment.file_name);
                    if let Some(content_type) = attachment.content_type {
                        part = part.mime_str(&content_type)?;
                    }
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}

fn flatten(form: &mut FormData, key: String, value: Value) {
    match value {
        Value::Null => {}
        Value::String(s) => form.fields.push((key, FormField::Text(s))),
        Value::Bool(_) | Value::Number(_) => {
            form.fields.push((key, FormField::Text(value.to_string())))
        }
        Value::Object(map) => {
            for (sub, v) in map {
                flatten(form, format!("{key}[{sub}]"), v);
            }
        }
        Value::Array(items) => {
            let nested = items
                .iter()
                .any(|v| matches!(v, Value::Object(_) | Value::Array(_)));
            for (i, item) in items.into_iter().enumerate() {
                let item_key = if nested {
                    format!("{key}[{i}]")
                } else {
                    format!("{key}[]")
                };
                flatten(form, item_key, item);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn texts(form: &FormData) -> Vec<(String, String)> {
        form.fields()
            .iter()
            .filter_map(|(name, field)| match field {
                FormField::Text(v) => Some((name.clone(), v.clone())),
                FormField::File(_) => None,
            })
            .collect()
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_string(), value.to_string())
    }

    #[test]
    fn test_flattens_scalars_objects_and_arrays() {
        let payload = json!({
            "name": "Mug",
            "price": 12.5,
            "active": true,
            "discount": null,
            "tags": ["kitchen", "gift"],
            "dims": { "h": 10, "w": 8 },
            "variants": [{ "sku": "A" }, { "sku": "B" }]
        });

        let form = FormData::from_serialize(&payload).unwrap();

        assert_eq!(
            texts(&form),
            vec![
                pair("active", "true"),
                pair("dims[h]", "10"),
                pair("dims[w]", "8"),
                pair("name", "Mug"),
                pair("price", "12.5"),
                pair("tags[]", "kitchen"),
                pair("tags[]", "gift"),
                pair("variants[0][sku]", "A"),
                pair("variants[1][sku]", "B"),
            ]
        );
    }

    #[test]
    fn test_non_object_payload_is_rejected() {
        assert!(FormData::from_serialize(&vec![1, 2, 3]).is_err());
        assert!(FormData::from_serialize("plain").is_err());
    }

    #[test]
    fn test_builder_keeps_field_order() {
        let form = FormData::new()
            .text("title", "Photo")
            .file("image", Attachment::new("a.png", vec![1u8, 2, 3]).with_content_type("image/png"))
            .text("alt", "A photo");

        let names: Vec<_> = form.fields().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["title", "image", "alt"]);
    }

    #[test]
    fn test_invalid_mime_fails_conversion() {
        let form = FormData::new().file(
            "image",
            Attachment::new("a.png", vec![1u8]).with_content_type("not a mime"),
        );

        assert!(form.into_multipart().is_err());
    }

    #[test]
    fn test_conversion_succeeds_for_valid_fields() {
        let form = FormData::new()
            .text("title", "Photo")
            .file("image", Attachment::new("a.png", vec![1u8]).with_content_type("image/png"));

        assert!(form.into_multipart().is_ok());
    }
}
