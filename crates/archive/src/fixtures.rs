//! Webarchive builders for tests, in this crate and in dependents (through
//! the `fixtures` feature in their dev-dependencies).

use crate::model::{Archive, Resource};
use plist::{Dictionary, Value};

/// Assembles an [`Archive`] value, or its encoded property list bytes.
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    main: Resource,
    subresources: Option<Vec<Resource>>,
}
impl ArchiveBuilder {
    /// Starts an archive whose main resource is `html` served from `url`.
    pub fn new(url: impl Into<String>, html: impl AsRef<[u8]>) -> Self {
        Self {
            main: Resource {
                url: url.into(),
                mime_type: "text/html".to_string(),
                text_encoding: Some("UTF-8".to_string()),
                frame_name: None,
                data: html.as_ref().to_vec(),
            },
            subresources: Some(Vec::new()),
        }
    }

    /// Sets the main resource's `WebResourceTextEncodingName`.
    pub fn encoding(mut self, label: Option<&str>) -> Self {
        self.main.text_encoding = label.map(str::to_string);
        self
    }

    /// Appends a subresource.
    pub fn resource(mut self, url: impl Into<String>, mime_type: impl Into<String>, data: impl AsRef<[u8]>) -> Self {
        self.subresources.get_or_insert_with(Vec::new).push(Resource {
            url: url.into(),
            mime_type: mime_type.into(),
            text_encoding: None,
            frame_name: None,
            data: data.as_ref().to_vec(),
        });
        self
    }

    /// Omits the `WebSubresources` key entirely.
    pub fn without_subresources(mut self) -> Self {
        self.subresources = None;
        self
    }

    pub fn build(&self) -> Archive {
        Archive {
            main: self.main.clone(),
            subresources: self.subresources.clone().unwrap_or_default(),
            subframes: 0,
        }
    }

    pub fn to_value(&self) -> Value {
        let mut root = Dictionary::new();
        root.insert("WebMainResource".to_string(), resource_value(&self.main));
        if let Some(subresources) = &self.subresources {
            root.insert(
                "WebSubresources".to_string(),
                Value::Array(subresources.iter().map(resource_value).collect()),
            );
        }
        Value::Dictionary(root)
    }

    pub fn to_binary(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.to_value().to_writer_binary(&mut bytes).expect("in-memory plist write");
        bytes
    }

    pub fn to_xml(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        self.to_value().to_writer_xml(&mut bytes).expect("in-memory plist write");
        bytes
    }
}

fn resource_value(resource: &Resource) -> Value {
    let mut dict = Dictionary::new();
    dict.insert("WebResourceURL".to_string(), Value::String(resource.url.clone()));
    dict.insert("WebResourceMIMEType".to_string(), Value::String(resource.mime_type.clone()));
    if let Some(encoding) = &resource.text_encoding {
        dict.insert("WebResourceTextEncodingName".to_string(), Value::String(encoding.clone()));
    }
    if let Some(frame) = &resource.frame_name {
        dict.insert("WebResourceFrameName".to_string(), Value::String(frame.clone()));
    }
    dict.insert("WebResourceData".to_string(), Value::Data(resource.data.clone()));
    Value::Dictionary(dict)
}
