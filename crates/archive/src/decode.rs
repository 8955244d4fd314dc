//! Mapping from a generic property list value to the webarchive schema.
//!
//! ```text
//! WebMainResource:     { WebResourceURL, WebResourceMIMEType, WebResourceTextEncodingName?, WebResourceData }
//! WebSubresources:     [ same shape, repeated ]
//! WebSubframeArchives: [ nested archives, counted only ]
//! ```

use crate::error::{Error, ErrorKind, Result};
use crate::model::{Archive, Resource};
use exn::OptionExt;
use plist::{Dictionary, Value};

const MAIN_RESOURCE: &str = "WebMainResource";
const SUBRESOURCES: &str = "WebSubresources";
const SUBFRAMES: &str = "WebSubframeArchives";
const URL: &str = "WebResourceURL";
const MIME_TYPE: &str = "WebResourceMIMEType";
const TEXT_ENCODING: &str = "WebResourceTextEncodingName";
const FRAME_NAME: &str = "WebResourceFrameName";
const DATA: &str = "WebResourceData";

impl TryFrom<Value> for Archive {
    type Error = Error;
    fn try_from(value: Value) -> std::result::Result<Self, Self::Error> {
        let mut root = value.into_dictionary().ok_or_raise(|| ErrorKind::InvalidField {
            field: "root",
            expected: "a dictionary",
        })?;
        let main = root.remove(MAIN_RESOURCE).ok_or_raise(|| ErrorKind::MissingField(MAIN_RESOURCE))?;
        let main = resource(main, MAIN_RESOURCE)?;
        let subresources = match root.remove(SUBRESOURCES) {
            None => Vec::new(),
            Some(list) => list
                .into_array()
                .ok_or_raise(|| ErrorKind::InvalidField { field: SUBRESOURCES, expected: "an array" })?
                .into_iter()
                .map(|entry| resource(entry, SUBRESOURCES))
                .collect::<Result<Vec<_>>>()?,
        };
        let subframes = root.remove(SUBFRAMES).and_then(Value::into_array).map_or(0, |frames| frames.len());
        Ok(Archive { main, subresources, subframes })
    }
}

fn resource(value: Value, field: &'static str) -> Result<Resource> {
    let mut dict = value.into_dictionary().ok_or_raise(|| ErrorKind::InvalidField { field, expected: "a dictionary" })?;
    Ok(Resource {
        url: string(&mut dict, URL)?.unwrap_or_default(),
        mime_type: string(&mut dict, MIME_TYPE)?.unwrap_or_default(),
        text_encoding: string(&mut dict, TEXT_ENCODING)?,
        frame_name: string(&mut dict, FRAME_NAME)?,
        data: match dict.remove(DATA) {
            None => Vec::new(),
            Some(data) => data.into_data().ok_or_raise(|| ErrorKind::InvalidField { field: DATA, expected: "data" })?,
        },
    })
}

fn string(dict: &mut Dictionary, field: &'static str) -> Result<Option<String>> {
    match dict.remove(field) {
        None => Ok(None),
        Some(value) => Ok(Some(
            value.into_string().ok_or_raise(|| ErrorKind::InvalidField { field, expected: "a string" })?,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::ArchiveBuilder;

    const XML_ARCHIVE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE plist PUBLIC "-//Apple//DTD PLIST 1.0//EN" "http://www.apple.com/DTDs/PropertyList-1.0.dtd">
<plist version="1.0">
<dict>
    <key>WebMainResource</key>
    <dict>
        <key>WebResourceData</key>
        <data>PGh0bWw+PC9odG1sPg==</data>
        <key>WebResourceMIMEType</key>
        <string>text/html</string>
        <key>WebResourceTextEncodingName</key>
        <string>UTF-8</string>
        <key>WebResourceURL</key>
        <string>https://example.com/page</string>
    </dict>
    <key>WebSubresources</key>
    <array>
        <dict>
            <key>WebResourceData</key>
            <data>aGVsbG8=</data>
            <key>WebResourceMIMEType</key>
            <string>text/plain</string>
            <key>WebResourceURL</key>
            <string>https://example.com/hello.txt</string>
        </dict>
    </array>
</dict>
</plist>"#;

    #[test]
    fn decodes_xml_plist() {
        let archive = Archive::decode(XML_ARCHIVE.as_bytes()).unwrap();
        assert_eq!(archive.main.url, "https://example.com/page");
        assert_eq!(archive.main.mime_type, "text/html");
        assert_eq!(archive.main.text_encoding.as_deref(), Some("UTF-8"));
        assert_eq!(archive.main.data, b"<html></html>");
        assert_eq!(archive.subresources.len(), 1);
        assert_eq!(archive.subresources[0].data, b"hello");
        assert_eq!(archive.subresources[0].text_encoding, None);
        assert_eq!(archive.subframes, 0);
    }

    #[test]
    fn decodes_binary_plist() {
        let bytes = ArchiveBuilder::new("https://example.com/", "<p>hi</p>")
            .resource("https://example.com/a.png", "image/png", b"png")
            .resource("https://example.com/b.js", "application/javascript", b"js")
            .to_binary();
        assert!(bytes.starts_with(b"bplist00"));
        let archive = Archive::decode(&bytes).unwrap();
        assert_eq!(archive.main.data, b"<p>hi</p>");
        let urls: Vec<_> = archive.subresources.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, ["https://example.com/a.png", "https://example.com/b.js"]);
    }

    #[test]
    fn xml_and_binary_decode_identically() {
        let builder = ArchiveBuilder::new("https://example.com/", "<p>hi</p>").resource(
            "https://example.com/a.css",
            "text/css",
            b"body{}",
        );
        assert_eq!(Archive::decode(&builder.to_xml()).unwrap(), Archive::decode(&builder.to_binary()).unwrap());
    }

    #[test]
    fn missing_subresources_is_empty() {
        let bytes = ArchiveBuilder::new("https://example.com/", "<p>hi</p>").without_subresources().to_binary();
        let archive = Archive::decode(&bytes).unwrap();
        assert!(archive.subresources.is_empty());
    }

    #[test]
    fn missing_main_resource_is_fatal() {
        let mut root = Dictionary::new();
        root.insert(SUBRESOURCES.to_string(), Value::Array(vec![]));
        let err = Archive::try_from(Value::Dictionary(root)).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField(MAIN_RESOURCE));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = Archive::decode(b"definitely not a property list").unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedContainer);
    }

    #[test]
    fn subresources_must_be_an_array() {
        let mut root = Dictionary::new();
        root.insert(MAIN_RESOURCE.to_string(), Value::Dictionary(Dictionary::new()));
        root.insert(SUBRESOURCES.to_string(), Value::String("nope".into()));
        let err = Archive::try_from(Value::Dictionary(root)).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidField { field: SUBRESOURCES, expected: "an array" });
    }

    #[test]
    fn data_must_be_data() {
        let mut main = Dictionary::new();
        main.insert(DATA.to_string(), Value::String("<html>".into()));
        let mut root = Dictionary::new();
        root.insert(MAIN_RESOURCE.to_string(), Value::Dictionary(main));
        let err = Archive::try_from(Value::Dictionary(root)).unwrap_err();
        assert_eq!(*err, ErrorKind::InvalidField { field: DATA, expected: "data" });
    }

    #[test]
    fn counts_subframes() {
        let mut root = Dictionary::new();
        root.insert(MAIN_RESOURCE.to_string(), Value::Dictionary(Dictionary::new()));
        root.insert(
            SUBFRAMES.to_string(),
            Value::Array(vec![Value::Dictionary(Dictionary::new()), Value::Dictionary(Dictionary::new())]),
        );
        let archive = Archive::try_from(Value::Dictionary(root)).unwrap();
        assert_eq!(archive.subframes, 2);
    }
}
