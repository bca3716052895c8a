//! Artifact manifest parsing.
//!
//! TeamCity publishes the list of a build's artifacts as an Ivy module
//! descriptor (`teamcity-ivy.xml`) next to the artifacts themselves:
//!
//! ```xml
//! <ivy-module version="1.3">
//!   <info organisation="org" module="bt1" revision="1234"/>
//!   <publications>
//!     <artifact name="lib" type="jar" ext="jar"/>
//!     <artifact name="docs/readme" type="txt" ext="txt"/>
//!   </publications>
//! </ivy-module>
//! ```
//!
//! Only `<artifact>` elements are consulted. The artifact's path relative to the
//! build's artifact root is `name + "." + ext`.

use crate::error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::fmt;

/// Well-known name of the manifest resource within a build's artifact root
pub const MANIFEST_FILE_NAME: &str = "teamcity-ivy.xml";

const ARTIFACT_ELEMENT: &[u8] = b"artifact";

/// One entry of the artifact manifest
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    /// Artifact path without the extension, `/`-separated
    pub name: String,
    /// File extension without the leading dot
    pub extension: String,
}

impl ArtifactDescriptor {
    /// Create a descriptor from its two halves
    pub fn new(name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
        }
    }

    /// Remote path of the artifact relative to the build's artifact root
    pub fn full_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }
}

impl fmt::Display for ArtifactDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.name, self.extension)
    }
}

/// Parse a manifest document into artifact descriptors, in document order.
///
/// Parsing is permissive about content: an `<artifact>` without a `name` or
/// `ext` attribute still produces a descriptor, with that half left empty.
/// It is strict about structure: anything that is not a well-formed document
/// is rejected with [`Error::InvalidManifest`].
///
/// # Examples
///
/// ```
/// use tcad::manifest::parse_manifest;
///
/// let xml = br#"<ivy-module><publications>
///     <artifact name="lib" ext="jar"/>
///     <artifact name="readme" ext="txt"/>
/// </publications></ivy-module>"#;
///
/// let names: Vec<String> = parse_manifest(xml)
///     .unwrap()
///     .iter()
///     .map(|a| a.full_name())
///     .collect();
/// assert_eq!(names, ["lib.jar", "readme.txt"]);
/// ```
pub fn parse_manifest(content: &[u8]) -> Result<Vec<ArtifactDescriptor>> {
    let mut reader = Reader::from_reader(content);
    reader.config_mut().check_end_names = true;

    let mut artifacts = Vec::new();
    let mut buf = Vec::new();
    let mut depth: usize = 0;
    let mut saw_root = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            Error::InvalidManifest(format!(
                "XML error at byte {}: {}",
                reader.error_position(),
                e
            ))
        })?;

        match event {
            Event::Start(element) => {
                if depth == 0 && saw_root {
                    return Err(second_root(&element));
                }
                if element.name().as_ref() == ARTIFACT_ELEMENT {
                    artifacts.push(read_artifact(&element)?);
                }
                depth += 1;
                saw_root = true;
            }
            Event::Empty(element) => {
                if depth == 0 && saw_root {
                    return Err(second_root(&element));
                }
                if element.name().as_ref() == ARTIFACT_ELEMENT {
                    artifacts.push(read_artifact(&element)?);
                }
                saw_root = true;
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    Error::InvalidManifest("closing tag without matching opening tag".to_string())
                })?;
            }
            Event::Text(text) if depth == 0 && !is_blank(&text) => {
                return Err(Error::InvalidManifest(format!(
                    "text outside the root element at byte {}",
                    reader.buffer_position()
                )));
            }
            Event::CData(_) if depth == 0 => {
                return Err(Error::InvalidManifest(
                    "CDATA outside the root element".to_string(),
                ));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if depth > 0 {
        return Err(Error::InvalidManifest(format!(
            "unexpected end of document, {depth} element(s) left open"
        )));
    }
    if !saw_root {
        return Err(Error::InvalidManifest("root element is missing".to_string()));
    }

    tracing::debug!(count = artifacts.len(), "parsed artifact manifest");
    Ok(artifacts)
}

fn second_root(element: &BytesStart<'_>) -> Error {
    Error::InvalidManifest(format!(
        "unexpected element '{}' after the root element",
        String::from_utf8_lossy(element.name().as_ref())
    ))
}

/// Whitespace (and a leading byte order mark) is allowed around the root
fn is_blank(text: &[u8]) -> bool {
    let text = text.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(text);
    text.iter().all(u8::is_ascii_whitespace)
}

fn read_artifact(element: &BytesStart<'_>) -> Result<ArtifactDescriptor> {
    Ok(ArtifactDescriptor {
        name: attribute_value(element, "name")?,
        extension: attribute_value(element, "ext")?,
    })
}

/// Unescaped attribute value, or an empty string when the attribute is absent
fn attribute_value(element: &BytesStart<'_>, key: &str) -> Result<String> {
    let attribute = element
        .try_get_attribute(key)
        .map_err(|e| Error::InvalidManifest(format!("malformed attribute '{key}': {e}")))?;

    match attribute {
        Some(attribute) => attribute
            .unescape_value()
            .map(|value| value.into_owned())
            .map_err(|e| Error::InvalidManifest(format!("malformed attribute '{key}': {e}"))),
        None => Ok(String::new()),
    }
}
