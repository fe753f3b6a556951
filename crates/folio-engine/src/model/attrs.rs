//! Attribute schemas for every node type.
//!
//! Each struct is the complete, closed schema of one node kind. Unknown keys in
//! stored JSON are ignored on deserialization, so documents written by a newer
//! schema still load (the extra attributes are dropped).

use serde::{Deserialize, Deserializer, Serialize};

/// Default width of an embedded video frame, in CSS pixels.
pub const DEFAULT_EMBED_WIDTH: u32 = 640;
/// Default height of an embedded video frame, in CSS pixels.
pub const DEFAULT_EMBED_HEIGHT: u32 = 480;

/// Horizontal alignment shared by text blocks and aligned embeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl Align {
    /// Parse an alignment keyword. Matching is case-insensitive and ignores
    /// surrounding whitespace.
    pub fn parse(value: &str) -> Option<Align> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" => Some(Align::Left),
            "center" => Some(Align::Center),
            "right" => Some(Align::Right),
            _ => None,
        }
    }

    /// Parse an alignment keyword, falling back to [`Align::Left`] for absent or
    /// unrecognised values.
    pub fn parse_or_default(value: Option<&str>) -> Align {
        value.and_then(Align::parse).unwrap_or_default()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Center => "center",
            Align::Right => "right",
        }
    }
}

impl std::fmt::Display for Align {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Align {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(Align::parse_or_default(value.as_deref()))
    }
}

/// Attributes of paragraphs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<Align>,
}

/// Attributes of headings. Only levels 1 to 3 are part of the schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadingAttrs {
    #[serde(default = "default_heading_level")]
    pub level: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<Align>,
}

pub const MAX_HEADING_LEVEL: u8 = 3;

fn default_heading_level() -> u8 {
    1
}

impl HeadingAttrs {
    pub fn new(level: u8) -> Self {
        Self {
            level: level.clamp(1, MAX_HEADING_LEVEL),
            text_align: None,
        }
    }
}

impl Default for HeadingAttrs {
    fn default() -> Self {
        Self::new(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderedListAttrs {
    #[serde(default = "default_list_start")]
    pub start: u32,
}

fn default_list_start() -> u32 {
    1
}

impl Default for OrderedListAttrs {
    fn default() -> Self {
        Self { start: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItemAttrs {
    #[serde(default)]
    pub checked: bool,
}

/// The language is written into a single `language-*` class token, so it
/// never holds whitespace. See [`code_language`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockAttrs {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_code_language"
    )]
    pub language: Option<String>,
}

impl CodeBlockAttrs {
    pub fn new(language: &str) -> Self {
        Self {
            language: code_language(language),
        }
    }
}

/// Normalise a code language to one class token: runs of whitespace become
/// `-`, and a blank name is no language at all.
pub fn code_language(raw: &str) -> Option<String> {
    let language = raw.split_whitespace().collect::<Vec<_>>().join("-");
    (!language.is_empty()).then_some(language)
}

fn deserialize_code_language<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.and_then(|raw| code_language(&raw)))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAttrs {
    #[serde(default)]
    pub src: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Attributes of an embedded video frame with its own horizontal alignment.
///
/// `src` is optional so that stored markup with a missing `src` still loads
/// as a node instead of being discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignableEmbedAttrs {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default = "default_embed_width")]
    pub width: u32,
    #[serde(default = "default_embed_height")]
    pub height: u32,
    #[serde(default)]
    pub align: Align,
}

fn default_embed_width() -> u32 {
    DEFAULT_EMBED_WIDTH
}

fn default_embed_height() -> u32 {
    DEFAULT_EMBED_HEIGHT
}

impl Default for AlignableEmbedAttrs {
    fn default() -> Self {
        Self {
            src: None,
            width: DEFAULT_EMBED_WIDTH,
            height: DEFAULT_EMBED_HEIGHT,
            align: Align::Left,
        }
    }
}

/// Attributes of a social post embed.
///
/// The identifier is kept as an opaque string. Post ids exceed the range a
/// double can represent exactly, so they are never converted to numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialEmbedAttrs {
    #[serde(
        rename = "externalId",
        default,
        deserialize_with = "deserialize_opaque_id"
    )]
    pub external_id: Option<String>,
}

impl SocialEmbedAttrs {
    pub fn new(external_id: impl Into<String>) -> Self {
        let id = external_id.into();
        let trimmed = id.trim();
        Self {
            external_id: (!trimmed.is_empty()).then(|| trimmed.to_string()),
        }
    }

    /// An embed without an identifier cannot be mounted and is shown as invalid.
    pub fn is_valid(&self) -> bool {
        self.external_id.is_some()
    }
}

/// Accepts the id either as a JSON string or as an integer written by older
/// clients, and normalises empty strings to `None`.
fn deserialize_opaque_id<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(u64),
    }

    let raw = Option::<RawId>::deserialize(deserializer)?;
    Ok(match raw {
        Some(RawId::Text(text)) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Some(RawId::Number(number)) => Some(number.to_string()),
        None => None,
    })
}
