//! Data models for sermon outlines
//!
//! Defines the outline tree produced by the generation service, the
//! presentation rewrite derived from it, and the record persisted in the
//! remote collection.
//!
//! Field names on the wire follow the generation schema (`theme_and_subtitle`,
//! `point`, `icon`, camelCase appeals). The camelCase spellings used by older
//! records are accepted as aliases.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{de, Deserialize, Deserializer, Serialize};

use crate::markup;

/// Icon shown next to a development point
///
/// Serialized as the wire name (`TentIcon`); parsing also accepts the short
/// name in any case.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
pub enum IconTag {
    #[serde(rename = "TentIcon")]
    Tent,
    #[serde(rename = "BuildingIcon")]
    Building,
    #[serde(rename = "DoveIcon")]
    Dove,
}

impl IconTag {
    /// Wire name of the icon
    pub fn as_str(&self) -> &'static str {
        match self {
            IconTag::Tent => "TentIcon",
            IconTag::Building => "BuildingIcon",
            IconTag::Dove => "DoveIcon",
        }
    }

    /// Single glyph used by terminal renderers
    pub fn glyph(&self) -> &'static str {
        match self {
            IconTag::Tent => "⛺",
            IconTag::Building => "🏛",
            IconTag::Dove => "🕊",
        }
    }
}

impl fmt::Display for IconTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IconTag {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tent" | "tenticon" => Ok(IconTag::Tent),
            "building" | "buildingicon" => Ok(IconTag::Building),
            "dove" | "doveicon" => Ok(IconTag::Dove),
            other => Err(format!("unknown icon: {}", other)),
        }
    }
}

impl<'de> Deserialize<'de> for IconTag {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(de::Error::custom)
    }
}

/// Historical/literary context of the passage
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContextSection {
    pub title: String,
    pub content: String,
}

/// Opening of the sermon
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Introduction {
    pub title: String,
    pub hook: String,
}

/// A titled block inside a development point
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Subsection {
    pub title: String,
    pub content: String,
}

/// One numbered main section of the sermon body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevelopmentPoint {
    /// 1-based, equal to the position in `development`
    #[serde(rename = "point", alias = "pointNumber")]
    pub point_number: u32,
    pub title: String,
    #[serde(alias = "iconTag")]
    pub icon: IconTag,
    pub argument: String,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
    pub application: String,
}

/// Closing of the sermon
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Conclusion {
    pub title: String,
    pub recap: String,
    #[serde(rename = "appealToBelievers")]
    pub appeal_to_believers: String,
    #[serde(rename = "appealToUnbelievers")]
    pub appeal_to_unbelievers: String,
}

/// The structured sermon document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SermonOutline {
    pub title: String,
    #[serde(alias = "themeAndSubtitle")]
    pub theme_and_subtitle: String,
    pub context: ContextSection,
    pub introduction: Introduction,
    #[serde(default)]
    pub development: Vec<DevelopmentPoint>,
    pub conclusion: Conclusion,
}

impl SermonOutline {
    /// Bring a freshly parsed outline in line with the model invariants
    ///
    /// Point numbers are rewritten to match their position and every text
    /// field is trimmed.
    pub fn normalize(&mut self) {
        for (index, point) in self.development.iter_mut().enumerate() {
            point.point_number = index as u32 + 1;
        }
        self.for_each_text_mut(|text| {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        });
    }

    /// Names of text fields whose emphasis delimiters are unbalanced
    pub fn unbalanced_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        self.for_each_text(|name, text| {
            if !markup::is_balanced(text) {
                fields.push(name);
            }
        });
        fields
    }

    /// Find a development point by its 1-based number
    pub fn point(&self, number: u32) -> Option<&DevelopmentPoint> {
        self.development.iter().find(|p| p.point_number == number)
    }

    /// Visit every free-text field with a dotted field name
    pub fn for_each_text(&self, mut visit: impl FnMut(String, &str)) {
        visit("title".into(), &self.title);
        visit("theme_and_subtitle".into(), &self.theme_and_subtitle);
        visit("context.title".into(), &self.context.title);
        visit("context.content".into(), &self.context.content);
        visit("introduction.title".into(), &self.introduction.title);
        visit("introduction.hook".into(), &self.introduction.hook);
        for (i, point) in self.development.iter().enumerate() {
            visit(format!("development.{}.title", i), &point.title);
            visit(format!("development.{}.argument", i), &point.argument);
            for (j, sub) in point.subsections.iter().enumerate() {
                visit(format!("development.{}.subsections.{}.title", i, j), &sub.title);
                visit(
                    format!("development.{}.subsections.{}.content", i, j),
                    &sub.content,
                );
            }
            visit(format!("development.{}.application", i), &point.application);
        }
        visit("conclusion.title".into(), &self.conclusion.title);
        visit("conclusion.recap".into(), &self.conclusion.recap);
        visit(
            "conclusion.appealToBelievers".into(),
            &self.conclusion.appeal_to_believers,
        );
        visit(
            "conclusion.appealToUnbelievers".into(),
            &self.conclusion.appeal_to_unbelievers,
        );
    }

    fn for_each_text_mut(&mut self, mut visit: impl FnMut(&mut String)) {
        visit(&mut self.title);
        visit(&mut self.theme_and_subtitle);
        visit(&mut self.context.title);
        visit(&mut self.context.content);
        visit(&mut self.introduction.title);
        visit(&mut self.introduction.hook);
        for point in &mut self.development {
            visit(&mut point.title);
            visit(&mut point.argument);
            for sub in &mut point.subsections {
                visit(&mut sub.title);
                visit(&mut sub.content);
            }
            visit(&mut point.application);
        }
        visit(&mut self.conclusion.title);
        visit(&mut self.conclusion.recap);
        visit(&mut self.conclusion.appeal_to_believers);
        visit(&mut self.conclusion.appeal_to_unbelievers);
    }
}

/// Outline rewritten into short assertive lines for presentation mode
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct PresentationOutline {
    pub outline: SermonOutline,
}

impl PresentationOutline {
    pub fn new(outline: SermonOutline) -> Self {
        Self { outline }
    }
}

/// A sermon as stored in the remote collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedSermon {
    /// Creation timestamp in milliseconds, doubles as identity
    pub id: i64,
    pub passage: String,
    pub data: SermonOutline,
    #[serde(rename = "presentationData", default)]
    pub presentation_data: Option<PresentationOutline>,
}

impl SavedSermon {
    /// Create a record stamped with the current time
    pub fn new(passage: impl Into<String>, data: SermonOutline) -> Self {
        Self {
            id: Utc::now().timestamp_millis(),
            passage: passage.into(),
            data,
            presentation_data: None,
        }
    }

    /// Create a record with a specific ID (for loading or tests)
    pub fn with_id(id: i64, passage: impl Into<String>, data: SermonOutline) -> Self {
        Self {
            id,
            passage: passage.into(),
            data,
            presentation_data: None,
        }
    }

    /// Creation time as a local-independent UTC timestamp
    pub fn created_at(&self) -> Option<chrono::DateTime<Utc>> {
        chrono::DateTime::from_timestamp_millis(self.id)
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::sample_outline;
    use super::*;

    const WIRE_OUTLINE: &str = r#"{
        "title": "T",
        "theme_and_subtitle": "S",
        "context": {"title": "C", "content": "CC"},
        "introduction": {"title": "I", "hook": "H"},
        "development": [
            {"point": 1, "title": "P1", "icon": "TentIcon", "argument": "A",
             "subsections": [{"title": "s", "content": "c"}], "application": "Ap"}
        ],
        "conclusion": {"title": "F", "recap": "R",
                       "appealToBelievers": "B", "appealToUnbelievers": "U"}
    }"#;

    #[test]
    fn test_parse_wire_outline() {
        let outline: SermonOutline = serde_json::from_str(WIRE_OUTLINE).unwrap();
        assert_eq!(outline.theme_and_subtitle, "S");
        assert_eq!(outline.development[0].point_number, 1);
        assert_eq!(outline.development[0].icon, IconTag::Tent);
        assert_eq!(outline.conclusion.appeal_to_unbelievers, "U");
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let json = serde_json::to_value(sample_outline()).unwrap();
        assert!(json.get("theme_and_subtitle").is_some());
        assert_eq!(json["development"][0]["point"], 1);
        assert_eq!(json["development"][1]["icon"], "BuildingIcon");
        assert!(json["conclusion"].get("appealToBelievers").is_some());
    }

    #[test]
    fn test_camel_case_aliases_accepted() {
        let json = WIRE_OUTLINE
            .replace("theme_and_subtitle", "themeAndSubtitle")
            .replace("\"point\"", "\"pointNumber\"")
            .replace("\"icon\": \"TentIcon\"", "\"iconTag\": \"tent\"");
        let outline: SermonOutline = serde_json::from_str(&json).unwrap();
        assert_eq!(outline.theme_and_subtitle, "S");
        assert_eq!(outline.development[0].icon, IconTag::Tent);
    }

    #[test]
    fn test_icon_deserialize_ignores_case() {
        for (name, icon) in [
            ("Tent", IconTag::Tent),
            ("TENT", IconTag::Tent),
            ("tentIcon", IconTag::Tent),
            ("Building", IconTag::Building),
            ("doveicon", IconTag::Dove),
        ] {
            let parsed: IconTag = serde_json::from_str(&format!("\"{}\"", name)).unwrap();
            assert_eq!(parsed, icon, "icon {:?}", name);
        }
        assert!(serde_json::from_str::<IconTag>("\"Fish\"").is_err());
        assert!(serde_json::from_str::<IconTag>("3").is_err());
    }

    #[test]
    fn test_icon_from_str() {
        assert_eq!("tent".parse::<IconTag>().unwrap(), IconTag::Tent);
        assert_eq!("DoveIcon".parse::<IconTag>().unwrap(), IconTag::Dove);
        assert!("fish".parse::<IconTag>().is_err());
    }

    #[test]
    fn test_normalize_renumbers_and_trims() {
        let mut outline = sample_outline();
        outline.development[0].point_number = 7;
        outline.development[2].point_number = 0;
        outline.title = "  Título  ".to_string();

        outline.normalize();

        let numbers: Vec<u32> = outline.development.iter().map(|p| p.point_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(outline.title, "Título");
    }

    #[test]
    fn test_unbalanced_fields() {
        let mut outline = sample_outline();
        assert!(outline.unbalanced_fields().is_empty());

        outline.development[1].argument = "um **dois".to_string();
        assert_eq!(outline.unbalanced_fields(), vec!["development.1.argument"]);
    }

    #[test]
    fn test_saved_sermon_serialization() {
        let mut saved = SavedSermon::with_id(1700000000000, "João 1:14", sample_outline());
        let json = serde_json::to_value(&saved).unwrap();
        assert_eq!(json["id"], 1700000000000i64);
        assert!(json["presentationData"].is_null());

        saved.presentation_data = Some(PresentationOutline::new(sample_outline()));
        let text = serde_json::to_string(&saved).unwrap();
        let parsed: SavedSermon = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, saved);
    }

    #[test]
    fn test_saved_sermon_missing_presentation_field() {
        let json = format!(
            r#"{{"id": 5, "passage": "Sl 23", "data": {}}}"#,
            WIRE_OUTLINE
        );
        let parsed: SavedSermon = serde_json::from_str(&json).unwrap();
        assert!(parsed.presentation_data.is_none());
        assert!(parsed.created_at().is_some());
    }
}
