//! Path-addressed edits on a sermon outline
//!
//! Every editable field of a [`SermonOutline`] is a leaf string. A
//! [`FieldPath`] names one of those leaves; untyped segment sequences coming
//! from a host (`["development", 1, "argument"]`) or the command line
//! (`development.1.argument`) are parsed into a `FieldPath` first and
//! rejected with [`InvalidPathError`] when they do not resolve.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::{DevelopmentPoint, SermonOutline};

/// Errors raised when a path does not address a leaf of the document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidPathError {
    #[error("Empty path")]
    Empty,

    #[error("Unknown field '{segment}' at position {position}")]
    UnknownField { segment: String, position: usize },

    #[error("Expected an index at position {position}, found '{segment}'")]
    ExpectedIndex { segment: String, position: usize },

    #[error("Index {index} out of range at position {position} (length {len})")]
    OutOfRange {
        index: usize,
        position: usize,
        len: usize,
    },

    #[error("Path continues past a text field at position {position}")]
    TrailingSegments { position: usize },

    #[error("Path stops at a container, not a text field")]
    NotALeaf,
}

/// Keys used in untyped paths, matching the wire names
mod keys {
    pub const TITLE: &str = "title";
    pub const THEME_AND_SUBTITLE: &str = "theme_and_subtitle";
    pub const THEME_AND_SUBTITLE_ALT: &str = "themeAndSubtitle";
    pub const CONTEXT: &str = "context";
    pub const CONTENT: &str = "content";
    pub const INTRODUCTION: &str = "introduction";
    pub const HOOK: &str = "hook";
    pub const DEVELOPMENT: &str = "development";
    pub const ARGUMENT: &str = "argument";
    pub const SUBSECTIONS: &str = "subsections";
    pub const APPLICATION: &str = "application";
    pub const CONCLUSION: &str = "conclusion";
    pub const RECAP: &str = "recap";
    pub const APPEAL_TO_BELIEVERS: &str = "appealToBelievers";
    pub const APPEAL_TO_UNBELIEVERS: &str = "appealToUnbelievers";
}

/// One step of an untyped path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl From<&str> for PathSegment {
    fn from(s: &str) -> Self {
        PathSegment::Key(s.to_string())
    }
}

impl From<usize> for PathSegment {
    fn from(i: usize) -> Self {
        PathSegment::Index(i)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(k) => f.write_str(k),
            PathSegment::Index(i) => write!(f, "{}", i),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextField {
    Title,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntroductionField {
    Title,
    Hook,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubsectionField {
    Title,
    Content,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointField {
    Title,
    Argument,
    Subsection(usize, SubsectionField),
    Application,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConclusionField {
    Title,
    Recap,
    AppealToBelievers,
    AppealToUnbelievers,
}

/// Typed address of one text leaf in a [`SermonOutline`]
///
/// Indices are 0-based positions in `development` and `subsections`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Title,
    ThemeAndSubtitle,
    Context(ContextField),
    Introduction(IntroductionField),
    Development(usize, PointField),
    Conclusion(ConclusionField),
}

impl FieldPath {
    /// Resolve an untyped segment sequence against a document
    ///
    /// Index segments are checked against the document's current lengths.
    pub fn resolve(
        outline: &SermonOutline,
        segments: &[PathSegment],
    ) -> Result<Self, InvalidPathError> {
        let mut cursor = Cursor::new(segments);
        let root = cursor.key()?;

        let path = match root {
            keys::TITLE => FieldPath::Title,
            keys::THEME_AND_SUBTITLE | keys::THEME_AND_SUBTITLE_ALT => FieldPath::ThemeAndSubtitle,
            keys::CONTEXT => FieldPath::Context(match cursor.key()? {
                keys::TITLE => ContextField::Title,
                keys::CONTENT => ContextField::Content,
                _ => return Err(cursor.unknown()),
            }),
            keys::INTRODUCTION => FieldPath::Introduction(match cursor.key()? {
                keys::TITLE => IntroductionField::Title,
                keys::HOOK => IntroductionField::Hook,
                _ => return Err(cursor.unknown()),
            }),
            keys::DEVELOPMENT => {
                let index = cursor.index(outline.development.len())?;
                let point = &outline.development[index];
                FieldPath::Development(index, resolve_point_field(point, &mut cursor)?)
            }
            keys::CONCLUSION => FieldPath::Conclusion(match cursor.key()? {
                keys::TITLE => ConclusionField::Title,
                keys::RECAP => ConclusionField::Recap,
                keys::APPEAL_TO_BELIEVERS => ConclusionField::AppealToBelievers,
                keys::APPEAL_TO_UNBELIEVERS => ConclusionField::AppealToUnbelievers,
                _ => return Err(cursor.unknown()),
            }),
            _ => return Err(cursor.unknown()),
        };

        cursor.finish()?;
        Ok(path)
    }

    /// Resolve a dotted path such as `development.1.argument`
    pub fn parse(outline: &SermonOutline, dotted: &str) -> Result<Self, InvalidPathError> {
        let raw: RawPath = dotted.parse()?;
        Self::resolve(outline, &raw.0)
    }

    /// Untyped segments of this path
    pub fn segments(&self) -> Vec<PathSegment> {
        let key = |k: &str| PathSegment::Key(k.to_string());
        match *self {
            FieldPath::Title => vec![key(keys::TITLE)],
            FieldPath::ThemeAndSubtitle => vec![key(keys::THEME_AND_SUBTITLE)],
            FieldPath::Context(field) => vec![
                key(keys::CONTEXT),
                key(match field {
                    ContextField::Title => keys::TITLE,
                    ContextField::Content => keys::CONTENT,
                }),
            ],
            FieldPath::Introduction(field) => vec![
                key(keys::INTRODUCTION),
                key(match field {
                    IntroductionField::Title => keys::TITLE,
                    IntroductionField::Hook => keys::HOOK,
                }),
            ],
            FieldPath::Development(i, field) => {
                let mut segs = vec![key(keys::DEVELOPMENT), PathSegment::Index(i)];
                match field {
                    PointField::Title => segs.push(key(keys::TITLE)),
                    PointField::Argument => segs.push(key(keys::ARGUMENT)),
                    PointField::Application => segs.push(key(keys::APPLICATION)),
                    PointField::Subsection(j, sub) => {
                        segs.push(key(keys::SUBSECTIONS));
                        segs.push(PathSegment::Index(j));
                        segs.push(key(match sub {
                            SubsectionField::Title => keys::TITLE,
                            SubsectionField::Content => keys::CONTENT,
                        }));
                    }
                }
                segs
            }
            FieldPath::Conclusion(field) => vec![
                key(keys::CONCLUSION),
                key(match field {
                    ConclusionField::Title => keys::TITLE,
                    ConclusionField::Recap => keys::RECAP,
                    ConclusionField::AppealToBelievers => keys::APPEAL_TO_BELIEVERS,
                    ConclusionField::AppealToUnbelievers => keys::APPEAL_TO_UNBELIEVERS,
                }),
            ],
        }
    }

    /// Read the addressed field, if the document still has it
    pub fn get<'a>(&self, outline: &'a SermonOutline) -> Option<&'a str> {
        let value = match *self {
            FieldPath::Title => &outline.title,
            FieldPath::ThemeAndSubtitle => &outline.theme_and_subtitle,
            FieldPath::Context(ContextField::Title) => &outline.context.title,
            FieldPath::Context(ContextField::Content) => &outline.context.content,
            FieldPath::Introduction(IntroductionField::Title) => &outline.introduction.title,
            FieldPath::Introduction(IntroductionField::Hook) => &outline.introduction.hook,
            FieldPath::Development(i, field) => {
                let point = outline.development.get(i)?;
                match field {
                    PointField::Title => &point.title,
                    PointField::Argument => &point.argument,
                    PointField::Application => &point.application,
                    PointField::Subsection(j, sub) => {
                        let subsection = point.subsections.get(j)?;
                        match sub {
                            SubsectionField::Title => &subsection.title,
                            SubsectionField::Content => &subsection.content,
                        }
                    }
                }
            }
            FieldPath::Conclusion(ConclusionField::Title) => &outline.conclusion.title,
            FieldPath::Conclusion(ConclusionField::Recap) => &outline.conclusion.recap,
            FieldPath::Conclusion(ConclusionField::AppealToBelievers) => {
                &outline.conclusion.appeal_to_believers
            }
            FieldPath::Conclusion(ConclusionField::AppealToUnbelievers) => {
                &outline.conclusion.appeal_to_unbelievers
            }
        };
        Some(value.as_str())
    }

    fn get_mut<'a>(&self, outline: &'a mut SermonOutline) -> Option<&'a mut String> {
        let value = match *self {
            FieldPath::Title => &mut outline.title,
            FieldPath::ThemeAndSubtitle => &mut outline.theme_and_subtitle,
            FieldPath::Context(ContextField::Title) => &mut outline.context.title,
            FieldPath::Context(ContextField::Content) => &mut outline.context.content,
            FieldPath::Introduction(IntroductionField::Title) => &mut outline.introduction.title,
            FieldPath::Introduction(IntroductionField::Hook) => &mut outline.introduction.hook,
            FieldPath::Development(i, field) => {
                let point = outline.development.get_mut(i)?;
                match field {
                    PointField::Title => &mut point.title,
                    PointField::Argument => &mut point.argument,
                    PointField::Application => &mut point.application,
                    PointField::Subsection(j, sub) => {
                        let subsection = point.subsections.get_mut(j)?;
                        match sub {
                            SubsectionField::Title => &mut subsection.title,
                            SubsectionField::Content => &mut subsection.content,
                        }
                    }
                }
            }
            FieldPath::Conclusion(ConclusionField::Title) => &mut outline.conclusion.title,
            FieldPath::Conclusion(ConclusionField::Recap) => &mut outline.conclusion.recap,
            FieldPath::Conclusion(ConclusionField::AppealToBelievers) => {
                &mut outline.conclusion.appeal_to_believers
            }
            FieldPath::Conclusion(ConclusionField::AppealToUnbelievers) => {
                &mut outline.conclusion.appeal_to_unbelievers
            }
        };
        Some(value)
    }

    /// Every valid leaf path of a document, in reading order
    pub fn leaves(outline: &SermonOutline) -> Vec<FieldPath> {
        let mut paths = vec![
            FieldPath::Title,
            FieldPath::ThemeAndSubtitle,
            FieldPath::Context(ContextField::Title),
            FieldPath::Context(ContextField::Content),
            FieldPath::Introduction(IntroductionField::Title),
            FieldPath::Introduction(IntroductionField::Hook),
        ];
        for (i, point) in outline.development.iter().enumerate() {
            paths.push(FieldPath::Development(i, PointField::Title));
            paths.push(FieldPath::Development(i, PointField::Argument));
            for j in 0..point.subsections.len() {
                paths.push(FieldPath::Development(
                    i,
                    PointField::Subsection(j, SubsectionField::Title),
                ));
                paths.push(FieldPath::Development(
                    i,
                    PointField::Subsection(j, SubsectionField::Content),
                ));
            }
            paths.push(FieldPath::Development(i, PointField::Application));
        }
        paths.extend([
            FieldPath::Conclusion(ConclusionField::Title),
            FieldPath::Conclusion(ConclusionField::Recap),
            FieldPath::Conclusion(ConclusionField::AppealToBelievers),
            FieldPath::Conclusion(ConclusionField::AppealToUnbelievers),
        ]);
        paths
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dotted: Vec<String> = self.segments().iter().map(|s| s.to_string()).collect();
        f.write_str(&dotted.join("."))
    }
}

/// A dotted path split into segments, not yet resolved against a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPath(pub Vec<PathSegment>);

impl FromStr for RawPath {
    type Err = InvalidPathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let segments: Vec<PathSegment> = s
            .split('.')
            .filter(|seg| !seg.is_empty())
            .map(|seg| match seg.parse::<usize>() {
                Ok(i) => PathSegment::Index(i),
                Err(_) => PathSegment::Key(seg.to_string()),
            })
            .collect();
        if segments.is_empty() {
            return Err(InvalidPathError::Empty);
        }
        Ok(RawPath(segments))
    }
}

/// Return a copy of `outline` with the field at `path` replaced
///
/// The input document is left untouched.
pub fn apply_edit(
    outline: &SermonOutline,
    path: FieldPath,
    value: impl Into<String>,
) -> Result<SermonOutline, InvalidPathError> {
    let mut edited = outline.clone();
    let slot = path.get_mut(&mut edited).ok_or(InvalidPathError::NotALeaf)?;
    *slot = value.into();
    Ok(edited)
}

/// Resolve an untyped path and apply the edit
pub fn apply_edit_at(
    outline: &SermonOutline,
    segments: &[PathSegment],
    value: impl Into<String>,
) -> Result<SermonOutline, InvalidPathError> {
    let path = FieldPath::resolve(outline, segments)?;
    apply_edit(outline, path, value)
}

fn resolve_point_field(
    point: &DevelopmentPoint,
    cursor: &mut Cursor<'_>,
) -> Result<PointField, InvalidPathError> {
    Ok(match cursor.key()? {
        keys::TITLE => PointField::Title,
        keys::ARGUMENT => PointField::Argument,
        keys::APPLICATION => PointField::Application,
        keys::SUBSECTIONS => {
            let j = cursor.index(point.subsections.len())?;
            PointField::Subsection(
                j,
                match cursor.key()? {
                    keys::TITLE => SubsectionField::Title,
                    keys::CONTENT => SubsectionField::Content,
                    _ => return Err(cursor.unknown()),
                },
            )
        }
        _ => return Err(cursor.unknown()),
    })
}

/// Walks an untyped path, remembering the position for error messages
struct Cursor<'a> {
    segments: &'a [PathSegment],
    position: usize,
}

impl<'a> Cursor<'a> {
    fn new(segments: &'a [PathSegment]) -> Self {
        Self {
            segments,
            position: 0,
        }
    }

    fn next(&mut self) -> Result<&'a PathSegment, InvalidPathError> {
        if self.segments.is_empty() {
            return Err(InvalidPathError::Empty);
        }
        let seg = self
            .segments
            .get(self.position)
            .ok_or(InvalidPathError::NotALeaf)?;
        self.position += 1;
        Ok(seg)
    }

    fn key(&mut self) -> Result<&'a str, InvalidPathError> {
        match self.next()? {
            PathSegment::Key(k) => Ok(k.as_str()),
            PathSegment::Index(i) => Err(InvalidPathError::UnknownField {
                segment: i.to_string(),
                position: self.position - 1,
            }),
        }
    }

    fn index(&mut self, len: usize) -> Result<usize, InvalidPathError> {
        let position = self.position;
        match self.next()? {
            PathSegment::Index(i) if *i < len => Ok(*i),
            PathSegment::Index(i) => Err(InvalidPathError::OutOfRange {
                index: *i,
                position,
                len,
            }),
            PathSegment::Key(k) => Err(InvalidPathError::ExpectedIndex {
                segment: k.clone(),
                position,
            }),
        }
    }

    /// Error for the segment just consumed
    fn unknown(&self) -> InvalidPathError {
        let position = self.position.saturating_sub(1);
        InvalidPathError::UnknownField {
            segment: self
                .segments
                .get(position)
                .map(|s| s.to_string())
                .unwrap_or_default(),
            position,
        }
    }

    fn finish(&self) -> Result<(), InvalidPathError> {
        if self.position < self.segments.len() {
            return Err(InvalidPathError::TrailingSegments {
                position: self.position,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_outline;

    fn segs(parts: &[PathSegment]) -> Vec<PathSegment> {
        parts.to_vec()
    }

    #[test]
    fn test_edit_changes_only_target() {
        let original = sample_outline();
        let path = segs(&["development".into(), 1usize.into(), "argument".into()]);

        let edited = apply_edit_at(&original, &path, "Novo argumento").unwrap();

        assert_eq!(edited.development[1].argument, "Novo argumento");
        // Input untouched
        assert_eq!(original.development[1].argument, sample_outline().development[1].argument);

        // Every other field is value-identical
        let mut expected = original.clone();
        expected.development[1].argument = "Novo argumento".to_string();
        assert_eq!(edited, expected);

        // Siblings are independent copies
        assert_ne!(
            edited.development[0].title.as_ptr(),
            original.development[0].title.as_ptr()
        );
        assert_eq!(edited.development[0], original.development[0]);
    }

    #[test]
    fn test_edit_subsection_and_conclusion() {
        let outline = sample_outline();

        let edited = apply_edit_at(
            &outline,
            &segs(&[
                "development".into(),
                0usize.into(),
                "subsections".into(),
                1usize.into(),
                "content".into(),
            ]),
            "novo",
        )
        .unwrap();
        assert_eq!(edited.development[0].subsections[1].content, "novo");

        let edited = apply_edit_at(
            &outline,
            &segs(&["conclusion".into(), "appealToUnbelievers".into()]),
            "venha",
        )
        .unwrap();
        assert_eq!(edited.conclusion.appeal_to_unbelievers, "venha");
    }

    #[test]
    fn test_invalid_paths() {
        let outline = sample_outline();

        let err = apply_edit_at(&outline, &[], "x").unwrap_err();
        assert_eq!(err, InvalidPathError::Empty);

        let err = apply_edit_at(&outline, &segs(&["nope".into()]), "x").unwrap_err();
        assert!(matches!(err, InvalidPathError::UnknownField { position: 0, .. }));

        let err = apply_edit_at(
            &outline,
            &segs(&["development".into(), 9usize.into(), "title".into()]),
            "x",
        )
        .unwrap_err();
        assert_eq!(
            err,
            InvalidPathError::OutOfRange {
                index: 9,
                position: 1,
                len: 3
            }
        );

        let err = apply_edit_at(
            &outline,
            &segs(&["development".into(), "first".into()]),
            "x",
        )
        .unwrap_err();
        assert!(matches!(err, InvalidPathError::ExpectedIndex { .. }));

        let err = apply_edit_at(&outline, &segs(&["context".into()]), "x").unwrap_err();
        assert_eq!(err, InvalidPathError::NotALeaf);

        let err = apply_edit_at(
            &outline,
            &segs(&["title".into(), "extra".into()]),
            "x",
        )
        .unwrap_err();
        assert_eq!(err, InvalidPathError::TrailingSegments { position: 1 });
    }

    #[test]
    fn test_parse_dotted() {
        let outline = sample_outline();
        let path = FieldPath::parse(&outline, "development.2.subsections.0.title").unwrap();
        assert_eq!(
            path,
            FieldPath::Development(2, PointField::Subsection(0, SubsectionField::Title))
        );
        assert_eq!(path.to_string(), "development.2.subsections.0.title");
        assert_eq!(path.get(&outline), Some("Sub 3.1"));

        let alt = FieldPath::parse(&outline, "themeAndSubtitle").unwrap();
        assert_eq!(alt, FieldPath::ThemeAndSubtitle);
    }

    #[test]
    fn test_raw_path_from_str() {
        let raw: RawPath = "conclusion.recap".parse().unwrap();
        assert_eq!(
            raw.0,
            vec![PathSegment::Key("conclusion".into()), PathSegment::Key("recap".into())]
        );
        assert_eq!("".parse::<RawPath>().unwrap_err(), InvalidPathError::Empty);
    }

    #[test]
    fn test_leaves_round_trip() {
        let outline = sample_outline();
        let leaves = FieldPath::leaves(&outline);
        // 6 top-level + 3 points * (3 + 2 subsections * 2) + 4 conclusion
        assert_eq!(leaves.len(), 6 + 3 * 7 + 4);
        for leaf in leaves {
            let resolved = FieldPath::resolve(&outline, &leaf.segments()).unwrap();
            assert_eq!(resolved, leaf);
            assert!(leaf.get(&outline).is_some());
        }
    }

    #[test]
    fn test_stale_path_is_rejected_on_apply() {
        let mut outline = sample_outline();
        let path = FieldPath::Development(2, PointField::Title);
        outline.development.truncate(1);
        assert_eq!(
            apply_edit(&outline, path, "x").unwrap_err(),
            InvalidPathError::NotALeaf
        );
    }
}
