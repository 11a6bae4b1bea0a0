//! Read-only layout of an outline
//!
//! Flattens a [`SermonOutline`] into an ordered list of blocks for renderers.
//! Section headings carry the same anchor ids the timer uses, so a renderer
//! can scroll to the section the speaker is in.

use crate::markup;
use crate::models::{IconTag, SermonOutline};
use crate::timer::{point_anchor, CONCLUSION_ANCHOR, INTRODUCTION_ANCHOR};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Sermon title
    Title,
    /// Theme line under the title
    Subtitle,
    /// Heading of a top-level section, with the point icon if any
    Heading(Option<IconTag>),
    /// Heading inside a section
    Subheading,
    /// Free text, one entry per line
    Body(Vec<String>),
    /// Bulleted list items
    Bullets(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewBlock {
    pub kind: BlockKind,
    /// Heading text; empty for body and list blocks
    pub text: String,
    /// Timer anchor the block starts, if any
    pub anchor: Option<String>,
}

impl ViewBlock {
    fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            anchor: None,
        }
    }

    fn anchored(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }
}

/// Body block for `text`, or a list when any line is bulleted
fn content(text: &str) -> Option<ViewBlock> {
    if text.trim().is_empty() {
        return None;
    }
    let kind = if markup::is_bullet_list(text) {
        BlockKind::Bullets(markup::list_items(text).into_iter().map(String::from).collect())
    } else {
        BlockKind::Body(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
        )
    };
    Some(ViewBlock::new(kind, ""))
}

/// Lay out `outline` top to bottom
pub fn layout(outline: &SermonOutline) -> Vec<ViewBlock> {
    let mut blocks = vec![
        ViewBlock::new(BlockKind::Title, outline.title.as_str()),
        ViewBlock::new(BlockKind::Subtitle, outline.theme_and_subtitle.as_str()),
        ViewBlock::new(BlockKind::Heading(None), outline.context.title.as_str()),
    ];
    blocks.extend(content(&outline.context.content));

    blocks.push(
        ViewBlock::new(BlockKind::Heading(None), outline.introduction.title.as_str())
            .anchored(INTRODUCTION_ANCHOR),
    );
    blocks.extend(content(&outline.introduction.hook));

    for point in &outline.development {
        blocks.push(
            ViewBlock::new(
                BlockKind::Heading(Some(point.icon)),
                format!("{}. {}", point.point_number, point.title),
            )
            .anchored(point_anchor(point.point_number)),
        );
        blocks.extend(content(&point.argument));
        for sub in &point.subsections {
            blocks.push(ViewBlock::new(BlockKind::Subheading, sub.title.as_str()));
            blocks.extend(content(&sub.content));
        }
        blocks.push(ViewBlock::new(BlockKind::Subheading, "Aplicação"));
        blocks.extend(content(&point.application));
    }

    let conclusion = &outline.conclusion;
    blocks.push(
        ViewBlock::new(BlockKind::Heading(None), conclusion.title.as_str())
            .anchored(CONCLUSION_ANCHOR),
    );
    blocks.extend(content(&conclusion.recap));
    blocks.push(ViewBlock::new(BlockKind::Subheading, "Aos crentes"));
    blocks.extend(content(&conclusion.appeal_to_believers));
    blocks.push(ViewBlock::new(BlockKind::Subheading, "Aos não crentes"));
    blocks.extend(content(&conclusion.appeal_to_unbelievers));

    blocks
}

/// Index of the block carrying `anchor`
pub fn anchor_index(blocks: &[ViewBlock], anchor: &str) -> Option<usize> {
    blocks
        .iter()
        .position(|block| block.anchor.as_deref() == Some(anchor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::fixtures::sample_outline;
    use crate::timer::{build_sections, TimeBudget};

    #[test]
    fn test_layout_order() {
        let blocks = layout(&sample_outline());
        assert_eq!(blocks[0].kind, BlockKind::Title);
        assert_eq!(blocks[0].text, "A Tenda do Encontro");
        assert_eq!(blocks[1].kind, BlockKind::Subtitle);

        let headings: Vec<&str> = blocks
            .iter()
            .filter(|b| matches!(b.kind, BlockKind::Heading(_)))
            .map(|b| b.text.as_str())
            .collect();
        assert_eq!(
            headings,
            vec![
                "Contexto",
                "Introdução",
                "1. Ponto 1 título",
                "2. Ponto 2 título",
                "3. Ponto 3 título",
                "Conclusão"
            ]
        );
    }

    #[test]
    fn test_every_timer_anchor_is_laid_out() {
        let outline = sample_outline();
        let blocks = layout(&outline);
        for section in build_sections(&outline, &TimeBudget::default()) {
            assert!(
                anchor_index(&blocks, &section.anchor_id).is_some(),
                "missing anchor {}",
                section.anchor_id
            );
        }
        assert_eq!(anchor_index(&blocks, "point-9"), None);
    }

    #[test]
    fn test_bullets_and_body() {
        let blocks = layout(&sample_outline());
        assert!(blocks.contains(&ViewBlock::new(
            BlockKind::Bullets(vec!["item um".into(), "item dois".into()]),
            ""
        )));
        assert!(blocks.contains(&ViewBlock::new(
            BlockKind::Body(vec!["Argumento do ponto 1 com **ênfase**".into()]),
            ""
        )));
    }

    #[test]
    fn test_empty_text_is_skipped() {
        let mut outline = sample_outline();
        outline.context.content = "  ".into();
        let blocks = layout(&outline);
        let context = blocks.iter().position(|b| b.text == "Contexto").unwrap();
        assert_eq!(blocks[context + 1].anchor.as_deref(), Some("introduction"));
    }

    #[test]
    fn test_point_icon_on_heading() {
        let blocks = layout(&sample_outline());
        let index = anchor_index(&blocks, "point-3").unwrap();
        assert_eq!(blocks[index].kind, BlockKind::Heading(Some(IconTag::Dove)));
    }
}
