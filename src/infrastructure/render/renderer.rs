use crate::domain::markup;
use crate::domain::{
    AspectRatio, Deck, DomainError, LayoutKind, Paragraph, PlaceholderContent, PlaceholderRole,
    RenderedSlide, SlidePlan, SlideSpec, Template, TemplateSet, TextBlock,
};

/// Renders slide plans onto the template for their aspect ratio
///
/// Slide 0 always uses the title layout whatever layout it declares. Its
/// first body sequence becomes the subtitle.
#[derive(Debug, Clone, Default)]
pub struct DeckRenderer {
    templates: TemplateSet,
}

impl DeckRenderer {
    pub fn new(templates: TemplateSet) -> Self {
        Self { templates }
    }

    pub fn render(&self, plan: &SlidePlan, aspect_ratio: AspectRatio) -> Result<Deck, DomainError> {
        let template = self.templates.for_ratio(aspect_ratio);

        let slides = plan
            .iter()
            .enumerate()
            .map(|(index, spec)| {
                let layout = if index == 0 {
                    LayoutKind::Title
                } else {
                    spec.layout
                };
                render_slide(&template, layout, spec)
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(
            slides = slides.len(),
            template = %template.name,
            "Rendered deck"
        );

        Ok(Deck::new(template, slides))
    }
}

fn render_slide(
    template: &Template,
    layout: LayoutKind,
    spec: &SlideSpec,
) -> Result<RenderedSlide, DomainError> {
    let title = vec![Paragraph::new(markup::parse(&spec.title), 0)];

    let placeholders = match layout {
        LayoutKind::Title => vec![
            bind(template, layout, PlaceholderRole::Title, title)?,
            bind(
                template,
                layout,
                PlaceholderRole::Subtitle,
                paragraphs(spec.sequence(0)),
            )?,
        ],
        LayoutKind::BulletList => vec![
            bind(template, layout, PlaceholderRole::Title, title)?,
            bind(
                template,
                layout,
                PlaceholderRole::Body,
                paragraphs(spec.sequence(0)),
            )?,
        ],
        LayoutKind::TwoColumn => vec![
            bind(template, layout, PlaceholderRole::Title, title)?,
            bind(
                template,
                layout,
                PlaceholderRole::LeftColumn,
                paragraphs(spec.sequence(0)),
            )?,
            bind(
                template,
                layout,
                PlaceholderRole::RightColumn,
                paragraphs(spec.sequence(1)),
            )?,
        ],
    };

    Ok(RenderedSlide {
        layout,
        placeholders,
    })
}

fn bind(
    template: &Template,
    layout: LayoutKind,
    role: PlaceholderRole,
    paragraphs: Vec<Paragraph>,
) -> Result<PlaceholderContent, DomainError> {
    let spec = template.placeholder(layout, role)?.clone();
    Ok(PlaceholderContent { spec, paragraphs })
}

fn paragraphs(blocks: &[TextBlock]) -> Vec<Paragraph> {
    blocks
        .iter()
        .map(|block| Paragraph::new(markup::parse(&block.text), block.level))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RunStyle, StyledRun};

    fn plan() -> SlidePlan {
        SlidePlan::new(vec![
            SlideSpec::new(LayoutKind::Title, "**Mars**")
                .with_sequence(vec![TextBlock::new("The red planet")]),
            SlideSpec::new(LayoutKind::BulletList, "Facts")
                .with_sequence(vec![TextBlock::new("**Mars** is __red__")]),
            SlideSpec::new(LayoutKind::TwoColumn, "Compare")
                .with_sequence(vec![
                    TextBlock::new("Mars"),
                    TextBlock::new("Cold").with_level(1),
                ])
                .with_sequence(vec![TextBlock::new("Earth")]),
        ])
    }

    #[test]
    fn test_slide_count_matches_plan() {
        let renderer = DeckRenderer::default();

        let deck = renderer.render(&plan(), AspectRatio::Widescreen).unwrap();

        assert_eq!(deck.len(), 3);
        assert_eq!(deck.template().aspect_ratio, AspectRatio::Widescreen);
        assert_eq!(deck.title().as_deref(), Some("Mars"));
    }

    #[test]
    fn test_template_follows_aspect_ratio() {
        let renderer = DeckRenderer::default();

        let deck = renderer.render(&plan(), AspectRatio::Standard).unwrap();

        assert_eq!(deck.template().slide_width, 9_144_000);
    }

    #[test]
    fn test_first_slide_always_uses_title_layout() {
        let plan = SlidePlan::new(vec![
            SlideSpec::new(LayoutKind::BulletList, "Overview")
                .with_sequence(vec![TextBlock::new("first point")]),
            SlideSpec::new(LayoutKind::BulletList, "Details"),
        ]);

        let deck = DeckRenderer::default()
            .render(&plan, AspectRatio::Widescreen)
            .unwrap();

        let first = &deck.slides()[0];
        assert_eq!(first.layout, LayoutKind::Title);
        assert_eq!(
            first.placeholder(PlaceholderRole::Subtitle).unwrap().plain_text(),
            "first point"
        );
        assert_eq!(deck.slides()[1].layout, LayoutKind::BulletList);
    }

    #[test]
    fn test_markup_is_parsed_into_runs() {
        let deck = DeckRenderer::default()
            .render(&plan(), AspectRatio::Widescreen)
            .unwrap();

        let body = deck.slides()[1].placeholder(PlaceholderRole::Body).unwrap();
        assert_eq!(
            body.paragraphs[0].line.runs(),
            &[
                StyledRun::new("Mars", RunStyle::BOLD),
                StyledRun::new(" is ", RunStyle::PLAIN),
                StyledRun::new("red", RunStyle::UNDERLINE),
            ]
        );

        let title = deck.slides()[0].placeholder(PlaceholderRole::Title).unwrap();
        assert_eq!(title.paragraphs[0].line.runs(), &[StyledRun::new("Mars", RunStyle::BOLD)]);
    }

    #[test]
    fn test_two_column_binds_sequences_in_order() {
        let deck = DeckRenderer::default()
            .render(&plan(), AspectRatio::Widescreen)
            .unwrap();

        let slide = &deck.slides()[2];
        let left = slide.placeholder(PlaceholderRole::LeftColumn).unwrap();
        let right = slide.placeholder(PlaceholderRole::RightColumn).unwrap();

        assert_eq!(left.paragraphs.len(), 2);
        assert_eq!(left.paragraphs[1].level, 1);
        assert_eq!(right.plain_text(), "Earth");
    }

    #[test]
    fn test_missing_column_renders_empty() {
        let plan = SlidePlan::new(vec![
            SlideSpec::new(LayoutKind::Title, "Intro"),
            SlideSpec::new(LayoutKind::TwoColumn, "Half")
                .with_sequence(vec![TextBlock::new("only left")]),
        ]);

        let deck = DeckRenderer::default()
            .render(&plan, AspectRatio::Standard)
            .unwrap();

        let slide = &deck.slides()[1];
        assert_eq!(slide.layout, LayoutKind::TwoColumn);
        assert!(slide
            .placeholder(PlaceholderRole::RightColumn)
            .unwrap()
            .paragraphs
            .is_empty());
    }

    #[test]
    fn test_title_slide_without_subtitle() {
        let plan = SlidePlan::new(vec![SlideSpec::new(LayoutKind::Title, "Only a title")]);

        let deck = DeckRenderer::default()
            .render(&plan, AspectRatio::Widescreen)
            .unwrap();

        let subtitle = deck.slides()[0].placeholder(PlaceholderRole::Subtitle).unwrap();
        assert!(subtitle.paragraphs.is_empty());
    }

    #[test]
    fn test_template_mismatch_is_render_error() {
        let mut widescreen = Template::widescreen();
        for layout in &mut widescreen.layouts {
            if layout.kind == LayoutKind::TwoColumn {
                layout.placeholders.retain(|p| p.role != PlaceholderRole::RightColumn);
            }
        }
        let renderer = DeckRenderer::new(TemplateSet::new(widescreen, Template::standard()));

        let err = renderer.render(&plan(), AspectRatio::Widescreen).unwrap_err();
        assert!(matches!(err, DomainError::Render { .. }));

        // the other template is untouched
        assert!(renderer.render(&plan(), AspectRatio::Standard).is_ok());
    }

    #[test]
    fn test_empty_plan_renders_empty_deck() {
        let deck = DeckRenderer::default()
            .render(&SlidePlan::new(Vec::new()), AspectRatio::Widescreen)
            .unwrap();

        assert!(deck.is_empty());
        assert_eq!(deck.title(), None);
    }
}
