//! Page composer: turns decoded sections into markup, one block per
//! recognised section, in input order.

use maud::{html, Markup, PreEscaped};

use super::image::{ImageCdn, ImageSource, ImageTarget};
use super::rich_text::render_rich_text;
use super::{
    Button, ButtonStyle, CardsSection, CtaSection, DividerSection, DividerStyle, GalleryLayout,
    GallerySection, HeroSection, ImagePosition, MediaSection, QuoteSection, Section, SectionBlock,
    TextSection, TimelineSection,
};

/// Everything renderers need beyond the section data itself.
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub images: ImageCdn,
}

impl RenderContext {
    pub fn new(images: ImageCdn) -> Self {
        Self { images }
    }

    fn image_url(&self, image: Option<&ImageSource>, target: ImageTarget) -> Option<String> {
        image.and_then(|img| self.images.url(img, target))
    }
}

#[derive(Debug, Clone)]
pub struct RenderedSection {
    pub key: Option<String>,
    pub kind: &'static str,
    pub markup: Markup,
}

/// Render every recognised section; unknown sections produce no output.
pub fn compose(blocks: &[SectionBlock], ctx: &RenderContext) -> Vec<RenderedSection> {
    blocks
        .iter()
        .filter_map(|block| {
            render_section(&block.section, ctx).map(|markup| RenderedSection {
                key: block.key.clone(),
                kind: block.section.kind(),
                markup,
            })
        })
        .collect()
}

/// Compose and concatenate a page body.
pub fn render_page(blocks: &[SectionBlock], ctx: &RenderContext) -> Markup {
    let rendered = compose(blocks, ctx);
    html! {
        @for section in &rendered {
            div.page-section data-key=[section.key.as_deref()] data-kind=(section.kind) {
                (section.markup)
            }
        }
    }
}

pub fn render_section(section: &Section, ctx: &RenderContext) -> Option<Markup> {
    match section {
        Section::Hero(hero) => Some(render_hero(hero, ctx)),
        Section::Text(text) => Some(render_text(text, ctx)),
        Section::Media(media) => Some(render_media(media, ctx, ImageTarget::MEDIA)),
        Section::Gallery(gallery) => Some(render_gallery(gallery, ctx)),
        Section::Quote(quote) => Some(render_quote(quote)),
        Section::Cta(cta) => Some(render_cta(cta)),
        Section::Timeline(timeline) => Some(render_timeline(timeline)),
        Section::Cards(cards) => Some(render_cards(cards, ctx)),
        Section::Divider(divider) => Some(render_divider(divider)),
        Section::Legacy(legacy) => Some(render_media(&legacy.to_media(), ctx, ImageTarget::LEGACY)),
        Section::Unknown => None,
    }
}

fn render_button(button: Option<&Button>) -> Markup {
    let Some((text, link)) = button.and_then(Button::parts) else {
        return html! {};
    };
    let style = match button.map(|b| b.style).unwrap_or_default() {
        ButtonStyle::Primary => "button button--primary",
        ButtonStyle::Secondary => "button button--secondary",
        ButtonStyle::Outline => "button button--outline",
    };
    html! { a class=(style) href=(link) { (text) } }
}

fn render_hero(hero: &HeroSection, ctx: &RenderContext) -> Markup {
    let background = ctx.image_url(hero.background_image.as_ref(), ImageTarget::HERO);
    let style = background.map(|url| format!("background-image: url('{url}')"));
    html! {
        section class={ "section hero " (hero.alignment.as_class()) } style=[style] {
            @if hero.overlay {
                div.hero__overlay {}
            }
            div.hero__content {
                @if let Some(title) = &hero.title {
                    h1.hero__title { (title) }
                }
                @if let Some(subtitle) = &hero.subtitle {
                    p.hero__subtitle { (subtitle) }
                }
                (render_button(hero.button.as_ref()))
            }
        }
    }
}

fn render_text(text: &TextSection, ctx: &RenderContext) -> Markup {
    html! {
        section class={ "section text-section " (text.background_color.as_class()) " " (text.alignment.as_class()) } {
            div.container {
                @if let Some(title) = &text.title {
                    h2.section__title { (title) }
                }
                div.rich-text { (render_rich_text(&text.content, &ctx.images)) }
            }
        }
    }
}

fn render_media(media: &MediaSection, ctx: &RenderContext, target: ImageTarget) -> Markup {
    let image_url = ctx.image_url(media.image.as_ref(), target);
    let alt = media
        .image
        .as_ref()
        .and_then(|img| img.alt.as_deref())
        .or(media.title.as_deref())
        .unwrap_or_default();
    let position = match media.image_position {
        ImagePosition::Left => "media--image-left",
        ImagePosition::Right => "media--image-right",
    };
    html! {
        section class={ "section media-section " (position) " " (media.background_color.as_class()) } {
            div.container.media {
                @if let Some(src) = &image_url {
                    div.media__image {
                        img src=(src) alt=(alt) loading="lazy";
                    }
                }
                div.media__body {
                    @if let Some(title) = &media.title {
                        h2.section__title { (title) }
                    }
                    div.rich-text { (render_rich_text(&media.content, &ctx.images)) }
                    (render_button(media.button.as_ref()))
                }
            }
        }
    }
}

fn render_gallery(gallery: &GallerySection, ctx: &RenderContext) -> Markup {
    let layout = match gallery.layout {
        GalleryLayout::Grid => "gallery--grid",
        GalleryLayout::Masonry => "gallery--masonry",
        GalleryLayout::Carousel => "gallery--carousel",
    };
    html! {
        section class={ "section gallery-section " (layout) } {
            div.container {
                @if let Some(title) = &gallery.title {
                    h2.section__title { (title) }
                }
                div.gallery {
                    @for image in &gallery.images {
                        @if let Some(src) = ctx.images.url(image, ImageTarget::GALLERY) {
                            figure.gallery__item {
                                img src=(src) alt=(image.alt.as_deref().unwrap_or_default()) loading="lazy";
                                @if let Some(caption) = &image.caption {
                                    figcaption { (caption) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_quote(quote: &QuoteSection) -> Markup {
    html! {
        section class={ "section quote-section " (quote.background_color.as_class()) } {
            blockquote.quote {
                p.quote__text { (quote.quote.as_deref().unwrap_or_default()) }
                @if quote.author.is_some() || quote.role.is_some() {
                    footer.quote__attribution {
                        @if let Some(author) = &quote.author {
                            cite { (author) }
                        }
                        @if let Some(role) = &quote.role {
                            span.quote__role { (role) }
                        }
                    }
                }
            }
        }
    }
}

fn render_cta(cta: &CtaSection) -> Markup {
    html! {
        section class={ "section cta-section " (cta.background_color.as_class()) } {
            div.container.cta {
                @if let Some(title) = &cta.title {
                    h2.section__title { (title) }
                }
                @if let Some(description) = &cta.description {
                    p.cta__description { (description) }
                }
                div.cta__buttons {
                    (render_button(cta.button.as_ref()))
                    (render_button(cta.secondary_button.as_ref()))
                }
            }
        }
    }
}

fn render_timeline(timeline: &TimelineSection) -> Markup {
    html! {
        section class={ "section timeline-section " (timeline.background_color.as_class()) } {
            div.container {
                @if let Some(title) = &timeline.title {
                    h2.section__title { (title) }
                }
                ol.timeline {
                    @for event in &timeline.events {
                        li.timeline__event {
                            @if let Some(date) = &event.date {
                                span.timeline__date { (date) }
                            }
                            @if let Some(title) = &event.title {
                                h3.timeline__title { (title) }
                            }
                            @if let Some(description) = &event.description {
                                p.timeline__description { (description) }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_cards(cards: &CardsSection, ctx: &RenderContext) -> Markup {
    html! {
        section class={ "section cards-section " (cards.background_color.as_class()) } {
            div.container {
                @if let Some(title) = &cards.title {
                    h2.section__title { (title) }
                }
                div class={ "cards cards--cols-" (cards.column_count()) } {
                    @for card in &cards.cards {
                        article.card {
                            @if let Some(src) = ctx.image_url(card.image.as_ref(), ImageTarget::CARD) {
                                img.card__image src=(src) alt=(card.title.as_deref().unwrap_or_default()) loading="lazy";
                            }
                            div.card__body {
                                @if let Some(title) = &card.title {
                                    h3.card__title {
                                        @if let Some(link) = &card.link {
                                            a href=(link) { (title) }
                                        } @else {
                                            (title)
                                        }
                                    }
                                }
                                @if let Some(description) = &card.description {
                                    p.card__description { (description) }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn render_divider(divider: &DividerSection) -> Markup {
    match divider.style {
        DividerStyle::Line => html! { hr.divider.divider--line; },
        DividerStyle::Thick => html! { hr.divider.divider--thick; },
        DividerStyle::Dotted => html! { hr.divider.divider--dotted; },
        DividerStyle::Decorative => html! {
            div.divider.divider--decorative role="separator" { span { (PreEscaped("&#10022;")) } }
        },
        DividerStyle::SpaceSmall => html! { div.spacer.spacer--small aria-hidden="true" {} },
        DividerStyle::SpaceLarge => html! { div.spacer.spacer--large aria-hidden="true" {} },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections::parse_sections;
    use serde_json::json;

    fn ctx() -> RenderContext {
        RenderContext::new(ImageCdn::new("proj", "production"))
    }

    #[test]
    fn unknown_tags_render_nothing_and_order_is_kept() {
        let blocks = parse_sections(&json!([
            {"_type": "divider", "_key": "a", "style": "line"},
            {"_type": "unknownType", "_key": "b"},
            {"_type": "quoteSection", "_key": "c", "quote": "X"}
        ]));
        let rendered = compose(&blocks, &ctx());
        assert_eq!(rendered.len(), 2);
        assert_eq!(rendered[0].kind, "divider");
        assert_eq!(rendered[0].key.as_deref(), Some("a"));
        assert_eq!(rendered[1].kind, "quote");
        assert!(rendered[1].markup.0.contains("X"));
    }

    #[test]
    fn every_registered_tag_renders_once() {
        let blocks = parse_sections(&json!([
            {"_type": "heroSection"}, {"_type": "textSection"}, {"_type": "mediaSection"},
            {"_type": "gallerySection"}, {"_type": "quoteSection"}, {"_type": "ctaSection"},
            {"_type": "timelineSection"}, {"_type": "cardsSection"}, {"_type": "divider"},
            {"_type": "section"}
        ]));
        let kinds: Vec<_> = compose(&blocks, &ctx()).iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec!["hero", "text", "media", "gallery", "quote", "cta", "timeline", "cards", "divider", "legacy"]
        );
    }

    #[test]
    fn missing_background_defaults_to_white() {
        let html = render_section(&Section::Quote(QuoteSection::default()), &ctx())
            .unwrap()
            .into_string();
        assert!(html.contains("bg-white"));
    }

    #[test]
    fn divider_styles() {
        let line = render_divider(&DividerSection { style: DividerStyle::Line }).into_string();
        assert_eq!(line, r#"<hr class="divider divider--line">"#);
        let space = render_divider(&DividerSection { style: DividerStyle::SpaceLarge }).into_string();
        assert!(space.contains("spacer--large"));
    }

    #[test]
    fn hero_uses_hero_resolution() {
        let blocks = parse_sections(&json!([{
            "_type": "heroSection",
            "title": "Buurt",
            "backgroundImage": {"asset": {"_ref": "image-abc-3000x2000-jpg"}},
            "button": {"text": "Meedoen", "link": "/buurt-acties"}
        }]));
        let html = compose(&blocks, &ctx())[0].markup.clone().into_string();
        assert!(html.contains("w=1920&amp;h=1080"));
        assert!(html.contains(r#"href="/buurt-acties""#));
        assert!(html.contains("Meedoen"));
    }

    #[test]
    fn button_without_link_is_omitted() {
        let cta = CtaSection {
            title: Some("Doe mee".into()),
            button: Some(Button { text: Some("Klik".into()), ..Default::default() }),
            ..Default::default()
        };
        let html = render_cta(&cta).into_string();
        assert!(!html.contains("Klik"));
    }

    #[test]
    fn legacy_renders_as_media() {
        let blocks = parse_sections(&json!([{
            "_type": "section",
            "title": "Oud blok",
            "layout": "imageRight",
            "image": {"asset": {"_ref": "image-abc-800x600-png"}}
        }]));
        let html = compose(&blocks, &ctx())[0].markup.clone().into_string();
        assert!(html.contains("media-section"));
        assert!(html.contains("media--image-right"));
        assert!(html.contains("w=1200"));
    }

    #[test]
    fn page_wraps_sections_with_keys() {
        let blocks = parse_sections(&json!([{"_type": "divider", "_key": "d1"}]));
        let html = render_page(&blocks, &ctx()).into_string();
        assert!(html.contains(r#"class="page-section""#));
        assert!(html.contains(r#"data-key="d1""#));
        assert!(html.contains(r#"data-kind="divider""#));
    }
}
