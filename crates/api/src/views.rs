//! Server-rendered public pages.

use buurt_core::content::{BuurtActie, Gallery, Navigation, NewsPost, Page, SiteSettings};
use buurt_core::sections::rich_text::render_rich_text;
use buurt_core::sections::{render_page, ImageTarget, RenderContext};
use chrono::{DateTime, Utc};
use maud::{html, Markup, DOCTYPE};

const DEFAULT_TITLE: &str = "Buurtvereniging";

/// Site-wide data every page is framed with.
#[derive(Debug, Clone, Default)]
pub struct Chrome {
    pub settings: SiteSettings,
    pub navigation: Navigation,
}

impl Chrome {
    fn site_title(&self) -> &str {
        if self.settings.title.is_empty() {
            DEFAULT_TITLE
        } else {
            &self.settings.title
        }
    }
}

fn format_datetime(at: &DateTime<Utc>) -> String {
    at.format("%d-%m-%Y %H:%M").to_string()
}

fn layout(chrome: &Chrome, title: &str, body: Markup) -> Markup {
    let site_title = chrome.site_title();
    html! {
        (DOCTYPE)
        html lang="nl" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title {
                    @if title.is_empty() { (site_title) } @else { (title) " | " (site_title) }
                }
                @if let Some(description) = &chrome.settings.description {
                    meta name="description" content=(description);
                }
                link rel="stylesheet" href="/static/site.css";
            }
            body {
                header.site-header {
                    a.site-header__brand href="/" { (site_title) }
                    nav.site-nav {
                        ul {
                            @for item in &chrome.navigation.items {
                                li { a href=(item.href) { (item.label) } }
                            }
                        }
                    }
                }
                main { (body) }
                footer.site-footer {
                    p { (site_title) }
                    @if let Some(email) = &chrome.settings.contact_email {
                        p { a href={ "mailto:" (email) } { (email) } }
                    }
                }
            }
        }
    }
}

/// Bare page for errors; never depends on fetched data.
pub fn error_page(message: &str) -> Markup {
    layout(
        &Chrome::default(),
        message,
        html! {
            section.error-page {
                h1 { (message) }
                p { a href="/" { "Terug naar de homepagina" } }
            }
        },
    )
}

fn news_card(post: &NewsPost, ctx: &RenderContext) -> Markup {
    let href = post.slug().map(|slug| format!("/nieuws/{slug}"));
    html! {
        article.card {
            @if let Some(src) = post.main_image.as_ref().and_then(|img| ctx.images.url(img, ImageTarget::THUMBNAIL)) {
                img src=(src) alt=(post.title) loading="lazy";
            }
            h3 {
                @if let Some(href) = &href { a href=(href) { (post.title) } } @else { (post.title) }
            }
            @if let Some(at) = &post.published_at {
                time datetime=(at.to_rfc3339()) { (format_datetime(at)) }
            }
            @if let Some(excerpt) = &post.excerpt {
                p { (excerpt) }
            }
        }
    }
}

fn action_card(action: &BuurtActie, ctx: &RenderContext) -> Markup {
    let href = action.slug().map(|slug| format!("/buurt-acties/{slug}"));
    html! {
        article.card {
            @if let Some(src) = action.image.as_ref().and_then(|img| ctx.images.url(img, ImageTarget::THUMBNAIL)) {
                img src=(src) alt=(action.title) loading="lazy";
            }
            h3 {
                @if let Some(href) = &href { a href=(href) { (action.title) } } @else { (action.title) }
            }
            @if let Some(at) = &action.datetime {
                time datetime=(at.to_rfc3339()) { (format_datetime(at)) }
            }
            @if let Some(location) = &action.location {
                p.card__location { (location) }
            }
        }
    }
}

pub fn home(
    chrome: &Chrome,
    page: Option<&Page>,
    news: &[NewsPost],
    actions: &[BuurtActie],
    ctx: &RenderContext,
) -> Markup {
    let body = html! {
        @if let Some(page) = page {
            (render_page(&page.blocks(), ctx))
        } @else {
            section.intro {
                h1 { (chrome.site_title()) }
                @if let Some(description) = &chrome.settings.description {
                    p { (description) }
                }
            }
        }
        @if !actions.is_empty() {
            section.home-actions {
                h2 { "Komende buurt acties" }
                div.cards { @for action in actions { (action_card(action, ctx)) } }
                a href="/buurt-acties" { "Alle buurt acties" }
            }
        }
        @if !news.is_empty() {
            section.home-news {
                h2 { "Laatste nieuws" }
                div.cards { @for post in news { (news_card(post, ctx)) } }
                a href="/nieuws" { "Al het nieuws" }
            }
        }
    };
    layout(chrome, "", body)
}

pub fn news_list(chrome: &Chrome, posts: &[NewsPost], ctx: &RenderContext) -> Markup {
    layout(
        chrome,
        "Nieuws",
        html! {
            section.listing {
                h1 { "Nieuws" }
                @if posts.is_empty() {
                    p.empty { "Er zijn nog geen nieuwsberichten." }
                }
                div.cards { @for post in posts { (news_card(post, ctx)) } }
            }
        },
    )
}

pub fn news_post(chrome: &Chrome, post: &NewsPost, ctx: &RenderContext) -> Markup {
    layout(
        chrome,
        &post.title,
        html! {
            article.news-post {
                h1 { (post.title) }
                @if let Some(at) = &post.published_at {
                    time datetime=(at.to_rfc3339()) { (format_datetime(at)) }
                }
                @if let Some(src) = post.main_image.as_ref().and_then(|img| ctx.images.url(img, ImageTarget::MEDIA)) {
                    img.news-post__image src=(src) alt=(post.title);
                }
                div.rich-text { (render_rich_text(&post.body, &ctx.images)) }
                a href="/nieuws" { "Terug naar nieuws" }
            }
        },
    )
}

pub fn action_list(chrome: &Chrome, actions: &[BuurtActie], ctx: &RenderContext) -> Markup {
    layout(
        chrome,
        "Buurt acties",
        html! {
            section.listing {
                h1 { "Buurt acties" }
                @if actions.is_empty() {
                    p.empty { "Er zijn op dit moment geen buurt acties gepland." }
                }
                div.cards { @for action in actions { (action_card(action, ctx)) } }
            }
        },
    )
}

pub fn action(chrome: &Chrome, action: &BuurtActie, ctx: &RenderContext) -> Markup {
    layout(
        chrome,
        &action.title,
        html! {
            article.buurt-actie {
                h1 { (action.title) }
                dl.buurt-actie__facts {
                    @if let Some(at) = &action.datetime {
                        dt { "Wanneer" }
                        dd { time datetime=(at.to_rfc3339()) { (format_datetime(at)) } }
                    }
                    @if let Some(location) = &action.location {
                        dt { "Waar" }
                        dd { (location) }
                    }
                    @if let Some(max) = action.max_participants {
                        dt { "Maximaal aantal deelnemers" }
                        dd { (max) }
                    }
                }
                @if let Some(src) = action.image.as_ref().and_then(|img| ctx.images.url(img, ImageTarget::MEDIA)) {
                    img.buurt-actie__image src=(src) alt=(action.title);
                }
                div.rich-text { (render_rich_text(&action.description, &ctx.images)) }

                form.registration-form method="post" action="/api/registration" data-json="true" {
                    h2 { "Inschrijven" }
                    input type="hidden" name="buurtActieId" value=(action.id);
                    label { "Naam" input type="text" name="name" required; }
                    label { "E-mail" input type="email" name="email" required; }
                    label { "Telefoon" input type="tel" name="phone"; }
                    label { "Opmerking" textarea name="message" {} }
                    button type="submit" { "Inschrijven" }
                }
            }
        },
    )
}

pub fn gallery_list(chrome: &Chrome, galleries: &[Gallery], ctx: &RenderContext) -> Markup {
    layout(
        chrome,
        "Galerij",
        html! {
            section.listing {
                h1 { "Galerij" }
                div.cards {
                    @for gallery in galleries {
                        article.card {
                            @if let Some(src) = gallery.images.first().and_then(|img| ctx.images.url(img, ImageTarget::THUMBNAIL)) {
                                img src=(src) alt=(gallery.title) loading="lazy";
                            }
                            h3 {
                                @if let Some(slug) = gallery.slug() {
                                    a href={ "/galerij/" (slug) } { (gallery.title) }
                                } @else {
                                    (gallery.title)
                                }
                            }
                            @if let Some(date) = gallery.date {
                                time datetime=(date.to_string()) { (date.format("%d-%m-%Y")) }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn gallery(chrome: &Chrome, gallery: &Gallery, ctx: &RenderContext) -> Markup {
    layout(
        chrome,
        &gallery.title,
        html! {
            section.gallery-detail {
                h1 { (gallery.title) }
                div.gallery.gallery--grid {
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
                a href="/galerij" { "Terug naar de galerij" }
            }
        },
    )
}

pub fn page(chrome: &Chrome, page: &Page, ctx: &RenderContext) -> Markup {
    layout(chrome, &page.title, render_page(&page.blocks(), ctx))
}
