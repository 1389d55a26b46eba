//! Rich text (portable-text block arrays) rendered to HTML.

use maud::{html, Markup};
use serde::Deserialize;
use serde_json::Value;

use super::image::{ImageCdn, ImageSource, ImageTarget};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Block {
    style: Option<String>,
    list_item: Option<String>,
    children: Vec<Span>,
    mark_defs: Vec<MarkDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct Span {
    text: String,
    marks: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct MarkDef {
    #[serde(rename = "_key")]
    key: String,
    href: Option<String>,
}

enum Node {
    Block(Block),
    List { ordered: bool, items: Vec<Block> },
    Image(ImageSource),
}

/// Render a block array. Unknown block types and malformed blocks are
/// skipped; consecutive list items are grouped into one list.
pub fn render_rich_text(blocks: &[Value], cdn: &ImageCdn) -> Markup {
    let nodes = group(blocks);
    html! {
        @for node in &nodes {
            (render_node(node, cdn))
        }
    }
}

fn render_node(node: &Node, cdn: &ImageCdn) -> Markup {
    match node {
        Node::Block(block) => render_block(block),
        Node::List {
            ordered: true,
            items,
        } => html! { ol { @for item in items { li { (render_children(item)) } } } },
        Node::List {
            ordered: false,
            items,
        } => html! { ul { @for item in items { li { (render_children(item)) } } } },
        Node::Image(image) => match cdn.url(image, ImageTarget::MEDIA) {
            Some(src) => html! {
                figure.rich-text-image {
                    img src=(src) alt=(image.alt.as_deref().unwrap_or_default()) loading="lazy";
                    @if let Some(caption) = &image.caption {
                        figcaption { (caption) }
                    }
                }
            },
            None => html! {},
        },
    }
}

/// Plain text of a block array, for excerpts and email bodies.
pub fn plain_text(blocks: &[Value]) -> String {
    blocks
        .iter()
        .filter_map(|b| serde_json::from_value::<Block>(b.clone()).ok())
        .map(|b| b.children.iter().map(|s| s.text.as_str()).collect::<String>())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn group(blocks: &[Value]) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    for raw in blocks {
        match raw.get("_type").and_then(Value::as_str) {
            Some("block") => {}
            Some("image") => {
                if let Ok(image) = serde_json::from_value::<ImageSource>(raw.clone()) {
                    nodes.push(Node::Image(image));
                }
                continue;
            }
            _ => continue,
        }
        let Ok(block) = serde_json::from_value::<Block>(raw.clone()) else {
            continue;
        };
        let ordered = match block.list_item.as_deref() {
            Some("number") => true,
            Some(_) => false,
            None => {
                nodes.push(Node::Block(block));
                continue;
            }
        };
        let continues_list =
            matches!(nodes.last(), Some(Node::List { ordered: o, .. }) if *o == ordered);
        if !continues_list {
            nodes.push(Node::List {
                ordered,
                items: Vec::new(),
            });
        }
        if let Some(Node::List { items, .. }) = nodes.last_mut() {
            items.push(block);
        }
    }
    nodes
}

fn render_block(block: &Block) -> Markup {
    let children = render_children(block);
    match block.style.as_deref().unwrap_or("normal") {
        "h2" => html! { h2 { (children) } },
        "h3" => html! { h3 { (children) } },
        "h4" => html! { h4 { (children) } },
        "blockquote" => html! { blockquote { (children) } },
        _ => html! { p { (children) } },
    }
}

fn render_children(block: &Block) -> Markup {
    html! {
        @for span in &block.children {
            (render_marked(&span.text, &span.marks, &block.mark_defs))
        }
    }
}

fn render_marked(text: &str, marks: &[String], defs: &[MarkDef]) -> Markup {
    let Some((mark, rest)) = marks.split_first() else {
        return html! { (text) };
    };
    let inner = render_marked(text, rest, defs);
    match mark.as_str() {
        "strong" => html! { strong { (inner) } },
        "em" => html! { em { (inner) } },
        "code" => html! { code { (inner) } },
        "underline" => html! { u { (inner) } },
        key => match defs.iter().find(|d| d.key == key).and_then(|d| d.href.as_deref()) {
            Some(href) => html! { a href=(href) { (inner) } },
            None => inner,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(blocks: Value) -> String {
        let blocks = blocks.as_array().cloned().unwrap_or_default();
        render_rich_text(&blocks, &ImageCdn::new("p", "d")).into_string()
    }

    #[test]
    fn renders_styles_and_marks() {
        let html = render(json!([
            {"_type": "block", "style": "h2", "children": [{"_type": "span", "text": "Welkom"}]},
            {"_type": "block", "children": [
                {"_type": "span", "text": "Kom "},
                {"_type": "span", "text": "langs", "marks": ["strong", "em"]}
            ]}
        ]));
        assert_eq!(
            html,
            "<h2>Welkom</h2><p>Kom <strong><em>langs</em></strong></p>"
        );
    }

    #[test]
    fn renders_link_annotations() {
        let html = render(json!([
            {"_type": "block", "markDefs": [{"_key": "l1", "_type": "link", "href": "https://buurt.nl"}],
             "children": [{"_type": "span", "text": "site", "marks": ["l1"]}]}
        ]));
        assert_eq!(html, r#"<p><a href="https://buurt.nl">site</a></p>"#);
    }

    #[test]
    fn groups_list_items() {
        let html = render(json!([
            {"_type": "block", "listItem": "bullet", "children": [{"text": "a"}]},
            {"_type": "block", "listItem": "bullet", "children": [{"text": "b"}]},
            {"_type": "block", "listItem": "number", "children": [{"text": "c"}]}
        ]));
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol>");
    }

    #[test]
    fn escapes_text_and_skips_unknown_blocks() {
        let html = render(json!([
            {"_type": "youtube", "url": "x"},
            {"_type": "block", "children": [{"text": "<script>"}]}
        ]));
        assert_eq!(html, "<p>&lt;script&gt;</p>");
    }

    #[test]
    fn plain_text_joins_blocks() {
        let blocks = json!([
            {"_type": "block", "children": [{"text": "Een "}, {"text": "twee"}]},
            {"_type": "block", "children": [{"text": "drie"}]}
        ]);
        assert_eq!(plain_text(blocks.as_array().unwrap()), "Een twee\n\ndrie");
    }
}
