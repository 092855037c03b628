use crawl_logging::crawl_warn;
use ego_tree::NodeRef;
use scraper::node::Node;
use scraper::{ElementRef, Selector};

/// Descendants of `scope` matching `css`. An unparsable selector matches nothing.
pub(crate) fn select_all<'a>(scope: ElementRef<'a>, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => scope.select(&selector).collect(),
        Err(err) => {
            crawl_warn!("Ignoring invalid selector {css:?}: {err}");
            Vec::new()
        }
    }
}

/// Concatenated direct text children of `element`; text inside nested elements is skipped.
pub(crate) fn direct_text(element: ElementRef<'_>) -> String {
    let raw: String = element.children().filter_map(text_of).collect();
    normalize_text(&raw)
}

/// Direct text of every match of `css` inside `scope`, joined.
pub(crate) fn joined_text(scope: ElementRef<'_>, css: &str) -> String {
    let joined: String = select_all(scope, css).into_iter().map(direct_text).collect();
    normalize_text(&joined)
}

/// Values of `attr` on every match of `css` inside `scope`, joined.
pub(crate) fn joined_attr(scope: ElementRef<'_>, css: &str, attr: &str) -> String {
    let joined: String = select_all(scope, css)
        .into_iter()
        .filter_map(|element| element.value().attr(attr))
        .collect();
    normalize_text(&joined)
}

/// Positional index encoded as the last `_`-separated segment of an id or headers value,
/// e.g. `BREAK_COUNTRY_NAME_3` -> 3.
pub(crate) fn trailing_index(value: &str) -> Option<u32> {
    let (_, index) = value.rsplit_once('_')?;
    index.trim().parse().ok()
}

fn text_of<'a>(node: NodeRef<'a, Node>) -> Option<&'a str> {
    match node.value() {
        Node::Text(text) => Some(&**text),
        _ => None,
    }
}

/// `&nbsp;` becomes a plain space; surrounding whitespace is dropped.
fn normalize_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn direct_text_skips_nested_elements() {
        let doc = Html::parse_fragment("<p>Hello&nbsp;<b>bold</b>world </p>");
        let p = select_all(doc.root_element(), "p")[0];
        assert_eq!(direct_text(p), "Hello world");
    }

    #[test]
    fn trailing_index_reads_last_segment() {
        assert_eq!(trailing_index("BREAK_COUNTRY_NAME_12"), Some(12));
        assert_eq!(trailing_index("LINK BREAK_COUNTRY_NAME_1"), Some(1));
        assert_eq!(trailing_index("NOINDEX"), None);
        assert_eq!(trailing_index("BREAK_COUNTRY_NAME_x"), None);
    }
}
