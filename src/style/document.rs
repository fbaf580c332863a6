//! Minimal document model for `append_css`.

use tracing::debug;

/// Identifier of an element within a document.
pub type ElementId = usize;

/// The subset of a DOM that style injection needs.
pub trait StyleDocument {
    /// First `<style>` element attached to the document, in tree order.
    fn first_style(&self) -> Option<ElementId>;

    /// The `<head>` element, if the document has one.
    fn head(&self) -> Option<ElementId>;

    /// Create a detached `<style>` element.
    fn create_style(&mut self) -> ElementId;

    /// Attach `child` as the last child of `parent`.
    fn append_child(&mut self, parent: ElementId, child: ElementId);

    /// Append a text node to `element`.
    fn append_text(&mut self, element: ElementId, text: &str);
}

/// Append `css_text` to the document's first `<style>` element, creating
/// one under `<head>` when there is none.
///
/// Without a head the new element stays detached, so the next call creates
/// another one.
pub fn append_css<D: StyleDocument>(document: &mut D, css_text: &str) -> ElementId {
    let style = match document.first_style() {
        Some(style) => style,
        None => {
            let style = document.create_style();
            match document.head() {
                Some(head) => document.append_child(head, style),
                None => debug!("Document has no head, style element left detached"),
            }
            style
        }
    };

    document.append_text(style, css_text);
    style
}

#[derive(Debug, Clone)]
enum Node {
    Element {
        tag: String,
        children: Vec<ElementId>,
    },
    Text(String),
}

/// An in-memory document with an `<html>` root.
#[derive(Debug, Clone)]
pub struct HeadlessDocument {
    nodes: Vec<Node>,
    head: Option<ElementId>,
}

const ROOT: ElementId = 0;

impl HeadlessDocument {
    /// `<html><head></head></html>`.
    pub fn new() -> Self {
        let mut document = Self::without_head();
        let head = document.push_element("head");
        document.append_child(ROOT, head);
        document.head = Some(head);
        document
    }

    /// `<html></html>`.
    pub fn without_head() -> Self {
        Self {
            nodes: vec![Node::Element {
                tag: "html".to_string(),
                children: Vec::new(),
            }],
            head: None,
        }
    }

    /// Concatenated text content of `element`.
    pub fn text_content(&self, element: ElementId) -> String {
        match self.nodes.get(element) {
            Some(Node::Text(text)) => text.clone(),
            Some(Node::Element { children, .. }) => children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
            None => String::new(),
        }
    }

    /// Serialize the attached tree.
    pub fn to_html(&self) -> String {
        self.render(ROOT)
    }

    /// Number of `<style>` elements ever created, attached or not.
    pub fn style_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Element { tag, .. } if tag == "style"))
            .count()
    }

    fn push_element(&mut self, tag: &str) -> ElementId {
        self.nodes.push(Node::Element {
            tag: tag.to_string(),
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn render(&self, id: ElementId) -> String {
        match &self.nodes[id] {
            Node::Text(text) => text.clone(),
            Node::Element { tag, children } => {
                let inner: String = children.iter().map(|child| self.render(*child)).collect();
                format!("<{tag}>{inner}</{tag}>")
            }
        }
    }

    fn find_tag(&self, id: ElementId, wanted: &str) -> Option<ElementId> {
        match &self.nodes[id] {
            Node::Text(_) => None,
            Node::Element { tag, children } => {
                if tag == wanted {
                    return Some(id);
                }
                children.iter().find_map(|child| self.find_tag(*child, wanted))
            }
        }
    }
}

impl Default for HeadlessDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleDocument for HeadlessDocument {
    fn first_style(&self) -> Option<ElementId> {
        self.find_tag(ROOT, "style")
    }

    fn head(&self) -> Option<ElementId> {
        self.head
    }

    fn create_style(&mut self) -> ElementId {
        self.push_element("style")
    }

    fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if let Some(Node::Element { children, .. }) = self.nodes.get_mut(parent) {
            children.push(child);
        }
    }

    fn append_text(&mut self, element: ElementId, text: &str) {
        self.nodes.push(Node::Text(text.to_string()));
        let text_id = self.nodes.len() - 1;
        self.append_child(element, text_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_style_in_head() {
        let mut document = HeadlessDocument::new();
        let style = append_css(&mut document, "body { margin: 0 }");

        assert_eq!(document.head(), Some(1));
        assert_eq!(document.text_content(style), "body { margin: 0 }");
        assert_eq!(
            document.to_html(),
            "<html><head><style>body { margin: 0 }</style></head></html>"
        );
    }

    #[test]
    fn test_reuses_existing_style() {
        let mut document = HeadlessDocument::new();
        let first = append_css(&mut document, "a{}");
        let second = append_css(&mut document, "b{}");

        assert_eq!(first, second);
        assert_eq!(document.style_count(), 1);
        assert_eq!(document.text_content(first), "a{}b{}");
    }

    #[test]
    fn test_without_head_stays_detached() {
        let mut document = HeadlessDocument::without_head();
        let first = append_css(&mut document, "a{}");
        let second = append_css(&mut document, "b{}");

        assert_ne!(first, second);
        assert_eq!(document.style_count(), 2);
        assert_eq!(document.to_html(), "<html></html>");
        assert_eq!(document.text_content(first), "a{}");
    }
}
