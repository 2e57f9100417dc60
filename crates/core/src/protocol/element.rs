//! Minimal owned element tree for qbXML documents.

/// An XML element with attributes, optional text, and child elements.
///
/// qbXML never mixes text and child elements in one node, so an element
/// carries either `text` or `children`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    /// Tag name.
    pub name: String,
    /// Attributes in document order.
    pub attributes: Vec<(String, String)>,
    /// Text content, unescaped.
    pub text: Option<String>,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Creates an empty element.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Creates a text-only element, `<name>text</name>`.
    #[must_use]
    pub fn leaf(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    /// Creates `<name><FullName>value</FullName></name>`, the qbXML
    /// reference shape.
    #[must_use]
    pub fn full_name_ref(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name).with_child(Self::leaf("FullName", value))
    }

    /// Adds an attribute.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    /// Appends a child element.
    #[must_use]
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Appends a text child element.
    #[must_use]
    pub fn with_leaf(self, name: &str, text: impl Into<String>) -> Self {
        self.with_child(Self::leaf(name, text))
    }

    /// Appends a text child element when the value is present and non-blank.
    #[must_use]
    pub fn with_opt_leaf(self, name: &str, text: Option<&str>) -> Self {
        match text.map(str::trim).filter(|t| !t.is_empty()) {
            Some(t) => self.with_leaf(name, t),
            None => self,
        }
    }

    /// Appends several child elements.
    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the first child with the given name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Iterates over children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the text of the first child with the given name.
    #[must_use]
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).and_then(|c| c.text.as_deref())
    }

    /// Follows a path of child names, e.g. `["ParentRef", "FullName"]`.
    #[must_use]
    pub fn path(&self, names: &[&str]) -> Option<&Element> {
        names.iter().try_fold(self, |node, name| node.child(name))
    }

    /// Returns the text at the end of a path of child names.
    #[must_use]
    pub fn path_text(&self, names: &[&str]) -> Option<&str> {
        self.path(names).and_then(|e| e.text.as_deref())
    }
}
