use std::collections::BTreeMap;

/// Position of a section in the tree, as child indices from the document root.
///
/// Only sections are followed, so each index selects the n-th block of the
/// document (first element) or of the enclosing section.
pub type SectionPath = Vec<usize>;

/// A parsed document supplied by the host for a single build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    name: String,
    children: Vec<Block>,
    ids: BTreeMap<String, SectionPath>,
}

/// A block-level node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A titled section with nested content.
    Section(Section),
    /// A run of inline content.
    Paragraph(Vec<Inline>),
    /// A bullet or enumerated list; each item holds its own blocks.
    List(Vec<Vec<Block>>),
}

/// A section: a heading plus the blocks that follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    /// Anchor identifiers attached to the section.
    pub ids: Vec<String>,
    /// The heading content.
    pub title: Vec<Inline>,
    /// Nested blocks, including subsections.
    pub children: Vec<Block>,
}

/// An inline node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// Emphasised content.
    Emphasis(Vec<Inline>),
    /// Strongly emphasised content.
    Strong(Vec<Inline>),
    /// Inline code. Its contents are never rewritten.
    Literal(String),
    /// A hyperlink.
    Reference(Reference),
    /// A role invocation that has not yet been resolved, e.g. `:version:`25.5.0``.
    Role {
        /// The role name.
        name: String,
        /// The text between the backticks.
        text: String,
    },
}

/// A hyperlink node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reference {
    /// The visible link text.
    pub text: String,
    /// The link target.
    pub uri: String,
    /// The browsing context to open the link in, e.g. `_blank`.
    pub target: Option<String>,
    /// The link relation, e.g. `noopener`.
    pub rel: Option<String>,
}

impl Reference {
    /// Creates a reference with the given text and target URI.
    pub fn new(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            uri: uri.into(),
            target: None,
            rel: None,
        }
    }
}

impl Inline {
    /// Creates a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Appends the visible text of this node to `out`.
    fn write_text(&self, out: &mut String) {
        match self {
            Self::Text(text) | Self::Literal(text) => out.push_str(text),
            Self::Emphasis(children) | Self::Strong(children) => {
                children.iter().for_each(|child| child.write_text(out));
            }
            Self::Reference(reference) => out.push_str(&reference.text),
            Self::Role { text, .. } => out.push_str(text),
        }
    }
}

/// Returns the visible text of a sequence of inlines.
#[must_use]
pub fn astext(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        inline.write_text(&mut out);
    }
    out
}

impl Section {
    /// Creates a section with a plain-text title.
    pub fn new(title: impl Into<String>, children: Vec<Block>) -> Self {
        Self {
            ids: Vec::new(),
            title: vec![Inline::text(title)],
            children,
        }
    }

    /// Returns the visible text of the section heading.
    #[must_use]
    pub fn title_text(&self) -> String {
        astext(&self.title)
    }
}

impl Document {
    /// Creates a document with the given name and content.
    ///
    /// Section ids already present in the tree are entered into the
    /// document's anchor table.
    pub fn new(name: impl Into<String>, children: Vec<Block>) -> Self {
        let mut document = Self {
            name: name.into(),
            children,
            ids: BTreeMap::new(),
        };

        let mut existing = Vec::new();
        document.visit_sections(&mut |path: &[usize], section: &Section| {
            for id in &section.ids {
                existing.push((id.clone(), path.to_vec()));
            }
        });
        document.ids.extend(existing);

        document
    }

    /// The host's name for this document, e.g. `docs/changelog`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The top-level blocks.
    #[must_use]
    pub fn children(&self) -> &[Block] {
        &self.children
    }

    /// The anchor-id table.
    #[must_use]
    pub const fn ids(&self) -> &BTreeMap<String, SectionPath> {
        &self.ids
    }

    /// Looks up the section registered under `id`.
    #[must_use]
    pub fn section_by_id(&self, id: &str) -> Option<&Section> {
        self.ids.get(id).and_then(|path| self.section(path))
    }

    /// Returns the section at `path`.
    #[must_use]
    pub fn section(&self, path: &[usize]) -> Option<&Section> {
        let (first, rest) = path.split_first()?;
        let mut section = match self.children.get(*first)? {
            Block::Section(section) => section,
            _ => return None,
        };
        for index in rest {
            section = match section.children.get(*index)? {
                Block::Section(section) => section,
                _ => return None,
            };
        }
        Some(section)
    }

    /// Returns the section at `path` for modification.
    pub fn section_mut(&mut self, path: &[usize]) -> Option<&mut Section> {
        let (first, rest) = path.split_first()?;
        let mut section = match self.children.get_mut(*first)? {
            Block::Section(section) => section,
            _ => return None,
        };
        for index in rest {
            section = match section.children.get_mut(*index)? {
                Block::Section(section) => section,
                _ => return None,
            };
        }
        Some(section)
    }

    /// Makes `id` the sole identifier of the section at `path`.
    ///
    /// Identifiers previously attached to that section are removed from the
    /// anchor table. Returns `false` if there is no section at `path`.
    pub fn set_section_id(&mut self, path: &[usize], id: String) -> bool {
        let Some(section) = self.section_mut(path) else {
            return false;
        };
        let stale = std::mem::replace(&mut section.ids, vec![id.clone()]);

        for old in stale {
            if self.ids.get(&old).is_some_and(|p| p == path) {
                self.ids.remove(&old);
            }
        }
        if let Some(previous) = self.ids.insert(id.clone(), path.to_vec()) {
            if previous != path {
                tracing::warn!(
                    "duplicate anchor '{id}' in document '{}'; the later section wins",
                    self.name
                );
            }
        }
        true
    }

    /// Calls `f` for every section, depth first, with its path.
    pub fn visit_sections(&self, f: &mut impl FnMut(&[usize], &Section)) {
        fn walk(
            blocks: &[Block],
            path: &mut Vec<usize>,
            f: &mut impl FnMut(&[usize], &Section),
        ) {
            for (index, block) in blocks.iter().enumerate() {
                if let Block::Section(section) = block {
                    path.push(index);
                    f(path, section);
                    walk(&section.children, path, f);
                    path.pop();
                }
            }
        }

        walk(&self.children, &mut Vec::new(), f);
    }

    /// Calls `f` on every inline sequence that may hold rewritable text.
    ///
    /// This covers section titles, paragraphs, list items, and the contents
    /// of emphasis and strong spans. Literal and reference contents are not
    /// visited.
    pub fn visit_inlines_mut(&mut self, f: &mut impl FnMut(&mut Vec<Inline>)) {
        fn inlines(nodes: &mut Vec<Inline>, f: &mut impl FnMut(&mut Vec<Inline>)) {
            for node in nodes.iter_mut() {
                if let Inline::Emphasis(children) | Inline::Strong(children) = node {
                    inlines(children, f);
                }
            }
            f(nodes);
        }

        fn blocks(nodes: &mut [Block], f: &mut impl FnMut(&mut Vec<Inline>)) {
            for node in nodes {
                match node {
                    Block::Section(section) => {
                        inlines(&mut section.title, f);
                        blocks(&mut section.children, f);
                    }
                    Block::Paragraph(content) => inlines(content, f),
                    Block::List(items) => {
                        for item in items {
                            blocks(item, f);
                        }
                    }
                }
            }
        }

        blocks(&mut self.children, f);
    }

    /// Returns every reference in document order.
    #[must_use]
    pub fn references(&self) -> Vec<&Reference> {
        fn inlines<'a>(nodes: &'a [Inline], out: &mut Vec<&'a Reference>) {
            for node in nodes {
                match node {
                    Inline::Reference(reference) => out.push(reference),
                    Inline::Emphasis(children) | Inline::Strong(children) => {
                        inlines(children, out);
                    }
                    _ => {}
                }
            }
        }

        fn blocks<'a>(nodes: &'a [Block], out: &mut Vec<&'a Reference>) {
            for node in nodes {
                match node {
                    Block::Section(section) => {
                        inlines(&section.title, out);
                        blocks(&section.children, out);
                    }
                    Block::Paragraph(content) => inlines(content, out),
                    Block::List(items) => items.iter().for_each(|item| blocks(item, out)),
                }
            }
        }

        let mut out = Vec::new();
        blocks(&self.children, &mut out);
        out
    }
}
