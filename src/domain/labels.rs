use std::collections::BTreeMap;

/// A cross-reference label pointing at an anchored section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Name of the document holding the section.
    pub docname: String,
    /// The anchor id within that document.
    pub anchor: String,
    /// The section heading, used as the default link text.
    pub title: String,
}

/// Write access to the host's global cross-reference label table.
///
/// Transforms receive a registrar instead of touching global state, so the
/// host decides how (and whether) registrations are shared between documents.
pub trait Registrar {
    /// Registers `label` under its anchor name.
    fn register(&mut self, label: Label);
}

/// Buffers registrations for later merging.
impl Registrar for Vec<Label> {
    fn register(&mut self, label: Label) {
        self.push(label);
    }
}

/// A label table keyed by anchor name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: BTreeMap<String, Label>,
}

impl LabelTable {
    /// Looks up a label by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.get(name)
    }

    /// Returns the number of registered labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` if no labels are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates over labels in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Label)> {
        self.labels.iter().map(|(name, label)| (name.as_str(), label))
    }
}

impl Registrar for LabelTable {
    fn register(&mut self, label: Label) {
        if let Some(existing) = self.labels.get(&label.anchor) {
            if existing.docname != label.docname {
                tracing::warn!(
                    "duplicate label '{}', other instance in '{}'",
                    label.anchor,
                    existing.docname
                );
            }
        }
        self.labels.insert(label.anchor.clone(), label);
    }
}

impl Extend<Label> for LabelTable {
    fn extend<T: IntoIterator<Item = Label>>(&mut self, iter: T) {
        for label in iter {
            self.register(label);
        }
    }
}
