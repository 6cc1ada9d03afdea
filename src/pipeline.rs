use std::collections::BTreeMap;

use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use tracing::instrument;

use crate::{
    domain::{Document, Inline, Label, LabelTable, Registrar, Settings},
    transform::{GithubLinks, Outcome, Role, Transform, VersionAnchors, VersionRole},
};

/// Runs roles and transforms over the documents of a build.
///
/// Built from validated [`Settings`], so configuration errors have already
/// been reported by the time any document is processed.
#[derive(Default)]
pub struct Pipeline {
    transforms: Vec<Box<dyn Transform>>,
    roles: BTreeMap<String, Box<dyn Role>>,
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    /// The document name.
    pub docname: String,
    /// Role invocations resolved.
    pub roles: usize,
    /// Outcome of each transform, in the order they ran.
    pub outcomes: Vec<(&'static str, Outcome)>,
}

impl Pipeline {
    /// Creates a pipeline with the transforms and roles enabled in `settings`.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let mut pipeline = Self::default();

        if let Some(github_links) = &settings.github_links {
            pipeline.register_transform(GithubLinks::new(github_links.clone()));
        }
        if let Some(version_anchors) = &settings.version_anchors {
            pipeline.register_role(
                VersionRole::NAME,
                VersionRole::new(version_anchors.format.clone()),
            );
            pipeline.register_transform(VersionAnchors::new(version_anchors.clone()));
        }

        pipeline
    }

    /// Adds a transform. Transforms run in ascending priority, and in
    /// registration order among equal priorities.
    pub fn register_transform(&mut self, transform: impl Transform + 'static) {
        self.transforms.push(Box::new(transform));
        self.transforms.sort_by_key(|transform| transform.priority());
    }

    /// Adds a role, replacing any role with the same name.
    pub fn register_role(&mut self, name: impl Into<String>, role: impl Role + 'static) {
        self.roles.insert(name.into(), Box::new(role));
    }

    /// Names of the registered transforms, in run order.
    pub fn transforms(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.transforms.iter().map(|transform| transform.name())
    }

    /// Processes a single document.
    ///
    /// Roles are resolved first, then each transform is applied.
    #[instrument(level = "debug", skip_all, fields(document = document.name()))]
    pub fn process(&self, document: &mut Document, registrar: &mut dyn Registrar) -> Report {
        let roles = self.resolve_roles(document);
        let outcomes = self
            .transforms
            .iter()
            .map(|transform| (transform.name(), transform.apply(document, registrar)))
            .collect();

        Report {
            docname: document.name().to_string(),
            roles,
            outcomes,
        }
    }

    /// Processes documents in parallel.
    ///
    /// Labels are buffered per document and merged into the returned table in
    /// document order, so the result does not depend on scheduling.
    pub fn process_all(&self, documents: &mut [Document]) -> (LabelTable, Vec<Report>) {
        let results: Vec<(Vec<Label>, Report)> = documents
            .par_iter_mut()
            .map(|document| {
                let mut labels: Vec<Label> = Vec::new();
                let report = self.process(document, &mut labels);
                (labels, report)
            })
            .collect();

        let mut table = LabelTable::default();
        let mut reports = Vec::with_capacity(results.len());
        for (labels, report) in results {
            table.extend(labels);
            reports.push(report);
        }
        (table, reports)
    }

    fn resolve_roles(&self, document: &mut Document) -> usize {
        let docname = document.name().to_string();
        let mut resolved = 0;

        document.visit_inlines_mut(&mut |inlines: &mut Vec<Inline>| {
            for inline in inlines.iter_mut() {
                let Inline::Role { name, text } = inline else {
                    continue;
                };
                if let Some(role) = self.roles.get(name.as_str()) {
                    *inline = role.run(text);
                    resolved += 1;
                } else {
                    tracing::warn!("unknown role '{name}' in '{docname}'");
                    *inline = Inline::Text(format!(":{name}:`{text}`"));
                }
            }
        });

        resolved
    }
}
