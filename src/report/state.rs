//! Aggregate state of the live report.
//!
//! Facts are stored exactly as received. Classification into unused, removed
//! and used APIs happens on every render and never mutates the stored facts.

use std::collections::BTreeMap;

use crate::facts::{DiscoveredApi, DiscoveredApiDeclarationSource, DiscoveredReference, Fact};

/// Every fact ingested so far, keyed by API identity.
///
/// `BTreeMap` keeps identities in ordinal order, which is the order every
/// section of the report uses.
#[derive(Debug, Default, Clone)]
pub struct ReportState {
    sources: Vec<DiscoveredApiDeclarationSource>,
    apis: BTreeMap<String, Vec<DiscoveredApi>>,
    references: BTreeMap<String, Vec<DiscoveredReference>>,
}

/// Render-time classification of the aggregate state.
#[derive(Debug)]
pub struct Partition<'a> {
    /// Declared, never referenced, and not excluded by every declaration
    pub unused: Vec<(&'a str, &'a [DiscoveredApi])>,
    /// Referenced but no longer declared
    pub removed: Vec<(&'a str, &'a [DiscoveredReference])>,
    /// Referenced and still declared
    pub used: Vec<(&'a str, &'a [DiscoveredReference])>,
}

impl ReportState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch of facts, preserving arrival order within each key.
    pub fn ingest<I>(&mut self, batch: I)
    where
        I: IntoIterator<Item = Fact>,
    {
        for fact in batch {
            match fact {
                Fact::DeclarationSource(source) => self.sources.push(source),
                Fact::Api(api) => self
                    .apis
                    .entry(api.api_identity.clone())
                    .or_default()
                    .push(api),
                Fact::Reference(reference) => self
                    .references
                    .entry(reference.api_identity.clone())
                    .or_default()
                    .push(reference),
            }
        }
    }

    pub fn sources(&self) -> &[DiscoveredApiDeclarationSource] {
        &self.sources
    }

    /// Declarations of `identity`, in arrival order.
    pub fn declarations(&self, identity: &str) -> Option<&[DiscoveredApi]> {
        self.apis.get(identity).map(Vec::as_slice)
    }

    /// Every reference, grouped by identity in ordinal order.
    pub fn all_references(&self) -> impl Iterator<Item = &DiscoveredReference> {
        self.references.values().flatten()
    }

    /// Classify identities into unused, removed and used, each sorted by identity.
    pub fn partition(&self) -> Partition<'_> {
        let mut removed = Vec::new();
        let mut used = Vec::new();
        for (identity, references) in &self.references {
            let entry = (identity.as_str(), references.as_slice());
            if self.apis.contains_key(identity) {
                used.push(entry);
            } else {
                removed.push(entry);
            }
        }

        let unused = self
            .apis
            .iter()
            .filter(|(identity, _)| !self.references.contains_key(*identity))
            .filter(|(_, declarations)| !declarations.iter().all(|d| d.exclude_from_unused_report))
            .map(|(identity, declarations)| (identity.as_str(), declarations.as_slice()))
            .collect();

        Partition {
            unused,
            removed,
            used,
        }
    }
}
