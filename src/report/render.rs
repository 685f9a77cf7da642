//! Document layout of the usage report.
//!
//! Rendering is a pure function of [`ReportState`]: every grouping is keyed by
//! an ordered map or set, so the same state always yields the same bytes.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write;

use super::state::{Partition, ReportState};
use crate::facts::{DiscoveredApi, DiscoveredReference};
use crate::kdl::{KdlError, KdlWriter};

/// Name of the synthetic reference that stands for build-generated source.
pub const GENERATED_SOURCE_REFERENCE: &str = "in-generated-source";

/// Render the full report for `subject_name`.
pub fn render_report(subject_name: &str, state: &ReportState) -> Result<String, KdlError> {
    let partition = state.partition();
    let mut w = KdlWriter::new(String::new());

    w.start_node("assembly")?;
    w.write_string_value(subject_name, false)?;

    write_api_sources(&mut w, state)?;
    write_stats(&mut w, state, &partition)?;

    if !partition.unused.is_empty() {
        w.blank_line()?;
        w.start_node("unused-apis")?;
        write_unused_apis(&mut w, &partition.unused)?;
        w.end_node()?;
    }

    if !partition.removed.is_empty() {
        w.blank_line()?;
        w.start_node("removed-apis")?;
        write_api_references(&mut w, state, &partition.removed)?;
        w.end_node()?;
    }

    if !partition.used.is_empty() {
        w.blank_line()?;
        write_api_references(&mut w, state, &partition.used)?;
    }

    w.end_node()?; // assembly
    w.finish()
}

fn write_api_sources<W: Write>(w: &mut KdlWriter<W>, state: &ReportState) -> Result<(), KdlError> {
    w.start_node("current-api-source")?;
    for source in state.sources() {
        write_leaf(w, "repo", &source.repository_url)?;
        write_leaf(w, "branch", &source.branch)?;
        write_leaf(w, "commit", &source.commit_id)?;
    }
    w.end_node()
}

fn write_stats<W: Write>(
    w: &mut KdlWriter<W>,
    state: &ReportState,
    partition: &Partition<'_>,
) -> Result<(), KdlError> {
    w.start_node("stats")?;

    write_count(w, "unused-api-count", partition.unused.len())?;
    write_count(w, "removed-api-count", partition.removed.len())?;
    write_count(w, "used-api-count", partition.used.len())?;

    for (version, references) in group_by(state.all_references(), |r| &r.api_version) {
        w.start_node("version")?;
        w.write_string_value(version, false)?;

        for (repository, references) in group_by(references, |r| &r.repository_url) {
            w.start_node("repo")?;
            w.write_string_value(repository, false)?;
            write_tfms(w, references.iter().map(|r| r.target_framework.as_str()))?;
            w.end_node()?; // repo
        }

        w.end_node()?; // version
    }

    w.end_node() // stats
}

fn write_unused_apis<W: Write>(
    w: &mut KdlWriter<W>,
    apis: &[(&str, &[DiscoveredApi])],
) -> Result<(), KdlError> {
    for &(identity, declarations) in apis {
        w.start_node("api")?;
        w.write_string_value(identity, true)?;

        if let Some(first) = declarations.first() {
            w.write_property_name("url", false)?;
            w.write_string_value(&first.declaration_url, false)?;
        }

        write_tfms(w, declarations.iter().map(|d| d.target_framework.as_str()))?;
        w.end_node()?; // api
    }
    Ok(())
}

fn write_api_references<W: Write>(
    w: &mut KdlWriter<W>,
    state: &ReportState,
    apis: &[(&str, &[DiscoveredReference])],
) -> Result<(), KdlError> {
    for &(identity, references) in apis {
        w.start_node("api")?;
        w.write_string_value(identity, true)?;

        if let Some(first) = state.declarations(identity).and_then(<[_]>::first) {
            w.write_property_name("url", false)?;
            w.write_string_value(&first.declaration_url, false)?;
        }

        for (version, references) in group_by(references, |r| &r.api_version) {
            w.start_node("version")?;
            w.write_string_value(version, false)?;

            for (repository, references) in group_by(references, |r| &r.repository_url) {
                w.start_node("repo")?;
                w.write_string_value(repository, false)?;
                write_repository_references(w, &references)?;
                w.end_node()?; // repo
            }

            w.end_node()?; // version
        }

        w.end_node()?; // api
    }
    Ok(())
}

/// One `reference` node per explicit URL, then the generated-source entry if
/// some framework was only referenced from generated source.
fn write_repository_references<W: Write>(
    w: &mut KdlWriter<W>,
    references: &[&DiscoveredReference],
) -> Result<(), KdlError> {
    let explicit = references
        .iter()
        .filter_map(|r| r.reference_url.as_deref().map(|url| (url, *r)));
    let mut by_url: BTreeMap<&str, Vec<&DiscoveredReference>> = BTreeMap::new();
    for (url, reference) in explicit {
        by_url.entry(url).or_default().push(reference);
    }

    let mut represented_tfms = BTreeSet::new();
    for (url, references) in &by_url {
        w.start_node("reference")?;
        w.write_string_value(url, false)?;
        let tfms: BTreeSet<&str> = references.iter().map(|r| r.target_framework.as_str()).collect();
        represented_tfms.extend(tfms.iter().copied());
        write_tfms(w, tfms)?;
        w.end_node()?; // reference
    }

    let generated_tfms: BTreeSet<&str> = references
        .iter()
        .filter(|r| r.reference_url.is_none())
        .map(|r| r.target_framework.as_str())
        .collect();
    if !generated_tfms.is_subset(&represented_tfms) {
        w.start_node("reference")?;
        w.write_string_value(GENERATED_SOURCE_REFERENCE, false)?;
        write_tfms(w, generated_tfms)?;
        w.end_node()?; // reference
    }

    Ok(())
}

/// Distinct frameworks in ordinal order, as a single-line child list.
fn write_tfms<'a, W: Write>(
    w: &mut KdlWriter<W>,
    tfms: impl IntoIterator<Item = &'a str>,
) -> Result<(), KdlError> {
    let tfms: BTreeSet<&str> = tfms.into_iter().collect();
    let mut inline = w.single_line();
    for tfm in tfms {
        write_leaf(&mut inline, "tfm", tfm)?;
    }
    Ok(())
}

fn write_leaf<W: Write>(w: &mut KdlWriter<W>, name: &str, value: &str) -> Result<(), KdlError> {
    w.start_node(name)?;
    w.write_string_value(value, false)?;
    w.end_node()
}

fn write_count<W: Write>(w: &mut KdlWriter<W>, name: &str, count: usize) -> Result<(), KdlError> {
    w.start_node(name)?;
    w.write_number_value(i64::try_from(count).unwrap_or(i64::MAX))?;
    w.end_node()
}

/// Group references by a string key, keys in ordinal order, arrival order kept
/// within each group.
fn group_by<'a, I, F>(references: I, key: F) -> BTreeMap<&'a str, Vec<&'a DiscoveredReference>>
where
    I: IntoIterator<Item = &'a DiscoveredReference>,
    F: Fn(&'a DiscoveredReference) -> &'a String,
{
    let mut groups: BTreeMap<&str, Vec<&DiscoveredReference>> = BTreeMap::new();
    for reference in references {
        groups.entry(key(reference).as_str()).or_default().push(reference);
    }
    groups
}
