use thiserror::Error;

use crate::{
    catalog::Catalog,
    decision::{DecisionError, DecisionProvider},
    mapping::{merge, Mapping, MappingError, MappingStore},
};

#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("{0}")]
    Mapping(#[from] MappingError),
    #[error("decision for {poi_type} failed")]
    Decision {
        poi_type: String,
        #[source]
        source: DecisionError,
    },
}

#[derive(Debug)]
pub struct CompletionReport {
    pub mapping: Mapping,
    /// filled in from the catalog defaults this run
    pub seeded: Vec<String>,
    /// filled in by the decision provider this run
    pub decided: Vec<String>,
    /// still without an icon, in catalog order
    pub unmapped: Vec<String>,
    /// catalog entries that have an icon now
    pub mapped: usize,
    pub total: usize,
}

/// Loads the stored mapping, seeds it from the catalog, asks for everything still missing
/// and saves the result.
///
/// Nothing is written until every decision has been made, so dropping the future halfway
/// leaves the stored mapping as it was.
pub async fn complete_mapping(
    store: &MappingStore,
    catalog: &Catalog<'_>,
    decisions: &mut (dyn DecisionProvider + Send),
) -> Result<CompletionReport, CompletionError> {
    let existing = store.load()?;
    if catalog.is_empty() {
        tracing::warn!("the catalog has no poi types, only the stored mapping is kept");
    }

    tracing::info!(
        total = catalog.len(),
        with_default = catalog.poi_types().filter(|t| catalog.has_default(t)).count(),
        "mapping poi types to icons"
    );

    let merged = merge(existing, catalog);
    for poi_type in &merged.seeded {
        tracing::info!("{poi_type:30} -> {}", merged.mapping[poi_type]);
    }

    let mut mapping = merged.mapping;
    let mut decided = vec![];
    let mut unmapped = vec![];

    if !merged.unmapped.is_empty() {
        tracing::warn!(
            count = merged.unmapped.len(),
            "poi types need a manual icon choice"
        );
    }

    for poi_type in merged.unmapped {
        let decision = decisions
            .decide(&poi_type)
            .await
            .map_err(|source| CompletionError::Decision {
                poi_type: poi_type.clone(),
                source,
            })?;

        match decision {
            Some(icon) => {
                tracing::info!("saved: {poi_type} -> {icon}");
                mapping.insert(poi_type.clone(), icon);
                decided.push(poi_type);
            }
            None => {
                tracing::warn!("skipped: {poi_type}");
                unmapped.push(poi_type);
            }
        }
    }

    store.save(&mapping)?;

    let mapped = catalog
        .poi_types()
        .filter(|t| mapping.contains_key(*t))
        .count();
    tracing::info!("mapping complete: {mapped}/{} poi types mapped", catalog.len());
    if !unmapped.is_empty() {
        tracing::warn!(?unmapped, "poi types left without an icon");
    }

    Ok(CompletionReport {
        mapping,
        seeded: merged.seeded,
        decided,
        unmapped,
        mapped,
        total: catalog.len(),
    })
}
