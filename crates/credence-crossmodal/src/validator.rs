//! CrossModalValidator: per-hop and round-trip preservation checks.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, warn};

use credence_core::config::CrossModalConfig;
use credence_core::errors::{ConversionError, CredenceResult};
use credence_core::models::{
    CrossModalReport, Format, HopDiagnostic, RelationshipKey, Representation,
    RoundTripDiagnostic,
};
use credence_core::trace::{ReasoningTrace, TraceComponent};
use credence_core::traits::IFormatConverter;
use credence_observability::crossmodal_span;

use crate::converter::StructuralConverter;

pub struct CrossModalValidator {
    config: CrossModalConfig,
    converter: Arc<dyn IFormatConverter>,
}

/// Diagnostics of one pass over a format sequence.
struct Run {
    hops: Vec<HopDiagnostic>,
    round_trip: Option<RoundTripDiagnostic>,
}

impl Run {
    fn valid(&self) -> bool {
        self.hops.iter().all(|h| h.passed) && self.round_trip.as_ref().map_or(true, |r| r.passed)
    }

    fn report(&self) -> CrossModalReport {
        let records: Vec<_> = self.hops.iter().map(HopDiagnostic::to_record).collect();
        let hop_score = records
            .iter()
            .map(|r| r.preservation_score)
            .fold(1.0, f64::min);
        let preservation_score = self
            .round_trip
            .as_ref()
            .map_or(hop_score, |r| hop_score.min(r.aggregate));
        CrossModalReport {
            records,
            round_trip: self.round_trip.clone(),
            valid: self.valid(),
            preservation_score,
        }
    }

    fn summary(&self) -> String {
        let mut parts: Vec<String> = self
            .hops
            .iter()
            .filter(|h| !h.passed)
            .map(ToString::to_string)
            .collect();
        if let Some(rt) = self.round_trip.as_ref().filter(|r| !r.passed) {
            parts.push(rt.to_string());
        }
        parts.join("; ")
    }
}

impl CrossModalValidator {
    /// Validator with the deterministic [`StructuralConverter`].
    pub fn new(config: &CrossModalConfig) -> Self {
        Self {
            config: config.clone(),
            converter: Arc::new(StructuralConverter::from_config(config)),
        }
    }

    pub fn with_converter(mut self, converter: Arc<dyn IFormatConverter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn config(&self) -> &CrossModalConfig {
        &self.config
    }

    /// Convert `input` through `formats` and report preservation without
    /// failing on threshold violations. `formats[0]` must be the input's format.
    pub fn inspect(
        &self,
        input: &Representation,
        formats: &[Format],
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<CrossModalReport> {
        Ok(self.run(input, formats, trace)?.report())
    }

    /// Like [`inspect`](Self::inspect), but any failed hop or round trip is a
    /// `ConversionIntegrity` error carrying every hop's exact counts.
    pub fn validate(
        &self,
        input: &Representation,
        formats: &[Format],
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<CrossModalReport> {
        let run = self.run(input, formats, trace)?;
        if !run.valid() {
            let summary = run.summary();
            warn!(converter = self.converter.name(), %summary, "cross-modal integrity violated");
            return Err(ConversionError::ConversionIntegrity {
                summary,
                hops: run.hops,
                round_trip: run.round_trip,
            }
            .into());
        }
        Ok(run.report())
    }

    /// Validate `A → via → A`, where `A` is the input's format.
    pub fn round_trip(
        &self,
        input: &Representation,
        via: Format,
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<CrossModalReport> {
        let origin = input.format();
        self.validate(input, &[origin, via, origin], trace)
    }

    fn run(
        &self,
        input: &Representation,
        formats: &[Format],
        trace: &mut ReasoningTrace,
    ) -> CredenceResult<Run> {
        let _span = crossmodal_span!(formats.len().saturating_sub(1)).entered();
        check_sequence(input, formats)?;

        let original_entities = input.entity_ids();
        let original_relationships = input.relationship_keys();
        let mut current = input.clone();
        let mut hops = Vec::with_capacity(formats.len() - 1);

        for pair in formats.windows(2) {
            let (from, to) = (pair[0], pair[1]);
            let next = self.converter.convert(&current, to)?;
            if next.format() != to {
                return Err(ConversionError::ConverterFailed {
                    converter: self.converter.name().to_string(),
                    message: format!("asked for {to}, produced {}", next.format()),
                }
                .into());
            }

            let hop = self.hop(from, to, &current, &next);
            debug!(%hop, passed = hop.passed, "conversion hop");
            trace.record(
                TraceComponent::CrossModal,
                "convert",
                format!("{from}->{to}"),
                json!(hop),
            );
            hops.push(hop);
            current = next;
        }

        let round_trip = (formats.len() >= 3 && formats.first() == formats.last()).then(|| {
            self.round_trip_diagnostic(
                formats,
                &original_entities,
                &original_relationships,
                &current,
            )
        });
        if let Some(rt) = &round_trip {
            trace.record(
                TraceComponent::CrossModal,
                "round_trip",
                path(&rt.formats),
                json!(rt),
            );
        }

        let run = Run { hops, round_trip };
        info!(
            converter = self.converter.name(),
            hops = run.hops.len(),
            valid = run.valid(),
            "cross-modal check complete"
        );
        Ok(run)
    }

    fn hop(&self, from: Format, to: Format, before: &Representation, after: &Representation) -> HopDiagnostic {
        let (ents_in, ents_out) = (before.entity_ids(), after.entity_ids());
        let (rels_in, rels_out) = (before.relationship_keys(), after.relationship_keys());
        let entities_preserved = ents_in.intersection(&ents_out).count();
        let relationships_preserved = rels_in.intersection(&rels_out).count();
        let entity_rate = rate(entities_preserved, ents_in.len());
        let relationship_rate = rate(relationships_preserved, rels_in.len());
        HopDiagnostic {
            source_format: from,
            target_format: to,
            entities_in: ents_in.len(),
            entities_out: ents_out.len(),
            entities_preserved,
            relationships_in: rels_in.len(),
            relationships_out: rels_out.len(),
            relationships_preserved,
            entity_rate,
            relationship_rate,
            passed: entity_rate >= self.config.step_entity_threshold
                && relationship_rate >= self.config.step_relationship_threshold,
        }
    }

    fn round_trip_diagnostic(
        &self,
        formats: &[Format],
        original_entities: &BTreeSet<String>,
        original_relationships: &BTreeSet<RelationshipKey>,
        last: &Representation,
    ) -> RoundTripDiagnostic {
        let final_entities = last.entity_ids();
        let final_relationships = last.relationship_keys();
        let entities_preserved = original_entities.intersection(&final_entities).count();
        let relationships_preserved = original_relationships
            .intersection(&final_relationships)
            .count();
        let entity_rate = rate(entities_preserved, original_entities.len());
        let relationship_rate = rate(relationships_preserved, original_relationships.len());
        let aggregate = (entity_rate + relationship_rate) / 2.0;
        RoundTripDiagnostic {
            formats: formats.to_vec(),
            entities_in: original_entities.len(),
            entities_preserved,
            relationships_in: original_relationships.len(),
            relationships_preserved,
            entity_rate,
            relationship_rate,
            aggregate,
            passed: aggregate >= self.config.round_trip_aggregate_threshold
                && entity_rate >= self.config.round_trip_entity_threshold
                && relationship_rate >= self.config.round_trip_relationship_threshold,
        }
    }
}

fn check_sequence(input: &Representation, formats: &[Format]) -> Result<(), ConversionError> {
    let Some(first) = formats.first() else {
        return Err(ConversionError::InvalidSequence {
            reason: "empty format sequence".to_string(),
        });
    };
    if formats.len() < 2 {
        return Err(ConversionError::InvalidSequence {
            reason: "at least one conversion is required".to_string(),
        });
    }
    if *first != input.format() {
        return Err(ConversionError::InvalidSequence {
            reason: format!("sequence starts at {first} but input is {}", input.format()),
        });
    }
    Ok(())
}

fn path(formats: &[Format]) -> String {
    formats
        .iter()
        .map(Format::to_string)
        .collect::<Vec<_>>()
        .join("->")
}

/// `preserved / total`; an empty side preserves trivially.
fn rate(preserved: usize, total: usize) -> f64 {
    if total == 0 {
        1.0
    } else {
        preserved as f64 / total as f64
    }
}
