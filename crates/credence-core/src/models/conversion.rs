use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Representation formats a structured result can be materialized in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    Graph,
    Table,
    Vector,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Graph => "graph",
            Self::Table => "table",
            Self::Vector => "vector",
        };
        f.write_str(name)
    }
}

/// Identity of a relationship, independent of format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelationshipKey {
    pub source: String,
    pub relation: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub relation: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRow {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRow {
    pub source: String,
    pub relation: String,
    pub target: String,
    pub weight: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub entity_rows: Vec<EntityRow>,
    pub relationship_rows: Vec<RelationshipRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub id: String,
    pub label: String,
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationVector {
    pub source: String,
    pub relation: String,
    pub target: String,
    pub weight: f64,
    /// Offset between the target and source embeddings.
    pub vector: Vec<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VectorData {
    pub dimensions: usize,
    pub entries: Vec<VectorEntry>,
    pub relations: Vec<RelationVector>,
}

/// A structured result in one of the supported formats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", content = "data", rename_all = "snake_case")]
pub enum Representation {
    Graph(GraphData),
    Table(TableData),
    Vector(VectorData),
}

impl Representation {
    pub fn format(&self) -> Format {
        match self {
            Self::Graph(_) => Format::Graph,
            Self::Table(_) => Format::Table,
            Self::Vector(_) => Format::Vector,
        }
    }

    /// Distinct entity ids present in this representation.
    pub fn entity_ids(&self) -> BTreeSet<String> {
        match self {
            Self::Graph(g) => g.nodes.iter().map(|n| n.id.clone()).collect(),
            Self::Table(t) => t.entity_rows.iter().map(|r| r.id.clone()).collect(),
            Self::Vector(v) => v.entries.iter().map(|e| e.id.clone()).collect(),
        }
    }

    /// Distinct relationship keys present in this representation.
    pub fn relationship_keys(&self) -> BTreeSet<RelationshipKey> {
        match self {
            Self::Graph(g) => g
                .edges
                .iter()
                .map(|e| key(&e.source, &e.relation, &e.target))
                .collect(),
            Self::Table(t) => t
                .relationship_rows
                .iter()
                .map(|r| key(&r.source, &r.relation, &r.target))
                .collect(),
            Self::Vector(v) => v
                .relations
                .iter()
                .map(|r| key(&r.source, &r.relation, &r.target))
                .collect(),
        }
    }
}

fn key(source: &str, relation: &str, target: &str) -> RelationshipKey {
    RelationshipKey {
        source: source.to_string(),
        relation: relation.to_string(),
        target: target.to_string(),
    }
}

/// Produced per conversion step; used for validation, never persisted as authoritative data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRecord {
    pub source_format: Format,
    pub target_format: Format,
    /// Minimum of the entity and relationship preservation rates.
    pub preservation_score: f64,
    /// Output entity count minus input entity count.
    pub entity_delta: i64,
    /// Output relationship count minus input relationship count.
    pub relationship_delta: i64,
    pub entity_preservation: f64,
    pub relationship_preservation: f64,
}

/// Exact counts for one conversion hop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopDiagnostic {
    pub source_format: Format,
    pub target_format: Format,
    pub entities_in: usize,
    pub entities_out: usize,
    pub entities_preserved: usize,
    pub relationships_in: usize,
    pub relationships_out: usize,
    pub relationships_preserved: usize,
    pub entity_rate: f64,
    pub relationship_rate: f64,
    pub passed: bool,
}

impl HopDiagnostic {
    pub fn to_record(&self) -> ConversionRecord {
        ConversionRecord {
            source_format: self.source_format,
            target_format: self.target_format,
            preservation_score: self.entity_rate.min(self.relationship_rate),
            entity_delta: self.entities_out as i64 - self.entities_in as i64,
            relationship_delta: self.relationships_out as i64 - self.relationships_in as i64,
            entity_preservation: self.entity_rate,
            relationship_preservation: self.relationship_rate,
        }
    }
}

impl fmt::Display for HopDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}->{}: entities {}/{} ({:.3}), relationships {}/{} ({:.3})",
            self.source_format,
            self.target_format,
            self.entities_preserved,
            self.entities_in,
            self.entity_rate,
            self.relationships_preserved,
            self.relationships_in,
            self.relationship_rate,
        )
    }
}

/// Preservation across a full loop of formats (first format == last format).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundTripDiagnostic {
    pub formats: Vec<Format>,
    pub entities_in: usize,
    pub entities_preserved: usize,
    pub relationships_in: usize,
    pub relationships_preserved: usize,
    pub entity_rate: f64,
    pub relationship_rate: f64,
    /// Mean of the entity and relationship rates.
    pub aggregate: f64,
    pub passed: bool,
}

impl fmt::Display for RoundTripDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.formats.iter().map(Format::to_string).collect();
        write!(
            f,
            "round trip {}: entities {}/{} ({:.3}), relationships {}/{} ({:.3}), aggregate {:.3}",
            path.join("->"),
            self.entities_preserved,
            self.entities_in,
            self.entity_rate,
            self.relationships_preserved,
            self.relationships_in,
            self.relationship_rate,
            self.aggregate,
        )
    }
}

/// Output to the cross-modal collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossModalReport {
    pub records: Vec<ConversionRecord>,
    pub round_trip: Option<RoundTripDiagnostic>,
    pub valid: bool,
    pub preservation_score: f64,
}
