//! Header matching: decide which entity schema a set of observed column headers most
//! likely belongs to, and which header feeds which field.
//!
//! Matching is purely lexical. Each observed header is normalized (see
//! [`crate::types::normalize_header`]) and looked up in every schema's alias table. A
//! schema's score is the fraction of its *required* fields covered by the headers;
//! optional-field matches only break ties.

use crate::types::{ColumnMapping, EntitySchema, EntityType, SchemaRegistry, normalize_header};

/// Outcome of matching a header set against the registry.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// Every required field of `entity` was found among the headers. `mapping` covers all
    /// matched headers (required and optional); headers with no alias match are absent.
    Resolved {
        entity: EntityType,
        mapping: ColumnMapping,
    },
    /// Confidence threshold not met. `entity` is the best guess, or
    /// [`EntityType::unknown`] when no schema matched anything; `mapping` holds whatever
    /// partial matches were found. The caller must collect user confirmation before remap.
    Ambiguous {
        entity: EntityType,
        mapping: ColumnMapping,
    },
}

impl MatchResult {
    /// Entity of either variant.
    pub fn entity(&self) -> &EntityType {
        match self {
            MatchResult::Resolved { entity, .. } | MatchResult::Ambiguous { entity, .. } => entity,
        }
    }

    /// Mapping of either variant.
    pub fn mapping(&self) -> &ColumnMapping {
        match self {
            MatchResult::Resolved { mapping, .. } | MatchResult::Ambiguous { mapping, .. } => {
                mapping
            }
        }
    }
}

/// Scores observed headers against every schema in a [`SchemaRegistry`].
///
/// Holds only a reference to the registry; construction is cheap and the matcher is
/// stateless across calls.
#[derive(Debug)]
pub struct HeaderMatcher<'r> {
    registry: &'r SchemaRegistry,
}

struct Candidate<'s> {
    schema: &'s EntitySchema,
    mapping: ColumnMapping,
    required_matched: usize,
    total_matched: usize,
}

impl Candidate<'_> {
    fn score(&self) -> f64 {
        // Registry validation guarantees required_count() >= 1.
        self.required_matched as f64 / self.schema.required_count() as f64
    }

    /// True when `self` beats `other` under the tie-break rules: higher required-field
    /// score, then more total headers matched. Equal on both → earlier registration wins,
    /// so callers compare with strictly-greater semantics in registry order.
    fn beats(&self, other: &Candidate<'_>) -> bool {
        if self.score() != other.score() {
            return self.score() > other.score();
        }
        self.total_matched > other.total_matched
    }
}

impl<'r> HeaderMatcher<'r> {
    /// Create a matcher over a registry.
    pub fn new(registry: &'r SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Match observed headers against every registered schema.
    ///
    /// Header order never affects the score; it only fixes entry order in the returned
    /// mapping. Two headers normalizing to the same form both enter the mapping against
    /// the same field; that collision is the caller's to reject before remap.
    pub fn match_headers<S: AsRef<str>>(&self, headers: &[S]) -> MatchResult {
        let mut best: Option<Candidate<'_>> = None;
        for schema in self.registry.schemas() {
            let candidate = score_schema(schema, headers);
            match &best {
                Some(current) if !candidate.beats(current) => {}
                _ => best = Some(candidate),
            }
        }

        let Some(best) = best else {
            // Empty registry: nothing can ever match.
            return MatchResult::Ambiguous {
                entity: EntityType::unknown(),
                mapping: ColumnMapping::new(),
            };
        };

        if best.required_matched == best.schema.required_count() {
            MatchResult::Resolved {
                entity: best.schema.entity.clone(),
                mapping: best.mapping,
            }
        } else if best.required_matched > 0 {
            MatchResult::Ambiguous {
                entity: best.schema.entity.clone(),
                mapping: best.mapping,
            }
        } else {
            MatchResult::Ambiguous {
                entity: EntityType::unknown(),
                mapping: ColumnMapping::new(),
            }
        }
    }
}

fn score_schema<'s, S: AsRef<str>>(schema: &'s EntitySchema, headers: &[S]) -> Candidate<'s> {
    let mut mapping = ColumnMapping::new();
    let mut required_matched = 0usize;
    let mut total_matched = 0usize;

    for header in headers {
        let header = header.as_ref();
        let normalized = normalize_header(header);
        if normalized.is_empty() {
            continue;
        }
        // First field in declaration order whose alias set contains the header. Registry
        // validation guarantees an alias belongs to at most one field per schema.
        let hit = schema.fields.iter().find(|field| {
            std::iter::once(&field.name)
                .chain(field.aliases.iter())
                .any(|alias| normalize_header(alias) == normalized)
        });
        if let Some(field) = hit {
            // Count a required field once even if two headers normalize onto it.
            if field.required && !mapping.maps_to(&field.name) {
                required_matched += 1;
            }
            total_matched += 1;
            mapping.insert(header, &field.name);
        }
    }

    Candidate {
        schema,
        mapping,
        required_matched,
        total_matched,
    }
}
