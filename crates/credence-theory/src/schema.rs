//! Strict theory schema intake.

use std::collections::BTreeSet;

use credence_core::errors::TheoryFitError;
use credence_core::models::TheorySchema;

/// Parse and validate a theory schema document. Unknown fields are rejected.
pub fn parse_schema(json: &str) -> Result<TheorySchema, TheoryFitError> {
    let schema: TheorySchema =
        serde_json::from_str(json).map_err(|e| TheoryFitError::InvalidSchema {
            reason: e.to_string(),
        })?;
    validate_schema(&schema)?;
    Ok(schema)
}

/// Structural checks serde cannot express.
pub fn validate_schema(schema: &TheorySchema) -> Result<(), TheoryFitError> {
    if schema.theory_id.trim().is_empty() {
        return Err(invalid("theory_id is blank"));
    }
    if schema.constructs.is_empty() {
        return Err(invalid(format!(
            "theory '{}' declares no constructs",
            schema.theory_id
        )));
    }

    let mut names = BTreeSet::new();
    for construct in &schema.constructs {
        if construct.name.trim().is_empty() {
            return Err(invalid("construct with blank name"));
        }
        if !names.insert(construct.name.as_str()) {
            return Err(invalid(format!("duplicate construct '{}'", construct.name)));
        }
        if construct.observable_indicators.is_empty() {
            return Err(invalid(format!(
                "construct '{}' has no observable indicators",
                construct.name
            )));
        }
        if construct
            .observable_indicators
            .iter()
            .any(|i| crate::matching::tokens(i).is_empty())
        {
            return Err(invalid(format!(
                "construct '{}' has an indicator with no matchable words",
                construct.name
            )));
        }
    }

    let mut ids = BTreeSet::new();
    for hypothesis in &schema.hypotheses {
        if hypothesis.id.trim().is_empty() {
            return Err(invalid("hypothesis with blank id"));
        }
        if !ids.insert(hypothesis.id.as_str()) {
            return Err(invalid(format!("duplicate hypothesis '{}'", hypothesis.id)));
        }
        if let Some(unknown) = hypothesis
            .constructs
            .iter()
            .find(|c| !names.contains(c.as_str()))
        {
            return Err(invalid(format!(
                "hypothesis '{}' references unknown construct '{unknown}'",
                hypothesis.id
            )));
        }
    }
    Ok(())
}

fn invalid(reason: impl Into<String>) -> TheoryFitError {
    TheoryFitError::InvalidSchema {
        reason: reason.into(),
    }
}
