use crate::errors::CredenceResult;
use crate::models::{Format, Representation};

/// Converts a structured result between representation formats.
pub trait IFormatConverter: Send + Sync {
    fn convert(&self, input: &Representation, target: Format) -> CredenceResult<Representation>;

    fn name(&self) -> &str;
}
