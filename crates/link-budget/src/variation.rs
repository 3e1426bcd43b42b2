//! Variation axes for parameter sweeps
//!
//! A variation is written `field=v1,v2,...`. Parsing accepts any field
//! name; the name is only checked against [`VariationField`] when a sweep
//! applies it.

use crate::{BudgetError, LinkInput, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One sweep axis: a target field and the values to substitute, in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variation {
    pub field: String,
    pub values: Vec<f64>,
}

impl Variation {
    /// Parse `field=v1,v2,...`.
    ///
    /// Only the first `=` separates key from values, so `key=a=b` fails on
    /// the value token `a=b` rather than on the separator.
    pub fn parse(spec: &str) -> Result<Self> {
        let malformed = |reason: String| BudgetError::MalformedSpec {
            spec: spec.to_string(),
            reason,
        };

        let (key, raw_values) = spec
            .split_once('=')
            .ok_or_else(|| malformed("missing '=' between field and values".to_string()))?;

        let field = key.trim();
        if raw_values.trim().is_empty() {
            return Err(malformed("no values given".to_string()));
        }

        let values = raw_values
            .split(',')
            .map(|token| {
                let token = token.trim();
                match token.parse::<f64>() {
                    Ok(value) if value.is_finite() => Ok(value),
                    _ => Err(malformed(format!("bad value {:?}", token))),
                }
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            field: field.to_string(),
            values,
        })
    }

    /// Resolve the field name for application
    pub fn target(&self) -> Result<VariationField> {
        self.field.parse()
    }
}

impl FromStr for Variation {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Parse several specifications, keeping their order
pub fn parse_variations<S: AsRef<str>>(specs: &[S]) -> Result<Vec<Variation>> {
    specs.iter().map(|s| Variation::parse(s.as_ref())).collect()
}

// ============================================================================
// Field dispatch
// ============================================================================

/// Link fields a sweep may vary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VariationField {
    SystemMargin,
    FiberLength,
    FiberAttenuation,
    SplitterLoss,
}

impl VariationField {
    pub const ALL: [VariationField; 4] = [
        VariationField::SystemMargin,
        VariationField::FiberLength,
        VariationField::FiberAttenuation,
        VariationField::SplitterLoss,
    ];

    /// Canonical column name
    pub fn name(&self) -> &'static str {
        match self {
            VariationField::SystemMargin => "system_margin_db",
            VariationField::FiberLength => "fiber_length_km",
            VariationField::FiberAttenuation => "fiber_att_db_per_km",
            VariationField::SplitterLoss => "splitter_loss_db",
        }
    }

    /// Overwrite this field on a link
    pub fn apply(&self, link: &mut LinkInput, value: f64) {
        match self {
            VariationField::SystemMargin => link.system_margin_db = value,
            VariationField::FiberLength => link.fiber_length_km = value,
            VariationField::FiberAttenuation => link.fiber_att_db_per_km = value,
            VariationField::SplitterLoss => link.splitter_loss_db = value,
        }
    }
}

impl FromStr for VariationField {
    type Err = BudgetError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "system_margin_db" | "engineering_margin_db" => Ok(VariationField::SystemMargin),
            "fiber_length_km" => Ok(VariationField::FiberLength),
            "fiber_att_db_per_km" => Ok(VariationField::FiberAttenuation),
            "splitter_loss_db" => Ok(VariationField::SplitterLoss),
            other => Err(BudgetError::UnknownField(other.to_string())),
        }
    }
}

impl fmt::Display for VariationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
