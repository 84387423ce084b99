//! Emission distribution parameters.
//!
//! Every distribution models two covariates (WGA and No WGA), so each kind has
//! exactly four parameters. Parameters stay `None` until the user enters them.

use hs_common::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Distribution family of one component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistributionKind {
    Normal,
    Uniform,
}

impl DistributionKind {
    pub const ALL: [DistributionKind; 2] = [DistributionKind::Normal, DistributionKind::Uniform];

    /// Name used in the wire format.
    pub fn wire_name(&self) -> &'static str {
        match self {
            DistributionKind::Normal => "Normal",
            DistributionKind::Uniform => "Uniform",
        }
    }

    /// Case-insensitive parse of a kind name.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" | "gaussian" => Some(DistributionKind::Normal),
            "uniform" => Some(DistributionKind::Uniform),
            _ => None,
        }
    }

    /// The four parameters of this kind, in wire order.
    pub fn fields(&self) -> [ParamField; 4] {
        match self {
            DistributionKind::Normal => [
                ParamField::WgaMean,
                ParamField::NoWgaMean,
                ParamField::WgaVariance,
                ParamField::NoWgaVariance,
            ],
            DistributionKind::Uniform => [
                ParamField::WgaLower,
                ParamField::NoWgaLower,
                ParamField::WgaUpper,
                ParamField::NoWgaUpper,
            ],
        }
    }
}

impl fmt::Display for DistributionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// One named distribution parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamField {
    WgaMean,
    NoWgaMean,
    WgaVariance,
    NoWgaVariance,
    WgaLower,
    NoWgaLower,
    WgaUpper,
    NoWgaUpper,
}

impl ParamField {
    pub const ALL: [ParamField; 8] = [
        ParamField::WgaMean,
        ParamField::NoWgaMean,
        ParamField::WgaVariance,
        ParamField::NoWgaVariance,
        ParamField::WgaLower,
        ParamField::NoWgaLower,
        ParamField::WgaUpper,
        ParamField::NoWgaUpper,
    ];

    /// Kind this field belongs to.
    pub fn kind(&self) -> DistributionKind {
        match self {
            ParamField::WgaMean
            | ParamField::NoWgaMean
            | ParamField::WgaVariance
            | ParamField::NoWgaVariance => DistributionKind::Normal,
            _ => DistributionKind::Uniform,
        }
    }

    /// Wire field name, e.g. `single_com_m1`.
    pub fn wire_key(&self) -> &'static str {
        match self {
            ParamField::WgaMean => "single_com_m1",
            ParamField::NoWgaMean => "single_com_m2",
            ParamField::WgaVariance => "single_com_v1",
            ParamField::NoWgaVariance => "single_com_v2",
            ParamField::WgaLower => "single_com_l1",
            ParamField::NoWgaLower => "single_com_l2",
            ParamField::WgaUpper => "single_com_u1",
            ParamField::NoWgaUpper => "single_com_u2",
        }
    }

    /// Name used in scripts and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamField::WgaMean => "wga_mean",
            ParamField::NoWgaMean => "no_wga_mean",
            ParamField::WgaVariance => "wga_variance",
            ParamField::NoWgaVariance => "no_wga_variance",
            ParamField::WgaLower => "wga_lower",
            ParamField::NoWgaLower => "no_wga_lower",
            ParamField::WgaUpper => "wga_upper",
            ParamField::NoWgaUpper => "no_wga_upper",
        }
    }

    /// Parse a field from its script name, camelCase name or wire key.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.iter().copied().find(|field| {
            field.as_str().eq_ignore_ascii_case(s)
                || field.camel_name().eq_ignore_ascii_case(s)
                || field.wire_key() == s
                || field.wire_key().strip_prefix("single_com_") == Some(s)
        })
    }

    /// Look up a field by its exact wire key.
    pub fn from_wire_key(key: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.wire_key() == key)
    }

    fn camel_name(&self) -> &'static str {
        match self {
            ParamField::WgaMean => "wgaMean",
            ParamField::NoWgaMean => "noWgaMean",
            ParamField::WgaVariance => "wgaVariance",
            ParamField::NoWgaVariance => "noWgaVariance",
            ParamField::WgaLower => "wgaLower",
            ParamField::NoWgaLower => "noWgaLower",
            ParamField::WgaUpper => "wgaUpper",
            ParamField::NoWgaUpper => "noWgaUpper",
        }
    }
}

impl fmt::Display for ParamField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Measurement axis of a Uniform bound check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Wga,
    NoWga,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Wga => write!(f, "WGA"),
            Axis::NoWga => write!(f, "No WGA"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalParams {
    pub wga_mean: Option<f64>,
    pub no_wga_mean: Option<f64>,
    pub wga_variance: Option<f64>,
    pub no_wga_variance: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UniformParams {
    pub wga_lower: Option<f64>,
    pub no_wga_lower: Option<f64>,
    pub wga_upper: Option<f64>,
    pub no_wga_upper: Option<f64>,
}

/// Parameters of one emission distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum DistributionSpec {
    Normal(NormalParams),
    Uniform(UniformParams),
}

impl DistributionSpec {
    /// Empty parameter set of the given kind.
    pub fn empty(kind: DistributionKind) -> Self {
        match kind {
            DistributionKind::Normal => DistributionSpec::Normal(NormalParams::default()),
            DistributionKind::Uniform => DistributionSpec::Uniform(UniformParams::default()),
        }
    }

    pub fn kind(&self) -> DistributionKind {
        match self {
            DistributionSpec::Normal(_) => DistributionKind::Normal,
            DistributionSpec::Uniform(_) => DistributionKind::Uniform,
        }
    }

    /// Entered value of `field`; `None` if unset or not part of this kind.
    pub fn get(&self, field: ParamField) -> Option<f64> {
        match (self, field) {
            (DistributionSpec::Normal(p), ParamField::WgaMean) => p.wga_mean,
            (DistributionSpec::Normal(p), ParamField::NoWgaMean) => p.no_wga_mean,
            (DistributionSpec::Normal(p), ParamField::WgaVariance) => p.wga_variance,
            (DistributionSpec::Normal(p), ParamField::NoWgaVariance) => p.no_wga_variance,
            (DistributionSpec::Uniform(p), ParamField::WgaLower) => p.wga_lower,
            (DistributionSpec::Uniform(p), ParamField::NoWgaLower) => p.no_wga_lower,
            (DistributionSpec::Uniform(p), ParamField::WgaUpper) => p.wga_upper,
            (DistributionSpec::Uniform(p), ParamField::NoWgaUpper) => p.no_wga_upper,
            _ => None,
        }
    }

    fn slot_mut(&mut self, field: ParamField) -> Option<&mut Option<f64>> {
        match (self, field) {
            (DistributionSpec::Normal(p), ParamField::WgaMean) => Some(&mut p.wga_mean),
            (DistributionSpec::Normal(p), ParamField::NoWgaMean) => Some(&mut p.no_wga_mean),
            (DistributionSpec::Normal(p), ParamField::WgaVariance) => Some(&mut p.wga_variance),
            (DistributionSpec::Normal(p), ParamField::NoWgaVariance) => {
                Some(&mut p.no_wga_variance)
            }
            (DistributionSpec::Uniform(p), ParamField::WgaLower) => Some(&mut p.wga_lower),
            (DistributionSpec::Uniform(p), ParamField::NoWgaLower) => Some(&mut p.no_wga_lower),
            (DistributionSpec::Uniform(p), ParamField::WgaUpper) => Some(&mut p.wga_upper),
            (DistributionSpec::Uniform(p), ParamField::NoWgaUpper) => Some(&mut p.no_wga_upper),
            _ => None,
        }
    }

    /// Set one parameter. Values must be finite and non-negative.
    pub fn set_param(&mut self, field: ParamField, value: f64) -> Result<()> {
        if !value.is_finite() || value < 0.0 {
            return Err(Error::InvalidValue {
                field: field.as_str().to_string(),
                message: format!("expected a finite value >= 0, got {}", value),
            });
        }
        let kind = self.kind();
        let slot = self.slot_mut(field).ok_or_else(|| {
            Error::InvalidCommand(format!(
                "{} is not a parameter of a {} distribution",
                field, kind
            ))
        })?;
        // -0 would otherwise reach the wire as "-0"
        *slot = Some(if value == 0.0 { 0.0 } else { value });
        Ok(())
    }

    /// Fields with no entered value, in wire order.
    pub fn missing_fields(&self) -> Vec<ParamField> {
        self.kind()
            .fields()
            .into_iter()
            .filter(|field| self.get(*field).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Axes where a Uniform lower bound exceeds its upper bound.
    pub fn bound_violations(&self) -> Vec<Axis> {
        let DistributionSpec::Uniform(p) = self else {
            return Vec::new();
        };
        let mut violations = Vec::new();
        if let (Some(lower), Some(upper)) = (p.wga_lower, p.wga_upper) {
            if lower > upper {
                violations.push(Axis::Wga);
            }
        }
        if let (Some(lower), Some(upper)) = (p.no_wga_lower, p.no_wga_upper) {
            if lower > upper {
                violations.push(Axis::NoWga);
            }
        }
        violations
    }

    /// Every field of this kind with its entered value, in wire order.
    pub fn entries(&self) -> impl Iterator<Item = (ParamField, Option<f64>)> + '_ {
        self.kind()
            .fields()
            .into_iter()
            .map(move |field| (field, self.get(field)))
    }
}
