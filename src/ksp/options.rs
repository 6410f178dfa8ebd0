use super::*;
use crate::error::SettingsError;
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Caller supplied overrides for a [`Ksp`].
///
/// Every field is optional; only the fields that are set are applied by
/// [`Ksp::set_from_options`].  An owning QP solver passes these through
/// to its delegate linear solver explicitly.

#[derive(Builder, Debug, Clone, Default, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[builder(setter(strip_option), default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct KspOptions {
    ///Krylov method
    pub ksp_type: Option<KspType>,

    ///norm used by the convergence test
    pub norm_type: Option<NormType>,

    ///preconditioner
    pub pc_type: Option<PcType>,

    ///use the incoming solution vector as the initial guess
    pub initial_guess_nonzero: Option<bool>,

    ///damping factor for Richardson iteration
    pub richardson_scale: Option<f64>,
}

impl KspOptions {
    pub fn is_empty(&self) -> bool {
        *self == KspOptions::default()
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_richardson_scale(self.richardson_scale)
    }
}

impl From<SettingsError> for KspOptionsBuilderError {
    fn from(e: SettingsError) -> Self {
        KspOptionsBuilderError::ValidationError(e.to_string())
    }
}

impl KspOptionsBuilder {
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_richardson_scale(self.richardson_scale.flatten())
    }
}

fn validate_richardson_scale(scale: Option<f64>) -> Result<(), SettingsError> {
    match scale {
        Some(s) if !(s > 0.0 && s.is_finite()) => {
            Err(SettingsError::BadFieldValue("richardson_scale"))
        }
        _ => Ok(()),
    }
}

#[test]
fn test_ksp_options_builder() {
    let opts = KspOptionsBuilder::default().build().unwrap();
    assert!(opts.is_empty());

    let opts = KspOptionsBuilder::default()
        .ksp_type(KspType::Richardson)
        .richardson_scale(0.5)
        .build()
        .unwrap();
    assert_eq!(opts.ksp_type, Some(KspType::Richardson));
    assert!(opts.norm_type.is_none());
    assert!(!opts.is_empty());

    assert!(KspOptionsBuilder::default()
        .richardson_scale(-1.0)
        .build()
        .is_err());
}
