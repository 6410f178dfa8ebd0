use crate::{algebra::*, error::SettingsError};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Validation level applied when bounds are attached to a constraint.
///
/// With `Enabled`, every bound replacement checks `lb ≤ ub` componentwise.
/// The default follows the build profile: enabled in debug and test
/// builds, disabled in release builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum BoundsCheck {
    Enabled,
    Disabled,
}

impl Default for BoundsCheck {
    fn default() -> Self {
        cfg_if::cfg_if! {
            if #[cfg(debug_assertions)] {
                BoundsCheck::Enabled
            } else {
                BoundsCheck::Disabled
            }
        }
    }
}

impl BoundsCheck {
    pub fn is_enabled(&self) -> bool {
        matches!(self, BoundsCheck::Enabled)
    }
}

/// Settings for a [`ConstraintHandler`](crate::qpc::ConstraintHandler)

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConstraintSettings<T: FloatT> {
    ///active set tolerance.  A component within `astol` of a bound is
    ///treated as sitting on that bound.
    #[builder(default = "T::epsilon() * (10.).as_T()")]
    pub astol: T,

    ///bounds ordering check on construction and replacement
    #[builder(default)]
    pub bounds_check: BoundsCheck,
}

impl<T> Default for ConstraintSettings<T>
where
    T: FloatT,
{
    fn default() -> ConstraintSettings<T> {
        ConstraintSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> ConstraintSettings<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_astol(self.astol)
    }
}

impl From<SettingsError> for ConstraintSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        ConstraintSettingsBuilderError::ValidationError(e.to_string())
    }
}

impl<T> ConstraintSettingsBuilder<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(astol) = self.astol {
            validate_astol(astol)?;
        }
        Ok(())
    }
}

pub(crate) fn validate_astol<T: FloatT>(astol: T) -> Result<(), SettingsError> {
    // also rejects NaN
    if astol >= T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("astol"))
    }
}

#[test]
fn test_constraint_settings() {
    let settings = ConstraintSettings::<f64>::default();
    assert_eq!(settings.astol, 10. * f64::EPSILON);
    assert!(settings.validate().is_ok());

    // debug and test builds check bounds by default
    #[cfg(debug_assertions)]
    assert_eq!(settings.bounds_check, BoundsCheck::Enabled);

    assert!(ConstraintSettingsBuilder::<f64>::default()
        .astol(-1.0)
        .build()
        .is_err());

    let settings = ConstraintSettingsBuilder::<f64>::default()
        .astol(1e-6)
        .bounds_check(BoundsCheck::Disabled)
        .build()
        .unwrap();
    assert_eq!(settings.astol, 1e-6);
    assert!(!settings.bounds_check.is_enabled());

    let settings = ConstraintSettings::<f64> {
        astol: f64::NAN,
        ..ConstraintSettings::default()
    };
    assert!(settings.validate().is_err());
}
