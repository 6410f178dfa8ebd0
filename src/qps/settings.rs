use crate::{algebra::*, error::SettingsError, ksp::KspOptions, ksp::Tolerances};
use derive_builder::Builder;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Settings of a [`QpSolver`](crate::qps::QpSolver)

#[derive(Builder, Debug, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QpSolverSettings<T: FloatT> {
    ///relative residual tolerance
    #[builder(default = "(1e-5).as_T()")]
    pub rtol: T,

    ///absolute residual tolerance
    #[builder(default = "(1e-50).as_T()")]
    pub atol: T,

    ///divergence tolerance, relative to the right hand side norm
    #[builder(default = "(1e4).as_T()")]
    pub divtol: T,

    ///maximum number of iterations
    #[builder(default = "10000")]
    pub max_it: usize,

    ///prefix identifying this solver's options
    #[builder(default = "String::new()")]
    pub options_prefix: String,
}

impl<T> Default for QpSolverSettings<T>
where
    T: FloatT,
{
    fn default() -> QpSolverSettings<T> {
        QpSolverSettingsBuilder::<T>::default().build().unwrap()
    }
}

impl<T> QpSolverSettings<T>
where
    T: FloatT,
{
    pub fn tolerances(&self) -> Tolerances<T> {
        Tolerances {
            rtol: self.rtol,
            atol: self.atol,
            divtol: self.divtol,
            max_it: self.max_it,
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        validate_tol("rtol", self.rtol)?;
        validate_tol("atol", self.atol)?;
        validate_divtol(self.divtol)?;
        validate_max_it(self.max_it)?;
        Ok(())
    }
}

impl From<SettingsError> for QpSolverSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        QpSolverSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> QpSolverSettingsBuilder<T>
where
    T: FloatT,
{
    pub fn validate(&self) -> Result<(), SettingsError> {
        if let Some(rtol) = self.rtol {
            validate_tol("rtol", rtol)?;
        }
        if let Some(atol) = self.atol {
            validate_tol("atol", atol)?;
        }
        if let Some(divtol) = self.divtol {
            validate_divtol(divtol)?;
        }
        if let Some(max_it) = self.max_it {
            validate_max_it(max_it)?;
        }
        Ok(())
    }
}

/// Options applied by [`QpSolver::set_from_options`](crate::qps::QpSolver::set_from_options).
///
/// Tolerance fields override the solver settings when present.  The
/// `ksp` options are forwarded to the linear solver of a KSP backed
/// solver and ignored by other backends.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QpSolverOptions {
    pub rtol: Option<f64>,
    pub atol: Option<f64>,
    pub divtol: Option<f64>,
    pub max_it: Option<usize>,
    pub ksp: KspOptions,
}

impl QpSolverOptions {
    /// Settings with every present override applied
    pub(crate) fn apply<T: FloatT>(
        &self,
        settings: &QpSolverSettings<T>,
    ) -> Result<QpSolverSettings<T>, SettingsError> {
        let mut new = settings.clone();
        if let Some(rtol) = self.rtol {
            new.rtol = rtol.as_T();
        }
        if let Some(atol) = self.atol {
            new.atol = atol.as_T();
        }
        if let Some(divtol) = self.divtol {
            new.divtol = divtol.as_T();
        }
        if let Some(max_it) = self.max_it {
            new.max_it = max_it;
        }
        new.validate()?;
        self.ksp.validate()?;
        Ok(new)
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn validate_tol<T: FloatT>(field: &'static str, tol: T) -> Result<(), SettingsError> {
    if tol >= T::zero() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn validate_divtol<T: FloatT>(divtol: T) -> Result<(), SettingsError> {
    if divtol >= T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("divtol"))
    }
}

fn validate_max_it(max_it: usize) -> Result<(), SettingsError> {
    if max_it > 0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue("max_it"))
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let settings = QpSolverSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(settings.rtol, 1e-5);
    assert_eq!(settings.max_it, 10000);
    assert_eq!(settings.tolerances(), Tolerances::default());

    assert!(QpSolverSettingsBuilder::<f64>::default()
        .rtol(-1.0)
        .build()
        .is_err());
    assert!(QpSolverSettingsBuilder::<f64>::default()
        .divtol(0.5)
        .build()
        .is_err());
    assert!(QpSolverSettingsBuilder::<f64>::default()
        .max_it(0)
        .build()
        .is_err());

    // directly construct bad settings and manually check
    let settings = QpSolverSettings::<f64> {
        atol: f64::NAN,
        ..QpSolverSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_options_apply() {
    let settings = QpSolverSettings::<f64>::default();
    let opts = QpSolverOptions {
        rtol: Some(1e-8),
        max_it: Some(5),
        ..QpSolverOptions::default()
    };
    let new = opts.apply(&settings).unwrap();
    assert_eq!(new.rtol, 1e-8);
    assert_eq!(new.max_it, 5);
    assert_eq!(new.atol, settings.atol);

    let opts = QpSolverOptions {
        divtol: Some(0.0),
        ..QpSolverOptions::default()
    };
    assert!(opts.apply(&settings).is_err());
}
