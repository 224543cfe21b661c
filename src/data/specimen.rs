//! specimen — conversion of raw machine channels into engineering quantities.
//!
//! Purpose
//! -------
//! Turn the forces, torques, strains, rotations and step counters recorded by
//! an axial-torsional test machine on a thin-walled tube into the standard
//! [`TimeSeries`] channels consumed by the analysis modules.
//!
//! Key behaviors
//! -------------
//! - `sig = F / A` with `A = π (r_o² − r_i²)`.
//! - `tau = T / (A · r_m)` with mean radius `r_m = (r_i + r_o) / 2`.
//! - `gam = φ · r_m / L` for twist angle `φ` over gauge length `L`.
//! - `eps` is the measured axial strain, `stp = axial count + torsional count`.
//!
//! Conventions
//! -----------
//! - Diameters and gauge length share one length unit (mm in practice), so a
//!   force in N and a torque in N·mm yield stresses in MPa.
//! - The rotation is the twist angle in radians over the gauge length.
use std::f64::consts::PI;

use ndarray::Array1;

use crate::data::{
    errors::{DataError, DataResult},
    series::{EPS, GAM, SIG, STP, TAU, TIME, TimeSeries},
};

/// Thin-walled tube dimensions.
///
/// Invariants
/// ----------
/// - `0 <= inner_diameter < outer_diameter`, all values finite.
/// - `gauge_length > 0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpecimenGeometry {
    inner_diameter: f64,
    outer_diameter: f64,
    gauge_length: f64,
}

impl SpecimenGeometry {
    /// Validate and store the specimen dimensions.
    ///
    /// Errors
    /// ------
    /// - `DataError::InvalidGeometry` when a dimension is non-finite,
    ///   negative (inner), non-positive (outer, gauge) or when the inner
    ///   diameter is not smaller than the outer one.
    pub fn new(inner_diameter: f64, outer_diameter: f64, gauge_length: f64) -> DataResult<Self> {
        if !inner_diameter.is_finite() || inner_diameter < 0.0 {
            return Err(DataError::InvalidGeometry {
                field: "inner_diameter",
                value: inner_diameter,
                reason: "must be finite and non-negative",
            });
        }
        if !outer_diameter.is_finite() || outer_diameter <= inner_diameter {
            return Err(DataError::InvalidGeometry {
                field: "outer_diameter",
                value: outer_diameter,
                reason: "must be finite and larger than the inner diameter",
            });
        }
        if !gauge_length.is_finite() || gauge_length <= 0.0 {
            return Err(DataError::InvalidGeometry {
                field: "gauge_length",
                value: gauge_length,
                reason: "must be finite and positive",
            });
        }
        Ok(SpecimenGeometry { inner_diameter, outer_diameter, gauge_length })
    }

    pub fn inner_diameter(&self) -> f64 {
        self.inner_diameter
    }

    pub fn outer_diameter(&self) -> f64 {
        self.outer_diameter
    }

    pub fn gauge_length(&self) -> f64 {
        self.gauge_length
    }

    /// Cross-section area `π (r_o² − r_i²)`.
    pub fn area(&self) -> f64 {
        let ri = self.inner_diameter / 2.0;
        let ro = self.outer_diameter / 2.0;
        PI * (ro * ro - ri * ri)
    }

    /// Mean wall radius `(r_i + r_o) / 2`.
    pub fn mean_radius(&self) -> f64 {
        (self.inner_diameter + self.outer_diameter) / 4.0
    }
}

/// Raw channels as recorded by the test machine.
#[derive(Debug, Clone, PartialEq)]
pub struct RawChannels {
    pub time: Array1<f64>,
    /// Axial force.
    pub force: Array1<f64>,
    /// Axial strain (already dimensionless).
    pub axial_strain: Array1<f64>,
    /// Axial step counter.
    pub axial_count: Array1<f64>,
    /// Torque.
    pub torque: Array1<f64>,
    /// Twist angle over the gauge length, in radians.
    pub rotation: Array1<f64>,
    /// Torsional step counter.
    pub torsional_count: Array1<f64>,
}

impl RawChannels {
    /// Convert to a [`TimeSeries`] with `time, sig, eps, tau, gam, stp`.
    ///
    /// Errors
    /// ------
    /// Any [`TimeSeries::new`] validation failure (length mismatch, non-finite
    /// values, decreasing `time` or combined step counter).
    pub fn to_series(&self, geometry: &SpecimenGeometry) -> DataResult<TimeSeries> {
        let area = geometry.area();
        let rm = geometry.mean_radius();
        let stp = &self.axial_count + &self.torsional_count;

        TimeSeries::from_pairs([
            (TIME, self.time.clone()),
            (SIG, self.force.mapv(|f| f / area)),
            (EPS, self.axial_strain.clone()),
            (TAU, self.torque.mapv(|t| t / (area * rm))),
            (GAM, self.rotation.mapv(|phi| phi * rm / geometry.gauge_length)),
            (STP, stp),
        ])
    }
}
