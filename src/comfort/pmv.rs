//! Fanger thermal comfort model (PMV/PPD), in the ISO 7730 formulation.
//!
//! All vapour pressures are in pascals. The clothing surface temperature is
//! solved by fixed-point iteration starting from a single-pass estimate.

use crate::error::{OptimizationError, OptimizationResult};

/// W/m² per met
const MET_TO_WM2: f64 = 58.15;
/// m²K/W per clo
const CLO_TO_M2KW: f64 = 0.155;
/// Stefan-Boltzmann constant times emissivity and radiating area ratio (0.97 · 0.71)
const RADIATIVE_FACTOR: f64 = 3.96e-8;
const KELVIN_OFFSET: f64 = 273.0;

const MAX_ITERATIONS: usize = 150;
const TOLERANCE: f64 = 0.00015;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PmvInputs {
    /// Air temperature (°C)
    pub ta: f64,
    /// Mean radiant temperature (°C)
    pub tr: f64,
    /// Relative humidity (%)
    pub rh: f64,
    /// Relative air speed (m/s)
    pub va: f64,
    /// Metabolic rate (met)
    pub met: f64,
    /// Clothing insulation (clo)
    pub clo: f64,
}

/// Water vapour partial pressure (Pa) at air temperature `ta` and relative humidity `rh`.
pub fn vapour_pressure(ta: f64, rh: f64) -> f64 {
    rh * 10.0 * (16.6536 - 4030.183 / (ta + 235.0)).exp()
}

/// Linearised radiative heat-transfer coefficient between clothing at `tcl`
/// and surroundings at `tr`. Zero when the two temperatures coincide.
pub fn radiative_coefficient(tcl: f64, tr: f64) -> f64 {
    if tcl == tr {
        return 0.0;
    }
    RADIATIVE_FACTOR * ((tcl + KELVIN_OFFSET).powi(4) - (tr + KELVIN_OFFSET).powi(4)) / (tcl - tr)
}

/// Predicted Mean Vote on the -3 (cold) .. +3 (hot) scale.
pub fn predicted_mean_vote(i: &PmvInputs) -> OptimizationResult<f64> {
    let m = i.met * MET_TO_WM2;
    let w = 0.0;
    let mw = m - w;
    let icl = CLO_TO_M2KW * i.clo;
    let pa = vapour_pressure(i.ta, i.rh);

    let fcl = if icl <= 0.078 {
        1.0 + 1.29 * icl
    } else {
        1.05 + 0.645 * icl
    };
    let hc_forced = 12.1 * i.va.sqrt();

    // Single-pass estimate, then refine against the heat balance at the clothing surface.
    let mut tcl = i.ta + (35.5 - i.ta) / (3.5 * icl + 0.1);
    let mut hc = hc_forced;
    let mut converged = false;
    for _ in 0..MAX_ITERATIONS {
        hc = hc_forced.max(2.38 * (tcl - i.ta).abs().powf(0.25));
        let hr = radiative_coefficient(tcl, i.tr);
        let next = (35.7 - 0.028 * mw + icl * fcl * (hr * i.tr + hc * i.ta))
            / (1.0 + icl * fcl * (hr + hc));
        let step = (next - tcl).abs();
        tcl = (tcl + next) / 2.0;
        if step < TOLERANCE {
            converged = true;
            break;
        }
    }
    if !converged || !tcl.is_finite() {
        return Err(OptimizationError::comfort(
            "clothing surface temperature did not converge",
        ));
    }

    let hr = radiative_coefficient(tcl, i.tr);
    let skin_diffusion = 3.05e-3 * (5733.0 - 6.99 * mw - pa);
    let sweating = if mw > MET_TO_WM2 {
        0.42 * (mw - MET_TO_WM2)
    } else {
        0.0
    };
    let latent_respiration = 1.7e-5 * m * (5867.0 - pa);
    let dry_respiration = 0.0014 * m * (34.0 - i.ta);
    let radiation = fcl * hr * (tcl - i.tr);
    let convection = fcl * hc * (tcl - i.ta);

    let load = mw
        - skin_diffusion
        - sweating
        - latent_respiration
        - dry_respiration
        - radiation
        - convection;

    Ok((0.303 * (-0.036 * m).exp() + 0.028) * load)
}

/// Predicted Percentage Dissatisfied (%) for a given PMV, clamped to [0, 100].
pub fn predicted_percentage_dissatisfied(pmv: f64) -> f64 {
    (100.0 - 95.0 * (-0.03353 * pmv.powi(4) - 0.2179 * pmv.powi(2)).exp()).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn office(ta: f64, rh: f64, va: f64) -> PmvInputs {
        PmvInputs {
            ta,
            tr: ta,
            rh,
            va,
            met: 1.2,
            clo: 1.0,
        }
    }

    #[test]
    fn test_neutral_office_conditions() {
        let pmv = predicted_mean_vote(&office(22.0, 50.0, 0.1)).unwrap();
        assert!(pmv.abs() < 0.3, "pmv = {}", pmv);
    }

    #[test]
    fn test_pmv_sign_follows_temperature() {
        let cold = predicted_mean_vote(&office(15.0, 50.0, 0.1)).unwrap();
        let cool = predicted_mean_vote(&office(20.0, 50.0, 0.1)).unwrap();
        let warm = predicted_mean_vote(&office(26.0, 50.0, 0.1)).unwrap();
        let hot = predicted_mean_vote(&office(30.0, 50.0, 0.1)).unwrap();
        assert!(cold < cool && cool < warm && warm < hot);
        assert!(cold < -1.0);
        assert!(hot > 1.5);
    }

    #[test]
    fn test_iso_reference_point() {
        // ISO 7730 Annex D style case: 22 °C, 60 %RH, 0.1 m/s, 1.2 met, 0.5 clo.
        let pmv = predicted_mean_vote(&PmvInputs {
            ta: 22.0,
            tr: 22.0,
            rh: 60.0,
            va: 0.1,
            met: 1.2,
            clo: 0.5,
        })
        .unwrap();
        assert!((pmv - (-0.75)).abs() < 0.1, "pmv = {}", pmv);
    }

    #[test]
    fn test_radiative_coefficient_degenerate_case() {
        assert_eq!(radiative_coefficient(25.0, 25.0), 0.0);
        let hr = radiative_coefficient(26.0, 24.0);
        assert!(hr > 0.0 && hr.is_finite());
    }

    #[test]
    fn test_ppd_minimum_at_neutral() {
        assert!((predicted_percentage_dissatisfied(0.0) - 5.0).abs() < 1e-12);
        assert!(predicted_percentage_dissatisfied(0.5) > 5.0);
        assert!(predicted_percentage_dissatisfied(-0.5) > 5.0);
        assert_eq!(predicted_percentage_dissatisfied(10.0), 100.0);
    }

    #[test]
    fn test_vapour_pressure_in_pascals() {
        // Saturation pressure at 20 °C is about 2.34 kPa.
        let pa = vapour_pressure(20.0, 100.0);
        assert!((pa - 2337.0).abs() < 20.0, "pa = {}", pa);
    }
}
