use serde::{Deserialize, Serialize};

use crate::error::ShadowError;

/// Position of the sun for one classification run.
///
/// `azimuth` is in geometric degrees: counterclockwise, with north at 90°.
/// `amplitude` is the elevation above the horizon, in (0°, 90°].
///
/// A point at height `h` casts its shadow at
///
/// ```text
/// shadow_x = x + h / tan(amplitude) * sin(azimuth + 180°)
/// shadow_y = y + h / tan(amplitude) * cos(azimuth + 180°)
/// ```
///
/// so at azimuth 0° the shadow falls towards -y, at 90° towards -x.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSunPosition", into = "RawSunPosition")]
pub struct SunPosition {
    azimuth: f64,
    amplitude: f64,
    direction: [f64; 2],
    reach: f64,
}

#[derive(Serialize, Deserialize)]
struct RawSunPosition {
    azimuth: f64,
    amplitude: f64,
}

impl SunPosition {
    pub fn new(azimuth: f64, amplitude: f64) -> Result<Self, ShadowError> {
        if !azimuth.is_finite() || !amplitude.is_finite() || amplitude > 90.0 {
            return Err(ShadowError::InvalidSunPosition { azimuth, amplitude });
        }
        if amplitude <= 0.0 {
            return Err(ShadowError::SunBelowHorizon { amplitude });
        }

        let azimuth = azimuth.rem_euclid(360.0);
        let (sin, cos) = (azimuth + 180.0).to_radians().sin_cos();
        // tan(90°) is not exactly infinite in floating point; treat zenith explicitly.
        let reach = if amplitude == 90.0 {
            0.0
        } else {
            1.0 / amplitude.to_radians().tan()
        };
        // Amplitudes a hair above zero still overflow the shadow length.
        if !reach.is_finite() {
            return Err(ShadowError::SunBelowHorizon { amplitude });
        }

        Ok(Self {
            azimuth,
            amplitude,
            direction: [sin, cos],
            reach,
        })
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// Horizontal length of the shadow cast by something `height` tall.
    pub fn shadow_length(&self, height: f64) -> f64 {
        height * self.reach
    }

    /// Ground position of the shadow cast by (x, y) at `height`.
    pub fn project_to_ground(&self, x: f64, y: f64, height: f64) -> [f64; 2] {
        let length = self.shadow_length(height);
        [
            x + length * self.direction[0],
            y + length * self.direction[1],
        ]
    }
}

impl TryFrom<RawSunPosition> for SunPosition {
    type Error = ShadowError;

    fn try_from(raw: RawSunPosition) -> Result<Self, Self::Error> {
        SunPosition::new(raw.azimuth, raw.amplitude)
    }
}

impl From<SunPosition> for RawSunPosition {
    fn from(sun: SunPosition) -> Self {
        RawSunPosition {
            azimuth: sun.azimuth,
            amplitude: sun.amplitude,
        }
    }
}
