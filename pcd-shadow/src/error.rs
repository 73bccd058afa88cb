use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShadowError {
    #[error("sun amplitude {amplitude}° is at or below the horizon; no shadow is cast")]
    SunBelowHorizon { amplitude: f64 },

    #[error("invalid sun position: azimuth {azimuth}°, amplitude {amplitude}°")]
    InvalidSunPosition { azimuth: f64, amplitude: f64 },

    #[error("footprint has {distinct} distinct vertices, at least 3 are needed for a hull")]
    DegenerateHull { distinct: usize },

    #[error("hull has zero area (all vertices are collinear)")]
    CollinearHull,

    #[error("hull vertex has a non-finite coordinate")]
    NonFiniteVertex,
}
