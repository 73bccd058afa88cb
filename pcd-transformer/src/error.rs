use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error(
        "no points with ground classification {ground_class}; cannot estimate ground elevation"
    )]
    NoGroundPoints { ground_class: u8 },
}
