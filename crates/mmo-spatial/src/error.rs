use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("zone {zone} is not registered")]
    UnknownZone { zone: u32 },
}
