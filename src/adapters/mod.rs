// Adapters layer: concrete implementations of the domain ports.

pub mod http;
pub mod storage;

pub use http::{DistanceMatrixClient, DEFAULT_DISTANCE_MATRIX_ENDPOINT};
pub use storage::LocalTableStore;
