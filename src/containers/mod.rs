pub mod bottle;
pub mod tracking;
