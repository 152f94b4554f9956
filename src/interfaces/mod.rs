pub mod container;
pub mod provider;
