pub mod capability;
pub mod constants;
pub mod normalize;
pub mod session;
pub mod types;
