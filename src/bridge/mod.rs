pub mod events;
pub mod handle;
pub(crate) mod worker;
