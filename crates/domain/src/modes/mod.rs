//! Game modes built on the content model and the gameplay kernel

pub mod classic;
pub mod daily;
pub mod duel;
mod lifecycle;
pub mod party;

pub use lifecycle::Lifecycle;
