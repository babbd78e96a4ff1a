pub mod error;
pub mod interaction;
pub mod provider;
pub mod settings;
pub mod tone;
pub mod types;

mod serde_tests;
