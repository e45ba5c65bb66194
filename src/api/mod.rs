pub mod extract;
pub mod nullable;

pub use extract::ValidJson;
