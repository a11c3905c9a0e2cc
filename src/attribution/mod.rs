pub mod attributor;
pub mod processor;
