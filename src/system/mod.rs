pub mod host;
pub mod parser;
pub mod record;
pub mod sampler;
