pub mod auto;
pub mod distance;
pub mod encoder;
pub mod report;
