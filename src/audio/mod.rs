pub mod assembler;
pub mod codec;
pub mod effects;
pub mod export;
pub mod resample;

pub use assembler::{Assembly, AssemblySettings, AudioAssembler, ExcludedSegment};
pub use export::{OutputFormat, OutputTarget, write_output};
