mod batch;

pub use batch::{ChunkReport, run_chunk};
