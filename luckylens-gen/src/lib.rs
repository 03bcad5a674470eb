pub mod batch;
pub mod random;
pub mod rng;
pub mod trends;
pub mod weighted;

pub use batch::{GenerationMode, generate_batch};
pub use random::generate_set;
pub use rng::{RandomSource, SecureSource, SeededSource, random_int, source_from_seed};
pub use weighted::{FrequencyMaps, generate_weighted_set};
