
pub use helpers::*;
pub use local_socket::{Link, LocalSocketPair};
pub use test_tier::{TestBlock, TestTier};
