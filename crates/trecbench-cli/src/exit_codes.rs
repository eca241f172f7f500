//! Unified exit codes for the trecbench CLI.
//! Part of the public contract; scripts branch on these.

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1; // rejected operation: validation, auth, evaluation
pub const INTERNAL_ERROR: i32 = 2; // config or database fault
