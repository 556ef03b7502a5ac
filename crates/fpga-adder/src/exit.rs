// Process exit codes
pub const EXIT_PASSED: u8 = 0;
pub const EXIT_MISMATCH: u8 = 1;
pub const EXIT_RUNTIME_FAIL: u8 = 2;
