// src/naming.rs
//! Sequential output file naming

use std::path::{Path, PathBuf};

/// First `"{base_name} {n}.{extension}"` in `directory` that does not exist,
/// with `n` counting up from 1.
///
/// Check-then-write: a concurrent writer could claim the same candidate
/// between this call and the eventual write.
pub fn next_path(directory: &Path, base_name: &str, extension: &str) -> PathBuf {
    let mut counter = 1u32;
    loop {
        let candidate = directory.join(format!("{} {}.{}", base_name, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}
