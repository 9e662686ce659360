// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ID helpers

/// Returns a string slice truncated to at most `n` bytes.
///
/// IDs are ASCII hex, so byte truncation never splits a character; other
/// input is cut back to the nearest character boundary.
pub fn short(s: &str, n: usize) -> &str {
    if s.len() <= n {
        return s;
    }
    let mut end = n;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
