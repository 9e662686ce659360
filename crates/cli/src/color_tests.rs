// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serial_test::serial;

use super::*;

#[yare::parameterized(
    tty_default        = { None, None, true, true },
    pipe_default       = { None, None, false, false },
    forced_on_pipe     = { None, Some("1"), false, true },
    no_color_on_tty    = { Some("1"), None, true, false },
    no_color_wins      = { Some("1"), Some("1"), true, false },
    other_values_ignored = { Some("0"), Some("yes"), false, false },
)]
fn color_decision(no_color: Option<&str>, force: Option<&str>, tty: bool, expected: bool) {
    assert_eq!(decide(no_color, force, tty), expected);
}

#[test]
#[serial]
fn forced_color_paints_and_styles() {
    std::env::remove_var("NO_COLOR");
    std::env::set_var("COLOR", "1");

    let painted = header("abc123");
    let styled = format!("{:?}", styles());
    std::env::remove_var("COLOR");

    assert_eq!(painted, "\x1b[38;5;74mabc123\x1b[0m");
    assert_ne!(styled, format!("{:?}", Styles::plain()));
}

#[test]
#[serial]
fn no_color_leaves_text_plain() {
    std::env::set_var("NO_COLOR", "1");

    let plain = (header("foo"), muted("dim"), format!("{:?}", styles()));
    std::env::remove_var("NO_COLOR");

    assert_eq!(plain, ("foo".to_string(), "dim".to_string(), format!("{:?}", Styles::plain())));
}
