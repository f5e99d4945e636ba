// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help output specs
//!
//! Verify help text displays for all commands.

use crate::prelude::*;

#[test]
fn plccoms_no_args_shows_usage_and_exits_zero() {
    cli().passes().stdout_has("Usage:");
}

#[test]
fn plccoms_help_lists_subcommands() {
    cli()
        .args(["--help"])
        .passes()
        .stdout_has("probe")
        .stdout_has("list")
        .stdout_has("get")
        .stdout_has("set")
        .stdout_has("watch");
}

#[test]
fn plccoms_help_mentions_host_env() {
    cli().args(["--help"]).passes().stdout_has("PLCCOMS_HOST");
}

#[test]
fn plccoms_get_help_shows_usage() {
    cli().args(["get", "--help"]).passes().stdout_has("Usage:");
}

#[test]
fn plccoms_version_shows_version() {
    cli().args(["--version"]).passes().stdout_has("0.1");
}

#[test]
fn plccoms_get_without_names_is_a_usage_error() {
    cli().args(["--host", "127.0.0.1", "get"]).fails_with(2).stderr_has("Usage:");
}

#[test]
fn plccoms_without_host_explains_how_to_set_it() {
    cli().args(["list"]).fails_with(2).stderr_has("PLCCOMS_HOST");
}
