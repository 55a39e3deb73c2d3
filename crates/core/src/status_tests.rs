// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn same_namespace_converts() {
    let status = Status::agent_error("boom");
    assert!(status.into_namespace(StatusNamespace::AgentError).is_ok());
}

#[test]
fn cross_namespace_conversion_fails_cleanly() {
    let status = Status::agent_error("boom");
    let err = status.into_namespace(StatusNamespace::InvalidConfiguration).unwrap_err();
    assert_eq!(err.namespace, StatusNamespace::AgentError);
}

#[test]
fn display_includes_detail() {
    let status = Status::invalid_configuration("bad url").with_detail("empty scheme");
    let rendered = status.to_string();
    assert!(rendered.contains("bad url"));
    assert!(rendered.contains("empty scheme"));
}
