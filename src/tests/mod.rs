//! HTTP-level tests, driving the full router through `tower::Service`

mod helper;
