//! Integration tests for amity-node
//!
//! These tests drive the full router in-process with
//! `tower::ServiceExt::oneshot`.

mod accounts;
mod friends;
mod helpers;
mod search;
