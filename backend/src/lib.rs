//! Factory operations reporting backend.
//!
//! Layout follows a hexagonal shape: `domain` holds the core types and
//! use-cases plus the ports they consume, `inbound` adapts HTTP onto the
//! domain, `outbound` implements the ports, and `server` wires the two
//! sides together.
#![cfg_attr(
    test,
    allow(
        clippy::expect_used,
        clippy::unwrap_used,
        reason = "tests panic on fixture and setup failures"
    )
)]

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
