//! Shared building blocks for the KVS services.
//!
//! The toolkit carries the pieces every service needs but none owns:
//! the rights accessor used by HTTP handlers, the checked-in gRPC bindings
//! for `auth.v1.AuthService` with a thin client wrapper, and the JetStream
//! publisher plus stream/consumer provisioning.

pub mod accessor;
pub mod auth_client;
pub mod authpb;
pub mod broker;
