//! Private gRPC port.

mod server;

pub use server::GrpcAuthService;
