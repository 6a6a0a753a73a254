//! Adapters: concrete implementations of the ports.

pub mod generator;
pub mod grpc;
pub mod hasher;
pub mod http;
pub mod jwt;
pub mod postgres;
