//! User id generation port.

pub trait IdGenerator: Send + Sync {
    fn generate_id(&self) -> String;
}
