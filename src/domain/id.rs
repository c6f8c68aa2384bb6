use uuid::Uuid;

use super::todo::TodoId;

pub trait IdGenerator: Send + Sync + 'static {
    fn next_id(&self) -> TodoId;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> TodoId { TodoId(Uuid::new_v4().simple().to_string()) }
}
