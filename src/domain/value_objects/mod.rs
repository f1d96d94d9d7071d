pub mod content_hash;
pub mod document_status;
pub mod message_role;
pub mod transaction_category;

pub use content_hash::ContentHash;
pub use document_status::DocumentStatus;
pub use message_role::MessageRole;
pub use transaction_category::TransactionCategory;
