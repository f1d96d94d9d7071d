pub mod chat_routes;
pub mod document_routes;
pub mod health_routes;
pub mod processo_routes;
pub mod report_routes;
pub mod search_routes;
pub mod transacao_routes;

pub use chat_routes::*;
pub use document_routes::*;
pub use health_routes::*;
pub use processo_routes::*;
pub use report_routes::*;
pub use search_routes::*;
pub use transacao_routes::*;
