pub mod config;
pub mod error;
pub mod message;
pub mod render;
pub mod services;
pub mod state;
pub mod widget;

pub use config::WidgetConfig;
pub use services::backend::{AskBackend, HttpBackend};
pub use widget::ChatWidget;
