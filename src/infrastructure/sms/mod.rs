pub mod android;
pub mod fallback;
pub mod log;
pub mod macrodroid;

pub use android::{AndroidSmsConfig, AndroidSmsSender};
pub use fallback::FallbackSmsSender;
pub use log::LogSmsSender;
pub use macrodroid::{MacroDroidConfig, MacroDroidSmsSender};
