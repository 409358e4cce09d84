pub mod errors;
pub mod toast;

pub use errors::{ProtocolError, TransportError};
pub use toast::{Toast, ToastLevel, ToastQueue};
