pub mod cloud;
pub mod controller;
pub mod local;
pub mod session;

pub use controller::refresh;
pub use session::AuthSession;
