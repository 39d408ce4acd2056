pub mod buffer;
pub mod coordinator;
pub mod dispatch;

#[cfg(test)]
pub(crate) mod testing;

pub use buffer::UrlBuffer;
pub use coordinator::Pipeline;
pub use dispatch::{RouteMode, display_line, dispatch, route_mode};
