pub mod dispatch;
pub mod logging;
pub mod run;
