pub mod config;
pub mod ctx;
pub mod ops;

use ctx::LogCtx;

pub fn submit() -> LogCtx<ops::submit::Submit> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn session() -> LogCtx<ops::session::Session> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
pub fn analyze() -> LogCtx<ops::analyze::Analyze> { LogCtx { json: config::logs_are_json(), _marker: std::marker::PhantomData } }
