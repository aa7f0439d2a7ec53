//! Clock capability: tells the agent the local time.

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use parley_core::error::ToolError;
use parley_core::tool::{Capability, ToolArgs};

/// `Mon Jan  2 15:04:05 2006`
const TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

pub struct ClockTool;

impl ClockTool {
    fn format<Tz: TimeZone>(time: &DateTime<Tz>) -> String
    where
        Tz::Offset: std::fmt::Display,
    {
        time.format(TIME_FORMAT).to_string()
    }
}

#[async_trait]
impl Capability for ClockTool {
    fn name(&self) -> &str {
        "get_time"
    }

    fn description(&self) -> Vec<String> {
        vec!["Gets the current time".into(), "Takes no arguments".into()]
    }

    async fn call(&self, _args: ToolArgs) -> Result<String, ToolError> {
        Ok(Self::format(&Local::now()))
    }
}
