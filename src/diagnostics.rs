//! The agent's own diagnostics channel.
//!
//! Every `tracing` event is written to the real standard error as a single
//! line tagged with [`AGENT_LOG_TAG`], so it can never be mistaken for user
//! output (which only ever appears inside the response envelope).

use std::{fmt, io};

use tracing::{Event, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter, format::Writer},
    registry::LookupSpan,
};

use crate::engine::rhai::UNIT_OUTPUT_TARGET;

/// Prefix of every diagnostics line.
pub const AGENT_LOG_TAG: &str = "[AgentLog]";

/// Default filter when `RUST_LOG` is not set.
pub const DEFAULT_FILTER: &str = "info";

/// Formats events as `[AgentLog] LEVEL message key=value ...`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentLogFormat;

impl<S, N> FormatEvent<S, N> for AgentLogFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        write!(writer, "{AGENT_LOG_TAG} {} ", metadata.level())?;
        if metadata.target() == UNIT_OUTPUT_TARGET {
            write!(writer, "(unit output outside capture) ")?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Builds the diagnostics subscriber writing to `make_writer`.
pub fn subscriber<W>(make_writer: W, filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .event_format(AgentLogFormat)
        .finish()
}

/// Installs the diagnostics subscriber on standard error.
///
/// Failure to install (e.g. a subscriber is already set) is ignored.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing::subscriber::set_global_default(subscriber(io::stderr, filter));
}
