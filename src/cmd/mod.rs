pub mod analyze;
pub mod interactive;

use quickbrief::client::AnalyzeClientConfig;
use quickbrief::output::OutputConfig;

/// Settings shared by every subcommand, resolved from env and flags.
pub struct AppCtx {
    pub client: AnalyzeClientConfig,
    pub output: OutputConfig,
}
