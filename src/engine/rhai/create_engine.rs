use rhai::{Dynamic, Engine};

use super::{CaptureSinks, SearchPath, SearchPathResolver, UNIT_EXTENSION};
use crate::config::RhaiConfig;

/// Creates the Rhai engine that runs user code units.
///
/// `print` goes to the stdout sink; `debug` and `eprint` go to the stderr
/// sink. `import` statements resolve through `search_path`.
pub fn create_engine(
    rhai_config: &RhaiConfig,
    sinks: &CaptureSinks,
    search_path: &SearchPath,
) -> Engine {
    let mut engine = Engine::new();

    // Apply limits
    engine.set_max_operations(rhai_config.max_operations);
    engine.set_max_call_levels(rhai_config.max_call_levels);
    engine.set_max_string_size(rhai_config.max_string_size);
    engine.set_max_array_size(rhai_config.max_array_size);
    engine.set_max_map_size(rhai_config.max_map_size);

    engine.set_module_resolver(SearchPathResolver::new(search_path.clone(), UNIT_EXTENSION));

    let stdout = sinks.clone();
    engine.on_print(move |text| stdout.write_stdout(text));

    let stderr = sinks.clone();
    engine.on_debug(move |text, _source, _pos| stderr.write_stderr(text));

    let stderr = sinks.clone();
    engine.register_fn("eprint", move |value: Dynamic| stderr.write_stderr(&value.to_string()));

    engine
}
