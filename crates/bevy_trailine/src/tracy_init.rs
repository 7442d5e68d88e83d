//! Tracy profiler initialization.

use tracing_subscriber::prelude::*;
use tracing_tracy::TracyLayer;

/// Initialize Tracy profiling for the trail systems.
///
/// Call this early in `main()`, before `App::run()`. Spans are emitted from
/// the compositor, presenter and lifecycle systems.
pub fn init_tracy() {
  tracing_subscriber::registry()
    .with(TracyLayer::default())
    .init();
}
