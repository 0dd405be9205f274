use std::any::type_name;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use crate::table::ShapeTable;

/// Observer notified once per freshly built table.
///
/// Failures are logged and never affect the table or its caching.
pub trait ShapeTableEventHandler: Send + Sync {
	fn name(&self) -> &str {
		type_name::<Self>()
	}

	fn shape_table_created(&self, table: &ShapeTable) -> anyhow::Result<()>;
}

/// Notifies handlers in registration order.
pub(crate) fn notify_created(handlers: &[Arc<dyn ShapeTableEventHandler>], theme: &str, table: &ShapeTable) {
	for handler in handlers {
		match catch_unwind(AssertUnwindSafe(|| handler.shape_table_created(table))) {
			Ok(Ok(())) => {}
			Ok(Err(error)) => {
				tracing::warn!(handler = handler.name(), theme, error = %format!("{error:#}"), "shape_table.event_handler.failed");
			}
			Err(_) => {
				tracing::warn!(handler = handler.name(), theme, "shape_table.event_handler.panicked");
			}
		}
	}
}
