//! Shape table composition.
//!
//! Independently developed modules and themes contribute shape alterations
//! through [`ShapeTableProvider`]s. [`ShapeTableManager`] turns them into one
//! [`ShapeTable`] per theme:
//!
//! 1. discover alterations from every provider, optionally in parallel
//! 2. keep module alterations and those of the theme or its base themes
//! 3. order by feature dependency, then feature priority, then discovery order
//! 4. fold each shape type's alterations into a [`ShapeDescriptor`]
//! 5. notify [`ShapeTableEventHandler`]s and collect [`VolatileToken`]s
//!
//! Tables are cached per theme and rebuilt once any captured token goes
//! stale. Concurrent requests for an uncached theme share a single build.

pub mod alteration;
pub mod builder;
pub mod cache;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod filter;
pub mod manager;
pub mod provider;
pub mod table;
pub mod volatile;

pub use alteration::{Mutation, ShapeAlteration, order_alterations};
pub use builder::{ShapeAlterationBuilder, ShapeTableBuilder};
pub use cache::{BuiltTable, ShapeTableCache};
pub use config::ShapeTableConfig;
pub use descriptor::{BindingSource, BindingTarget, Placement, ShapeBinding, ShapeDescriptor};
pub use error::{ConfigError, ShapeError};
pub use events::ShapeTableEventHandler;
pub use filter::is_applicable;
pub use manager::{ShapeTableManager, ShapeTableManagerBuilder};
pub use provider::ShapeTableProvider;
pub use table::ShapeTable;
pub use volatile::{Permanent, ShapeTableMonitor, Signal, SignalToken, VolatileToken};
