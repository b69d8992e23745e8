//! The concrete record tiers, in priority order.

mod direct;
mod manual;
mod node_script;

pub use direct::DirectStoreTier;
pub use manual::{print_manual_instructions, ManualTier};
pub use node_script::{NodeScriptTier, RECORD_ENV};
