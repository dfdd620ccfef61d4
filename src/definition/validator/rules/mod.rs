//! Validation Rules
//!
//! Each file in this module contains one validation rule:
//!
//! - `duplicate_ids.rs` - Node, exit and action ids reused within a flow
//! - `dangling_exit.rs` - Exits leading to nodes that do not exist
//! - `exit_count.rs` - Router nodes without exits, linear nodes with several
//! - `router_exits.rs` - Categories, cases and defaults that don't line up with the node's exits
//! - `unreachable_node.rs` - Nodes nothing leads to

mod dangling_exit;
mod duplicate_ids;
mod exit_count;
mod router_exits;
mod unreachable_node;

pub use dangling_exit::DanglingExitRule;
pub use duplicate_ids::DuplicateIdsRule;
pub use exit_count::ExitCountRule;
pub use router_exits::RouterExitsRule;
pub use unreachable_node::UnreachableNodeRule;
