/// Grid data structures shared by the pathfinding and debug layers.

mod flow_field;

pub use flow_field::{FlowField, IMPASSABLE, UNREACHED};
