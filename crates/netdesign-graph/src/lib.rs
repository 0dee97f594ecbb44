pub mod collision;
pub mod edge_router;
pub mod error;
pub mod graph;
pub mod highlight;
pub mod layout;
pub mod render;
pub mod search;
pub mod validation;

pub use collision::{Collision, RoutingEngine, Segment};
pub use edge_router::{EdgeGeometry, EdgeRouter};
pub use error::GraphError;
pub use graph::{NodeRemoval, TopologyGraph};
pub use highlight::HighlightState;
pub use layout::GridLayout;
pub use render::{EdgeFrame, NodeFrame, RenderFrame};
pub use search::find_path;
pub use validation::check_unique;
