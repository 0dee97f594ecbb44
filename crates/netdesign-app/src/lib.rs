pub mod connection;
pub mod editor;
pub mod error;
pub mod settings;

pub use connection::{
    Attachment, ConnectionError, ConnectionProtocol, ConnectionState, DropOutcome,
};
pub use editor::{TopologyEditor, node_from_profile};
pub use error::EditorError;
pub use settings::{EditorSettings, LayoutSettings, PaletteSettings, RoutingSettings};
