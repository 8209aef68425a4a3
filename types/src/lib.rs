pub mod address;
pub mod config;
pub mod id;
pub mod idspace;
pub mod message;
pub mod response;
pub mod routing_info;

pub use address::NodeAddress;
pub use config::Config;
pub use id::Id;
pub use idspace::IdSpace;
pub use message::Message;
pub use response::{Response, Status};
pub use routing_info::RoutingInfo;
