pub mod macros;
pub mod structs;

pub use structs::CarEvent;
pub use structs::CarId;
pub use structs::CarSnapshot;
pub use structs::CarStatus;
pub use structs::Direction;
pub use structs::Occupant;
pub use structs::OccupantId;
pub use structs::RequestOrigin;
