pub mod car;
pub mod request_queue;
pub mod request_queue_tests;

pub use car::Car;
pub use car::CarError;
pub use request_queue::QueuedStop;
pub use request_queue::RequestQueue;
