pub mod dispatcher;

pub use dispatcher::DispatchController;
