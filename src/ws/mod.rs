pub mod collab_socket;

pub use collab_socket::collab_socket;
