pub mod tcp;
pub mod udp;

pub use tcp::Tcp;
pub use udp::Udp;
