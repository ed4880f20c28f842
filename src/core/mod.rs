//! Business logic over an open storage session. No terminal I/O.

pub mod services;
