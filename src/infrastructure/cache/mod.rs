//! Invoice list view cache backends

pub mod memory;
pub mod redis;

pub use self::memory::MemoryInvoiceListCache;
pub use self::redis::RedisInvoiceListCache;
