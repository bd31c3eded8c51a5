use crate::codec::HeadLimits;

/// Per-connection settings.
///
/// # Example
///
/// ```
/// use twig_http::codec::HeadLimits;
/// use twig_http::connection::ConnectionConfig;
///
/// let config = ConnectionConfig::default()
///     .with_limits(HeadLimits { max_header_count: 64, ..HeadLimits::default() })
///     .with_write_buffer_size(16 * 1024);
/// assert_eq!(config.read_buffer_size, 8 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Limits applied to every request head.
    pub limits: HeadLimits,
    /// Bytes reserved for each read from the stream.
    pub read_buffer_size: usize,
    /// Capacity of the buffered response body sink. Under chunked framing every
    /// full buffer becomes one chunk.
    pub write_buffer_size: usize,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self { limits: HeadLimits::default(), read_buffer_size: 8 * 1024, write_buffer_size: 4 * 1024 }
    }
}

impl ConnectionConfig {
    pub fn with_limits(mut self, limits: HeadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size.max(1);
        self
    }

    pub fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.write_buffer_size = size.max(1);
        self
    }
}
