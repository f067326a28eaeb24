use std::fmt;

/// Errors produced while interpreting frames or delivering commands.
#[derive(Debug, thiserror::Error)]
pub enum PilotError {
    #[error("Malformed input: missing {field}")]
    MalformedInput { field: String },

    #[error("Frame decode error: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Command sink failed: {0}")]
    Sink(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Pilot stream stopped")]
    StreamStopped,

    #[error("Timeout waiting for dispatch report")]
    Timeout,

    #[error("Channel disconnected")]
    ChannelDisconnected,
}

impl PilotError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        PilotError::MalformedInput {
            field: field.into(),
        }
    }
}

/// Thread-safe last-error storage for the C FFI layer.
pub(crate) struct LastError {
    message: std::sync::Mutex<String>,
}

impl LastError {
    pub const fn new() -> Self {
        Self {
            message: std::sync::Mutex::new(String::new()),
        }
    }

    pub fn set(&self, err: &PilotError) {
        if let Ok(mut msg) = self.message.lock() {
            *msg = fmt::format(format_args!("{}\0", err));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut msg) = self.message.lock() {
            msg.clear();
        }
    }

    pub fn as_ptr(&self) -> *const std::ffi::c_char {
        match self.message.lock() {
            Ok(msg) if !msg.is_empty() => msg.as_ptr() as *const std::ffi::c_char,
            _ => std::ptr::null(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_names_field() {
        let err = PilotError::missing("hands[0].thumb");
        assert_eq!(err.to_string(), "Malformed input: missing hands[0].thumb");
    }

    #[test]
    fn last_error_is_nul_terminated() {
        let last = LastError::new();
        assert!(last.as_ptr().is_null());
        last.set(&PilotError::Timeout);
        let ptr = last.as_ptr();
        assert!(!ptr.is_null());
        let msg = unsafe { std::ffi::CStr::from_ptr(ptr) };
        assert_eq!(msg.to_str().unwrap(), "Timeout waiting for dispatch report");
        last.clear();
        assert!(last.as_ptr().is_null());
    }
}
