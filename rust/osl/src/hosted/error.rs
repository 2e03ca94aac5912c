/// On a host the general error type is the OS error type.
pub type Error = crate::error::Errno;
