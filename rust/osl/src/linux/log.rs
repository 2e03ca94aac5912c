pub use kernel::{pr_debug, pr_err, pr_info, pr_warn};
