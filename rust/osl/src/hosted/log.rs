pub use ::log::{debug as pr_debug, error as pr_err, info as pr_info, warn as pr_warn};
