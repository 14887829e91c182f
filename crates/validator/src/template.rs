//! Message templates
//!
//! Rule messages are templates with `#{…}` placeholders. Placeholders are
//! filled positionally: the first placeholder receives the first argument,
//! the second the next one, and so on. The text between the braces is only
//! a label for readers and does not affect substitution.
//!
//! ```rust,ignore
//! use model_validator::template;
//!
//! let message = template::format("#{attribute} must be at least #{min} characters long", &[&"name", &3]);
//! assert_eq!(message, "name must be at least 3 characters long");
//! ```

use std::fmt::{self, Write};

const OPEN: &str = "#{";
const CLOSE: char = '}';

/// Fills the placeholders of `template` from `args`, in order.
///
/// Placeholders left over once `args` is exhausted are kept verbatim, as is
/// an opening `#{` with no closing brace. Surplus arguments are ignored.
pub fn format(template: &str, args: &[&dyn fmt::Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut args = args.iter();
    let mut rest = template;

    while let Some(start) = rest.find(OPEN) {
        let after_open = &rest[start + OPEN.len()..];
        let Some(len) = after_open.find(CLOSE) else {
            break;
        };

        out.push_str(&rest[..start]);
        let placeholder_end = start + OPEN.len() + len + 1;
        match args.next() {
            // Writing into a String cannot fail.
            Some(arg) => {
                let _ = write!(out, "{arg}");
            }
            None => out.push_str(&rest[start..placeholder_end]),
        }
        rest = &rest[placeholder_end..];
    }

    out.push_str(rest);
    out
}
