use thiserror::Error;

use crate::metadata::token::Token;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which covers every failure this library can return.
///
/// The hoisted-locals pass itself is heuristic and rarely fails: heuristic misses
/// and missing type information are reported through the event log instead. The
/// variants here cover structural problems in the module handed to a pass.
///
/// # Error Categories
///
/// ## Lookup Errors
/// - [`Error::TypeNotFound`] - A type token does not resolve in the module
/// - [`Error::MethodNotFound`] - A method token does not resolve in the module
///
/// ## Structural Errors
/// - [`Error::Malformed`] - An instruction or body is inconsistent
/// - [`Error::LocalLimit`] - A method body ran out of local variable slots
///
/// # Examples
///
/// ```rust
/// use unhoist::{Error, metadata::{module::Module, token::Token}};
///
/// let module = Module::new("sample.dll");
/// match module.type_by_token(Token::new(0x0200_0042)) {
///     Ok(ty) => println!("found {}", ty.name),
///     Err(Error::TypeNotFound(token)) => eprintln!("no type {token}"),
///     Err(e) => eprintln!("other error: {e}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The module or one of its bodies is inconsistent.
    ///
    /// Includes the source location where the problem was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// Failed to find a type in the module.
    ///
    /// The associated [`Token`] identifies which type was not found.
    #[error("Failed to find type in module - {0}")]
    TypeNotFound(Token),

    /// Failed to find a method in the module.
    ///
    /// The associated [`Token`] identifies which method was not found.
    #[error("Failed to find method in module - {0}")]
    MethodNotFound(Token),

    /// A method body already holds the maximum number of locals.
    ///
    /// CIL addresses locals with a 16-bit index, so a body can hold at most
    /// 65535 of them. The associated [`Token`] identifies the method.
    #[error("Method {0} has no free local variable slot")]
    LocalLimit(Token),
}
