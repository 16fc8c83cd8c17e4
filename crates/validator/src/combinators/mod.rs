//! Rules that wrap, gate, or fan out other rules.
//!
//! Combinators carry no validation logic of their own. They decide
//! whether and where the wrapped rules run: [`SkipOnEmpty`] and
//! [`SkipOnError`] suppress evaluation, [`When`] gates it on a
//! condition, [`Each`] fans out over collection elements, [`Nested`]
//! descends into child objects, and [`Callback`] defers to native
//! code. Most are reachable through [`RuleExt`](crate::foundation::RuleExt)
//! adapters rather than constructed directly.

pub mod callback;
pub mod each;
pub mod message;
pub mod nested;
pub mod skip;
pub mod when;

pub use callback::{Callback, callback};
pub use each::{Each, each};
pub use message::{WithMessage, with_code, with_message};
pub use nested::{Nested, nested};
pub use skip::{SkipOnEmpty, SkipOnError, skip_on_empty, skip_on_error};
pub use when::{Condition, When, when};
