//! # Script metadata extraction.
//!
//! Instrumentation scripts declare their name, their unsafe permission bit and
//! their externally triggerable events through annotations. [`ScriptMetadata`]
//! recognizes those annotations with permissive text patterns; it is not a
//! parser for the script language.
//!
//! ## Recognized annotations
//! ```text
//! @BTrace(unsafe = true, name = "probe")   → unsafe flag, declared name
//! @OnEvent("flush")                        → named event "flush"
//! @OnEvent                                 → anonymous event
//! ```

mod metadata;

pub use metadata::ScriptMetadata;
