//! Block parser for note files
//!
//! Turns raw note text into a flat, leveled sequence of [`ParsedBlock`]s.
//! Every list-item line becomes one block; everything else is ignored.
//! Hierarchy is never stored, but [`derive_outline`] rebuilds it from levels
//! on demand.
//!
//! ```
//! use notegraph_parser::BlockParser;
//!
//! let parsed = BlockParser::new(4).parse("- Rust #lang\n    - ownership [[Borrowing]]\n");
//! assert_eq!(parsed.blocks.len(), 2);
//! assert_eq!(parsed.blocks[1].level, 1);
//! ```

pub mod block_parser;
pub mod error;
pub mod metadata;
pub mod outline;

pub use block_parser::{BlockParser, ParsedFile};
pub use error::ParseError;
pub use metadata::extract_tags;
pub use outline::{derive_outline, OutlineNode};

pub use notegraph_core::ParsedBlock;
